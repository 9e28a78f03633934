//! FocusBroadcaster - broadcast チャネルによる FocusSource 実装
//!
//! 購読者は `subscribe()` で Receiver を受け取り、drop で購読解除する。
//! 購読者がいないときの `notify()` は何もしない。

use tokio::sync::broadcast;

use crate::ports::{FocusEvent, FocusSource};

/// 取りこぼしは 1 回のフォーカス復帰にまとめるので、小さい容量で十分
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct FocusBroadcaster {
    tx: broadcast::Sender<FocusEvent>,
}

impl FocusBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// フォーカス復帰を通知（届いた購読者の数を返す）
    pub fn notify(&self) -> usize {
        self.tx.send(FocusEvent).unwrap_or(0)
    }

    /// 現在の購読者数
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FocusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusSource for FocusBroadcaster {
    fn subscribe(&self) -> broadcast::Receiver<FocusEvent> {
        self.tx.subscribe()
    }
}
