//! FocusSource port - 「ユーザーがアプリに戻ってきた」シグナル
//!
//! ホスト環境（ウィンドウ、タブ、端末）がフォーカスを取り戻したときに
//! イベントを発行する。購読 / 購読解除のみをサポートする。
//! 購読解除は Receiver を drop すること。

use tokio::sync::broadcast;

/// フォーカス復帰イベント（ペイロードなし）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent;

pub trait FocusSource: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<FocusEvent>;
}
