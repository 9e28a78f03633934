//! PermissionRevalidator - 権限キャッシュの定期再検証
//!
//! # フロー
//! 1. `activate()`: 資格情報が揃っていれば interval タイマーとフォーカス購読を 1 組だけ登録
//! 2. tick / フォーカス復帰のたびに資格情報を再確認し、揃っていれば `revalidate()` を spawn
//! 3. `deactivate()` / `stop()` / drop でタイマーと購読を解放
//!
//! # 状態
//! - Inactive: 何も登録されていない（初期状態）
//! - Active: タイマー 1 本 + フォーカス購読 1 本

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::ports::{AuthCollaborator, FocusEvent, FocusSource};

/// 5 minutes.
pub const DEFAULT_REVALIDATION_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// tokio の interval は周期 0 を受け付けない
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevalidationSettings {
    /// Period of the recurring timer.
    pub interval: Duration,
    /// Also revalidate when the app regains focus.
    pub on_focus: bool,
}

impl Default for RevalidationSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REVALIDATION_INTERVAL,
            on_focus: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevalidatorState {
    Inactive,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Interval,
    Focus,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Interval => f.write_str("interval"),
            Trigger::Focus => f.write_str("focus"),
        }
    }
}

/// 登録中のタイマー + 購読（ループタスクが両方を所有する）
struct ActiveTask {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

/// Keeps the auth collaborator's permission cache fresh for the signed-in
/// actor.
///
/// Owns at most one background task per instance. Dropping the revalidator
/// tears the task down.
pub struct PermissionRevalidator {
    auth: Arc<dyn AuthCollaborator>,
    focus: Option<Arc<dyn FocusSource>>,
    settings: RevalidationSettings,
    task: Option<ActiveTask>,
}

impl PermissionRevalidator {
    pub fn new(
        auth: Arc<dyn AuthCollaborator>,
        focus: Option<Arc<dyn FocusSource>>,
        settings: RevalidationSettings,
    ) -> Self {
        Self {
            auth,
            focus,
            settings,
            task: None,
        }
    }

    pub fn settings(&self) -> RevalidationSettings {
        self.settings
    }

    pub fn state(&self) -> RevalidatorState {
        match &self.task {
            Some(task) if !task.join.is_finished() => RevalidatorState::Active,
            _ => RevalidatorState::Inactive,
        }
    }

    /// Enter Active if the current actor has complete credentials.
    ///
    /// Idempotent: calling it while Active registers nothing new.
    ///
    /// # Panics
    /// When called outside a tokio runtime (the loop is spawned onto it).
    pub fn activate(&mut self) -> RevalidatorState {
        if self.state() == RevalidatorState::Active {
            trace!("revalidator already active");
            return RevalidatorState::Active;
        }
        // 異常終了したタスクの残骸は捨てる
        self.task = None;

        if !self.auth.has_credentials() {
            debug!("no actor credentials; revalidator stays inactive");
            return RevalidatorState::Inactive;
        }

        // 購読は spawn 前に同期的に登録する
        let focus_rx = match (&self.focus, self.settings.on_focus) {
            (Some(focus), true) => Some(focus.subscribe()),
            _ => None,
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            interval_secs = self.settings.interval.as_secs(),
            on_focus = focus_rx.is_some(),
            "permission revalidation started"
        );
        let join = tokio::spawn(revalidation_loop(
            Arc::clone(&self.auth),
            focus_rx,
            self.settings.interval,
            shutdown_rx,
        ));
        self.task = Some(ActiveTask { shutdown_tx, join });
        RevalidatorState::Active
    }

    /// Leave Active: cancel the timer and drop the focus subscription.
    ///
    /// Safe to call any number of times, including when nothing is registered.
    pub fn deactivate(&mut self) {
        let Some(task) = self.task.take() else {
            trace!("revalidator already inactive");
            return;
        };
        // ignore send error: the loop may already be gone
        let _ = task.shutdown_tx.send(true);
        task.join.abort();
        info!("permission revalidation stopped");
    }

    /// Like `deactivate`, but waits until the loop task has released its
    /// timer and subscription.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = task.shutdown_tx.send(true);
        let _ = task.join.await;
        info!("permission revalidation stopped");
    }

    /// Reconcile with the current actor: Active iff credentials are present.
    pub fn sync(&mut self) -> RevalidatorState {
        if self.auth.has_credentials() {
            self.activate()
        } else {
            self.deactivate();
            RevalidatorState::Inactive
        }
    }
}

impl Drop for PermissionRevalidator {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn revalidation_loop(
    auth: Arc<dyn AuthCollaborator>,
    mut focus_rx: Option<broadcast::Receiver<FocusEvent>>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = period.max(MIN_INTERVAL);
    // 最初の tick は 1 周期後（登録直後には発火しない）
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let trigger = tokio::select! {
            // shutdown を最優先（保留中の tick / フォーカスより先に終了する）
            biased;
            // 送信側が drop された場合（Err）も終了
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => Trigger::Interval,
            event = next_focus(&mut focus_rx) => match event {
                Ok(FocusEvent) => Trigger::Focus,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(skipped, "coalescing missed focus events");
                    Trigger::Focus
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("focus source closed; continuing on interval only");
                    focus_rx = None;
                    continue;
                }
            },
        };
        dispatch(&auth, trigger);
    }
    trace!("revalidation loop exited");
}

async fn next_focus(
    rx: &mut Option<broadcast::Receiver<FocusEvent>>,
) -> Result<FocusEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// 発火時点で資格情報を再確認してから、結果を待たずに revalidate を起動
fn dispatch(auth: &Arc<dyn AuthCollaborator>, trigger: Trigger) {
    if !auth.has_credentials() {
        debug!(%trigger, "credentials cleared; skipping revalidation");
        return;
    }
    debug!(%trigger, "dispatching permission revalidation");
    let auth = Arc::clone(auth);
    tokio::spawn(async move {
        auth.revalidate().await;
    });
}
