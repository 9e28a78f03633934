//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! グローバルな認証コンテキスト / 権限キャッシュを持たず、
//! 必要な依存（Clock, AuthCollaborator, FocusSource, 設定）を App に明示的に注入する。
//!
//! # Fail-fast 設計
//! - 認証コンテキストが無ければ build() 失敗
//! - フォーカス再検証が有効なのに FocusSource が無ければ build() 失敗
//! - 設定値の検証も build() 時に行う

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use super::revalidator::{PermissionRevalidator, RevalidationSettings};
use crate::config::MvsatConfig;
use crate::domain::{InvoiceStatus, PermissionSnapshot, StatusPolicy};
use crate::error::MvsatError;
use crate::ports::{AuthCollaborator, Clock, FocusSource, SystemClock};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .config(MvsatConfig::load_from(path)?)
///     .auth(auth)
///     .focus(focus)
///     .build()?;
/// ```
pub struct AppBuilder {
    config: MvsatConfig,
    clock: Arc<dyn Clock>,
    auth: Option<Arc<dyn AuthCollaborator>>,
    focus: Option<Arc<dyn FocusSource>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no auth collaborator configured")]
    MissingAuth,

    #[error("focus revalidation is enabled but no focus source was provided")]
    MissingFocusSource,

    #[error(transparent)]
    Config(#[from] MvsatError),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: MvsatConfig::default(),
            clock: Arc::new(SystemClock),
            auth: None,
            focus: None,
        }
    }

    pub fn config(mut self, config: MvsatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthCollaborator>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn focus(mut self, focus: Arc<dyn FocusSource>) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let policy = self.config.status_policy()?;
        let revalidation = self.config.revalidation_settings()?;
        let auth = self.auth.ok_or(BuildError::MissingAuth)?;
        if revalidation.on_focus && self.focus.is_none() {
            return Err(BuildError::MissingFocusSource);
        }
        Ok(App {
            clock: self.clock,
            auth,
            focus: self.focus,
            policy,
            revalidation,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は注入済みのコンテキスト
///
/// 請求ステータスの計算と権限チェック、Revalidator の生成を提供する。
pub struct App {
    clock: Arc<dyn Clock>,
    auth: Arc<dyn AuthCollaborator>,
    focus: Option<Arc<dyn FocusSource>>,
    policy: StatusPolicy,
    revalidation: RevalidationSettings,
}

impl App {
    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    pub fn auth(&self) -> &Arc<dyn AuthCollaborator> {
        &self.auth
    }

    /// 請求ゾーンでの「今日」
    pub fn today(&self) -> NaiveDate {
        self.clock.today(&self.policy.zone())
    }

    pub fn invoice_status(&self, due_date: NaiveDate) -> InvoiceStatus {
        self.policy.classify(self.today(), due_date)
    }

    pub fn invoice_status_at(&self, due_at: DateTime<Utc>) -> InvoiceStatus {
        self.policy.classify_at(self.clock.now(), due_at)
    }

    /// 権限チェック（キャッシュ済みスナップショットを読むだけ）
    pub fn can(&self, key: &str) -> bool {
        self.auth.permissions().allows(key)
    }

    pub fn permissions(&self) -> PermissionSnapshot {
        self.auth.permissions()
    }

    /// このアプリのスコープに紐づく Revalidator（Inactive で返す）
    pub fn revalidator(&self) -> PermissionRevalidator {
        PermissionRevalidator::new(Arc::clone(&self.auth), self.focus.clone(), self.revalidation)
    }
}
