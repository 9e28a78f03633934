//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryAuth**: 開発用の認証コンテキスト
//! - **FocusBroadcaster**: broadcast チャネルによるフォーカスシグナル
//!
//! 本番用の実装（Firebase / Postgres BaaS）はこのクレートの外に置きます。

pub mod focus_broadcast;
pub mod memory_auth;

// 主要な型を再エクスポート
pub use self::focus_broadcast::FocusBroadcaster;
pub use self::memory_auth::InMemoryAuth;
