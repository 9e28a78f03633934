//! mvsat-core
//!
//! Core building blocks for the MVSAT billing admin.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（invoice status, badge, actor, permission）
//! - **ports**: 抽象化レイヤー（AuthCollaborator, FocusSource, Clock）
//! - **app**: アプリケーションロジック（builder, revalidator）
//! - **impls**: 実装（InMemoryAuth, FocusBroadcaster など開発用）
//! - **config**: `mvsat.toml` の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use self::config::MvsatConfig;
pub use self::error::MvsatError;
