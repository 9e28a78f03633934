//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 認証コンテキスト（Firebase / Postgres BaaS など）、フォーカスシグナル、
//! 時計への依存はすべてここを経由し、グローバル状態を持ちません。

pub mod auth;
pub mod clock;
pub mod focus;

// 主要な trait を再エクスポート
pub use self::auth::AuthCollaborator;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::focus::{FocusEvent, FocusSource};
