//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **PermissionRevalidator**: 権限キャッシュの定期 / フォーカス復帰時の再検証

pub mod builder;
pub mod revalidator;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::revalidator::{
    DEFAULT_REVALIDATION_INTERVAL, PermissionRevalidator, RevalidationSettings, RevalidatorState,
};
