//! Domain model (invoice status, badges, actors, permissions).
//!
//! 外部の状態（DB, 時計, UI）には依存しない。「今日」は常に呼び出し側から渡す。

pub mod actor;
pub mod badge;
pub mod invoice;

pub use self::actor::{ActorCredential, CapabilityKey, PermissionSnapshot};
pub use self::badge::{BadgeVariant, StatusBadge, display};
pub use self::invoice::{
    GENERATED_WINDOW_DAYS, InvoiceStatus, InvoiceStatusInput, StatusPolicy, classify,
    days_until_due, normalize_label,
};
