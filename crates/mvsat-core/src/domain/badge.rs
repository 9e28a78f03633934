//! Presentation mapping for billing status labels.

use serde::{Deserialize, Serialize};

use super::invoice::{InvoiceStatus, normalize_label};

/// Visual variant of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Default,
    Success,
    Warning,
    Destructive,
    Secondary,
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub variant: BadgeVariant,
}

impl StatusBadge {
    fn new(label: impl Into<String>, variant: BadgeVariant) -> Self {
        Self {
            label: label.into(),
            variant,
        }
    }
}

/// Map any status label to a badge.
///
/// Total: labels outside the table come back upper-cased with
/// `BadgeVariant::Default` instead of failing.
pub fn display(status: &str) -> StatusBadge {
    match normalize_label(status).as_str() {
        "vencido" => StatusBadge::new("Vencido", BadgeVariant::Destructive),
        "gerado" => StatusBadge::new("Gerado", BadgeVariant::Warning),
        "em_dias" => StatusBadge::new("Em dias", BadgeVariant::Success),
        "pago" => StatusBadge::new("Pago", BadgeVariant::Success),
        "pendente" => StatusBadge::new("Pendente", BadgeVariant::Secondary),
        "cancelado" => StatusBadge::new("Cancelado", BadgeVariant::Outline),
        _ => StatusBadge::new(status.trim().to_uppercase(), BadgeVariant::Default),
    }
}

impl InvoiceStatus {
    pub fn badge(self) -> StatusBadge {
        display(self.as_label())
    }
}
