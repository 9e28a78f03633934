//! Configuration (`mvsat.toml`).
//!
//! ```toml
//! [billing]
//! generated_window_days = 5
//! utc_offset = "-03:00"
//!
//! [revalidation]
//! interval_secs = 300
//! on_focus = true
//! ```
//!
//! Every field is optional; missing ones take the defaults above.

use std::path::Path;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::app::revalidator::{DEFAULT_REVALIDATION_INTERVAL, RevalidationSettings};
use crate::domain::invoice::{GENERATED_WINDOW_DAYS, StatusPolicy};
use crate::error::MvsatError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvsatConfig {
    pub billing: BillingConfig,
    pub revalidation: RevalidationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub generated_window_days: i64,
    /// Fixed offset of the billing zone, e.g. "-03:00".
    pub utc_offset: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            generated_window_days: GENERATED_WINDOW_DAYS,
            utc_offset: "-03:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidationConfig {
    pub interval_secs: u64,
    pub on_focus: bool,
}

impl Default for RevalidationConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REVALIDATION_INTERVAL.as_secs(),
            on_focus: true,
        }
    }
}

impl MvsatConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, MvsatError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, MvsatError> {
        let s = std::fs::read_to_string(path).map_err(|source| MvsatError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn status_policy(&self) -> Result<StatusPolicy, MvsatError> {
        let zone = parse_utc_offset(&self.billing.utc_offset)?;
        StatusPolicy::new(self.billing.generated_window_days, zone)
    }

    pub fn revalidation_settings(&self) -> Result<RevalidationSettings, MvsatError> {
        if self.revalidation.interval_secs == 0 {
            return Err(MvsatError::InvalidInterval);
        }
        Ok(RevalidationSettings {
            interval: Duration::from_secs(self.revalidation.interval_secs),
            on_focus: self.revalidation.on_focus,
        })
    }
}

/// Parse "+HH:MM" / "-HH:MM" (also "Z" and "UTC").
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, MvsatError> {
    let invalid = || MvsatError::InvalidUtcOffset(raw.to_string());
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = MvsatConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, MvsatConfig::default());
        assert_eq!(cfg.status_policy().unwrap(), StatusPolicy::default());
        assert_eq!(cfg.revalidation_settings().unwrap(), RevalidationSettings::default());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let cfg = MvsatConfig::from_toml_str(
            r#"
            [billing]
            utc_offset = "+00:00"

            [revalidation]
            interval_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.billing.generated_window_days, 5);
        assert_eq!(cfg.status_policy().unwrap().zone().local_minus_utc(), 0);

        let settings = cfg.revalidation_settings().unwrap();
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert!(settings.on_focus);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = MvsatConfig::from_toml_str("[revalidation]\ninterval_secs = 0").unwrap();
        assert!(matches!(cfg.revalidation_settings(), Err(MvsatError::InvalidInterval)));
    }

    #[test]
    fn negative_window_is_rejected() {
        let cfg = MvsatConfig::from_toml_str("[billing]\ngenerated_window_days = -2").unwrap();
        assert!(matches!(cfg.status_policy(), Err(MvsatError::InvalidWindow(-2))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = MvsatConfig::from_toml_str("[billing\n").unwrap_err();
        assert!(matches!(err, MvsatError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MvsatConfig::load_from(Path::new("/nonexistent/mvsat.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mvsat.toml"));
    }

    #[rstest]
    #[case("-03:00", -3 * 3600)]
    #[case("+05:30", 5 * 3600 + 30 * 60)]
    #[case("+00:00", 0)]
    #[case("Z", 0)]
    #[case("utc", 0)]
    fn offsets(#[case] raw: &str, #[case] secs: i32) {
        assert_eq!(parse_utc_offset(raw).unwrap().local_minus_utc(), secs);
    }

    #[rstest]
    #[case("")]
    #[case("03:00")]
    #[case("-3")]
    #[case("+24:00")]
    #[case("-03:75")]
    #[case("America/Sao_Paulo")]
    fn bad_offsets(#[case] raw: &str) {
        assert!(matches!(parse_utc_offset(raw), Err(MvsatError::InvalidUtcOffset(_))));
    }
}
