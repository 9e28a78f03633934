//! Invoice status derivation.
//!
//! The status of an open invoice is never stored: it is derived from the due
//! date and "today". Everything here works on calendar dates, so DST
//! transitions and leap days need no special handling.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MvsatError;

/// Number of days before the due date during which an invoice counts as
/// "generated" (inclusive on both ends).
pub const GENERATED_WINDOW_DAYS: i64 = 5;

/// Default billing zone (UTC-03:00).
pub const DEFAULT_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Lifecycle status of an open invoice.
///
/// Serialized with the lower-case labels used by the billing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Due date has passed.
    #[serde(rename = "vencido")]
    Overdue,

    /// Due within the generated window (today counts).
    #[serde(rename = "gerado")]
    Generated,

    /// Due further out than the generated window.
    #[serde(rename = "em_dias")]
    OnTime,
}

impl InvoiceStatus {
    /// Canonical label (`vencido` / `gerado` / `em_dias`).
    pub fn as_label(self) -> &'static str {
        match self {
            InvoiceStatus::Overdue => "vencido",
            InvoiceStatus::Generated => "gerado",
            InvoiceStatus::OnTime => "em_dias",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for InvoiceStatus {
    type Err = MvsatError;

    /// Accepts any casing of the canonical labels ("Vencido", "EM DIAS", ...)
    /// and the English variant names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "vencido" | "overdue" => Ok(InvoiceStatus::Overdue),
            "gerado" | "generated" => Ok(InvoiceStatus::Generated),
            "em_dias" | "on_time" | "ontime" => Ok(InvoiceStatus::OnTime),
            _ => Err(MvsatError::UnknownStatus(s.to_string())),
        }
    }
}

/// Normalize a status label to its canonical form: trimmed, lower-case,
/// spaces and hyphens folded to underscores.
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Whole calendar days from `today` until `due_date` (negative once past due).
pub fn days_until_due(today: NaiveDate, due_date: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// Classify with the default policy (5-day window).
pub fn classify(today: NaiveDate, due_date: NaiveDate) -> InvoiceStatus {
    StatusPolicy::default().classify(today, due_date)
}

/// Window and time zone used to derive invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    generated_window_days: i64,
    zone: FixedOffset,
}

impl StatusPolicy {
    pub fn new(generated_window_days: i64, zone: FixedOffset) -> Result<Self, MvsatError> {
        if generated_window_days < 0 {
            return Err(MvsatError::InvalidWindow(generated_window_days));
        }
        Ok(Self {
            generated_window_days,
            zone,
        })
    }

    pub fn generated_window_days(&self) -> i64 {
        self.generated_window_days
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Decision rule, first match wins:
    /// - `diff < 0` => Overdue
    /// - `0 <= diff <= window` => Generated
    /// - otherwise => OnTime
    pub fn classify(&self, today: NaiveDate, due_date: NaiveDate) -> InvoiceStatus {
        let diff = days_until_due(today, due_date);
        if diff < 0 {
            InvoiceStatus::Overdue
        } else if diff <= self.generated_window_days {
            InvoiceStatus::Generated
        } else {
            InvoiceStatus::OnTime
        }
    }

    /// Classify two instants after truncating both to calendar dates in the
    /// policy's zone. The hour component of either input never matters.
    pub fn classify_at(&self, now: DateTime<Utc>, due_at: DateTime<Utc>) -> InvoiceStatus {
        self.classify(self.calendar_date(now), self.calendar_date(due_at))
    }

    /// Calendar date of `instant` as seen in the policy's zone.
    pub fn calendar_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.zone).date_naive()
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            generated_window_days: GENERATED_WINDOW_DAYS,
            zone: default_zone(),
        }
    }
}

pub(crate) fn default_zone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Input of the classifier: an invoice's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStatusInput {
    pub due_date: NaiveDate,
}

impl InvoiceStatusInput {
    pub fn new(due_date: NaiveDate) -> Self {
        Self { due_date }
    }

    pub fn status_on(&self, today: NaiveDate) -> InvoiceStatus {
        classify(today, self.due_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::overdue(date(2024, 3, 9), InvoiceStatus::Overdue)]
    #[case::due_today(date(2024, 3, 10), InvoiceStatus::Generated)]
    #[case::last_generated_day(date(2024, 3, 15), InvoiceStatus::Generated)]
    #[case::first_on_time_day(date(2024, 3, 16), InvoiceStatus::OnTime)]
    #[case::long_overdue(date(2023, 12, 1), InvoiceStatus::Overdue)]
    fn classify_examples(#[case] due: NaiveDate, #[case] expected: InvoiceStatus) {
        assert_eq!(classify(date(2024, 3, 10), due), expected);
    }

    #[rstest]
    #[case::leap_day(date(2024, 2, 29))]
    #[case::year_end(date(2024, 12, 31))]
    #[case::dst_start_br(date(2018, 11, 4))]
    #[case::dst_start_us(date(2024, 3, 10))]
    fn window_boundaries_hold_for_any_today(#[case] today: NaiveDate) {
        assert_eq!(classify(today, today - Duration::days(1)), InvoiceStatus::Overdue);
        assert_eq!(classify(today, today), InvoiceStatus::Generated);
        assert_eq!(classify(today, today + Duration::days(5)), InvoiceStatus::Generated);
        assert_eq!(classify(today, today + Duration::days(6)), InvoiceStatus::OnTime);
    }

    #[test]
    fn status_never_regresses_as_due_date_moves_forward() {
        let today = date(2024, 3, 10);
        let mut prev = InvoiceStatus::Overdue;
        for offset in -40..40 {
            let status = classify(today, today + Duration::days(offset));
            // Overdue < Generated < OnTime (declaration order)
            assert!(status >= prev, "regressed at offset {offset}: {prev:?} -> {status:?}");
            prev = status;
        }
        assert_eq!(prev, InvoiceStatus::OnTime);
    }

    #[test]
    fn classify_at_ignores_time_of_day() {
        let policy = StatusPolicy::default();
        let zone = policy.zone();
        let due = zone.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap().with_timezone(&Utc);
        for hour in 0..24 {
            let now = zone
                .with_ymd_and_hms(2024, 3, 10, hour, 59, 59)
                .unwrap()
                .with_timezone(&Utc);
            assert_eq!(policy.classify_at(now, due), InvoiceStatus::Generated);
        }

        // Late evening in the zone is already the next day in UTC; the zone wins.
        let late = zone.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap().with_timezone(&Utc);
        assert_eq!(late.date_naive(), date(2024, 3, 10));
        assert_eq!(policy.calendar_date(late), date(2024, 3, 9));
    }

    #[test]
    fn classify_at_ignores_due_hour() {
        let policy = StatusPolicy::default();
        let zone = policy.zone();
        let now = zone.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap().with_timezone(&Utc);
        for hour in 0..24 {
            let last_generated = zone
                .with_ymd_and_hms(2024, 3, 15, hour, 30, 0)
                .unwrap()
                .with_timezone(&Utc);
            assert_eq!(policy.classify_at(now, last_generated), InvoiceStatus::Generated, "hour {hour}");

            let first_on_time = zone
                .with_ymd_and_hms(2024, 3, 16, hour, 30, 0)
                .unwrap()
                .with_timezone(&Utc);
            assert_eq!(policy.classify_at(now, first_on_time), InvoiceStatus::OnTime, "hour {hour}");
        }

        // 22:00 (-03:00) on the 15th is the 16th in UTC, but still the 15th in the zone.
        let due_late = zone.with_ymd_and_hms(2024, 3, 15, 22, 0, 0).unwrap().with_timezone(&Utc);
        assert_eq!(due_late.date_naive(), date(2024, 3, 16));
        assert_eq!(policy.classify_at(now, due_late), InvoiceStatus::Generated);
    }

    #[test]
    fn custom_window() {
        let policy = StatusPolicy::new(0, default_zone()).unwrap();
        let today = date(2024, 3, 10);
        assert_eq!(policy.classify(today, today), InvoiceStatus::Generated);
        assert_eq!(policy.classify(today, date(2024, 3, 11)), InvoiceStatus::OnTime);
    }

    #[test]
    fn negative_window_is_rejected() {
        let err = StatusPolicy::new(-1, default_zone()).unwrap_err();
        assert!(matches!(err, MvsatError::InvalidWindow(-1)));
    }

    #[rstest]
    #[case("vencido", InvoiceStatus::Overdue)]
    #[case("Vencido", InvoiceStatus::Overdue)]
    #[case(" GERADO ", InvoiceStatus::Generated)]
    #[case("em_dias", InvoiceStatus::OnTime)]
    #[case("Em dias", InvoiceStatus::OnTime)]
    #[case("em-dias", InvoiceStatus::OnTime)]
    #[case("on_time", InvoiceStatus::OnTime)]
    fn parse_normalizes_casing(#[case] raw: &str, #[case] expected: InvoiceStatus) {
        assert_eq!(raw.parse::<InvoiceStatus>().unwrap(), expected);
    }

    #[test]
    fn parse_rejects_unknown_label() {
        let err = "pago".parse::<InvoiceStatus>().unwrap_err();
        assert!(err.to_string().contains("pago"));
    }

    #[test]
    fn status_serializes_as_backend_labels() {
        let s = serde_json::to_string(&InvoiceStatus::OnTime).unwrap();
        assert_eq!(s, "\"em_dias\"");
        let back: InvoiceStatus = serde_json::from_str("\"vencido\"").unwrap();
        assert_eq!(back, InvoiceStatus::Overdue);
    }

    #[test]
    fn input_status_on() {
        let input = InvoiceStatusInput::new(date(2024, 3, 16));
        assert_eq!(input.status_on(date(2024, 3, 10)), InvoiceStatus::OnTime);
        assert_eq!(input.status_on(date(2024, 3, 17)), InvoiceStatus::Overdue);
    }
}
