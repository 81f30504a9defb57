//! Lifecycle status of a portaria, derived from its fields.
//!
//! Status is never stored. [`status`] recomputes it from the record and an
//! explicit "today", so the result always reflects the current data and the
//! evaluation date.
//!
//! # Decision order
//!
//! First match wins:
//!
//! 1. Type mentions revocation and a revocation link is present → `Revoked`
//! 2. No expiration date → `MissingDate`
//! 3. Expiration date not strict `DD/MM/YYYY` → `InvalidFormat`
//! 4. Expires after today with rectifications on record → `RectifiedCurrent`
//! 5. Expires after today → `Current`
//! 6. Otherwise → `Expired` (a portaria expiring today is expired)

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{date_from_parts, split_br_date};
use crate::normalize::{is_blank, normalize, normalize_opt};
use crate::record::Record;

/// Normalised keyword that marks a revocation in the `tipo` column.
const REVOCATION_KEYWORD: &str = "revogacao";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Revoked,
    MissingDate,
    InvalidFormat,
    RectifiedCurrent,
    Current,
    Expired,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Revoked,
        Status::MissingDate,
        Status::InvalidFormat,
        Status::RectifiedCurrent,
        Status::Current,
        Status::Expired,
    ];

    /// Stable machine name (`snake_case`), also used as config key.
    pub fn key(self) -> &'static str {
        match self {
            Status::Revoked => "revoked",
            Status::MissingDate => "missing_date",
            Status::InvalidFormat => "invalid_format",
            Status::RectifiedCurrent => "rectified_current",
            Status::Current => "current",
            Status::Expired => "expired",
        }
    }

    /// Parse user input against names, configured labels and historical
    /// spellings. Comparison is accent- and case-insensitive.
    pub fn parse_with(input: &str, labels: &StatusLabels) -> Result<Status, StatusParseError> {
        let needle = normalize(input);
        Status::ALL
            .into_iter()
            .find(|&s| {
                normalize(s.key()) == needle
                    || normalize(&format!("{s:?}")) == needle
                    || normalize(labels.label(s)) == needle
                    || s.aliases().iter().any(|a| normalize(a) == needle)
            })
            .ok_or_else(|| StatusParseError(input.to_string()))
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Status::Revoked => &["Revogado", "Revogada"],
            Status::MissingDate => &["Data não informada", "sem data"],
            Status::InvalidFormat => &["Formato inválido"],
            Status::RectifiedCurrent => &["Vigente (retificada)", "Retificada"],
            Status::Current => &["Vigente"],
            Status::Expired => &["Expirada", "Expirado"],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(StatusLabels::default().label(*self))
    }
}

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::parse_with(s, &StatusLabels::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status {0:?}")]
pub struct StatusParseError(pub String);

/// Display labels per status. Missing entries in a config file fall back to
/// the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusLabels {
    pub revoked: String,
    pub missing_date: String,
    pub invalid_format: String,
    pub rectified_current: String,
    pub current: String,
    pub expired: String,
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self {
            revoked: "Revogado".into(),
            missing_date: "Data não informada".into(),
            invalid_format: "Formato inválido".into(),
            rectified_current: "Vigente (retificada)".into(),
            current: "Vigente".into(),
            expired: "Expirada".into(),
        }
    }
}

impl StatusLabels {
    pub fn label(&self, status: Status) -> &str {
        match status {
            Status::Revoked => &self.revoked,
            Status::MissingDate => &self.missing_date,
            Status::InvalidFormat => &self.invalid_format,
            Status::RectifiedCurrent => &self.rectified_current,
            Status::Current => &self.current,
            Status::Expired => &self.expired,
        }
    }
}

/// Derive the status of `record` as of `today`.
pub fn status(record: &Record, today: NaiveDate) -> Status {
    if is_revoked(record) {
        return Status::Revoked;
    }

    let expiration = match record.expiration_date() {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Status::MissingDate,
    };

    let Some(expires) = split_br_date(expiration)
        .and_then(|(day, month, year)| date_from_parts(day, month, year))
    else {
        return Status::InvalidFormat;
    };

    if expires > today {
        if is_rectified(record) {
            Status::RectifiedCurrent
        } else {
            Status::Current
        }
    } else {
        Status::Expired
    }
}

fn is_revoked(record: &Record) -> bool {
    normalize_opt(record.kind()).contains(REVOCATION_KEYWORD)
        && !is_blank(record.revocation_link())
}

fn is_rectified(record: &Record) -> bool {
    record.amendment_count().is_some_and(|n| n > 0) && !is_blank(record.last_amendment_link())
}
