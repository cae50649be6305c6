//! Record normalization.
//!
//! Maps loosely-typed raw records onto [`NormalizedRecord`]. Nothing is ever
//! dropped: missing names get fixed fallbacks and a bad timestamp only makes
//! the record trend-ineligible.

use crate::types::{NormalizedRecord, RawRecord, Status};
use crate::util::parse_timestamp;
use chrono::TimeZone;
use tracing::debug;

pub const DEFAULT_DEPARTMENT: &str = "General";
pub const DEFAULT_EMPLOYEE: &str = "Unknown";
pub const DEFAULT_RESOLVER: &str = "System Admin";

/// Fold a free-form status into the closed set. Unknown or missing is `Pending`.
pub fn normalize_status(raw: Option<&str>) -> Status {
    // Case, whitespace, `_` and `-` never distinguish statuses.
    let folded: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    match folded.as_str() {
        "inprogress" => Status::InProgress,
        "resolved" => Status::Resolved,
        _ => Status::Pending,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn normalize_record<Tz: TimeZone>(raw: &RawRecord, tz: &Tz) -> NormalizedRecord {
    let resolver = non_empty(raw.resolved_by.as_deref())
        .or_else(|| non_empty(raw.manager_name.as_deref()))
        .unwrap_or(DEFAULT_RESOLVER);

    NormalizedRecord {
        id: raw.id,
        department_name: non_empty(raw.department_name.as_deref())
            .unwrap_or(DEFAULT_DEPARTMENT)
            .to_string(),
        status: normalize_status(raw.status.as_deref()),
        employee_name: non_empty(raw.employee_name.as_deref())
            .unwrap_or(DEFAULT_EMPLOYEE)
            .to_string(),
        resolver_name: resolver.to_string(),
        created_at: parse_timestamp(raw.created_at.as_ref(), tz),
    }
}

pub fn normalize_all<Tz: TimeZone>(raw: &[RawRecord], tz: &Tz) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = raw.iter().map(|r| normalize_record(r, tz)).collect();
    let ineligible = records.iter().filter(|r| !r.trend_eligible()).count();
    if ineligible > 0 {
        debug!(ineligible, total = records.len(), "records with unparseable createdAt excluded from trend");
    }
    records
}
