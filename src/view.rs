//! View model assembly.
//!
//! [`assemble_in`] is the whole engine: raw records in, one immutable
//! [`ReportViewModel`] out. It is pure. Identical inputs (records, window,
//! filter, reference instant and zone) give identical output.

use crate::buckets::{generate_buckets, TrendWindow};
use crate::normalize::normalize_all;
use crate::reports;
use crate::types::{RawRecord, ReportViewModel};
use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::debug;

/// Assemble against the machine's local calendar. `reference` defaults to now.
pub fn assemble(
    records: &[RawRecord],
    window: TrendWindow,
    department_filter: Option<&str>,
    reference: Option<DateTime<Utc>>,
) -> ReportViewModel {
    assemble_in(
        records,
        window,
        department_filter,
        reference.unwrap_or_else(Utc::now),
        &Local,
    )
}

pub fn assemble_in<Tz: TimeZone>(
    records: &[RawRecord],
    window: TrendWindow,
    department_filter: Option<&str>,
    reference: DateTime<Utc>,
    tz: &Tz,
) -> ReportViewModel {
    let data = normalize_all(records, tz);

    let reference_date = reference.with_timezone(tz).date_naive();
    let granularity = window.granularity(reference_date);
    let buckets = generate_buckets(granularity, reference_date);
    let trend = reports::generate_trend(&data, &buckets, granularity, tz);

    // KPIs always see every department; the filter only narrows the list.
    let breakdown = reports::generate_department_breakdown(&data);
    let kpi = reports::generate_kpis(&breakdown);
    let departments = reports::filter_departments(breakdown, department_filter);

    debug!(
        records = data.len(),
        window = %window,
        buckets = trend.len(),
        departments = departments.len(),
        "assembled report view"
    );

    ReportViewModel {
        window,
        reference,
        department_filter: department_filter.map(str::to_string),
        headline: reports::generate_headline(&data),
        trend,
        departments,
        department_options: reports::department_options(&data),
        kpi,
        top_employees: reports::generate_employee_leaderboard(&data),
        top_managers: reports::generate_manager_leaderboard(&data),
        status_distribution: reports::generate_status_distribution(&data),
    }
}
