use crate::buckets::TrendWindow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tabled::Tabled;

/// `createdAt` as it arrives from the API: usually text, sometimes epoch millis,
/// occasionally something else entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
    Other(Value),
}

/// Scalars become text; null, arrays and objects become `None`.
fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Integers, integral floats and numeric strings are ids; anything else is 0.
fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => crate::util::parse_i64_safe(Some(s.as_str())).unwrap_or(0),
        _ => 0,
    })
}

/// A grievance exactly as fetched. Nothing here is trusted, and no field
/// can fail decoding of an object-shaped record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub resolved_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub manager_name: Option<String>,
}

/// CSV exports carry every column as optional text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvRow {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub department_name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub employee_name: Option<String>,
    pub resolved_by: Option<String>,
    pub manager_name: Option<String>,
}

impl From<CsvRow> for RawRecord {
    fn from(row: CsvRow) -> Self {
        RawRecord {
            id: crate::util::parse_i64_safe(row.id.as_deref()).unwrap_or(0),
            title: row.title,
            description: row.description,
            department_name: row.department_name,
            status: row.status,
            created_at: row.created_at.map(RawTimestamp::Text),
            employee_name: row.employee_name,
            resolved_by: row.resolved_by,
            manager_name: row.manager_name,
        }
    }
}

/// The closed status set every raw status string collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Resolved];

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub id: i64,
    pub department_name: String,
    pub status: Status,
    pub employee_name: String,
    pub resolver_name: String,
    /// `None` marks an unparseable timestamp; such records skip the trend only.
    pub created_at: Option<DateTime<Utc>>,
}

impl NormalizedRecord {
    pub fn trend_eligible(&self) -> bool {
        self.created_at.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.status == Status::Resolved
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub key: String,
    pub label: String,
    /// First local calendar day covered by the bucket.
    pub start: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub bucket: TimeBucket,
    pub received: usize,
    pub resolved: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdown {
    #[tabled(rename = "Department")]
    pub name: String,
    #[tabled(rename = "Total")]
    pub total: usize,
    #[tabled(rename = "Pending")]
    pub pending: usize,
    #[tabled(rename = "InProgress")]
    pub in_progress: usize,
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
    #[tabled(rename = "Efficiency")]
    pub efficiency: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Performer {
    pub name: String,
    pub efficiency: u32,
}

impl Performer {
    pub fn none() -> Self {
        Performer { name: "N/A".to_string(), efficiency: 0 }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub top_performer: Performer,
    pub low_performer: Performer,
    pub avg_efficiency: u32,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct StatusDistributionEntry {
    #[tabled(rename = "Status")]
    pub status: Status,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Percent")]
    pub percent: u32,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineStats {
    pub total: usize,
    pub resolved: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolution_rate: u32,
}

/// Everything a renderer or exporter needs, computed in one call.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportViewModel {
    pub window: TrendWindow,
    pub reference: DateTime<Utc>,
    pub department_filter: Option<String>,
    pub headline: HeadlineStats,
    pub trend: Vec<TrendPoint>,
    pub departments: Vec<DepartmentBreakdown>,
    pub department_options: Vec<String>,
    pub kpi: KpiSummary,
    pub top_employees: Vec<LeaderboardEntry>,
    pub top_managers: Vec<LeaderboardEntry>,
    pub status_distribution: Vec<StatusDistributionEntry>,
}
