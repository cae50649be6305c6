use crate::error::Result;
use crate::types::{ReportViewModel, TrendPoint};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Flat trend row for CSV and table rendering.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub label: String,
    #[serde(rename = "Received")]
    #[tabled(rename = "Received")]
    pub received: usize,
    #[serde(rename = "Resolved")]
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
}

impl From<&TrendPoint> for TrendRow {
    fn from(p: &TrendPoint) -> Self {
        TrendRow {
            key: p.bucket.key.clone(),
            label: p.bucket.label.clone(),
            received: p.received,
            resolved: p.resolved,
        }
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every table plus the full view model into `dir`. Returns the file names written.
pub fn export_all(dir: &Path, view: &ReportViewModel, max_rows: usize) -> Result<Vec<&'static str>> {
    std::fs::create_dir_all(dir)?;
    let trend: Vec<TrendRow> = view.trend.iter().map(TrendRow::from).collect();

    write_json(&dir.join("report.json"), view)?;
    write_csv(&dir.join("trend.csv"), &trend)?;
    write_csv(&dir.join("departments.csv"), &view.departments)?;
    write_csv(&dir.join("employees.csv"), &view.top_employees)?;
    write_csv(&dir.join("managers.csv"), &view.top_managers)?;
    write_csv(&dir.join("status.csv"), &view.status_distribution)?;
    std::fs::write(dir.join("report.md"), render_markdown(view, max_rows))?;

    Ok(vec![
        "report.json",
        "trend.csv",
        "departments.csv",
        "employees.csv",
        "managers.csv",
        "status.csv",
        "report.md",
    ])
}

fn table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)\n".to_string();
    }
    format!("{}\n", Table::new(slice).with(Style::markdown()))
}

/// Markdown view of a report; each table shows at most `max_rows` rows.
pub struct MarkdownReport<'a> {
    pub view: &'a ReportViewModel,
    pub max_rows: usize,
}

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let h = &view.headline;
        let k = &view.kpi;

        writeln!(f, "# Grievance Analytics Report")?;
        writeln!(
            f,
            "Window {} ending {} ({})\n",
            view.window,
            view.reference.format("%Y-%m-%d %H:%M UTC"),
            view.department_filter.as_deref().unwrap_or("all departments")
        )?;
        writeln!(
            f,
            "- Total: {}\n- Resolved: {}\n- Pending: {}\n- Resolution rate: {}%",
            h.total, h.resolved, h.pending, h.resolution_rate
        )?;

        let trend: Vec<TrendRow> = view.trend.iter().map(TrendRow::from).collect();
        // Most recent periods are the interesting ones.
        let skip = trend.len().saturating_sub(self.max_rows);
        write!(f, "\n## Trend\n\n{}", table_rows(&trend[skip..], self.max_rows))?;

        writeln!(f, "\n## Department Efficiency\n")?;
        writeln!(
            f,
            "Top performer: {} ({}%), needs attention: {} ({}%), average efficiency: {}%\n",
            k.top_performer.name,
            k.top_performer.efficiency,
            k.low_performer.name,
            k.low_performer.efficiency,
            k.avg_efficiency
        )?;
        f.write_str(&table_rows(&view.departments, self.max_rows))?;

        write!(f, "\n## Top Employees\n\n{}", table_rows(&view.top_employees, self.max_rows))?;
        write!(f, "\n## Top Resolvers\n\n{}", table_rows(&view.top_managers, self.max_rows))?;
        write!(
            f,
            "\n## Status Distribution\n\n{}",
            table_rows(&view.status_distribution, self.max_rows)
        )
    }
}

pub fn render_markdown(view: &ReportViewModel, max_rows: usize) -> String {
    MarkdownReport { view, max_rows }.to_string()
}
