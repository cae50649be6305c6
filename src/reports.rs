use crate::buckets::Granularity;
use crate::types::{
    DepartmentBreakdown, HeadlineStats, KpiSummary, LeaderboardEntry, NormalizedRecord,
    Performer, Status, StatusDistributionEntry, TimeBucket, TrendPoint,
};
use crate::util::{local_date, percent, rounded_mean};
use chrono::TimeZone;
use std::collections::{HashMap, HashSet};

pub const LEADERBOARD_SIZE: usize = 5;

/// Count received/resolved per bucket. Records without a timestamp or
/// outside every bucket are skipped.
pub fn generate_trend<Tz: TimeZone>(
    data: &[NormalizedRecord],
    buckets: &[TimeBucket],
    granularity: Granularity,
    tz: &Tz,
) -> Vec<TrendPoint> {
    let index: HashMap<&str, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (b.key.as_str(), i))
        .collect();
    let mut counts = vec![(0usize, 0usize); buckets.len()];

    for r in data {
        let Some(created_at) = r.created_at else { continue };
        let key = granularity.key_for(local_date(&created_at, tz));
        if let Some(&i) = index.get(key.as_str()) {
            counts[i].0 += 1;
            if r.is_resolved() {
                counts[i].1 += 1;
            }
        }
    }

    buckets
        .iter()
        .zip(counts)
        .map(|(bucket, (received, resolved))| TrendPoint {
            bucket: bucket.clone(),
            received,
            resolved,
        })
        .collect()
}

/// Per-department tallies in first-seen order, unfiltered.
pub fn generate_department_breakdown(data: &[NormalizedRecord]) -> Vec<DepartmentBreakdown> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<DepartmentBreakdown> = Vec::new();
    for r in data {
        let i = *index.entry(r.department_name.as_str()).or_insert_with(|| {
            rows.push(DepartmentBreakdown {
                name: r.department_name.clone(),
                total: 0,
                pending: 0,
                in_progress: 0,
                resolved: 0,
                efficiency: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[i];
        row.total += 1;
        match r.status {
            Status::Pending => row.pending += 1,
            Status::Resolved => row.resolved += 1,
            Status::InProgress => row.in_progress += 1,
        }
    }
    for row in &mut rows {
        row.efficiency = percent(row.resolved, row.total);
    }
    rows
}

/// KPIs over the full department set. Ties go to the alphabetically first name.
pub fn generate_kpis(departments: &[DepartmentBreakdown]) -> KpiSummary {
    let by_name = |a: &DepartmentBreakdown, b: &DepartmentBreakdown| a.name.cmp(&b.name);
    let top = departments
        .iter()
        .min_by(|a, b| b.efficiency.cmp(&a.efficiency).then_with(|| by_name(a, b)));
    let low = departments
        .iter()
        .min_by(|a, b| a.efficiency.cmp(&b.efficiency).then_with(|| by_name(a, b)));
    let to_performer = |d: &DepartmentBreakdown| Performer {
        name: d.name.clone(),
        efficiency: d.efficiency,
    };
    let sum: u64 = departments.iter().map(|d| d.efficiency as u64).sum();

    KpiSummary {
        top_performer: top.map(to_performer).unwrap_or_else(Performer::none),
        low_performer: low.map(to_performer).unwrap_or_else(Performer::none),
        avg_efficiency: rounded_mean(sum, departments.len()),
    }
}

/// Narrow the breakdown to one department (if asked) and order it for display:
/// largest total first, ties keep first-seen order.
pub fn filter_departments(
    mut departments: Vec<DepartmentBreakdown>,
    filter: Option<&str>,
) -> Vec<DepartmentBreakdown> {
    if let Some(name) = filter {
        departments.retain(|d| d.name == name);
    }
    departments.sort_by(|a, b| b.total.cmp(&a.total));
    departments
}

/// Distinct department names in first-seen order.
pub fn department_options(data: &[NormalizedRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for r in data {
        if seen.insert(r.department_name.as_str()) {
            names.push(r.department_name.clone());
        }
    }
    names
}

fn rank_by_count<'a>(names: impl Iterator<Item = &'a str>) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    for name in names {
        let i = *index.entry(name).or_insert_with(|| {
            entries.push(LeaderboardEntry { name: name.to_string(), count: 0 });
            entries.len() - 1
        });
        entries[i].count += 1;
    }
    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

/// Top submitters by number of records.
pub fn generate_employee_leaderboard(data: &[NormalizedRecord]) -> Vec<LeaderboardEntry> {
    rank_by_count(data.iter().map(|r| r.employee_name.as_str()))
}

/// Top resolvers by number of resolved records.
pub fn generate_manager_leaderboard(data: &[NormalizedRecord]) -> Vec<LeaderboardEntry> {
    rank_by_count(
        data.iter()
            .filter(|r| r.is_resolved())
            .map(|r| r.resolver_name.as_str()),
    )
}

fn status_counts(data: &[NormalizedRecord]) -> (usize, usize, usize) {
    let pending = data.iter().filter(|r| r.status == Status::Pending).count();
    let resolved = data.iter().filter(|r| r.is_resolved()).count();
    (pending, data.len() - pending - resolved, resolved)
}

pub fn generate_status_distribution(data: &[NormalizedRecord]) -> Vec<StatusDistributionEntry> {
    let total = data.len();
    let (pending, in_progress, resolved) = status_counts(data);
    Status::ALL
        .iter()
        .map(|&status| {
            let count = match status {
                Status::Pending => pending,
                Status::InProgress => in_progress,
                Status::Resolved => resolved,
            };
            StatusDistributionEntry { status, count, percent: percent(count, total) }
        })
        .collect()
}

pub fn generate_headline(data: &[NormalizedRecord]) -> HeadlineStats {
    let (pending, in_progress, resolved) = status_counts(data);
    HeadlineStats {
        total: data.len(),
        resolved,
        pending,
        in_progress,
        resolution_rate: percent(resolved, data.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::generate_buckets;
    use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

    fn rec(dept: &str, status: Status, created_at: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            id: 0,
            department_name: dept.to_string(),
            status,
            employee_name: "Unknown".to_string(),
            resolver_name: "System Admin".to_string(),
            created_at: created_at.map(|s| s.parse::<DateTime<Utc>>().unwrap()),
        }
    }

    fn by_name(name: &str, status: Status, resolver: &str) -> NormalizedRecord {
        NormalizedRecord {
            employee_name: name.to_string(),
            resolver_name: resolver.to_string(),
            ..rec("General", status, None)
        }
    }

    #[test]
    fn trend_counts_received_and_resolved() {
        let data = vec![
            rec("IT", Status::Resolved, Some("2024-03-01T10:00:00Z")),
            rec("IT", Status::Pending, Some("2024-03-01T11:00:00Z")),
            rec("HR", Status::Resolved, Some("2024-03-03T09:00:00Z")),
            rec("HR", Status::Resolved, None),
            rec("HR", Status::Resolved, Some("2023-01-01T09:00:00Z")),
        ];
        let reference = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let g = Granularity::Daily(7);
        let trend = generate_trend(&data, &generate_buckets(g, reference), g, &Utc);
        assert_eq!(trend.len(), 7);
        let day = |key: &str| trend.iter().find(|p| p.bucket.key == key).unwrap();
        assert_eq!((day("2024-03-01").received, day("2024-03-01").resolved), (2, 1));
        assert_eq!((day("2024-03-03").received, day("2024-03-03").resolved), (1, 1));
        assert_eq!(trend.iter().map(|p| p.received).sum::<usize>(), 3);
        assert!(trend.iter().all(|p| p.resolved <= p.received));
    }

    #[test]
    fn trend_buckets_by_local_date() {
        // 23:50 local on the 1st is already the 2nd in UTC.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let data = vec![rec("IT", Status::Pending, Some("2024-03-02T04:50:00Z"))];
        let reference = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let g = Granularity::Daily(7);
        let trend = generate_trend(&data, &generate_buckets(g, reference), g, &tz);
        let hit: Vec<&str> = trend
            .iter()
            .filter(|p| p.received > 0)
            .map(|p| p.bucket.key.as_str())
            .collect();
        assert_eq!(hit, ["2024-03-01"]);
    }

    #[test]
    fn monthly_trend_groups_by_month() {
        let data = vec![
            rec("IT", Status::Resolved, Some("2024-01-05T10:00:00Z")),
            rec("IT", Status::Pending, Some("2024-01-28T10:00:00Z")),
            rec("IT", Status::Pending, Some("2024-03-01T10:00:00Z")),
        ];
        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let g = Granularity::Monthly(3);
        let trend = generate_trend(&data, &generate_buckets(g, reference), g, &Utc);
        let counts: Vec<(usize, usize)> = trend.iter().map(|p| (p.received, p.resolved)).collect();
        assert_eq!(counts, [(2, 1), (0, 0), (1, 0)]);
    }

    #[test]
    fn department_totals_add_up() {
        let data = vec![
            rec("IT", Status::Resolved, None),
            rec("IT", Status::Pending, None),
            rec("IT", Status::InProgress, None),
            rec("HR", Status::Resolved, None),
        ];
        let depts = generate_department_breakdown(&data);
        assert_eq!(depts[0].name, "IT");
        assert_eq!(depts[0].efficiency, 33);
        assert_eq!(depts[1].efficiency, 100);
        for d in &depts {
            assert_eq!(d.pending + d.in_progress + d.resolved, d.total);
            assert!(d.efficiency <= 100);
        }
    }

    #[test]
    fn kpi_ties_break_alphabetically() {
        let data = vec![
            rec("Zeta", Status::Resolved, None),
            rec("Alpha", Status::Resolved, None),
            rec("Mid", Status::Pending, None),
            rec("Beta", Status::Pending, None),
        ];
        let kpi = generate_kpis(&generate_department_breakdown(&data));
        assert_eq!(kpi.top_performer, Performer { name: "Alpha".to_string(), efficiency: 100 });
        assert_eq!(kpi.low_performer, Performer { name: "Beta".to_string(), efficiency: 0 });
        assert_eq!(kpi.avg_efficiency, 50);
    }

    #[test]
    fn kpi_average_is_unweighted() {
        let mut data = vec![rec("Small", Status::Resolved, None)];
        data.extend((0..9).map(|_| rec("Large", Status::Pending, None)));
        let kpi = generate_kpis(&generate_department_breakdown(&data));
        assert_eq!(kpi.avg_efficiency, 50);
    }

    #[test]
    fn empty_kpis_fall_back() {
        let kpi = generate_kpis(&[]);
        assert_eq!(kpi.top_performer.name, "N/A");
        assert_eq!(kpi.low_performer.efficiency, 0);
        assert_eq!(kpi.avg_efficiency, 0);
    }

    #[test]
    fn filter_narrows_and_sorts_by_total() {
        let data = vec![
            rec("HR", Status::Resolved, None),
            rec("IT", Status::Resolved, None),
            rec("IT", Status::Pending, None),
            rec("Ops", Status::Pending, None),
        ];
        let all = filter_departments(generate_department_breakdown(&data), None);
        let names: Vec<&str> = all.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["IT", "HR", "Ops"]);
        let only = filter_departments(generate_department_breakdown(&data), Some("HR"));
        assert_eq!(only.len(), 1);
        assert!(filter_departments(generate_department_breakdown(&data), Some("Legal")).is_empty());
    }

    #[test]
    fn options_keep_first_seen_order() {
        let data = vec![
            rec("Ops", Status::Pending, None),
            rec("HR", Status::Pending, None),
            rec("Ops", Status::Pending, None),
        ];
        assert_eq!(department_options(&data), ["Ops", "HR"]);
    }

    #[test]
    fn employee_leaderboard_ranks_and_truncates() {
        let names = ["Ann", "Bo", "Cy", "Di", "Ed", "Fa", "Bo", "Fa", "Fa"];
        let data: Vec<NormalizedRecord> =
            names.iter().map(|n| by_name(n, Status::Pending, "")).collect();
        let board = generate_employee_leaderboard(&data);
        let ranked: Vec<(&str, usize)> = board.iter().map(|e| (e.name.as_str(), e.count)).collect();
        assert_eq!(ranked, [("Fa", 3), ("Bo", 2), ("Ann", 1), ("Cy", 1), ("Di", 1)]);
    }

    #[test]
    fn manager_leaderboard_counts_only_resolved() {
        let data = vec![
            by_name("x", Status::Resolved, "Lee"),
            by_name("x", Status::Pending, "Kim"),
            by_name("x", Status::Pending, "Kim"),
            by_name("x", Status::Resolved, "System Admin"),
            by_name("x", Status::Resolved, "System Admin"),
        ];
        let board = generate_manager_leaderboard(&data);
        let ranked: Vec<(&str, usize)> = board.iter().map(|e| (e.name.as_str(), e.count)).collect();
        assert_eq!(ranked, [("System Admin", 2), ("Lee", 1)]);
    }

    #[test]
    fn status_distribution_percentages() {
        let data = vec![
            rec("a", Status::Pending, None),
            rec("a", Status::InProgress, None),
            rec("a", Status::Resolved, None),
        ];
        let dist = generate_status_distribution(&data);
        let view: Vec<(Status, usize, u32)> = dist.iter().map(|e| (e.status, e.count, e.percent)).collect();
        assert_eq!(
            view,
            [(Status::Pending, 1, 33), (Status::InProgress, 1, 33), (Status::Resolved, 1, 33)]
        );
        assert!(generate_status_distribution(&[]).iter().all(|e| e.count == 0 && e.percent == 0));
    }

    #[test]
    fn headline_resolution_rate() {
        let data = vec![
            rec("a", Status::Resolved, None),
            rec("a", Status::Resolved, None),
            rec("a", Status::Pending, None),
        ];
        let h = generate_headline(&data);
        assert_eq!((h.total, h.resolved, h.pending, h.in_progress), (3, 2, 1, 0));
        assert_eq!(h.resolution_rate, 67);
        assert_eq!(generate_headline(&[]), HeadlineStats::default());
    }
}
