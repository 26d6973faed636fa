//! Aggregate figures derived from a list of assets.
//!
//! All functions are pure functions of the given slice. Nothing is cached, the
//! figures are recomputed whenever the list or the filters change. An empty list
//! never fails, every aggregate then reports zero or an empty collection.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::datatypes::date_time_helper::{days_before, quarter, DateTimeError};
use crate::datatypes::{Asset, Category};

/// Assets purchased within this many days count as new
pub const NEW_ASSET_DAYS: u64 = 30;
/// Assets purchased at least this many days ago (about three years) count as aging
pub const AGING_ASSET_DAYS: u64 = 1095;
/// Assets worth more than this are high-value assets
pub const HIGH_VALUE_THRESHOLD: f64 = 10000.0;
/// Number of members listed per cohort
pub const COHORT_TOP_SIZE: usize = 5;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("unknown time grouping '{0}', expected year, quarter or month")]
    UnknownGrouping(String),
    #[error("date/time conversion error")]
    DateTimeError(#[from] DateTimeError),
}

/// Basic figures of the asset values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSummary {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation, i.e. divided by N
    pub std_dev: f64,
    /// Name and value of the most valuable asset
    pub max: Option<(String, f64)>,
}

pub fn total_value(assets: &[Asset]) -> f64 {
    assets.iter().map(|a| a.value).sum()
}

pub fn mean(assets: &[Asset]) -> f64 {
    if assets.is_empty() {
        return 0.0;
    }
    total_value(assets) / assets.len() as f64
}

/// Median of the values, the average of the two middle values for an even count
pub fn median(assets: &[Asset]) -> f64 {
    let mut values: Vec<f64> = assets.iter().map(|a| a.value).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

pub fn std_dev(assets: &[Asset]) -> f64 {
    if assets.is_empty() {
        return 0.0;
    }
    let mean = mean(assets);
    let variance = assets
        .iter()
        .map(|a| (a.value - mean).powi(2))
        .sum::<f64>()
        / assets.len() as f64;
    variance.sqrt()
}

/// First asset with the largest value
pub fn max_asset(assets: &[Asset]) -> Option<&Asset> {
    let mut max: Option<&Asset> = None;
    for asset in assets {
        match max {
            Some(m) if m.value >= asset.value => {}
            _ => max = Some(asset),
        }
    }
    max
}

pub fn summarize(assets: &[Asset]) -> ValueSummary {
    ValueSummary {
        count: assets.len(),
        total: total_value(assets),
        mean: mean(assets),
        median: median(assets),
        std_dev: std_dev(assets),
        max: max_asset(assets).map(|a| (a.name.clone(), a.value)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub count: usize,
    pub value: f64,
    /// Share of the total value in percent, 0 if the total value is 0
    pub percentage: f64,
}

/// Count, value and value share per category, in order of first appearance
pub fn category_breakdown(assets: &[Asset]) -> Vec<(Category, CategoryStats)> {
    let total = total_value(assets);
    let mut index: HashMap<&Category, usize> = HashMap::new();
    let mut stats: Vec<(Category, CategoryStats)> = Vec::new();
    for asset in assets {
        let idx = *index.entry(&asset.category).or_insert_with(|| {
            stats.push((asset.category.clone(), CategoryStats::default()));
            stats.len() - 1
        });
        stats[idx].1.count += 1;
        stats[idx].1.value += asset.value;
    }
    for (_, s) in stats.iter_mut() {
        s.percentage = if total > 0.0 {
            s.value / total * 100.0
        } else {
            0.0
        };
    }
    stats
}

/// Half-open value range `[min, max)`, unbounded above if `max` is `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueBucket {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
}

impl ValueBucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value < max)
    }
}

pub const VALUE_BUCKETS: [ValueBucket; 5] = [
    ValueBucket { label: "< 1K", min: 0.0, max: Some(1000.0) },
    ValueBucket { label: "1K-5K", min: 1000.0, max: Some(5000.0) },
    ValueBucket { label: "5K-10K", min: 5000.0, max: Some(10000.0) },
    ValueBucket { label: "10K-50K", min: 10000.0, max: Some(50000.0) },
    ValueBucket { label: "> 50K", min: 50000.0, max: None },
];

/// Number of assets per entry of [`VALUE_BUCKETS`]
pub fn value_distribution(assets: &[Asset]) -> Vec<(ValueBucket, usize)> {
    VALUE_BUCKETS
        .iter()
        .map(|bucket| {
            let count = assets.iter().filter(|a| bucket.contains(a.value)).count();
            (*bucket, count)
        })
        .collect()
}

/// Coarse value classification shown next to median and deviation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueTiers {
    /// below 1000
    pub low: usize,
    /// 1000 up to and including 10000
    pub mid: usize,
    /// above 10000
    pub high: usize,
}

pub fn value_tiers(assets: &[Asset]) -> ValueTiers {
    let mut tiers = ValueTiers::default();
    for asset in assets {
        if asset.value < 1000.0 {
            tiers.low += 1;
        } else if asset.value <= HIGH_VALUE_THRESHOLD {
            tiers.mid += 1;
        } else {
            tiers.high += 1;
        }
    }
    tiers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGrouping {
    Year,
    Quarter,
    Month,
}

impl TimeGrouping {
    /// Label of the period the date belongs to, labels sort chronologically
    pub fn key(&self, date: &NaiveDate) -> String {
        match self {
            Self::Year => format!("{}", date.year()),
            Self::Quarter => format!("{}Q{}", date.year(), quarter(date)),
            Self::Month => format!("{}-{:02}", date.year(), date.month()),
        }
    }
}

impl fmt::Display for TimeGrouping {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Quarter => write!(f, "quarter"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl FromStr for TimeGrouping {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<TimeGrouping, StatsError> {
        match s.to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "quarter" => Ok(Self::Quarter),
            "month" => Ok(Self::Month),
            _ => Err(StatsError::UnknownGrouping(s.to_string())),
        }
    }
}

/// Number of purchases per period, sorted by period label
pub fn timeline(assets: &[Asset], grouping: TimeGrouping) -> Vec<(String, usize)> {
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for asset in assets {
        *groups.entry(grouping.key(&asset.purchase_date)).or_insert(0) += 1;
    }
    groups.into_iter().collect()
}

/// A named subset of assets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohort {
    pub count: usize,
    /// The first members in list order, no further sorting is applied
    pub top: Vec<Asset>,
}

impl Cohort {
    fn collect<'a>(assets: impl Iterator<Item = &'a Asset>) -> Cohort {
        let mut cohort = Cohort::default();
        for asset in assets {
            if cohort.top.len() < COHORT_TOP_SIZE {
                cohort.top.push(asset.clone());
            }
            cohort.count += 1;
        }
        cohort
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cohorts {
    pub active: usize,
    pub new: Cohort,
    pub aging: Cohort,
    pub high_value: Cohort,
}

pub fn cohorts(assets: &[Asset], today: NaiveDate) -> Result<Cohorts, StatsError> {
    let new_since = days_before(today, NEW_ASSET_DAYS)?;
    let aging_until = days_before(today, AGING_ASSET_DAYS)?;
    Ok(Cohorts {
        active: assets.len(),
        new: Cohort::collect(assets.iter().filter(|a| a.purchase_date >= new_since)),
        aging: Cohort::collect(assets.iter().filter(|a| a.purchase_date <= aging_until)),
        high_value: Cohort::collect(assets.iter().filter(|a| a.value > HIGH_VALUE_THRESHOLD)),
    })
}

/// Everything the dashboard shows, computed in one pass over the cache
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub summary: ValueSummary,
    pub categories: Vec<(Category, CategoryStats)>,
    pub distribution: Vec<(ValueBucket, usize)>,
    pub tiers: ValueTiers,
    pub grouping: TimeGrouping,
    pub timeline: Vec<(String, usize)>,
    pub cohorts: Cohorts,
}

impl DashboardStats {
    pub fn compute(
        assets: &[Asset],
        grouping: TimeGrouping,
        today: NaiveDate,
    ) -> Result<DashboardStats, StatsError> {
        Ok(DashboardStats {
            summary: summarize(assets),
            categories: category_breakdown(assets),
            distribution: value_distribution(assets),
            tiers: value_tiers(assets),
            grouping,
            timeline: timeline(assets, grouping),
            cohorts: cohorts(assets, today)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str, category: Category, value: f64, date: (i32, u32, u32)) -> Asset {
        Asset::new(
            None,
            name,
            category,
            value,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            None,
        )
    }

    fn values(values: &[f64]) -> Vec<Asset> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| asset(&format!("a{}", i), Category::Other, *v, (2024, 1, 1)))
            .collect()
    }

    #[test]
    fn summary_of_values() {
        let assets = values(&[1000.0, 3000.0, 2000.0, 6000.0]);
        let summary = summarize(&assets);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total, 12000.0);
        assert_eq!(summary.mean, 3000.0);
        assert_eq!(summary.median, 2500.0);
        // deviations -2000, 0, -1000, 3000 -> variance 14e6/4
        assert!((summary.std_dev - 3.5e6_f64.sqrt()).abs() < 1e-9);
        assert_eq!(summary.max, Some(("a3".to_string(), 6000.0)));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&values(&[1000.0])), 1000.0);
        assert_eq!(median(&values(&[1000.0, 3000.0])), 2000.0);
        assert_eq!(median(&values(&[5.0, 1.0, 3.0])), 3.0);
    }

    #[test]
    fn identical_values_have_no_deviation() {
        assert_eq!(std_dev(&values(&[750.0, 750.0, 750.0])), 0.0);
    }

    #[test]
    fn empty_list_reports_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary, ValueSummary::default());
        assert!(category_breakdown(&[]).is_empty());
        assert!(value_distribution(&[]).iter().all(|(_, c)| *c == 0));
        assert!(timeline(&[], TimeGrouping::Month).is_empty());
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let cohorts = cohorts(&[], today).unwrap();
        assert_eq!(cohorts, Cohorts::default());
    }

    #[test]
    fn first_max_wins_on_ties() {
        let assets = values(&[10.0, 30.0, 30.0]);
        assert_eq!(max_asset(&assets).unwrap().name, "a1");
    }

    #[test]
    fn category_shares() {
        let assets = vec![
            asset("laptop", Category::Electronics, 3000.0, (2024, 1, 1)),
            asset("desk", Category::Furniture, 1000.0, (2024, 1, 1)),
            asset("phone", Category::Electronics, 1000.0, (2024, 1, 1)),
        ];
        let stats = category_breakdown(&assets);
        assert_eq!(stats.len(), 2);
        // first appearance order
        assert_eq!(stats[0].0, Category::Electronics);
        assert_eq!(stats[0].1.count, 2);
        assert_eq!(stats[0].1.value, 4000.0);
        assert_eq!(stats[0].1.percentage, 80.0);
        assert_eq!(stats[1].1.percentage, 20.0);
        let sum: f64 = stats.iter().map(|(_, s)| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn category_shares_of_zero_total() {
        // zero values can only come from a misbehaving backend
        let assets = values(&[0.0, 0.0]);
        let stats = category_breakdown(&assets);
        assert_eq!(stats[0].1.count, 2);
        assert_eq!(stats[0].1.percentage, 0.0);
    }

    #[test]
    fn bucket_distribution() {
        let assets = values(&[500.0, 5000.0, 50001.0]);
        let distribution = value_distribution(&assets);
        let counts: Vec<usize> = distribution.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![1, 0, 1, 0, 1]);
        assert_eq!(distribution[4].0.label, "> 50K");
        assert_eq!(distribution[4].1, 1);

        // lower bounds are inclusive, upper bounds exclusive
        let assets = values(&[1000.0, 10000.0, 50000.0]);
        let counts: Vec<usize> = value_distribution(&assets).iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn tiers_include_both_mid_bounds() {
        let tiers = value_tiers(&values(&[999.99, 1000.0, 10000.0, 10000.01]));
        assert_eq!(tiers, ValueTiers { low: 1, mid: 2, high: 1 });
    }

    #[test]
    fn timeline_grouping() {
        let assets = vec![
            asset("a", Category::Other, 1.0, (2024, 3, 31)),
            asset("b", Category::Other, 1.0, (2023, 12, 1)),
            asset("c", Category::Other, 1.0, (2024, 4, 1)),
            asset("d", Category::Other, 1.0, (2024, 3, 2)),
        ];
        assert_eq!(
            timeline(&assets, TimeGrouping::Year),
            vec![("2023".to_string(), 1), ("2024".to_string(), 3)]
        );
        assert_eq!(
            timeline(&assets, TimeGrouping::Quarter),
            vec![
                ("2023Q4".to_string(), 1),
                ("2024Q1".to_string(), 2),
                ("2024Q2".to_string(), 1)
            ]
        );
        assert_eq!(
            timeline(&assets, TimeGrouping::Month),
            vec![
                ("2023-12".to_string(), 1),
                ("2024-03".to_string(), 2),
                ("2024-04".to_string(), 1)
            ]
        );
    }

    #[test]
    fn parse_grouping() {
        assert_eq!(TimeGrouping::from_str("Quarter").unwrap(), TimeGrouping::Quarter);
        assert!(TimeGrouping::from_str("week").is_err());
        assert_eq!(TimeGrouping::Month.to_string(), "month");
    }

    #[test]
    fn cohort_membership() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let assets = vec![
            asset("fresh", Category::Other, 100.0, (2026, 10, 1)),
            asset("edge-new", Category::Other, 100.0, (2026, 9, 17)),
            asset("old", Category::Other, 20000.0, (2023, 10, 18)),
            asset("not-yet-old", Category::Other, 10000.0, (2023, 10, 19)),
        ];
        let cohorts = cohorts(&assets, today).unwrap();
        assert_eq!(cohorts.active, 4);
        assert_eq!(cohorts.new.count, 2);
        assert_eq!(cohorts.aging.count, 1);
        assert_eq!(cohorts.aging.top[0].name, "old");
        assert_eq!(cohorts.high_value.count, 1);
        assert_eq!(cohorts.high_value.top[0].name, "old");
    }

    #[test]
    fn cohort_top_keeps_list_order() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let assets = values(&[11000.0, 90000.0, 12000.0, 13000.0, 14000.0, 15000.0, 16000.0]);
        let cohorts = cohorts(&assets, today).unwrap();
        assert_eq!(cohorts.high_value.count, 7);
        let names: Vec<&str> = cohorts.high_value.top.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a0", "a1", "a2", "a3", "a4"]);
    }

    #[test]
    fn dashboard_bundle() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let assets = values(&[500.0, 5000.0, 50001.0]);
        let stats = DashboardStats::compute(&assets, TimeGrouping::Year, today).unwrap();
        assert_eq!(stats.summary.count, 3);
        assert_eq!(stats.timeline, vec![("2024".to_string(), 3)]);
        assert_eq!(stats.tiers.high, 1);
        assert_eq!(stats.cohorts.aging.count, 0);
    }
}
