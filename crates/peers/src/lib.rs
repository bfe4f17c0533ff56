//! # Peerview Peer Percentile Engine
//!
//! Stateless, on-demand comparison of one credit union's latest CAMEL ratios
//! against a cohort of similarly sized peers from the same reporting period.
//!
//! The engine is side-effect-free: each request reads a consistent snapshot
//! of whatever ratio rows exist at call time, unpivots both the target row
//! and the cohort rows through the shared metric catalog, and aggregates per
//! metric. It may be invoked with unbounded concurrency by independent
//! callers.

use core_types::Period;
use database::DbRepository;
use ratios::{METRIC_CATALOG, MetricCategory, RatioRow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub mod error;

pub use error::PeerError;

/// One metric's standing against the peer cohort. One of these is emitted
/// for every metric present (non-null) on the target's latest ratio row,
/// even when no peer reports the metric (`peer_count == 0`), so the caller
/// can render "insufficient peer data" rather than a hole.
#[derive(Debug, Clone, Serialize)]
pub struct PercentileResult {
    pub metric: String,
    pub category: MetricCategory,
    pub target_value: Decimal,
    pub peer_median: Option<Decimal>,
    pub peer_count: usize,
    pub values_below: usize,
    pub values_equal: usize,
}

/// The main peer comparison engine, parameterized by one asset-size tier:
/// lower bound inclusive, upper bound exclusive.
pub struct PeerEngine {
    tier_min: Decimal,
    tier_max: Decimal,
}

impl PeerEngine {
    pub fn new(tier_min: Decimal, tier_max: Decimal) -> Result<Self, PeerError> {
        if tier_min >= tier_max {
            return Err(PeerError::InvalidTierBounds {
                min: tier_min,
                max: tier_max,
            });
        }
        Ok(Self { tier_min, tier_max })
    }

    /// Fetches the target's latest ratio row, selects the same-period cohort,
    /// and computes the per-metric percentile standings.
    ///
    /// Results come back in catalog order; callers that want a different
    /// ordering (e.g. category then name) sort on their side.
    pub async fn run(
        &self,
        db_repo: &DbRepository,
        cu_number: i64,
    ) -> Result<Vec<PercentileResult>, PeerError> {
        // 1. The target's most recent computed period.
        let latest: Period = db_repo
            .latest_period_for(cu_number)
            .await?
            .ok_or(PeerError::NoRatioDataForEntity(cu_number))?;

        // 2. The target's row for that period.
        let target = db_repo
            .get_ratio_row(cu_number, latest)
            .await?
            .ok_or(PeerError::NoRatioDataForEntity(cu_number))?;

        // 3. The cohort: same period, same snapshot. Peers are never taken
        //    from "their own latest period" independently.
        let period_rows = db_repo.get_ratio_rows_for_period(latest).await?;
        let cohort = build_cohort(period_rows, cu_number, self.tier_min, self.tier_max);

        tracing::debug!(
            cu_number,
            period = %latest,
            peers = cohort.len(),
            "selected peer cohort"
        );

        // 4.-7. Unpivot and aggregate.
        Ok(compare(&target, &cohort))
    }
}

/// Selects the peer cohort from one period's rows: total assets within
/// `[min, max)`, target excluded. Rows without a reported total-asset figure
/// cannot be tiered and are dropped.
fn build_cohort(rows: Vec<RatioRow>, target_cu: i64, min: Decimal, max: Decimal) -> Vec<RatioRow> {
    rows.into_iter()
        .filter(|row| {
            row.cu_number != target_cu
                && row
                    .total_assets
                    .map_or(false, |assets| assets >= min && assets < max)
        })
        .collect()
}

/// Unpivots the target row and the cohort through the metric catalog and
/// aggregates each metric the target reports. Null target metrics are
/// excluded entirely; null peer values are dropped from that metric's pool.
fn compare(target: &RatioRow, cohort: &[RatioRow]) -> Vec<PercentileResult> {
    METRIC_CATALOG
        .iter()
        .filter_map(|metric| {
            let target_value = (metric.accessor)(target)?;

            let mut peer_values: Vec<Decimal> = cohort
                .iter()
                .filter_map(|peer| (metric.accessor)(peer))
                .collect();
            peer_values.sort();

            Some(PercentileResult {
                metric: metric.name.to_string(),
                category: metric.category,
                target_value,
                peer_median: median(&peer_values),
                peer_count: peer_values.len(),
                values_below: peer_values.iter().filter(|v| **v < target_value).count(),
                values_equal: peer_values.iter().filter(|v| **v == target_value).count(),
            })
        })
        .collect()
}

/// The 50th percentile with linear interpolation over sorted values: the
/// middle element for odd counts, the mean of the two middle elements for
/// even counts. Empty input has no median.
fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / dec!(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cu_number: i64, total_assets: Option<Decimal>) -> RatioRow {
        RatioRow {
            cu_number,
            year: 2025,
            quarter: 2,
            period: "2025-Q2".to_string(),
            total_assets,
            ..RatioRow::default()
        }
    }

    #[test]
    fn tier_bounds_must_be_ordered() {
        assert!(matches!(
            PeerEngine::new(dec!(1000), dec!(1000)),
            Err(PeerError::InvalidTierBounds { .. })
        ));
        assert!(matches!(
            PeerEngine::new(dec!(2000), dec!(1000)),
            Err(PeerError::InvalidTierBounds { .. })
        ));
        assert!(PeerEngine::new(dec!(1000), dec!(2000)).is_ok());
    }

    #[test]
    fn cohort_excludes_target_and_honors_half_open_tier() {
        let min = dec!(250_000_000);
        let max = dec!(1_000_000_000);
        let rows = vec![
            row(1, Some(dec!(500_000_000))),  // the target itself
            row(2, Some(dec!(250_000_000))),  // lower bound, inclusive
            row(3, Some(dec!(999_999_999))),  // just under the upper bound
            row(4, Some(dec!(1_000_000_000))), // upper bound, exclusive
            row(5, Some(dec!(249_999_999))),  // under the lower bound
            row(6, None),                     // untiered
        ];

        let cohort = build_cohort(rows, 1, min, max);
        let charters: Vec<i64> = cohort.iter().map(|r| r.cu_number).collect();
        assert_eq!(charters, vec![2, 3]);
    }

    #[test]
    fn median_interpolates_between_middle_values() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[dec!(3)]), Some(dec!(3)));
        assert_eq!(median(&[dec!(1), dec!(2), dec!(3)]), Some(dec!(2)));
        assert_eq!(
            median(&[dec!(1.0), dec!(2.0), dec!(3.0), dec!(4.0)]),
            Some(dec!(2.5))
        );
    }

    #[test]
    fn compare_counts_below_and_equal_peers() {
        let target = RatioRow {
            net_worth_ratio: Some(dec!(2.5)),
            ..row(1, Some(dec!(500)))
        };
        let cohort: Vec<RatioRow> = [dec!(1.0), dec!(2.0), dec!(3.0), dec!(4.0)]
            .iter()
            .enumerate()
            .map(|(i, v)| RatioRow {
                net_worth_ratio: Some(*v),
                ..row(i as i64 + 2, Some(dec!(500)))
            })
            .collect();

        let results = compare(&target, &cohort);
        let nwr = results.iter().find(|r| r.metric == "net_worth_ratio").unwrap();
        assert_eq!(nwr.peer_count, 4);
        assert_eq!(nwr.peer_median, Some(dec!(2.5)));
        assert_eq!(nwr.values_below, 2);
        assert_eq!(nwr.values_equal, 0);
        assert_eq!(nwr.category, MetricCategory::Capital);
    }

    #[test]
    fn null_target_metrics_are_excluded_from_output() {
        // net_worth_ratio stays None on the target (e.g. total_assets = 0),
        // so no result row may exist for it even though peers report it.
        let target = row(1, Some(dec!(0)));
        let cohort = vec![RatioRow {
            net_worth_ratio: Some(dec!(10)),
            ..row(2, Some(dec!(500)))
        }];

        let results = compare(&target, &cohort);
        assert!(results.iter().all(|r| r.metric != "net_worth_ratio"));
    }

    #[test]
    fn metric_absent_from_all_peers_still_yields_a_row() {
        let target = RatioRow {
            roa: Some(dec!(0.85)),
            ..row(1, Some(dec!(500)))
        };
        let cohort = vec![row(2, Some(dec!(400))), row(3, Some(dec!(600)))];

        let results = compare(&target, &cohort);
        let roa = results.iter().find(|r| r.metric == "roa").unwrap();
        assert_eq!(roa.peer_count, 0);
        assert_eq!(roa.peer_median, None);
        assert_eq!(roa.values_below, 0);
        assert_eq!(roa.values_equal, 0);
    }

    #[test]
    fn equal_peer_values_are_counted_not_ranked_below() {
        let target = RatioRow {
            loans_to_shares: Some(dec!(80)),
            ..row(1, Some(dec!(500)))
        };
        let cohort: Vec<RatioRow> = [dec!(70), dec!(80), dec!(80), dec!(90)]
            .iter()
            .enumerate()
            .map(|(i, v)| RatioRow {
                loans_to_shares: Some(*v),
                ..row(i as i64 + 2, Some(dec!(500)))
            })
            .collect();

        let results = compare(&target, &cohort);
        let lts = results.iter().find(|r| r.metric == "loans_to_shares").unwrap();
        assert_eq!(lts.values_below, 1);
        assert_eq!(lts.values_equal, 2);
        assert_eq!(lts.peer_median, Some(dec!(80)));
    }
}
