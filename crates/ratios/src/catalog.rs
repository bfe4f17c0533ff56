use crate::row::RatioRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five CAMEL rating dimensions, plus a bucket for the absolute figures
/// that are carried through for size context rather than rated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricCategory {
    Capital,
    AssetQuality,
    Management,
    Earnings,
    Liquidity,
    Absolute,
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetricCategory::Capital => "capital",
            MetricCategory::AssetQuality => "asset_quality",
            MetricCategory::Management => "management",
            MetricCategory::Earnings => "earnings",
            MetricCategory::Liquidity => "liquidity",
            MetricCategory::Absolute => "absolute",
        };
        write!(f, "{label}")
    }
}

/// One entry of the static metric catalog: how to read one metric out of a
/// `RatioRow`, and which CAMEL category it reports under.
pub struct MetricDef {
    pub name: &'static str,
    pub category: MetricCategory,
    pub accessor: fn(&RatioRow) -> Option<Decimal>,
}

/// The static metric catalog. This is the single source of truth for the
/// unpivot used by peer comparison: every numeric field of `RatioRow` appears
/// here exactly once, so the wide row and the metric-per-row view can never
/// drift apart.
pub const METRIC_CATALOG: &[MetricDef] = &[
    // Absolutes
    MetricDef { name: "total_assets", category: MetricCategory::Absolute, accessor: |r| r.total_assets },
    MetricDef { name: "total_loans", category: MetricCategory::Absolute, accessor: |r| r.total_loans },
    MetricDef { name: "total_shares", category: MetricCategory::Absolute, accessor: |r| r.total_shares },
    MetricDef { name: "total_net_worth", category: MetricCategory::Absolute, accessor: |r| r.total_net_worth },
    MetricDef { name: "total_members", category: MetricCategory::Absolute, accessor: |r| r.total_members },
    MetricDef { name: "employees_fte", category: MetricCategory::Absolute, accessor: |r| r.employees_fte },
    MetricDef { name: "assets_per_employee", category: MetricCategory::Absolute, accessor: |r| r.assets_per_employee },
    // Capital
    MetricDef { name: "net_worth_ratio", category: MetricCategory::Capital, accessor: |r| r.net_worth_ratio },
    MetricDef { name: "net_worth_growth_yoy", category: MetricCategory::Capital, accessor: |r| r.net_worth_growth_yoy },
    // Asset quality
    MetricDef { name: "delinquency_rate", category: MetricCategory::AssetQuality, accessor: |r| r.delinquency_rate },
    MetricDef { name: "charge_off_ratio", category: MetricCategory::AssetQuality, accessor: |r| r.charge_off_ratio },
    MetricDef { name: "allowance_coverage", category: MetricCategory::AssetQuality, accessor: |r| r.allowance_coverage },
    MetricDef { name: "allowance_to_total_loans", category: MetricCategory::AssetQuality, accessor: |r| r.allowance_to_total_loans },
    MetricDef { name: "re_loans_to_total_loans", category: MetricCategory::AssetQuality, accessor: |r| r.re_loans_to_total_loans },
    MetricDef { name: "vehicle_loans_to_total_loans", category: MetricCategory::AssetQuality, accessor: |r| r.vehicle_loans_to_total_loans },
    MetricDef { name: "commercial_loans_to_total_loans", category: MetricCategory::AssetQuality, accessor: |r| r.commercial_loans_to_total_loans },
    MetricDef { name: "unsecured_loans_to_total_loans", category: MetricCategory::AssetQuality, accessor: |r| r.unsecured_loans_to_total_loans },
    // Management
    MetricDef { name: "operating_expense_ratio", category: MetricCategory::Management, accessor: |r| r.operating_expense_ratio },
    MetricDef { name: "asset_growth_yoy", category: MetricCategory::Management, accessor: |r| r.asset_growth_yoy },
    MetricDef { name: "loan_growth_yoy", category: MetricCategory::Management, accessor: |r| r.loan_growth_yoy },
    MetricDef { name: "share_growth_yoy", category: MetricCategory::Management, accessor: |r| r.share_growth_yoy },
    MetricDef { name: "member_growth_yoy", category: MetricCategory::Management, accessor: |r| r.member_growth_yoy },
    // Earnings
    MetricDef { name: "roa", category: MetricCategory::Earnings, accessor: |r| r.roa },
    MetricDef { name: "roaa", category: MetricCategory::Earnings, accessor: |r| r.roaa },
    MetricDef { name: "roe", category: MetricCategory::Earnings, accessor: |r| r.roe },
    MetricDef { name: "net_interest_margin", category: MetricCategory::Earnings, accessor: |r| r.net_interest_margin },
    MetricDef { name: "loan_yield", category: MetricCategory::Earnings, accessor: |r| r.loan_yield },
    MetricDef { name: "cost_of_funds", category: MetricCategory::Earnings, accessor: |r| r.cost_of_funds },
    // Liquidity
    MetricDef { name: "loans_to_shares", category: MetricCategory::Liquidity, accessor: |r| r.loans_to_shares },
    MetricDef { name: "cash_to_assets", category: MetricCategory::Liquidity, accessor: |r| r.cash_to_assets },
    MetricDef { name: "investments_to_assets", category: MetricCategory::Liquidity, accessor: |r| r.investments_to_assets },
    MetricDef { name: "borrowings_to_assets", category: MetricCategory::Liquidity, accessor: |r| r.borrowings_to_assets },
];
