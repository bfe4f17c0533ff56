use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The wide, denormalized CAMEL ratio row for one credit union and one
/// quarter. This is the persisted output of the `RatioEngine` and the data
/// transfer object for downstream peer comparison and display.
///
/// Every metric field is `Option<Decimal>`: a null means the underlying
/// filing data was absent or a denominator was zero, and survives as null all
/// the way to the ratio store. Rows are unique per `(cu_number, year,
/// quarter)` and are always replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    // Identity
    pub cu_number: i64,
    pub year: i32,
    pub quarter: i32,
    pub period: String,

    // I. Absolute pass-through figures (unrounded dollar / count values)
    pub total_assets: Option<Decimal>,
    pub total_loans: Option<Decimal>,
    pub total_shares: Option<Decimal>,
    pub total_net_worth: Option<Decimal>,
    pub total_members: Option<Decimal>,
    pub employees_fte: Option<Decimal>,
    /// Rounded to the nearest whole dollar, the one exception among absolutes.
    pub assets_per_employee: Option<Decimal>,

    // II. Capital adequacy
    pub net_worth_ratio: Option<Decimal>,
    pub net_worth_growth_yoy: Option<Decimal>,

    // III. Asset quality
    pub delinquency_rate: Option<Decimal>,
    pub charge_off_ratio: Option<Decimal>,
    pub allowance_coverage: Option<Decimal>,
    pub allowance_to_total_loans: Option<Decimal>,
    pub re_loans_to_total_loans: Option<Decimal>,
    pub vehicle_loans_to_total_loans: Option<Decimal>,
    pub commercial_loans_to_total_loans: Option<Decimal>,
    pub unsecured_loans_to_total_loans: Option<Decimal>,

    // IV. Management
    pub operating_expense_ratio: Option<Decimal>,
    pub asset_growth_yoy: Option<Decimal>,
    pub loan_growth_yoy: Option<Decimal>,
    pub share_growth_yoy: Option<Decimal>,
    pub member_growth_yoy: Option<Decimal>,

    // V. Earnings (all annualized from YTD figures)
    pub roa: Option<Decimal>,
    pub roaa: Option<Decimal>,
    pub roe: Option<Decimal>,
    pub net_interest_margin: Option<Decimal>,
    pub loan_yield: Option<Decimal>,
    pub cost_of_funds: Option<Decimal>,

    // VI. Liquidity
    pub loans_to_shares: Option<Decimal>,
    pub cash_to_assets: Option<Decimal>,
    pub investments_to_assets: Option<Decimal>,
    pub borrowings_to_assets: Option<Decimal>,
}
