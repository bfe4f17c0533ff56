use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The typed call-report records for one credit union in one quarter, grouped
/// by financial domain. Each domain is absent when the provider holds no row
/// for it; each field is absent when the underlying account code was not
/// filed. Downstream arithmetic treats absence as null, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRecords {
    pub assets: Option<AssetsRecord>,
    pub capital: Option<CapitalRecord>,
    pub revenue: Option<RevenueRecord>,
    pub expenses: Option<ExpensesRecord>,
    pub net_income: Option<NetIncomeRecord>,
    pub loans: Option<LoansRecord>,
    pub delinquency: Option<DelinquencyRecord>,
    pub charge_offs: Option<ChargeOffsRecord>,
    pub commercial: Option<CommercialRecord>,
    pub liquidity: Option<LiquidityRecord>,
    pub operations: Option<OperationsRecord>,
}

/// Balance-sheet asset figures (point-in-time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsRecord {
    pub total_assets: Option<Decimal>,
    pub total_loans: Option<Decimal>,
    pub total_investments: Option<Decimal>,
    pub cash_on_hand: Option<Decimal>,
    pub cash_on_deposit: Option<Decimal>,
}

/// Net worth and loan-loss allowance figures (point-in-time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalRecord {
    pub total_net_worth: Option<Decimal>,
    /// Allowance for credit losses on a CECL basis. Preferred when nonzero.
    pub allowance_cecl: Option<Decimal>,
    /// Legacy allowance for loan and lease losses.
    pub allowance_legacy: Option<Decimal>,
}

/// Year-to-date income figures. Annualized before use in earnings ratios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub interest_on_loans: Option<Decimal>,
    pub investment_income: Option<Decimal>,
    pub fee_income: Option<Decimal>,
    pub other_operating_income: Option<Decimal>,
}

/// Year-to-date expense figures. Annualized before use in earnings ratios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpensesRecord {
    /// Total operating expenses, excluding the provision line.
    pub total_operating_expenses: Option<Decimal>,
    pub provision_for_loan_losses: Option<Decimal>,
    pub dividends_on_shares: Option<Decimal>,
    pub interest_on_deposits: Option<Decimal>,
    pub interest_on_borrowed_money: Option<Decimal>,
}

/// Year-to-date net income.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetIncomeRecord {
    pub net_income: Option<Decimal>,
}

/// Loan portfolio composition (point-in-time balances).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoansRecord {
    pub first_mortgage_loans: Option<Decimal>,
    pub other_re_loans: Option<Decimal>,
    pub new_vehicle_loans: Option<Decimal>,
    pub used_vehicle_loans: Option<Decimal>,
    pub credit_card_loans: Option<Decimal>,
    pub other_unsecured_loans: Option<Decimal>,
}

/// Delinquent loan balances bucketed by aging window. The reportable
/// delinquency rate counts the 60-day-and-over buckets only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelinquencyRecord {
    pub del_30_59_days: Option<Decimal>,
    pub del_60_179_days: Option<Decimal>,
    pub del_180_359_days: Option<Decimal>,
    pub del_360_plus_days: Option<Decimal>,
}

/// Year-to-date charge-off activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeOffsRecord {
    pub charge_offs_ytd: Option<Decimal>,
    pub recoveries_ytd: Option<Decimal>,
}

/// Commercial lending balances (point-in-time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommercialRecord {
    pub commercial_loans_outstanding: Option<Decimal>,
}

/// Funding-side balances (point-in-time).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityRecord {
    pub total_shares: Option<Decimal>,
    pub total_borrowings: Option<Decimal>,
}

/// Membership and staffing figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationsRecord {
    pub members: Option<Decimal>,
    pub full_time_employees: Option<Decimal>,
    pub part_time_employees: Option<Decimal>,
}
