use crate::math::{annualize, avg_balance, opt_sum, pct_of, round0, safe_div, yoy_growth};
use crate::row::RatioRow;
use core_types::{DomainRecords, Period};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A stateless calculator that derives one `RatioRow` from a credit union's
/// typed records for the current period plus two historical reference
/// snapshots: the same quarter one year back (for YoY growth) and the prior
/// year's Q4 (for average balances).
#[derive(Debug, Default)]
pub struct RatioEngine {}

impl RatioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the full ratio row. Pure: no I/O, no errors. Any figure the
    /// filings don't support comes back as `None`.
    pub fn calculate(
        &self,
        cu_number: i64,
        period: Period,
        current: &DomainRecords,
        prior_year_same_quarter: Option<&DomainRecords>,
        prior_year_q4: Option<&DomainRecords>,
    ) -> RatioRow {
        let quarter = period.quarter;

        let mut row = RatioRow {
            cu_number,
            year: period.year,
            quarter: period.quarter as i32,
            period: period.label(),
            ..RatioRow::default()
        };

        self.calculate_absolutes(current, &mut row);
        self.calculate_capital(current, prior_year_same_quarter, &mut row);
        self.calculate_asset_quality(current, prior_year_q4, quarter, &mut row);
        self.calculate_management(current, prior_year_same_quarter, prior_year_q4, quarter, &mut row);
        self.calculate_earnings(current, prior_year_q4, quarter, &mut row);
        self.calculate_liquidity(current, &mut row);

        row
    }

    fn calculate_absolutes(&self, current: &DomainRecords, row: &mut RatioRow) {
        row.total_assets = total_assets(current);
        row.total_loans = total_loans(current);
        row.total_shares = total_shares(current);
        row.total_net_worth = net_worth(current);
        row.total_members = current.operations.as_ref().and_then(|o| o.members);

        row.employees_fte = fte(current);
        row.assets_per_employee = safe_div(row.total_assets, row.employees_fte).map(round0);
    }

    fn calculate_capital(
        &self,
        current: &DomainRecords,
        prior_year_same_quarter: Option<&DomainRecords>,
        row: &mut RatioRow,
    ) {
        row.net_worth_ratio = pct_of(net_worth(current), total_assets(current));
        row.net_worth_growth_yoy = yoy_growth(
            net_worth(current),
            prior_year_same_quarter.and_then(net_worth),
        );
    }

    fn calculate_asset_quality(
        &self,
        current: &DomainRecords,
        prior_year_q4: Option<&DomainRecords>,
        quarter: u8,
        row: &mut RatioRow,
    ) {
        let loans = total_loans(current);
        let delinquent = delinquent_60_plus(current);

        row.delinquency_rate = pct_of(delinquent, loans);

        let avg_loans = avg_balance(loans, prior_year_q4.and_then(total_loans));
        let net_charge_offs = current.charge_offs.as_ref().and_then(|c| {
            opt_sum(&[c.charge_offs_ytd, c.recoveries_ytd.map(|r| -r)])
        });
        row.charge_off_ratio = pct_of(annualize(net_charge_offs, quarter), avg_loans);

        let allowance = preferred_allowance(current);
        row.allowance_coverage = pct_of(allowance, delinquent);
        row.allowance_to_total_loans = pct_of(allowance, loans);

        let re_loans = current.loans.as_ref().and_then(|l| {
            opt_sum(&[l.first_mortgage_loans, l.other_re_loans])
        });
        let vehicle_loans = current.loans.as_ref().and_then(|l| {
            opt_sum(&[l.new_vehicle_loans, l.used_vehicle_loans])
        });
        let unsecured_loans = current.loans.as_ref().and_then(|l| {
            opt_sum(&[l.credit_card_loans, l.other_unsecured_loans])
        });
        let commercial_loans = current
            .commercial
            .as_ref()
            .and_then(|c| c.commercial_loans_outstanding);

        row.re_loans_to_total_loans = pct_of(re_loans, loans);
        row.vehicle_loans_to_total_loans = pct_of(vehicle_loans, loans);
        row.commercial_loans_to_total_loans = pct_of(commercial_loans, loans);
        row.unsecured_loans_to_total_loans = pct_of(unsecured_loans, loans);
    }

    fn calculate_management(
        &self,
        current: &DomainRecords,
        prior_year_same_quarter: Option<&DomainRecords>,
        prior_year_q4: Option<&DomainRecords>,
        quarter: u8,
        row: &mut RatioRow,
    ) {
        let avg_assets = avg_balance(total_assets(current), prior_year_q4.and_then(total_assets));
        let opex = current
            .expenses
            .as_ref()
            .and_then(|e| e.total_operating_expenses);
        row.operating_expense_ratio = pct_of(annualize(opex, quarter), avg_assets);

        let prior = prior_year_same_quarter;
        row.asset_growth_yoy = yoy_growth(total_assets(current), prior.and_then(total_assets));
        row.loan_growth_yoy = yoy_growth(total_loans(current), prior.and_then(total_loans));
        row.share_growth_yoy = yoy_growth(total_shares(current), prior.and_then(total_shares));
        row.member_growth_yoy = yoy_growth(
            current.operations.as_ref().and_then(|o| o.members),
            prior.and_then(|p| p.operations.as_ref().and_then(|o| o.members)),
        );
    }

    fn calculate_earnings(
        &self,
        current: &DomainRecords,
        prior_year_q4: Option<&DomainRecords>,
        quarter: u8,
        row: &mut RatioRow,
    ) {
        let avg_assets = avg_balance(total_assets(current), prior_year_q4.and_then(total_assets));
        let avg_loans = avg_balance(total_loans(current), prior_year_q4.and_then(total_loans));

        let net_income = annualize(
            current.net_income.as_ref().and_then(|n| n.net_income),
            quarter,
        );
        row.roa = pct_of(net_income, total_assets(current));
        row.roaa = pct_of(net_income, avg_assets);
        row.roe = pct_of(net_income, net_worth(current));

        let interest_on_loans = current.revenue.as_ref().and_then(|r| r.interest_on_loans);
        let investment_income = current.revenue.as_ref().and_then(|r| r.investment_income);
        let funding_cost = current.expenses.as_ref().and_then(|e| {
            opt_sum(&[
                e.dividends_on_shares,
                e.interest_on_deposits,
                e.interest_on_borrowed_money,
            ])
        });

        let net_interest_income = opt_sum(&[
            interest_on_loans,
            investment_income,
            funding_cost.map(|c| -c),
        ]);
        row.net_interest_margin = pct_of(annualize(net_interest_income, quarter), avg_assets);
        row.loan_yield = pct_of(annualize(interest_on_loans, quarter), avg_loans);
        row.cost_of_funds = pct_of(annualize(funding_cost, quarter), avg_assets);
    }

    fn calculate_liquidity(&self, current: &DomainRecords, row: &mut RatioRow) {
        let assets = total_assets(current);

        row.loans_to_shares = pct_of(total_loans(current), total_shares(current));

        let cash = current.assets.as_ref().and_then(|a| {
            opt_sum(&[a.cash_on_hand, a.cash_on_deposit])
        });
        row.cash_to_assets = pct_of(cash, assets);
        row.investments_to_assets = pct_of(
            current.assets.as_ref().and_then(|a| a.total_investments),
            assets,
        );
        row.borrowings_to_assets = pct_of(
            current.liquidity.as_ref().and_then(|l| l.total_borrowings),
            assets,
        );
    }
}

// Field extraction helpers, composable with `Option::and_then` over the
// historical snapshots.

fn total_assets(r: &DomainRecords) -> Option<Decimal> {
    r.assets.as_ref().and_then(|a| a.total_assets)
}

fn total_loans(r: &DomainRecords) -> Option<Decimal> {
    r.assets.as_ref().and_then(|a| a.total_loans)
}

fn total_shares(r: &DomainRecords) -> Option<Decimal> {
    r.liquidity.as_ref().and_then(|l| l.total_shares)
}

fn net_worth(r: &DomainRecords) -> Option<Decimal> {
    r.capital.as_ref().and_then(|c| c.total_net_worth)
}

/// Delinquency numerator: the 60-day-and-over aging buckets.
fn delinquent_60_plus(r: &DomainRecords) -> Option<Decimal> {
    r.delinquency.as_ref().and_then(|d| {
        opt_sum(&[d.del_60_179_days, d.del_180_359_days, d.del_360_plus_days])
    })
}

/// The allowance figure prefers a nonzero CECL-basis value and falls back to
/// the legacy allowance otherwise.
fn preferred_allowance(r: &DomainRecords) -> Option<Decimal> {
    let capital = r.capital.as_ref()?;
    match capital.allowance_cecl {
        Some(v) if !v.is_zero() => Some(v),
        _ => capital.allowance_legacy,
    }
}

/// Full-time-equivalent headcount: full-time plus half of part-time.
fn fte(r: &DomainRecords) -> Option<Decimal> {
    let ops = r.operations.as_ref()?;
    opt_sum(&[
        ops.full_time_employees,
        ops.part_time_employees.map(|p| p * dec!(0.5)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{
        AssetsRecord, CapitalRecord, ChargeOffsRecord, DelinquencyRecord, ExpensesRecord,
        LiquidityRecord, NetIncomeRecord, OperationsRecord, RevenueRecord,
    };

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn records_with_assets(total_assets: Decimal, total_loans: Decimal) -> DomainRecords {
        DomainRecords {
            assets: Some(AssetsRecord {
                total_assets: Some(total_assets),
                total_loans: Some(total_loans),
                ..AssetsRecord::default()
            }),
            ..DomainRecords::default()
        }
    }

    #[test]
    fn net_worth_ratio_rounds_to_two_places() {
        let mut current = records_with_assets(dec!(500), dec!(300));
        current.capital = Some(CapitalRecord {
            total_net_worth: Some(dec!(50)),
            ..CapitalRecord::default()
        });

        let row = RatioEngine::new().calculate(1234, period("2025-Q3"), &current, None, None);
        assert_eq!(row.net_worth_ratio, Some(dec!(10.00)));
        assert_eq!(row.period, "2025-Q3");
    }

    #[test]
    fn zero_assets_yield_null_ratios_not_errors() {
        let mut current = records_with_assets(Decimal::ZERO, Decimal::ZERO);
        current.capital = Some(CapitalRecord {
            total_net_worth: Some(dec!(50)),
            ..CapitalRecord::default()
        });

        let row = RatioEngine::new().calculate(1234, period("2025-Q1"), &current, None, None);
        assert_eq!(row.net_worth_ratio, None);
        assert_eq!(row.total_assets, Some(Decimal::ZERO));
    }

    #[test]
    fn growth_null_without_prior_quarter_but_averaging_still_applies() {
        // The end-to-end scenario: Q3, assets 500, net worth 50, prior-year Q4
        // assets 450 but no prior-year same-quarter snapshot. Growth must stay
        // null while ROAA-style ratios still average against 475.
        let mut current = records_with_assets(dec!(500), dec!(300));
        current.capital = Some(CapitalRecord {
            total_net_worth: Some(dec!(50)),
            ..CapitalRecord::default()
        });
        // 28.5 YTD through Q3 annualizes to 38; 38 / 475 = 8%.
        current.net_income = Some(NetIncomeRecord {
            net_income: Some(dec!(28.5)),
        });
        let prior_q4 = records_with_assets(dec!(450), dec!(280));

        let row = RatioEngine::new().calculate(
            1234,
            period("2025-Q3"),
            &current,
            None,
            Some(&prior_q4),
        );

        assert_eq!(row.net_worth_ratio, Some(dec!(10.00)));
        assert_eq!(row.asset_growth_yoy, None);
        assert_eq!(row.roaa, Some(dec!(8.00)));
    }

    #[test]
    fn yoy_growth_against_prior_year_quarter() {
        let current = records_with_assets(dec!(600), dec!(330));
        let prior_q = records_with_assets(dec!(500), dec!(300));

        let row = RatioEngine::new().calculate(
            1234,
            period("2025-Q2"),
            &current,
            Some(&prior_q),
            None,
        );

        assert_eq!(row.asset_growth_yoy, Some(dec!(20.00)));
        assert_eq!(row.loan_growth_yoy, Some(dec!(10.00)));
        assert_eq!(row.share_growth_yoy, None);
    }

    #[test]
    fn allowance_prefers_nonzero_cecl() {
        let mut with_cecl = records_with_assets(dec!(1000), dec!(500));
        with_cecl.capital = Some(CapitalRecord {
            total_net_worth: None,
            allowance_cecl: Some(dec!(10)),
            allowance_legacy: Some(dec!(4)),
        });
        let row = RatioEngine::new().calculate(1, period("2025-Q4"), &with_cecl, None, None);
        assert_eq!(row.allowance_to_total_loans, Some(dec!(2.00)));

        let mut zero_cecl = records_with_assets(dec!(1000), dec!(500));
        zero_cecl.capital = Some(CapitalRecord {
            total_net_worth: None,
            allowance_cecl: Some(Decimal::ZERO),
            allowance_legacy: Some(dec!(4)),
        });
        let row = RatioEngine::new().calculate(1, period("2025-Q4"), &zero_cecl, None, None);
        assert_eq!(row.allowance_to_total_loans, Some(dec!(0.80)));
    }

    #[test]
    fn charge_off_ratio_annualizes_net_charge_offs() {
        // Q2: (6 - 2) YTD doubles to 8 annualized; 8 / avg loans 400 = 2%.
        let mut current = records_with_assets(dec!(1000), dec!(420));
        current.charge_offs = Some(ChargeOffsRecord {
            charge_offs_ytd: Some(dec!(6)),
            recoveries_ytd: Some(dec!(2)),
        });
        let prior_q4 = records_with_assets(dec!(900), dec!(380));

        let row = RatioEngine::new().calculate(
            1,
            period("2025-Q2"),
            &current,
            None,
            Some(&prior_q4),
        );
        assert_eq!(row.charge_off_ratio, Some(dec!(2.00)));
    }

    #[test]
    fn delinquency_rate_counts_sixty_plus_buckets_only() {
        let mut current = records_with_assets(dec!(1000), dec!(500));
        current.delinquency = Some(DelinquencyRecord {
            del_30_59_days: Some(dec!(99)),
            del_60_179_days: Some(dec!(6)),
            del_180_359_days: Some(dec!(3)),
            del_360_plus_days: Some(dec!(1)),
        });

        let row = RatioEngine::new().calculate(1, period("2025-Q1"), &current, None, None);
        assert_eq!(row.delinquency_rate, Some(dec!(2.00)));
    }

    #[test]
    fn fte_counts_part_time_as_half() {
        let mut current = records_with_assets(dec!(1050), dec!(500));
        current.operations = Some(OperationsRecord {
            members: Some(dec!(9000)),
            full_time_employees: Some(dec!(9)),
            part_time_employees: Some(dec!(3)),
        });

        let row = RatioEngine::new().calculate(1, period("2025-Q1"), &current, None, None);
        assert_eq!(row.employees_fte, Some(dec!(10.5)));
        // 1050 / 10.5 = 100, already whole; rounding applies to the division.
        assert_eq!(row.assets_per_employee, Some(dec!(100)));
    }

    #[test]
    fn earnings_ratios_annualize_income_statement_figures() {
        // Q1 figures are multiplied by 4.
        let mut current = records_with_assets(dec!(1000), dec!(500));
        current.capital = Some(CapitalRecord {
            total_net_worth: Some(dec!(100)),
            ..CapitalRecord::default()
        });
        current.net_income = Some(NetIncomeRecord {
            net_income: Some(dec!(2.5)),
        });
        current.revenue = Some(RevenueRecord {
            interest_on_loans: Some(dec!(7.5)),
            investment_income: Some(dec!(1.25)),
            ..RevenueRecord::default()
        });
        current.expenses = Some(ExpensesRecord {
            dividends_on_shares: Some(dec!(2.5)),
            interest_on_deposits: None,
            interest_on_borrowed_money: Some(dec!(1.25)),
            ..ExpensesRecord::default()
        });

        let row = RatioEngine::new().calculate(1, period("2025-Q1"), &current, None, None);
        assert_eq!(row.roa, Some(dec!(1.00)));
        assert_eq!(row.roe, Some(dec!(10.00)));
        // (7.5 + 1.25 - 3.75) * 4 = 20; 20 / 1000 = 2%.
        assert_eq!(row.net_interest_margin, Some(dec!(2.00)));
        // 7.5 * 4 / 500 = 6%.
        assert_eq!(row.loan_yield, Some(dec!(6.00)));
        // 3.75 * 4 / 1000 = 1.5%.
        assert_eq!(row.cost_of_funds, Some(dec!(1.50)));
    }

    #[test]
    fn liquidity_ratios_from_balance_sheet_figures() {
        let mut current = DomainRecords {
            assets: Some(AssetsRecord {
                total_assets: Some(dec!(1000)),
                total_loans: Some(dec!(600)),
                total_investments: Some(dec!(200)),
                cash_on_hand: Some(dec!(30)),
                cash_on_deposit: Some(dec!(70)),
            }),
            ..DomainRecords::default()
        };
        current.liquidity = Some(LiquidityRecord {
            total_shares: Some(dec!(800)),
            total_borrowings: Some(dec!(50)),
        });

        let row = RatioEngine::new().calculate(1, period("2025-Q3"), &current, None, None);
        assert_eq!(row.loans_to_shares, Some(dec!(75.00)));
        assert_eq!(row.cash_to_assets, Some(dec!(10.00)));
        assert_eq!(row.investments_to_assets, Some(dec!(20.00)));
        assert_eq!(row.borrowings_to_assets, Some(dec!(5.00)));
    }

    #[test]
    fn recomputation_is_deterministic() {
        let mut current = records_with_assets(dec!(500), dec!(300));
        current.capital = Some(CapitalRecord {
            total_net_worth: Some(dec!(50)),
            ..CapitalRecord::default()
        });
        let engine = RatioEngine::new();

        let first = engine.calculate(77, period("2024-Q4"), &current, None, None);
        let second = engine.calculate(77, period("2024-Q4"), &current, None, None);
        assert_eq!(first, second);
    }
}
