use crate::DbError;
use core_types::Period;
use ratios::{METRIC_CATALOG, RatioRow};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, QueryBuilder, Row};
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the ratio store. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A row from the `credit_unions` identity table: the mapping between a
/// credit union's stable charter number and its internal identifier.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CreditUnion {
    pub id: Uuid,
    pub cu_number: i64,
    pub name: Option<String>,
}

/// The outcome of a best-effort batched write: how many rows were attempted,
/// how many landed, and how many batches failed along the way.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOutcome {
    pub attempted: usize,
    pub written: usize,
    pub failed_batches: usize,
}

/// The metric column list, derived from the static catalog so the store
/// schema and the unpivot can never drift apart.
fn metric_columns() -> String {
    METRIC_CATALOG
        .iter()
        .map(|m| m.name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Ensures a bare identity row exists for every charter number seen in a
    /// period. `ON CONFLICT DO NOTHING` keeps this idempotent; enrichment
    /// (names, fields beyond the charter) is owned by the identity
    /// collaborator, not this subsystem.
    pub async fn ensure_credit_unions(&self, charters: &[i64]) -> Result<(), DbError> {
        if charters.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("INSERT INTO credit_unions (cu_number) ");
        qb.push_values(charters, |mut b, charter| {
            b.push_bind(*charter);
        });
        qb.push(" ON CONFLICT (cu_number) DO NOTHING");
        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    /// Resolves an internal identifier to its identity row.
    pub async fn get_credit_union_by_id(&self, id: Uuid) -> Result<Option<CreditUnion>, DbError> {
        let cu = sqlx::query_as::<_, CreditUnion>(
            "SELECT id, cu_number, name FROM credit_unions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cu)
    }

    /// Resolves a charter number to its identity row.
    pub async fn get_credit_union_by_charter(
        &self,
        cu_number: i64,
    ) -> Result<Option<CreditUnion>, DbError> {
        let cu = sqlx::query_as::<_, CreditUnion>(
            "SELECT id, cu_number, name FROM credit_unions WHERE cu_number = $1",
        )
        .bind(cu_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cu)
    }

    // ------------------------------------------------------------------
    // Ratio store writes
    // ------------------------------------------------------------------

    /// Upserts one batch of ratio rows, keyed by (cu_number, year, quarter).
    /// A row for an already-computed period is replaced wholesale: every
    /// metric column is overwritten from the new row, never merged.
    pub async fn upsert_ratio_rows(&self, rows: &[RatioRow]) -> Result<u64, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "INSERT INTO camel_ratios (cu_number, year, quarter, period, {}) ",
            metric_columns()
        ));
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.cu_number)
                .push_bind(row.year)
                .push_bind(row.quarter)
                .push_bind(row.period.clone());
            for metric in METRIC_CATALOG {
                b.push_bind((metric.accessor)(row));
            }
        });

        let updates = METRIC_CATALOG
            .iter()
            .map(|m| format!("{0} = EXCLUDED.{0}", m.name))
            .collect::<Vec<_>>()
            .join(", ");
        qb.push(" ON CONFLICT (cu_number, year, quarter) DO UPDATE SET period = EXCLUDED.period, ");
        qb.push(updates);
        qb.push(", computed_at = now()");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Writes ratio rows in batches of `batch_size`. A failed batch is
    /// logged with its size and cause and counted, and the remaining batches
    /// still run: the writer maximizes successfully written rows rather than
    /// aborting the whole period.
    pub async fn upsert_ratio_rows_batched(
        &self,
        rows: &[RatioRow],
        batch_size: usize,
    ) -> WriteOutcome {
        let mut outcome = WriteOutcome {
            attempted: rows.len(),
            ..WriteOutcome::default()
        };

        for batch in rows.chunks(batch_size.max(1)) {
            match self.upsert_ratio_rows(batch).await {
                Ok(_) => outcome.written += batch.len(),
                Err(e) => {
                    outcome.failed_batches += 1;
                    tracing::error!(
                        batch_size = batch.len(),
                        error = %e,
                        "failed to upsert ratio batch; continuing"
                    );
                }
            }
        }

        outcome
    }

    // ------------------------------------------------------------------
    // Ratio store reads
    // ------------------------------------------------------------------

    /// The most recent period for which this credit union has a ratio row.
    pub async fn latest_period_for(&self, cu_number: i64) -> Result<Option<Period>, DbError> {
        let row = sqlx::query(
            "SELECT year, quarter FROM camel_ratios WHERE cu_number = $1 \
             ORDER BY year DESC, quarter DESC LIMIT 1",
        )
        .bind(cu_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Period {
            year: r.get::<i32, _>("year"),
            quarter: r.get::<i32, _>("quarter") as u8,
        }))
    }

    /// Fetches one credit union's ratio row for one period.
    pub async fn get_ratio_row(
        &self,
        cu_number: i64,
        period: Period,
    ) -> Result<Option<RatioRow>, DbError> {
        let sql = format!(
            "SELECT cu_number, year, quarter, period, {} FROM camel_ratios \
             WHERE cu_number = $1 AND year = $2 AND quarter = $3",
            metric_columns()
        );
        let row = sqlx::query(&sql)
            .bind(cu_number)
            .bind(period.year)
            .bind(period.quarter as i32)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_ratio(&r)).transpose().map_err(Into::into)
    }

    /// Fetches every ratio row for one period, the raw material for cohort
    /// selection. One row per credit union by the uniqueness constraint.
    pub async fn get_ratio_rows_for_period(
        &self,
        period: Period,
    ) -> Result<Vec<RatioRow>, DbError> {
        let sql = format!(
            "SELECT cu_number, year, quarter, period, {} FROM camel_ratios \
             WHERE year = $1 AND quarter = $2 ORDER BY cu_number ASC",
            metric_columns()
        );
        let rows = sqlx::query(&sql)
            .bind(period.year)
            .bind(period.quarter as i32)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| row_to_ratio(r).map_err(Into::into))
            .collect()
    }
}

/// Maps one `camel_ratios` row back into the wide `RatioRow`.
fn row_to_ratio(row: &PgRow) -> Result<RatioRow, sqlx::Error> {
    Ok(RatioRow {
        cu_number: row.try_get("cu_number")?,
        year: row.try_get("year")?,
        quarter: row.try_get("quarter")?,
        period: row.try_get("period")?,

        total_assets: row.try_get("total_assets")?,
        total_loans: row.try_get("total_loans")?,
        total_shares: row.try_get("total_shares")?,
        total_net_worth: row.try_get("total_net_worth")?,
        total_members: row.try_get("total_members")?,
        employees_fte: row.try_get("employees_fte")?,
        assets_per_employee: row.try_get("assets_per_employee")?,

        net_worth_ratio: row.try_get("net_worth_ratio")?,
        net_worth_growth_yoy: row.try_get("net_worth_growth_yoy")?,

        delinquency_rate: row.try_get("delinquency_rate")?,
        charge_off_ratio: row.try_get("charge_off_ratio")?,
        allowance_coverage: row.try_get("allowance_coverage")?,
        allowance_to_total_loans: row.try_get("allowance_to_total_loans")?,
        re_loans_to_total_loans: row.try_get("re_loans_to_total_loans")?,
        vehicle_loans_to_total_loans: row.try_get("vehicle_loans_to_total_loans")?,
        commercial_loans_to_total_loans: row.try_get("commercial_loans_to_total_loans")?,
        unsecured_loans_to_total_loans: row.try_get("unsecured_loans_to_total_loans")?,

        operating_expense_ratio: row.try_get("operating_expense_ratio")?,
        asset_growth_yoy: row.try_get("asset_growth_yoy")?,
        loan_growth_yoy: row.try_get("loan_growth_yoy")?,
        share_growth_yoy: row.try_get("share_growth_yoy")?,
        member_growth_yoy: row.try_get("member_growth_yoy")?,

        roa: row.try_get("roa")?,
        roaa: row.try_get("roaa")?,
        roe: row.try_get("roe")?,
        net_interest_margin: row.try_get("net_interest_margin")?,
        loan_yield: row.try_get("loan_yield")?,
        cost_of_funds: row.try_get("cost_of_funds")?,

        loans_to_shares: row.try_get("loans_to_shares")?,
        cash_to_assets: row.try_get("cash_to_assets")?,
        investments_to_assets: row.try_get("investments_to_assets")?,
        borrowings_to_assets: row.try_get("borrowings_to_assets")?,
    })
}
