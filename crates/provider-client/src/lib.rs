use crate::responses::{PeriodRow, RecordRow};
use async_trait::async_trait;
use configuration::ProviderSettings;
use core_types::{
    AssetsRecord, CapitalRecord, ChargeOffsRecord, CommercialRecord, DelinquencyRecord,
    DomainRecords, ExpensesRecord, LiquidityRecord, LoansRecord, NetIncomeRecord,
    OperationsRecord, Period, RevenueRecord,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::ProviderError;

/// The generic, abstract interface to the typed-record provider.
/// This trait is the contract the batch pipeline works against, allowing the
/// underlying implementation (HTTP or mock) to be swapped out.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Fetches every credit union's typed records for one period, merged
    /// across all domains and keyed by charter number. An entity missing a
    /// domain simply has that domain absent.
    async fn fetch_period(&self, period: Period)
        -> Result<HashMap<i64, DomainRecords>, ProviderError>;

    /// Lists the distinct periods the provider holds, ascending.
    async fn distinct_periods(&self) -> Result<Vec<Period>, ProviderError>;
}

/// The provider-side table name for each typed domain.
const DOMAIN_TABLES: [&str; 11] = [
    "typed_assets",
    "typed_capital",
    "typed_revenue",
    "typed_expenses",
    "typed_net_income",
    "typed_loans",
    "typed_delinquency",
    "typed_charge_offs",
    "typed_commercial",
    "typed_liquidity",
    "typed_operations",
];

/// A concrete `RecordProvider` over the provider's PostgREST-style endpoint.
#[derive(Clone)]
pub struct PostgrestClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl PostgrestClient {
    /// Builds the client. The API key is read from the `PROVIDER_API_KEY`
    /// environment variable (loaded from `.env` by the binary) and sent on
    /// every request as header-based auth.
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = env::var("PROVIDER_API_KEY")
            .map_err(|_| ProviderError::MissingCredentials("PROVIDER_API_KEY must be set".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&api_key)
                .map_err(|_| ProviderError::MissingCredentials("PROVIDER_API_KEY is not a valid header value".to_string()))?,
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| ProviderError::MissingCredentials("PROVIDER_API_KEY is not a valid header value".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            page_size: settings.page_size,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ProviderError::Deserialization(e.to_string()))
        } else {
            Err(ProviderError::Api(status.as_u16(), text))
        }
    }

    /// Pages through one domain table for one period. The loop terminates on
    /// the short-page signal: a page with fewer rows than the page size.
    async fn fetch_domain_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        period: Period,
    ) -> Result<Vec<RecordRow<T>>, ProviderError> {
        let mut rows: Vec<RecordRow<T>> = Vec::new();
        let mut offset = 0usize;

        loop {
            let url = format!(
                "{}/rest/v1/{}?year=eq.{}&quarter=eq.{}&order=cu_number.asc&limit={}&offset={}",
                self.base_url, table, period.year, period.quarter, self.page_size, offset
            );
            let page: Vec<RecordRow<T>> = self.get_json(&url).await?;
            let last_page = is_last_page(page.len(), self.page_size);

            rows.extend(page);
            if last_page {
                break;
            }
            offset += self.page_size;
        }

        tracing::debug!(table, period = %period, rows = rows.len(), "fetched domain rows");
        Ok(rows)
    }
}

#[async_trait]
impl RecordProvider for PostgrestClient {
    async fn fetch_period(
        &self,
        period: Period,
    ) -> Result<HashMap<i64, DomainRecords>, ProviderError> {
        // The eleven domain reads are independent read-only queries, so they
        // are issued concurrently; the fan-out is bounded by the fixed domain
        // count.
        let (
            assets,
            capital,
            revenue,
            expenses,
            net_income,
            loans,
            delinquency,
            charge_offs,
            commercial,
            liquidity,
            operations,
        ) = futures::try_join!(
            self.fetch_domain_rows::<AssetsRecord>(DOMAIN_TABLES[0], period),
            self.fetch_domain_rows::<CapitalRecord>(DOMAIN_TABLES[1], period),
            self.fetch_domain_rows::<RevenueRecord>(DOMAIN_TABLES[2], period),
            self.fetch_domain_rows::<ExpensesRecord>(DOMAIN_TABLES[3], period),
            self.fetch_domain_rows::<NetIncomeRecord>(DOMAIN_TABLES[4], period),
            self.fetch_domain_rows::<LoansRecord>(DOMAIN_TABLES[5], period),
            self.fetch_domain_rows::<DelinquencyRecord>(DOMAIN_TABLES[6], period),
            self.fetch_domain_rows::<ChargeOffsRecord>(DOMAIN_TABLES[7], period),
            self.fetch_domain_rows::<CommercialRecord>(DOMAIN_TABLES[8], period),
            self.fetch_domain_rows::<LiquidityRecord>(DOMAIN_TABLES[9], period),
            self.fetch_domain_rows::<OperationsRecord>(DOMAIN_TABLES[10], period),
        )?;

        let mut merged: HashMap<i64, DomainRecords> = HashMap::new();
        merge_rows(&mut merged, assets, |r, v| r.assets = Some(v));
        merge_rows(&mut merged, capital, |r, v| r.capital = Some(v));
        merge_rows(&mut merged, revenue, |r, v| r.revenue = Some(v));
        merge_rows(&mut merged, expenses, |r, v| r.expenses = Some(v));
        merge_rows(&mut merged, net_income, |r, v| r.net_income = Some(v));
        merge_rows(&mut merged, loans, |r, v| r.loans = Some(v));
        merge_rows(&mut merged, delinquency, |r, v| r.delinquency = Some(v));
        merge_rows(&mut merged, charge_offs, |r, v| r.charge_offs = Some(v));
        merge_rows(&mut merged, commercial, |r, v| r.commercial = Some(v));
        merge_rows(&mut merged, liquidity, |r, v| r.liquidity = Some(v));
        merge_rows(&mut merged, operations, |r, v| r.operations = Some(v));

        Ok(merged)
    }

    async fn distinct_periods(&self) -> Result<Vec<Period>, ProviderError> {
        // PostgREST has no DISTINCT, so page through the (year, quarter)
        // projection of the smallest domain table and deduplicate here.
        let mut periods: BTreeSet<Period> = BTreeSet::new();
        let mut offset = 0usize;

        loop {
            let url = format!(
                "{}/rest/v1/typed_operations?select=year,quarter&order=year.asc,quarter.asc&limit={}&offset={}",
                self.base_url, self.page_size, offset
            );
            let page: Vec<PeriodRow> = self.get_json(&url).await?;
            let last_page = is_last_page(page.len(), self.page_size);

            for row in page {
                let period = Period::new(row.year, row.quarter)
                    .map_err(|e| ProviderError::InvalidData(e.to_string()))?;
                periods.insert(period);
            }
            if last_page {
                break;
            }
            offset += self.page_size;
        }

        Ok(periods.into_iter().collect())
    }
}

/// Whether a fetched page is the final one. Range pagination terminates on
/// the short-page signal: a page with fewer rows than the requested size.
/// An exactly-full page always continues, even when it happens to be the
/// last one, so the loop issues one extra (empty) fetch in that case rather
/// than risking dropped rows.
fn is_last_page(page_len: usize, page_size: usize) -> bool {
    page_len < page_size
}

/// Folds one domain's rows into the per-entity map.
fn merge_rows<T>(
    map: &mut HashMap<i64, DomainRecords>,
    rows: Vec<RecordRow<T>>,
    set: impl Fn(&mut DomainRecords, T),
) {
    for row in rows {
        set(map.entry(row.cu_number).or_default(), row.record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pagination_terminates_only_on_a_short_page() {
        assert!(is_last_page(0, 1000));
        assert!(is_last_page(999, 1000));
        // An exactly-full page must continue; stopping here could drop rows.
        assert!(!is_last_page(1000, 1000));
    }

    #[test]
    fn merge_rows_unions_entities_across_domains() {
        let mut map: HashMap<i64, DomainRecords> = HashMap::new();

        let assets = vec![
            RecordRow {
                cu_number: 1,
                record: AssetsRecord { total_assets: Some(dec!(100)), ..AssetsRecord::default() },
            },
            RecordRow {
                cu_number: 2,
                record: AssetsRecord { total_assets: Some(dec!(200)), ..AssetsRecord::default() },
            },
        ];
        let operations = vec![RecordRow {
            cu_number: 2,
            record: OperationsRecord { members: Some(dec!(500)), ..OperationsRecord::default() },
        }];

        merge_rows(&mut map, assets, |r, v| r.assets = Some(v));
        merge_rows(&mut map, operations, |r, v| r.operations = Some(v));

        assert_eq!(map.len(), 2);
        assert_eq!(map[&1].assets.as_ref().unwrap().total_assets, Some(dec!(100)));
        assert!(map[&1].operations.is_none());
        assert_eq!(map[&2].operations.as_ref().unwrap().members, Some(dec!(500)));
    }
}
