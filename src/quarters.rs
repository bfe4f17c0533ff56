use anyhow::bail;
use core_types::{CoreError, Period};
use provider_client::RecordProvider;

/// Turns the CLI's period selection into a concrete, ascending list of
/// periods to process.
///
/// - one positional period: just that period;
/// - two positional periods: the inclusive range, wrapping Q4 into Q1;
/// - `--all` / `--latest`: ask the typed-record provider which periods it
///   actually holds and take all of them, or only the last one.
pub async fn resolve(
    periods: &[String],
    latest: bool,
    all: bool,
    provider: &dyn RecordProvider,
) -> anyhow::Result<Vec<Period>> {
    if latest || all {
        let known = provider.distinct_periods().await?;
        if known.is_empty() {
            bail!(CoreError::NoDataAvailable);
        }
        if latest {
            // Non-empty, so last() always yields a period.
            return Ok(known.last().copied().into_iter().collect());
        }
        return Ok(known);
    }

    match periods {
        [single] => Ok(vec![single.parse()?]),
        [start, end] => {
            let start: Period = start.parse()?;
            let end: Period = end.parse()?;
            let range = Period::range_inclusive(start, end);
            if range.is_empty() {
                bail!("Invalid range: {start} to {end}");
            }
            Ok(range)
        }
        _ => bail!("Expected one period, a start and end period, or --latest/--all"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::DomainRecords;
    use provider_client::ProviderError;
    use std::collections::HashMap;

    struct MockProvider {
        periods: Vec<Period>,
    }

    #[async_trait]
    impl RecordProvider for MockProvider {
        async fn fetch_period(
            &self,
            _period: Period,
        ) -> Result<HashMap<i64, DomainRecords>, ProviderError> {
            Ok(HashMap::new())
        }

        async fn distinct_periods(&self) -> Result<Vec<Period>, ProviderError> {
            Ok(self.periods.clone())
        }
    }

    fn provider(labels: &[&str]) -> MockProvider {
        MockProvider {
            periods: labels.iter().map(|l| l.parse().unwrap()).collect(),
        }
    }

    #[tokio::test]
    async fn single_period_is_parsed() {
        let resolved = resolve(&["2025-Q3".to_string()], false, false, &provider(&[]))
            .await
            .unwrap();
        assert_eq!(resolved, vec!["2025-Q3".parse().unwrap()]);
    }

    #[tokio::test]
    async fn range_expands_inclusively_across_years() {
        let resolved = resolve(
            &["2024-Q4".to_string(), "2025-Q2".to_string()],
            false,
            false,
            &provider(&[]),
        )
        .await
        .unwrap();
        let labels: Vec<String> = resolved.iter().map(Period::label).collect();
        assert_eq!(labels, vec!["2024-Q4", "2025-Q1", "2025-Q2"]);
    }

    #[tokio::test]
    async fn malformed_period_is_rejected() {
        let err = resolve(&["2025-Q7".to_string()], false, false, &provider(&[]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid period format"));
    }

    #[tokio::test]
    async fn latest_takes_the_newest_known_period() {
        let resolved = resolve(&[], true, false, &provider(&["2024-Q4", "2025-Q1", "2025-Q2"]))
            .await
            .unwrap();
        assert_eq!(resolved, vec!["2025-Q2".parse().unwrap()]);
    }

    #[tokio::test]
    async fn all_takes_every_known_period() {
        let resolved = resolve(&[], false, true, &provider(&["2024-Q4", "2025-Q1"]))
            .await
            .unwrap();
        assert_eq!(resolved.len(), 2);
    }

    #[tokio::test]
    async fn latest_with_no_known_periods_fails() {
        let err = resolve(&[], true, false, &provider(&[])).await.unwrap_err();
        assert!(err.to_string().contains("no reporting periods"));
    }
}
