use configuration::settings::Settings;
use core_types::Period;
use database::DbRepository;
use indicatif::{ProgressBar, ProgressStyle};
use provider_client::RecordProvider;
use ratios::{RatioEngine, RatioRow};

/// Summary of one multi-period batch run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub periods_processed: usize,
    pub periods_skipped: usize,
    pub periods_failed: usize,
    pub rows_written: usize,
    pub rows_attempted: usize,
}

/// Runs the batch pipeline over the resolved periods: for each period,
/// fetch the current typed records plus the two historical reference
/// snapshots, compute one ratio row per credit union, and upsert them in
/// batches.
///
/// Periods are independent units of work. A failure while reading or
/// computing one period is a hard fault for that period only: it is logged,
/// counted, and the run moves on. In `dry_run` mode everything is computed
/// and logged but nothing is written.
pub async fn run(
    provider: &dyn RecordProvider,
    db_repo: &DbRepository,
    settings: &Settings,
    periods: &[Period],
    dry_run: bool,
) -> anyhow::Result<RunSummary> {
    let engine = RatioEngine::new();
    let mut summary = RunSummary::default();

    let progress_bar = ProgressBar::new(periods.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for &period in periods {
        progress_bar.set_message(format!("Computing {period}..."));

        match run_period(provider, db_repo, settings, &engine, period, dry_run).await {
            Ok(PeriodOutcome::Skipped) => summary.periods_skipped += 1,
            Ok(PeriodOutcome::Done { written, attempted }) => {
                summary.periods_processed += 1;
                summary.rows_written += written;
                summary.rows_attempted += attempted;
            }
            Err(e) => {
                summary.periods_failed += 1;
                tracing::error!(period = %period, error = %e, "period failed; continuing");
            }
        }

        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Batch run complete");
    tracing::info!(
        processed = summary.periods_processed,
        skipped = summary.periods_skipped,
        failed = summary.periods_failed,
        rows_written = summary.rows_written,
        rows_attempted = summary.rows_attempted,
        "run summary"
    );

    Ok(summary)
}

enum PeriodOutcome {
    /// The provider holds no typed records for this period.
    Skipped,
    Done { written: usize, attempted: usize },
}

async fn run_period(
    provider: &dyn RecordProvider,
    db_repo: &DbRepository,
    settings: &Settings,
    engine: &RatioEngine,
    period: Period,
    dry_run: bool,
) -> anyhow::Result<PeriodOutcome> {
    // The three snapshot reads are independent read-only queries; a failure
    // on any of them aborts this period's batch.
    let (current, prior_year_quarter, prior_year_q4) = tokio::try_join!(
        provider.fetch_period(period),
        provider.fetch_period(period.prior_year_same_quarter()),
        provider.fetch_period(period.prior_year_q4()),
    )?;

    if current.is_empty() {
        tracing::warn!(period = %period, "no typed records for period, skipping");
        return Ok(PeriodOutcome::Skipped);
    }

    let mut rows: Vec<RatioRow> = current
        .iter()
        .map(|(&cu_number, records)| {
            engine.calculate(
                cu_number,
                period,
                records,
                prior_year_quarter.get(&cu_number),
                prior_year_q4.get(&cu_number),
            )
        })
        .collect();
    // Deterministic write order regardless of map iteration.
    rows.sort_by_key(|r| r.cu_number);

    if dry_run {
        tracing::info!(
            period = %period,
            rows = rows.len(),
            "dry run: computed ratio rows, skipping write"
        );
        return Ok(PeriodOutcome::Done {
            written: 0,
            attempted: rows.len(),
        });
    }

    let charters: Vec<i64> = rows.iter().map(|r| r.cu_number).collect();
    db_repo.ensure_credit_unions(&charters).await?;

    let outcome = db_repo
        .upsert_ratio_rows_batched(&rows, settings.pipeline.write_batch_size)
        .await;
    tracing::info!(
        period = %period,
        written = outcome.written,
        attempted = outcome.attempted,
        failed_batches = outcome.failed_batches,
        "{}/{} rows written for {}",
        outcome.written,
        outcome.attempted,
        period
    );

    Ok(PeriodOutcome::Done {
        written: outcome.written,
        attempted: outcome.attempted,
    })
}
