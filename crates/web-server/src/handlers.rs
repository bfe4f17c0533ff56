use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use database::CreditUnion;
use peers::{PeerEngine, PercentileResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// The asset-size tier for cohort selection: lower bound inclusive, upper
/// bound exclusive, in dollars.
#[derive(Debug, Deserialize)]
pub struct TierQuery {
    pub tier_min: Decimal,
    pub tier_max: Decimal,
}

/// # GET /api/credit-unions/:id
/// Resolves an internal identifier to its identity row.
pub async fn get_credit_union(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CreditUnion>, AppError> {
    let cu = state
        .db_repo
        .get_credit_union_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("credit union {id} not found")))?;
    Ok(Json(cu))
}

/// # GET /api/credit-unions/:id/peers?tier_min=..&tier_max=..
/// Compares the credit union's latest ratio row against the same-period peer
/// cohort in the requested asset tier. Results are sorted by category, then
/// metric name, for stable rendering.
pub async fn get_peer_comparison(
    Path(id): Path<Uuid>,
    Query(tier): Query<TierQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PercentileResult>>, AppError> {
    // Reject inverted tier bounds up front, before any database work.
    let engine = PeerEngine::new(tier.tier_min, tier.tier_max)?;

    let cu = state
        .db_repo
        .get_credit_union_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("credit union {id} not found")))?;

    let mut results = engine.run(&state.db_repo, cu.cu_number).await?;
    results.sort_by(|a, b| (a.category, a.metric.as_str()).cmp(&(b.category, b.metric.as_str())));

    Ok(Json(results))
}
