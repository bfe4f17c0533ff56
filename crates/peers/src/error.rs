use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeerError {
    #[error("Invalid peer tier bounds: min {min} must be strictly less than max {max}")]
    InvalidTierBounds { min: Decimal, max: Decimal },

    #[error("No ratio history found for credit union #{0}")]
    NoRatioDataForEntity(i64),

    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
}
