use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid period format: \"{0}\". Expected YYYY-QN (e.g. 2025-Q3)")]
    InvalidPeriodFormat(String),

    #[error("The typed-record provider holds no reporting periods")]
    NoDataAvailable,
}
