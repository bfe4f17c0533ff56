pub mod error;
pub mod period;
pub mod records;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use period::Period;
pub use records::{
    AssetsRecord, CapitalRecord, ChargeOffsRecord, CommercialRecord, DelinquencyRecord,
    DomainRecords, ExpensesRecord, LiquidityRecord, LoansRecord, NetIncomeRecord,
    OperationsRecord, RevenueRecord,
};
