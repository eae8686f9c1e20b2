//! # Ledger Core
//!
//! A small-business accounting library providing a chart of accounts, a
//! transaction ledger, GST-aware invoicing, financial reporting and BAS
//! preparation.
//!
//! ## Features
//!
//! - **Chart of accounts**: typed accounts with a seedable Australian
//!   small-business default chart
//! - **Transaction ledger**: dated debit/credit entries with filtered
//!   paging, bulk import and reconciliation
//! - **Invoicing**: GST-inclusive totals, sequential numbering, a guarded
//!   payment lifecycle and automatic payment posting
//! - **Reporting**: profit & loss, balance sheet, cash flow and GST tax
//!   summaries over quarter or financial-year periods
//! - **BAS**: persisted activity statements with a lodgement lifecycle
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage
//!
//! ## Quick Start
//!
//! ```rust
//! use ledger_core::{AccountingEngine, MemoryStore};
//! use uuid::Uuid;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ledger_core::CoreError> {
//! let mut engine = AccountingEngine::new(MemoryStore::new());
//! let organization = Uuid::new_v4();
//!
//! // Seed the default chart of accounts
//! let seeded = engine.seed_accounts(organization).await?;
//! assert!(seeded > 0);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod invoice;
pub mod ledger;
pub mod report;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use engine::AccountingEngine;
pub use invoice::{compute_totals, InvoiceConfig, InvoiceEngine, InvoiceTotals};
pub use ledger::{default_chart_of_accounts, AccountRegistry, TransactionLedger};
pub use report::{
    BalanceSheetReport, CashflowReport, ProfitLossReport, ReportEngine, TaxPeriod,
    TaxSummaryReport,
};
pub use tax::{BasCalculator, BasPayload};
pub use traits::*;
pub use types::*;
pub use utils::memory_store::MemoryStore;
