//! Storage abstraction required by the ledger core
//!
//! The core never talks to a database directly; every component is generic
//! over [`DataStore`], which a backend (Postgres, SQLite, in-memory, ...)
//! implements. Implementations are expected to bound every call with a
//! timeout and surface failures as [`CoreError::Store`](crate::types::CoreError)
//! rather than hang.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Default page size for transaction listings
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Filters for paging through the transaction ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl TransactionFilter {
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// One page of transactions plus the unpaged row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Outcome of a conditional status update.
///
/// Status transitions are compare-and-swap operations so that two racing
/// callers cannot both take the same transition; the store must evaluate the
/// precondition and the write atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSwap<T> {
    /// Precondition held; the updated record is returned
    Updated(T),
    /// Record exists but its current status was not in the expected set
    Refused,
    /// No such record within the caller's organization
    Missing,
}

/// Storage operations the ledger core requires.
///
/// All lookups are organization-scoped: an id that exists under another
/// organization behaves exactly like a missing id.
#[async_trait]
pub trait DataStore: Send + Sync {
    // --- accounts ---

    /// Insert one account. Fails with `Conflict` when the organization
    /// already has an account with the same code.
    async fn insert_account(&mut self, account: &Account) -> CoreResult<()>;

    /// Insert a batch of accounts, returning the number inserted
    async fn insert_accounts(&mut self, accounts: &[Account]) -> CoreResult<usize>;

    /// List accounts ordered by code ascending
    async fn get_accounts(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> CoreResult<Vec<Account>>;

    async fn get_account(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Option<Account>>;

    async fn get_account_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> CoreResult<Option<Account>>;

    async fn update_account(&mut self, account: &Account) -> CoreResult<()>;

    // --- transactions ---

    async fn insert_transaction(&mut self, transaction: &Transaction) -> CoreResult<()>;

    /// Insert a batch in one call. If the backing store is atomic the batch
    /// is all-or-nothing; otherwise the returned count reflects the rows
    /// actually inserted.
    async fn bulk_insert_transactions(&mut self, transactions: &[Transaction])
        -> CoreResult<usize>;

    async fn get_transaction(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Option<Transaction>>;

    /// Filtered page ordered by transaction date descending, plus the total
    /// count of rows matching the filter
    async fn get_transactions(
        &self,
        organization_id: Uuid,
        filter: &TransactionFilter,
    ) -> CoreResult<(Vec<Transaction>, usize)>;

    /// Every transaction in the inclusive date window, unpaged. `None`
    /// bounds are open; reports use this to scan whole periods.
    async fn get_transactions_in_range(
        &self,
        organization_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<Vec<Transaction>>;

    async fn update_transaction(&mut self, transaction: &Transaction) -> CoreResult<()>;

    async fn delete_transaction(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()>;

    // --- invoices ---

    /// Insert an invoice. The store must enforce uniqueness of
    /// `(organization_id, invoice_number)` and fail with `Conflict` on a
    /// duplicate; this is what makes concurrent numbering safe.
    async fn insert_invoice(&mut self, invoice: &Invoice) -> CoreResult<()>;

    async fn get_invoice(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Option<Invoice>>;

    async fn list_invoices(&self, organization_id: Uuid) -> CoreResult<Vec<Invoice>>;

    /// Highest invoice number for the organization, or `None` when it has no
    /// invoices yet. "Highest" is by string ordering, which matches numeric
    /// ordering for the zero-padded `INV-%04d` scheme.
    async fn latest_invoice_number(&self, organization_id: Uuid) -> CoreResult<Option<String>>;

    async fn update_invoice(&mut self, invoice: &Invoice) -> CoreResult<()>;

    async fn delete_invoice(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()>;

    /// Atomically set the invoice status to `to` if the current status is in
    /// `expected`
    async fn swap_invoice_status(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        expected: &[InvoiceStatus],
        to: InvoiceStatus,
    ) -> CoreResult<StatusSwap<Invoice>>;

    // --- BAS statements ---

    async fn insert_bas_statement(&mut self, statement: &BasStatement) -> CoreResult<()>;

    async fn get_bas_statement(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Option<BasStatement>>;

    /// Atomically set the statement status to `to` if the current status is
    /// in `expected`
    async fn swap_bas_status(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        expected: &[BasStatus],
        to: BasStatus,
    ) -> CoreResult<StatusSwap<BasStatement>>;

    // --- audit ---

    /// Append an audit record. Callers treat failures as best-effort; the
    /// ledger logs and swallows them so the primary operation never fails on
    /// account of auditing.
    async fn append_audit(&mut self, record: &AuditRecord) -> CoreResult<()>;
}
