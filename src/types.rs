//! Core types and data structures for the ledger system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account types following standard accounting classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Receivables, Equipment, etc.)
    Asset,
    /// Liabilities - what the business owes (Payables, Loans, GST Collected, etc.)
    Liability,
    /// Equity - owner's interest in the business
    Equity,
    /// Revenue - money earned by the business
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    /// Returns the entry direction that increases a balance of this type.
    /// Assets and Expenses grow on the debit side; Liabilities, Equity and
    /// Revenue grow on the credit side.
    pub fn increases_on(&self) -> EntryType {
        match self {
            AccountType::Asset | AccountType::Expense => EntryType::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                EntryType::Credit
            }
        }
    }
}

/// Direction of a ledger transaction. The effect on an account's balance
/// depends on the account's type, not on the sign of the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

/// Lifecycle of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Cleared,
    Reconciled,
}

/// Chart-of-accounts entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Sortable code, unique within an organization (e.g. "1000")
    pub code: String,
    pub name: String,
    /// Immutable after creation; reassigning the type would silently corrupt
    /// every historical report that references this account.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Optional tax treatment label ("GST", "GST Free", "Input Taxed")
    pub tax_type: Option<String>,
    pub parent_account_id: Option<Uuid>,
    /// Accounts are soft-deleted (`is_active = false`), never removed, since
    /// transactions keep referencing them.
    pub is_active: bool,
}

/// Input for creating an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub organization_id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub tax_type: Option<String>,
    #[serde(default)]
    pub parent_account_id: Option<Uuid>,
}

/// Partial update for an account. There is deliberately no `account_type`
/// field here: the type is fixed at creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub tax_type: Option<String>,
    pub parent_account_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// A dated, typed ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Unlinked transactions are excluded from balance-sheet/P&L account
    /// grouping but still count toward cash-flow day totals.
    pub account_id: Option<Uuid>,
    pub transaction_date: NaiveDate,
    /// Always non-negative; direction is carried by `entry_type`.
    pub amount: BigDecimal,
    pub description: String,
    /// Natural dedup key for bank-feed sync
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub category: Option<String>,
    pub status: TransactionStatus,
    pub created_by: Uuid,
}

/// Input for creating a transaction. Accepts the legacy camelCase field
/// names as serde aliases so dual-format payloads normalize to one canonical
/// shape at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default, alias = "accountId")]
    pub account_id: Option<Uuid>,
    #[serde(alias = "transactionDate")]
    pub transaction_date: NaiveDate,
    pub amount: BigDecimal,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub category: Option<String>,
}

/// Partial update for a transaction. `account_id` is doubly optional so a
/// patch can distinguish "leave unchanged" from "unlink the account".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, alias = "accountId")]
    pub account_id: Option<Option<Uuid>>,
    #[serde(default, alias = "transactionDate")]
    pub transaction_date: Option<NaiveDate>,
    pub amount: Option<BigDecimal>,
    pub description: Option<String>,
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<EntryType>,
    pub category: Option<String>,
}

/// Invoice lifecycle. `Overdue` is derived lazily when a sent invoice's due
/// date passes; there is no scheduled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

/// Postal address on an invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

/// One line of an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    /// Per-line tax rate; `None` means the standard 10% GST
    #[serde(default)]
    pub tax_rate: Option<BigDecimal>,
}

/// Customer invoice with computed totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// `INV-%04d`, strictly increasing per organization
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<CustomerAddress>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total: BigDecimal,
    pub status: InvoiceStatus,
    pub line_items: Vec<LineItem>,
    pub notes: Option<String>,
}

/// Input for creating an invoice. Number and totals are filled in by the
/// invoice engine when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub organization_id: Uuid,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_address: Option<CustomerAddress>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub subtotal: Option<BigDecimal>,
    #[serde(default)]
    pub tax_amount: Option<BigDecimal>,
    #[serde(default)]
    pub total: Option<BigDecimal>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for an invoice. Totals are recomputed only when
/// `line_items` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<CustomerAddress>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub line_items: Option<Vec<LineItem>>,
    pub notes: Option<String>,
}

/// Lifecycle of a stored BAS statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasStatus {
    Draft,
    Ready,
    Lodged,
    Rejected,
}

/// Persisted snapshot of a BAS (Business Activity Statement) calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasStatement {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Period label as supplied ("Q2-2024" or "2023-2024")
    pub period: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_sales: BigDecimal,
    pub total_purchases: BigDecimal,
    pub gst_collected: BigDecimal,
    pub gst_paid: BigDecimal,
    pub net_gst: BigDecimal,
    pub status: BasStatus,
}

/// Best-effort audit record emitted by mutating ledger operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub organization_id: Uuid,
    pub actor: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub changes: serde_json::Value,
}

/// Errors surfaced by the ledger core.
///
/// `NotFound` deliberately names only the entity kind, never whether the id
/// exists under a different organization; the two cases must stay
/// indistinguishable to callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// A linked record the operation depends on is missing. Callers decide
    /// whether this is fatal; invoice payment treats it as a soft failure.
    #[error("Missing dependency: {0}")]
    Dependency(String),
    #[error("Storage error: {0}")]
    Store(String),
}

/// Result type for ledger operations
pub type CoreResult<T> = Result<T, CoreError>;
