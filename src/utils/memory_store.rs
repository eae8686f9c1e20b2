//! In-memory store implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// In-memory [`DataStore`] for testing and development.
///
/// Clones share the same underlying maps, matching how a pooled database
/// handle behaves. All compare-and-swap operations hold the write lock for
/// the whole check-then-update, so they are atomic across clones.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    transactions: Arc<RwLock<HashMap<Uuid, Transaction>>>,
    invoices: Arc<RwLock<HashMap<Uuid, Invoice>>>,
    bas_statements: Arc<RwLock<HashMap<Uuid, BasStatement>>>,
    audit_log: Arc<RwLock<Vec<AuditRecord>>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(HashMap::new())),
            invoices: Arc::new(RwLock::new(HashMap::new())),
            bas_statements: Arc::new(RwLock::new(HashMap::new())),
            audit_log: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.accounts.write().unwrap().clear();
        self.transactions.write().unwrap().clear();
        self.invoices.write().unwrap().clear();
        self.bas_statements.write().unwrap().clear();
        self.audit_log.write().unwrap().clear();
    }

    /// Snapshot of the audit log (useful for testing)
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit_log.read().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn in_range(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if let Some(start) = start {
        if date < start {
            return false;
        }
    }
    if let Some(end) = end {
        if date > end {
            return false;
        }
    }
    true
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn insert_account(&mut self, account: &Account) -> CoreResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        let duplicate = accounts.values().any(|existing| {
            existing.organization_id == account.organization_id && existing.code == account.code
        });
        if duplicate {
            return Err(CoreError::Conflict(format!(
                "Account code {} already exists",
                account.code
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn insert_accounts(&mut self, batch: &[Account]) -> CoreResult<usize> {
        let mut accounts = self.accounts.write().unwrap();
        for account in batch {
            let duplicate = accounts.values().any(|existing| {
                existing.organization_id == account.organization_id && existing.code == account.code
            });
            if duplicate {
                return Err(CoreError::Conflict(format!(
                    "Account code {} already exists",
                    account.code
                )));
            }
            accounts.insert(account.id, account.clone());
        }
        Ok(batch.len())
    }

    async fn get_accounts(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> CoreResult<Vec<Account>> {
        let accounts = self.accounts.read().unwrap();
        let mut filtered: Vec<Account> = accounts
            .values()
            .filter(|account| {
                account.organization_id == organization_id && (!active_only || account.is_active)
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(filtered)
    }

    async fn get_account(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .get(&id)
            .filter(|account| account.organization_id == organization_id)
            .cloned())
    }

    async fn get_account_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> CoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .values()
            .find(|account| account.organization_id == organization_id && account.code == code)
            .cloned())
    }

    async fn update_account(&mut self, account: &Account) -> CoreResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        match accounts.get(&account.id) {
            Some(existing) if existing.organization_id == account.organization_id => {
                accounts.insert(account.id, account.clone());
                Ok(())
            }
            _ => Err(CoreError::NotFound("Account")),
        }
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> CoreResult<()> {
        self.transactions
            .write()
            .unwrap()
            .insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn bulk_insert_transactions(
        &mut self,
        transactions: &[Transaction],
    ) -> CoreResult<usize> {
        let mut map = self.transactions.write().unwrap();
        for transaction in transactions {
            map.insert(transaction.id, transaction.clone());
        }
        Ok(transactions.len())
    }

    async fn get_transaction(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Option<Transaction>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .get(&id)
            .filter(|txn| txn.organization_id == organization_id)
            .cloned())
    }

    async fn get_transactions(
        &self,
        organization_id: Uuid,
        filter: &TransactionFilter,
    ) -> CoreResult<(Vec<Transaction>, usize)> {
        let transactions = self.transactions.read().unwrap();
        let mut matching: Vec<Transaction> = transactions
            .values()
            .filter(|txn| {
                txn.organization_id == organization_id
                    && in_range(txn.transaction_date, filter.start_date, filter.end_date)
                    && filter
                        .category
                        .as_ref()
                        .is_none_or(|c| txn.category.as_deref() == Some(c.as_str()))
                    && filter.status.is_none_or(|s| txn.status == s)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));

        let total = matching.len();
        let page: Vec<Transaction> = matching
            .into_iter()
            .skip(filter.effective_offset())
            .take(filter.effective_limit())
            .collect();
        Ok((page, total))
    }

    async fn get_transactions_in_range(
        &self,
        organization_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CoreResult<Vec<Transaction>> {
        let transactions = self.transactions.read().unwrap();
        let filtered: Vec<Transaction> = transactions
            .values()
            .filter(|txn| {
                txn.organization_id == organization_id
                    && in_range(txn.transaction_date, start, end)
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> CoreResult<()> {
        let mut transactions = self.transactions.write().unwrap();
        match transactions.get(&transaction.id) {
            Some(existing) if existing.organization_id == transaction.organization_id => {
                transactions.insert(transaction.id, transaction.clone());
                Ok(())
            }
            _ => Err(CoreError::NotFound("Transaction")),
        }
    }

    async fn delete_transaction(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()> {
        let mut transactions = self.transactions.write().unwrap();
        match transactions.get(&id) {
            Some(existing) if existing.organization_id == organization_id => {
                transactions.remove(&id);
                Ok(())
            }
            _ => Err(CoreError::NotFound("Transaction")),
        }
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> CoreResult<()> {
        let mut invoices = self.invoices.write().unwrap();
        let duplicate = invoices.values().any(|existing| {
            existing.organization_id == invoice.organization_id
                && existing.invoice_number == invoice.invoice_number
        });
        if duplicate {
            return Err(CoreError::Conflict(format!(
                "Invoice number {} already exists",
                invoice.invoice_number
            )));
        }
        invoices.insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn get_invoice(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Option<Invoice>> {
        Ok(self
            .invoices
            .read()
            .unwrap()
            .get(&id)
            .filter(|invoice| invoice.organization_id == organization_id)
            .cloned())
    }

    async fn list_invoices(&self, organization_id: Uuid) -> CoreResult<Vec<Invoice>> {
        let invoices = self.invoices.read().unwrap();
        let mut listed: Vec<Invoice> = invoices
            .values()
            .filter(|invoice| invoice.organization_id == organization_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.invoice_number.cmp(&b.invoice_number));
        Ok(listed)
    }

    async fn latest_invoice_number(&self, organization_id: Uuid) -> CoreResult<Option<String>> {
        Ok(self
            .invoices
            .read()
            .unwrap()
            .values()
            .filter(|invoice| invoice.organization_id == organization_id)
            .map(|invoice| invoice.invoice_number.clone())
            .max())
    }

    async fn update_invoice(&mut self, invoice: &Invoice) -> CoreResult<()> {
        let mut invoices = self.invoices.write().unwrap();
        match invoices.get(&invoice.id) {
            Some(existing) if existing.organization_id == invoice.organization_id => {
                invoices.insert(invoice.id, invoice.clone());
                Ok(())
            }
            _ => Err(CoreError::NotFound("Invoice")),
        }
    }

    async fn delete_invoice(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()> {
        let mut invoices = self.invoices.write().unwrap();
        match invoices.get(&id) {
            Some(existing) if existing.organization_id == organization_id => {
                invoices.remove(&id);
                Ok(())
            }
            _ => Err(CoreError::NotFound("Invoice")),
        }
    }

    async fn swap_invoice_status(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        expected: &[InvoiceStatus],
        to: InvoiceStatus,
    ) -> CoreResult<StatusSwap<Invoice>> {
        let mut invoices = self.invoices.write().unwrap();
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.organization_id == organization_id => {
                if expected.contains(&invoice.status) {
                    invoice.status = to;
                    Ok(StatusSwap::Updated(invoice.clone()))
                } else {
                    Ok(StatusSwap::Refused)
                }
            }
            _ => Ok(StatusSwap::Missing),
        }
    }

    async fn insert_bas_statement(&mut self, statement: &BasStatement) -> CoreResult<()> {
        self.bas_statements
            .write()
            .unwrap()
            .insert(statement.id, statement.clone());
        Ok(())
    }

    async fn get_bas_statement(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Option<BasStatement>> {
        Ok(self
            .bas_statements
            .read()
            .unwrap()
            .get(&id)
            .filter(|statement| statement.organization_id == organization_id)
            .cloned())
    }

    async fn swap_bas_status(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        expected: &[BasStatus],
        to: BasStatus,
    ) -> CoreResult<StatusSwap<BasStatement>> {
        let mut statements = self.bas_statements.write().unwrap();
        match statements.get_mut(&id) {
            Some(statement) if statement.organization_id == organization_id => {
                if expected.contains(&statement.status) {
                    statement.status = to;
                    Ok(StatusSwap::Updated(statement.clone()))
                } else {
                    Ok(StatusSwap::Refused)
                }
            }
            _ => Ok(StatusSwap::Missing),
        }
    }

    async fn append_audit(&mut self, record: &AuditRecord) -> CoreResult<()> {
        self.audit_log.write().unwrap().push(record.clone());
        Ok(())
    }
}
