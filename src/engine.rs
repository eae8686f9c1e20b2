//! Main accounting engine that coordinates the ledger components

use chrono::NaiveDate;
use uuid::Uuid;

use crate::invoice::{InvoiceConfig, InvoiceEngine};
use crate::ledger::{AccountRegistry, TransactionLedger};
use crate::report::{
    BalanceSheetReport, CashflowReport, ProfitLossReport, ReportEngine, TaxSummaryReport,
};
use crate::tax::{BasCalculator, BasPayload};
use crate::traits::*;
use crate::types::*;

/// Facade over the whole ledger core: accounts, transactions, invoices,
/// reports and BAS. Each component holds its own clone of the store, the
/// way a pooled database handle is shared.
pub struct AccountingEngine<S: DataStore> {
    accounts: AccountRegistry<S>,
    transactions: TransactionLedger<S>,
    invoices: InvoiceEngine<S>,
    reports: ReportEngine<S>,
    bas: BasCalculator<S>,
}

impl<S: DataStore + Clone> AccountingEngine<S> {
    /// Create a new engine with the given storage backend
    pub fn new(store: S) -> Self {
        Self::with_invoice_config(store, InvoiceConfig::default())
    }

    /// Create an engine with a custom invoice configuration (e.g. a
    /// different revenue account for payment postings)
    pub fn with_invoice_config(store: S, config: InvoiceConfig) -> Self {
        Self {
            accounts: AccountRegistry::new(store.clone()),
            transactions: TransactionLedger::new(store.clone()),
            invoices: InvoiceEngine::with_config(store.clone(), config),
            reports: ReportEngine::new(store.clone()),
            bas: BasCalculator::new(store),
        }
    }
}

impl<S: DataStore> AccountingEngine<S> {
    // Account operations

    pub async fn create_account(&mut self, input: NewAccount) -> CoreResult<Account> {
        self.accounts.create(input).await
    }

    pub async fn list_accounts(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> CoreResult<Vec<Account>> {
        self.accounts.list(organization_id, active_only).await
    }

    pub async fn get_account(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Account> {
        self.accounts.get(organization_id, id).await
    }

    pub async fn update_account(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: AccountPatch,
    ) -> CoreResult<Account> {
        self.accounts.update(organization_id, id, patch).await
    }

    pub async fn deactivate_account(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Account> {
        self.accounts.deactivate(organization_id, id).await
    }

    /// Seed the default chart of accounts; a no-op returning 0 when the
    /// organization already has accounts
    pub async fn seed_accounts(&mut self, organization_id: Uuid) -> CoreResult<usize> {
        self.accounts.seed(organization_id).await
    }

    // Transaction operations

    pub async fn create_transaction(
        &mut self,
        organization_id: Uuid,
        input: NewTransaction,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        self.transactions.create(organization_id, input, actor).await
    }

    pub async fn list_transactions(
        &self,
        organization_id: Uuid,
        filter: TransactionFilter,
    ) -> CoreResult<TransactionPage> {
        self.transactions.list(organization_id, filter).await
    }

    pub async fn get_transaction(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<Transaction> {
        self.transactions.get(organization_id, id).await
    }

    pub async fn update_transaction(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: TransactionPatch,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        self.transactions
            .update(organization_id, id, patch, actor)
            .await
    }

    pub async fn delete_transaction(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> CoreResult<()> {
        self.transactions.delete(organization_id, id, actor).await
    }

    pub async fn bulk_import_transactions(
        &mut self,
        organization_id: Uuid,
        inputs: Vec<NewTransaction>,
        actor: Uuid,
    ) -> CoreResult<usize> {
        self.transactions
            .bulk_import(organization_id, inputs, actor)
            .await
    }

    pub async fn reconcile_transaction(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        self.transactions.reconcile(organization_id, id, actor).await
    }

    // Invoice operations

    pub async fn create_invoice(&mut self, input: NewInvoice) -> CoreResult<Invoice> {
        self.invoices.create(input).await
    }

    pub async fn get_invoice(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        self.invoices.get(organization_id, id).await
    }

    pub async fn list_invoices(&self, organization_id: Uuid) -> CoreResult<Vec<Invoice>> {
        self.invoices.list(organization_id).await
    }

    pub async fn update_invoice(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: InvoicePatch,
    ) -> CoreResult<Invoice> {
        self.invoices.update(organization_id, id, patch).await
    }

    pub async fn delete_invoice(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()> {
        self.invoices.delete(organization_id, id).await
    }

    pub async fn send_invoice(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        self.invoices.mark_sent(organization_id, id).await
    }

    pub async fn cancel_invoice(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        self.invoices.cancel(organization_id, id).await
    }

    /// Mark an invoice paid and post the payment to the ledger
    pub async fn pay_invoice(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> CoreResult<Invoice> {
        self.invoices.mark_paid(organization_id, id, actor).await
    }

    pub async fn overdue_invoices(&mut self, organization_id: Uuid) -> CoreResult<Vec<Invoice>> {
        self.invoices.overdue_invoices(organization_id).await
    }

    // Reports

    pub async fn profit_loss(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<ProfitLossReport> {
        self.reports.profit_loss(organization_id, start, end).await
    }

    pub async fn balance_sheet(
        &self,
        organization_id: Uuid,
        as_of_date: NaiveDate,
    ) -> CoreResult<BalanceSheetReport> {
        self.reports.balance_sheet(organization_id, as_of_date).await
    }

    pub async fn cash_flow(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<CashflowReport> {
        self.reports.cash_flow(organization_id, start, end).await
    }

    pub async fn tax_summary(
        &self,
        organization_id: Uuid,
        period: &str,
    ) -> CoreResult<TaxSummaryReport> {
        self.reports.tax_summary(organization_id, period).await
    }

    // BAS

    pub async fn calculate_bas(
        &mut self,
        organization_id: Uuid,
        period: &str,
    ) -> CoreResult<BasStatement> {
        self.bas.calculate(organization_id, period).await
    }

    pub async fn get_bas(&self, organization_id: Uuid, id: Uuid) -> CoreResult<BasStatement> {
        self.bas.get(organization_id, id).await
    }

    pub async fn mark_bas_ready(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.bas.mark_ready(organization_id, id).await
    }

    pub async fn lodge_bas(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.bas.mark_lodged(organization_id, id).await
    }

    pub async fn reject_bas(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.bas.mark_rejected(organization_id, id).await
    }

    pub async fn bas_payload(&self, organization_id: Uuid, id: Uuid) -> CoreResult<BasPayload> {
        self.bas.submission_payload(organization_id, id).await
    }

    // Component access for operations not worth delegating

    pub fn accounts(&mut self) -> &mut AccountRegistry<S> {
        &mut self.accounts
    }

    pub fn transactions(&mut self) -> &mut TransactionLedger<S> {
        &mut self.transactions
    }

    pub fn invoices(&mut self) -> &mut InvoiceEngine<S> {
        &mut self.invoices
    }

    pub fn reports(&self) -> &ReportEngine<S> {
        &self.reports
    }

    pub fn bas(&mut self) -> &mut BasCalculator<S> {
        &mut self.bas
    }
}
