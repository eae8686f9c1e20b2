//! Invoice engine: numbering, totals, status machine and ledger posting
//!
//! Status transitions go through the store's compare-and-swap primitive, so
//! two racing `mark_paid` calls cannot both succeed and double-post the
//! payment transaction.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::traits::{DataStore, StatusSwap};
use crate::types::*;
use crate::utils::money::{round2, standard_gst_rate};
use crate::utils::validation::{validate_line_items, validate_required};

/// Configuration for the invoice engine, resolved once at construction
/// instead of looked up by a magic string at payment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceConfig {
    /// Chart code of the revenue account that paid invoices post against
    pub revenue_account_code: String,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            revenue_account_code: "4000".to_string(),
        }
    }
}

/// Subtotal, tax and grand total for a set of line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total: BigDecimal,
}

/// Compute invoice totals from line items.
///
/// Each of the three figures is rounded to 2 decimals once, after summation
/// (never per line): `subtotal = round2(sum of amounts)`,
/// `tax = round2(sum of amount x rate)`, `total = subtotal + tax`. Lines
/// without an explicit rate use the standard 10% GST.
pub fn compute_totals(line_items: &[LineItem]) -> InvoiceTotals {
    let subtotal: BigDecimal = line_items.iter().map(|item| &item.amount).sum();
    let tax: BigDecimal = line_items
        .iter()
        .map(|item| {
            let rate = item
                .tax_rate
                .clone()
                .unwrap_or_else(standard_gst_rate);
            &item.amount * rate
        })
        .sum();

    let subtotal = round2(&subtotal);
    let tax_amount = round2(&tax);
    let total = &subtotal + &tax_amount;

    InvoiceTotals {
        subtotal,
        tax_amount,
        total,
    }
}

pub struct InvoiceEngine<S: DataStore> {
    store: S,
    config: InvoiceConfig,
}

impl<S: DataStore> InvoiceEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, InvoiceConfig::default())
    }

    pub fn with_config(store: S, config: InvoiceConfig) -> Self {
        Self { store, config }
    }

    /// Next invoice number for the organization.
    ///
    /// Increments the numeric suffix of the highest existing `INV-%04d`
    /// number; the first invoice gets `INV-0001`. A stored number that does
    /// not match the pattern falls back to a timestamp-based number rather
    /// than erroring.
    pub async fn next_number(&self, organization_id: Uuid) -> CoreResult<String> {
        let latest = self.store.latest_invoice_number(organization_id).await?;
        Ok(match latest {
            None => "INV-0001".to_string(),
            Some(last) => match parse_invoice_number(&last) {
                Some(n) => format!("INV-{:04}", n + 1),
                None => {
                    warn!(%organization_id, last, "unrecognized invoice number format");
                    format!("INV-{}", Utc::now().timestamp_millis())
                }
            },
        })
    }

    /// Create an invoice, assigning a number and computing totals when the
    /// caller did not supply them. New invoices default to `draft`.
    ///
    /// The store's unique constraint on `(organization_id, invoice_number)`
    /// is the last line of defense against concurrent creation racing to the
    /// same number; a duplicate surfaces as `Conflict`.
    pub async fn create(&mut self, input: NewInvoice) -> CoreResult<Invoice> {
        validate_required(&input.customer_name, "Customer name")?;
        validate_line_items(&input.line_items)?;

        let invoice_number = match input.invoice_number {
            Some(number) => number,
            None => self.next_number(input.organization_id).await?,
        };

        let (subtotal, tax_amount, total) = match (input.subtotal, input.tax_amount, input.total) {
            (Some(subtotal), Some(tax_amount), Some(total)) => (subtotal, tax_amount, total),
            _ => {
                let totals = compute_totals(&input.line_items);
                (totals.subtotal, totals.tax_amount, totals.total)
            }
        };

        let invoice = Invoice {
            id: Uuid::new_v4(),
            organization_id: input.organization_id,
            invoice_number,
            customer_name: input.customer_name,
            customer_email: input.customer_email,
            customer_address: input.customer_address,
            issue_date: input.issue_date,
            due_date: input.due_date,
            subtotal,
            tax_amount,
            total,
            status: input.status.unwrap_or(InvoiceStatus::Draft),
            line_items: input.line_items,
            notes: input.notes,
        };
        self.store.insert_invoice(&invoice).await?;
        info!(
            organization_id = %invoice.organization_id,
            invoice_number = %invoice.invoice_number,
            "invoice created"
        );

        Ok(invoice)
    }

    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        self.store
            .get_invoice(organization_id, id)
            .await?
            .ok_or(CoreError::NotFound("Invoice"))
    }

    pub async fn list(&self, organization_id: Uuid) -> CoreResult<Vec<Invoice>> {
        self.store.list_invoices(organization_id).await
    }

    /// Patch an invoice. Totals are recomputed only when the patch replaces
    /// the line items.
    pub async fn update(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: InvoicePatch,
    ) -> CoreResult<Invoice> {
        let mut invoice = self.get(organization_id, id).await?;

        if let Some(name) = patch.customer_name {
            validate_required(&name, "Customer name")?;
            invoice.customer_name = name;
        }
        if let Some(email) = patch.customer_email {
            invoice.customer_email = Some(email);
        }
        if let Some(address) = patch.customer_address {
            invoice.customer_address = Some(address);
        }
        if let Some(issue_date) = patch.issue_date {
            invoice.issue_date = issue_date;
        }
        if let Some(due_date) = patch.due_date {
            invoice.due_date = due_date;
        }
        if let Some(notes) = patch.notes {
            invoice.notes = Some(notes);
        }
        if let Some(line_items) = patch.line_items {
            validate_line_items(&line_items)?;
            let totals = compute_totals(&line_items);
            invoice.subtotal = totals.subtotal;
            invoice.tax_amount = totals.tax_amount;
            invoice.total = totals.total;
            invoice.line_items = line_items;
        }

        self.store.update_invoice(&invoice).await?;
        Ok(invoice)
    }

    pub async fn delete(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<()> {
        self.store.delete_invoice(organization_id, id).await
    }

    /// `draft -> sent`
    pub async fn mark_sent(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        match self
            .store
            .swap_invoice_status(organization_id, id, &[InvoiceStatus::Draft], InvoiceStatus::Sent)
            .await?
        {
            StatusSwap::Updated(invoice) => Ok(invoice),
            StatusSwap::Refused => Err(CoreError::Conflict(
                "Only a draft invoice can be marked sent".to_string(),
            )),
            StatusSwap::Missing => Err(CoreError::NotFound("Invoice")),
        }
    }

    /// `draft|sent|overdue -> cancelled`
    pub async fn cancel(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<Invoice> {
        match self
            .store
            .swap_invoice_status(
                organization_id,
                id,
                &[
                    InvoiceStatus::Draft,
                    InvoiceStatus::Sent,
                    InvoiceStatus::Overdue,
                ],
                InvoiceStatus::Cancelled,
            )
            .await?
        {
            StatusSwap::Updated(invoice) => Ok(invoice),
            StatusSwap::Refused => Err(CoreError::Conflict(
                "A paid or cancelled invoice cannot be cancelled".to_string(),
            )),
            StatusSwap::Missing => Err(CoreError::NotFound("Invoice")),
        }
    }

    /// Mark an invoice paid and post the payment into the ledger.
    ///
    /// Fails with `Conflict` when the invoice is already paid (or
    /// cancelled); the check-and-set is atomic, so a racing duplicate call
    /// cannot double-post. Posting credits the configured revenue account
    /// for the invoice total; if that account does not exist the posting is
    /// skipped with a warning, not rolled back - the invoice stays paid.
    pub async fn mark_paid(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> CoreResult<Invoice> {
        self.mark_paid_as_of(organization_id, id, actor, Utc::now().date_naive())
            .await
    }

    /// `mark_paid` with an explicit payment date
    pub async fn mark_paid_as_of(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
        paid_on: NaiveDate,
    ) -> CoreResult<Invoice> {
        let invoice = match self
            .store
            .swap_invoice_status(
                organization_id,
                id,
                &[
                    InvoiceStatus::Draft,
                    InvoiceStatus::Sent,
                    InvoiceStatus::Overdue,
                ],
                InvoiceStatus::Paid,
            )
            .await?
        {
            StatusSwap::Updated(invoice) => invoice,
            StatusSwap::Refused => {
                return Err(CoreError::Conflict(
                    "Invoice is already paid or cancelled".to_string(),
                ))
            }
            StatusSwap::Missing => return Err(CoreError::NotFound("Invoice")),
        };

        self.post_payment(&invoice, actor, paid_on).await?;
        Ok(invoice)
    }

    async fn post_payment(
        &mut self,
        invoice: &Invoice,
        actor: Uuid,
        paid_on: NaiveDate,
    ) -> CoreResult<()> {
        let revenue_account = self
            .store
            .get_account_by_code(invoice.organization_id, &self.config.revenue_account_code)
            .await?;

        let Some(account) = revenue_account else {
            warn!(
                organization_id = %invoice.organization_id,
                code = %self.config.revenue_account_code,
                "revenue account not found, payment transaction not created"
            );
            return Ok(());
        };

        let transaction = Transaction {
            id: Uuid::new_v4(),
            organization_id: invoice.organization_id,
            account_id: Some(account.id),
            transaction_date: paid_on,
            amount: invoice.total.clone(),
            description: format!(
                "Payment received for Invoice {} - {}",
                invoice.invoice_number, invoice.customer_name
            ),
            reference: Some(invoice.invoice_number.clone()),
            entry_type: EntryType::Credit,
            category: Some("Sales".to_string()),
            status: TransactionStatus::Cleared,
            created_by: actor,
        };
        self.store.insert_transaction(&transaction).await?;
        info!(
            invoice_id = %invoice.id,
            amount = %invoice.total,
            "payment transaction posted for paid invoice"
        );
        Ok(())
    }

    /// Invoices past their due date, ordered by due date ascending.
    ///
    /// This read has a deliberate write side effect: any `sent` invoice
    /// found past due is persisted as `overdue` before being returned.
    pub async fn overdue_invoices(&mut self, organization_id: Uuid) -> CoreResult<Vec<Invoice>> {
        self.overdue_invoices_as_of(organization_id, Utc::now().date_naive())
            .await
    }

    /// `overdue_invoices` with an explicit "today"
    pub async fn overdue_invoices_as_of(
        &mut self,
        organization_id: Uuid,
        today: NaiveDate,
    ) -> CoreResult<Vec<Invoice>> {
        let invoices = self.store.list_invoices(organization_id).await?;
        let mut overdue = Vec::new();

        for invoice in invoices {
            if invoice.due_date >= today {
                continue;
            }
            match invoice.status {
                InvoiceStatus::Overdue => overdue.push(invoice),
                InvoiceStatus::Sent => {
                    match self
                        .store
                        .swap_invoice_status(
                            organization_id,
                            invoice.id,
                            &[InvoiceStatus::Sent],
                            InvoiceStatus::Overdue,
                        )
                        .await?
                    {
                        StatusSwap::Updated(updated) => overdue.push(updated),
                        // lost a race with a concurrent transition (e.g. the
                        // invoice got paid); it is no longer overdue
                        StatusSwap::Refused | StatusSwap::Missing => {}
                    }
                }
                _ => {}
            }
        }

        overdue.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(overdue)
    }
}

fn parse_invoice_number(number: &str) -> Option<u64> {
    number.strip_prefix("INV-")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::money::cents;

    fn line(amount: i64, rate: Option<i64>) -> LineItem {
        LineItem {
            description: "item".to_string(),
            quantity: BigDecimal::from(1),
            unit_price: cents(amount),
            amount: cents(amount),
            tax_rate: rate.map(cents),
        }
    }

    #[test]
    fn totals_default_to_ten_percent_gst() {
        let totals = compute_totals(&[line(10000, None), line(5000, Some(0))]);
        assert_eq!(totals.subtotal, cents(15000));
        assert_eq!(totals.tax_amount, cents(1000));
        assert_eq!(totals.total, cents(16000));
    }

    #[test]
    fn totals_round_sums_not_lines() {
        // three lines of 33.33 at 10%: per-line rounding would give 10.00
        // in tax (3 x 3.33), summing first gives 10.00 too, but the
        // subtotal path differs at 0.005 boundaries
        let totals = compute_totals(&[line(3333, None), line(3333, None), line(3339, None)]);
        assert_eq!(totals.subtotal, cents(10005));
        // tax = 10.005 -> rounds to 10.01 (half away from zero)
        assert_eq!(totals.tax_amount, cents(1001));
        assert_eq!(totals.total, cents(11006));
    }

    #[test]
    fn totals_of_empty_invoice_are_zero() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.subtotal, BigDecimal::from(0));
        assert_eq!(totals.tax_amount, BigDecimal::from(0));
        assert_eq!(totals.total, BigDecimal::from(0));
    }

    #[test]
    fn invoice_number_parsing() {
        assert_eq!(parse_invoice_number("INV-0001"), Some(1));
        assert_eq!(parse_invoice_number("INV-0042"), Some(42));
        assert_eq!(parse_invoice_number("INV-10000"), Some(10000));
        assert_eq!(parse_invoice_number("2024-001"), None);
        assert_eq!(parse_invoice_number("INV-"), None);
        assert_eq!(parse_invoice_number("INV-12a"), None);
    }
}
