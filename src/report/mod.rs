//! Report engine: P&L, cash flow, balance sheet and tax summary
//!
//! Every report is a pure aggregation over the transaction ledger (plus the
//! account registry for type lookups): nothing is persisted, and
//! recomputation is deterministic for the same transaction set. An empty
//! period produces a zero-filled report, never an error.
//!
//! The result structs serialize with camelCase field names; those names are
//! contractual for export consumers.

pub mod period;

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::traits::DataStore;
use crate::types::*;
use crate::utils::money::{cents, round2};
pub use period::TaxPeriod;

/// Inclusive date window of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Per-account line in a P&L or balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLine {
    /// Account name
    pub account: String,
    pub account_code: String,
    pub amount: BigDecimal,
}

/// One side of a P&L or balance sheet, ordered by account code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub total: BigDecimal,
    pub items: Vec<AccountLine>,
}

impl ReportSection {
    fn from_items(items: Vec<AccountLine>) -> Self {
        let total = items.iter().map(|item| &item.amount).sum();
        Self { total, items }
    }
}

/// Profit & Loss statement for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReport {
    pub period: ReportPeriod,
    pub revenue: ReportSection,
    pub expenses: ReportSection,
    pub net_profit: BigDecimal,
    /// Percentage; 0 when there is no revenue
    pub profit_margin: BigDecimal,
}

/// Balance sheet as of a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetReport {
    pub as_of_date: NaiveDate,
    pub assets: ReportSection,
    pub liabilities: ReportSection,
    pub equity: ReportSection,
    pub total_liabilities_and_equity: BigDecimal,
    /// Epsilon-tolerant equality (|assets - (liabilities + equity)| < 0.01),
    /// a precision safeguard rather than exact comparison
    pub balanced: bool,
}

/// Inflow/outflow totals and closing balance for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCashflow {
    pub inflow: BigDecimal,
    pub outflow: BigDecimal,
    pub balance: BigDecimal,
}

/// Cash flow statement for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowReport {
    pub period: ReportPeriod,
    pub opening_balance: BigDecimal,
    pub closing_balance: BigDecimal,
    pub total_inflow: BigDecimal,
    pub total_outflow: BigDecimal,
    pub net_cashflow: BigDecimal,
    pub daily_cashflow: BTreeMap<NaiveDate, DailyCashflow>,
}

/// GST on sales for a tax period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total: BigDecimal,
    pub gst_collected: BigDecimal,
}

/// GST on purchases for a tax period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesSummary {
    pub total: BigDecimal,
    pub gst_paid: BigDecimal,
}

/// GST summary for a BAS period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSummaryReport {
    pub period: String,
    pub date_range: ReportPeriod,
    pub sales: SalesSummary,
    pub purchases: PurchasesSummary,
    pub net_gst: BigDecimal,
    pub gst_due_date: NaiveDate,
}

pub struct ReportEngine<S: DataStore> {
    store: S,
}

impl<S: DataStore> ReportEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Profit & Loss over `[start, end]`.
    ///
    /// Only transactions linked to a revenue or expense account contribute.
    /// A credit grows revenue and a debit shrinks it; a debit grows expenses
    /// and a credit shrinks them. Accounts netting to exactly zero are
    /// dropped; both sections are ordered by account code.
    pub async fn profit_loss(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<ProfitLossReport> {
        info!(%organization_id, %start, %end, "generating P&L report");

        let accounts = self.store.get_accounts(organization_id, false).await?;
        let transactions = self
            .store
            .get_transactions_in_range(organization_id, Some(start), Some(end))
            .await?;

        let by_id: HashMap<Uuid, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
        let mut nets: HashMap<Uuid, BigDecimal> = HashMap::new();

        for tx in &transactions {
            let Some(account) = tx.account_id.and_then(|id| by_id.get(&id)) else {
                continue;
            };
            let contribution = match (account.account_type, tx.entry_type) {
                (AccountType::Revenue, EntryType::Credit) => tx.amount.clone(),
                (AccountType::Revenue, EntryType::Debit) => -tx.amount.clone(),
                (AccountType::Expense, EntryType::Debit) => tx.amount.clone(),
                (AccountType::Expense, EntryType::Credit) => -tx.amount.clone(),
                _ => continue,
            };
            *nets.entry(account.id).or_insert_with(|| BigDecimal::from(0)) += contribution;
        }

        let zero = BigDecimal::from(0);
        let mut revenue_items = Vec::new();
        let mut expense_items = Vec::new();
        for account in &accounts {
            let Some(net) = nets.get(&account.id) else {
                continue;
            };
            if *net == zero {
                continue;
            }
            let line = AccountLine {
                account: account.name.clone(),
                account_code: account.code.clone(),
                amount: net.clone(),
            };
            match account.account_type {
                AccountType::Revenue => revenue_items.push(line),
                AccountType::Expense => expense_items.push(line),
                _ => {}
            }
        }
        revenue_items.sort_by(|a, b| a.account_code.cmp(&b.account_code));
        expense_items.sort_by(|a, b| a.account_code.cmp(&b.account_code));

        let revenue = ReportSection::from_items(revenue_items);
        let expenses = ReportSection::from_items(expense_items);
        let net_profit = &revenue.total - &expenses.total;
        let profit_margin = if revenue.total == zero {
            zero
        } else {
            round2(&(&net_profit / &revenue.total * BigDecimal::from(100)))
        };

        Ok(ProfitLossReport {
            period: ReportPeriod {
                start_date: start,
                end_date: end,
            },
            revenue,
            expenses,
            net_profit,
            profit_margin,
        })
    }

    /// Cash flow over `[start, end]`.
    ///
    /// The opening balance is the signed sum (credit +, debit -) of every
    /// transaction dated strictly before `start`, regardless of account
    /// linkage. The window is walked in date order, accumulating a running
    /// balance per calendar day.
    pub async fn cash_flow(
        &self,
        organization_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<CashflowReport> {
        info!(%organization_id, %start, %end, "generating cashflow report");

        let opening_balance = match start.pred_opt() {
            Some(day_before) => {
                let earlier = self
                    .store
                    .get_transactions_in_range(organization_id, None, Some(day_before))
                    .await?;
                signed_sum(&earlier)
            }
            None => BigDecimal::from(0),
        };

        let mut window = self
            .store
            .get_transactions_in_range(organization_id, Some(start), Some(end))
            .await?;
        window.sort_by(|a, b| a.transaction_date.cmp(&b.transaction_date));

        let mut daily: BTreeMap<NaiveDate, DailyCashflow> = BTreeMap::new();
        let mut running = opening_balance.clone();

        for tx in &window {
            let day = daily
                .entry(tx.transaction_date)
                .or_insert_with(|| DailyCashflow {
                    inflow: BigDecimal::from(0),
                    outflow: BigDecimal::from(0),
                    balance: running.clone(),
                });
            match tx.entry_type {
                EntryType::Credit => {
                    day.inflow += &tx.amount;
                    running += &tx.amount;
                }
                EntryType::Debit => {
                    day.outflow += &tx.amount;
                    running -= &tx.amount;
                }
            }
            day.balance = running.clone();
        }

        let total_inflow: BigDecimal = daily.values().map(|d| &d.inflow).sum();
        let total_outflow: BigDecimal = daily.values().map(|d| &d.outflow).sum();
        let net_cashflow = &total_inflow - &total_outflow;
        let closing_balance = &opening_balance + &net_cashflow;

        Ok(CashflowReport {
            period: ReportPeriod {
                start_date: start,
                end_date: end,
            },
            opening_balance,
            closing_balance,
            total_inflow,
            total_outflow,
            net_cashflow,
            daily_cashflow: daily,
        })
    }

    /// Balance sheet over all active accounts and every transaction up to
    /// `as_of_date`.
    ///
    /// Assets grow on the debit side; liabilities and equity on the credit
    /// side. Zero-balance accounts are dropped and each group is ordered by
    /// code.
    pub async fn balance_sheet(
        &self,
        organization_id: Uuid,
        as_of_date: NaiveDate,
    ) -> CoreResult<BalanceSheetReport> {
        info!(%organization_id, %as_of_date, "generating balance sheet");

        let accounts = self.store.get_accounts(organization_id, true).await?;
        let transactions = self
            .store
            .get_transactions_in_range(organization_id, None, Some(as_of_date))
            .await?;

        let by_id: HashMap<Uuid, &Account> = accounts.iter().map(|a| (a.id, a)).collect();
        let mut balances: HashMap<Uuid, BigDecimal> = HashMap::new();

        for tx in &transactions {
            let Some(account) = tx.account_id.and_then(|id| by_id.get(&id)) else {
                continue;
            };
            let contribution = match (account.account_type, tx.entry_type) {
                (AccountType::Asset, EntryType::Debit) => tx.amount.clone(),
                (AccountType::Asset, EntryType::Credit) => -tx.amount.clone(),
                (AccountType::Liability | AccountType::Equity, EntryType::Credit) => {
                    tx.amount.clone()
                }
                (AccountType::Liability | AccountType::Equity, EntryType::Debit) => {
                    -tx.amount.clone()
                }
                _ => continue,
            };
            *balances
                .entry(account.id)
                .or_insert_with(|| BigDecimal::from(0)) += contribution;
        }

        let zero = BigDecimal::from(0);
        let mut asset_items = Vec::new();
        let mut liability_items = Vec::new();
        let mut equity_items = Vec::new();
        for account in &accounts {
            let Some(balance) = balances.get(&account.id) else {
                continue;
            };
            if *balance == zero {
                continue;
            }
            let line = AccountLine {
                account: account.name.clone(),
                account_code: account.code.clone(),
                amount: balance.clone(),
            };
            match account.account_type {
                AccountType::Asset => asset_items.push(line),
                AccountType::Liability => liability_items.push(line),
                AccountType::Equity => equity_items.push(line),
                _ => {}
            }
        }
        for items in [&mut asset_items, &mut liability_items, &mut equity_items] {
            items.sort_by(|a, b| a.account_code.cmp(&b.account_code));
        }

        let assets = ReportSection::from_items(asset_items);
        let liabilities = ReportSection::from_items(liability_items);
        let equity = ReportSection::from_items(equity_items);
        let total_liabilities_and_equity = &liabilities.total + &equity.total;
        let balanced = (&assets.total - &total_liabilities_and_equity).abs() < cents(1);

        Ok(BalanceSheetReport {
            as_of_date,
            assets,
            liabilities,
            equity,
            total_liabilities_and_equity,
            balanced,
        })
    }

    /// GST summary for a BAS period ("Q2-2024" or "2023-2024").
    ///
    /// Credits are treated as sales and debits as purchases, each carrying
    /// 10% GST.
    pub async fn tax_summary(
        &self,
        organization_id: Uuid,
        period: &str,
    ) -> CoreResult<TaxSummaryReport> {
        let period = TaxPeriod::parse(period)?;
        info!(%organization_id, period = %period.label, "generating tax summary");

        let transactions = self
            .store
            .get_transactions_in_range(organization_id, Some(period.start), Some(period.end))
            .await?;

        let gst_rate = cents(10);
        let mut total_sales = BigDecimal::from(0);
        let mut total_purchases = BigDecimal::from(0);
        let mut gst_collected = BigDecimal::from(0);
        let mut gst_paid = BigDecimal::from(0);

        for tx in &transactions {
            let gst = &tx.amount * &gst_rate;
            match tx.entry_type {
                EntryType::Credit => {
                    total_sales += &tx.amount;
                    gst_collected += gst;
                }
                EntryType::Debit => {
                    total_purchases += &tx.amount;
                    gst_paid += gst;
                }
            }
        }

        let gst_collected = round2(&gst_collected);
        let gst_paid = round2(&gst_paid);
        let net_gst = &gst_collected - &gst_paid;

        Ok(TaxSummaryReport {
            period: period.label.clone(),
            date_range: ReportPeriod {
                start_date: period.start,
                end_date: period.end,
            },
            sales: SalesSummary {
                total: total_sales,
                gst_collected,
            },
            purchases: PurchasesSummary {
                total: total_purchases,
                gst_paid,
            },
            net_gst,
            gst_due_date: period.gst_due_date(),
        })
    }
}

/// Signed sum of a transaction set: credit +, debit -
fn signed_sum(transactions: &[Transaction]) -> BigDecimal {
    let mut sum = BigDecimal::from(0);
    for tx in transactions {
        match tx.entry_type {
            EntryType::Credit => sum += &tx.amount,
            EntryType::Debit => sum -= &tx.amount,
        }
    }
    sum
}
