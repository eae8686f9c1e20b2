//! Chart-of-accounts registry

use tracing::info;
use uuid::Uuid;

use crate::traits::DataStore;
use crate::types::*;
use crate::utils::validation::{validate_account_code, validate_required};

/// Registry for an organization's chart of accounts
pub struct AccountRegistry<S: DataStore> {
    store: S,
}

impl<S: DataStore> AccountRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a new account. The code must be unique within the
    /// organization; the type is immutable once created.
    pub async fn create(&mut self, input: NewAccount) -> CoreResult<Account> {
        validate_account_code(&input.code)?;
        validate_required(&input.name, "Account name")?;

        if self
            .store
            .get_account_by_code(input.organization_id, &input.code)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Account code '{}' already exists",
                input.code
            )));
        }

        let account = Account {
            id: Uuid::new_v4(),
            organization_id: input.organization_id,
            code: input.code,
            name: input.name,
            account_type: input.account_type,
            tax_type: input.tax_type,
            parent_account_id: input.parent_account_id,
            is_active: true,
        };
        self.store.insert_account(&account).await?;

        Ok(account)
    }

    /// List accounts ordered by code ascending
    pub async fn list(
        &self,
        organization_id: Uuid,
        active_only: bool,
    ) -> CoreResult<Vec<Account>> {
        self.store.get_accounts(organization_id, active_only).await
    }

    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Account> {
        self.store
            .get_account(organization_id, id)
            .await?
            .ok_or(CoreError::NotFound("Account"))
    }

    pub async fn get_by_code(
        &self,
        organization_id: Uuid,
        code: &str,
    ) -> CoreResult<Option<Account>> {
        self.store.get_account_by_code(organization_id, code).await
    }

    /// Patch name, tax treatment, parent or active flag. The account type
    /// cannot be changed through any code path.
    pub async fn update(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: AccountPatch,
    ) -> CoreResult<Account> {
        let mut account = self.get(organization_id, id).await?;

        if let Some(name) = patch.name {
            validate_required(&name, "Account name")?;
            account.name = name;
        }
        if let Some(tax_type) = patch.tax_type {
            account.tax_type = Some(tax_type);
        }
        if let Some(parent) = patch.parent_account_id {
            account.parent_account_id = Some(parent);
        }
        if let Some(is_active) = patch.is_active {
            account.is_active = is_active;
        }

        self.store.update_account(&account).await?;
        Ok(account)
    }

    /// Soft-delete: clears `is_active`, never removes the row, since
    /// historical transactions reference it
    pub async fn deactivate(&mut self, organization_id: Uuid, id: Uuid) -> CoreResult<Account> {
        let mut account = self.get(organization_id, id).await?;
        account.is_active = false;
        self.store.update_account(&account).await?;
        Ok(account)
    }

    /// Seed the default chart of accounts. Idempotence guard, not a merge:
    /// if the organization already has any account, nothing is inserted and
    /// the returned count is 0.
    pub async fn seed(&mut self, organization_id: Uuid) -> CoreResult<usize> {
        let existing = self.store.get_accounts(organization_id, false).await?;
        if !existing.is_empty() {
            info!(%organization_id, "chart of accounts already exists, skipping seed");
            return Ok(0);
        }

        let chart = default_chart_of_accounts(organization_id);
        let count = self.store.insert_accounts(&chart).await?;
        info!(%organization_id, count, "seeded default chart of accounts");
        Ok(count)
    }
}

/// Tax treatment labels used by the default chart
mod tax_label {
    pub const GST: Option<&str> = Some("GST");
    pub const GST_FREE: Option<&str> = Some("GST Free");
    pub const INPUT_TAXED: Option<&str> = Some("Input Taxed");
    pub const NONE: Option<&str> = None;
}

/// Default small-business chart: assets 1000s, liabilities 2000s, equity
/// 3000s, revenue 4000s, expenses 5000s-9000s.
#[rustfmt::skip]
const DEFAULT_CHART: &[(&str, &str, AccountType, Option<&str>)] = {
    use tax_label::*;
    use AccountType::*;
    &[
        // Assets (1000-1999)
        ("1000", "Cash and Cash Equivalents", Asset, NONE),
        ("1010", "Bank Account - Operating", Asset, NONE),
        ("1020", "Petty Cash", Asset, NONE),
        ("1100", "Accounts Receivable", Asset, NONE),
        ("1110", "Trade Debtors", Asset, NONE),
        ("1200", "Inventory", Asset, NONE),
        ("1300", "Prepaid Expenses", Asset, NONE),
        ("1500", "Property, Plant & Equipment", Asset, NONE),
        ("1510", "Land & Buildings", Asset, NONE),
        ("1520", "Plant & Equipment", Asset, NONE),
        ("1530", "Motor Vehicles", Asset, NONE),
        ("1540", "Furniture & Fixtures", Asset, NONE),
        ("1550", "Computer Equipment", Asset, NONE),
        ("1560", "Accumulated Depreciation", Asset, NONE),
        // Liabilities (2000-2999)
        ("2000", "Accounts Payable", Liability, NONE),
        ("2010", "Trade Creditors", Liability, NONE),
        ("2100", "GST Collected", Liability, NONE),
        ("2110", "GST Paid", Liability, NONE),
        ("2120", "PAYG Withholding Payable", Liability, NONE),
        ("2130", "Superannuation Payable", Liability, NONE),
        ("2200", "Short-term Loans", Liability, NONE),
        ("2300", "Accrued Expenses", Liability, NONE),
        ("2400", "Employee Entitlements", Liability, NONE),
        ("2500", "Long-term Loans", Liability, NONE),
        // Equity (3000-3999)
        ("3000", "Owner's Equity", Equity, NONE),
        ("3100", "Retained Earnings", Equity, NONE),
        ("3200", "Current Year Earnings", Equity, NONE),
        ("3300", "Owner's Drawings", Equity, NONE),
        // Revenue (4000-4999)
        ("4000", "Sales Revenue", Revenue, GST),
        ("4010", "Product Sales", Revenue, GST),
        ("4020", "Service Revenue", Revenue, GST),
        ("4100", "Other Revenue", Revenue, GST),
        ("4110", "Interest Income", Revenue, INPUT_TAXED),
        // Expenses (5000-9999)
        ("5000", "Cost of Goods Sold", Expense, GST),
        ("5010", "Purchases", Expense, GST),
        ("5020", "Freight & Delivery", Expense, GST),
        ("6000", "Advertising & Marketing", Expense, GST),
        ("6100", "Bank Fees & Charges", Expense, INPUT_TAXED),
        ("6200", "Communication Expenses", Expense, GST),
        ("6210", "Telephone & Internet", Expense, GST),
        ("6300", "Computer & IT Expenses", Expense, GST),
        ("6310", "Software Subscriptions", Expense, GST),
        ("6400", "Insurance", Expense, INPUT_TAXED),
        ("6500", "Legal & Professional Fees", Expense, GST),
        ("6510", "Accounting Fees", Expense, GST),
        ("6520", "Legal Fees", Expense, GST),
        ("6600", "Motor Vehicle Expenses", Expense, GST),
        ("6610", "Fuel", Expense, GST),
        ("6700", "Office Expenses", Expense, GST),
        ("6710", "Stationery & Printing", Expense, GST),
        ("6800", "Rent & Occupancy", Expense, GST),
        ("6810", "Rent", Expense, INPUT_TAXED),
        ("6820", "Utilities", Expense, GST),
        ("6900", "Wages & Salaries", Expense, GST_FREE),
        ("6910", "Salaries", Expense, GST_FREE),
        ("6920", "Superannuation", Expense, GST_FREE),
        ("7000", "Travel & Accommodation", Expense, GST),
        ("7100", "Meals & Entertainment", Expense, GST),
        ("7200", "Training & Development", Expense, GST),
        ("7300", "Subscriptions & Memberships", Expense, GST),
        ("7400", "Depreciation", Expense, GST_FREE),
        ("8000", "Interest Expense", Expense, INPUT_TAXED),
        ("9000", "Other Expenses", Expense, GST),
    ]
};

/// Materialize the default chart for an organization
pub fn default_chart_of_accounts(organization_id: Uuid) -> Vec<Account> {
    DEFAULT_CHART
        .iter()
        .map(|&(code, name, account_type, tax_type)| Account {
            id: Uuid::new_v4(),
            organization_id,
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            tax_type: tax_type.map(str::to_string),
            parent_account_id: None,
            is_active: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chart_spans_all_types() {
        let org = Uuid::new_v4();
        let chart = default_chart_of_accounts(org);
        assert!(chart.len() > 50);
        for ty in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Revenue,
            AccountType::Expense,
        ] {
            assert!(chart.iter().any(|a| a.account_type == ty));
        }
        // codes are unique and the default revenue account is present
        let mut codes: Vec<&str> = chart.iter().map(|a| a.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), chart.len());
        assert!(chart
            .iter()
            .any(|a| a.code == "4000" && a.account_type == AccountType::Revenue));
    }
}
