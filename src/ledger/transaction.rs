//! Transaction ledger: append-only typed entries with filtered paging
//!
//! Every mutating operation emits an audit record. Auditing is a
//! best-effort side channel: a failed append is logged and swallowed so it
//! can never fail the primary operation.

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::traits::{DataStore, TransactionFilter, TransactionPage};
use crate::types::*;
use crate::utils::validation::{validate_non_negative_amount, validate_required};

pub struct TransactionLedger<S: DataStore> {
    store: S,
}

impl<S: DataStore> TransactionLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a new transaction. New entries start as `pending`.
    pub async fn create(
        &mut self,
        organization_id: Uuid,
        input: NewTransaction,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        validate_non_negative_amount(&input.amount)?;
        validate_required(&input.description, "Description")?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            organization_id,
            account_id: input.account_id,
            transaction_date: input.transaction_date,
            amount: input.amount,
            description: input.description,
            reference: input.reference,
            entry_type: input.entry_type,
            category: input.category,
            status: TransactionStatus::Pending,
            created_by: actor,
        };
        self.store.insert_transaction(&transaction).await?;
        info!(%organization_id, transaction_id = %transaction.id, "transaction created");

        self.audit(
            organization_id,
            actor,
            "create_transaction",
            Some(transaction.id),
            json!({ "amount": transaction.amount, "type": transaction.entry_type }),
        )
        .await;

        Ok(transaction)
    }

    /// Filtered page ordered by transaction date descending; default page
    /// size is 50
    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: TransactionFilter,
    ) -> CoreResult<TransactionPage> {
        let (transactions, total) = self.store.get_transactions(organization_id, &filter).await?;
        Ok(TransactionPage {
            transactions,
            total,
            limit: filter.effective_limit(),
            offset: filter.effective_offset(),
        })
    }

    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> CoreResult<Transaction> {
        self.store
            .get_transaction(organization_id, id)
            .await?
            .ok_or(CoreError::NotFound("Transaction"))
    }

    pub async fn update(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        patch: TransactionPatch,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        let mut transaction = self.get(organization_id, id).await?;
        let changes = serde_json::to_value(&patch).unwrap_or_default();

        if let Some(account_id) = patch.account_id {
            transaction.account_id = account_id;
        }
        if let Some(date) = patch.transaction_date {
            transaction.transaction_date = date;
        }
        if let Some(amount) = patch.amount {
            validate_non_negative_amount(&amount)?;
            transaction.amount = amount;
        }
        if let Some(description) = patch.description {
            validate_required(&description, "Description")?;
            transaction.description = description;
        }
        if let Some(reference) = patch.reference {
            transaction.reference = Some(reference);
        }
        if let Some(entry_type) = patch.entry_type {
            transaction.entry_type = entry_type;
        }
        if let Some(category) = patch.category {
            transaction.category = Some(category);
        }

        self.store.update_transaction(&transaction).await?;
        self.audit(organization_id, actor, "update_transaction", Some(id), changes)
            .await;

        Ok(transaction)
    }

    pub async fn delete(&mut self, organization_id: Uuid, id: Uuid, actor: Uuid) -> CoreResult<()> {
        self.store.delete_transaction(organization_id, id).await?;
        self.audit(organization_id, actor, "delete_transaction", Some(id), json!({}))
            .await;
        Ok(())
    }

    /// Insert a batch of transactions in one store call, returning the
    /// number inserted
    pub async fn bulk_import(
        &mut self,
        organization_id: Uuid,
        inputs: Vec<NewTransaction>,
        actor: Uuid,
    ) -> CoreResult<usize> {
        for input in &inputs {
            validate_non_negative_amount(&input.amount)?;
            validate_required(&input.description, "Description")?;
        }

        let rows: Vec<Transaction> = inputs
            .into_iter()
            .map(|input| Transaction {
                id: Uuid::new_v4(),
                organization_id,
                account_id: input.account_id,
                transaction_date: input.transaction_date,
                amount: input.amount,
                description: input.description,
                reference: input.reference,
                entry_type: input.entry_type,
                category: input.category,
                status: TransactionStatus::Pending,
                created_by: actor,
            })
            .collect();

        let inserted = self.store.bulk_insert_transactions(&rows).await?;
        info!(%organization_id, inserted, "bulk imported transactions");

        self.audit(
            organization_id,
            actor,
            "bulk_import_transactions",
            None,
            json!({ "count": inserted }),
        )
        .await;

        Ok(inserted)
    }

    /// Mark a transaction as matched against an external record
    pub async fn reconcile(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> CoreResult<Transaction> {
        let mut transaction = self.get(organization_id, id).await?;
        transaction.status = TransactionStatus::Reconciled;
        self.store.update_transaction(&transaction).await?;

        self.audit(organization_id, actor, "reconcile_transaction", Some(id), json!({}))
            .await;

        Ok(transaction)
    }

    async fn audit(
        &mut self,
        organization_id: Uuid,
        actor: Uuid,
        action: &str,
        entity_id: Option<Uuid>,
        changes: serde_json::Value,
    ) {
        let record = AuditRecord {
            organization_id,
            actor,
            action: action.to_string(),
            entity_type: "transaction".to_string(),
            entity_id,
            changes,
        };
        if let Err(err) = self.store.append_audit(&record).await {
            warn!(%organization_id, action, error = %err, "failed to append audit record");
        }
    }
}
