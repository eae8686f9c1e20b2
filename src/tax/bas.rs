//! BAS (Business Activity Statement) calculator
//!
//! Wraps the tax summary computation with a persisted snapshot and its
//! lodgement lifecycle (`draft -> ready -> lodged | rejected`), plus the
//! fixed mapping onto the government form's field codes. Actual submission
//! to the lodgement provider is an external concern.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::report::ReportEngine;
use crate::traits::{DataStore, StatusSwap};
use crate::types::*;
use crate::utils::money::round2;

/// BAS lodgement payload, keyed by the form's field codes.
///
/// Only the GST fields are populated from the statement; the withholding
/// (W), and other-tax (T) fields are carried as zeros. This is a fixed
/// dictionary mapping, not business logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasPayload {
    /// G1: Total sales
    pub g1: BigDecimal,
    /// G2: GST on sales
    pub g2: BigDecimal,
    /// G3: GST on purchases for making input taxed sales
    pub g3: BigDecimal,
    /// G4: Input taxed sales
    pub g4: BigDecimal,
    /// G10: Capital purchases
    pub g10: BigDecimal,
    /// G11: GST on purchases
    pub g11: BigDecimal,
    /// G13: Purchases for making input taxed sales
    pub g13: BigDecimal,
    /// G14: Purchases without GST in the price
    pub g14: BigDecimal,
    /// G15: Estimated purchases for private use
    pub g15: BigDecimal,
    /// G18: Adjustment
    pub g18: BigDecimal,
    /// G19: Adjustment
    pub g19: BigDecimal,
    /// G20: Adjustment
    pub g20: BigDecimal,
    /// G21: Net GST amount
    pub g21: BigDecimal,
    /// W1: Total salary and wages
    pub w1: BigDecimal,
    /// W2: Amounts withheld
    pub w2: BigDecimal,
    /// W3: Amounts withheld from investment distributions
    pub w3: BigDecimal,
    /// W4: Total amounts withheld
    pub w4: BigDecimal,
    /// T1: Wine equalisation tax
    pub t1: BigDecimal,
    /// T2: Luxury car tax
    pub t2: BigDecimal,
    /// T3: Fuel tax credits
    pub t3: BigDecimal,
    /// T4: Total
    pub t4: BigDecimal,
}

impl BasPayload {
    /// Map a statement onto the form schema
    pub fn from_statement(statement: &BasStatement) -> Self {
        let zero = BigDecimal::from(0);
        Self {
            g1: round2(&statement.total_sales),
            g2: round2(&statement.gst_collected),
            g3: zero.clone(),
            g4: zero.clone(),
            g10: round2(&statement.total_purchases),
            g11: round2(&statement.gst_paid),
            g13: zero.clone(),
            g14: zero.clone(),
            g15: zero.clone(),
            g18: zero.clone(),
            g19: zero.clone(),
            g20: zero.clone(),
            g21: round2(&statement.net_gst),
            w1: zero.clone(),
            w2: zero.clone(),
            w3: zero.clone(),
            w4: zero.clone(),
            t1: zero.clone(),
            t2: zero.clone(),
            t3: zero.clone(),
            t4: zero,
        }
    }
}

pub struct BasCalculator<S: DataStore> {
    store: S,
    reports: ReportEngine<S>,
}

impl<S: DataStore + Clone> BasCalculator<S> {
    pub fn new(store: S) -> Self {
        Self {
            reports: ReportEngine::new(store.clone()),
            store,
        }
    }
}

impl<S: DataStore> BasCalculator<S> {
    /// Compute the GST summary for the period and persist it as a draft
    /// statement
    pub async fn calculate(
        &mut self,
        organization_id: Uuid,
        period: &str,
    ) -> CoreResult<BasStatement> {
        let summary = self.reports.tax_summary(organization_id, period).await?;

        let statement = BasStatement {
            id: Uuid::new_v4(),
            organization_id,
            period: summary.period,
            period_start: summary.date_range.start_date,
            period_end: summary.date_range.end_date,
            total_sales: summary.sales.total,
            total_purchases: summary.purchases.total,
            gst_collected: summary.sales.gst_collected,
            gst_paid: summary.purchases.gst_paid,
            net_gst: summary.net_gst,
            status: BasStatus::Draft,
        };
        self.store.insert_bas_statement(&statement).await?;
        info!(
            %organization_id,
            bas_id = %statement.id,
            net_gst = %statement.net_gst,
            "BAS statement calculated"
        );

        Ok(statement)
    }

    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> CoreResult<BasStatement> {
        self.store
            .get_bas_statement(organization_id, id)
            .await?
            .ok_or(CoreError::NotFound("BAS statement"))
    }

    /// The lodgement payload for a statement
    pub async fn submission_payload(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasPayload> {
        let statement = self.get(organization_id, id).await?;
        Ok(BasPayload::from_statement(&statement))
    }

    /// `draft -> ready`: the statement has passed validation and can be
    /// lodged
    pub async fn mark_ready(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.swap(
            organization_id,
            id,
            &[BasStatus::Draft],
            BasStatus::Ready,
            "Only a draft statement can be marked ready",
        )
        .await
    }

    /// `ready -> lodged`
    pub async fn mark_lodged(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.swap(
            organization_id,
            id,
            &[BasStatus::Ready],
            BasStatus::Lodged,
            "Statement must be ready before lodging",
        )
        .await
    }

    /// `ready -> rejected`: lodgement was attempted and refused
    pub async fn mark_rejected(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
    ) -> CoreResult<BasStatement> {
        self.swap(
            organization_id,
            id,
            &[BasStatus::Ready],
            BasStatus::Rejected,
            "Only a ready statement can be rejected",
        )
        .await
    }

    async fn swap(
        &mut self,
        organization_id: Uuid,
        id: Uuid,
        expected: &[BasStatus],
        to: BasStatus,
        conflict: &str,
    ) -> CoreResult<BasStatement> {
        match self
            .store
            .swap_bas_status(organization_id, id, expected, to)
            .await?
        {
            StatusSwap::Updated(statement) => {
                info!(%organization_id, bas_id = %id, status = ?to, "BAS status updated");
                Ok(statement)
            }
            StatusSwap::Refused => Err(CoreError::Conflict(conflict.to_string())),
            StatusSwap::Missing => Err(CoreError::NotFound("BAS statement")),
        }
    }
}
