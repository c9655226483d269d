//! Bulk operation execution.
//!
//! Items run strictly one after another in plan order. A failing item is
//! recorded and the loop moves on; there are no retries and no rollback.

use serde::Serialize;
use tracing::{info, instrument, warn};

use content_desk_core::{AdminId, AssignmentId, ClientId};

use super::{BulkOperation, BulkPlan};
use crate::services::{AccessContext, AssignmentError, AssignmentRegistry};

/// One failed item of a bulk run.
#[derive(Debug)]
pub struct ItemFailure {
    pub client_id: ClientId,
    pub error: AssignmentError,
}

/// Outcome of a bulk run.
#[derive(Debug, Default)]
pub struct BulkResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<ItemFailure>,
}

impl BulkResult {
    fn record(&mut self, client_id: ClientId, outcome: Result<(), AssignmentError>) {
        match outcome {
            Ok(()) => self.success_count += 1,
            Err(error) => {
                warn!(%client_id, error = %error, "Bulk item failed");
                self.failure_count += 1;
                self.failures.push(ItemFailure { client_id, error });
            }
        }
    }

    /// Whether every item succeeded.
    #[must_use]
    pub const fn is_complete_success(&self) -> bool {
        self.failure_count == 0
    }

    /// Summary suitable for a toast, e.g. "2 succeeded, 1 failed".
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed",
            self.success_count, self.failure_count
        )
    }
}

/// Serializable view of a failed item.
#[derive(Debug, Serialize)]
pub struct ItemFailureView {
    pub client_id: ClientId,
    pub error: String,
}

impl From<&ItemFailure> for ItemFailureView {
    fn from(failure: &ItemFailure) -> Self {
        Self {
            client_id: failure.client_id,
            error: failure.error.to_string(),
        }
    }
}

/// Runs bulk plans against a registry.
pub struct BulkExecutor<'r, 'a> {
    registry: &'r mut AssignmentRegistry<'a>,
}

impl<'r, 'a> BulkExecutor<'r, 'a> {
    /// Create an executor over a loaded registry.
    #[must_use]
    pub const fn new(registry: &'r mut AssignmentRegistry<'a>) -> Self {
        Self { registry }
    }

    /// Execute a plan and return the tally.
    ///
    /// Every item is attempted exactly once, in order, regardless of earlier
    /// failures. The registry is refreshed once at the end.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentError::Unauthorized` if the caller may not change
    /// assignments; no item is attempted in that case.
    #[instrument(skip(self, ctx, plan), fields(caller = %ctx.admin_id(), items = plan.client_ids.len()))]
    pub async fn execute(
        &mut self,
        ctx: &AccessContext,
        plan: &BulkPlan,
    ) -> Result<BulkResult, AssignmentError> {
        ctx.require_assignment_manager("run bulk assignment operations")?;

        let mut result = BulkResult::default();

        for &client_id in &plan.client_ids {
            let outcome = match plan.operation {
                BulkOperation::Assign { to } => self.assign(ctx, to, client_id).await,
                BulkOperation::Unassign { from } => self.unassign(ctx, from, client_id).await,
                BulkOperation::Transfer { from, to } => {
                    self.transfer(ctx, from, to, client_id).await
                }
            };
            result.record(client_id, outcome);
        }

        self.registry.refresh_after_write(ctx).await;

        info!(
            description = %plan.description,
            success = result.success_count,
            failed = result.failure_count,
            "Bulk operation completed"
        );

        Ok(result)
    }

    async fn assign(
        &mut self,
        ctx: &AccessContext,
        to: AdminId,
        client_id: ClientId,
    ) -> Result<(), AssignmentError> {
        self.registry.assign(ctx, to, client_id).await.map(|_| ())
    }

    async fn unassign(
        &mut self,
        ctx: &AccessContext,
        from: AdminId,
        client_id: ClientId,
    ) -> Result<(), AssignmentError> {
        let assignment_id = self.locate(from, client_id)?;
        self.registry.unassign(ctx, assignment_id).await
    }

    /// Unassign from `from`, then assign to `to`.
    ///
    /// If the second step fails the client stays unassigned.
    async fn transfer(
        &mut self,
        ctx: &AccessContext,
        from: AdminId,
        to: AdminId,
        client_id: ClientId,
    ) -> Result<(), AssignmentError> {
        let assignment_id = self.locate(from, client_id)?;
        self.registry.unassign(ctx, assignment_id).await?;

        self.registry
            .assign(ctx, to, client_id)
            .await
            .map(|_| ())
            .map_err(|e| AssignmentError::TransferIncomplete {
                client_id,
                source: Box::new(e),
            })
    }

    fn locate(
        &self,
        admin_id: AdminId,
        client_id: ClientId,
    ) -> Result<AssignmentId, AssignmentError> {
        self.registry
            .find_assignment(admin_id, client_id)
            .map(|record| record.assignment.id)
            .ok_or_else(|| {
                AssignmentError::AssignmentNotFound(format!(
                    "client {client_id} is not assigned to admin {admin_id}"
                ))
            })
    }
}
