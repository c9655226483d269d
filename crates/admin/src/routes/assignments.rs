//! Client assignment API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use content_desk_core::{AdminId, AssignmentId, ClientId};

use crate::error::AppError;
use crate::middleware::RequireAccess;
use crate::models::Assignment;
use crate::services::{
    AccessContext, AssignmentRegistry, BulkExecutor, BulkIntent, BulkPlan, BulkResult,
    ItemFailureView, RegistrySnapshot, plan,
};
use crate::state::AppState;

/// Build the assignments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/access", get(show_access))
        .route("/api/assignments", get(index).post(create))
        .route("/api/assignments/{id}", delete(destroy))
        .route("/api/assignments/bulk/preview", post(bulk_preview))
        .route("/api/assignments/bulk", post(bulk_execute))
}

/// Request for assigning a single client.
#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub admin_id: AdminId,
    pub client_id: ClientId,
}

/// Response for a bulk run.
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub description: String,
    pub success_count: usize,
    pub failure_count: usize,
    pub summary: String,
    pub failures: Vec<ItemFailureView>,
}

impl BulkResponse {
    fn new(plan: &BulkPlan, result: &BulkResult) -> Self {
        Self {
            description: plan.description.clone(),
            success_count: result.success_count,
            failure_count: result.failure_count,
            summary: result.summary(),
            failures: result.failures.iter().map(ItemFailureView::from).collect(),
        }
    }
}

/// The caller's resolved role and visibility.
pub async fn show_access(RequireAccess(ctx): RequireAccess) -> Json<AccessContext> {
    Json(ctx)
}

/// Registry snapshot for the caller.
///
/// Sub-admins only see their own assignments.
///
/// # Errors
///
/// Returns an error if the store fails.
#[instrument(skip_all, fields(admin_id = %ctx.admin_id()))]
pub async fn index(
    RequireAccess(ctx): RequireAccess,
    State(state): State<AppState>,
) -> Result<Json<RegistrySnapshot>, AppError> {
    let registry = AssignmentRegistry::load(state.store(), &ctx).await?;
    Ok(Json(registry.snapshot().clone()))
}

/// Assign a client to a sub-admin.
///
/// # Errors
///
/// Returns 403 for non-super-admins, 404 for unknown admins or clients,
/// 400 when the target is not a sub-admin, and 409 when the client is
/// already assigned.
#[instrument(skip_all, fields(admin_id = %ctx.admin_id()))]
pub async fn create(
    RequireAccess(ctx): RequireAccess,
    State(state): State<AppState>,
    Json(body): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    ctx.require_assignment_manager("assign clients")?;

    let mut registry = AssignmentRegistry::load(state.store(), &ctx).await?;
    let assignment = registry.assign(&ctx, body.admin_id, body.client_id).await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Remove an assignment.
///
/// # Errors
///
/// Returns 403 for non-super-admins and 404 if the assignment does not exist.
#[instrument(skip_all, fields(admin_id = %ctx.admin_id(), %assignment_id))]
pub async fn destroy(
    RequireAccess(ctx): RequireAccess,
    State(state): State<AppState>,
    Path(assignment_id): Path<AssignmentId>,
) -> Result<StatusCode, AppError> {
    ctx.require_assignment_manager("unassign clients")?;

    let mut registry = AssignmentRegistry::load(state.store(), &ctx).await?;
    registry.unassign(&ctx, assignment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Validate a bulk intent and return its plan without executing it.
///
/// # Errors
///
/// Returns 403 for non-super-admins and 400 for invalid intents.
#[instrument(skip_all, fields(admin_id = %ctx.admin_id()))]
pub async fn bulk_preview(
    RequireAccess(ctx): RequireAccess,
    State(state): State<AppState>,
    Json(intent): Json<BulkIntent>,
) -> Result<Json<BulkPlan>, AppError> {
    ctx.require_assignment_manager("run bulk assignment operations")?;

    let registry = AssignmentRegistry::load(state.store(), &ctx).await?;
    let plan = plan(&intent, registry.admins())?;

    Ok(Json(plan))
}

/// Run a bulk operation.
///
/// Responds 200 when every item succeeded and 207 Multi-Status otherwise;
/// the body always carries the full tally.
///
/// # Errors
///
/// Returns 403 for non-super-admins and 400 for invalid intents.
#[instrument(skip_all, fields(admin_id = %ctx.admin_id()))]
pub async fn bulk_execute(
    RequireAccess(ctx): RequireAccess,
    State(state): State<AppState>,
    Json(intent): Json<BulkIntent>,
) -> Result<(StatusCode, Json<BulkResponse>), AppError> {
    ctx.require_assignment_manager("run bulk assignment operations")?;

    let mut registry = AssignmentRegistry::load(state.store(), &ctx).await?;
    let plan = plan(&intent, registry.admins())?;
    let result = BulkExecutor::new(&mut registry).execute(&ctx, &plan).await?;

    let status = if result.is_complete_success() {
        StatusCode::OK
    } else {
        tracing::warn!(
            success = result.success_count,
            failed = result.failure_count,
            "Bulk operation completed with errors"
        );
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(BulkResponse::new(&plan, &result))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use content_desk_core::{AdminRole, Email};

    use super::*;
    use crate::config::AdminConfig;
    use crate::models::{Admin, Client};
    use crate::services::{BulkKind, resolve_access};
    use crate::store::MemoryAssignmentStore;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    struct Fixture {
        state: AppState,
        store: Arc<MemoryAssignmentStore>,
        boss: Admin,
        sub: Admin,
        clients: Vec<Client>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryAssignmentStore::new());
        let boss = store.insert_admin(email("super@x.com"), AdminRole::SuperAdmin);
        let sub = store.insert_admin(email("sub@x.com"), AdminRole::SubAdmin);
        let clients = vec![
            store.insert_client(email("a@acme.com"), "Acme"),
            store.insert_client(email("b@acme.com"), "Acme"),
        ];

        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/desk"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        // Never connects; handlers here only touch the in-memory store.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/desk")
            .unwrap();
        let state = AppState::with_store(config, pool, store.clone());

        Fixture {
            state,
            store,
            boss,
            sub,
            clients,
        }
    }

    async fn access(f: &Fixture, admin: &Admin) -> RequireAccess {
        RequireAccess(resolve_access(f.store.as_ref(), admin.user_id).await.unwrap())
    }

    #[tokio::test]
    async fn test_create_returns_created() {
        let f = fixture();
        let (status, Json(assignment)) = create(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Json(CreateAssignmentRequest {
                admin_id: f.sub.id,
                client_id: f.clients[0].id,
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(assignment.admin_id, f.sub.id);
        assert_eq!(assignment.assigned_by, f.boss.id);
    }

    #[tokio::test]
    async fn test_sub_admin_create_is_forbidden() {
        let f = fixture();
        let err = create(
            access(&f, &f.sub).await,
            State(f.state.clone()),
            Json(CreateAssignmentRequest {
                admin_id: f.sub.id,
                client_id: f.clients[0].id,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(f.store.assignment_count(), 0);
    }

    #[tokio::test]
    async fn test_destroy_missing_assignment_is_not_found() {
        let f = fixture();
        let err = destroy(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Path(AssignmentId::generate()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_preview_rejects_empty_selection() {
        let f = fixture();
        let err = bulk_preview(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Json(BulkIntent {
                kind: BulkKind::Assign,
                from_admin: None,
                to_admin: Some(f.sub.id),
                client_ids: Vec::new(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_bulk_execute_reports_multi_status() {
        let f = fixture();
        let intent = BulkIntent {
            kind: BulkKind::Unassign,
            from_admin: Some(f.sub.id),
            to_admin: None,
            client_ids: f.clients.iter().map(|c| c.id).collect(),
        };
        create(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Json(CreateAssignmentRequest {
                admin_id: f.sub.id,
                client_id: f.clients[0].id,
            }),
        )
        .await
        .unwrap();

        let (status, Json(body)) = bulk_execute(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Json(intent),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body.success_count, 1);
        assert_eq!(body.failure_count, 1);
        assert_eq!(body.failures[0].client_id, f.clients[1].id);
        assert_eq!(body.description, "Unassign 2 clients from sub@x.com");
        assert_eq!(f.store.assignment_count(), 0);
    }

    #[tokio::test]
    async fn test_index_is_scoped_for_sub_admin() {
        let f = fixture();
        create(
            access(&f, &f.boss).await,
            State(f.state.clone()),
            Json(CreateAssignmentRequest {
                admin_id: f.sub.id,
                client_id: f.clients[1].id,
            }),
        )
        .await
        .unwrap();

        let Json(snapshot) = index(access(&f, &f.sub).await, State(f.state.clone()))
            .await
            .unwrap();

        assert_eq!(snapshot.assignments.len(), 1);
        assert!(snapshot.admins.is_empty());
        assert!(snapshot.unassigned_clients.is_empty());
    }
}
