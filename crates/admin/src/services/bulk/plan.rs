//! Bulk operation planning.
//!
//! Planning is pure: it validates the intent and renders a description, so
//! it can be called on every preview without side effects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use content_desk_core::{AdminId, ClientId};

use crate::models::AdminSummary;

/// Why a bulk intent was rejected. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no clients selected")]
    NoSelection,
    #[error("no target admin selected")]
    MissingTarget,
    #[error("no source admin selected")]
    MissingSource,
    #[error("source and target admin are the same")]
    SameAdmin,
}

/// Requested kind of bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkKind {
    Assign,
    Unassign,
    Transfer,
}

/// Unvalidated bulk request, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIntent {
    #[serde(rename = "type")]
    pub kind: BulkKind,
    #[serde(default)]
    pub from_admin: Option<AdminId>,
    #[serde(default)]
    pub to_admin: Option<AdminId>,
    #[serde(default)]
    pub client_ids: Vec<ClientId>,
}

/// A validated bulk operation. Each variant carries exactly the admins it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BulkOperation {
    Assign { to: AdminId },
    Unassign { from: AdminId },
    Transfer { from: AdminId, to: AdminId },
}

/// A validated, executable bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkPlan {
    pub operation: BulkOperation,
    /// Clients in submission order, duplicates removed.
    pub client_ids: Vec<ClientId>,
    /// Human-readable summary, e.g. "Transfer 3 clients from a@x.com to b@x.com".
    pub description: String,
}

/// Validate a bulk intent and describe it.
///
/// `admins` is only used to render emails in the description; an unknown
/// admin ID is rendered as a placeholder rather than rejected.
///
/// # Errors
///
/// Returns the first failing [`ValidationError`] rule.
pub fn plan(intent: &BulkIntent, admins: &[AdminSummary]) -> Result<BulkPlan, ValidationError> {
    if intent.client_ids.is_empty() {
        return Err(ValidationError::NoSelection);
    }

    let operation = match intent.kind {
        BulkKind::Assign => BulkOperation::Assign {
            to: intent.to_admin.ok_or(ValidationError::MissingTarget)?,
        },
        BulkKind::Unassign => BulkOperation::Unassign {
            from: intent.from_admin.ok_or(ValidationError::MissingSource)?,
        },
        BulkKind::Transfer => {
            let from = intent.from_admin.ok_or(ValidationError::MissingSource)?;
            let to = intent.to_admin.ok_or(ValidationError::MissingTarget)?;
            if from == to {
                return Err(ValidationError::SameAdmin);
            }
            BulkOperation::Transfer { from, to }
        }
    };

    let mut client_ids = Vec::with_capacity(intent.client_ids.len());
    for id in &intent.client_ids {
        if !client_ids.contains(id) {
            client_ids.push(*id);
        }
    }

    let description = describe(operation, client_ids.len(), admins);

    Ok(BulkPlan {
        operation,
        client_ids,
        description,
    })
}

fn describe(operation: BulkOperation, count: usize, admins: &[AdminSummary]) -> String {
    let clients = if count == 1 {
        "1 client".to_owned()
    } else {
        format!("{count} clients")
    };

    match operation {
        BulkOperation::Assign { to } => {
            format!("Assign {clients} to {}", admin_label(to, admins))
        }
        BulkOperation::Unassign { from } => {
            format!("Unassign {clients} from {}", admin_label(from, admins))
        }
        BulkOperation::Transfer { from, to } => format!(
            "Transfer {clients} from {} to {}",
            admin_label(from, admins),
            admin_label(to, admins)
        ),
    }
}

fn admin_label(id: AdminId, admins: &[AdminSummary]) -> String {
    admins
        .iter()
        .find(|summary| summary.admin.id == id)
        .map_or_else(
            || format!("unknown admin ({id})"),
            |summary| summary.admin.email.to_string(),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use content_desk_core::{AdminRole, Email, UserId};

    use super::*;
    use crate::models::Admin;

    fn summary(email: &str) -> AdminSummary {
        AdminSummary {
            admin: Admin {
                id: AdminId::generate(),
                user_id: UserId::generate(),
                email: Email::parse(email).unwrap(),
                role: AdminRole::SubAdmin,
                created_at: Utc::now(),
            },
            assigned_count: 0,
        }
    }

    fn intent(kind: BulkKind, from: Option<AdminId>, to: Option<AdminId>, n: usize) -> BulkIntent {
        BulkIntent {
            kind,
            from_admin: from,
            to_admin: to,
            client_ids: (0..n).map(|_| ClientId::generate()).collect(),
        }
    }

    #[test]
    fn test_empty_selection_is_checked_first() {
        let err = plan(&intent(BulkKind::Transfer, None, None, 0), &[]).unwrap_err();
        assert_eq!(err, ValidationError::NoSelection);
    }

    #[test]
    fn test_missing_admins() {
        let a = AdminId::generate();
        assert_eq!(
            plan(&intent(BulkKind::Assign, Some(a), None, 1), &[]).unwrap_err(),
            ValidationError::MissingTarget
        );
        assert_eq!(
            plan(&intent(BulkKind::Unassign, None, Some(a), 1), &[]).unwrap_err(),
            ValidationError::MissingSource
        );
        // Source is checked before target for transfers.
        assert_eq!(
            plan(&intent(BulkKind::Transfer, None, None, 1), &[]).unwrap_err(),
            ValidationError::MissingSource
        );
        assert_eq!(
            plan(&intent(BulkKind::Transfer, Some(a), None, 1), &[]).unwrap_err(),
            ValidationError::MissingTarget
        );
    }

    #[test]
    fn test_transfer_to_same_admin() {
        let a = AdminId::generate();
        let err = plan(&intent(BulkKind::Transfer, Some(a), Some(a), 2), &[]).unwrap_err();
        assert_eq!(err, ValidationError::SameAdmin);
    }

    #[test]
    fn test_transfer_description_uses_emails() {
        let from = summary("admin-a@x.com");
        let to = summary("admin-b@x.com");
        let plan = plan(
            &intent(
                BulkKind::Transfer,
                Some(from.admin.id),
                Some(to.admin.id),
                3,
            ),
            &[from.clone(), to.clone()],
        )
        .unwrap();

        assert_eq!(
            plan.description,
            "Transfer 3 clients from admin-a@x.com to admin-b@x.com"
        );
        assert_eq!(
            plan.operation,
            BulkOperation::Transfer {
                from: from.admin.id,
                to: to.admin.id
            }
        );
    }

    #[test]
    fn test_unknown_admin_placeholder() {
        let unknown = AdminId::generate();
        let plan = plan(&intent(BulkKind::Unassign, Some(unknown), None, 1), &[]).unwrap();
        assert_eq!(
            plan.description,
            format!("Unassign 1 client from unknown admin ({unknown})")
        );
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        let to = summary("sub@x.com");
        let first = ClientId::generate();
        let second = ClientId::generate();
        let intent = BulkIntent {
            kind: BulkKind::Assign,
            from_admin: None,
            to_admin: Some(to.admin.id),
            client_ids: vec![first, second, first],
        };

        let plan = plan(&intent, &[to]).unwrap();

        assert_eq!(plan.client_ids, vec![first, second]);
        assert_eq!(plan.description, "Assign 2 clients to sub@x.com");
    }

    #[test]
    fn test_intent_deserializes_type_field() {
        let json = r#"{"type":"unassign","from_admin":"67e55044-10b1-426f-9247-bb680e5fe0c8","client_ids":[]}"#;
        let intent: BulkIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.kind, BulkKind::Unassign);
        assert!(intent.to_admin.is_none());

        assert!(serde_json::from_str::<BulkIntent>(r#"{"type":"archive"}"#).is_err());
    }
}
