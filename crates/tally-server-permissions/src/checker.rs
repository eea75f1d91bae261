// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission checks against stored memberships and roles.
//!
//! The boolean checks never fail: storage errors are logged and resolve to a
//! deny. Callers that need the cause use [`PermissionService::evaluate_permission`].

use tracing::instrument;

use tally_permissions_core::{
	evaluate, primitive_role_permissions, Decision, DecisionReason, OrgId, PermissionMatrix,
	ResourceId, ResourceType, Role, UserId,
};

use crate::error::Result;
use crate::service::PermissionService;

impl PermissionService {
	/// Loads the caller's membership (and custom role, when one applies) and
	/// runs the decision function.
	#[instrument(skip(self, resource), fields(user_id = %user_id, org_id = %org_id, permission = %permission))]
	pub async fn evaluate_permission(
		&self,
		user_id: UserId,
		org_id: OrgId,
		resource: Option<(ResourceType, ResourceId)>,
		permission: &str,
	) -> Result<Decision> {
		let membership = self.repo.get_membership(user_id, org_id).await?;
		let custom_role = match &membership {
			Some(m) if m.is_active() && !m.is_admin() => match m.custom_role_id {
				Some(role_id) => self.repo.get_role(org_id, role_id).await?,
				None => None,
			},
			_ => None,
		};

		let decision = evaluate(membership.as_ref(), custom_role.as_ref(), resource, permission);
		match decision.reason {
			DecisionReason::InvalidPermission => {
				tracing::warn!("malformed permission string, denying");
			}
			DecisionReason::MissingCustomRole => {
				tracing::warn!(
					custom_role_id = ?membership.as_ref().and_then(|m| m.custom_role_id),
					"membership references a missing custom role, denying"
				);
			}
			_ => {}
		}

		if self.options.log_decisions {
			tracing::info!(
				resource_type = ?resource.map(|(resource_type, _)| resource_type),
				allowed = decision.allowed,
				reason = ?decision.reason,
				"permission decision"
			);
		}
		Ok(decision)
	}

	/// True when the user may perform `permission` on the given resource.
	pub async fn check_resource_permission(
		&self,
		user_id: UserId,
		org_id: OrgId,
		resource_type: ResourceType,
		resource_id: ResourceId,
		permission: &str,
	) -> bool {
		self
			.check(user_id, org_id, Some((resource_type, resource_id)), permission)
			.await
	}

	/// True when the user's organization-wide permissions include `permission`.
	pub async fn check_permission(&self, user_id: UserId, org_id: OrgId, permission: &str) -> bool {
		self.check(user_id, org_id, None, permission).await
	}

	async fn check(
		&self,
		user_id: UserId,
		org_id: OrgId,
		resource: Option<(ResourceType, ResourceId)>,
		permission: &str,
	) -> bool {
		match self
			.evaluate_permission(user_id, org_id, resource, permission)
			.await
		{
			Ok(decision) => decision.allowed,
			Err(e) => {
				tracing::warn!(
					user_id = %user_id,
					org_id = %org_id,
					permission,
					error = %e,
					"permission check failed, denying"
				);
				false
			}
		}
	}

	/// The organization-wide matrix that applies to a user.
	///
	/// `None` when the user has no active membership. Admins get every
	/// permission; a membership pointing at a missing custom role gets none.
	#[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	pub async fn get_user_permissions(
		&self,
		user_id: UserId,
		org_id: OrgId,
	) -> Result<Option<PermissionMatrix>> {
		let Some(membership) = self.repo.get_membership(user_id, org_id).await? else {
			return Ok(None);
		};
		if !membership.is_active() {
			return Ok(None);
		}
		if membership.is_admin() {
			return Ok(Some(PermissionMatrix::all()));
		}

		let matrix = match membership.custom_role_id {
			Some(role_id) => self
				.repo
				.get_role(org_id, role_id)
				.await?
				.map(|role: Role| role.permissions)
				.unwrap_or_else(PermissionMatrix::none),
			None => primitive_role_permissions(membership.role),
		};
		Ok(Some(matrix))
	}
}
