// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role lifecycle: seeding, CRUD, cloning and guarded deletion.

use chrono::Utc;
use tracing::instrument;

use tally_permissions_core::{default_roles, OrgId, PermissionMatrix, Role, RoleId, UserId};

use crate::error::{PermissionsServerError, Result};
use crate::requests::{CreateRoleRequest, DeleteRoleOutcome, UpdateRoleRequest};
use crate::service::{normalize_name, PermissionService};

impl PermissionService {
	/// Creates the four system roles. Roles whose name already exists in the
	/// organization are skipped.
	///
	/// Returns how many roles were created.
	#[instrument(skip(self), fields(org_id = %org_id))]
	pub async fn create_default_roles(
		&self,
		org_id: OrgId,
		created_by: Option<UserId>,
	) -> Result<usize> {
		let mut created = 0;

		for default in default_roles() {
			if let Some(existing) = self.repo.get_role_by_name(org_id, default.name).await? {
				if !existing.is_system_role {
					tracing::warn!(
						role_id = %existing.id,
						name = default.name,
						"custom role occupies a system role name, not seeding it"
					);
				}
				continue;
			}

			let mut role = Role::new_custom(
				org_id,
				default.name,
				default.based_on,
				default.permissions,
				created_by,
			);
			role.description = Some(default.description.to_string());
			role.is_system_role = true;

			match self.repo.create_role(&role).await {
				Ok(()) => created += 1,
				// Seeded concurrently by another caller.
				Err(PermissionsServerError::Conflict(_)) => {}
				Err(e) => return Err(e),
			}
		}

		tracing::info!(created, "system roles seeded");
		Ok(created)
	}

	#[instrument(skip(self), fields(org_id = %org_id))]
	pub async fn get_organization_roles(&self, org_id: OrgId) -> Result<Vec<Role>> {
		self.repo.list_roles(org_id).await
	}

	#[instrument(skip(self), fields(org_id = %org_id, role_id = %role_id))]
	pub async fn get_custom_role_by_id(&self, role_id: RoleId, org_id: OrgId) -> Result<Role> {
		self
			.repo
			.get_role(org_id, role_id)
			.await?
			.ok_or_else(|| PermissionsServerError::NotFound(format!("role {role_id}")))
	}

	/// Memberships in the organization that reference the role.
	#[instrument(skip(self), fields(org_id = %org_id, role_id = %role_id))]
	pub async fn get_role_member_count(&self, role_id: RoleId, org_id: OrgId) -> Result<i64> {
		self.get_custom_role_by_id(role_id, org_id).await?;
		self.repo.count_members_with_role(org_id, role_id).await
	}

	/// Creates a non-system role. Unspecified permissions take the
	/// per-category defaults.
	#[instrument(skip(self, request), fields(org_id = %org_id))]
	pub async fn create_custom_role(
		&self,
		org_id: OrgId,
		request: CreateRoleRequest,
		created_by: Option<UserId>,
	) -> Result<Role> {
		let name = normalize_name(&request.name)?;
		if self.repo.get_role_by_name(org_id, &name).await?.is_some() {
			return Err(PermissionsServerError::Conflict(format!(
				"a role named '{name}' already exists"
			)));
		}

		let mut role = Role::new_custom(
			org_id,
			name,
			request.based_on,
			PermissionMatrix::from_patch(&request.permissions),
			created_by,
		);
		role.description = request.description;

		self.repo.create_role(&role).await?;

		tracing::debug!(role_id = %role.id, "custom role created");
		Ok(role)
	}

	/// Updates a custom role. Scalar fields are replaced, permissions are
	/// merged into the existing matrix.
	#[instrument(skip(self, request), fields(org_id = %org_id, role_id = %role_id))]
	pub async fn update_custom_role(
		&self,
		role_id: RoleId,
		org_id: OrgId,
		request: UpdateRoleRequest,
		updated_by: Option<UserId>,
	) -> Result<Role> {
		let mut role = self.get_custom_role_by_id(role_id, org_id).await?;
		if role.is_system_role {
			return Err(PermissionsServerError::Conflict(
				"system roles cannot be modified".to_string(),
			));
		}

		let expected_version = request.expected_version.unwrap_or(role.version);
		if expected_version != role.version {
			return Err(stale_version(role_id));
		}

		if let Some(name) = request.name {
			role.name = normalize_name(&name)?;
		}
		if let Some(description) = request.description {
			role.description = Some(description);
		}
		if let Some(based_on) = request.based_on {
			role.based_on = based_on;
		}
		if let Some(patch) = request.permissions {
			role.permissions.merge(&patch);
		}
		role.updated_by = updated_by;
		role.updated_at = Utc::now();

		if !self.repo.update_role(&role, expected_version).await? {
			return Err(stale_version(role_id));
		}

		tracing::debug!("custom role updated");
		self.get_custom_role_by_id(role_id, org_id).await
	}

	/// Deletes a custom role.
	///
	/// A role still referenced by memberships needs `new_role_id`: those
	/// memberships are moved to the replacement (custom role and primitive
	/// role) in the same transaction that deletes the role.
	#[instrument(skip(self), fields(org_id = %org_id, role_id = %role_id, new_role_id = ?new_role_id))]
	pub async fn delete_custom_role(
		&self,
		role_id: RoleId,
		org_id: OrgId,
		new_role_id: Option<RoleId>,
	) -> Result<DeleteRoleOutcome> {
		let role = self.get_custom_role_by_id(role_id, org_id).await?;
		if role.is_system_role {
			return Err(PermissionsServerError::Conflict(
				"system roles cannot be deleted".to_string(),
			));
		}

		match new_role_id {
			None => {
				let member_count = self.repo.count_members_with_role(org_id, role_id).await?;
				if member_count > 0 {
					return Err(PermissionsServerError::RoleInUse {
						role_id,
						member_count,
					});
				}

				if !self.repo.delete_role(org_id, role_id).await? {
					// Lost a race with an assignment or another delete.
					let member_count = self.repo.count_members_with_role(org_id, role_id).await?;
					if member_count > 0 {
						return Err(PermissionsServerError::RoleInUse {
							role_id,
							member_count,
						});
					}
					return Err(PermissionsServerError::NotFound(format!("role {role_id}")));
				}

				tracing::debug!("custom role deleted");
				Ok(DeleteRoleOutcome {
					reassigned_members: 0,
				})
			}
			Some(new_role_id) if new_role_id == role_id => Err(PermissionsServerError::Validation(
				"replacement role must differ from the deleted role".to_string(),
			)),
			Some(new_role_id) => {
				let replacement = self.repo.get_role(org_id, new_role_id).await?.ok_or_else(|| {
					PermissionsServerError::NotFound(format!("replacement role {new_role_id}"))
				})?;

				let reassigned_members = self
					.repo
					.reassign_members_and_delete_role(org_id, role_id, &replacement)
					.await?;

				tracing::info!(reassigned_members, "custom role deleted with reassignment");
				Ok(DeleteRoleOutcome { reassigned_members })
			}
		}
	}

	/// Copies a role's base permissions into a new custom role.
	///
	/// Resource overrides are not copied.
	#[instrument(skip(self), fields(org_id = %org_id, source_role_id = %source_role_id))]
	pub async fn clone_role(
		&self,
		source_role_id: RoleId,
		org_id: OrgId,
		new_name: &str,
		created_by: Option<UserId>,
	) -> Result<Role> {
		let source = self.get_custom_role_by_id(source_role_id, org_id).await?;
		let name = normalize_name(new_name)?;
		if self.repo.get_role_by_name(org_id, &name).await?.is_some() {
			return Err(PermissionsServerError::Conflict(format!(
				"a role named '{name}' already exists"
			)));
		}

		let mut role = Role::new_custom(
			org_id,
			name,
			source.based_on,
			source.permissions,
			created_by,
		);
		role.description = source.description;

		self.repo.create_role(&role).await?;

		tracing::debug!(role_id = %role.id, "role cloned");
		Ok(role)
	}
}

fn stale_version(role_id: RoleId) -> PermissionsServerError {
	PermissionsServerError::Conflict(format!(
		"role {role_id} was modified concurrently; reload and retry"
	))
}
