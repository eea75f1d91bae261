// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-resource overrides and template application.

use tracing::instrument;

use tally_permissions_core::{
	calculate_effective, OrgId, PermissionMatrix, PermissionPatch, ResourceId, ResourceOverride,
	ResourceType, Role, RoleId, TemplateId, UserId,
};

use crate::error::{PermissionsServerError, Result};
use crate::requests::ApplyTemplateOutcome;
use crate::service::PermissionService;

impl PermissionService {
	/// Installs or replaces a role's override for one resource.
	///
	/// The override matrix is built from `permissions` alone: anything it does
	/// not mention is denied on that resource.
	#[instrument(
		skip(self, permissions),
		fields(org_id = %org_id, role_id = %role_id, resource_type = %resource_type, resource_id = %resource_id)
	)]
	pub async fn set_resource_permission_override(
		&self,
		role_id: RoleId,
		org_id: OrgId,
		resource_type: ResourceType,
		resource_id: ResourceId,
		permissions: PermissionPatch,
		updated_by: Option<UserId>,
	) -> Result<Role> {
		let role = self.mutable_role(role_id, org_id).await?;
		ensure_overridable(resource_type)?;
		self.resources.validate(org_id, resource_type, resource_id).await?;

		let entry = ResourceOverride {
			resource_type,
			resource_id,
			permissions: PermissionMatrix::from_patch_denying_unspecified(&permissions),
		};
		self.repo.upsert_override(role.id, &entry).await?;

		tracing::debug!(updated_by = ?updated_by, "resource override set");
		self.get_custom_role_by_id(role_id, org_id).await
	}

	/// Removes a role's override for one resource. Returns false if there was none.
	#[instrument(
		skip(self),
		fields(org_id = %org_id, role_id = %role_id, resource_type = %resource_type, resource_id = %resource_id)
	)]
	pub async fn remove_resource_permission_override(
		&self,
		role_id: RoleId,
		org_id: OrgId,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Result<bool> {
		let role = self.mutable_role(role_id, org_id).await?;
		let removed = self
			.repo
			.remove_override(role.id, resource_type, resource_id)
			.await?;

		tracing::debug!(removed, "resource override removed");
		Ok(removed)
	}

	/// Restricts every role in the organization on one resource.
	///
	/// For each role the override becomes the role's base permissions with the
	/// template's denies applied (admin-archetype roles keep their base). All
	/// overrides are written in one transaction. Recomputing from the base
	/// makes repeated application a no-op.
	#[instrument(
		skip(self),
		fields(org_id = %org_id, template_id = %template_id, resource_type = %resource_type, resource_id = %resource_id)
	)]
	pub async fn apply_permission_template(
		&self,
		org_id: OrgId,
		template_id: TemplateId,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Result<ApplyTemplateOutcome> {
		let template = self.get_permission_template_by_id(template_id, org_id).await?;
		if !template.applies_to(resource_type) {
			return Err(PermissionsServerError::Validation(format!(
				"template '{}' does not apply to {resource_type} resources",
				template.name
			)));
		}
		ensure_overridable(resource_type)?;
		self.resources.validate(org_id, resource_type, resource_id).await?;

		let roles = self.repo.list_roles(org_id).await?;
		let entries: Vec<(RoleId, ResourceOverride)> = roles
			.iter()
			.map(|role| {
				let permissions =
					calculate_effective(&role.permissions, &template.permissions, role.based_on);
				(
					role.id,
					ResourceOverride {
						resource_type,
						resource_id,
						permissions,
					},
				)
			})
			.collect();

		self.repo.upsert_overrides(&entries).await?;

		tracing::info!(roles_updated = entries.len(), "permission template applied");
		Ok(ApplyTemplateOutcome {
			roles_updated: entries.len(),
		})
	}

	async fn mutable_role(&self, role_id: RoleId, org_id: OrgId) -> Result<Role> {
		let role = self.get_custom_role_by_id(role_id, org_id).await?;
		if role.is_system_role {
			return Err(PermissionsServerError::Conflict(
				"system role overrides are managed by templates only".to_string(),
			));
		}
		Ok(role)
	}
}

fn ensure_overridable(resource_type: ResourceType) -> Result<()> {
	if resource_type.supports_overrides() {
		Ok(())
	} else {
		Err(PermissionsServerError::Validation(format!(
			"resource type '{resource_type}' does not support overrides"
		)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use crate::requests::{CreateRoleRequest, CreateTemplateRequest, UpdateRoleRequest};
	use crate::testing::{create_test_pool, insert_resource};
	use sqlx::SqlitePool;
	use tally_permissions_core::Permission;

	async fn setup() -> (SqlitePool, PermissionService, OrgId) {
		let pool = create_test_pool().await;
		let service = PermissionService::sqlite(pool.clone());
		let org = OrgId::generate();
		service.initialize_organization(org, None).await.unwrap();
		(pool, service, org)
	}

	async fn editor(service: &PermissionService, org: OrgId) -> Role {
		service
			.create_custom_role(
				org,
				CreateRoleRequest::new("Editor")
					.with_permissions(PermissionPatch::new().with(Permission::TasksEdit, true)),
				None,
			)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_set_override_twice_upserts() {
		let (pool, service, org) = setup().await;
		let role = editor(&service, org).await;
		let task = insert_resource(&pool, ResourceType::Task, org).await;

		service
			.set_resource_permission_override(
				role.id,
				org,
				ResourceType::Task,
				task,
				PermissionPatch::new().with(Permission::TasksView, true),
				None,
			)
			.await
			.unwrap();
		let role = service
			.set_resource_permission_override(
				role.id,
				org,
				ResourceType::Task,
				task,
				PermissionPatch::new().with(Permission::CommentsView, true),
				None,
			)
			.await
			.unwrap();

		assert_eq!(role.resource_overrides.len(), 1);
		let entry = &role.resource_overrides[0];
		assert!(entry.permissions.allows(Permission::CommentsView));
		assert!(!entry.permissions.allows(Permission::TasksView));
	}

	#[tokio::test]
	async fn test_set_override_validates_resource() {
		let (pool, service, org) = setup().await;
		let role = editor(&service, org).await;
		let foreign_task = insert_resource(&pool, ResourceType::Task, OrgId::generate()).await;

		let foreign = service
			.set_resource_permission_override(
				role.id,
				org,
				ResourceType::Task,
				foreign_task,
				PermissionPatch::new(),
				None,
			)
			.await
			.unwrap_err();
		assert_eq!(foreign.kind(), ErrorKind::NotFound);

		let note = service
			.set_resource_permission_override(
				role.id,
				org,
				ResourceType::Note,
				ResourceId::generate(),
				PermissionPatch::new(),
				None,
			)
			.await
			.unwrap_err();
		assert_eq!(note.kind(), ErrorKind::Validation);
	}

	#[tokio::test]
	async fn test_system_role_overrides_rejected() {
		let (pool, service, org) = setup().await;
		let task = insert_resource(&pool, ResourceType::Task, org).await;
		let guest = service
			.get_organization_roles(org)
			.await
			.unwrap()
			.into_iter()
			.find(|r| r.name == "Guest")
			.unwrap();

		let err = service
			.set_resource_permission_override(
				guest.id,
				org,
				ResourceType::Task,
				task,
				PermissionPatch::new(),
				None,
			)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Conflict);
	}

	#[tokio::test]
	async fn test_remove_override_is_noop_when_absent() {
		let (_pool, service, org) = setup().await;
		let role = editor(&service, org).await;

		let removed = service
			.remove_resource_permission_override(role.id, org, ResourceType::Task, ResourceId::generate())
			.await
			.unwrap();
		assert!(!removed);
	}

	#[tokio::test]
	async fn test_apply_template_covers_every_role() {
		let (pool, service, org) = setup().await;
		editor(&service, org).await;
		let task = insert_resource(&pool, ResourceType::Task, org).await;
		let view_only = service
			.get_permission_templates(org)
			.await
			.unwrap()
			.into_iter()
			.find(|t| t.name == "View Only")
			.unwrap();

		let outcome = service
			.apply_permission_template(org, view_only.id, ResourceType::Task, task)
			.await
			.unwrap();
		assert_eq!(outcome.roles_updated, 5);

		for role in service.get_organization_roles(org).await.unwrap() {
			assert_eq!(role.resource_overrides.len(), 1, "role {}", role.name);
			let entry = &role.resource_overrides[0];
			assert!(entry.permissions.is_subset_of(&role.permissions));
			if role.name == "Administrator" {
				assert_eq!(entry.permissions, role.permissions);
			} else {
				assert!(!entry.permissions.allows(Permission::TasksEdit));
			}
		}
	}

	#[tokio::test]
	async fn test_apply_template_is_idempotent() {
		let (pool, service, org) = setup().await;
		let role = editor(&service, org).await;
		let task = insert_resource(&pool, ResourceType::Task, org).await;
		let edit_access = service
			.get_permission_templates(org)
			.await
			.unwrap()
			.into_iter()
			.find(|t| t.name == "Edit Access")
			.unwrap();

		for _ in 0..3 {
			service
				.apply_permission_template(org, edit_access.id, ResourceType::Task, task)
				.await
				.unwrap();
		}

		let role = service.get_custom_role_by_id(role.id, org).await.unwrap();
		assert_eq!(role.resource_overrides.len(), 1);
		let expected =
			calculate_effective(&role.permissions, &edit_access.permissions, role.based_on);
		assert_eq!(role.resource_overrides[0].permissions, expected);
	}

	#[tokio::test]
	async fn test_override_writes_keep_role_version() {
		let (pool, service, org) = setup().await;
		let role = editor(&service, org).await;
		let task = insert_resource(&pool, ResourceType::Task, org).await;
		let view_only = service
			.get_permission_templates(org)
			.await
			.unwrap()
			.into_iter()
			.find(|t| t.name == "View Only")
			.unwrap();

		service
			.apply_permission_template(org, view_only.id, ResourceType::Task, task)
			.await
			.unwrap();
		let after_override = service
			.set_resource_permission_override(
				role.id,
				org,
				ResourceType::Task,
				task,
				PermissionPatch::new().with(Permission::TasksView, true),
				None,
			)
			.await
			.unwrap();
		assert_eq!(after_override.version, role.version);

		let updated = service
			.update_custom_role(
				role.id,
				org,
				UpdateRoleRequest {
					name: Some("Lead Editor".to_string()),
					expected_version: Some(role.version),
					..Default::default()
				},
				None,
			)
			.await
			.unwrap();
		assert_eq!(updated.version, role.version + 1);
		assert_eq!(updated.resource_overrides.len(), 1);
	}

	#[tokio::test]
	async fn test_apply_template_checks_applicability() {
		let (pool, service, org) = setup().await;
		let project = insert_resource(&pool, ResourceType::Project, org).await;
		let task_only = service
			.create_permission_template(
				org,
				CreateTemplateRequest {
					name: "Task Lock".to_string(),
					description: None,
					permissions: PermissionPatch::new().with(Permission::TasksEdit, false),
					applicable_resource_types: vec![ResourceType::Task],
				},
				None,
			)
			.await
			.unwrap();

		let err = service
			.apply_permission_template(org, task_only.id, ResourceType::Project, project)
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Validation);

		let missing = service
			.apply_permission_template(org, task_only.id, ResourceType::Task, ResourceId::generate())
			.await
			.unwrap_err();
		assert_eq!(missing.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn test_apply_template_to_note_is_rejected() {
		let (_pool, service, org) = setup().await;
		let view_only = service
			.get_permission_templates(org)
			.await
			.unwrap()
			.into_iter()
			.find(|t| t.name == "View Only")
			.unwrap();

		let err = service
			.apply_permission_template(org, view_only.id, ResourceType::Note, ResourceId::generate())
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Validation);
	}
}
