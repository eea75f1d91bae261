// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end permission scenarios against an in-memory database.

use proptest::prelude::*;
use sqlx::SqlitePool;

use tally_server_permissions::testing::{
	create_test_pool, insert_active_member, insert_membership, insert_resource,
};
use tally_server_permissions::{
	CreateRoleRequest, CreateTemplateRequest, ErrorKind, MembershipStatus, OrgId, Permission,
	PermissionPatch, PermissionService, PermissionsRepository, PermissionsServerError, PrimitiveRole,
	ResourceId, ResourceType, Role, RoleArchetype, SeedOutcome, SqlitePermissionsRepository,
	UpdateRoleRequest, UserId,
};

struct TestOrg {
	pool: SqlitePool,
	service: PermissionService,
	org_id: OrgId,
}

impl TestOrg {
	async fn new() -> Self {
		let pool = create_test_pool().await;
		let service = PermissionService::sqlite(pool.clone());
		let org_id = OrgId::generate();
		service.initialize_organization(org_id, None).await.unwrap();
		Self {
			pool,
			service,
			org_id,
		}
	}

	async fn role(&self, name: &str, patch: PermissionPatch) -> Role {
		self
			.service
			.create_custom_role(
				self.org_id,
				CreateRoleRequest::new(name).with_permissions(patch),
				None,
			)
			.await
			.unwrap()
	}

	async fn member(&self, role: &Role) -> UserId {
		insert_active_member(&self.pool, self.org_id, PrimitiveRole::Member, Some(role.id)).await
	}

	async fn task(&self) -> ResourceId {
		insert_resource(&self.pool, ResourceType::Task, self.org_id).await
	}

	async fn can(&self, user: UserId, task: ResourceId, permission: &str) -> bool {
		self
			.service
			.check_resource_permission(user, self.org_id, ResourceType::Task, task, permission)
			.await
	}
}

fn task_editor() -> PermissionPatch {
	PermissionPatch::new()
		.with(Permission::TasksView, true)
		.with(Permission::TasksEdit, true)
}

#[tokio::test]
async fn test_seeding_twice_leaves_four_roles_and_three_templates() {
	let org = TestOrg::new().await;

	let again = org
		.service
		.initialize_organization(org.org_id, None)
		.await
		.unwrap();
	assert_eq!(again, SeedOutcome::default());

	let roles = org.service.get_organization_roles(org.org_id).await.unwrap();
	assert_eq!(roles.len(), 4);
	assert!(roles.iter().all(|r| r.is_system_role));

	let templates = org
		.service
		.get_permission_templates(org.org_id)
		.await
		.unwrap();
	assert_eq!(templates.len(), 3);
}

#[tokio::test]
async fn test_template_restricts_only_the_target_task() {
	let org = TestOrg::new().await;
	let role = org.role("Task Editor", task_editor()).await;
	let user = org.member(&role).await;
	let task = org.task().await;
	let other_task = org.task().await;

	let template = org
		.service
		.create_permission_template(
			org.org_id,
			CreateTemplateRequest {
				name: "No Editing".to_string(),
				description: None,
				permissions: PermissionPatch::new().with(Permission::TasksEdit, false),
				applicable_resource_types: vec![ResourceType::Task],
			},
			None,
		)
		.await
		.unwrap();

	org
		.service
		.apply_permission_template(org.org_id, template.id, ResourceType::Task, task)
		.await
		.unwrap();

	let role = org
		.service
		.get_custom_role_by_id(role.id, org.org_id)
		.await
		.unwrap();
	let entry = role.find_override(ResourceType::Task, task).unwrap();
	assert!(!entry.permissions.allows(Permission::TasksEdit));
	assert!(entry.permissions.allows(Permission::TasksView));

	assert!(!org.can(user, task, "tasks.edit").await);
	assert!(org.can(user, task, "tasks.view").await);
	assert!(org.can(user, other_task, "tasks.edit").await);
}

#[tokio::test]
async fn test_override_outlives_base_changes() {
	let org = TestOrg::new().await;
	let role = org.role("Task Editor", task_editor()).await;
	let user = org.member(&role).await;
	let task = org.task().await;

	org
		.service
		.set_resource_permission_override(
			role.id,
			org.org_id,
			ResourceType::Task,
			task,
			PermissionPatch::new().with(Permission::TasksView, true),
			None,
		)
		.await
		.unwrap();
	assert!(!org.can(user, task, "tasks.edit").await);
	assert!(org.can(user, task, "tasks.view").await);

	org
		.service
		.update_custom_role(
			role.id,
			org.org_id,
			UpdateRoleRequest {
				permissions: Some(
					PermissionPatch::new()
						.with(Permission::TasksView, false)
						.with(Permission::TasksDelete, true),
				),
				..Default::default()
			},
			None,
		)
		.await
		.unwrap();

	assert!(org.can(user, task, "tasks.view").await);
	assert!(!org.can(user, task, "tasks.delete").await);

	let removed = org
		.service
		.remove_resource_permission_override(role.id, org.org_id, ResourceType::Task, task)
		.await
		.unwrap();
	assert!(removed);
	assert!(!org.can(user, task, "tasks.view").await);
	assert!(org.can(user, task, "tasks.delete").await);
}

#[tokio::test]
async fn test_second_override_replaces_first() {
	let org = TestOrg::new().await;
	let role = org.role("Task Editor", task_editor()).await;
	let task = org.task().await;

	for patch in [
		PermissionPatch::new().with(Permission::TasksEdit, true),
		PermissionPatch::new().with(Permission::TasksAssign, true),
	] {
		org
			.service
			.set_resource_permission_override(
				role.id,
				org.org_id,
				ResourceType::Task,
				task,
				patch,
				None,
			)
			.await
			.unwrap();
	}

	let role = org
		.service
		.get_custom_role_by_id(role.id, org.org_id)
		.await
		.unwrap();
	assert_eq!(role.resource_overrides.len(), 1);
	let entry = &role.resource_overrides[0];
	assert!(entry.permissions.allows(Permission::TasksAssign));
	assert!(!entry.permissions.allows(Permission::TasksEdit));
}

#[tokio::test]
async fn test_role_in_use_needs_a_replacement() {
	let org = TestOrg::new().await;
	let doomed = org.role("Doomed", task_editor()).await;
	let replacement = org
		.service
		.create_custom_role(
			org.org_id,
			CreateRoleRequest::new("Successor").with_based_on(RoleArchetype::Guest),
			None,
		)
		.await
		.unwrap();

	let mut users = Vec::new();
	for _ in 0..3 {
		users.push(org.member(&doomed).await);
	}

	let err = org
		.service
		.delete_custom_role(doomed.id, org.org_id, None)
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Conflict);
	assert!(matches!(
		err,
		PermissionsServerError::RoleInUse {
			member_count: 3,
			..
		}
	));
	assert!(err.to_string().contains("3 member(s)"));

	let outcome = org
		.service
		.delete_custom_role(doomed.id, org.org_id, Some(replacement.id))
		.await
		.unwrap();
	assert_eq!(outcome.reassigned_members, 3);

	let repo = SqlitePermissionsRepository::new(org.pool.clone());
	for user in users {
		let membership = repo
			.get_membership(user, org.org_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(membership.custom_role_id, Some(replacement.id));
		assert_eq!(membership.role, PrimitiveRole::Viewer);
	}

	let gone = org
		.service
		.get_custom_role_by_id(doomed.id, org.org_id)
		.await
		.unwrap_err();
	assert_eq!(gone.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_invited_member_is_denied() {
	let org = TestOrg::new().await;
	let role = org.role("Task Editor", task_editor()).await;
	let task = org.task().await;
	let user = UserId::generate();
	insert_membership(
		&org.pool,
		org.org_id,
		user,
		PrimitiveRole::Member,
		Some(role.id),
		MembershipStatus::Invited,
	)
	.await;

	assert!(!org.can(user, task, "tasks.view").await);
}

#[tokio::test]
async fn test_roles_do_not_leak_across_organizations() {
	let org = TestOrg::new().await;
	let other = OrgId::generate();
	org.service.initialize_organization(other, None).await.unwrap();
	let role = org.role("Task Editor", task_editor()).await;

	// A membership in `other` pointing at a role owned by `org`.
	let user = insert_active_member(&org.pool, other, PrimitiveRole::Member, Some(role.id)).await;
	let task = insert_resource(&org.pool, ResourceType::Task, other).await;

	assert!(
		!org
			.service
			.check_resource_permission(user, other, ResourceType::Task, task, "tasks.view")
			.await
	);
}

fn permission_string() -> impl Strategy<Value = String> {
	prop_oneof![
		prop::sample::select(Permission::all().to_vec())
			.prop_map(|p| p.to_string()),
		"[a-z]{0,8}(\\.[a-zA-Z]{0,8})?",
	]
}

fn resource_type() -> impl Strategy<Value = ResourceType> {
	prop::sample::select(ResourceType::all().to_vec())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(16))]

	#[test]
	fn admin_is_always_allowed(
		permissions in prop::collection::vec(permission_string(), 1..8),
		resource_type in resource_type(),
	) {
		tokio_test::block_on(async {
			let org = TestOrg::new().await;
			let admin =
				insert_active_member(&org.pool, org.org_id, PrimitiveRole::Admin, None).await;

			for permission in &permissions {
				let allowed = org
					.service
					.check_resource_permission(
						admin,
						org.org_id,
						resource_type,
						ResourceId::generate(),
						permission,
					)
					.await;
				assert!(allowed, "admin denied {permission}");
			}
		});
	}
}
