// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in roles, templates and primitive-role matrices.
//!
//! Every organization is seeded with four system roles (Administrator,
//! Manager, Member, Guest) and three default templates (Full Access, Edit
//! Access, View Only). Members without a custom role are checked against
//! [`primitive_role_permissions`].

use crate::matrix::{PermissionMatrix, PermissionPatch};
use crate::membership::PrimitiveRole;
use crate::role::{ResourceType, RoleArchetype};
use crate::schema::Permission;

/// A system role created for every organization.
#[derive(Debug, Clone)]
pub struct DefaultRole {
	pub name: &'static str,
	pub description: &'static str,
	pub based_on: RoleArchetype,
	pub permissions: PermissionMatrix,
}

/// A default template created for every organization.
#[derive(Debug, Clone)]
pub struct DefaultTemplate {
	pub name: &'static str,
	pub description: &'static str,
	pub permissions: PermissionPatch,
	pub applicable_resource_types: Vec<ResourceType>,
}

const MANAGER_EXCLUDED: [Permission; 3] = [
	Permission::OrganizationDelete,
	Permission::OrganizationManageRoles,
	Permission::OrganizationManageBilling,
];

const MEMBER_GRANTS: [Permission; 15] = [
	Permission::OrganizationView,
	Permission::ProjectsView,
	Permission::TeamsView,
	Permission::TasksCreate,
	Permission::TasksView,
	Permission::TasksEdit,
	Permission::TasksChangeStatus,
	Permission::TimeTrackingTrack,
	Permission::TimeTrackingViewOwn,
	Permission::TimeTrackingEdit,
	Permission::ReportsView,
	Permission::CommentsCreate,
	Permission::CommentsView,
	Permission::CommentsEdit,
	Permission::CustomFieldsView,
];

const GUEST_GRANTS: [Permission; 4] = [
	Permission::OrganizationView,
	Permission::ProjectsView,
	Permission::TasksView,
	Permission::CommentsView,
];

const VIEWER_GRANTS: [Permission; 8] = [
	Permission::OrganizationView,
	Permission::ProjectsView,
	Permission::TeamsView,
	Permission::TasksView,
	Permission::CommentsView,
	Permission::TimeTrackingViewOwn,
	Permission::ReportsView,
	Permission::CustomFieldsView,
];

// Actions the Edit Access template takes away.
const EDIT_ACCESS_DENIED_ACTIONS: [&str; 8] = [
	"delete",
	"manageMembers",
	"manageTeams",
	"manageRoles",
	"manageBilling",
	"moderate",
	"approve",
	"manage",
];

fn manager_permissions() -> PermissionMatrix {
	PermissionMatrix::from_permissions(
		Permission::all()
			.iter()
			.copied()
			.filter(|p| !MANAGER_EXCLUDED.contains(p)),
	)
}

/// The four seeded system roles.
pub fn default_roles() -> Vec<DefaultRole> {
	vec![
		DefaultRole {
			name: "Administrator",
			description: "Full access to everything in the organization",
			based_on: RoleArchetype::Admin,
			permissions: PermissionMatrix::all(),
		},
		DefaultRole {
			name: "Manager",
			description: "Manages projects, teams and tasks; cannot delete the organization or manage billing and roles",
			based_on: RoleArchetype::Manager,
			permissions: manager_permissions(),
		},
		DefaultRole {
			name: "Member",
			description: "Works on tasks, tracks time and comments",
			based_on: RoleArchetype::Member,
			permissions: PermissionMatrix::from_permissions(MEMBER_GRANTS),
		},
		DefaultRole {
			name: "Guest",
			description: "Read-only access to projects, tasks and comments",
			based_on: RoleArchetype::Guest,
			permissions: PermissionMatrix::from_permissions(GUEST_GRANTS),
		},
	]
}

/// The three seeded templates.
pub fn default_templates() -> Vec<DefaultTemplate> {
	vec![
		DefaultTemplate {
			name: "Full Access",
			description: "Leaves every role's permissions unchanged",
			permissions: PermissionPatch::new(),
			applicable_resource_types: Vec::new(),
		},
		DefaultTemplate {
			name: "Edit Access",
			description: "Allows viewing and editing but no deletion or management",
			permissions: PermissionPatch::denying(
				Permission::all()
					.iter()
					.copied()
					.filter(|p| EDIT_ACCESS_DENIED_ACTIONS.contains(&p.action())),
			),
			applicable_resource_types: vec![
				ResourceType::Project,
				ResourceType::Team,
				ResourceType::Task,
			],
		},
		DefaultTemplate {
			name: "View Only",
			description: "Restricts every role to viewing",
			permissions: PermissionPatch::denying(
				Permission::all()
					.iter()
					.copied()
					.filter(|p| !p.action().starts_with("view")),
			),
			applicable_resource_types: Vec::new(),
		},
	]
}

/// Matrix used for members that have no custom role.
pub fn primitive_role_permissions(role: PrimitiveRole) -> PermissionMatrix {
	match role {
		PrimitiveRole::Admin => PermissionMatrix::all(),
		PrimitiveRole::Member => PermissionMatrix::from_permissions(MEMBER_GRANTS),
		PrimitiveRole::Viewer => PermissionMatrix::from_permissions(VIEWER_GRANTS),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::effective::calculate_effective;
	use std::collections::HashSet;

	#[test]
	fn test_four_uniquely_named_roles() {
		let roles = default_roles();
		assert_eq!(roles.len(), 4);
		let names: HashSet<_> = roles.iter().map(|r| r.name).collect();
		assert_eq!(names.len(), 4);
	}

	#[test]
	fn test_three_uniquely_named_templates() {
		let templates = default_templates();
		assert_eq!(templates.len(), 3);
		let names: HashSet<_> = templates.iter().map(|t| t.name).collect();
		assert_eq!(names.len(), 3);
	}

	#[test]
	fn test_role_hierarchy_is_nested() {
		let roles = default_roles();
		for pair in roles.windows(2) {
			assert!(
				pair[1].permissions.is_subset_of(&pair[0].permissions),
				"{} grants more than {}",
				pair[1].name,
				pair[0].name
			);
		}
	}

	#[test]
	fn test_manager_cannot_manage_billing() {
		let manager = manager_permissions();
		assert!(!manager.allows(Permission::OrganizationManageBilling));
		assert!(!manager.allows(Permission::OrganizationDelete));
		assert!(manager.allows(Permission::ProjectsManageTeams));
	}

	#[test]
	fn test_view_only_keeps_view_actions() {
		let view_only = default_templates()
			.into_iter()
			.find(|t| t.name == "View Only")
			.unwrap();
		let effective = calculate_effective(
			&PermissionMatrix::all(),
			&view_only.permissions,
			RoleArchetype::Manager,
		);
		assert!(effective.allows(Permission::TasksView));
		assert!(effective.allows(Permission::TimeTrackingViewAll));
		assert!(effective.allows(Permission::ReportsViewFinancial));
		assert!(!effective.allows(Permission::TasksEdit));
		assert!(!effective.allows(Permission::ProjectsCreate));
	}

	#[test]
	fn test_edit_access_denies_deletion() {
		let edit = default_templates()
			.into_iter()
			.find(|t| t.name == "Edit Access")
			.unwrap();
		assert_eq!(edit.permissions.get(Permission::TasksDelete), Some(false));
		assert_eq!(edit.permissions.get(Permission::IntegrationsManage), Some(false));
		assert_eq!(edit.permissions.get(Permission::TasksEdit), None);
		assert!(!edit.applicable_resource_types.contains(&ResourceType::Note));
	}

	#[test]
	fn test_primitive_defaults() {
		assert_eq!(
			primitive_role_permissions(PrimitiveRole::Admin),
			PermissionMatrix::all()
		);
		let viewer = primitive_role_permissions(PrimitiveRole::Viewer);
		assert!(viewer.allows(Permission::TasksView));
		assert!(!viewer.allows(Permission::TasksEdit));
		assert!(viewer.is_subset_of(&primitive_role_permissions(PrimitiveRole::Member)));
		let member = primitive_role_permissions(PrimitiveRole::Member);
		assert!(member.allows(Permission::TasksEdit));
		assert!(!member.allows(Permission::TasksDelete));
	}
}
