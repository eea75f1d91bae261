// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inputs and outputs of the lifecycle operations.

use serde::{Deserialize, Serialize};

use tally_permissions_core::{PermissionPatch, ResourceType, RoleArchetype};

fn default_archetype() -> RoleArchetype {
	RoleArchetype::Custom
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default = "default_archetype")]
	pub based_on: RoleArchetype,
	/// Merged over the per-category defaults.
	#[serde(default)]
	pub permissions: PermissionPatch,
}

impl CreateRoleRequest {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: None,
			based_on: default_archetype(),
			permissions: PermissionPatch::new(),
		}
	}

	pub fn with_permissions(mut self, permissions: PermissionPatch) -> Self {
		self.permissions = permissions;
		self
	}

	pub fn with_based_on(mut self, based_on: RoleArchetype) -> Self {
		self.based_on = based_on;
		self
	}
}

/// Absent fields are left unchanged; `permissions` is merged, not replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub based_on: Option<RoleArchetype>,
	#[serde(default)]
	pub permissions: Option<PermissionPatch>,
	/// When set, the update fails with a conflict unless the stored role is
	/// still at this version.
	#[serde(default)]
	pub expected_version: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub permissions: PermissionPatch,
	#[serde(default)]
	pub applicable_resource_types: Vec<ResourceType>,
}

/// Absent fields are left unchanged; `permissions` is merged, not replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub permissions: Option<PermissionPatch>,
	#[serde(default)]
	pub applicable_resource_types: Option<Vec<ResourceType>>,
}

/// Result of seeding an organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOutcome {
	pub roles_created: usize,
	pub templates_created: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoleOutcome {
	pub reassigned_members: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTemplateOutcome {
	pub roles_updated: usize,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use tally_permissions_core::Permission;

	#[test]
	fn test_create_role_request_defaults() {
		let req: CreateRoleRequest = serde_json::from_value(json!({ "name": "Crew" })).unwrap();
		assert_eq!(req.based_on, RoleArchetype::Custom);
		assert!(req.permissions.is_empty());
	}

	#[test]
	fn test_create_role_request_rejects_unknown_permission() {
		let result: Result<CreateRoleRequest, _> = serde_json::from_value(json!({
			"name": "Crew",
			"permissions": { "tasks": { "teleport": true } }
		}));
		assert!(result.is_err());
	}

	#[test]
	fn test_update_role_request_parses_patch() {
		let req: UpdateRoleRequest = serde_json::from_value(json!({
			"permissions": { "projects": { "create": false } },
			"expectedVersion": 4
		}))
		.unwrap();
		let patch = req.permissions.unwrap();
		assert_eq!(patch.get(Permission::ProjectsCreate), Some(false));
		assert_eq!(patch.get(Permission::ProjectsView), None);
		assert_eq!(req.expected_version, Some(4));
	}

	#[test]
	fn test_template_request_types() {
		let req: CreateTemplateRequest = serde_json::from_value(json!({
			"name": "Locked",
			"applicableResourceTypes": ["task", "note"]
		}))
		.unwrap();
		assert_eq!(
			req.applicable_resource_types,
			vec![ResourceType::Task, ResourceType::Note]
		);

		let bad: Result<CreateTemplateRequest, _> = serde_json::from_value(json!({
			"name": "Locked",
			"applicableResourceTypes": ["folder"]
		}));
		assert!(bad.is_err());
	}
}
