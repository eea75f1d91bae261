// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PermissionsError;
use crate::ids::{OrgId, ResourceId, RoleId, UserId};
use crate::matrix::PermissionMatrix;
use crate::membership::PrimitiveRole;

/// Kinds of resource a permission check or template can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
	Project,
	Team,
	Task,
	/// Accepted in a template's applicable types; has no validator and
	/// cannot carry overrides.
	Note,
}

impl ResourceType {
	pub fn all() -> &'static [ResourceType] {
		&[
			ResourceType::Project,
			ResourceType::Team,
			ResourceType::Task,
			ResourceType::Note,
		]
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::Project => "project",
			ResourceType::Team => "team",
			ResourceType::Task => "task",
			ResourceType::Note => "note",
		}
	}

	/// Whether per-resource overrides may be installed for this type.
	pub fn supports_overrides(&self) -> bool {
		!matches!(self, ResourceType::Note)
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceType {
	type Err = PermissionsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"project" => Ok(ResourceType::Project),
			"team" => Ok(ResourceType::Team),
			"task" => Ok(ResourceType::Task),
			"note" => Ok(ResourceType::Note),
			_ => Err(PermissionsError::UnknownResourceType(s.to_string())),
		}
	}
}

/// The archetype a role was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleArchetype {
	Admin,
	Manager,
	Member,
	Guest,
	Custom,
}

impl RoleArchetype {
	pub fn as_str(&self) -> &'static str {
		match self {
			RoleArchetype::Admin => "admin",
			RoleArchetype::Manager => "manager",
			RoleArchetype::Member => "member",
			RoleArchetype::Guest => "guest",
			RoleArchetype::Custom => "custom",
		}
	}

	/// Primitive membership role written when members are moved onto a role
	/// of this archetype.
	pub fn primitive_role(&self) -> PrimitiveRole {
		match self {
			RoleArchetype::Admin => PrimitiveRole::Admin,
			RoleArchetype::Manager | RoleArchetype::Member | RoleArchetype::Custom => {
				PrimitiveRole::Member
			}
			RoleArchetype::Guest => PrimitiveRole::Viewer,
		}
	}
}

impl fmt::Display for RoleArchetype {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for RoleArchetype {
	type Err = PermissionsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(RoleArchetype::Admin),
			"manager" => Ok(RoleArchetype::Manager),
			"member" => Ok(RoleArchetype::Member),
			"guest" => Ok(RoleArchetype::Guest),
			"custom" => Ok(RoleArchetype::Custom),
			_ => Err(PermissionsError::UnknownArchetype(s.to_string())),
		}
	}
}

/// A per-resource permission matrix attached to a role.
///
/// The matrix is used as-is during checks against the resource: it replaces
/// the role's base permissions, it is not merged with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOverride {
	pub resource_type: ResourceType,
	pub resource_id: ResourceId,
	pub permissions: PermissionMatrix,
}

impl ResourceOverride {
	pub fn matches(&self, resource_type: ResourceType, resource_id: ResourceId) -> bool {
		self.resource_type == resource_type && self.resource_id == resource_id
	}
}

/// A named permission matrix owned by one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
	pub id: RoleId,
	pub org_id: OrgId,
	pub name: String,
	pub description: Option<String>,
	/// Seeded roles; immutable through the lifecycle API.
	pub is_system_role: bool,
	pub based_on: RoleArchetype,
	pub permissions: PermissionMatrix,
	pub resource_overrides: Vec<ResourceOverride>,
	pub created_by: Option<UserId>,
	pub updated_by: Option<UserId>,
	/// Bumped on every write; used for optimistic concurrency.
	pub version: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Role {
	/// Creates a custom (non-system) role with no overrides.
	pub fn new_custom(
		org_id: OrgId,
		name: impl Into<String>,
		based_on: RoleArchetype,
		permissions: PermissionMatrix,
		created_by: Option<UserId>,
	) -> Self {
		let now = Utc::now();
		Self {
			id: RoleId::generate(),
			org_id,
			name: name.into(),
			description: None,
			is_system_role: false,
			based_on,
			permissions,
			resource_overrides: Vec::new(),
			created_by,
			updated_by: created_by,
			version: 1,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn find_override(
		&self,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Option<&ResourceOverride> {
		self
			.resource_overrides
			.iter()
			.find(|o| o.matches(resource_type, resource_id))
	}

	/// Inserts or replaces the override for the override's resource.
	///
	/// Returns true if an existing entry was replaced.
	pub fn upsert_override(&mut self, entry: ResourceOverride) -> bool {
		match self
			.resource_overrides
			.iter_mut()
			.find(|o| o.matches(entry.resource_type, entry.resource_id))
		{
			Some(existing) => {
				existing.permissions = entry.permissions;
				true
			}
			None => {
				self.resource_overrides.push(entry);
				false
			}
		}
	}

	/// Removes the override for a resource. Returns true if one was removed.
	pub fn remove_override(&mut self, resource_type: ResourceType, resource_id: ResourceId) -> bool {
		let before = self.resource_overrides.len();
		self
			.resource_overrides
			.retain(|o| !o.matches(resource_type, resource_id));
		self.resource_overrides.len() != before
	}

}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Permission;

	fn make_role() -> Role {
		Role::new_custom(
			OrgId::generate(),
			"Field Crew",
			RoleArchetype::Custom,
			PermissionMatrix::none().with(Permission::TasksEdit, true),
			None,
		)
	}

	#[test]
	fn test_resource_type_parse() {
		for resource_type in ResourceType::all() {
			assert_eq!(
				ResourceType::from_str(resource_type.as_str()).unwrap(),
				*resource_type
			);
		}
		assert!(matches!(
			ResourceType::from_str("Project"),
			Err(PermissionsError::UnknownResourceType(_))
		));
	}

	#[test]
	fn test_note_has_no_overrides() {
		assert!(!ResourceType::Note.supports_overrides());
		assert!(ResourceType::Task.supports_overrides());
	}

	#[test]
	fn test_archetype_primitive_mapping() {
		assert_eq!(RoleArchetype::Admin.primitive_role(), PrimitiveRole::Admin);
		assert_eq!(RoleArchetype::Manager.primitive_role(), PrimitiveRole::Member);
		assert_eq!(RoleArchetype::Member.primitive_role(), PrimitiveRole::Member);
		assert_eq!(RoleArchetype::Guest.primitive_role(), PrimitiveRole::Viewer);
		assert_eq!(RoleArchetype::Custom.primitive_role(), PrimitiveRole::Member);
	}

	#[test]
	fn test_new_custom_role() {
		let role = make_role();
		assert!(!role.is_system_role);
		assert!(role.resource_overrides.is_empty());
		assert_eq!(role.version, 1);
	}

	#[test]
	fn test_upsert_override_replaces_existing() {
		let mut role = make_role();
		let task = ResourceId::generate();

		let replaced = role.upsert_override(ResourceOverride {
			resource_type: ResourceType::Task,
			resource_id: task,
			permissions: PermissionMatrix::none(),
		});
		assert!(!replaced);

		let replaced = role.upsert_override(ResourceOverride {
			resource_type: ResourceType::Task,
			resource_id: task,
			permissions: PermissionMatrix::all(),
		});
		assert!(replaced);

		assert_eq!(role.resource_overrides.len(), 1);
		assert_eq!(role.resource_overrides[0].permissions, PermissionMatrix::all());
	}

	#[test]
	fn test_same_id_different_type_is_distinct() {
		let mut role = make_role();
		let id = ResourceId::generate();
		role.upsert_override(ResourceOverride {
			resource_type: ResourceType::Task,
			resource_id: id,
			permissions: PermissionMatrix::none(),
		});
		role.upsert_override(ResourceOverride {
			resource_type: ResourceType::Project,
			resource_id: id,
			permissions: PermissionMatrix::none(),
		});
		assert_eq!(role.resource_overrides.len(), 2);
	}

	#[test]
	fn test_remove_override() {
		let mut role = make_role();
		let task = ResourceId::generate();
		role.upsert_override(ResourceOverride {
			resource_type: ResourceType::Task,
			resource_id: task,
			permissions: PermissionMatrix::none(),
		});

		assert!(role.remove_override(ResourceType::Task, task));
		assert!(!role.remove_override(ResourceType::Task, task));
		assert!(role.resource_overrides.is_empty());
	}

	#[test]
	fn test_role_serializes_camel_case() {
		let role = make_role();
		let value = serde_json::to_value(&role).unwrap();
		assert_eq!(value["isSystemRole"], serde_json::json!(false));
		assert_eq!(value["basedOn"], serde_json::json!("custom"));
		assert_eq!(value["permissions"]["tasks"]["edit"], serde_json::json!(true));
	}
}
