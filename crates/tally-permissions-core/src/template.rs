// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, TemplateId, UserId};
use crate::matrix::PermissionPatch;
use crate::role::ResourceType;

/// A named restriction mask that can be applied to a resource.
///
/// An explicit `false` in `permissions` forces a deny; `true` or an absent
/// entry leaves the role's grant unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionTemplate {
	pub id: TemplateId,
	pub org_id: OrgId,
	pub name: String,
	pub description: Option<String>,
	/// Seeded templates cannot be deleted.
	pub is_default: bool,
	pub permissions: PermissionPatch,
	/// Empty means applicable to every resource type.
	pub applicable_resource_types: Vec<ResourceType>,
	pub created_by: Option<UserId>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl PermissionTemplate {
	pub fn applies_to(&self, resource_type: ResourceType) -> bool {
		self.applicable_resource_types.is_empty()
			|| self.applicable_resource_types.contains(&resource_type)
	}
}
