// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The pure decision function behind every permission check.
//!
//! Resolution order:
//!
//! 1. No active membership: deny.
//! 2. Primitive role `admin`: allow, whatever the permission string.
//! 3. Unparseable permission string: deny.
//! 4. No custom role: the primitive role's built-in matrix.
//! 5. Custom role with an override for the resource: the override matrix only.
//! 6. Custom role otherwise: the role's base matrix.
//!
//! Every failure resolves to a deny.

use serde::Serialize;
use std::str::FromStr;

use crate::defaults::primitive_role_permissions;
use crate::ids::ResourceId;
use crate::membership::Membership;
use crate::role::{ResourceType, Role};
use crate::schema::Permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
	NoActiveMembership,
	AdminBypass,
	InvalidPermission,
	PrimitiveDefault,
	ResourceOverride,
	RoleBase,
	/// The membership references a custom role that does not exist in its
	/// organization.
	MissingCustomRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
	pub allowed: bool,
	pub reason: DecisionReason,
}

impl Decision {
	fn allow(reason: DecisionReason) -> Self {
		Self {
			allowed: true,
			reason,
		}
	}

	fn deny(reason: DecisionReason) -> Self {
		Self {
			allowed: false,
			reason,
		}
	}

	fn lookup(allowed: bool, reason: DecisionReason) -> Self {
		Self { allowed, reason }
	}
}

/// Decides whether `membership` grants `permission`, optionally on a specific
/// resource.
///
/// `custom_role` is the role referenced by `membership.custom_role_id`, if the
/// caller could load it.
pub fn evaluate(
	membership: Option<&Membership>,
	custom_role: Option<&Role>,
	resource: Option<(ResourceType, ResourceId)>,
	permission: &str,
) -> Decision {
	let membership = match membership {
		Some(m) if m.is_active() => m,
		_ => return Decision::deny(DecisionReason::NoActiveMembership),
	};

	if membership.is_admin() {
		return Decision::allow(DecisionReason::AdminBypass);
	}

	let permission = match Permission::from_str(permission) {
		Ok(p) => p,
		Err(_) => return Decision::deny(DecisionReason::InvalidPermission),
	};

	let Some(role_id) = membership.custom_role_id else {
		let matrix = primitive_role_permissions(membership.role);
		return Decision::lookup(matrix.allows(permission), DecisionReason::PrimitiveDefault);
	};

	let role = match custom_role {
		Some(role) if role.id == role_id && role.org_id == membership.org_id => role,
		_ => return Decision::deny(DecisionReason::MissingCustomRole),
	};

	match resource.and_then(|(resource_type, resource_id)| role.find_override(resource_type, resource_id)) {
		Some(entry) => Decision::lookup(
			entry.permissions.allows(permission),
			DecisionReason::ResourceOverride,
		),
		None => Decision::lookup(role.permissions.allows(permission), DecisionReason::RoleBase),
	}
}
