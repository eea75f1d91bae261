// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PermissionsError;
use crate::ids::{OrgId, RoleId, UserId};

/// Coarse, non-configurable membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveRole {
	Admin,
	Member,
	Viewer,
}

impl PrimitiveRole {
	pub fn as_str(&self) -> &'static str {
		match self {
			PrimitiveRole::Admin => "admin",
			PrimitiveRole::Member => "member",
			PrimitiveRole::Viewer => "viewer",
		}
	}
}

impl fmt::Display for PrimitiveRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PrimitiveRole {
	type Err = PermissionsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(PrimitiveRole::Admin),
			"member" => Ok(PrimitiveRole::Member),
			"viewer" => Ok(PrimitiveRole::Viewer),
			_ => Err(PermissionsError::UnknownPrimitiveRole(s.to_string())),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
	Active,
	Invited,
	Suspended,
}

impl MembershipStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			MembershipStatus::Active => "active",
			MembershipStatus::Invited => "invited",
			MembershipStatus::Suspended => "suspended",
		}
	}
}

impl fmt::Display for MembershipStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for MembershipStatus {
	type Err = PermissionsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(MembershipStatus::Active),
			"invited" => Ok(MembershipStatus::Invited),
			"suspended" => Ok(MembershipStatus::Suspended),
			_ => Err(PermissionsError::UnknownMembershipStatus(s.to_string())),
		}
	}
}

/// A user's membership in an organization.
///
/// Owned by the organization service; this engine reads it and only ever
/// writes the role-assignment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
	pub user_id: UserId,
	pub org_id: OrgId,
	pub role: PrimitiveRole,
	pub custom_role_id: Option<RoleId>,
	pub status: MembershipStatus,
}

impl Membership {
	pub fn is_active(&self) -> bool {
		self.status == MembershipStatus::Active
	}

	pub fn is_admin(&self) -> bool {
		self.role == PrimitiveRole::Admin
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_primitive_role_parse() {
		assert_eq!(PrimitiveRole::from_str("viewer").unwrap(), PrimitiveRole::Viewer);
		assert!(matches!(
			PrimitiveRole::from_str("owner"),
			Err(PermissionsError::UnknownPrimitiveRole(_))
		));
	}

	#[test]
	fn test_status_parse() {
		for status in [
			MembershipStatus::Active,
			MembershipStatus::Invited,
			MembershipStatus::Suspended,
		] {
			assert_eq!(MembershipStatus::from_str(status.as_str()).unwrap(), status);
		}
		assert!(MembershipStatus::from_str("ACTIVE").is_err());
	}

	#[test]
	fn test_only_active_memberships_are_active() {
		let mut membership = Membership {
			user_id: UserId::generate(),
			org_id: OrgId::generate(),
			role: PrimitiveRole::Member,
			custom_role_id: None,
			status: MembershipStatus::Invited,
		};
		assert!(!membership.is_active());
		membership.status = MembershipStatus::Active;
		assert!(membership.is_active());
	}
}
