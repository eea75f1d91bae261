// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Tally authorization engine.
//!
//! This crate holds everything about permissions that does not touch storage:
//!
//! - [`Permission`] / [`Category`]: the closed, compile-time permission schema
//! - [`PermissionMatrix`]: a complete set of grants, one boolean per permission
//! - [`PermissionPatch`]: a partial set of grants (role updates, template masks)
//! - [`Role`], [`ResourceOverride`], [`PermissionTemplate`], [`Membership`]
//! - [`calculate_effective`]: the restriction-only template merge
//! - [`evaluate`]: the pure decision function behind every permission check
//!
//! It is used by the server-side store and service (`tally-server-permissions`).
//!
//! # Example
//!
//! ```
//! use tally_permissions_core::{
//!     calculate_effective, Permission, PermissionMatrix, PermissionPatch, RoleArchetype,
//! };
//!
//! let role = PermissionMatrix::none().with(Permission::TasksEdit, true);
//! let template = PermissionPatch::new().with(Permission::TasksEdit, false);
//!
//! let effective = calculate_effective(&role, &template, RoleArchetype::Member);
//! assert!(!effective.allows_str("tasks.edit"));
//! assert!(role.allows_str("tasks.edit"));
//! ```

pub mod decision;
pub mod defaults;
pub mod effective;
pub mod error;
pub mod ids;
pub mod matrix;
pub mod membership;
pub mod role;
pub mod schema;
pub mod template;

pub use decision::{evaluate, Decision, DecisionReason};
pub use defaults::{
	default_roles, default_templates, primitive_role_permissions, DefaultRole, DefaultTemplate,
};
pub use effective::calculate_effective;
pub use error::{PermissionsError, Result};
pub use ids::{OrgId, ResourceId, RoleId, TemplateId, UserId};
pub use matrix::{PermissionMatrix, PermissionPatch};
pub use membership::{Membership, MembershipStatus, PrimitiveRole};
pub use role::{ResourceOverride, ResourceType, Role, RoleArchetype};
pub use schema::{Category, Permission};
pub use template::PermissionTemplate;

/// Maximum length of a role or template name.
pub const MAX_NAME_LEN: usize = 100;

/// Validates a role or template name.
///
/// Names must be non-empty after trimming and at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> bool {
	let trimmed = name.trim();
	!trimmed.is_empty() && trimmed.chars().count() <= MAX_NAME_LEN
}
