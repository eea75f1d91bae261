// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised while parsing permission data.
///
/// These never reach a permission check as an error: the decision path turns
/// every one of them into a deny.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionsError {
	#[error("malformed permission string '{0}': expected 'category.action'")]
	MalformedPermission(String),

	#[error("unknown permission category '{0}'")]
	UnknownCategory(String),

	#[error("unknown action '{action}' for category '{category}'")]
	UnknownAction { category: String, action: String },

	#[error("unknown resource type '{0}'")]
	UnknownResourceType(String),

	#[error("unknown role archetype '{0}'")]
	UnknownArchetype(String),

	#[error("unknown membership role '{0}'")]
	UnknownPrimitiveRole(String),

	#[error("unknown membership status '{0}'")]
	UnknownMembershipStatus(String),
}

pub type Result<T> = std::result::Result<T, PermissionsError>;
