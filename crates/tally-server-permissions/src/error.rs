// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tally_permissions_core::{PermissionsError, RoleId};

/// Stable classification of [`PermissionsServerError`].
///
/// Request handlers map on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	NotFound,
	Conflict,
	Validation,
	Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum PermissionsServerError {
	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Role {role_id} is assigned to {member_count} member(s); provide a replacement role")]
	RoleInUse { role_id: RoleId, member_count: i64 },

	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Internal: {0}")]
	Internal(String),
}

impl PermissionsServerError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			PermissionsServerError::NotFound(_) => ErrorKind::NotFound,
			PermissionsServerError::Conflict(_) | PermissionsServerError::RoleInUse { .. } => {
				ErrorKind::Conflict
			}
			PermissionsServerError::Validation(_) => ErrorKind::Validation,
			PermissionsServerError::Database(_)
			| PermissionsServerError::Serialization(_)
			| PermissionsServerError::Internal(_) => ErrorKind::Internal,
		}
	}

	/// Maps a unique-constraint violation to `Conflict`, everything else to `Database`.
	pub(crate) fn from_write(err: sqlx::Error, conflict: impl FnOnce() -> String) -> Self {
		let unique = matches!(
			&err,
			sqlx::Error::Database(db) if db.is_unique_violation()
		);
		if unique {
			PermissionsServerError::Conflict(conflict())
		} else {
			PermissionsServerError::Database(err)
		}
	}
}

impl From<PermissionsError> for PermissionsServerError {
	fn from(err: PermissionsError) -> Self {
		PermissionsServerError::Validation(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, PermissionsServerError>;
