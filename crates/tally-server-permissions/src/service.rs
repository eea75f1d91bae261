// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;

use tally_permissions_core::{validate_name, OrgId, UserId, MAX_NAME_LEN};

use crate::error::{PermissionsServerError, Result};
use crate::repository::{PermissionsRepository, SqlitePermissionsRepository};
use crate::requests::SeedOutcome;
use crate::resources::ResourceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionServiceOptions {
	/// Emit one `info` event per permission decision.
	pub log_decisions: bool,
	/// Seed system roles and default templates in `initialize_organization`.
	pub seed_on_initialize: bool,
}

impl Default for PermissionServiceOptions {
	fn default() -> Self {
		Self {
			log_decisions: false,
			seed_on_initialize: true,
		}
	}
}

/// Role and template lifecycle, resource overrides and permission checks.
///
/// The operations are split across `roles`, `templates`, `overrides` and
/// `checker`; this type only holds the collaborators.
#[derive(Clone)]
pub struct PermissionService {
	pub(crate) repo: Arc<dyn PermissionsRepository>,
	pub(crate) resources: ResourceRegistry,
	pub(crate) options: PermissionServiceOptions,
}

impl PermissionService {
	pub fn new(repo: Arc<dyn PermissionsRepository>, resources: ResourceRegistry) -> Self {
		Self {
			repo,
			resources,
			options: PermissionServiceOptions::default(),
		}
	}

	/// Service over SQLite for both the permission store and resource validation.
	pub fn sqlite(pool: SqlitePool) -> Self {
		Self::new(
			Arc::new(SqlitePermissionsRepository::new(pool.clone())),
			ResourceRegistry::sqlite(pool),
		)
	}

	pub fn with_options(mut self, options: PermissionServiceOptions) -> Self {
		self.options = options;
		self
	}

	/// Seeds the built-in roles and templates for a new organization.
	///
	/// Does nothing when `seed_on_initialize` is off.
	#[instrument(skip(self), fields(org_id = %org_id))]
	pub async fn initialize_organization(
		&self,
		org_id: OrgId,
		created_by: Option<UserId>,
	) -> Result<SeedOutcome> {
		if !self.options.seed_on_initialize {
			tracing::debug!("seeding disabled, skipping organization initialization");
			return Ok(SeedOutcome::default());
		}

		let roles_created = self.create_default_roles(org_id, created_by).await?;
		let templates_created = self.create_default_templates(org_id, created_by).await?;

		tracing::info!(roles_created, templates_created, "organization initialized");
		Ok(SeedOutcome {
			roles_created,
			templates_created,
		})
	}
}

/// Trims and checks a role or template name.
pub(crate) fn normalize_name(name: &str) -> Result<String> {
	if !validate_name(name) {
		return Err(PermissionsServerError::Validation(format!(
			"name must be 1-{MAX_NAME_LEN} characters"
		)));
	}
	Ok(name.trim().to_string())
}
