// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource existence and ownership checks.
//!
//! Each resource type that can carry overrides has one [`ResourceValidator`],
//! registered in a [`ResourceRegistry`] when the service is built. Types
//! without a validator are rejected as invalid input.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use tally_permissions_core::{OrgId, ResourceId, ResourceType};

use crate::error::{PermissionsServerError, Result};

/// Confirms that a resource exists and belongs to an organization.
#[async_trait]
pub trait ResourceValidator: Send + Sync {
	/// Returns true if `resource_id` exists and is owned by `org_id`.
	async fn exists_in_org(&self, org_id: OrgId, resource_id: ResourceId) -> Result<bool>;
}

/// Validator backed by one SQLite table with `id` and `org_id` columns.
#[derive(Clone)]
pub struct SqliteResourceValidator {
	pool: SqlitePool,
	query: &'static str,
}

impl SqliteResourceValidator {
	pub fn projects(pool: SqlitePool) -> Self {
		Self {
			pool,
			query: "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ? AND org_id = ?)",
		}
	}

	pub fn teams(pool: SqlitePool) -> Self {
		Self {
			pool,
			query: "SELECT EXISTS(SELECT 1 FROM teams WHERE id = ? AND org_id = ?)",
		}
	}

	pub fn tasks(pool: SqlitePool) -> Self {
		Self {
			pool,
			query: "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ? AND org_id = ?)",
		}
	}
}

#[async_trait]
impl ResourceValidator for SqliteResourceValidator {
	#[instrument(skip(self), fields(org_id = %org_id, resource_id = %resource_id))]
	async fn exists_in_org(&self, org_id: OrgId, resource_id: ResourceId) -> Result<bool> {
		let (exists,): (i64,) = sqlx::query_as(self.query)
			.bind(resource_id.to_string())
			.bind(org_id.to_string())
			.fetch_one(&self.pool)
			.await?;
		Ok(exists != 0)
	}
}

/// Fixed mapping from resource type to validator.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
	validators: HashMap<ResourceType, Arc<dyn ResourceValidator>>,
}

impl ResourceRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry with the SQLite validators for projects, teams and tasks.
	pub fn sqlite(pool: SqlitePool) -> Self {
		Self::new()
			.with(
				ResourceType::Project,
				Arc::new(SqliteResourceValidator::projects(pool.clone())),
			)
			.with(
				ResourceType::Team,
				Arc::new(SqliteResourceValidator::teams(pool.clone())),
			)
			.with(
				ResourceType::Task,
				Arc::new(SqliteResourceValidator::tasks(pool)),
			)
	}

	pub fn with(mut self, resource_type: ResourceType, validator: Arc<dyn ResourceValidator>) -> Self {
		self.validators.insert(resource_type, validator);
		self
	}

	/// Fails with `Validation` for a type without a validator and `NotFound`
	/// for a resource that is missing or owned by another organization.
	#[instrument(skip(self), fields(org_id = %org_id, resource_type = %resource_type, resource_id = %resource_id))]
	pub async fn validate(
		&self,
		org_id: OrgId,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Result<()> {
		let validator = self.validators.get(&resource_type).ok_or_else(|| {
			PermissionsServerError::Validation(format!(
				"resource type '{resource_type}' cannot be validated"
			))
		})?;

		if validator.exists_in_org(org_id, resource_id).await? {
			Ok(())
		} else {
			Err(PermissionsServerError::NotFound(format!(
				"{resource_type} {resource_id}"
			)))
		}
	}
}
