// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;

use tally_permissions_core::{
	Membership, MembershipStatus, OrgId, PermissionMatrix, PermissionPatch, PermissionTemplate,
	PrimitiveRole, ResourceId, ResourceOverride, ResourceType, Role, RoleArchetype, RoleId,
	TemplateId, UserId,
};

use crate::error::{PermissionsServerError, Result};

/// Storage for roles, resource overrides, templates and the role-assignment
/// fields of memberships.
///
/// Every lookup is scoped by organization; a row belonging to another
/// organization is reported as absent.
#[async_trait]
pub trait PermissionsRepository: Send + Sync {
	// Role operations
	async fn create_role(&self, role: &Role) -> Result<()>;
	async fn get_role(&self, org_id: OrgId, id: RoleId) -> Result<Option<Role>>;
	async fn get_role_by_name(&self, org_id: OrgId, name: &str) -> Result<Option<Role>>;
	async fn list_roles(&self, org_id: OrgId) -> Result<Vec<Role>>;

	/// Writes the role's scalar fields and base permissions if the stored
	/// version still equals `expected_version`. Returns false on a version
	/// mismatch or a missing role.
	async fn update_role(&self, role: &Role, expected_version: i64) -> Result<bool>;

	/// Deletes a role and its overrides, unless a membership still references it.
	///
	/// Returns false if nothing was deleted.
	async fn delete_role(&self, org_id: OrgId, id: RoleId) -> Result<bool>;

	// Resource override operations
	async fn upsert_override(&self, role_id: RoleId, entry: &ResourceOverride) -> Result<()>;
	async fn remove_override(
		&self,
		role_id: RoleId,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Result<bool>;

	/// Upserts many overrides in a single transaction.
	async fn upsert_overrides(&self, entries: &[(RoleId, ResourceOverride)]) -> Result<()>;

	// Template operations
	async fn create_template(&self, template: &PermissionTemplate) -> Result<()>;
	async fn get_template(&self, org_id: OrgId, id: TemplateId) -> Result<Option<PermissionTemplate>>;
	async fn get_template_by_name(
		&self,
		org_id: OrgId,
		name: &str,
	) -> Result<Option<PermissionTemplate>>;
	async fn list_templates(&self, org_id: OrgId) -> Result<Vec<PermissionTemplate>>;
	async fn update_template(&self, template: &PermissionTemplate) -> Result<bool>;

	/// Deletes a non-default template. Returns false if nothing was deleted.
	async fn delete_template(&self, org_id: OrgId, id: TemplateId) -> Result<bool>;

	// Membership operations
	async fn get_membership(&self, user_id: UserId, org_id: OrgId) -> Result<Option<Membership>>;
	async fn count_members_with_role(&self, org_id: OrgId, role_id: RoleId) -> Result<i64>;

	/// Moves every membership referencing `role_id` onto `replacement`, then
	/// deletes the role and its overrides, all in one transaction.
	///
	/// Returns the number of memberships moved.
	async fn reassign_members_and_delete_role(
		&self,
		org_id: OrgId,
		role_id: RoleId,
		replacement: &Role,
	) -> Result<u64>;
}

/// SQLite implementation of the permissions repository.
#[derive(Clone)]
pub struct SqlitePermissionsRepository {
	pool: SqlitePool,
}

impl SqlitePermissionsRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl PermissionsRepository for SqlitePermissionsRepository {
	// Role operations

	#[instrument(skip(self, role), fields(role_id = %role.id, org_id = %role.org_id))]
	async fn create_role(&self, role: &Role) -> Result<()> {
		let permissions_json = serde_json::to_string(&role.permissions)?;

		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO roles (id, org_id, name, description, is_system_role, based_on, permissions,
							   created_by, updated_by, version, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(role.id.to_string())
		.bind(role.org_id.to_string())
		.bind(&role.name)
		.bind(&role.description)
		.bind(role.is_system_role)
		.bind(role.based_on.as_str())
		.bind(permissions_json)
		.bind(role.created_by.map(|id| id.to_string()))
		.bind(role.updated_by.map(|id| id.to_string()))
		.bind(role.version)
		.bind(role.created_at.to_rfc3339())
		.bind(role.updated_at.to_rfc3339())
		.execute(&mut *tx)
		.await
		.map_err(|e| {
			PermissionsServerError::from_write(e, || {
				format!("a role named '{}' already exists", role.name)
			})
		})?;

		for entry in &role.resource_overrides {
			write_override(&mut tx, role.id, entry).await?;
		}

		tx.commit().await?;
		Ok(())
	}

	#[instrument(skip(self), fields(org_id = %org_id, role_id = %id))]
	async fn get_role(&self, org_id: OrgId, id: RoleId) -> Result<Option<Role>> {
		let row = sqlx::query_as::<_, RoleRow>(
			r#"
			SELECT id, org_id, name, description, is_system_role, based_on, permissions,
				   created_by, updated_by, version, created_at, updated_at
			FROM roles
			WHERE id = ? AND org_id = ?
			"#,
		)
		.bind(id.to_string())
		.bind(org_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let overrides = self.get_role_overrides(id).await?;
				Ok(Some(row.into_role(overrides)?))
			}
			None => Ok(None),
		}
	}

	#[instrument(skip(self), fields(org_id = %org_id, name = %name))]
	async fn get_role_by_name(&self, org_id: OrgId, name: &str) -> Result<Option<Role>> {
		let row = sqlx::query_as::<_, RoleRow>(
			r#"
			SELECT id, org_id, name, description, is_system_role, based_on, permissions,
				   created_by, updated_by, version, created_at, updated_at
			FROM roles
			WHERE org_id = ? AND name = ?
			"#,
		)
		.bind(org_id.to_string())
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let id: RoleId = parse_id(&row.id, "role ID")?;
				let overrides = self.get_role_overrides(id).await?;
				Ok(Some(row.into_role(overrides)?))
			}
			None => Ok(None),
		}
	}

	#[instrument(skip(self), fields(org_id = %org_id))]
	async fn list_roles(&self, org_id: OrgId) -> Result<Vec<Role>> {
		let rows = sqlx::query_as::<_, RoleRow>(
			r#"
			SELECT id, org_id, name, description, is_system_role, based_on, permissions,
				   created_by, updated_by, version, created_at, updated_at
			FROM roles
			WHERE org_id = ?
			ORDER BY is_system_role DESC, created_at ASC, name ASC
			"#,
		)
		.bind(org_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let override_rows = sqlx::query_as::<_, OverrideRow>(
			r#"
			SELECT o.role_id, o.resource_type, o.resource_id, o.permissions
			FROM role_resource_overrides o
			JOIN roles r ON r.id = o.role_id
			WHERE r.org_id = ?
			ORDER BY o.updated_at ASC
			"#,
		)
		.bind(org_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let mut overrides: HashMap<String, Vec<ResourceOverride>> = HashMap::new();
		for row in override_rows {
			let role_id = row.role_id.clone();
			overrides
				.entry(role_id)
				.or_default()
				.push(row.into_override()?);
		}

		rows
			.into_iter()
			.map(|row| {
				let entries = overrides.remove(&row.id).unwrap_or_default();
				row.into_role(entries)
			})
			.collect()
	}

	#[instrument(skip(self, role), fields(role_id = %role.id))]
	async fn update_role(&self, role: &Role, expected_version: i64) -> Result<bool> {
		let permissions_json = serde_json::to_string(&role.permissions)?;

		let result = sqlx::query(
			r#"
			UPDATE roles
			SET name = ?, description = ?, based_on = ?, permissions = ?, updated_by = ?,
				version = version + 1, updated_at = ?
			WHERE id = ? AND org_id = ? AND version = ?
			"#,
		)
		.bind(&role.name)
		.bind(&role.description)
		.bind(role.based_on.as_str())
		.bind(permissions_json)
		.bind(role.updated_by.map(|id| id.to_string()))
		.bind(role.updated_at.to_rfc3339())
		.bind(role.id.to_string())
		.bind(role.org_id.to_string())
		.bind(expected_version)
		.execute(&self.pool)
		.await
		.map_err(|e| {
			PermissionsServerError::from_write(e, || {
				format!("a role named '{}' already exists", role.name)
			})
		})?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self), fields(org_id = %org_id, role_id = %id))]
	async fn delete_role(&self, org_id: OrgId, id: RoleId) -> Result<bool> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			DELETE FROM roles
			WHERE id = ? AND org_id = ?
			  AND NOT EXISTS (
				SELECT 1 FROM org_memberships WHERE org_id = ? AND custom_role_id = ?
			  )
			"#,
		)
		.bind(id.to_string())
		.bind(org_id.to_string())
		.bind(org_id.to_string())
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			tx.rollback().await?;
			return Ok(false);
		}

		sqlx::query("DELETE FROM role_resource_overrides WHERE role_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(true)
	}

	// Resource override operations

	#[instrument(
		skip(self, entry),
		fields(role_id = %role_id, resource_type = %entry.resource_type, resource_id = %entry.resource_id)
	)]
	async fn upsert_override(&self, role_id: RoleId, entry: &ResourceOverride) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		write_override(&mut tx, role_id, entry).await?;
		tx.commit().await?;
		Ok(())
	}

	#[instrument(skip(self), fields(role_id = %role_id, resource_type = %resource_type, resource_id = %resource_id))]
	async fn remove_override(
		&self,
		role_id: RoleId,
		resource_type: ResourceType,
		resource_id: ResourceId,
	) -> Result<bool> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			DELETE FROM role_resource_overrides
			WHERE role_id = ? AND resource_type = ? AND resource_id = ?
			"#,
		)
		.bind(role_id.to_string())
		.bind(resource_type.as_str())
		.bind(resource_id.to_string())
		.execute(&mut *tx)
		.await?;

		let removed = result.rows_affected() > 0;
		if removed {
			touch_role(&mut tx, role_id).await?;
		}

		tx.commit().await?;
		Ok(removed)
	}

	#[instrument(skip(self, entries), fields(count = entries.len()))]
	async fn upsert_overrides(&self, entries: &[(RoleId, ResourceOverride)]) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		for (role_id, entry) in entries {
			write_override(&mut tx, *role_id, entry).await?;
		}
		tx.commit().await?;
		Ok(())
	}

	// Template operations

	#[instrument(skip(self, template), fields(template_id = %template.id, org_id = %template.org_id))]
	async fn create_template(&self, template: &PermissionTemplate) -> Result<()> {
		let permissions_json = serde_json::to_string(&template.permissions)?;
		let types_json = serde_json::to_string(&template.applicable_resource_types)?;

		sqlx::query(
			r#"
			INSERT INTO permission_templates (id, org_id, name, description, is_default, permissions,
											  applicable_resource_types, created_by, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(template.id.to_string())
		.bind(template.org_id.to_string())
		.bind(&template.name)
		.bind(&template.description)
		.bind(template.is_default)
		.bind(permissions_json)
		.bind(types_json)
		.bind(template.created_by.map(|id| id.to_string()))
		.bind(template.created_at.to_rfc3339())
		.bind(template.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			PermissionsServerError::from_write(e, || {
				format!("a template named '{}' already exists", template.name)
			})
		})?;

		Ok(())
	}

	#[instrument(skip(self), fields(org_id = %org_id, template_id = %id))]
	async fn get_template(&self, org_id: OrgId, id: TemplateId) -> Result<Option<PermissionTemplate>> {
		let row = sqlx::query_as::<_, TemplateRow>(
			r#"
			SELECT id, org_id, name, description, is_default, permissions,
				   applicable_resource_types, created_by, created_at, updated_at
			FROM permission_templates
			WHERE id = ? AND org_id = ?
			"#,
		)
		.bind(id.to_string())
		.bind(org_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(org_id = %org_id, name = %name))]
	async fn get_template_by_name(
		&self,
		org_id: OrgId,
		name: &str,
	) -> Result<Option<PermissionTemplate>> {
		let row = sqlx::query_as::<_, TemplateRow>(
			r#"
			SELECT id, org_id, name, description, is_default, permissions,
				   applicable_resource_types, created_by, created_at, updated_at
			FROM permission_templates
			WHERE org_id = ? AND name = ?
			"#,
		)
		.bind(org_id.to_string())
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(org_id = %org_id))]
	async fn list_templates(&self, org_id: OrgId) -> Result<Vec<PermissionTemplate>> {
		let rows = sqlx::query_as::<_, TemplateRow>(
			r#"
			SELECT id, org_id, name, description, is_default, permissions,
				   applicable_resource_types, created_by, created_at, updated_at
			FROM permission_templates
			WHERE org_id = ?
			ORDER BY is_default DESC, created_at ASC, name ASC
			"#,
		)
		.bind(org_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, template), fields(template_id = %template.id))]
	async fn update_template(&self, template: &PermissionTemplate) -> Result<bool> {
		let permissions_json = serde_json::to_string(&template.permissions)?;
		let types_json = serde_json::to_string(&template.applicable_resource_types)?;

		let result = sqlx::query(
			r#"
			UPDATE permission_templates
			SET name = ?, description = ?, permissions = ?, applicable_resource_types = ?, updated_at = ?
			WHERE id = ? AND org_id = ?
			"#,
		)
		.bind(&template.name)
		.bind(&template.description)
		.bind(permissions_json)
		.bind(types_json)
		.bind(template.updated_at.to_rfc3339())
		.bind(template.id.to_string())
		.bind(template.org_id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			PermissionsServerError::from_write(e, || {
				format!("a template named '{}' already exists", template.name)
			})
		})?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self), fields(org_id = %org_id, template_id = %id))]
	async fn delete_template(&self, org_id: OrgId, id: TemplateId) -> Result<bool> {
		let result = sqlx::query(
			r#"
			DELETE FROM permission_templates
			WHERE id = ? AND org_id = ? AND is_default = 0
			"#,
		)
		.bind(id.to_string())
		.bind(org_id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	// Membership operations

	#[instrument(skip(self), fields(user_id = %user_id, org_id = %org_id))]
	async fn get_membership(&self, user_id: UserId, org_id: OrgId) -> Result<Option<Membership>> {
		let row = sqlx::query_as::<_, MembershipRow>(
			r#"
			SELECT user_id, org_id, role, custom_role_id, status
			FROM org_memberships
			WHERE user_id = ? AND org_id = ?
			"#,
		)
		.bind(user_id.to_string())
		.bind(org_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(org_id = %org_id, role_id = %role_id))]
	async fn count_members_with_role(&self, org_id: OrgId, role_id: RoleId) -> Result<i64> {
		let (count,): (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM org_memberships
			WHERE org_id = ? AND custom_role_id = ?
			"#,
		)
		.bind(org_id.to_string())
		.bind(role_id.to_string())
		.fetch_one(&self.pool)
		.await?;

		Ok(count)
	}

	#[instrument(skip(self, replacement), fields(org_id = %org_id, role_id = %role_id, replacement_id = %replacement.id))]
	async fn reassign_members_and_delete_role(
		&self,
		org_id: OrgId,
		role_id: RoleId,
		replacement: &Role,
	) -> Result<u64> {
		let mut tx = self.pool.begin().await?;

		let moved = sqlx::query(
			r#"
			UPDATE org_memberships
			SET custom_role_id = ?, role = ?
			WHERE org_id = ? AND custom_role_id = ?
			"#,
		)
		.bind(replacement.id.to_string())
		.bind(replacement.based_on.primitive_role().as_str())
		.bind(org_id.to_string())
		.bind(role_id.to_string())
		.execute(&mut *tx)
		.await?
		.rows_affected();

		sqlx::query("DELETE FROM role_resource_overrides WHERE role_id = ?")
			.bind(role_id.to_string())
			.execute(&mut *tx)
			.await?;

		let deleted = sqlx::query("DELETE FROM roles WHERE id = ? AND org_id = ?")
			.bind(role_id.to_string())
			.bind(org_id.to_string())
			.execute(&mut *tx)
			.await?
			.rows_affected();

		if deleted == 0 {
			tx.rollback().await?;
			return Err(PermissionsServerError::NotFound(format!("role {role_id}")));
		}

		tx.commit().await?;
		Ok(moved)
	}
}

impl SqlitePermissionsRepository {
	async fn get_role_overrides(&self, role_id: RoleId) -> Result<Vec<ResourceOverride>> {
		let rows = sqlx::query_as::<_, OverrideRow>(
			r#"
			SELECT role_id, resource_type, resource_id, permissions
			FROM role_resource_overrides
			WHERE role_id = ?
			ORDER BY updated_at ASC
			"#,
		)
		.bind(role_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(OverrideRow::into_override).collect()
	}
}

/// Keyed upsert of one override; touches the owning role's `updated_at`.
async fn write_override(
	tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
	role_id: RoleId,
	entry: &ResourceOverride,
) -> Result<()> {
	if !entry.resource_type.supports_overrides() {
		return Err(PermissionsServerError::Validation(format!(
			"resource type '{}' does not support overrides",
			entry.resource_type
		)));
	}

	let permissions_json = serde_json::to_string(&entry.permissions)?;
	let now = Utc::now().to_rfc3339();

	sqlx::query(
		r#"
		INSERT INTO role_resource_overrides (role_id, resource_type, resource_id, permissions, updated_at)
		VALUES (?, ?, ?, ?, ?)
		ON CONFLICT (role_id, resource_type, resource_id)
		DO UPDATE SET permissions = excluded.permissions, updated_at = excluded.updated_at
		"#,
	)
	.bind(role_id.to_string())
	.bind(entry.resource_type.as_str())
	.bind(entry.resource_id.to_string())
	.bind(permissions_json)
	.bind(&now)
	.execute(&mut **tx)
	.await?;

	touch_role(tx, role_id).await
}

/// Override writes leave `version` alone; it guards the base fields only.
async fn touch_role(
	tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
	role_id: RoleId,
) -> Result<()> {
	sqlx::query("UPDATE roles SET updated_at = ? WHERE id = ?")
		.bind(Utc::now().to_rfc3339())
		.bind(role_id.to_string())
		.execute(&mut **tx)
		.await?;
	Ok(())
}

fn parse_id<T: FromStr>(value: &str, what: &str) -> Result<T> {
	value
		.parse()
		.map_err(|_| PermissionsServerError::Internal(format!("Invalid {what}")))
}

fn parse_timestamp(value: &str, what: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| PermissionsServerError::Internal(format!("Invalid {what}")))
}

fn parse_enum<T: FromStr>(value: &str, what: &str) -> Result<T> {
	value
		.parse()
		.map_err(|_| PermissionsServerError::Internal(format!("Invalid {what} '{value}'")))
}

// Database row types for sqlx

#[derive(sqlx::FromRow)]
struct RoleRow {
	id: String,
	org_id: String,
	name: String,
	description: Option<String>,
	is_system_role: bool,
	based_on: String,
	permissions: String,
	created_by: Option<String>,
	updated_by: Option<String>,
	version: i64,
	created_at: String,
	updated_at: String,
}

impl RoleRow {
	fn into_role(self, resource_overrides: Vec<ResourceOverride>) -> Result<Role> {
		let permissions: PermissionMatrix = serde_json::from_str(&self.permissions)?;
		let based_on: RoleArchetype = parse_enum(&self.based_on, "role archetype")?;

		Ok(Role {
			id: parse_id(&self.id, "role ID")?,
			org_id: parse_id(&self.org_id, "org ID")?,
			name: self.name,
			description: self.description,
			is_system_role: self.is_system_role,
			based_on,
			permissions,
			resource_overrides,
			created_by: self
				.created_by
				.map(|id| parse_id(&id, "created_by"))
				.transpose()?,
			updated_by: self
				.updated_by
				.map(|id| parse_id(&id, "updated_by"))
				.transpose()?,
			version: self.version,
			created_at: parse_timestamp(&self.created_at, "created_at")?,
			updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct OverrideRow {
	role_id: String,
	resource_type: String,
	resource_id: String,
	permissions: String,
}

impl OverrideRow {
	fn into_override(self) -> Result<ResourceOverride> {
		Ok(ResourceOverride {
			resource_type: parse_enum(&self.resource_type, "resource type")?,
			resource_id: parse_id(&self.resource_id, "resource ID")?,
			permissions: serde_json::from_str(&self.permissions)?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
	id: String,
	org_id: String,
	name: String,
	description: Option<String>,
	is_default: bool,
	permissions: String,
	applicable_resource_types: String,
	created_by: Option<String>,
	created_at: String,
	updated_at: String,
}

impl TryFrom<TemplateRow> for PermissionTemplate {
	type Error = PermissionsServerError;

	fn try_from(row: TemplateRow) -> Result<Self> {
		let permissions: PermissionPatch = serde_json::from_str(&row.permissions)?;
		let applicable_resource_types: Vec<ResourceType> =
			serde_json::from_str(&row.applicable_resource_types)?;

		Ok(PermissionTemplate {
			id: parse_id(&row.id, "template ID")?,
			org_id: parse_id(&row.org_id, "org ID")?,
			name: row.name,
			description: row.description,
			is_default: row.is_default,
			permissions,
			applicable_resource_types,
			created_by: row
				.created_by
				.map(|id| parse_id(&id, "created_by"))
				.transpose()?,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
			updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
	user_id: String,
	org_id: String,
	role: String,
	custom_role_id: Option<String>,
	status: String,
}

impl TryFrom<MembershipRow> for Membership {
	type Error = PermissionsServerError;

	fn try_from(row: MembershipRow) -> Result<Self> {
		let role: PrimitiveRole = parse_enum(&row.role, "membership role")?;
		let status: MembershipStatus = parse_enum(&row.status, "membership status")?;

		Ok(Membership {
			user_id: parse_id(&row.user_id, "user ID")?,
			org_id: parse_id(&row.org_id, "org ID")?,
			role,
			custom_role_id: row
				.custom_role_id
				.map(|id| parse_id(&id, "custom role ID"))
				.transpose()?,
			status,
		})
	}
}
