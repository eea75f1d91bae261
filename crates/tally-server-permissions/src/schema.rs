// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database schema.
//!
//! Every statement is idempotent so [`run_migrations`] can run on each start.
//! The `org_memberships`, `projects`, `teams` and `tasks` tables belong to
//! other services; only the columns this engine reads are declared.

use sqlx::SqlitePool;

use crate::error::Result;

const MIGRATIONS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS roles (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		name TEXT NOT NULL,
		description TEXT,
		is_system_role INTEGER NOT NULL DEFAULT 0,
		based_on TEXT NOT NULL,
		permissions TEXT NOT NULL,
		created_by TEXT,
		updated_by TEXT,
		version INTEGER NOT NULL DEFAULT 1,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL,
		UNIQUE(org_id, name)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS role_resource_overrides (
		role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
		resource_type TEXT NOT NULL CHECK (resource_type IN ('project', 'team', 'task')),
		resource_id TEXT NOT NULL,
		permissions TEXT NOT NULL,
		updated_at TEXT NOT NULL,
		PRIMARY KEY (role_id, resource_type, resource_id)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS permission_templates (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		name TEXT NOT NULL,
		description TEXT,
		is_default INTEGER NOT NULL DEFAULT 0,
		permissions TEXT NOT NULL,
		applicable_resource_types TEXT NOT NULL DEFAULT '[]',
		created_by TEXT,
		created_at TEXT NOT NULL,
		updated_at TEXT NOT NULL,
		UNIQUE(org_id, name)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS org_memberships (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		user_id TEXT NOT NULL,
		role TEXT NOT NULL,
		custom_role_id TEXT,
		status TEXT NOT NULL DEFAULT 'active',
		created_at TEXT NOT NULL,
		UNIQUE(org_id, user_id)
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS projects (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		name TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS teams (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		name TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	r#"
	CREATE TABLE IF NOT EXISTS tasks (
		id TEXT PRIMARY KEY,
		org_id TEXT NOT NULL,
		name TEXT NOT NULL,
		created_at TEXT NOT NULL
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_roles_org_id ON roles(org_id)",
	"CREATE INDEX IF NOT EXISTS idx_permission_templates_org_id ON permission_templates(org_id)",
	"CREATE INDEX IF NOT EXISTS idx_org_memberships_custom_role ON org_memberships(org_id, custom_role_id)",
];

/// Creates all tables and indexes used by the permission store.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
	for statement in MIGRATIONS {
		sqlx::query(*statement).execute(pool).await?;
	}
	tracing::debug!(statements = MIGRATIONS.len(), "permission schema ready");
	Ok(())
}
