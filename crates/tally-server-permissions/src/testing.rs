// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory database helpers for tests.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use tally_permissions_core::{
	MembershipStatus, OrgId, PrimitiveRole, ResourceId, ResourceType, RoleId, UserId,
};

use crate::schema::run_migrations;

/// An in-memory pool with no tables.
///
/// Limited to one connection: every `:memory:` connection is its own database.
pub async fn create_empty_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true)
		.create_if_missing(true);

	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.expect("Failed to create test pool")
}

/// An in-memory pool with the permission schema applied.
pub async fn create_test_pool() -> SqlitePool {
	let pool = create_empty_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn insert_membership(
	pool: &SqlitePool,
	org_id: OrgId,
	user_id: UserId,
	role: PrimitiveRole,
	custom_role_id: Option<RoleId>,
	status: MembershipStatus,
) {
	sqlx::query(
		r#"
		INSERT INTO org_memberships (id, org_id, user_id, role, custom_role_id, status, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(uuid::Uuid::new_v4().to_string())
	.bind(org_id.to_string())
	.bind(user_id.to_string())
	.bind(role.as_str())
	.bind(custom_role_id.map(|id| id.to_string()))
	.bind(status.as_str())
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
}

/// Inserts an active member and returns the new user id.
pub async fn insert_active_member(
	pool: &SqlitePool,
	org_id: OrgId,
	role: PrimitiveRole,
	custom_role_id: Option<RoleId>,
) -> UserId {
	let user_id = UserId::generate();
	insert_membership(
		pool,
		org_id,
		user_id,
		role,
		custom_role_id,
		MembershipStatus::Active,
	)
	.await;
	user_id
}

/// Inserts a project, team or task owned by `org_id` and returns its id.
pub async fn insert_resource(
	pool: &SqlitePool,
	resource_type: ResourceType,
	org_id: OrgId,
) -> ResourceId {
	let table = match resource_type {
		ResourceType::Project => "projects",
		ResourceType::Team => "teams",
		ResourceType::Task => "tasks",
		ResourceType::Note => panic!("notes are not stored by this engine"),
	};
	let id = ResourceId::generate();
	sqlx::query(&format!(
		"INSERT INTO {table} (id, org_id, name, created_at) VALUES (?, ?, ?, ?)"
	))
	.bind(id.to_string())
	.bind(org_id.to_string())
	.bind(format!("test {resource_type}"))
	.bind(Utc::now().to_rfc3339())
	.execute(pool)
	.await
	.unwrap();
	id
}
