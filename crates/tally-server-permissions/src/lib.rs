// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side authorization for Tally.
//!
//! This crate stores roles, permission templates and resource overrides in
//! SQLite and answers permission checks for organization members.
//!
//! # Architecture
//!
//! - `repository` - Database operations for roles, overrides, templates and memberships
//! - `resources` - Existence checks for projects, teams and tasks
//! - `service` - [`PermissionService`], the entry point for every operation
//! - `roles` / `templates` / `overrides` - Lifecycle operations on the service
//! - `checker` - Permission checks built on [`tally_permissions_core::evaluate`]
//!
//! # Example
//!
//! ```ignore
//! use tally_server_permissions::{create_pool, run_migrations, PermissionService, ResourceType};
//!
//! let pool = create_pool("sqlite:tally.db").await?;
//! run_migrations(&pool).await?;
//!
//! let service = PermissionService::sqlite(pool);
//! service.initialize_organization(org_id, Some(owner_id)).await?;
//!
//! let allowed = service
//!     .check_resource_permission(user_id, org_id, ResourceType::Task, task_id, "tasks.edit")
//!     .await;
//! ```

pub mod checker;
pub mod error;
pub mod overrides;
pub mod pool;
pub mod repository;
pub mod requests;
pub mod resources;
pub mod roles;
pub mod schema;
pub mod service;
pub mod templates;
pub mod testing;

pub use error::{ErrorKind, PermissionsServerError, Result};
pub use pool::create_pool;
pub use repository::{PermissionsRepository, SqlitePermissionsRepository};
pub use requests::{
	ApplyTemplateOutcome, CreateRoleRequest, CreateTemplateRequest, DeleteRoleOutcome,
	SeedOutcome, UpdateRoleRequest, UpdateTemplateRequest,
};
pub use resources::{ResourceRegistry, ResourceValidator, SqliteResourceValidator};
pub use schema::run_migrations;
pub use service::{PermissionService, PermissionServiceOptions};

// Re-export core types for convenience
pub use tally_permissions_core::*;
