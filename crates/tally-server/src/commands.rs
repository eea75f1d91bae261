// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use tally_server_permissions::{
	CreateRoleRequest, CreateTemplateRequest, OrgId, Permission, PermissionPatch,
	PermissionService, ResourceId, ResourceType, RoleId, TemplateId, UpdateRoleRequest,
	UpdateTemplateRequest, UserId,
};

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Create the database schema and exit
	Migrate,

	/// List every permission known to the engine
	Schema,

	/// Seed the system roles and default templates for an organization
	InitOrg {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		created_by: Option<UserId>,
	},

	/// List an organization's roles
	Roles {
		#[arg(long)]
		org: OrgId,
	},

	/// Create a custom role from a JSON request file
	CreateRole {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		file: PathBuf,
		#[arg(long)]
		created_by: Option<UserId>,
	},

	/// Update a custom role from a JSON request file
	UpdateRole {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		role: RoleId,
		#[arg(long)]
		file: PathBuf,
		#[arg(long)]
		updated_by: Option<UserId>,
	},

	/// Copy a role's base permissions into a new custom role
	CloneRole {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		role: RoleId,
		#[arg(long)]
		name: String,
	},

	/// Delete a custom role, moving its members to `--replacement` if given
	DeleteRole {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		role: RoleId,
		#[arg(long)]
		replacement: Option<RoleId>,
	},

	/// Set a role's override for one resource from a JSON permissions file
	SetOverride {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		role: RoleId,
		#[arg(long)]
		resource_type: ResourceType,
		#[arg(long)]
		resource_id: ResourceId,
		#[arg(long)]
		file: PathBuf,
	},

	/// Remove a role's override for one resource
	RemoveOverride {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		role: RoleId,
		#[arg(long)]
		resource_type: ResourceType,
		#[arg(long)]
		resource_id: ResourceId,
	},

	/// List an organization's permission templates
	Templates {
		#[arg(long)]
		org: OrgId,
	},

	/// Create a permission template from a JSON request file
	CreateTemplate {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		file: PathBuf,
	},

	/// Update a permission template from a JSON request file
	UpdateTemplate {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		template: TemplateId,
		#[arg(long)]
		file: PathBuf,
	},

	/// Delete a permission template
	DeleteTemplate {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		template: TemplateId,
	},

	/// Restrict every role on one resource with a template
	ApplyTemplate {
		#[arg(long)]
		org: OrgId,
		#[arg(long)]
		template: TemplateId,
		#[arg(long)]
		resource_type: ResourceType,
		#[arg(long)]
		resource_id: ResourceId,
	},

	/// Decide whether a user holds a permission, optionally on one resource
	Check {
		#[arg(long)]
		user: UserId,
		#[arg(long)]
		org: OrgId,
		/// Permission in `category.action` form
		#[arg(long)]
		permission: String,
		#[arg(long, requires = "resource_id")]
		resource_type: Option<ResourceType>,
		#[arg(long, requires = "resource_type")]
		resource_id: Option<ResourceId>,
	},

	/// Show the organization-wide permissions a user resolves to
	UserPermissions {
		#[arg(long)]
		user: UserId,
		#[arg(long)]
		org: OrgId,
	},
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
	let content = std::fs::read_to_string(path)?;
	Ok(serde_json::from_str(&content)?)
}

pub async fn run(
	service: &PermissionService,
	command: Command,
) -> Result<Value, Box<dyn std::error::Error>> {
	let output = match command {
		Command::Migrate => json!({ "migrated": true }),
		Command::Schema => {
			let permissions: Vec<String> = Permission::all().iter().map(|p| p.to_string()).collect();
			json!(permissions)
		}
		Command::InitOrg { org, created_by } => {
			serde_json::to_value(service.initialize_organization(org, created_by).await?)?
		}
		Command::Roles { org } => serde_json::to_value(service.get_organization_roles(org).await?)?,
		Command::CreateRole {
			org,
			file,
			created_by,
		} => {
			let request: CreateRoleRequest = read_json(&file)?;
			serde_json::to_value(service.create_custom_role(org, request, created_by).await?)?
		}
		Command::UpdateRole {
			org,
			role,
			file,
			updated_by,
		} => {
			let request: UpdateRoleRequest = read_json(&file)?;
			serde_json::to_value(
				service
					.update_custom_role(role, org, request, updated_by)
					.await?,
			)?
		}
		Command::CloneRole { org, role, name } => {
			serde_json::to_value(service.clone_role(role, org, &name, None).await?)?
		}
		Command::DeleteRole {
			org,
			role,
			replacement,
		} => serde_json::to_value(service.delete_custom_role(role, org, replacement).await?)?,
		Command::SetOverride {
			org,
			role,
			resource_type,
			resource_id,
			file,
		} => {
			let permissions: PermissionPatch = read_json(&file)?;
			serde_json::to_value(
				service
					.set_resource_permission_override(
						role,
						org,
						resource_type,
						resource_id,
						permissions,
						None,
					)
					.await?,
			)?
		}
		Command::RemoveOverride {
			org,
			role,
			resource_type,
			resource_id,
		} => {
			let removed = service
				.remove_resource_permission_override(role, org, resource_type, resource_id)
				.await?;
			json!({ "removed": removed })
		}
		Command::Templates { org } => {
			serde_json::to_value(service.get_permission_templates(org).await?)?
		}
		Command::CreateTemplate { org, file } => {
			let request: CreateTemplateRequest = read_json(&file)?;
			serde_json::to_value(service.create_permission_template(org, request, None).await?)?
		}
		Command::UpdateTemplate {
			org,
			template,
			file,
		} => {
			let request: UpdateTemplateRequest = read_json(&file)?;
			serde_json::to_value(
				service
					.update_permission_template(template, org, request)
					.await?,
			)?
		}
		Command::DeleteTemplate { org, template } => {
			service.delete_permission_template(template, org).await?;
			json!({ "deleted": true })
		}
		Command::ApplyTemplate {
			org,
			template,
			resource_type,
			resource_id,
		} => serde_json::to_value(
			service
				.apply_permission_template(org, template, resource_type, resource_id)
				.await?,
		)?,
		Command::Check {
			user,
			org,
			permission,
			resource_type,
			resource_id,
		} => {
			let resource = resource_type.zip(resource_id);
			serde_json::to_value(
				service
					.evaluate_permission(user, org, resource, &permission)
					.await?,
			)?
		}
		Command::UserPermissions { user, org } => {
			serde_json::to_value(service.get_user_permissions(user, org).await?)?
		}
	};

	Ok(output)
}
