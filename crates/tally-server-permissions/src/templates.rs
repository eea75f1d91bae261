// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use tracing::instrument;

use tally_permissions_core::{default_templates, OrgId, PermissionTemplate, TemplateId, UserId};

use crate::error::{PermissionsServerError, Result};
use crate::requests::{CreateTemplateRequest, UpdateTemplateRequest};
use crate::service::{normalize_name, PermissionService};

impl PermissionService {
	/// Creates the three default templates, skipping names already taken.
	///
	/// Returns how many templates were created.
	#[instrument(skip(self), fields(org_id = %org_id))]
	pub async fn create_default_templates(
		&self,
		org_id: OrgId,
		created_by: Option<UserId>,
	) -> Result<usize> {
		let mut created = 0;

		for default in default_templates() {
			if let Some(existing) = self.repo.get_template_by_name(org_id, default.name).await? {
				if !existing.is_default {
					tracing::warn!(
						template_id = %existing.id,
						name = default.name,
						"custom template occupies a default template name, not seeding it"
					);
				}
				continue;
			}

			let now = Utc::now();
			let template = PermissionTemplate {
				id: TemplateId::generate(),
				org_id,
				name: default.name.to_string(),
				description: Some(default.description.to_string()),
				is_default: true,
				permissions: default.permissions,
				applicable_resource_types: default.applicable_resource_types,
				created_by,
				created_at: now,
				updated_at: now,
			};

			match self.repo.create_template(&template).await {
				Ok(()) => created += 1,
				Err(PermissionsServerError::Conflict(_)) => {}
				Err(e) => return Err(e),
			}
		}

		tracing::info!(created, "default templates seeded");
		Ok(created)
	}

	#[instrument(skip(self), fields(org_id = %org_id))]
	pub async fn get_permission_templates(&self, org_id: OrgId) -> Result<Vec<PermissionTemplate>> {
		self.repo.list_templates(org_id).await
	}

	#[instrument(skip(self), fields(org_id = %org_id, template_id = %template_id))]
	pub async fn get_permission_template_by_id(
		&self,
		template_id: TemplateId,
		org_id: OrgId,
	) -> Result<PermissionTemplate> {
		self
			.repo
			.get_template(org_id, template_id)
			.await?
			.ok_or_else(|| PermissionsServerError::NotFound(format!("template {template_id}")))
	}

	#[instrument(skip(self, request), fields(org_id = %org_id))]
	pub async fn create_permission_template(
		&self,
		org_id: OrgId,
		request: CreateTemplateRequest,
		created_by: Option<UserId>,
	) -> Result<PermissionTemplate> {
		let name = normalize_name(&request.name)?;
		if self.repo.get_template_by_name(org_id, &name).await?.is_some() {
			return Err(PermissionsServerError::Conflict(format!(
				"a template named '{name}' already exists"
			)));
		}

		let now = Utc::now();
		let template = PermissionTemplate {
			id: TemplateId::generate(),
			org_id,
			name,
			description: request.description,
			is_default: false,
			permissions: request.permissions,
			applicable_resource_types: request.applicable_resource_types,
			created_by,
			created_at: now,
			updated_at: now,
		};

		self.repo.create_template(&template).await?;

		tracing::debug!(template_id = %template.id, "permission template created");
		Ok(template)
	}

	/// Scalar fields are replaced; the restriction mask is merged.
	#[instrument(skip(self, request), fields(org_id = %org_id, template_id = %template_id))]
	pub async fn update_permission_template(
		&self,
		template_id: TemplateId,
		org_id: OrgId,
		request: UpdateTemplateRequest,
	) -> Result<PermissionTemplate> {
		let mut template = self.get_permission_template_by_id(template_id, org_id).await?;

		if let Some(name) = request.name {
			template.name = normalize_name(&name)?;
		}
		if let Some(description) = request.description {
			template.description = Some(description);
		}
		if let Some(patch) = request.permissions {
			template.permissions.merge(&patch);
		}
		if let Some(types) = request.applicable_resource_types {
			template.applicable_resource_types = types;
		}
		template.updated_at = Utc::now();

		if !self.repo.update_template(&template).await? {
			return Err(PermissionsServerError::NotFound(format!(
				"template {template_id}"
			)));
		}

		tracing::debug!("permission template updated");
		Ok(template)
	}

	#[instrument(skip(self), fields(org_id = %org_id, template_id = %template_id))]
	pub async fn delete_permission_template(
		&self,
		template_id: TemplateId,
		org_id: OrgId,
	) -> Result<()> {
		let template = self.get_permission_template_by_id(template_id, org_id).await?;
		if template.is_default {
			return Err(PermissionsServerError::Conflict(
				"default templates cannot be deleted".to_string(),
			));
		}

		if !self.repo.delete_template(org_id, template_id).await? {
			return Err(PermissionsServerError::NotFound(format!(
				"template {template_id}"
			)));
		}

		tracing::debug!("permission template deleted");
		Ok(())
	}
}
