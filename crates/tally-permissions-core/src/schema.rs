// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The closed permission schema.
//!
//! Every grant the engine knows about is a variant of [`Permission`], tagged
//! with its [`Category`], its wire-format action name and its default value.
//! The wire format is `"category.action"` (e.g. `"timeTracking.viewAll"`),
//! split on the first `.`.
//!
//! The table below is the single source of truth: the enum, its bit positions
//! in [`crate::PermissionMatrix`] and the per-category defaults are all
//! generated from it.

use std::fmt;
use std::str::FromStr;

use crate::error::PermissionsError;

/// Top-level permission categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
	Organization,
	Projects,
	Teams,
	Tasks,
	TimeTracking,
	Reports,
	Comments,
	Integrations,
	Analytics,
	CustomFields,
}

impl Category {
	/// Returns all categories in schema order.
	pub fn all() -> &'static [Category] {
		&[
			Category::Organization,
			Category::Projects,
			Category::Teams,
			Category::Tasks,
			Category::TimeTracking,
			Category::Reports,
			Category::Comments,
			Category::Integrations,
			Category::Analytics,
			Category::CustomFields,
		]
	}

	/// Wire-format name of the category.
	pub fn as_str(&self) -> &'static str {
		match self {
			Category::Organization => "organization",
			Category::Projects => "projects",
			Category::Teams => "teams",
			Category::Tasks => "tasks",
			Category::TimeTracking => "timeTracking",
			Category::Reports => "reports",
			Category::Comments => "comments",
			Category::Integrations => "integrations",
			Category::Analytics => "analytics",
			Category::CustomFields => "customFields",
		}
	}

	/// Iterates over the permissions belonging to this category.
	pub fn permissions(self) -> impl Iterator<Item = Permission> {
		Permission::all()
			.iter()
			.copied()
			.filter(move |p| p.category() == self)
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Category {
	type Err = PermissionsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Category::all()
			.iter()
			.copied()
			.find(|c| c.as_str() == s)
			.ok_or_else(|| PermissionsError::UnknownCategory(s.to_string()))
	}
}

struct PermissionDef {
	category: Category,
	action: &'static str,
	default: bool,
}

macro_rules! permission_schema {
	($( $variant:ident => ($category:ident, $action:literal, $default:literal) ),+ $(,)?) => {
		/// A single grant in the closed schema.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		#[repr(u8)]
		pub enum Permission {
			$( $variant ),+
		}

		const ALL_PERMISSIONS: &[Permission] = &[ $( Permission::$variant ),+ ];

		const PERMISSION_DEFS: &[PermissionDef] = &[
			$( PermissionDef {
				category: Category::$category,
				action: $action,
				default: $default,
			} ),+
		];
	};
}

permission_schema! {
	OrganizationView => (Organization, "view", true),
	OrganizationEdit => (Organization, "edit", false),
	OrganizationDelete => (Organization, "delete", false),
	OrganizationManageMembers => (Organization, "manageMembers", false),
	OrganizationManageRoles => (Organization, "manageRoles", false),
	OrganizationManageBilling => (Organization, "manageBilling", false),

	ProjectsCreate => (Projects, "create", false),
	ProjectsView => (Projects, "view", true),
	ProjectsEdit => (Projects, "edit", false),
	ProjectsDelete => (Projects, "delete", false),
	ProjectsManageMembers => (Projects, "manageMembers", false),
	ProjectsManageTeams => (Projects, "manageTeams", false),

	TeamsCreate => (Teams, "create", false),
	TeamsView => (Teams, "view", true),
	TeamsEdit => (Teams, "edit", false),
	TeamsDelete => (Teams, "delete", false),
	TeamsManageMembers => (Teams, "manageMembers", false),

	TasksCreate => (Tasks, "create", false),
	TasksView => (Tasks, "view", true),
	TasksEdit => (Tasks, "edit", false),
	TasksDelete => (Tasks, "delete", false),
	TasksAssign => (Tasks, "assign", false),
	TasksChangeStatus => (Tasks, "changeStatus", false),

	TimeTrackingTrack => (TimeTracking, "track", false),
	TimeTrackingViewOwn => (TimeTracking, "viewOwn", true),
	TimeTrackingViewAll => (TimeTracking, "viewAll", false),
	TimeTrackingEdit => (TimeTracking, "edit", false),
	TimeTrackingDelete => (TimeTracking, "delete", false),
	TimeTrackingApprove => (TimeTracking, "approve", false),

	ReportsView => (Reports, "view", false),
	ReportsCreate => (Reports, "create", false),
	ReportsExport => (Reports, "export", false),
	ReportsViewFinancial => (Reports, "viewFinancial", false),

	CommentsCreate => (Comments, "create", false),
	CommentsView => (Comments, "view", true),
	CommentsEdit => (Comments, "edit", false),
	CommentsDelete => (Comments, "delete", false),
	CommentsModerate => (Comments, "moderate", false),

	IntegrationsView => (Integrations, "view", false),
	IntegrationsManage => (Integrations, "manage", false),

	AnalyticsView => (Analytics, "view", false),
	AnalyticsExport => (Analytics, "export", false),

	CustomFieldsView => (CustomFields, "view", true),
	CustomFieldsCreate => (CustomFields, "create", false),
	CustomFieldsEdit => (CustomFields, "edit", false),
	CustomFieldsDelete => (CustomFields, "delete", false),
}

// Grants are stored as bits of a u64.
const _: () = assert!(ALL_PERMISSIONS.len() <= 64);

impl Permission {
	/// Returns every permission in schema order.
	pub fn all() -> &'static [Permission] {
		ALL_PERMISSIONS
	}

	fn def(self) -> &'static PermissionDef {
		&PERMISSION_DEFS[self as usize]
	}

	/// The category this permission belongs to.
	pub fn category(self) -> Category {
		self.def().category
	}

	/// Wire-format action name within the category (e.g. `"manageMembers"`).
	pub fn action(self) -> &'static str {
		self.def().action
	}

	/// Value used when a role is created without specifying this permission.
	pub fn default_value(self) -> bool {
		self.def().default
	}

	/// Bit used for this permission in packed matrices.
	pub(crate) fn bit(self) -> u64 {
		1u64 << (self as u8)
	}

	/// Resolves a permission from an already-split category and action.
	pub fn from_parts(category: Category, action: &str) -> Result<Permission, PermissionsError> {
		category
			.permissions()
			.find(|p| p.action() == action)
			.ok_or_else(|| PermissionsError::UnknownAction {
				category: category.as_str().to_string(),
				action: action.to_string(),
			})
	}
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.category().as_str(), self.action())
	}
}

impl FromStr for Permission {
	type Err = PermissionsError;

	/// Parses the `"category.action"` wire format, splitting on the first `.`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (category, action) = s
			.split_once('.')
			.ok_or_else(|| PermissionsError::MalformedPermission(s.to_string()))?;
		let category = Category::from_str(category)?;
		Permission::from_parts(category, action)
	}
}
