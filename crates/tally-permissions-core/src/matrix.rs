// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission matrices and partial patches.
//!
//! A [`PermissionMatrix`] has a value for every permission in the schema and
//! is what roles and resource overrides carry. A [`PermissionPatch`] only
//! mentions some permissions; it is the input to role/template updates and the
//! shape of a template's restriction mask.
//!
//! Both serialize to the nested JSON shape used by the store and the API:
//!
//! ```json
//! { "tasks": { "edit": true, "delete": false }, "comments": { "view": true } }
//! ```
//!
//! Unknown categories or actions fail deserialization.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PermissionsError;
use crate::schema::{Category, Permission};

fn schema_bits() -> u64 {
	Permission::all().iter().fold(0, |acc, p| acc | p.bit())
}

/// A complete set of grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionMatrix {
	granted: u64,
}

impl PermissionMatrix {
	/// A matrix that denies everything.
	pub const fn none() -> Self {
		Self { granted: 0 }
	}

	/// A matrix that grants everything.
	pub fn all() -> Self {
		Self {
			granted: schema_bits(),
		}
	}

	/// A matrix granting exactly the given permissions.
	pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
		let granted = permissions.into_iter().fold(0, |acc, p| acc | p.bit());
		Self { granted }
	}

	/// Builds a matrix from a patch, using schema defaults for unspecified permissions.
	pub fn from_patch(patch: &PermissionPatch) -> Self {
		let mut matrix = Self::default();
		matrix.merge(patch);
		matrix
	}

	/// Builds a matrix from a patch, denying unspecified permissions.
	pub fn from_patch_denying_unspecified(patch: &PermissionPatch) -> Self {
		let mut matrix = Self::none();
		matrix.merge(patch);
		matrix
	}

	pub fn allows(&self, permission: Permission) -> bool {
		self.granted & permission.bit() != 0
	}

	pub fn set(&mut self, permission: Permission, value: bool) {
		if value {
			self.granted |= permission.bit();
		} else {
			self.granted &= !permission.bit();
		}
	}

	/// Builder: set a single permission.
	pub fn with(mut self, permission: Permission, value: bool) -> Self {
		self.set(permission, value);
		self
	}

	/// Looks up a `"category.action"` string.
	///
	/// Returns an error for malformed strings or names outside the schema.
	pub fn lookup(&self, permission: &str) -> Result<bool, PermissionsError> {
		Permission::from_str(permission).map(|p| self.allows(p))
	}

	/// Looks up a `"category.action"` string, denying on any parse failure.
	pub fn allows_str(&self, permission: &str) -> bool {
		self.lookup(permission).unwrap_or(false)
	}

	/// Category-wise shallow merge: permissions present in `patch` take the
	/// patch's value, everything else is left alone.
	pub fn merge(&mut self, patch: &PermissionPatch) {
		self.granted = (self.granted & !patch.mask) | (patch.values & patch.mask);
	}

	/// Returns a copy with `patch` merged in.
	pub fn merged(mut self, patch: &PermissionPatch) -> Self {
		self.merge(patch);
		self
	}

	/// Clears every permission the mask explicitly sets to `false`.
	///
	/// Permissions the mask sets to `true` or leaves out are untouched, so the
	/// result never grants more than `self`.
	pub fn restrict(&self, mask: &PermissionPatch) -> Self {
		let denied = mask.mask & !mask.values;
		Self {
			granted: self.granted & !denied,
		}
	}

	/// Iterates over granted permissions in schema order.
	pub fn granted_permissions(&self) -> impl Iterator<Item = Permission> + '_ {
		Permission::all().iter().copied().filter(|p| self.allows(*p))
	}

	/// Returns true if every grant in `self` is also granted by `other`.
	pub fn is_subset_of(&self, other: &PermissionMatrix) -> bool {
		self.granted & !other.granted == 0
	}
}

impl Default for PermissionMatrix {
	/// The documented per-category defaults (see [`Permission::default_value`]).
	fn default() -> Self {
		Self::from_permissions(
			Permission::all()
				.iter()
				.copied()
				.filter(|p| p.default_value()),
		)
	}
}

impl Serialize for PermissionMatrix {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(Category::all().len()))?;
		for category in Category::all() {
			let actions: BTreeMap<&str, bool> = category
				.permissions()
				.map(|p| (p.action(), self.allows(p)))
				.collect();
			map.serialize_entry(category.as_str(), &actions)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for PermissionMatrix {
	/// Missing entries fall back to the schema defaults.
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let patch = PermissionPatch::deserialize(deserializer)?;
		Ok(PermissionMatrix::from_patch(&patch))
	}
}

/// A partial set of grants.
///
/// Each permission is either absent, explicitly `true` or explicitly `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PermissionPatch {
	mask: u64,
	values: u64,
}

impl PermissionPatch {
	/// An empty patch.
	pub const fn new() -> Self {
		Self { mask: 0, values: 0 }
	}

	/// A patch that explicitly denies each of the given permissions.
	pub fn denying(permissions: impl IntoIterator<Item = Permission>) -> Self {
		permissions
			.into_iter()
			.fold(Self::new(), |patch, p| patch.with(p, false))
	}

	pub fn get(&self, permission: Permission) -> Option<bool> {
		if self.mask & permission.bit() == 0 {
			None
		} else {
			Some(self.values & permission.bit() != 0)
		}
	}

	pub fn set(&mut self, permission: Permission, value: bool) {
		self.mask |= permission.bit();
		if value {
			self.values |= permission.bit();
		} else {
			self.values &= !permission.bit();
		}
	}

	/// Builder: set a single permission.
	pub fn with(mut self, permission: Permission, value: bool) -> Self {
		self.set(permission, value);
		self
	}

	pub fn is_empty(&self) -> bool {
		self.mask == 0
	}

	/// Merges `other` into `self`; entries in `other` win.
	pub fn merge(&mut self, other: &PermissionPatch) {
		self.mask |= other.mask;
		self.values = (self.values & !other.mask) | (other.values & other.mask);
	}

	/// Iterates over the explicitly specified entries in schema order.
	pub fn entries(&self) -> impl Iterator<Item = (Permission, bool)> + '_ {
		Permission::all()
			.iter()
			.copied()
			.filter_map(|p| self.get(p).map(|v| (p, v)))
	}

	/// Builds a patch from the nested `category -> action -> bool` shape.
	pub fn from_nested(
		nested: BTreeMap<String, BTreeMap<String, bool>>,
	) -> Result<Self, PermissionsError> {
		let mut patch = Self::new();
		for (category, actions) in nested {
			let category = Category::from_str(&category)?;
			for (action, value) in actions {
				patch.set(Permission::from_parts(category, &action)?, value);
			}
		}
		Ok(patch)
	}
}

impl FromIterator<(Permission, bool)> for PermissionPatch {
	fn from_iter<I: IntoIterator<Item = (Permission, bool)>>(iter: I) -> Self {
		iter
			.into_iter()
			.fold(Self::new(), |patch, (p, v)| patch.with(p, v))
	}
}

impl Serialize for PermissionPatch {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut nested: BTreeMap<&str, BTreeMap<&str, bool>> = BTreeMap::new();
		for (permission, value) in self.entries() {
			nested
				.entry(permission.category().as_str())
				.or_default()
				.insert(permission.action(), value);
		}
		nested.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for PermissionPatch {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let nested = BTreeMap::<String, BTreeMap<String, bool>>::deserialize(deserializer)?;
		PermissionPatch::from_nested(nested).map_err(D::Error::custom)
	}
}
