// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization engine configuration.

use serde::Deserialize;

/// Permissions configuration (runtime, fully resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionsConfig {
	/// Emit one `info` event per permission decision.
	pub log_decisions: bool,
	/// Seed system roles and default templates when an organization is initialized.
	pub seed_on_initialize: bool,
}

impl Default for PermissionsConfig {
	fn default() -> Self {
		Self {
			log_decisions: false,
			seed_on_initialize: true,
		}
	}
}

/// Permissions configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfigLayer {
	#[serde(default)]
	pub log_decisions: Option<bool>,
	#[serde(default)]
	pub seed_on_initialize: Option<bool>,
}

impl PermissionsConfigLayer {
	pub fn merge(&mut self, other: PermissionsConfigLayer) {
		if other.log_decisions.is_some() {
			self.log_decisions = other.log_decisions;
		}
		if other.seed_on_initialize.is_some() {
			self.seed_on_initialize = other.seed_on_initialize;
		}
	}

	pub fn finalize(self) -> PermissionsConfig {
		let defaults = PermissionsConfig::default();
		PermissionsConfig {
			log_decisions: self.log_decisions.unwrap_or(defaults.log_decisions),
			seed_on_initialize: self.seed_on_initialize.unwrap_or(defaults.seed_on_initialize),
		}
	}
}
