// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::matrix::{PermissionMatrix, PermissionPatch};
use crate::role::RoleArchetype;

/// Combines a role's base permissions with a template's restriction mask.
///
/// Admin-archetype roles are returned unchanged. For every other role, each
/// permission the template sets to `false` is denied and everything else keeps
/// the role's value. The result never grants anything the role did not.
pub fn calculate_effective(
	role_permissions: &PermissionMatrix,
	template_permissions: &PermissionPatch,
	archetype: RoleArchetype,
) -> PermissionMatrix {
	if archetype == RoleArchetype::Admin {
		return *role_permissions;
	}
	role_permissions.restrict(template_permissions)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Permission;
	use proptest::prelude::*;

	const NON_ADMIN: [RoleArchetype; 4] = [
		RoleArchetype::Manager,
		RoleArchetype::Member,
		RoleArchetype::Guest,
		RoleArchetype::Custom,
	];

	fn arb_permission() -> impl Strategy<Value = Permission> {
		(0..Permission::all().len()).prop_map(|i| Permission::all()[i])
	}

	fn arb_matrix() -> impl Strategy<Value = PermissionMatrix> {
		prop::collection::vec(arb_permission(), 0..40).prop_map(PermissionMatrix::from_permissions)
	}

	fn arb_patch() -> impl Strategy<Value = PermissionPatch> {
		prop::collection::vec((arb_permission(), any::<bool>()), 0..40)
			.prop_map(|entries| entries.into_iter().collect())
	}

	fn arb_non_admin() -> impl Strategy<Value = RoleArchetype> {
		(0..NON_ADMIN.len()).prop_map(|i| NON_ADMIN[i])
	}

	#[test]
	fn test_template_false_denies() {
		let role = PermissionMatrix::none()
			.with(Permission::TasksEdit, true)
			.with(Permission::TasksView, true);
		let template = PermissionPatch::new().with(Permission::TasksEdit, false);

		let effective = calculate_effective(&role, &template, RoleArchetype::Member);

		assert!(!effective.allows(Permission::TasksEdit));
		assert!(effective.allows(Permission::TasksView));
	}

	#[test]
	fn test_template_true_never_grants() {
		let role = PermissionMatrix::none();
		let template = PermissionPatch::new().with(Permission::TasksDelete, true);

		let effective = calculate_effective(&role, &template, RoleArchetype::Custom);

		assert!(!effective.allows(Permission::TasksDelete));
	}

	#[test]
	fn test_admin_is_never_restricted() {
		let role = PermissionMatrix::all();
		let template = PermissionPatch::denying(Permission::all().iter().copied());

		let effective = calculate_effective(&role, &template, RoleArchetype::Admin);

		assert_eq!(effective, role);
	}

	proptest! {
		#[test]
		fn restriction_only_law(
			role in arb_matrix(),
			template in arb_patch(),
			archetype in arb_non_admin(),
		) {
			let effective = calculate_effective(&role, &template, archetype);
			for permission in Permission::all() {
				if template.get(*permission) == Some(false) {
					prop_assert!(!effective.allows(*permission));
				} else {
					prop_assert_eq!(effective.allows(*permission), role.allows(*permission));
				}
			}
		}

		#[test]
		fn empty_template_is_fixed_point(role in arb_matrix(), archetype in arb_non_admin()) {
			prop_assert_eq!(calculate_effective(&role, &PermissionPatch::new(), archetype), role);
		}

		#[test]
		fn all_true_template_is_fixed_point(role in arb_matrix(), archetype in arb_non_admin()) {
			let template: PermissionPatch = Permission::all().iter().map(|p| (*p, true)).collect();
			prop_assert_eq!(calculate_effective(&role, &template, archetype), role);
		}

		#[test]
		fn applying_twice_is_idempotent(
			role in arb_matrix(),
			template in arb_patch(),
			archetype in arb_non_admin(),
		) {
			let once = calculate_effective(&role, &template, archetype);
			let twice = calculate_effective(&once, &template, archetype);
			prop_assert_eq!(once, twice);
		}

		#[test]
		fn admin_passes_through(role in arb_matrix(), template in arb_patch()) {
			prop_assert_eq!(calculate_effective(&role, &template, RoleArchetype::Admin), role);
		}
	}
}
