//! The capability table: one place mapping `(role, resource)` to actions.
//!
//! # Default Table
//!
//! | Resource | SPV | Head | Admin | Maintainer | LMS | HSE | USER / other |
//! |----------|-----|------|-------|------------|-----|-----|--------------|
//! | Dashboard | V | V | V | V | V | V | V |
//! | Profile | V | V | V | V | V | V | V |
//! | OnCall | - | VCED | - | VCED | - | - | - |
//! | Routine | - | VCED | - | VCED | - | - | - |
//! | Workers | VCED | VCED | - | V | V | V | - |
//! | Assets | VCED | VCED | - | V | V | V | - |
//! | Users | - | - | VCED | - | - | - | - |
//!
//! Dashboard and Profile are a baseline granted to every session that
//! passed the route guard, whether or not its role is recognised.

use crate::{Capability, Resource, Role, RoleSet};
use std::collections::BTreeMap;

/// Role/resource capability registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    baseline: BTreeMap<Resource, Capability>,
    grants: BTreeMap<(Resource, Role), Capability>,
}

impl CapabilityTable {
    /// Creates a table that grants nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            baseline: BTreeMap::new(),
            grants: BTreeMap::new(),
        }
    }

    /// Grants `caps` on `resource` to every authenticated session.
    #[must_use]
    pub fn with_baseline(mut self, resource: Resource, caps: Capability) -> Self {
        *self.baseline.entry(resource).or_insert(Capability::empty()) |= caps;
        self
    }

    /// Grants `caps` on `resource` to each of `roles`.
    ///
    /// Grants to [`Role::Other`] are ignored; unknown roles never hold
    /// capabilities.
    #[must_use]
    pub fn grant(
        mut self,
        resource: Resource,
        roles: impl IntoIterator<Item = Role>,
        caps: Capability,
    ) -> Self {
        for role in roles.into_iter().filter(Role::is_known) {
            *self
                .grants
                .entry((resource, role))
                .or_insert(Capability::empty()) |= caps;
        }
        self
    }

    /// Returns the capabilities `role` holds on `resource`.
    ///
    /// An absent role only receives the baseline.
    #[must_use]
    pub fn lookup(&self, role: Option<&Role>, resource: Resource) -> Capability {
        let baseline = self
            .baseline
            .get(&resource)
            .copied()
            .unwrap_or(Capability::empty());
        let granted = role
            .filter(|r| r.is_known())
            .and_then(|r| self.grants.get(&(resource, r.clone())))
            .copied()
            .unwrap_or(Capability::empty());
        baseline | granted
    }

    /// Returns the known roles that hold every capability in `caps`.
    ///
    /// This is the `allowedRoles` set a page would otherwise hard-code.
    ///
    /// ```
    /// use siap_auth::{Capability, CapabilityTable, Resource, Role, RoleSet};
    ///
    /// let table = CapabilityTable::default();
    /// assert_eq!(
    ///     table.allowed_roles(Resource::Assets, Capability::MUTATE),
    ///     RoleSet::from([Role::Spv, Role::Head])
    /// );
    /// ```
    #[must_use]
    pub fn allowed_roles(&self, resource: Resource, caps: Capability) -> RoleSet {
        Role::known()
            .into_iter()
            .filter(|role| self.lookup(Some(role), resource).contains(caps))
            .collect()
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        use Role::{Admin, Head, Hse, Lms, Maintainer, Spv};

        Self::empty()
            .with_baseline(Resource::Dashboard, Capability::VIEW)
            .with_baseline(Resource::Profile, Capability::VIEW)
            .grant(Resource::OnCall, [Maintainer, Head], Capability::ALL)
            .grant(Resource::Routine, [Maintainer, Head], Capability::ALL)
            .grant(Resource::Workers, [Spv, Head], Capability::ALL)
            .grant(Resource::Workers, [Maintainer, Lms, Hse], Capability::VIEW)
            .grant(Resource::Assets, [Spv, Head], Capability::ALL)
            .grant(Resource::Assets, [Maintainer, Lms, Hse], Capability::VIEW)
            .grant(Resource::Users, [Admin], Capability::ALL)
    }
}
