//! The authorization gate.
//!
//! # Audit Logging
//!
//! Every decision made through [`AuthorizationGate`] is logged:
//! allowed at `debug`, denied at `warn`.

use crate::{AccessDenied, AuthorizationPolicy, Capability, CapabilityTable, Resource, Role, RoleMatch, RoleSet};

/// Membership test `role ∈ allowed`, evaluated under `mode`.
///
/// Absent, empty and unrecognised roles never match, even under
/// [`RoleMatch::IgnoreCase`].
///
/// ```
/// use siap_auth::{can_mutate, Role, RoleMatch, RoleSet};
///
/// let allowed = RoleSet::from([Role::Spv, Role::Head]);
/// assert!(can_mutate(Some("SPV"), &allowed, RoleMatch::Exact));
/// assert!(!can_mutate(Some("spv"), &allowed, RoleMatch::Exact));
/// assert!(can_mutate(Some("spv"), &allowed, RoleMatch::IgnoreCase));
/// assert!(!can_mutate(None, &allowed, RoleMatch::IgnoreCase));
/// ```
#[must_use]
pub fn can_mutate(role: Option<&str>, allowed: &RoleSet, mode: RoleMatch) -> bool {
    role.and_then(|raw| Role::parse(raw, mode))
        .is_some_and(|role| role.is_known() && allowed.contains(&role))
}

/// [`CapabilityTable`] plus the configured [`RoleMatch`].
#[derive(Debug, Clone, Default)]
pub struct AuthorizationGate {
    table: CapabilityTable,
    mode: RoleMatch,
}

impl AuthorizationGate {
    #[must_use]
    pub fn new(table: CapabilityTable, mode: RoleMatch) -> Self {
        Self { table, mode }
    }

    /// Default table with the given match mode.
    #[must_use]
    pub fn with_mode(mode: RoleMatch) -> Self {
        Self::new(CapabilityTable::default(), mode)
    }

    #[must_use]
    pub fn mode(&self) -> RoleMatch {
        self.mode
    }

    #[must_use]
    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    /// Parses a cached role string under this gate's mode.
    #[must_use]
    pub fn resolve_role(&self, role: Option<&str>) -> Option<Role> {
        role.and_then(|raw| Role::parse(raw, self.mode))
    }

    /// Whether the edit and delete affordances of `resource` show for `role`.
    #[must_use]
    pub fn can_mutate(&self, role: Option<&str>, resource: Resource) -> bool {
        let allowed = self.table.allowed_roles(resource, Capability::MUTATE);
        let allowed_now = can_mutate(role, &allowed, self.mode);
        self.audit(role, resource, Capability::MUTATE, allowed_now);
        allowed_now
    }

    fn audit(&self, role: Option<&str>, resource: Resource, required: Capability, allowed: bool) {
        if allowed {
            tracing::debug!(
                role = role.unwrap_or_default(),
                resource = %resource,
                required = %required,
                mode = %self.mode,
                "access allowed"
            );
        } else {
            tracing::warn!(
                role = role.unwrap_or_default(),
                resource = %resource,
                required = %required,
                mode = %self.mode,
                "access denied"
            );
        }
    }
}

impl AuthorizationPolicy for AuthorizationGate {
    fn capabilities(&self, role: Option<&str>, resource: Resource) -> Capability {
        let role = self.resolve_role(role);
        self.table.lookup(role.as_ref(), resource)
    }

    fn can(&self, role: Option<&str>, resource: Resource, required: Capability) -> bool {
        let allowed = self.capabilities(role, resource).contains(required);
        self.audit(role, resource, required, allowed);
        allowed
    }

    fn require(
        &self,
        role: Option<&str>,
        resource: Resource,
        required: Capability,
    ) -> Result<(), AccessDenied> {
        let available = self.capabilities(role, resource);
        let allowed = available.contains(required);
        self.audit(role, resource, required, allowed);
        if allowed {
            Ok(())
        } else {
            Err(AccessDenied::CapabilityDenied {
                resource,
                role: role.unwrap_or_default().to_string(),
                required,
                available,
            })
        }
    }
}
