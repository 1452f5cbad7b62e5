//! Authorization policy trait.
//!
//! ```text
//! AuthorizationPolicy (trait)
//!        │
//!        ├── AuthorizationGate  <- CapabilityTable + RoleMatch, audit-logged
//!        └── test doubles
//! ```

use crate::{AccessDenied, Capability, Resource};

/// Decides what a cached role may do on a resource.
///
/// Implementors provide [`capabilities`](Self::capabilities); the checks
/// are derived from it. Absent and unknown roles must yield no capability
/// beyond what every authenticated session holds.
///
/// ```
/// use siap_auth::{AuthorizationPolicy, Capability, Resource};
///
/// struct ReadOnly;
///
/// impl AuthorizationPolicy for ReadOnly {
///     fn capabilities(&self, role: Option<&str>, _resource: Resource) -> Capability {
///         if role.is_some() { Capability::VIEW } else { Capability::empty() }
///     }
/// }
///
/// assert!(ReadOnly.can(Some("Head"), Resource::Assets, Capability::VIEW));
/// assert!(ReadOnly.require(Some("Head"), Resource::Assets, Capability::EDIT).is_err());
/// ```
pub trait AuthorizationPolicy: Send + Sync {
    /// Capabilities of `role` on `resource`.
    fn capabilities(&self, role: Option<&str>, resource: Resource) -> Capability;

    /// Whether `role` holds every capability in `required`.
    fn can(&self, role: Option<&str>, resource: Resource, required: Capability) -> bool {
        self.capabilities(role, resource).contains(required)
    }

    /// Like [`can`](Self::can), returning the denial as an error.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::CapabilityDenied`] when any required capability is missing.
    fn require(
        &self,
        role: Option<&str>,
        resource: Resource,
        required: Capability,
    ) -> Result<(), AccessDenied> {
        let available = self.capabilities(role, resource);
        if available.contains(required) {
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
