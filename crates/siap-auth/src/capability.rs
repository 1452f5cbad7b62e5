//! Capabilities a role can hold on a resource.
//!
//! Capabilities are derived, never stored: the [`CapabilityTable`]
//! computes them from `(role, resource)` on every check.
//!
//! | Capability | Page affordance |
//! |------------|-----------------|
//! | [`VIEW`](Capability::VIEW) | tab, list and detail pages |
//! | [`CREATE`](Capability::CREATE) | "add" form |
//! | [`EDIT`](Capability::EDIT) | edit button and form |
//! | [`DELETE`](Capability::DELETE) | delete button |
//!
//! [`CapabilityTable`]: crate::CapabilityTable

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of permitted actions on one resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capability: u8 {
        /// Open list and detail pages.
        const VIEW   = 0b0001;
        /// Submit the add form.
        const CREATE = 0b0010;
        /// Submit the edit form.
        const EDIT   = 0b0100;
        /// Delete a record.
        const DELETE = 0b1000;
    }
}

impl Capability {
    /// The edit/delete pair list pages gate their action buttons on.
    pub const MUTATE: Self = Self::EDIT.union(Self::DELETE);

    /// Everything.
    pub const ALL: Self = Self::VIEW.union(Self::CREATE).union(Self::MUTATE);

    /// Returns capability names in declaration order.
    ///
    /// ```
    /// use siap_auth::Capability;
    ///
    /// assert_eq!(Capability::MUTATE.names(), vec!["EDIT", "DELETE"]);
    /// ```
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// Parses a capability name, ignoring case.
    ///
    /// Accepts `MUTATE` and `ALL` as well as the single flags.
    ///
    /// ```
    /// use siap_auth::Capability;
    ///
    /// assert_eq!(Capability::parse("edit"), Some(Capability::EDIT));
    /// assert_eq!(Capability::parse("Mutate"), Some(Capability::MUTATE));
    /// assert_eq!(Capability::parse("approve"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "VIEW" | "READ" => Some(Self::VIEW),
            "CREATE" | "ADD" => Some(Self::CREATE),
            "EDIT" => Some(Self::EDIT),
            "DELETE" => Some(Self::DELETE),
            "MUTATE" => Some(Self::MUTATE),
            "ALL" => Some(Self::ALL),
            _ => None,
        }
    }

    /// Parses a list of names into one set, returning unknown names separately.
    #[must_use]
    pub fn parse_list<'a>(names: &[&'a str]) -> (Self, Vec<&'a str>) {
        let mut caps = Self::empty();
        let mut unknown = Vec::new();
        for name in names {
            match Self::parse(name) {
                Some(c) => caps |= c,
                None => unknown.push(*name),
            }
        }
        (caps, unknown)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}
