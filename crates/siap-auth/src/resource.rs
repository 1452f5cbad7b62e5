//! Gated page families.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A family of pages that share one capability row.
///
/// Each resource owns a base route (`href`); list, detail, add and edit
/// pages hang below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    Profile,
    OnCall,
    Routine,
    Workers,
    Assets,
    /// Account management (`users` collection).
    Users,
}

impl Resource {
    /// Every resource in navigation order.
    pub const ALL: [Resource; 7] = [
        Self::Dashboard,
        Self::OnCall,
        Self::Routine,
        Self::Workers,
        Self::Assets,
        Self::Profile,
        Self::Users,
    ];

    /// Base route of the resource.
    #[must_use]
    pub fn href(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
            Self::OnCall => "/oncall",
            Self::Routine => "/routine",
            Self::Workers => "/worker",
            Self::Assets => "/assets",
            Self::Users => "/management/user",
        }
    }

    /// Stable machine name, also accepted by [`Resource::parse`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Profile => "profile",
            Self::OnCall => "oncall",
            Self::Routine => "routine",
            Self::Workers => "workers",
            Self::Assets => "assets",
            Self::Users => "users",
        }
    }

    /// Parses a resource name. Singular forms and `on-call` are accepted.
    ///
    /// ```
    /// use siap_auth::Resource;
    ///
    /// assert_eq!(Resource::parse("worker"), Some(Resource::Workers));
    /// assert_eq!(Resource::parse("On-Call"), Some(Resource::OnCall));
    /// assert_eq!(Resource::parse("inventory"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "home" => Some(Self::Dashboard),
            "profile" => Some(Self::Profile),
            "oncall" | "on-call" | "on_call" => Some(Self::OnCall),
            "routine" | "routines" => Some(Self::Routine),
            "worker" | "workers" => Some(Self::Workers),
            "asset" | "assets" => Some(Self::Assets),
            "user" | "users" | "management" => Some(Self::Users),
            _ => None,
        }
    }

    /// Whether the resource is backed by a record collection.
    #[must_use]
    pub fn has_records(self) -> bool {
        !matches!(self, Self::Dashboard | Self::Profile)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for resource in Resource::ALL {
            assert_eq!(Resource::parse(resource.name()), Some(resource));
        }
    }

    #[test]
    fn record_backed_resources() {
        assert!(!Resource::Dashboard.has_records());
        assert!(!Resource::Profile.has_records());
        assert!(Resource::Workers.has_records());
        assert!(Resource::Users.has_records());
    }

    #[test]
    fn hrefs_are_absolute() {
        assert!(Resource::ALL.iter().all(|r| r.href().starts_with('/')));
    }
}
