//! Roles and how role strings are matched.
//!
//! Role strings are stored on the user document and cached in the
//! session as free text. [`Role::parse`] turns them into the closed
//! [`Role`] enum under a [`RoleMatch`] mode; anything it does not
//! recognise becomes [`Role::Other`], which holds no capability.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Job function of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Supervisor.
    Spv,
    Head,
    Admin,
    Maintainer,
    Lms,
    Hse,
    /// Default role for accounts whose user document has no role field.
    User,
    /// Unrecognised role string, kept verbatim.
    Other(String),
}

impl Role {
    /// Roles with a canonical spelling.
    #[must_use]
    pub fn known() -> [Role; 7] {
        [
            Self::Spv,
            Self::Head,
            Self::Admin,
            Self::Maintainer,
            Self::Lms,
            Self::Hse,
            Self::User,
        ]
    }

    /// Canonical spelling as written on user documents.
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            Self::Spv => "SPV",
            Self::Head => "Head",
            Self::Admin => "Admin",
            Self::Maintainer => "Maintainer",
            Self::Lms => "LMS",
            Self::Hse => "HSE",
            Self::User => "USER",
            Self::Other(raw) => raw,
        }
    }

    /// Parses a cached role string.
    ///
    /// Returns `None` for an absent role (empty or whitespace-only text).
    ///
    /// ```
    /// use siap_auth::{Role, RoleMatch};
    ///
    /// assert_eq!(Role::parse("SPV", RoleMatch::Exact), Some(Role::Spv));
    /// assert_eq!(
    ///     Role::parse("spv", RoleMatch::Exact),
    ///     Some(Role::Other("spv".into()))
    /// );
    /// assert_eq!(Role::parse("spv", RoleMatch::IgnoreCase), Some(Role::Spv));
    /// assert_eq!(Role::parse("  ", RoleMatch::IgnoreCase), None);
    /// ```
    #[must_use]
    pub fn parse(raw: &str, mode: RoleMatch) -> Option<Role> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let found = Self::known()
            .into_iter()
            .find(|role| mode.matches(role.canonical(), trimmed));
        Some(found.unwrap_or_else(|| Self::Other(trimmed.to_string())))
    }

    /// Whether this role is one of the canonical roles.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Role::parse(&raw, RoleMatch::Exact)
            .ok_or_else(|| serde::de::Error::custom("role must not be empty"))
    }
}

/// How a cached role string is compared with canonical role names.
///
/// Gated pages compare `role === "SPV"` while the navigation bar compares
/// `role.toLowerCase()`. Both behaviors stay
/// selectable; the gate defaults to [`Exact`](Self::Exact) and the tab
/// resolver always uses [`IgnoreCase`](Self::IgnoreCase).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleMatch {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// ASCII case-insensitive comparison.
    IgnoreCase,
}

impl RoleMatch {
    /// Compares a canonical role name with a cached string.
    #[must_use]
    pub fn matches(self, canonical: &str, raw: &str) -> bool {
        match self {
            Self::Exact => canonical == raw,
            Self::IgnoreCase => canonical.eq_ignore_ascii_case(raw),
        }
    }

    /// Parses `exact` / `ignore_case` (also `ignore-case`, `insensitive`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "sensitive" | "case_sensitive" => Some(Self::Exact),
            "ignore_case" | "ignore-case" | "insensitive" | "case_insensitive" => {
                Some(Self::IgnoreCase)
            }
            _ => None,
        }
    }
}

impl fmt::Display for RoleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::IgnoreCase => f.write_str("ignore_case"),
        }
    }
}

/// Ordered set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role.
    pub fn insert(&mut self, role: Role) {
        self.0.insert(role);
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::canonical).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_spellings_parse_exactly() {
        for role in Role::known() {
            assert_eq!(Role::parse(role.canonical(), RoleMatch::Exact), Some(role));
        }
    }

    #[test]
    fn exact_mode_keeps_miscased_strings_unknown() {
        for raw in ["admin", "HEAD", "maintainer", "Spv", "user"] {
            let role = Role::parse(raw, RoleMatch::Exact).unwrap();
            assert!(!role.is_known(), "{raw} should not match exactly");
        }
    }

    #[test]
    fn ignore_case_mode_resolves_miscased_strings() {
        assert_eq!(Role::parse("admin", RoleMatch::IgnoreCase), Some(Role::Admin));
        assert_eq!(Role::parse("HEAD", RoleMatch::IgnoreCase), Some(Role::Head));
        assert_eq!(Role::parse("lms", RoleMatch::IgnoreCase), Some(Role::Lms));
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Role::parse(" Head ", RoleMatch::Exact), Some(Role::Head));
        assert_eq!(Role::parse("", RoleMatch::Exact), None);
    }

    #[test]
    fn role_match_parse() {
        assert_eq!(RoleMatch::parse("exact"), Some(RoleMatch::Exact));
        assert_eq!(RoleMatch::parse("Ignore-Case"), Some(RoleMatch::IgnoreCase));
        assert_eq!(RoleMatch::parse("fuzzy"), None);
    }

    #[test]
    fn role_serde_uses_canonical_text() {
        let json = serde_json::to_string(&Role::Maintainer).unwrap();
        assert_eq!(json, "\"Maintainer\"");
        let other: Role = serde_json::from_str("\"Auditor\"").unwrap();
        assert_eq!(other, Role::Other("Auditor".into()));
    }

    #[test]
    fn role_set_display_is_ordered() {
        let set = RoleSet::from([Role::Head, Role::Spv]);
        assert_eq!(set.to_string(), "{SPV, Head}");
        assert_eq!(set.len(), 2);
    }
}
