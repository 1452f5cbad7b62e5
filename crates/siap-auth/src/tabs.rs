//! Navigation tab visibility.
//!
//! | Order | href | Label | Shown for (case-insensitive) |
//! |-------|------|-------|------------------------------|
//! | 1 | `/dashboard` | Home | always |
//! | 2 | `/oncall` | On Call | maintainer, head |
//! | 3 | `/routine` | Routine | maintainer, head |
//! | 4 | `/worker` | Workers | maintainer, head, spv, lms, hse |
//! | 5 | `/assets` | Assets | maintainer, head, spv, lms, hse |
//! | 6 | `/profile` | Profile | always |
//!
//! The order is fixed. [`visible_tabs`] filters it and never reorders.

use crate::{Role, RoleMatch, SessionStore};
use serde::Serialize;
use std::fmt;

/// Icon identifier rendered next to a tab label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Home,
    Headset,
    Route,
    Users,
    Box,
    User,
}

impl Icon {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Headset => "headset",
            Self::Route => "route",
            Self::Users => "users",
            Self::Box => "box",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A navigation tab descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Tab {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    /// Visibility predicate over the case-insensitively parsed role.
    pub show: fn(Option<&Role>) -> bool,
}

impl Tab {
    /// Evaluates [`show`](Self::show) against a cached role string.
    #[must_use]
    pub fn is_visible(&self, role: Option<&str>) -> bool {
        let role = role.and_then(|raw| Role::parse(raw, RoleMatch::IgnoreCase));
        (self.show)(role.as_ref())
    }
}

fn always(_: Option<&Role>) -> bool {
    true
}

fn maintenance_role(role: Option<&Role>) -> bool {
    matches!(role, Some(Role::Maintainer | Role::Head))
}

fn field_role(role: Option<&Role>) -> bool {
    matches!(
        role,
        Some(Role::Maintainer | Role::Head | Role::Spv | Role::Lms | Role::Hse)
    )
}

/// All tabs in display order.
pub static TABS: [Tab; 6] = [
    Tab {
        href: "/dashboard",
        label: "Home",
        icon: Icon::Home,
        show: always,
    },
    Tab {
        href: "/oncall",
        label: "On Call",
        icon: Icon::Headset,
        show: maintenance_role,
    },
    Tab {
        href: "/routine",
        label: "Routine",
        icon: Icon::Route,
        show: maintenance_role,
    },
    Tab {
        href: "/worker",
        label: "Workers",
        icon: Icon::Users,
        show: field_role,
    },
    Tab {
        href: "/assets",
        label: "Assets",
        icon: Icon::Box,
        show: field_role,
    },
    Tab {
        href: "/profile",
        label: "Profile",
        icon: Icon::User,
        show: always,
    },
];

/// Returns the tabs `role` may see, in fixed order.
///
/// ```
/// use siap_auth::visible_tabs;
///
/// let labels: Vec<&str> = visible_tabs(Some("head")).iter().map(|t| t.label).collect();
/// assert_eq!(labels, ["Home", "On Call", "Routine", "Workers", "Assets", "Profile"]);
///
/// let labels: Vec<&str> = visible_tabs(Some("USER")).iter().map(|t| t.label).collect();
/// assert_eq!(labels, ["Home", "Profile"]);
/// ```
#[must_use]
pub fn visible_tabs(role: Option<&str>) -> Vec<&'static Tab> {
    TABS.iter().filter(|tab| tab.is_visible(role)).collect()
}

/// A tab as rendered for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabView {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: Icon,
    pub active: bool,
}

/// The navigation bar. Reads the session on every render.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabBar;

impl TabBar {
    /// Renders the bar for `active_path`.
    ///
    /// Returns no tabs when the session has no token (the bar is hidden).
    #[must_use]
    pub fn render(store: &dyn SessionStore, active_path: &str) -> Vec<TabView> {
        let session = store.snapshot();
        if !session.has_token() {
            return Vec::new();
        }
        visible_tabs(session.role())
            .into_iter()
            .map(|tab| TabView {
                href: tab.href,
                label: tab.label,
                icon: tab.icon,
                active: is_active(tab.href, active_path),
            })
            .collect()
    }
}

fn is_active(href: &str, path: &str) -> bool {
    path == href
        || path
            .strip_prefix(href)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySessionStore;

    fn labels(role: Option<&str>) -> Vec<&'static str> {
        visible_tabs(role).iter().map(|t| t.label).collect()
    }

    #[test]
    fn home_and_profile_always_visible() {
        for role in [
            None,
            Some(""),
            Some("USER"),
            Some("Auditor"),
            Some("SPV"),
            Some("Head"),
        ] {
            let tabs = labels(role);
            assert_eq!(tabs.first(), Some(&"Home"), "{role:?}");
            assert_eq!(tabs.last(), Some(&"Profile"), "{role:?}");
        }
    }

    #[test]
    fn user_and_unknown_roles_see_nothing_else() {
        for role in [None, Some(""), Some("USER"), Some("user"), Some("Admin"), Some("x")] {
            assert_eq!(labels(role), ["Home", "Profile"], "{role:?}");
        }
    }

    #[test]
    fn head_sees_every_tab_in_order() {
        assert_eq!(
            labels(Some("Head")),
            ["Home", "On Call", "Routine", "Workers", "Assets", "Profile"]
        );
    }

    #[test]
    fn field_roles_see_workers_and_assets() {
        for role in ["SPV", "spv", "LMS", "hse"] {
            assert_eq!(
                labels(Some(role)),
                ["Home", "Workers", "Assets", "Profile"],
                "{role}"
            );
        }
    }

    #[test]
    fn maintainer_is_case_insensitive() {
        assert_eq!(labels(Some("MAINTAINER")), labels(Some("Maintainer")));
        assert_eq!(labels(Some("maintainer")).len(), 6);
    }

    #[test]
    fn filtered_sequence_preserves_order() {
        let all: Vec<&str> = TABS.iter().map(|t| t.href).collect();
        for role in ["SPV", "Head", "USER", "Maintainer"] {
            let hrefs: Vec<&str> = visible_tabs(Some(role)).iter().map(|t| t.href).collect();
            let positions: Vec<usize> = hrefs
                .iter()
                .map(|h| all.iter().position(|a| a == h).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{role}");
        }
    }

    #[test]
    fn bar_hidden_without_token() {
        let store = MemorySessionStore::new();
        assert!(TabBar::render(&store, "/dashboard").is_empty());
    }

    #[test]
    fn bar_marks_active_tab_for_nested_paths() {
        let store = MemorySessionStore::new();
        store.set_session("tok", "SPV", "spv@x");

        let tabs = TabBar::render(&store, "/worker/12/edit");
        let active: Vec<&str> = tabs.iter().filter(|t| t.active).map(|t| t.label).collect();
        assert_eq!(active, ["Workers"]);

        let tabs = TabBar::render(&store, "/workers");
        assert!(tabs.iter().all(|t| !t.active));
    }

    #[test]
    fn bar_reads_session_each_render() {
        let store = MemorySessionStore::new();
        store.set_session("tok", "USER", "u@x");
        assert_eq!(TabBar::render(&store, "/").len(), 2);

        store.set_session("tok", "Head", "h@x");
        assert_eq!(TabBar::render(&store, "/").len(), 6);
    }
}
