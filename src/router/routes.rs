//! Route table.

/// A navigable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
}

pub const HOME: Route = Route { name: "home", path: "/", requires_auth: false };
pub const LOGIN: Route = Route { name: "login", path: "/login", requires_auth: false };
pub const ADMIN: Route = Route { name: "admin", path: "/admin", requires_auth: true };

pub const ROUTES: [Route; 3] = [HOME, LOGIN, ADMIN];

impl Route {
    #[must_use]
    pub fn is_login(&self) -> bool {
        self.name == LOGIN.name
    }
}

/// Find the route for a path. Query strings, fragments and a trailing slash
/// are ignored.
#[must_use]
pub fn resolve(path: &str) -> Option<Route> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { "/" } else { trimmed };
    ROUTES.iter().copied().find(|route| route.path == normalized)
}

/// Find a route by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Route> {
    ROUTES.iter().copied().find(|route| route.name == name)
}
