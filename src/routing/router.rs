//! Route lookup and the production route table.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan; first match wins (acceptable for ~60 routes)
//! - Explicit no-match rather than a silent default backend

use std::collections::HashSet;

use axum::http::Method;
use url::Url;

use crate::config::schema::ServiceUrls;
use crate::routing::matcher::PathPattern;

/// One entry of the static route table: where a `(method, path)` pair is
/// forwarded and what policy guards it.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub pattern: PathPattern,
    pub backend_base_url: Url,
    pub requires_auth: bool,
    pub allowed_roles: HashSet<String>,
}

impl RouteDescriptor {
    /// Route with no authentication requirement.
    pub fn public(method: Method, pattern: &str, backend: &Url) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            backend_base_url: backend.clone(),
            requires_auth: false,
            allowed_roles: HashSet::new(),
        }
    }

    /// Route requiring a verified token, any role.
    pub fn authenticated(method: Method, pattern: &str, backend: &Url) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(method, pattern, backend)
        }
    }

    /// Route requiring a verified token with one of the listed roles.
    /// Setting roles implies requiring auth, so the table invariant holds by
    /// construction.
    pub fn restricted(method: Method, pattern: &str, backend: &Url, roles: &[&str]) -> Self {
        Self {
            requires_auth: true,
            allowed_roles: roles.iter().map(|r| r.to_string()).collect(),
            ..Self::public(method, pattern, backend)
        }
    }
}

/// The static `(method, path) → backend + policy` table. Built once at
/// startup and injected into the pipeline.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Option<&RouteDescriptor> {
        self.resolve_entry(method, path).map(|(_, route)| route)
    }

    /// Like [`resolve`](Self::resolve) but also yields the table index, so
    /// callers can look up per-route state compiled in parallel with the
    /// table.
    pub fn resolve_entry(&self, method: &Method, path: &str) -> Option<(usize, &RouteDescriptor)> {
        self.routes
            .iter()
            .enumerate()
            .find(|(_, route)| route.method == *method && route.pattern.matches(path))
    }

    /// The full production table fronting the eight downstream services.
    ///
    /// Exact paths are declared before parameterized siblings
    /// (`/api/journeys/search` before `/api/journeys/:id`) because the first
    /// match wins.
    pub fn standard(services: &ServiceUrls) -> Self {
        use RouteDescriptor as R;

        const GET: Method = Method::GET;
        const POST: Method = Method::POST;
        const PATCH: Method = Method::PATCH;
        const DELETE: Method = Method::DELETE;

        let auth = &services.auth;
        let schedule = &services.schedule;
        let booking = &services.booking;
        let ticket = &services.ticket;
        let user = &services.user;
        let search = &services.search;
        let admin = &services.admin;
        let reporting = &services.reporting;

        let routes = vec![
            // Auth service: registration and session management.
            R::public(POST, "/api/auth/register", auth),
            R::public(POST, "/api/auth/login", auth),
            R::public(POST, "/api/auth/refresh-token", auth),
            R::authenticated(POST, "/api/auth/logout", auth),
            R::authenticated(GET, "/api/users/me", auth),
            R::authenticated(PATCH, "/api/users/me", auth),
            // Schedule service: trains, stations, routes, journeys.
            R::public(GET, "/api/trains", schedule),
            R::public(GET, "/api/trains/number/:trainNumber", schedule),
            R::public(GET, "/api/trains/:id", schedule),
            R::authenticated(POST, "/api/trains", schedule),
            R::public(GET, "/api/stations", schedule),
            R::public(GET, "/api/stations/code/:code", schedule),
            R::public(GET, "/api/stations/:id", schedule),
            R::authenticated(POST, "/api/stations", schedule),
            R::public(GET, "/api/routes", schedule),
            R::public(GET, "/api/routes/:id", schedule),
            R::authenticated(POST, "/api/routes", schedule),
            R::public(GET, "/api/journeys/search", schedule),
            R::public(GET, "/api/journeys/train/:trainId", schedule),
            R::public(GET, "/api/journeys/:id", schedule),
            R::authenticated(POST, "/api/journeys", schedule),
            // Booking service: all routes require a verified rider.
            R::authenticated(POST, "/api/bookings/create", booking),
            R::authenticated(GET, "/api/bookings", booking),
            R::authenticated(GET, "/api/bookings/:id", booking),
            R::authenticated(POST, "/api/bookings/:id/confirm", booking),
            R::authenticated(POST, "/api/bookings/:id/cancel", booking),
            // Ticket service.
            R::authenticated(GET, "/api/tickets/:id", ticket),
            R::authenticated(GET, "/api/tickets/:id/pdf", ticket),
            // User service: profile, passengers, preferences.
            R::authenticated(GET, "/api/user/profile", user),
            R::authenticated(PATCH, "/api/user/profile", user),
            R::authenticated(POST, "/api/user/change-password", user),
            R::authenticated(GET, "/api/user/passengers", user),
            R::authenticated(POST, "/api/user/passengers", user),
            R::authenticated(PATCH, "/api/user/passengers/:id", user),
            R::authenticated(DELETE, "/api/user/passengers/:id", user),
            R::authenticated(GET, "/api/user/preferences", user),
            R::authenticated(PATCH, "/api/user/preferences", user),
            // Search service: public queries, admin-only cache management.
            R::public(GET, "/api/search/journeys", search),
            R::public(GET, "/api/search/autocomplete", search),
            R::public(GET, "/api/search/suggestions", search),
            R::restricted(POST, "/api/search/cache/invalidate", search, &["ADMIN"]),
            R::restricted(GET, "/api/search/cache/stats", search, &["ADMIN"]),
            // Admin service.
            R::restricted(GET, "/api/admin/users", admin, &["ADMIN"]),
            R::restricted(GET, "/api/admin/users/:id", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/users/:id", admin, &["ADMIN"]),
            R::restricted(POST, "/api/admin/trains", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/trains/:id", admin, &["ADMIN"]),
            R::restricted(DELETE, "/api/admin/trains/:id", admin, &["ADMIN"]),
            R::restricted(POST, "/api/admin/stations", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/stations/:id", admin, &["ADMIN"]),
            R::restricted(DELETE, "/api/admin/stations/:id", admin, &["ADMIN"]),
            R::restricted(POST, "/api/admin/routes", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/routes/:id", admin, &["ADMIN"]),
            R::restricted(DELETE, "/api/admin/routes/:id", admin, &["ADMIN"]),
            R::restricted(POST, "/api/admin/journeys", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/journeys/:id", admin, &["ADMIN"]),
            R::restricted(DELETE, "/api/admin/journeys/:id", admin, &["ADMIN"]),
            R::restricted(GET, "/api/admin/bookings", admin, &["ADMIN"]),
            R::restricted(PATCH, "/api/admin/bookings/:id/status", admin, &["ADMIN"]),
            // Reporting service: admins and managers.
            R::restricted(GET, "/api/reports/bookings", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/bookings/export", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/revenue", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/revenue/export", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/trains", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/trains/export", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/users", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/users/export", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/daily", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/weekly", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/monthly", reporting, &["ADMIN", "MANAGER"]),
            R::restricted(GET, "/api/reports/dashboard", reporting, &["ADMIN", "MANAGER"]),
        ];

        Self::new(routes)
    }
}
