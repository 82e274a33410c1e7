//! Picks the single route a run probes.
//!
//! Candidates come from an external route detector and are treated as
//! read-only. The choice is a pure function of the candidate list, so the
//! same list always yields the same target.

use crate::types::DEFAULT_ROUTE;

/// Path fragments that mark a route as authentication-like or stateful.
const GUARDED_FRAGMENTS: [&str; 6] = ["auth", "login", "register", "cart", "orders", "users"];

/// Subset of [`GUARDED_FRAGMENTS`] that means "needs credentials".
const AUTH_FRAGMENTS: [&str; 3] = ["auth", "login", "register"];

/// Bare roots that answer like a health check.
const ROOT_ROUTES: [&str; 2] = ["/", "/api"];

/// Precedence class of a candidate route; lower ranks win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RouteClass {
    Health,
    ReadOnly,
    Unauthenticated,
    Other,
}

pub fn classify_route(route: &str) -> RouteClass {
    let lower = route.trim().to_ascii_lowercase();

    if has_placeholder(route) {
        return RouteClass::Other;
    }
    if lower.contains("health") || ROOT_ROUTES.contains(&lower.as_str()) {
        return RouteClass::Health;
    }
    if !GUARDED_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return RouteClass::ReadOnly;
    }
    if !AUTH_FRAGMENTS.iter().any(|f| lower.contains(f)) {
        return RouteClass::Unauthenticated;
    }
    RouteClass::Other
}

/// True for `/items/:id`, `/items/{id}`, `/items/<id>` and wildcard segments.
fn has_placeholder(route: &str) -> bool {
    route.split('/').any(|segment| {
        segment.starts_with(':')
            || segment.contains('{')
            || segment.contains('<')
            || segment.contains('*')
    })
}

/// First candidate of the best class; falls back to the first candidate, then
/// to [`DEFAULT_ROUTE`].
pub fn select_route(candidates: &[String]) -> String {
    let best = [
        RouteClass::Health,
        RouteClass::ReadOnly,
        RouteClass::Unauthenticated,
    ]
    .into_iter()
    .find_map(|class| candidates.iter().find(|r| classify_route(r) == class));

    match best.or_else(|| candidates.first()) {
        Some(route) => normalize(route),
        None => DEFAULT_ROUTE.to_string(),
    }
}

fn normalize(route: &str) -> String {
    let trimmed = route.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
