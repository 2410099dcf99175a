//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in precedence order
//! - Look up the matching route for a method and path
//! - Return matched route, wrong method, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Ordered by priority, then specificity: exact > parameter > wildcard
//! - Ties keep configuration order (stable sort)
//! - First match wins

use std::cmp::Reverse;

use axum::http::Method;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher::{PatternError, RouteKind, RouteParams, RoutePattern};

/// Errors raised while compiling the route table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {route:?}: {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("route {route:?}: invalid method {method:?}")]
    Method { route: String, method: String },
}

/// A compiled notification route.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub pattern: RoutePattern,
    pub method: Method,
    pub message: String,
    pub priority: u32,
}

impl Route {
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(&config.pattern).map_err(|source| RouteError::Pattern {
            route: config.name.clone(),
            source,
        })?;
        let method = config
            .method
            .to_ascii_uppercase()
            .parse::<Method>()
            .map_err(|_| RouteError::Method {
                route: config.name.clone(),
                method: config.method.clone(),
            })?;

        Ok(Self {
            name: config.name.clone(),
            pattern,
            method,
            message: config.message.clone(),
            priority: config.priority,
        })
    }

    pub fn kind(&self) -> RouteKind {
        self.pattern.kind()
    }
}

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: RouteParams,
    /// The matched path with captures substituted in.
    pub endpoint: String,
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Lookup<'a> {
    Matched(RouteMatch<'a>),
    /// The path matched at least one route, none for this method.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Ordered, immutable route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile and order the configured routes.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut routes = configs
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        routes.sort_by_key(|r| (Reverse(r.priority), Reverse(r.kind())));

        for route in &routes {
            tracing::debug!(
                route = %route.name,
                method = %route.method,
                pattern = route.pattern.as_str(),
                "Route registered"
            );
        }

        Ok(Self { routes })
    }

    /// Routes in the order they are tried.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first route matching the method and path.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.match_path(path) else {
                continue;
            };
            if route.method != *method {
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
                continue;
            }
            let endpoint = route.pattern.render(&params);
            return Lookup::Matched(RouteMatch {
                route,
                params,
                endpoint,
            });
        }

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_routes;

    fn route(name: &str, pattern: &str, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            pattern: pattern.into(),
            message: format!("{name} ok"),
            method: "POST".into(),
            priority,
        }
    }

    fn matched<'a>(table: &'a RouteTable, path: &str) -> RouteMatch<'a> {
        match table.lookup(&Method::POST, path) {
            Lookup::Matched(m) => m,
            other => panic!("expected a match for {path}, got {other:?}"),
        }
    }

    #[test]
    fn most_specific_route_wins_regardless_of_declaration_order() {
        let table = RouteTable::from_config(&[
            route("wild", "/n/*", 0),
            route("param", "/n/{param}", 0),
            route("exact", "/n", 0),
        ])
        .unwrap();

        let names: Vec<_> = table.routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["exact", "param", "wild"]);

        assert_eq!(matched(&table, "/n").route.name, "exact");
        assert_eq!(matched(&table, "/n/abc").route.name, "param");
        assert_eq!(matched(&table, "/n/a/b/c").route.name, "wild");
    }

    #[test]
    fn priority_overrides_specificity() {
        let table = RouteTable::from_config(&[
            route("param", "/n/{param}", 0),
            route("wild", "/n/*", 10),
        ])
        .unwrap();

        assert_eq!(matched(&table, "/n/abc").route.name, "wild");
    }

    #[test]
    fn default_routes_render_endpoints() {
        let table = RouteTable::from_config(&default_routes()).unwrap();

        let exact = matched(&table, "/interfazpagos/api/notificaciones");
        assert_eq!(exact.endpoint, "/interfazpagos/api/notificaciones");
        assert!(exact.params.is_empty());

        let param = matched(&table, "/interfazpagos/api/notificaciones/abc");
        assert_eq!(param.endpoint, "/interfazpagos/api/notificaciones/abc");
        assert_eq!(param.params.get("param").map(String::as_str), Some("abc"));

        let wild = matched(&table, "/interfazpagos/api/notificaciones/a/b/c");
        assert_eq!(wild.endpoint, "/interfazpagos/api/notificaciones/a/b/c");
        assert_eq!(wild.params.get("0").map(String::as_str), Some("a/b/c"));
    }

    #[test]
    fn wrong_method_and_unknown_path_are_distinguished() {
        let table = RouteTable::from_config(&default_routes()).unwrap();

        match table.lookup(&Method::GET, "/interfazpagos/api/notificaciones") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::POST]),
            other => panic!("unexpected lookup: {other:?}"),
        }
        assert!(matches!(table.lookup(&Method::POST, "/otra/ruta"), Lookup::NotFound));
    }

    #[test]
    fn invalid_route_is_reported_with_its_name() {
        let err = RouteTable::from_config(&[route("broken", "sin-barra", 0)]).unwrap_err();
        assert!(err.to_string().contains("broken"));

        let mut bad_method = route("m", "/m", 0);
        bad_method.method = "NOT A METHOD".into();
        assert!(matches!(
            RouteTable::from_config(&[bad_method]),
            Err(RouteError::Method { .. })
        ));
    }
}
