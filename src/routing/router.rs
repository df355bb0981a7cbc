//! Route table and lookup.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Resolve a (method, path) pair to the longest-matching route
//! - Return an explicit `NotFound` rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, read without locks)
//! - O(n) scan over routes (acceptable for typical route counts)
//! - Ties go to the earliest registered route

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::matcher::PathPattern;

/// Errors produced while building or querying the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Route not found")]
    NotFound { method: String, path: String },

    #[error("Route pattern must not be empty")]
    EmptyPattern,

    #[error("Unsupported route method: {0}")]
    UnsupportedMethod(String),
}

/// Methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMethod {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RouteMethod::Get),
            "POST" => Ok(RouteMethod::Post),
            "PUT" => Ok(RouteMethod::Put),
            "PATCH" => Ok(RouteMethod::Patch),
            "DELETE" => Ok(RouteMethod::Delete),
            other => Err(RouteError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl TryFrom<&Method> for RouteMethod {
    type Error = RouteError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<RouteMethod> for Method {
    fn from(method: RouteMethod) -> Self {
        match method {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Put => Method::PUT,
            RouteMethod::Patch => Method::PATCH,
            RouteMethod::Delete => Method::DELETE,
        }
    }
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Name of the handler bound to this route.
    pub name: String,
    pub method: RouteMethod,
    pub pattern: PathPattern,
    /// Public routes skip authentication.
    pub public: bool,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        method: RouteMethod,
        path: &str,
        public: bool,
    ) -> Result<Self, RouteError> {
        if path.is_empty() {
            return Err(RouteError::EmptyPattern);
        }
        Ok(Self {
            name: name.into(),
            method,
            pattern: PathPattern::parse(path),
            public,
        })
    }
}

/// Ordered collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Appends a route; registration order breaks ties.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route with the same method and the longest matching prefix.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<&Route, RouteError> {
        let not_found = || {
            tracing::debug!(method = %method, path = %path, "No route matched");
            metrics::record_route_miss(method.as_str());
            RouteError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            }
        };

        // HEAD is served by the GET route, as axum does.
        let lookup = if method == Method::HEAD {
            RouteMethod::try_from(&Method::GET)
        } else {
            RouteMethod::try_from(method)
        };
        let Ok(method) = lookup else {
            return Err(not_found());
        };

        let mut best: Option<(&Route, usize)> = None;
        for route in self.routes.iter().filter(|r| r.method == method) {
            let length = route.pattern.matching_prefix_len(path);
            if length == 0 {
                continue;
            }
            match best {
                Some((_, longest)) if length <= longest => {}
                _ => best = Some((route, length)),
            }
        }

        best.map(|(route, _)| route).ok_or_else(not_found)
    }
}

impl FromIterator<Route> for RouteTable {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
