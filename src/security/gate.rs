//! Authentication gate middleware.
//!
//! # State Machine
//! ```text
//! ReceivedRequest
//!     → OPTIONS: Preflight (answered empty, handler never runs)
//!     → RouteResolved
//!         → public:  PublicPass
//!         → private: PrivateChallenge → Granted | Denied(reason)
//! ```
//!
//! Granted requests carry a [`RequesterApp`] extension for the handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::{Route, RouteError, RouteTable};
use crate::security::applications::{Application, Applications};
use crate::security::basic_auth::authenticate;
use crate::security::AuthError;

/// Application that authenticated the current request.
#[derive(Debug, Clone)]
pub struct RequesterApp(pub Application);

/// Route the gate resolved for the current request.
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub Route);

/// Outcome of a request that is allowed through (or short-circuited).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Preflight,
    PublicPass(Route),
    Granted(Route, Application),
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl GateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::Route(_) => StatusCode::NOT_FOUND,
            GateError::Auth(e) => e.status_code(),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, self.to_string()).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"courier\""),
            );
        }
        response
    }
}

/// Shared, read-only state of the gate.
#[derive(Debug, Clone)]
pub struct Gate {
    routes: Arc<RouteTable>,
    apps: Arc<Applications>,
}

impl Gate {
    pub fn new(routes: Arc<RouteTable>, apps: Arc<Applications>) -> Self {
        Self { routes, apps }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide what happens to a request with the given method, path and headers.
    pub fn decide(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Decision, GateError> {
        if method == Method::OPTIONS {
            return Ok(Decision::Preflight);
        }

        let route = self.routes.resolve(method, path)?;
        if route.public {
            return Ok(Decision::PublicPass(route.clone()));
        }

        let app = authenticate(headers, &self.apps)?;
        Ok(Decision::Granted(route.clone(), app))
    }
}

pub async fn authentication_middleware(
    State(gate): State<Gate>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let decision = gate.decide(request.method(), request.uri().path(), request.headers());

    match decision {
        // Preflight requests are answered empty so the follow-up request,
        // which carries the credentials, is the one that gets checked.
        Ok(Decision::Preflight) => {
            metrics::record_gate_decision("preflight");
            StatusCode::OK.into_response()
        }
        Ok(Decision::PublicPass(route)) => {
            metrics::record_gate_decision("public");
            request.extensions_mut().insert(MatchedRoute(route));
            next.run(request).await
        }
        Ok(Decision::Granted(route, app)) => {
            tracing::debug!(route = %route.name, application = %app.id, "Request authenticated");
            metrics::record_gate_decision("granted");
            request.extensions_mut().insert(MatchedRoute(route));
            request.extensions_mut().insert(RequesterApp(app));
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = %e,
                "Request denied"
            );
            metrics::record_gate_decision("denied");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteMethod;
    use base64::{engine::general_purpose, Engine as _};

    fn gate() -> Gate {
        let routes = RouteTable::new(vec![
            Route::new("health", RouteMethod::Get, "/health", true).unwrap(),
            Route::new("orders", RouteMethod::Get, "/orders/:id", false).unwrap(),
        ]);
        let apps = Applications::new(vec![Application::new("billing", "s3cret")]);
        Gate::new(Arc::new(routes), Arc::new(apps))
    }

    fn auth_headers(credentials: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", general_purpose::STANDARD.encode(credentials));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn test_options_short_circuits() {
        let gate = gate();
        for path in ["/health", "/orders/1", "/nowhere"] {
            assert_eq!(
                gate.decide(&Method::OPTIONS, path, &HeaderMap::new()).unwrap(),
                Decision::Preflight
            );
        }
    }

    #[test]
    fn test_public_route_needs_no_credentials() {
        let decision = gate().decide(&Method::GET, "/health", &HeaderMap::new()).unwrap();
        assert!(matches!(decision, Decision::PublicPass(route) if route.name == "health"));
    }

    #[test]
    fn test_private_route_granted() {
        let decision = gate()
            .decide(&Method::GET, "/orders/7", &auth_headers("billing:s3cret"))
            .unwrap();
        match decision {
            Decision::Granted(route, app) => {
                assert_eq!(route.name, "orders");
                assert_eq!(app.id, "billing");
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn test_private_route_denied() {
        let gate = gate();
        let err = gate.decide(&Method::GET, "/orders/7", &HeaderMap::new()).unwrap_err();
        assert_eq!(err, GateError::Auth(AuthError::AuthFailed));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err = gate
            .decide(&Method::GET, "/orders/7", &auth_headers("billing:nope"))
            .unwrap_err();
        assert_eq!(err, GateError::Auth(AuthError::AuthFailed));
    }

    #[test]
    fn test_unknown_route() {
        let err = gate().decide(&Method::GET, "/invoices", &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, GateError::Route(RouteError::NotFound { .. })));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_response_carries_challenge() {
        let response = GateError::Auth(AuthError::ApplicationNotFound).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"courier\""
        );

        let response = GateError::Auth(AuthError::WrongAuthToken).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
