//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table and application list from configuration
//! - Bind named handlers to routes and create the Axum router
//! - Hand each request to the router of the route the gate resolved
//! - Wire up middleware (authentication gate, request ID, tracing, limits, timeout)
//! - Serve until the shutdown token fires

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Extension, State},
    handler::Handler,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CourierConfig, RouteConfig};
use crate::http::not_found::NotFoundRegistry;
use crate::routing::{Route, RouteError, RouteMethod, RouteTable};
use crate::security::{authentication_middleware, Application, Applications, Gate, MatchedRoute};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid route '{name}': {source}")]
    Route {
        name: String,
        #[source]
        source: RouteError,
    },

    #[error("no handler registered for route '{0}'")]
    MissingHandler(String),

    #[error("route name '{0}' is used twice")]
    DuplicateRoute(String),
}

type HandlerFactory = Arc<dyn Fn(MethodFilter) -> MethodRouter + Send + Sync>;

/// Handlers bound to routes by name.
#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: HashMap<String, HandlerFactory>,
    fallback: Option<HandlerFactory>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to the route called `name`.
    pub fn insert<H, T>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()> + Sync,
        T: 'static,
    {
        self.handlers.insert(name.into(), factory(handler));
        self
    }

    /// Handler for routes without a named binding.
    pub fn fallback<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()> + Sync,
        T: 'static,
    {
        self.fallback = Some(factory(handler));
        self
    }

    fn get(&self, name: &str) -> Option<&HandlerFactory> {
        self.handlers.get(name).or(self.fallback.as_ref())
    }
}

fn factory<H, T>(handler: H) -> HandlerFactory
where
    H: Handler<T, ()> + Sync,
    T: 'static,
{
    Arc::new(move |filter| on(filter, handler.clone()))
}

fn method_filter(method: RouteMethod) -> MethodFilter {
    match method {
        RouteMethod::Get => MethodFilter::GET,
        RouteMethod::Post => MethodFilter::POST,
        RouteMethod::Put => MethodFilter::PUT,
        RouteMethod::Patch => MethodFilter::PATCH,
        RouteMethod::Delete => MethodFilter::DELETE,
    }
}

/// Build the route table from configuration, keeping its order.
pub fn route_table(routes: &[RouteConfig]) -> Result<RouteTable, ServerError> {
    routes
        .iter()
        .map(|config| {
            Route::new(config.name.clone(), config.method, &config.path, config.public).map_err(
                |source| ServerError::Route {
                    name: config.name.clone(),
                    source,
                },
            )
        })
        .collect()
}

/// Single-route routers keyed by route name.
///
/// The gate resolves the route; the request is then handed to that route's
/// own router, so the handler that runs is always the one that was checked.
#[derive(Clone)]
struct RouteServices(Arc<HashMap<String, Router>>);

async fn dispatch_matched(State(services): State<RouteServices>, request: Request<Body>) -> Response {
    let Some(MatchedRoute(route)) = request.extensions().get::<MatchedRoute>().cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(router) = services.0.get(&route.name) else {
        tracing::error!(route = %route.name, "Resolved route has no router");
        return StatusCode::NOT_FOUND.into_response();
    };

    match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

/// Build the Axum router serving `table` behind the authentication gate.
pub fn build_router(
    table: Arc<RouteTable>,
    apps: Arc<Applications>,
    handlers: &HandlerSet,
    registry: Arc<NotFoundRegistry>,
    config: &CourierConfig,
) -> Result<Router, ServerError> {
    let mut services = HashMap::new();
    for route in table.routes() {
        let factory = handlers
            .get(&route.name)
            .ok_or_else(|| ServerError::MissingHandler(route.name.clone()))?;
        let router = Router::new().route(&route.pattern.to_axum_path(), factory(method_filter(route.method)));
        if services.insert(route.name.clone(), router).is_some() {
            return Err(ServerError::DuplicateRoute(route.name.clone()));
        }
    }

    let gate = Gate::new(table, apps);

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs));

    Ok(Router::new()
        .fallback(dispatch_matched)
        .with_state(RouteServices(Arc::new(services)))
        .layer(Extension(registry))
        .layer(middleware::from_fn_with_state(gate, authentication_middleware))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(timeout)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

/// HTTP server for the configured routes.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouteTable>,
    registry: Arc<NotFoundRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and handlers.
    pub fn new(config: &CourierConfig, handlers: &HandlerSet) -> Result<Self, ServerError> {
        let routes = Arc::new(route_table(&config.routes)?);
        let apps: Arc<Applications> = Arc::new(
            config
                .applications
                .iter()
                .cloned()
                .map(Application::from)
                .collect(),
        );
        let registry = Arc::new(NotFoundRegistry::new());

        tracing::info!(
            routes = routes.len(),
            applications = apps.len(),
            "Route table built"
        );

        let router = build_router(routes.clone(), apps, handlers, registry.clone(), config)?;
        Ok(Self {
            router,
            routes,
            registry,
        })
    }

    /// Registry consulted by the JSON writers; storage layers register their errors here.
    pub fn not_found_registry(&self) -> &Arc<NotFoundRegistry> {
        &self.registry
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicationConfig;

    fn config() -> CourierConfig {
        CourierConfig {
            routes: vec![
                RouteConfig {
                    name: "health".into(),
                    method: RouteMethod::Get,
                    path: "/health".into(),
                    public: true,
                },
                RouteConfig {
                    name: "order".into(),
                    method: RouteMethod::Get,
                    path: "/orders/:id".into(),
                    public: false,
                },
            ],
            applications: vec![ApplicationConfig {
                id: "billing".into(),
                key: "s3cret".into(),
            }],
            ..CourierConfig::default()
        }
    }

    #[test]
    fn test_route_table_keeps_order() {
        let table = route_table(&config().routes).unwrap();
        let names: Vec<_> = table.routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["health", "order"]);
    }

    #[test]
    fn test_route_table_rejects_empty_path() {
        let routes = vec![RouteConfig {
            name: "broken".into(),
            method: RouteMethod::Get,
            path: String::new(),
            public: true,
        }];
        assert!(matches!(
            route_table(&routes),
            Err(ServerError::Route { ref name, source: RouteError::EmptyPattern }) if name == "broken"
        ));
    }

    #[test]
    fn test_missing_handler() {
        let handlers = HandlerSet::new().insert("health", || async { "ok" });
        let err = HttpServer::new(&config(), &handlers).err().unwrap();
        assert!(matches!(err, ServerError::MissingHandler(name) if name == "order"));
    }

    #[test]
    fn test_duplicate_route_names_rejected() {
        let mut config = config();
        config.routes[1].name = "health".into();
        let handlers = HandlerSet::new().fallback(|| async { "ok" });
        let err = HttpServer::new(&config, &handlers).err().unwrap();
        assert!(matches!(err, ServerError::DuplicateRoute(name) if name == "health"));
    }

    #[test]
    fn test_fallback_handler_covers_unnamed_routes() {
        let handlers = HandlerSet::new().fallback(|| async { "ok" });
        let server = HttpServer::new(&config(), &handlers).unwrap();
        assert_eq!(server.routes().len(), 2);
    }
}
