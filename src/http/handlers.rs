//! Built-in handlers served by the `courier` binary.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, RawPathParams},
    http::{Method, StatusCode, Uri},
    response::Response,
};
use serde::Serialize;

use crate::http::not_found::NotFoundRegistry;
use crate::http::response::render_json;
use crate::security::{MatchedRoute, RequesterApp};

#[derive(Debug, Serialize)]
struct Echo {
    route: String,
    pattern: String,
    method: String,
    path: String,
    params: BTreeMap<String, String>,
    public: bool,
    application: Option<String>,
}

/// Reports which route served the request and who called it.
pub async fn echo(
    Extension(registry): Extension<Arc<NotFoundRegistry>>,
    Extension(MatchedRoute(route)): Extension<MatchedRoute>,
    requester: Option<Extension<RequesterApp>>,
    params: RawPathParams,
    method: Method,
    uri: Uri,
) -> Response {
    let echo = Echo {
        route: route.name,
        pattern: route.pattern.to_string(),
        method: method.to_string(),
        path: uri.path().to_string(),
        params: params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        public: route.public,
        application: requester.map(|Extension(RequesterApp(app))| app.id),
    };
    render_json::<_, Infallible>(Ok(echo), StatusCode::OK, StatusCode::BAD_REQUEST, &registry)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

pub async fn health(Extension(registry): Extension<Arc<NotFoundRegistry>>) -> Response {
    render_json::<_, Infallible>(
        Ok(Health { status: "ok" }),
        StatusCode::OK,
        StatusCode::INTERNAL_SERVER_ERROR,
        &registry,
    )
}
