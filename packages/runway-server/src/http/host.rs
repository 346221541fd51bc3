//! Axum host adapter.
//!
//! There is deliberately no path routing: every path falls back to one
//! handler that reads the `action` query field and runs a full dispatch
//! cycle. Config-load failures happen at build time, before this router
//! exists, so the fatal no-config path never reaches HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response as AxumResponse};
use axum::Router;
use tracing::info;

use super::{Request, Response};
use crate::app::App;

/// Builds the host router: a single fallback route into the dispatcher.
pub fn router(app: Arc<App>) -> Router {
    Router::new().fallback(dispatch_handler).with_state(app)
}

/// Binds `addr` and serves dispatch cycles until the task is dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server hits a
/// fatal I/O error.
pub async fn serve(app: Arc<App>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(app)).await?;
    Ok(())
}

async fn dispatch_handler(
    State(app): State<Arc<App>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AxumResponse {
    let mut request = Request::new(method.as_str());
    for (key, value) in &query {
        request = request.with_query(key, value);
    }
    for (name, value) in &headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    // Urlencoded bodies become body fields. The extractor reads the query
    // string on GET/HEAD, which is already covered above, and rejects
    // non-form bodies; both cases leave the body map empty.
    if method != Method::GET && method != Method::HEAD {
        if let Ok(Form(fields)) = form {
            for (key, value) in &fields {
                request = request.with_body(key, value);
            }
        }
    }

    let mut response = Response::new();
    app.handle(&request, &mut response);
    into_axum(&response)
}

/// Converts the buffered response into an axum response. Headers that do
/// not survive the trip into typed form are skipped rather than failing the
/// whole response.
fn into_axum(buffered: &Response) -> AxumResponse {
    let status = StatusCode::from_u16(buffered.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, buffered.body().to_vec()).into_response();
    for (name, value) in buffered.headers() {
        let Ok(name) = HeaderName::try_from(name.as_str()) else {
            continue;
        };
        let Ok(value) = HeaderValue::try_from(value.as_str()) else {
            continue;
        };
        response.headers_mut().insert(name, value);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
