//! # HTTP listener.
//!
//! Translates plain-text HTTP requests into registry calls:
//!
//! | request               | effect                                                |
//! |-----------------------|-------------------------------------------------------|
//! | `GET /`               | `303 See Other` to `/hosts`                           |
//! | `GET /hosts`          | one `<name> <address> <rfc3339>` line per host, by name |
//! | `POST /hosts/{name}`  | heartbeat for `name` from the peer's IP address       |
//! | anything else         | `404 Not Found`                                       |
//!
//! A trailing slash on `/hosts/` and `/hosts/{name}/` is accepted. Every
//! response body, empty ones included, is `text/plain`.
//!
//! Ordering by name is done here; the registry itself returns hosts unordered.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::any;
use tokio::net::TcpListener;
use tracing::debug;

use crate::core::Warden;

/// Builds the router. Handlers need `ConnectInfo<SocketAddr>`; see [`serve`].
pub fn router(warden: Arc<Warden>) -> Router {
    Router::new()
        .route("/", any(root))
        .route("/hosts", any(list_hosts))
        .route("/hosts/", any(list_hosts))
        .route("/hosts/{name}", any(heartbeat))
        .route("/hosts/{name}/", any(heartbeat))
        .fallback(not_found)
        .with_state(warden)
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, warden: Arc<Warden>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(warden).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn root(method: Method) -> Response {
    if method != Method::GET {
        return not_found().await.into_response();
    }
    Redirect::to("/hosts").into_response()
}

async fn list_hosts(method: Method, State(warden): State<Arc<Warden>>) -> Response {
    if method != Method::GET {
        return not_found().await.into_response();
    }

    let mut hosts = warden.hosts().await;
    hosts.sort_unstable_by(|a, b| a.name.cmp(&b.name));

    let mut body = String::new();
    for h in &hosts {
        body.push_str(&h.name);
        body.push(' ');
        body.push_str(&h.address);
        body.push(' ');
        body.push_str(&h.last_heartbeat_rfc3339());
        body.push('\n');
    }
    body.into_response()
}

async fn heartbeat(
    method: Method,
    State(warden): State<Arc<Warden>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(name): Path<String>,
) -> Response {
    if method != Method::POST {
        return not_found().await.into_response();
    }

    let address = peer.ip().to_string();
    debug!(host = %name, %address, "heartbeat received");
    warden.heartbeat(&name, &address).await;
    (StatusCode::OK, "").into_response()
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}
