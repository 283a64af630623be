//! Router assembly and the serve loop.

use crate::error::request_id;
use crate::handlers;
use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch};
use bugtrack_core::Gateway;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

/// Build the full HTTP surface around `gateway`.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/bugs",
            get(handlers::list_bugs).post(handlers::create_bug),
        )
        .route(
            "/api/bugs/",
            get(handlers::list_bugs)
                .post(handlers::create_bug)
                .patch(handlers::missing_id)
                .delete(handlers::missing_id),
        )
        .route(
            "/api/bugs/{id}",
            patch(handlers::update_bug).delete(handlers::delete_bug),
        )
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::route_not_found)
        .layer(middleware::from_fn(log_request))
        .with_state(AppState { gateway })
}

/// One log line per request: method, path, status, latency and request id.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers());
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_secs_f64() * 1000.0,
        request_id = request_id.as_deref().unwrap_or("-"),
        "request"
    );
    response
}

/// Serve `gateway` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the accept loop fails.
pub async fn serve<F>(listener: TcpListener, gateway: Gateway, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve http")
}

/// A server running on its own thread and runtime.
///
/// Dropping the handle stops the server and waits for the thread.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL such as `http://127.0.0.1:38211`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("server thread panicked");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bind `addr` and serve `gateway` from a background thread.
///
/// Returns once the listener is bound, so the reported address is final
/// (useful with port `0`).
///
/// # Errors
///
/// Returns an error if the runtime cannot start or the address cannot be
/// bound.
pub fn spawn(gateway: Gateway, addr: SocketAddr) -> Result<ServerHandle> {
    let (ready_tx, ready_rx) = mpsc::channel::<std::io::Result<SocketAddr>>();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let thread = thread::Builder::new()
        .name("bugtrack-server".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            runtime.block_on(async move {
                let listener = match TcpListener::bind(addr).await {
                    Ok(listener) => listener,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(listener.local_addr());

                let shutdown = async {
                    let _ = shutdown_rx.await;
                };
                if let Err(err) = serve(listener, gateway, shutdown).await {
                    error!("server stopped: {err:#}");
                }
            });
        })
        .context("spawn server thread")?;

    let addr = ready_rx
        .recv()
        .map_err(|_| anyhow!("server thread exited before binding"))?
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "background server listening");

    Ok(ServerHandle {
        addr,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}
