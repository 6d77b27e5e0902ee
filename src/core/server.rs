// Listener setup and graceful shutdown

use anyhow::{bail, Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    serve, Router,
};
use std::net::SocketAddr;
use tokio::net::{TcpListener, UnixListener};
use tokio::signal;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

use crate::core::config::ServerConfig;

/// Cross-origin policy for the browser frontend. Cookies only travel cross-site
/// with credentials allowed, which in turn requires an explicit origin.
pub fn cors_layer(config: &ServerConfig) -> Result<Option<CorsLayer>> {
    let Some(frontend_url) = &config.frontend_url else {
        return Ok(None);
    };

    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
        .context(format!("Invalid frontend_url '{}'", frontend_url))?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::CONTENT_TYPE]),
    ))
}

/// Wrap the router in the request tracing and CORS layers
pub fn with_middleware(app: Router, config: &ServerConfig) -> Result<Router> {
    let app = match cors_layer(config)? {
        Some(cors) => {
            info!(origin = ?config.frontend_url, "CORS enabled for frontend origin");
            app.layer(cors)
        }
        None => app,
    };

    Ok(app.layer(
        ServiceBuilder::new().layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        ),
    ))
}

async fn spawn_tcp(app: Router, port: u16) -> Result<JoinHandle<Result<()>>> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "TCP listener bound successfully");

    Ok(tokio::spawn(async move {
        serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("TCP server error")
    }))
}

fn spawn_unix(app: Router, path: &std::path::Path) -> Result<JoinHandle<Result<()>>> {
    if path.exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to remove existing Unix socket: {}", path.display()))?;
    }

    let listener = UnixListener::bind(path)
        .context(format!("Failed to bind Unix socket listener to {}", path.display()))?;

    info!(path = %path.display(), "Unix socket listener bound successfully");

    let mut make_service = app.into_make_service();
    Ok(tokio::spawn(async move {
        use tower::Service;

        loop {
            let (socket, _remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "Failed to accept Unix socket connection");
                    continue;
                }
            };

            let tower_service = match make_service.call(&socket).await {
                Ok(svc) => svc,
                Err(infallible) => match infallible {},
            };

            tokio::spawn(async move {
                let socket = hyper_util::rt::TokioIo::new(socket);

                let hyper_service =
                    hyper::service::service_fn(move |request: hyper::Request<hyper::body::Incoming>| {
                        tower_service.clone().call(request)
                    });

                if let Err(err) =
                    hyper_util::server::conn::auto::Builder::new(hyper_util::rt::TokioExecutor::new())
                        .serve_connection_with_upgrades(socket, hyper_service)
                        .await
                {
                    error!(error = %err, "Error serving Unix socket connection");
                }
            });
        }
    }))
}

/// Bind every configured listener and run until shutdown
pub async fn run(app: Router, config: &ServerConfig) -> Result<()> {
    let tcp_handle = match config.port {
        Some(port) => Some(spawn_tcp(app.clone(), port).await?),
        None => None,
    };

    let unix_handle = match &config.unix_socket {
        Some(path) => Some(spawn_unix(app, path)?),
        None => None,
    };

    info!("HTTP server(s) started, waiting for shutdown signal");

    match (tcp_handle, unix_handle) {
        (Some(tcp), Some(unix)) => {
            tokio::select! {
                result = tcp => log_exit("TCP", result),
                result = unix => log_exit("Unix socket", result),
            }
        }
        (Some(tcp), None) => log_exit("TCP", tcp.await),
        (None, Some(unix)) => log_exit("Unix socket", unix.await),
        (None, None) => bail!("No listeners configured"),
    }

    info!("Shutting down gracefully");
    Ok(())
}

fn log_exit(listener: &str, result: std::result::Result<Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(listener, error = %e, "Server stopped with an error"),
        Err(e) => error!(listener, error = %e, "Server task failed"),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
