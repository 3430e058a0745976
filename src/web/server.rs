//! Web server using Axum.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use super::router::create_app_router;
use crate::config::ServerConfig;
use crate::core::QueueService;
use crate::error::{Error, Result};

/// Bind `config.host:config.port` and serve the queue API until `shutdown` resolves.
pub async fn run_server<F>(config: &ServerConfig, service: Arc<QueueService>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Web(format!("Invalid address: {}", e)))?;

    let listener = TcpListener::bind(addr).await?;
    serve(listener, service, shutdown).await
}

/// Serve the queue API on an already bound listener.
pub async fn serve<F>(listener: TcpListener, service: Arc<QueueService>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app_router(service).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    tracing::info!("Starting web server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

/// Resolves on Ctrl+C (or SIGTERM on unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationQueue;

    #[tokio::test]
    async fn test_invalid_address() {
        let (queue, _rx) = NotificationQueue::channel(4);
        let config = ServerConfig {
            host: "not a host".to_string(),
            port: 8081,
        };

        let result = run_server(&config, Arc::new(QueueService::new(queue)), async {}).await;
        assert!(matches!(result, Err(Error::Web(_))));
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let (queue, _rx) = NotificationQueue::channel(4);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, Arc::new(QueueService::new(queue)), async {
            let _ = rx.await;
        }));

        let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "OK");

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_address_in_use() {
        let (queue, _rx) = NotificationQueue::channel(4);
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
        };

        let result = run_server(&config, Arc::new(QueueService::new(queue)), async {}).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
