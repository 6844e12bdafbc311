//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        chat_handler, get_chat_messages, get_group_detail, health_check, list_groups,
        live_feed_handler, notifications_handler, post_handler, push_notification, toggle_like,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket consumer server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(registry, chat_repository, post_repository, authenticator, clock, settings);
/// Server::new(Arc::new(state)).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// All routes, with request tracing.
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/chat", get(chat_handler))
            .route("/ws/live-feed", get(live_feed_handler))
            .route("/ws/post/{post_id}", get(post_handler))
            .route("/ws/notifications", get(notifications_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/chat/messages", get(get_chat_messages))
            .route("/api/posts/{post_id}/likes", post(toggle_like))
            .route("/api/users/{user_id}/notifications", post(push_notification))
            .route("/debug/groups", get(list_groups))
            .route("/debug/groups/{name}", get(get_group_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Hiroba server listening on {}", listener.local_addr()?);
        tracing::info!("Chat: ws://{}/ws/chat?token=<token>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
