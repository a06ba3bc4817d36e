//! `BirdServer` builder and serve loop.
//!
//! This is the composition root: it picks the authenticator and store,
//! wires persistence into the room managers, restores saved rooms, and
//! mounts the routes.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use bird_auth::{Authenticator, JwtAuthenticator};
use bird_store::{FileStore, PersistQueue, Store};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, StreamConfig};
use crate::error::BirdError;
use crate::routes;
use crate::state::AppState;

/// Builder for configuring and starting a Bird server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), bird::BirdError> {
/// let server = bird::BirdServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BirdServerBuilder {
    config: ServerConfig,
    authenticator: Option<Arc<dyn Authenticator>>,
    store: Option<Arc<dyn Store>>,
}

impl BirdServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            authenticator: None,
            store: None,
        }
    }

    /// Replaces every setting.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the stream settings.
    pub fn stream_config(mut self, stream: StreamConfig) -> Self {
        self.config.stream = stream;
        self
    }

    /// Uses `auth` instead of a [`JwtAuthenticator`] over the configured
    /// secret.
    pub fn authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(auth);
        self
    }

    /// Persists rooms to `store` instead of the configured data directory.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Binds the listener, restores saved rooms, and returns a server
    /// ready to [`run`](BirdServer::run).
    pub async fn build(self) -> Result<BirdServer, BirdError> {
        let config = self.config;
        let auth = self
            .authenticator
            .unwrap_or_else(|| Arc::new(JwtAuthenticator::new(&config.jwt_secret)));

        let store: Option<Arc<dyn Store>> = match (self.store, &config.data_dir) {
            (Some(store), _) => Some(store),
            (None, Some(dir)) => Some(Arc::new(FileStore::open(dir.clone()).await?)),
            (None, None) => None,
        };

        let (state, persist) = match store {
            Some(store) => {
                let (queue, _writer) = PersistQueue::spawn(Arc::clone(&store));
                let state = AppState::persisted(
                    auth,
                    config.manager.clone(),
                    config.stream,
                    &queue,
                );
                let restored = state.restore(store.as_ref()).await?;
                tracing::info!(restored, "rooms restored");
                (state, Some(queue))
            }
            None => (AppState::new(auth, config.manager.clone(), config.stream), None),
        };

        let listener = TcpListener::bind(&config.bind_addr).await?;
        Ok(BirdServer {
            listener,
            state,
            persist,
        })
    }
}

impl Default for BirdServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Bird server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct BirdServer {
    listener: TcpListener,
    state: AppState,
    persist: Option<PersistQueue>,
}

impl BirdServer {
    /// Creates a new builder.
    pub fn builder() -> BirdServerBuilder {
        BirdServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The state shared by every handler.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The full application router.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Serves until Ctrl-C.
    pub async fn run(self) -> Result<(), BirdError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serves until `shutdown` completes, then waits for every snapshot
    /// queued so far to be written.
    ///
    /// Open event streams end as soon as `shutdown` fires, so they do not
    /// hold up the graceful drain.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), BirdError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let state = self.state.clone();
        tracing::info!(addr = ?self.listener.local_addr().ok(), "bird server running");

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("shutting down");
                state.begin_shutdown();
            })
            .await?;

        if let Some(queue) = self.persist {
            queue.flush().await;
        }
        tracing::info!("bird server stopped");
        Ok(())
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", routes::api())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
