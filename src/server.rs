use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;
use crate::store::AnswerStore;

/// State shared by every request handler.
///
/// The store was designed for a single owner; handlers run concurrently,
/// so it sits behind one lock. Mutating routes hold the write guard
/// across the whole read-modify-persist sequence.
pub struct AppState {
    pub store: RwLock<AnswerStore>,
}

impl AppState {
    pub fn new(store: AnswerStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// HTTP server
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: SharedState,
}

impl Server {
    /// Create and bind the HTTP server to the specified address
    pub async fn bind(addr: &str, store: AnswerStore) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        let state = Arc::new(AppState::new(store));

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept and serve requests until the process exits
    pub async fn run(self) -> anyhow::Result<()> {
        // The API is called from browser pages on arbitrary origins
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = routes::router()
            .with_state(self.state)
            .layer(TraceLayer::new_for_http())
            .layer(cors);

        info!("Server started, listening on {}", self.local_addr);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}
