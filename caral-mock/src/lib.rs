//! caral-mock - in-memory stand-in for the Caral reservation backend
//!
//! Serves the same routes, envelopes and error bodies as the real backend
//! so the client can be exercised end to end. [`MockServer`] runs it on an
//! ephemeral port inside a test; the `caral-mock` binary runs it standalone.

pub mod api;
pub mod error;
pub mod state;

pub use api::API_PREFIX;
pub use error::{MockError, MockResult};
pub use state::{MockState, RequestRecord, Store};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Full application with the API nested under [`API_PREFIX`].
pub fn app(state: Arc<MockState>) -> Router {
    Router::new()
        .nest(API_PREFIX, api::router(state))
        .layer(TraceLayer::new_for_http())
}

/// Mock backend running on a local ephemeral port
///
/// The server task is aborted on drop.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start with the seeded store.
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(MockState::seeded()).await
    }

    pub async fn spawn_with(state: MockState) -> std::io::Result<Self> {
        let state = Arc::new(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = app(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Mock server error: {e}");
            }
        });
        tracing::debug!(%addr, "Mock backend listening");
        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    pub fn state(&self) -> &Arc<MockState> {
        &self.state
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<RequestRecord> {
        self.state.store.lock().await.requests.clone()
    }

    /// `"METHOD /path"` lines of [`Self::requests`].
    pub async fn request_lines(&self) -> Vec<String> {
        self.requests().await.iter().map(RequestRecord::line).collect()
    }

    pub async fn clear_requests(&self) {
        self.state.store.lock().await.requests.clear();
    }

    /// Make `DELETE /ajustes/mesas/{table_id}` fail with a 500.
    pub async fn fail_table_delete(&self, table_id: i64) {
        self.state
            .store
            .lock()
            .await
            .failing_table_deletes
            .insert(table_id);
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
