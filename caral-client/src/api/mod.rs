// caral-client/src/api/mod.rs
// API gateway: typed operations over the backend HTTP contract

mod auth;
mod customers;
mod reservations;
mod rooms;
mod tables;

pub use rooms::RoomDeletion;

use crate::config::ClientConfig;
use crate::http::{ApiRequest, HttpClient, NetworkHttpClient};
use crate::session::SessionStore;
use crate::{ClientError, ClientResult};
use serde_json::Value;

/// Gateway to the reservation backend
///
/// Every authenticated call reads the bearer token from the injected
/// [`SessionStore`]. Without a session the call fails with
/// [`ClientError::NoSession`] and nothing is sent; a 401 ends the session and
/// surfaces as [`ClientError::Unauthorized`].
#[derive(Debug, Clone)]
pub struct ApiGateway<C: HttpClient = NetworkHttpClient> {
    http: C,
    session: SessionStore,
}

impl ApiGateway<NetworkHttpClient> {
    pub fn new(config: &ClientConfig, session: SessionStore) -> ClientResult<Self> {
        Ok(Self::with_transport(NetworkHttpClient::new(config)?, session))
    }

    /// Gateway with a session store bound to the configured session file.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let session = match &config.session_file {
            Some(path) => SessionStore::persistent(path),
            None => SessionStore::new(),
        };
        Self::new(config, session)
    }
}

impl<C: HttpClient> ApiGateway<C> {
    pub fn with_transport(http: C, session: SessionStore) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn transport(&self) -> &C {
        &self.http
    }

    /// Send an authenticated request.
    async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let token = self.session.token().ok_or(ClientError::NoSession)?;
        let path = request.path.clone();
        match self.http.execute(request, Some(&token)).await {
            Err(ClientError::Unauthorized) => {
                tracing::warn!(path = %path, "Token rejected, ending session");
                self.session.end();
                Err(ClientError::Unauthorized)
            }
            other => other,
        }
    }
}
