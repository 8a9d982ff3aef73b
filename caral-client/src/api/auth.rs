//! Login, registration and logout

use super::ApiGateway;
use crate::http::{ApiRequest, HttpClient};
use crate::session::Session;
use crate::{ClientError, ClientResult};
use serde_json::Value;
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

const LOGIN_REJECTED: &str = "Invalid email or password";
const REGISTER_REJECTED: &str = "Registration failed";

impl<C: HttpClient> ApiGateway<C> {
    /// Log in and start a session.
    ///
    /// `success: false` and HTTP 401 both become [`ClientError::Auth`].
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = ApiRequest::post("/login").json(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        let body = self.send_credentials(request, LOGIN_REJECTED).await?;
        let response: LoginResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("login: {e}")))?;

        match response {
            LoginResponse {
                success: true,
                token: Some(token),
                user: Some(user),
                ..
            } => {
                let session = Session::new(token, user);
                self.session.begin(session.clone());
                tracing::info!(user_id = session.user.id, staff = session.is_staff(), "Logged in");
                Ok(session)
            }
            LoginResponse { message, .. } => {
                Err(ClientError::Auth(message.unwrap_or_else(|| LOGIN_REJECTED.into())))
            }
        }
    }

    /// Register a customer account; a returned token starts a session.
    pub async fn register(&self, form: &RegisterRequest) -> ClientResult<Session> {
        let request = ApiRequest::post("/register").json(form)?;
        let body = self.send_credentials(request, REGISTER_REJECTED).await?;
        let response: RegisterResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("register: {e}")))?;

        match response {
            RegisterResponse {
                token: Some(token),
                user: Some(user),
                ..
            } => {
                let session = Session::new(token, user);
                self.session.begin(session.clone());
                tracing::info!(user_id = session.user.id, "Registered and logged in");
                Ok(session)
            }
            RegisterResponse { message, .. } => {
                Err(ClientError::Auth(message.unwrap_or_else(|| REGISTER_REJECTED.into())))
            }
        }
    }

    /// End the session. The backend call is best-effort; local state is
    /// always cleared.
    pub async fn logout(&self) {
        if let Some(token) = self.session.token() {
            if let Err(e) = self.http.execute(ApiRequest::post("/logout"), Some(&token)).await {
                tracing::warn!("Logout request failed: {}", e);
            }
        }
        self.session.end();
        tracing::info!("Logged out");
    }

    /// Unauthenticated credential exchange; server rejections become `Auth`.
    async fn send_credentials(&self, request: ApiRequest, fallback: &str) -> ClientResult<Value> {
        match self.http.execute(request, None).await {
            Ok(body) => Ok(body),
            Err(ClientError::Domain { message, .. }) => Err(ClientError::Auth(message)),
            Err(ClientError::Unauthorized) => Err(ClientError::Auth(fallback.to_string())),
            Err(e) => Err(e),
        }
    }
}
