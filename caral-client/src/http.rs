// caral-client/src/http.rs
// HTTP transport: the only code that touches the network

use crate::config::ClientConfig;
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use shared::models::Attachment;
use shared::response::ErrorBody;

/// Header carrying the logical method when the wire method is POST
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// Request body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// Multipart form: text parts plus an optional file part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    pub fields: Vec<(&'static str, String)>,
    pub file: Option<(&'static str, Attachment)>,
}

impl MultipartForm {
    fn into_reqwest(self) -> ClientResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some((name, attachment)) = self.file {
            let mime = mime_guess::from_path(&attachment.file_name).first_or_octet_stream();
            let part = reqwest::multipart::Part::bytes(attachment.bytes)
                .file_name(attachment.file_name)
                .mime_str(mime.essence_str())?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

/// One backend call, independent of the transport that carries it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/reservas/5`
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Body,
    /// Logical method sent in [`METHOD_OVERRIDE_HEADER`]
    pub method_override: Option<Method>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            method_override: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> ClientResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("unserializable body: {e}")))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Send as POST while asking the backend to treat the call as `method`.
    pub fn overriding(mut self, method: Method) -> Self {
        self.method_override = Some(method);
        self.method = Method::POST;
        self
    }

    /// Method the backend acts on.
    pub fn effective_method(&self) -> &Method {
        self.method_override.as_ref().unwrap_or(&self.method)
    }
}

/// HTTP transport trait
///
/// Returns the decoded JSON body of a 2xx response, or the typed error for
/// anything else. Envelope unwrapping happens above this layer.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: ApiRequest, token: Option<&str>) -> ClientResult<Value>;
}

/// Network HTTP client on reqwest
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout {
            builder = builder.timeout(std::time::Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
        authenticated: bool,
    ) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(decode_success(text));
        }
        tracing::warn!(status = status.as_u16(), "Backend returned an error status");
        Err(error_from_status(status, &text, authenticated))
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn execute(&self, request: ApiRequest, token: Option<&str>) -> ClientResult<Value> {
        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));
        tracing::debug!(method = %request.effective_method(), path = %request.path, "Sending request");

        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(method) = &request.method_override {
            req = req.header(METHOD_OVERRIDE_HEADER, method.as_str());
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        // Multipart bodies set their own content type with the boundary.
        req = match request.body {
            Body::Empty => req,
            Body::Json(value) => req.json(&value),
            Body::Multipart(form) => req.multipart(form.into_reqwest()?),
        };

        let response = req.send().await?;
        self.handle_response(response, token.is_some()).await
    }
}

/// Empty bodies decode to `null`; non-JSON text is kept as a string.
fn decode_success(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Map a non-2xx response to a typed error.
///
/// A 401 on an authenticated call always means the session is gone. Without a
/// token (login) the server message is kept so the caller can show it.
pub(crate) fn error_from_status(status: StatusCode, body: &str, authenticated: bool) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.text().map(str::to_string));
    match (status, message) {
        (StatusCode::UNAUTHORIZED, Some(message)) if !authenticated => {
            ClientError::domain(status.as_u16(), &message)
        }
        (StatusCode::UNAUTHORIZED, _) => ClientError::Unauthorized,
        (StatusCode::FORBIDDEN, _) => ClientError::Forbidden,
        (_, Some(message)) => ClientError::domain(status.as_u16(), &message),
        (_, None) => ClientError::Status {
            status: status.as_u16(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_401_is_unauthorized_even_with_message() {
        let err = error_from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Unauthenticated."}"#,
            true,
        );
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(err.to_string(), "Session expired, please log in again");
    }

    #[test]
    fn anonymous_401_keeps_server_message() {
        let err = error_from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Credenciales inválidas"}"#,
            false,
        );
        assert!(matches!(err, ClientError::Domain { status: 401, .. }));
    }

    #[test]
    fn forbidden_has_fixed_message() {
        let err = error_from_status(StatusCode::FORBIDDEN, r#"{"message":"nope"}"#, true);
        assert_eq!(err.to_string(), "You are not authorized to perform this action");
    }

    #[test]
    fn unknown_error_shape_carries_status_code() {
        let err = error_from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", true);
        assert!(matches!(err, ClientError::Status { status: 502 }));
        assert!(err.to_string().contains("502"));

        let err = error_from_status(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"Mesa duplicada"}"#, true);
        assert_eq!(err.to_string(), "Mesa duplicada");
    }

    #[test]
    fn success_bodies_decode_leniently() {
        assert_eq!(decode_success(String::new()), Value::Null);
        assert_eq!(decode_success("Reserva creada".into()), Value::String("Reserva creada".into()));
        assert_eq!(decode_success(r#"{"id":1}"#.into())["id"], 1);
    }

    #[test]
    fn override_sends_post() {
        let req = ApiRequest::put("/ajustes/mesas/3").overriding(Method::PUT);
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.effective_method(), &Method::PUT);
    }
}
