//! Auth payloads shared between the API client and the mock backend
//!
//! The backend identifies users by email; customers and staff share one login
//! endpoint and are told apart by the role on the returned user.

use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request (`POST /login`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
///
/// `success: false` comes back with a `message` and no token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Registration request (`POST /register`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub telefono: String,
    pub password: String,
}

/// Registration response; the user is sent as `user` or `usuario`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "usuario")]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

/// User role as far as this client cares
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    #[default]
    Customer,
    /// Any non-customer role (`admin`, `empleado`, ...), kept verbatim
    Staff(String),
}

impl UserRole {
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Staff(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "cliente",
            Self::Staff(role) => role,
        }
    }
}

impl From<String> for UserRole {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "" | "cliente" | "client" | "customer" => Self::Customer,
            _ => Self::Staff(raw),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

/// User information returned at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUserInfo")]
pub struct UserInfo {
    #[serde(rename = "id_usu")]
    pub id: i64,
    /// Customer record id when it differs from the user id
    #[serde(rename = "id_cliente", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(rename = "rol")]
    pub role: UserRole,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserInfo {
    /// Identifier to book reservations under.
    pub fn booking_id(&self) -> i64 {
        self.client_id.unwrap_or(self.id)
    }
}

#[derive(Deserialize)]
struct RawUserInfo {
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id_usu: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id_cliente: Option<i64>,
    #[serde(default)]
    rol: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<RawUserInfo> for UserInfo {
    type Error = String;

    fn try_from(raw: RawUserInfo) -> Result<Self, Self::Error> {
        let id = raw
            .id_usu
            .or(raw.id)
            .or(raw.id_cliente)
            .ok_or_else(|| "user without identifier".to_string())?;
        Ok(Self {
            id,
            client_id: raw.id_cliente.filter(|client_id| *client_id != id),
            role: UserRole::from(raw.rol.or(raw.role).unwrap_or_default()),
            display_name: raw.name.or(raw.nombre).unwrap_or_default(),
            email: raw.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_round_trips_through_canonical_names() {
        let user: UserInfo = serde_json::from_str(
            r#"{"id":3,"id_cliente":11,"role":"admin","nombre":"Rosa","email":"r@caral.pe"}"#,
        )
        .unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.booking_id(), 11);
        assert!(user.role.is_staff());

        let stored = serde_json::to_string(&user).unwrap();
        let restored: UserInfo = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn missing_role_means_customer() {
        let user: UserInfo = serde_json::from_str(r#"{"id_usu":5,"name":"Luis"}"#).unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.booking_id(), 5);
    }

    #[test]
    fn register_response_accepts_usuario_key() {
        let resp: RegisterResponse =
            serde_json::from_str(r#"{"token":"t","usuario":{"id_usu":9,"name":"Eva"}}"#).unwrap();
        assert_eq!(resp.user.map(|u| u.id), Some(9));
    }
}
