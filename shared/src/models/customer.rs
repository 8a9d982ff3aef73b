//! Customer directory entry (`GET /usuarios-clientes`)

use serde::{Deserialize, Serialize};

/// Customer the staff can book for
///
/// Directory rows identify the customer by `id_usu`, `id_cliente` or plain
/// `id` depending on the backend query; the first present wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomer")]
pub struct Customer {
    #[serde(rename = "id_usu")]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
struct RawCustomer {
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id_usu: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id_cliente: Option<i64>,
    #[serde(default, deserialize_with = "crate::util::opt_lenient_int::deserialize")]
    id: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    razon_social: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    telefono: Option<String>,
}

impl TryFrom<RawCustomer> for Customer {
    type Error = String;

    fn try_from(raw: RawCustomer) -> Result<Self, Self::Error> {
        let id = raw
            .id_usu
            .or(raw.id_cliente)
            .or(raw.id)
            .ok_or_else(|| "customer without identifier".to_string())?;
        Ok(Self {
            id,
            name: raw
                .name
                .or(raw.nombre)
                .or(raw.razon_social)
                .unwrap_or_default(),
            email: raw.email,
            phone: raw.telefono,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_present_identifier() {
        let customer: Customer =
            serde_json::from_str(r#"{"id_cliente":"8","id":3,"nombre":"Ana"}"#).unwrap();
        assert_eq!(customer.id, 8);
        assert_eq!(customer.name, "Ana");

        let missing = serde_json::from_str::<Customer>(r#"{"name":"Nadie"}"#);
        assert!(missing.is_err());
    }
}
