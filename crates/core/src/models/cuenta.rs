//! Account resources (`/user/...`).

use serde::{Deserialize, Serialize};

use super::Refaccion;
use crate::types::{DireccionId, RefaccionId, TipoLugar, UserId};

/// A delivery address from the customer's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direccion {
    pub id: DireccionId,
    pub nombre: String,
    pub street: String,
    pub colony: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraInfo,
}

impl Direccion {
    /// Single-line address, preferring the backend's rendering.
    #[must_use]
    pub fn full_address(&self) -> String {
        match self.full_address.as_deref() {
            Some(full) if !full.is_empty() => full.to_owned(),
            _ => format!(
                "{}, {}, {}, {}, C.P. {}",
                self.street, self.colony, self.city, self.state, self.postal_code
            ),
        }
    }
}

/// Delivery details captured after an address is selected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraInfo {
    #[serde(default)]
    pub tipo_lugar: Option<TipoLugar>,
    #[serde(default)]
    pub barrio_privado: bool,
    #[serde(default)]
    pub conserjeria: bool,
    #[serde(default)]
    pub nombre_lugar: Option<String>,
    #[serde(default)]
    pub horario_apertura: Option<String>,
    #[serde(default)]
    pub horario_cierre: Option<String>,
    #[serde(default)]
    pub horario_24hs: bool,
}

/// The signed-in customer's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub address_street: Option<String>,
    #[serde(default)]
    pub address_colony: Option<String>,
    #[serde(default)]
    pub address_city: Option<String>,
    #[serde(default)]
    pub address_state: Option<String>,
    #[serde(default)]
    pub address_postal_code: Option<String>,
    #[serde(default)]
    pub address_references: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

impl UserProfile {
    /// Full name, or the username when no name was given.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

/// Response of `GET /user/user-profile/favoritos/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favoritos {
    #[serde(default)]
    pub favoritos: Vec<Refaccion>,
    #[serde(default)]
    pub total: u64,
}

impl Favoritos {
    #[must_use]
    pub fn ids(&self) -> Vec<RefaccionId> {
        self.favoritos.iter().map(|r| r.id).collect()
    }
}

/// The `usuario` member of the login response: the username, or the whole
/// profile on newer backends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LoginUsuario {
    Nombre(String),
    Perfil(Box<UserProfile>),
}

/// Body returned by `POST /user/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub usuario: LoginUsuario,
    pub access: String,
    pub refresh: String,
}

impl LoginResponse {
    #[must_use]
    pub fn username(&self) -> &str {
        match &self.usuario {
            LoginUsuario::Nombre(name) => name,
            LoginUsuario::Perfil(perfil) => &perfil.username,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_direccion_full_address_fallback() {
        let direccion: Direccion = serde_json::from_value(json!({
            "id": 1,
            "nombre": "Casa",
            "street": "Av. Juárez 10",
            "colony": "Centro",
            "city": "Puebla",
            "state": "Puebla",
            "postal_code": "72000",
            "horario_24hs": true
        }))
        .unwrap();
        assert_eq!(
            direccion.full_address(),
            "Av. Juárez 10, Centro, Puebla, Puebla, C.P. 72000"
        );
        assert!(!direccion.is_primary);
        assert!(direccion.extra.horario_24hs);
    }

    #[test]
    fn test_login_response_username_shapes() {
        let plain: LoginResponse = serde_json::from_value(json!({
            "usuario": "jperez",
            "access": "a",
            "refresh": "r"
        }))
        .unwrap();
        assert_eq!(plain.username(), "jperez");

        let full: LoginResponse = serde_json::from_value(json!({
            "usuario": { "username": "ana", "email": "ana@correo.mx" },
            "access": "a",
            "refresh": "r"
        }))
        .unwrap();
        assert_eq!(full.username(), "ana");
    }

    #[test]
    fn test_display_name() {
        let mut user = UserProfile {
            username: "jperez".into(),
            ..UserProfile::default()
        };
        assert_eq!(user.display_name(), "jperez");
        user.first_name = "Juan".into();
        user.last_name = "Pérez".into();
        assert_eq!(user.display_name(), "Juan Pérez");
    }
}
