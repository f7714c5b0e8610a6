//! Account calls (`/user/...`): auth, profile, addresses, favorites and
//! password management.

use refaccionaria_core::models::{Direccion, Favoritos, LoginResponse, UserProfile};
use refaccionaria_core::types::Email;
use refaccionaria_core::validation::{
    ChangePassword, Credenciales, DireccionUpdate, NuevaDireccion, PasswordResetConfirm,
    ProfileUpdate, Registro,
};
use refaccionaria_core::{DireccionId, RefaccionId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::{AccessToken, BackendClient, BackendError};

const PERFIL: &str = "/user/user-profile/";
const DIRECCIONES: &str = "/user/user-profile/direcciones/";
const FAVORITOS: &str = "/user/user-profile/favoritos/";

#[derive(Deserialize)]
struct UsuarioEnvelope {
    usuario: UserProfile,
}

#[derive(Deserialize)]
struct DireccionesEnvelope {
    #[serde(default)]
    direcciones: Vec<Direccion>,
}

#[derive(Deserialize)]
struct DireccionEnvelope {
    direccion: Direccion,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
    frontend_url: &'a str,
}

impl BackendClient {
    // =========================================================================
    // Auth
    // =========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` with per-field messages when the backend rejects
    /// the data (e.g. an email already in use).
    #[instrument(skip(self, registro), fields(email = %registro.email))]
    pub async fn registro(&self, registro: &Registro) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/user/registro/", None)
                .json(registro),
        )
        .await
    }

    /// Exchange credentials for access and refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` or `Validation` on bad credentials.
    #[instrument(skip(self, credenciales), fields(email = %credenciales.email))]
    pub async fn login(&self, credenciales: &Credenciales) -> Result<LoginResponse, BackendError> {
        self.send(
            self.request(Method::POST, "/user/login/", None)
                .json(credenciales),
        )
        .await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the access token is no longer valid.
    #[instrument(skip(self, token))]
    pub async fn perfil(&self, token: &AccessToken) -> Result<UserProfile, BackendError> {
        let envelope: UsuarioEnvelope = self
            .send(self.request(Method::GET, PERFIL, Some(token)))
            .await?;
        Ok(envelope.usuario)
    }

    /// Update the profile with the filled-in fields.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the backend rejects a field.
    #[instrument(skip(self, token, update))]
    pub async fn actualizar_perfil(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let envelope: UsuarioEnvelope = self
            .send(
                self.request(Method::PATCH, "/user/user-profile/update/", Some(token))
                    .json(update),
            )
            .await?;
        Ok(envelope.usuario)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// The address book.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn direcciones(&self, token: &AccessToken) -> Result<Vec<Direccion>, BackendError> {
        let envelope: DireccionesEnvelope = self
            .send(self.request(Method::GET, DIRECCIONES, Some(token)))
            .await?;
        Ok(envelope.direcciones)
    }

    /// Add an address.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the backend rejects a field.
    #[instrument(skip(self, token, nueva))]
    pub async fn crear_direccion(
        &self,
        token: &AccessToken,
        nueva: &NuevaDireccion,
    ) -> Result<Direccion, BackendError> {
        let envelope: DireccionEnvelope = self
            .send(
                self.request(Method::POST, DIRECCIONES, Some(token))
                    .json(nueva),
            )
            .await?;
        Ok(envelope.direccion)
    }

    /// Partially update an address.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address is not the user's.
    #[instrument(skip(self, token, update), fields(direccion_id = %id))]
    pub async fn actualizar_direccion(
        &self,
        token: &AccessToken,
        id: DireccionId,
        update: &DireccionUpdate,
    ) -> Result<Direccion, BackendError> {
        let envelope: DireccionEnvelope = self
            .send(
                self.request(Method::PATCH, &format!("{DIRECCIONES}{id}/"), Some(token))
                    .json(update),
            )
            .await?;
        Ok(envelope.direccion)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the address is not the user's.
    #[instrument(skip(self, token), fields(direccion_id = %id))]
    pub async fn eliminar_direccion(
        &self,
        token: &AccessToken,
        id: DireccionId,
    ) -> Result<(), BackendError> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("{DIRECCIONES}{id}/"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Favorite parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn favoritos(&self, token: &AccessToken) -> Result<Favoritos, BackendError> {
        self.send(self.request(Method::GET, FAVORITOS, Some(token)))
            .await
    }

    /// Mark a part as favorite.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if it already is one.
    #[instrument(skip(self, token), fields(refaccion_id = %refaccion))]
    pub async fn agregar_favorito(
        &self,
        token: &AccessToken,
        refaccion: RefaccionId,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, FAVORITOS, Some(token))
                .json(&json!({ "refaccion_id": refaccion })),
        )
        .await
    }

    /// Unmark a favorite.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if it was not a favorite.
    #[instrument(skip(self, token), fields(refaccion_id = %refaccion))]
    pub async fn quitar_favorito(
        &self,
        token: &AccessToken,
        refaccion: RefaccionId,
    ) -> Result<(), BackendError> {
        self.send_empty(self.request(
            Method::DELETE,
            &format!("{FAVORITOS}{refaccion}/"),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Password
    // =========================================================================

    /// Ask the backend to email a reset link pointing at `frontend_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, email))]
    pub async fn solicitar_reset_password(
        &self,
        email: &Email,
        frontend_url: &str,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/user/password-reset/request/", None)
                .json(&ResetRequest {
                    email: email.as_str(),
                    frontend_url,
                }),
        )
        .await
    }

    /// Check a reset link before showing the form.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `Api` when the link is invalid or expired.
    #[instrument(skip(self, token))]
    pub async fn validar_token_reset(&self, uid: &str, token: &str) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/user/password-reset/validate-token/", None)
                .json(&json!({ "uid": uid, "token": token })),
        )
        .await
    }

    /// Set a new password from a reset link.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the token is bad or the password is refused.
    #[instrument(skip(self, confirm))]
    pub async fn confirmar_reset_password(
        &self,
        confirm: &PasswordResetConfirm,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/user/password-reset/confirm/", None)
                .json(confirm),
        )
        .await
    }

    /// Change the password of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the current password is wrong.
    #[instrument(skip(self, token, change))]
    pub async fn cambiar_password(
        &self,
        token: &AccessToken,
        change: &ChangePassword,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.request(
                Method::POST,
                "/user/user-profile/change-password/",
                Some(token),
            )
            .json(change),
        )
        .await
    }
}
