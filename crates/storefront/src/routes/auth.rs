//! Authentication route handlers.
//!
//! Login, registration, logout and password reset against the backend's
//! `/user/...` endpoints. Login stores the JWT pair in cookies; see
//! [`crate::middleware::auth`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use refaccionaria_core::validation::{
    LoginForm, PasswordResetConfirmForm, PasswordResetRequestForm, PasswordStrength, RegistroForm,
};
use refaccionaria_core::{ActionState, SERVICE_UNAVAILABLE};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::BackendError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::middleware::auth::{login_cookies, logout_cookies, set_cookies};
use crate::respond::{backend_failure, negotiate, redirect_after};
use crate::state::AppState;
use crate::views::Layout;

const LOGIN_FAILED: &str = "Correo o contraseña incorrectos";
const RESET_SENT: &str = "Si el correo existe, recibirás un enlace para restablecer tu contraseña";

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    pub registered: Option<String>,
    pub reset: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub state: ActionState<()>,
    pub email: String,
    pub next: String,
    pub notice: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/registro.html")]
pub struct RegistroTemplate {
    pub layout: Layout,
    pub state: ActionState<()>,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: Layout,
    pub state: ActionState<()>,
    pub email: String,
    pub sent: Option<&'static str>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: Layout,
    pub state: ActionState<()>,
    pub uid: String,
    pub token: String,
    /// The link was rejected by the backend; no form is shown.
    pub invalid_link: bool,
    pub strength_label: &'static str,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    let notice = if query.registered.is_some() {
        Some("Cuenta creada. Ya puedes iniciar sesión.")
    } else if query.reset.is_some() {
        Some("Contraseña actualizada. Inicia sesión con tu nueva contraseña.")
    } else {
        None
    };
    LoginTemplate {
        layout: Layout::load(&session, &auth).await,
        state: ActionState::idle(),
        email: String::new(),
        next: query.next.unwrap_or_default(),
        notice,
    }
}

/// Handle login form submission.
///
/// On success writes the auth cookies and goes to `next` (same-site paths
/// only). Any rejection shows the same message, whether or not the account
/// exists.
#[instrument(skip(state, session, auth, headers, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = match form.validate() {
        Err(errors) => Err(ActionState::failed(errors)),
        Ok(credenciales) => state.backend().login(&credenciales).await.map_err(|e| {
            let message = match e {
                BackendError::Unavailable(_) => SERVICE_UNAVAILABLE,
                _ => LOGIN_FAILED,
            };
            tracing::warn!("Login failed: {e}");
            ActionState::failed(message)
        }),
    };

    match result {
        Ok(login) => {
            set_sentry_user(login.username(), Some(&form.email));
            let cookies = login_cookies(&login, form.remember, state.config().app_env);
            (set_cookies(cookies), redirect_after(&headers, form.redirect_target())).into_response()
        }
        Err(failed) => {
            let layout = Layout::load(&session, &auth).await;
            negotiate(&headers, failed, |state| {
                LoginTemplate {
                    layout,
                    state,
                    email: form.email.clone(),
                    next: form.next.clone().unwrap_or_default(),
                    notice: None,
                }
                .into_response()
            })
        }
    }
}

/// Handle logout: expire the auth cookies.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    clear_sentry_user();
    (
        set_cookies(logout_cookies(state.config().app_env)),
        redirect_after(&headers, "/"),
    )
        .into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn registro_page(session: Session, OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    RegistroTemplate {
        layout: Layout::load(&session, &auth).await,
        state: ActionState::idle(),
        name: String::new(),
        phone: String::new(),
        email: String::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, auth, headers, form), fields(email = %form.email))]
pub async fn registro(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<RegistroForm>,
) -> Response {
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(registro) => match state.backend().registro(&registro).await {
            Ok(()) => return redirect_after(&headers, "/cuenta/login?registered=1"),
            Err(e) => backend_failure(&e, "Error al crear la cuenta"),
        },
    };

    let layout = Layout::load(&session, &auth).await;
    negotiate(&headers, outcome, |state| {
        RegistroTemplate {
            layout,
            state,
            name: form.name.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
        }
        .into_response()
    })
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout: Layout::load(&session, &auth).await,
        state: ActionState::idle(),
        email: String::new(),
        sent: None,
    }
}

/// Ask the backend to email a reset link back to this site.
#[instrument(skip(state, session, auth, headers, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<PasswordResetRequestForm>,
) -> Response {
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(email) => match state
            .backend()
            .solicitar_reset_password(&email, &state.config().base_url)
            .await
        {
            Ok(()) => ActionState::done(),
            Err(e) => backend_failure(&e, "Error al solicitar recuperación de contraseña"),
        },
    };

    let layout = Layout::load(&session, &auth).await;
    negotiate(&headers, outcome, |state| {
        let sent = state.success.then_some(RESET_SENT);
        ForgotPasswordTemplate {
            layout,
            email: if state.success {
                String::new()
            } else {
                form.email.clone()
            },
            state,
            sent,
        }
        .into_response()
    })
}

/// Display the reset form after checking the emailed link.
#[instrument(skip(state, session, auth, token))]
pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path((uid, token)): Path<(String, String)>,
) -> impl IntoResponse {
    let check = state.backend().validar_token_reset(&uid, &token).await;
    let (invalid_link, page_state) = match check {
        Ok(()) => (false, ActionState::idle()),
        Err(e) => (
            true,
            backend_failure(&e, "El enlace es inválido o ha expirado"),
        ),
    };
    ResetPasswordTemplate {
        layout: Layout::load(&session, &auth).await,
        state: page_state,
        uid,
        token,
        invalid_link,
        strength_label: PasswordStrength::of("").label(),
    }
}

/// Body of the reset form; uid and token come from the path.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
}

/// Set the new password.
#[instrument(skip(state, session, auth, headers, token, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    headers: HeaderMap,
    Path((uid, token)): Path<(String, String)>,
    Form(body): Form<ResetPasswordBody>,
) -> Response {
    let form = PasswordResetConfirmForm {
        uid: uid.clone(),
        token: token.clone(),
        password: body.password,
        password_confirm: body.password_confirm,
    };
    let outcome = match form.validate() {
        Err(errors) => ActionState::failed(errors),
        Ok(confirm) => match state.backend().confirmar_reset_password(&confirm).await {
            Ok(()) => return redirect_after(&headers, "/cuenta/login?reset=1"),
            Err(e) => backend_failure(&e, "Error al restablecer la contraseña"),
        },
    };

    let layout = Layout::load(&session, &auth).await;
    let strength_label = PasswordStrength::of(&form.password).label();
    negotiate(&headers, outcome, |state| {
        ResetPasswordTemplate {
            layout,
            state,
            uid,
            token,
            invalid_link: false,
            strength_label,
        }
        .into_response()
    })
}
