use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    error::{AppError, Result},
    middleware_layer::{
        auth::{AuthContext, LOGIN_PATH},
        csrf::CsrfToken,
    },
    session::Session,
    state::AppState,
    templates::{AccountTemplate, LoginTemplate, SignupTemplate, TemplateData, render},
    validation::auth::{UserLoginForm, UserSignupForm},
};

/// Where a freshly logged-in user lands when no other page was requested.
const DEFAULT_LOGIN_REDIRECT: &str = "/snippet/create";

/// Shows the empty signup form.
pub async fn signup(session: Session, auth: AuthContext, csrf: CsrfToken) -> Result<Response> {
    render(
        StatusCode::OK,
        SignupTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            form: UserSignupForm::default(),
        },
    )
}

/// Registers a new user.
///
/// # Returns
///
/// A 303 to the login page on success. Invalid input, including an email
/// address that is already taken, re-renders the form with a 422.
pub async fn signup_post(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
    form: std::result::Result<Form<UserSignupForm>, FormRejection>,
) -> Result<Response> {
    let Form(mut form) = form?;

    form.validate();
    if form.validator.valid() {
        match state
            .users
            .insert(&form.name, &form.email, &form.password)
            .await
        {
            Ok(()) => {
                tracing::info!("✅ New user signed up");
                session
                    .put_flash("Your signup was successful. Please log in.")
                    .await;
                return Ok(Redirect::to(LOGIN_PATH).into_response());
            }
            Err(AppError::DuplicateEmail) => {
                form.validator
                    .add_field_error("email", "Email address is already in use");
            }
            Err(e) => return Err(e),
        }
    }

    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        SignupTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            form,
        },
    )
}

/// Shows the empty login form.
pub async fn login(session: Session, auth: AuthContext, csrf: CsrfToken) -> Result<Response> {
    render(
        StatusCode::OK,
        LoginTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            form: UserLoginForm::default(),
        },
    )
}

/// Logs a user in.
///
/// The session token is rotated before the user ID is stored, so a token
/// planted before login is useless afterwards.
pub async fn login_post(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
    form: std::result::Result<Form<UserLoginForm>, FormRejection>,
) -> Result<Response> {
    let Form(mut form) = form?;

    form.validate();
    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(user_id) => {
                session.renew().await;
                session.put_user_id(user_id).await;
                tracing::info!("🔓 User {} logged in", user_id);

                let target = session
                    .pop_redirect_path()
                    .await
                    .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT.to_string());
                return Ok(Redirect::to(&target).into_response());
            }
            Err(AppError::InvalidCredentials) => {
                form.validator
                    .add_non_field_error("Email or password is incorrect");
            }
            Err(e) => return Err(e),
        }
    }

    render(
        StatusCode::UNPROCESSABLE_ENTITY,
        LoginTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            form,
        },
    )
}

/// Logs the current user out and rotates the session token.
pub async fn logout(session: Session) -> Response {
    session.renew().await;
    session.remove_user_id().await;
    session.put_flash("You've been logged out successfully!").await;

    Redirect::to("/").into_response()
}

/// Shows the logged-in user's account details.
pub async fn account_view(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
) -> Result<Response> {
    let Some(user_id) = auth.user_id() else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let user = state.users.get(user_id).await?;

    render(
        StatusCode::OK,
        AccountTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            user,
        },
    )
}
