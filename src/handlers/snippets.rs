use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    error::{AppError, Result},
    middleware_layer::{auth::AuthContext, csrf::CsrfToken},
    session::Session,
    state::AppState,
    templates::{CreateTemplate, HomeTemplate, TemplateData, ViewTemplate, render},
    validation::snippet::SnippetCreateForm,
};

/// Parses a snippet ID from the path. Anything that is not a positive
/// integer cannot name a snippet.
fn parse_id(raw: &str) -> Result<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound),
    }
}

/// Lists the latest snippets.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
) -> Result<Response> {
    let snippets = state.snippets.latest().await?;

    render(
        StatusCode::OK,
        HomeTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            snippets,
        },
    )
}

/// Shows a single snippet.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `id` - The raw `{id}` path segment.
///
/// # Returns
///
/// The rendered page, or a 404 for malformed, unknown and expired IDs.
pub async fn snippet_view(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let snippet = state.snippets.get(id).await?;

    render(
        StatusCode::OK,
        ViewTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            snippet,
        },
    )
}

/// Shows the empty creation form.
pub async fn snippet_create(
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
) -> Result<Response> {
    render(
        StatusCode::OK,
        CreateTemplate {
            base: TemplateData::new(&session, &auth, &csrf).await,
            form: SnippetCreateForm::default(),
        },
    )
}

/// Creates a snippet from the submitted form.
///
/// An undecodable form is a 400. A form that decodes but fails validation
/// is shown again with a 422.
pub async fn snippet_create_post(
    State(state): State<AppState>,
    session: Session,
    auth: AuthContext,
    csrf: CsrfToken,
    form: std::result::Result<Form<SnippetCreateForm>, FormRejection>,
) -> Result<Response> {
    let Form(mut form) = form?;

    form.validate();
    if !form.validator.valid() {
        return render(
            StatusCode::UNPROCESSABLE_ENTITY,
            CreateTemplate {
                base: TemplateData::new(&session, &auth, &csrf).await,
                form,
            },
        );
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;
    tracing::info!("📝 Snippet {} created", id);

    session.put_flash("Snippet successfully created!").await;

    Ok(Redirect::to(&format!("/snippet/view/{}", id)).into_response())
}
