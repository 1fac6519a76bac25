//! Page templates.
//!
//! Templates are compiled into the binary by askama, so the set of pages is
//! fixed at build time and shared read-only by every request.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Datelike, Utc};

use crate::{
    error::Result,
    middleware_layer::{auth::AuthContext, csrf::CsrfToken},
    models::{snippet::Snippet, user::User},
    session::Session,
    validation::{
        auth::{UserLoginForm, UserSignupForm},
        snippet::SnippetCreateForm,
    },
};

/// Values every page needs.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

impl TemplateData {
    /// Builds the shared page data, consuming any queued flash message.
    pub async fn new(session: &Session, auth: &AuthContext, csrf: &CsrfToken) -> Self {
        Self {
            current_year: Utc::now().year(),
            flash: session.pop_flash().await,
            is_authenticated: auth.is_authenticated(),
            csrf_token: csrf.0.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub base: TemplateData,
    pub snippets: Vec<Snippet>,
}

#[derive(Template)]
#[template(path = "view.html")]
pub struct ViewTemplate {
    pub base: TemplateData,
    pub snippet: Snippet,
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct CreateTemplate {
    pub base: TemplateData,
    pub form: SnippetCreateForm,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub base: TemplateData,
    pub form: UserSignupForm,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub base: TemplateData,
    pub form: UserLoginForm,
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub base: TemplateData,
    pub user: User,
}

/// Renders `template` and wraps it in a response with `status`.
///
/// The page is rendered in full before anything is written, so a failing
/// template produces a clean 500 instead of a truncated page.
pub fn render<T: Template>(status: StatusCode, template: T) -> Result<Response> {
    let html = template.render()?;
    Ok((status, Html(html)).into_response())
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn human_date(t: &DateTime<Utc>) -> String {
    if t.timestamp() == 0 {
        return String::new();
    }
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

mod filters {
    use std::borrow::Borrow;

    use chrono::{DateTime, Utc};

    pub fn human_date<T: Borrow<DateTime<Utc>>>(t: T) -> ::askama::Result<String> {
        Ok(super::human_date(t.borrow()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn human_date_formats() {
        let utc = Utc.with_ymd_and_hms(2022, 3, 7, 10, 15, 0).unwrap();
        assert_eq!(human_date(&utc), "2022-03-07 10:15:00");

        let cet = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2022, 3, 7, 10, 15, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(human_date(&cet), "2022-03-07 09:15:00");

        assert_eq!(human_date(&DateTime::<Utc>::UNIX_EPOCH), "");
    }

    #[test]
    fn pages_render_shared_data() {
        let page = CreateTemplate {
            base: TemplateData {
                current_year: 2026,
                flash: Some("Snippet successfully created!".to_string()),
                is_authenticated: true,
                csrf_token: "tok3n".to_string(),
            },
            form: SnippetCreateForm::default(),
        };

        let html = page.render().unwrap();
        assert!(html.contains("Snippet successfully created!"));
        assert!(html.contains(r#"<input type="hidden" name="csrf_token" value="tok3n">"#));
        assert!(html.contains(r#"value="365" checked"#));
        assert!(html.contains("Logout"));
    }

    #[test]
    fn field_errors_are_shown_next_to_their_field() {
        let mut form = UserSignupForm {
            email: "not-an-email".to_string(),
            ..Default::default()
        };
        form.validate();

        let html = SignupTemplate {
            base: TemplateData::default(),
            form,
        }
        .render()
        .unwrap();

        assert!(html.contains("This field must be a valid email address"));
        assert!(html.contains(r#"value="not-an-email""#));
        assert!(html.contains(r#"<a href="/user/login">Login</a>"#));
    }
}
