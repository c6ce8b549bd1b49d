//! askama page templates. Only pre-sanitized HTML is emitted with `|safe`.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use inkwell_db::models::PostRow;
use inkwell_types::api::Identity;

use crate::error::AppError;

pub fn page<T: Template>(template: &T) -> Result<Response, AppError> {
    Ok(Html(template.render()?).into_response())
}

/// Dashboard list entry.
pub struct PostSummary {
    pub id: i64,
    /// Stripped at write time, so already escaped text.
    pub title: String,
    pub created: String,
}

impl From<&PostRow> for PostSummary {
    fn from(post: &PostRow) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            created: display_date(post),
        }
    }
}

pub fn display_date(post: &PostRow) -> String {
    post.created_at.format("%B %-d, %Y").to_string()
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub identity: Option<Identity>,
    pub errors: Vec<String>,
    pub username: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub identity: Option<Identity>,
    pub errors: Vec<String>,
    pub username: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub identity: Option<Identity>,
    pub errors: Vec<String>,
    pub posts: Vec<PostSummary>,
}

/// Shared by create and edit.
#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub identity: Option<Identity>,
    pub errors: Vec<String>,
    pub heading: &'static str,
    pub action: String,
    pub title: String,
    pub body: String,
}

impl PostFormTemplate {
    pub fn create(identity: &Identity, errors: Vec<String>, title: &str, body: &str) -> Self {
        Self {
            identity: Some(identity.clone()),
            errors,
            heading: "Create a new post",
            action: "/create-post".to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    pub fn edit(
        identity: &Identity,
        errors: Vec<String>,
        post_id: i64,
        title: &str,
        body: &str,
    ) -> Self {
        Self {
            identity: Some(identity.clone()),
            errors,
            heading: "Edit post",
            action: format!("/edit-post/{}", post_id),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub identity: Option<Identity>,
    pub errors: Vec<String>,
    pub post_id: i64,
    pub title: String,
    /// Output of `Markup::render`.
    pub body_html: String,
    pub author: String,
    pub created: String,
    pub is_author: bool,
}
