use axum::{
    Extension, Form,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use inkwell_types::api::PostForm;

use crate::AppState;
use crate::error::AppError;
use crate::gate::{self, require_identity};
use crate::pipeline::RequestContext;
use crate::validation;
use crate::views::{PostFormTemplate, PostTemplate, display_date, page};

/// A body that does not decode is treated as empty fields. Callers take the
/// form as a `Result` so the gate runs before anything about the body is
/// reported.
fn form_or_empty(form: Result<Form<PostForm>, FormRejection>) -> PostForm {
    match form {
        Ok(Form(form)) => form,
        Err(e) => {
            debug!("Post form rejected: {}", e);
            PostForm::default()
        }
    }
}

pub async fn create_form(Extension(ctx): Extension<RequestContext>) -> Result<Response, AppError> {
    let identity = require_identity(&ctx)?;
    page(&PostFormTemplate::create(identity, ctx.errors.clone(), "", ""))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, AppError> {
    let identity = require_identity(&ctx)?.clone();
    let form = form_or_empty(form);

    let (cleaned, errors) = validation::post(&form, ctx.markup());
    if !errors.is_empty() {
        ctx.errors = errors;
        return page(&PostFormTemplate::create(&identity, ctx.errors, &form.title, &form.body));
    }

    let post = state
        .db
        .create_post(&cleaned.title, &cleaned.body, identity.user_id)?;
    info!("User {} created post {}", identity.user_id, post.id);

    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

/// Public. `is_author` only drives which controls the page shows.
pub async fn view(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = gate::parse_post_id(&id) else {
        return Err(AppError::Refused);
    };
    let Some(found) = state.db.get_post_with_author(id)? else {
        return Err(AppError::Refused);
    };

    let is_author = gate::is_author(ctx.identity.as_ref(), &found.post);
    page(&PostTemplate {
        post_id: found.post.id,
        body_html: ctx.markup().render(&found.post.body),
        created: display_date(&found.post),
        title: found.post.title,
        author: found.author_username,
        is_author,
        identity: ctx.identity,
        errors: ctx.errors,
    })
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let identity = require_identity(&ctx)?;
    let post = gate::authorize_owner(&state.db, identity, &id)?;

    page(&PostFormTemplate::edit(
        identity,
        ctx.errors.clone(),
        post.id,
        &post.title,
        &post.body,
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, AppError> {
    let identity = require_identity(&ctx)?.clone();
    let post = gate::authorize_owner(&state.db, &identity, &id)?;
    let form = form_or_empty(form);

    let (cleaned, errors) = validation::post(&form, ctx.markup());
    if !errors.is_empty() {
        // Re-show what was submitted, not what is stored.
        ctx.errors = errors;
        return page(&PostFormTemplate::edit(
            &identity,
            ctx.errors,
            post.id,
            &form.title,
            &form.body,
        ));
    }

    // Last writer wins for concurrent edits of the same post.
    state.db.update_post(post.id, &cleaned.title, &cleaned.body)?;
    info!("User {} updated post {}", identity.user_id, post.id);

    Ok(Redirect::to(&format!("/post/{}", post.id)).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let identity = require_identity(&ctx)?;
    let post = gate::authorize_owner(&state.db, identity, &id)?;

    state.db.delete_post(post.id)?;
    info!("User {} deleted post {}", identity.user_id, post.id);

    Ok(Redirect::to("/").into_response())
}
