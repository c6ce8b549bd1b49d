use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use inkwell_db::StoreError;
use inkwell_db::models::AccountRow;
use inkwell_types::api::{Identity, LoginForm, RegisterForm};

use crate::AppState;
use crate::error::AppError;
use crate::password;
use crate::pipeline::RequestContext;
use crate::token::{self, SESSION_TTL_SECS};
use crate::validation::{self, DUPLICATE_USERNAME, INVALID_LOGIN};
use crate::views::{DashboardTemplate, HomeTemplate, LoginTemplate, PostSummary, page};

/// GET /: own posts when signed in, the registration page otherwise.
pub async fn home(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Response, AppError> {
    match ctx.identity {
        Some(identity) => {
            let posts = state.db.list_posts_by_author(identity.user_id)?;
            page(&DashboardTemplate {
                identity: Some(identity),
                errors: ctx.errors,
                posts: posts.iter().map(PostSummary::from).collect(),
            })
        }
        None => page(&HomeTemplate {
            identity: None,
            errors: ctx.errors,
            username: String::new(),
        }),
    }
}

pub async fn login_form(Extension(ctx): Extension<RequestContext>) -> Result<Response, AppError> {
    page(&LoginTemplate {
        identity: ctx.identity,
        errors: ctx.errors,
        username: String::new(),
    })
}

pub async fn login(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    ctx.errors = validation::login(&form);

    if ctx.errors.is_empty() {
        let account = state.db.find_account_by_username(&form.username)?;
        match account {
            Some(account) if password::verify(&form.password, &account.password) => {
                info!("User {} logged in", account.username);
                return start_session(&state, jar, &account);
            }
            // Unknown user and wrong password read the same.
            _ => ctx.errors = vec![INVALID_LOGIN.to_string()],
        }
    }

    page(&LoginTemplate {
        identity: ctx.identity,
        errors: ctx.errors,
        username: form.username,
    })
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(token::expired_session_cookie()), Redirect::to("/"))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let (username, errors) = validation::registration(&form);
    ctx.errors = errors;

    if ctx.errors.is_empty() {
        let hash = password::hash(&form.password).map_err(AppError::Hash)?;

        match state.db.create_account(&username, &hash) {
            Ok(account) => {
                info!("Registered user {} (id {})", account.username, account.id);
                return start_session(&state, jar, &account);
            }
            Err(StoreError::DuplicateUsername) => ctx.errors.push(DUPLICATE_USERNAME.to_string()),
            Err(e) => return Err(e.into()),
        }
    } else if !username.is_empty() && state.db.find_account_by_username(&username)?.is_some() {
        // Report it alongside the other problems; the insert above is what
        // actually enforces uniqueness.
        ctx.errors.push(DUPLICATE_USERNAME.to_string());
    }

    page(&HomeTemplate {
        identity: ctx.identity,
        errors: ctx.errors,
        username,
    })
}

fn start_session(state: &AppState, jar: CookieJar, account: &AccountRow) -> Result<Response, AppError> {
    let identity = Identity {
        user_id: account.id,
        username: account.username.clone(),
    };
    let token = token::issue(&identity, &state.jwt_secret, SESSION_TTL_SECS)?;

    Ok((jar.add(token::session_cookie(token)), Redirect::to("/")).into_response())
}
