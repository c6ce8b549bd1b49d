pub mod auth;
pub mod error;
pub mod gate;
pub mod markup;
pub mod password;
pub mod pipeline;
pub mod posts;
pub mod token;
pub mod validation;
pub mod views;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use inkwell_db::Database;

use crate::pipeline::Pipeline;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub pipeline: Pipeline,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: String) -> Self {
        let pipeline = Pipeline::standard(&jwt_secret);
        Self {
            db,
            jwt_secret,
            pipeline,
        }
    }
}

/// All routes, with the request pipeline in front of every one of them.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/register", post(auth::register))
        .route("/create-post", get(posts::create_form).post(posts::create))
        .route("/post/{id}", get(posts::view))
        .route("/edit-post/{id}", get(posts::edit_form).post(posts::edit))
        .route("/delete-post/{id}", post(posts::delete))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            pipeline::attach_context,
        ))
        .with_state(state)
}
