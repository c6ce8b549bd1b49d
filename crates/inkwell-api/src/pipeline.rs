//! Per-request context built by an ordered list of named stages.
//!
//! The pipeline runs once per request as a middleware and leaves a
//! [`RequestContext`] in the request extensions. Handlers take it as
//! `Extension<RequestContext>` instead of reaching into ad hoc request fields.

use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use inkwell_types::api::Identity;

use crate::AppState;
use crate::markup::Markup;
use crate::token::{self, SESSION_COOKIE};

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `None` means anonymous.
    pub identity: Option<Identity>,
    /// Messages for the form being re-displayed.
    pub errors: Vec<String>,
    pub markup: Option<Markup>,
}

impl RequestContext {
    pub fn markup(&self) -> Markup {
        self.markup.unwrap_or_default()
    }
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: RequestContext, parts: &Parts) -> RequestContext;
}

/// Fills `identity` from the session cookie. A missing, forged or expired
/// token leaves the request anonymous.
pub struct VerifyToken {
    secret: String,
}

impl VerifyToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Stage for VerifyToken {
    fn name(&self) -> &'static str {
        "token-verify"
    }

    fn apply(&self, mut ctx: RequestContext, parts: &Parts) -> RequestContext {
        let jar = CookieJar::from_headers(&parts.headers);
        ctx.identity = jar.get(SESSION_COOKIE).and_then(|cookie| {
            match token::verify(cookie.value(), &self.secret) {
                Ok(claims) => Some(Identity::from(claims)),
                Err(e) => {
                    debug!("Session cookie ignored: {}", e);
                    None
                }
            }
        });
        ctx
    }
}

pub struct InitErrors;

impl Stage for InitErrors {
    fn name(&self) -> &'static str {
        "error-bag-init"
    }

    fn apply(&self, mut ctx: RequestContext, _parts: &Parts) -> RequestContext {
        ctx.errors = Vec::new();
        ctx
    }
}

pub struct InitMarkup;

impl Stage for InitMarkup {
    fn name(&self) -> &'static str {
        "markup-helper-init"
    }

    fn apply(&self, mut ctx: RequestContext, _parts: &Parts) -> RequestContext {
        ctx.markup = Some(Markup);
        ctx
    }
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// token-verify, error-bag-init, markup-helper-init.
    pub fn standard(secret: &str) -> Self {
        Self::new()
            .stage(VerifyToken::new(secret))
            .stage(InitErrors)
            .stage(InitMarkup)
    }

    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, parts: &Parts) -> RequestContext {
        self.stages
            .iter()
            .fold(RequestContext::default(), |ctx, stage| stage.apply(ctx, parts))
    }
}

/// Middleware: run the pipeline and hand the context to the route handler.
pub async fn attach_context(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let ctx = state.pipeline.run(&parts);
    parts.extensions.insert(ctx);
    next.run(Request::from_parts(parts, body)).await
}
