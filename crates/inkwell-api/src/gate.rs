//! Ownership checks in front of post mutations.
//!
//! Anonymous callers, unknown post ids and posts owned by someone else are
//! all refused the same way, so a refusal says nothing about whether the post
//! exists or who owns it.

use thiserror::Error;
use tracing::debug;

use inkwell_db::models::PostRow;
use inkwell_db::{Database, StoreError};
use inkwell_types::api::Identity;

use crate::pipeline::RequestContext;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("not signed in")]
    Anonymous,

    #[error("post missing or not owned by caller")]
    NotFoundOrForbidden,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub fn require_identity(ctx: &RequestContext) -> Result<&Identity, GateError> {
    ctx.identity.as_ref().ok_or(GateError::Anonymous)
}

/// Ids come straight from the URL; anything unparsable is just a missing post.
pub fn parse_post_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// Load a post for mutation by `identity`.
pub fn authorize_owner(
    db: &Database,
    identity: &Identity,
    raw_id: &str,
) -> Result<PostRow, GateError> {
    let Some(id) = parse_post_id(raw_id) else {
        return Err(GateError::NotFoundOrForbidden);
    };

    match db.get_post(id)? {
        Some(post) if post.author_id == identity.user_id => Ok(post),
        _ => {
            debug!(
                "User {} refused on post {}: missing or not owner",
                identity.user_id, id
            );
            Err(GateError::NotFoundOrForbidden)
        }
    }
}

pub fn is_author(identity: Option<&Identity>, post: &PostRow) -> bool {
    identity.is_some_and(|i| i.user_id == post.author_id)
}
