//! Database row types. These map directly to SQLite rows.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AccountRow {
    pub id: i64,
    pub username: String,
    /// PHC-format password hash. Never the plaintext.
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A post joined with its author's username, for public display.
#[derive(Debug, Clone)]
pub struct PostWithAuthorRow {
    pub post: PostRow,
    pub author_username: String,
}
