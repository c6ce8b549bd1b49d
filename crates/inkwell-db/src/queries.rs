use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{AccountRow, PostRow, PostWithAuthorRow};
use crate::{Database, Result, StoreError};

impl Database {
    // -- Users --

    /// Insert a new account. The UNIQUE constraint on `username` decides
    /// duplicates, so two concurrent registrations cannot both succeed.
    pub fn create_account(&self, username: &str, password_hash: &str) -> Result<AccountRow> {
        let created_at = Utc::now().trunc_subsecs(6);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, created_at) VALUES (?1, ?2, ?3)",
                params![username, password_hash, format_timestamp(created_at)],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateUsername
                } else {
                    StoreError::Sqlite(e)
                }
            })?;

            Ok(AccountRow {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password: password_hash.to_string(),
                created_at,
            })
        })
    }

    /// Exact, case-sensitive lookup.
    pub fn find_account_by_username(&self, username: &str) -> Result<Option<AccountRow>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                "SELECT id, username, password, created_at FROM users WHERE username = ?1",
                params![username],
            )
        })
    }

    // -- Posts --
    //
    // Mutations here are unconditional. Ownership is checked by the caller.

    pub fn create_post(&self, title: &str, body: &str, author_id: i64) -> Result<PostRow> {
        self.create_post_at(title, body, author_id, Utc::now())
    }

    pub fn create_post_at(
        &self,
        title: &str,
        body: &str,
        author_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<PostRow> {
        // Match what a read will return.
        let created_at = created_at.trunc_subsecs(6);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (title, body, author_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![title, body, author_id, format_timestamp(created_at)],
            )?;

            Ok(PostRow {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                body: body.to_string(),
                author_id,
                created_at,
            })
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, title, body, author_id, created_at FROM posts WHERE id = ?1",
                    [id],
                    post_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All posts by one author, newest first.
    pub fn list_posts_by_author(&self, author_id: i64) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, body, author_id, created_at
                 FROM posts
                 WHERE author_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([author_id], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_post_with_author(&self, id: i64) -> Result<Option<PostWithAuthorRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT p.id, p.title, p.body, p.author_id, p.created_at, u.username
                     FROM posts p
                     INNER JOIN users u ON p.author_id = u.id
                     WHERE p.id = ?1",
                    [id],
                    |row| {
                        Ok(PostWithAuthorRow {
                            post: post_from_row(row)?,
                            author_username: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns whether a row was changed.
    pub fn update_post(&self, id: i64, title: &str, body: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET title = ?1, body = ?2 WHERE id = ?3",
                params![title, body, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns whether a row was removed.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

/// Fixed microsecond precision keeps lexical order equal to time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn query_account<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<AccountRow>> {
    let row = conn
        .query_row(sql, params, |row| {
            Ok(AccountRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: parse_timestamp(row, 3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        author_id: row.get(3)?,
        created_at: parse_timestamp(row, 4)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_find_account() {
        let db = db();
        let created = db.create_account("alice01", "hash").unwrap();

        let found = db.find_account_by_username("alice01").unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password, "hash");
    }

    #[test]
    fn duplicate_username_is_rejected_by_the_store() {
        let db = db();
        db.create_account("alice01", "one").unwrap();

        let err = db.create_account("alice01", "two").unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let db = db();
        db.create_account("alice01", "hash").unwrap();

        assert!(db.find_account_by_username("ALICE01").unwrap().is_none());
        assert!(db.create_account("ALICE01", "hash").is_ok());
    }

    #[test]
    fn post_round_trip() {
        let db = db();
        let alice = db.create_account("alice01", "hash").unwrap();
        let post = db.create_post("Hi", "hello", alice.id).unwrap();

        let fetched = db.get_post(post.id).unwrap().unwrap();
        assert_eq!(fetched, post);
    }

    #[test]
    fn post_requires_existing_author() {
        let db = db();
        let err = db.create_post("Hi", "hello", 42).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn listing_is_newest_first_and_per_author() {
        let db = db();
        let alice = db.create_account("alice01", "hash").unwrap();
        let bob = db.create_account("bob001", "hash").unwrap();
        let now = Utc::now();

        let old = db.create_post_at("old", "b", alice.id, now - Duration::hours(2)).unwrap();
        let new = db.create_post_at("new", "b", alice.id, now).unwrap();
        let mid = db.create_post_at("mid", "b", alice.id, now - Duration::hours(1)).unwrap();
        db.create_post("bob's", "b", bob.id).unwrap();

        let ids: Vec<i64> = db
            .list_posts_by_author(alice.id)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);
    }

    #[test]
    fn join_carries_author_username() {
        let db = db();
        let alice = db.create_account("alice01", "hash").unwrap();
        let post = db.create_post("Hi", "hello", alice.id).unwrap();

        let joined = db.get_post_with_author(post.id).unwrap().unwrap();
        assert_eq!(joined.author_username, "alice01");
        assert_eq!(joined.post.title, "Hi");

        assert!(db.get_post_with_author(post.id + 1).unwrap().is_none());
    }

    #[test]
    fn update_and_delete() {
        let db = db();
        let alice = db.create_account("alice01", "hash").unwrap();
        let post = db.create_post("Hi", "hello", alice.id).unwrap();

        assert!(db.update_post(post.id, "Hey", "there").unwrap());
        let updated = db.get_post(post.id).unwrap().unwrap();
        assert_eq!((updated.title.as_str(), updated.body.as_str()), ("Hey", "there"));
        assert_eq!(updated.author_id, alice.id);

        assert!(db.delete_post(post.id).unwrap());
        assert!(db.get_post(post.id).unwrap().is_none());
        assert!(!db.delete_post(post.id).unwrap());
        assert!(!db.update_post(post.id, "x", "y").unwrap());
    }
}
