use crate::Database;
use crate::models::{CommentRow, PasteRow, ProfileRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users & profiles --

    /// Create the credential row and its display profile together; signup
    /// either produces both or neither.
    pub fn create_user_with_profile(
        &self,
        user_id: &str,
        profile_id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (user_id, username, password_hash),
            )?;
            tx.execute(
                "INSERT INTO profiles (id, user_id, username) VALUES (?1, ?2, ?3)",
                (profile_id, user_id, username),
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, username, created_at FROM profiles WHERE user_id = ?1",
            )?;
            let row = stmt.query_row([user_id], map_profile_row).optional()?;
            Ok(row)
        })
    }

    /// Batch-fetch profiles for a set of user ids (one query for a whole
    /// comment thread instead of one per comment).
    pub fn get_profiles_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<ProfileRow>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=user_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT id, user_id, username, created_at FROM profiles WHERE user_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = user_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), map_profile_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Pastes --

    /// Returns false when the slug is already taken, so the caller can
    /// generate a fresh one and retry.
    pub fn insert_paste(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        content: &str,
        slug: &str,
        is_public: bool,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO pastes (id, user_id, title, content, slug, is_public)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, title, content, slug, is_public],
            );

            match res {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Exact, case-sensitive slug match — the only public lookup key.
    pub fn get_paste_by_slug(&self, slug: &str) -> Result<Option<PasteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PASTE_COLUMNS} WHERE slug = ?1"))?;
            let row = stmt.query_row([slug], map_paste_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_paste_by_id(&self, id: &str) -> Result<Option<PasteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{PASTE_COLUMNS} WHERE id = ?1"))?;
            let row = stmt.query_row([id], map_paste_row).optional()?;
            Ok(row)
        })
    }

    /// All pastes owned by one user, newest first. `rowid` breaks ties
    /// within the same second.
    pub fn get_pastes_by_user(&self, user_id: &str) -> Result<Vec<PasteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PASTE_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt
                .query_map([user_id], map_paste_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Owner-scoped delete. Removes the paste's comments and likes in the
    /// same transaction; returns false when no paste matched (absent or
    /// owned by someone else), leaving everything untouched.
    pub fn delete_paste(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;

            let owned: Option<String> = tx
                .query_row(
                    "SELECT id FROM pastes WHERE id = ?1 AND user_id = ?2",
                    (id, user_id),
                    |row| row.get(0),
                )
                .optional()?;

            if owned.is_none() {
                return Ok(false);
            }

            tx.execute("DELETE FROM comments WHERE paste_id = ?1", [id])?;
            tx.execute("DELETE FROM likes WHERE paste_id = ?1", [id])?;
            tx.execute("DELETE FROM pastes WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(true)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, id: &str, paste_id: &str, user_id: &str, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, paste_id, user_id, content) VALUES (?1, ?2, ?3, ?4)",
                (id, paste_id, user_id, content),
            )?;
            Ok(())
        })
    }

    /// Read a comment back after insert to pick up its stored timestamp.
    pub fn get_comment_by_id(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, paste_id, user_id, content, created_at FROM comments WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_comment_row).optional()?;
            Ok(row)
        })
    }

    /// Thread order: creation time ascending, `rowid` breaking same-second
    /// ties, so freshly appended comments always sort last.
    pub fn get_comments_for_paste(&self, paste_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, paste_id, user_id, content, created_at
                 FROM comments
                 WHERE paste_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([paste_id], map_comment_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    /// Count-only query; no rows are materialized.
    pub fn count_likes(&self, paste_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE paste_id = ?1",
                [paste_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn has_liked(&self, paste_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM likes WHERE paste_id = ?1 AND user_id = ?2",
                    (paste_id, user_id),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(existing.is_some())
        })
    }

    /// Toggle a like: removes if present, inserts if not.
    /// Returns true when the like was added, false when removed.
    pub fn toggle_like(&self, id: &str, paste_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM likes WHERE paste_id = ?1 AND user_id = ?2",
                    (paste_id, user_id),
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM likes WHERE id = ?1", [&existing_id])?;
                Ok(false)
            } else {
                conn.execute(
                    "INSERT INTO likes (id, paste_id, user_id) VALUES (?1, ?2, ?3)",
                    (id, paste_id, user_id),
                )?;
                Ok(true)
            }
        })
    }
}

const PASTE_COLUMNS: &str =
    "SELECT id, user_id, title, content, slug, is_public, created_at, updated_at FROM pastes";

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_profile_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn map_paste_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PasteRow> {
    Ok(PasteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        slug: row.get(4)?,
        is_public: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn map_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        paste_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use uuid::Uuid;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, username: &str) -> String {
        let user_id = Uuid::new_v4().to_string();
        let profile_id = Uuid::new_v4().to_string();
        db.create_user_with_profile(&user_id, &profile_id, username, "hash")
            .unwrap();
        user_id
    }

    fn seed_paste(db: &Database, user_id: &str, slug: &str) -> String {
        let id = Uuid::new_v4().to_string();
        assert!(db.insert_paste(&id, user_id, "Hello", "print(1)", slug, true).unwrap());
        id
    }

    #[test]
    fn signup_creates_user_and_profile() {
        let db = db();
        let user_id = seed_user(&db, "vaish");

        let user = db.get_user_by_username("vaish").unwrap().unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.password, "hash");

        let profile = db.get_profile_by_user_id(&user_id).unwrap().unwrap();
        assert_eq!(profile.username, "vaish");
    }

    #[test]
    fn unknown_username_is_none() {
        let db = db();
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_fails_whole_signup() {
        let db = db();
        seed_user(&db, "vaish");

        let user_id = Uuid::new_v4().to_string();
        let profile_id = Uuid::new_v4().to_string();
        assert!(
            db.create_user_with_profile(&user_id, &profile_id, "vaish", "other")
                .is_err()
        );
        // The transaction rolled back: no orphan profile row.
        assert!(db.get_profile_by_user_id(&user_id).unwrap().is_none());
    }

    #[test]
    fn paste_roundtrip_by_slug() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let paste_id = seed_paste(&db, &user_id, "hello-world");

        let paste = db.get_paste_by_slug("hello-world").unwrap().unwrap();
        assert_eq!(paste.id, paste_id);
        assert_eq!(paste.title, "Hello");
        assert_eq!(paste.content, "print(1)");
        assert!(paste.is_public);
    }

    #[test]
    fn slug_lookup_is_case_sensitive() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        seed_paste(&db, &user_id, "hello-world");

        assert!(db.get_paste_by_slug("Hello-World").unwrap().is_none());
    }

    #[test]
    fn slug_collision_reports_false() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        seed_paste(&db, &user_id, "taken");

        let id = Uuid::new_v4().to_string();
        assert!(!db.insert_paste(&id, &user_id, "T", "c", "taken", true).unwrap());
        assert!(db.get_paste_by_id(&id).unwrap().is_none());
    }

    #[test]
    fn dashboard_lists_own_pastes_newest_first() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let other = seed_user(&db, "someone");

        let first = seed_paste(&db, &user_id, "first");
        let second = seed_paste(&db, &user_id, "second");
        seed_paste(&db, &other, "not-mine");

        let mine = db.get_pastes_by_user(&user_id).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second);
        assert_eq!(mine[1].id, first);
    }

    #[test]
    fn delete_is_owner_scoped() {
        let db = db();
        let owner = seed_user(&db, "owner");
        let intruder = seed_user(&db, "intruder");
        let paste_id = seed_paste(&db, &owner, "mine");

        assert!(!db.delete_paste(&paste_id, &intruder).unwrap());
        assert!(db.get_paste_by_id(&paste_id).unwrap().is_some());

        assert!(db.delete_paste(&paste_id, &owner).unwrap());
        assert!(db.get_paste_by_id(&paste_id).unwrap().is_none());
    }

    #[test]
    fn delete_removes_comments_and_likes() {
        let db = db();
        let owner = seed_user(&db, "owner");
        let fan = seed_user(&db, "fan");
        let paste_id = seed_paste(&db, &owner, "mine");

        db.insert_comment(&Uuid::new_v4().to_string(), &paste_id, &fan, "nice post")
            .unwrap();
        db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &fan).unwrap();

        assert!(db.delete_paste(&paste_id, &owner).unwrap());
        assert!(db.get_comments_for_paste(&paste_id).unwrap().is_empty());
        assert_eq!(db.count_likes(&paste_id).unwrap(), 0);
    }

    #[test]
    fn delete_leaves_other_pastes_alone() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let keep = seed_paste(&db, &user_id, "keep");
        let gone = seed_paste(&db, &user_id, "gone");

        assert!(db.delete_paste(&gone, &user_id).unwrap());

        let mine = db.get_pastes_by_user(&user_id).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, keep);
    }

    #[test]
    fn comments_stay_in_insertion_order() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let paste_id = seed_paste(&db, &user_id, "thread");

        for i in 0..5 {
            db.insert_comment(&Uuid::new_v4().to_string(), &paste_id, &user_id, &format!("c{i}"))
                .unwrap();
        }

        let comments = db.get_comments_for_paste(&paste_id).unwrap();
        let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["c0", "c1", "c2", "c3", "c4"]);
    }

    #[test]
    fn comment_readback_has_timestamp() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let paste_id = seed_paste(&db, &user_id, "thread");

        let id = Uuid::new_v4().to_string();
        db.insert_comment(&id, &paste_id, &user_id, "nice post").unwrap();

        let comment = db.get_comment_by_id(&id).unwrap().unwrap();
        assert_eq!(comment.content, "nice post");
        assert!(!comment.created_at.is_empty());
    }

    #[test]
    fn batch_profiles_empty_input_issues_no_query() {
        let db = db();
        assert!(db.get_profiles_by_user_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn batch_profiles_fetches_each_user_once() {
        let db = db();
        let a = seed_user(&db, "alice");
        let b = seed_user(&db, "bob");

        let profiles = db.get_profiles_by_user_ids(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().any(|p| p.user_id == a && p.username == "alice"));
        assert!(profiles.iter().any(|p| p.user_id == b && p.username == "bob"));
    }

    #[test]
    fn like_toggle_roundtrip() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let paste_id = seed_paste(&db, &user_id, "liked");

        assert_eq!(db.count_likes(&paste_id).unwrap(), 0);
        assert!(!db.has_liked(&paste_id, &user_id).unwrap());

        assert!(db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &user_id).unwrap());
        assert_eq!(db.count_likes(&paste_id).unwrap(), 1);
        assert!(db.has_liked(&paste_id, &user_id).unwrap());

        // Second toggle removes; count and flag return to their prior values.
        assert!(!db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &user_id).unwrap());
        assert_eq!(db.count_likes(&paste_id).unwrap(), 0);
        assert!(!db.has_liked(&paste_id, &user_id).unwrap());
    }

    #[test]
    fn one_like_per_user_enforced_by_schema() {
        let db = db();
        let user_id = seed_user(&db, "vaish");
        let paste_id = seed_paste(&db, &user_id, "liked");

        db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &user_id).unwrap();

        // A second raw insert trips UNIQUE(paste_id, user_id).
        let dup = db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (id, paste_id, user_id) VALUES (?1, ?2, ?3)",
                (Uuid::new_v4().to_string(), &paste_id, &user_id),
            )?;
            Ok(())
        });
        assert!(dup.is_err());
        assert_eq!(db.count_likes(&paste_id).unwrap(), 1);
    }

    #[test]
    fn likes_are_per_user() {
        let db = db();
        let a = seed_user(&db, "alice");
        let b = seed_user(&db, "bob");
        let paste_id = seed_paste(&db, &a, "popular");

        db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &a).unwrap();
        db.toggle_like(&Uuid::new_v4().to_string(), &paste_id, &b).unwrap();

        assert_eq!(db.count_likes(&paste_id).unwrap(), 2);
        assert!(db.has_liked(&paste_id, &a).unwrap());
        assert!(db.has_liked(&paste_id, &b).unwrap());
    }
}
