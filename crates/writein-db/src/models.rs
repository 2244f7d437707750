/// Database row types — these map directly to SQLite rows.
/// Distinct from writein-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct ProfileRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub created_at: String,
}

pub struct PasteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub paste_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}
