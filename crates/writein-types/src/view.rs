//! Display helpers for the paste pages: the strings the UI shows are
//! decided here, not scattered through handlers.

use chrono::{DateTime, Utc};

/// Shown when a paste or comment has no profile row to render.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

pub const NO_COMMENTS_PROMPT: &str = "No comments yet. Be the first to comment!";

pub const NOT_FOUND_TITLE: &str = "PASTE NOT FOUND";
pub const NOT_FOUND_MESSAGE: &str = "This paste doesn't exist or has been deleted.";

/// Maximum characters of paste content shown on a dashboard card.
pub const PREVIEW_LEN: usize = 100;

pub fn display_name(username: Option<&str>) -> &str {
    match username {
        Some(name) => name,
        None => DEFAULT_AUTHOR,
    }
}

pub fn like_label(count: i64) -> String {
    if count == 1 {
        "1 Like".to_string()
    } else {
        format!("{count} Likes")
    }
}

pub fn comments_heading(count: usize) -> String {
    format!("COMMENTS ({count})")
}

/// First [`PREVIEW_LEN`] characters of the content, ellipsized when cut.
/// Truncation counts chars, not bytes, so multibyte content stays intact.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

/// Shareable URL for a paste: the slug is the only public identifier,
/// internal ids never appear here.
pub fn share_url(origin: &str, slug: &str) -> String {
    format!("{}/p/{}", origin.trim_end_matches('/'), slug)
}

/// Coarse relative timestamp, the treatment the paste and dashboard pages
/// use for `created_at`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    if secs < 60 {
        return "just now".to_string();
    }

    let mins = secs / 60;
    if mins < 60 {
        return plural(mins, "minute");
    }

    let hours = mins / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    plural(hours / 24, "day")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn display_name_falls_back_to_anonymous() {
        assert_eq!(display_name(None), "Anonymous");
        assert_eq!(display_name(Some("vaish")), "vaish");
    }

    #[test]
    fn like_label_zero() {
        assert_eq!(like_label(0), "0 Likes");
    }

    #[test]
    fn like_label_singular() {
        assert_eq!(like_label(1), "1 Like");
    }

    #[test]
    fn like_label_plural() {
        assert_eq!(like_label(12), "12 Likes");
    }

    #[test]
    fn comments_heading_counts() {
        assert_eq!(comments_heading(0), "COMMENTS (0)");
        assert_eq!(comments_heading(1), "COMMENTS (1)");
    }

    #[test]
    fn preview_short_content_unchanged() {
        assert_eq!(preview("print(1)"), "print(1)");
    }

    #[test]
    fn preview_truncates_long_content() {
        let content = "x".repeat(250);
        let p = preview(&content);
        assert_eq!(p.len(), PREVIEW_LEN + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let content = "é".repeat(150);
        let p = preview(&content);
        assert_eq!(p.chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn share_url_joins_origin_and_slug() {
        assert_eq!(
            share_url("https://writein.app", "hello-world"),
            "https://writein.app/p/hello-world"
        );
    }

    #[test]
    fn share_url_strips_trailing_slash() {
        assert_eq!(share_url("http://localhost:3000/", "abc123"), "http://localhost:3000/p/abc123");
    }

    #[test]
    fn relative_time_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "just now");
        assert_eq!(relative_time(now - Duration::seconds(59), now), "just now");
    }

    #[test]
    fn relative_time_minutes() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(45), now), "45 minutes ago");
    }

    #[test]
    fn relative_time_hours_and_days() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
    }

    #[test]
    fn relative_time_future_clamps_to_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::minutes(5), now), "just now");
    }
}
