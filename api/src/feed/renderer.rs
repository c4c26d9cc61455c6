//! Feed renderer
//!
//! Renders the dashboard and people directory to plain-text markdown for
//! clients that don't ask for JSON.

use chrono::{DateTime, Utc};

use crate::app::{Dashboard, FeedEntry, TargetSummary, UserDetail};
use crate::domain::entities::{Image, User};

/// Render a user's dashboard
pub fn render_dashboard(dashboard: &Dashboard, viewer: &User) -> String {
    let mut buf = String::new();

    buf.push_str(&format!("# Dashboard for {}\n\n", viewer.display_name()));

    if dashboard.personalized {
        buf.push_str("## What the people you follow are up to\n\n");
    } else {
        buf.push_str("## Recent activity\n\n");
        buf.push_str("_You are not following anyone yet. Showing everyone's activity._\n\n");
    }

    if dashboard.entries.is_empty() {
        buf.push_str("_Nothing to show yet._\n");
    } else {
        for entry in &dashboard.entries {
            buf.push_str(&render_entry(entry));
        }
    }

    buf.push_str("\n---\n\n");
    buf.push_str("- `GET /account/users` - Browse people to follow\n");
    buf.push_str("- `POST /images` - Bookmark an image\n");

    buf
}

fn render_entry(entry: &FeedEntry) -> String {
    let target = match &entry.target {
        Some(TargetSummary::User(user)) => format!(" {}", user.display_name),
        Some(TargetSummary::Image(image)) => format!(" \"{}\"", truncate(&image.title, 60)),
        None => String::new(),
    };

    format!(
        "- **{}** {}{} ({})\n",
        entry.actor.display_name,
        entry.verb,
        target,
        timesince(entry.created_at)
    )
}

/// Render the people directory
pub fn render_people(people: &[User], viewer: &User) -> String {
    let mut buf = String::new();

    buf.push_str("# People\n\n");

    if people.is_empty() {
        buf.push_str("_No one here yet._\n");
        return buf;
    }

    for user in people {
        let marker = if user.id == viewer.id { " <- you" } else { "" };
        buf.push_str(&format!(
            "- {} (@{}){}\n",
            user.display_name(),
            user.username,
            marker
        ));
    }

    buf
}

/// Render a user's public profile
pub fn render_user_detail(detail: &UserDetail, images: &[Image]) -> String {
    let user = &detail.user;
    let mut buf = String::new();

    buf.push_str(&format!("# {} (@{})\n\n", user.display_name(), user.username));

    buf.push_str("## Stats\n\n");
    buf.push_str(&format!("- **Followers:** {}\n", detail.stats.followers));
    buf.push_str(&format!("- **Following:** {}\n", detail.stats.following));
    buf.push_str(&format!(
        "- **Member since:** {}\n",
        user.created_at.format("%Y-%m-%d")
    ));
    if let Some(photo) = &user.profile.photo_url {
        buf.push_str(&format!("- **Photo:** {}\n", photo));
    }

    buf.push_str("\n## Bookmarked images\n\n");
    if images.is_empty() {
        buf.push_str("_No images bookmarked yet._\n");
    } else {
        for image in images {
            buf.push_str(&format!("- {} <{}>\n", truncate(&image.title, 60), image.url));
        }
    }

    buf.push_str("\n---\n\n");
    let (verb, label) = if detail.stats.viewer_follows {
        ("unfollow", "Unfollow")
    } else {
        ("follow", "Follow")
    };
    buf.push_str(&format!(
        "{}: `POST /account/users/follow` with `id={}&action={}`\n",
        label, user.id, verb
    ));

    buf
}

/// Human-friendly age of a timestamp
fn timesince(at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(at);

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
