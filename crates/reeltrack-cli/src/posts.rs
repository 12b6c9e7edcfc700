//! Post submission, removal and listing.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use reeltrack_core::format::{format_views, truncate_text};
use reeltrack_tracker::Tracker;
use uuid::Uuid;

pub(crate) async fn run_submit(tracker: &Tracker, url: &str) -> anyhow::Result<()> {
    let post = tracker.submit(url).await?;
    println!(
        "tracking {} ({}) by @{}: {} views",
        post.shortcode,
        post.id,
        post.owner_handle,
        format_views(post.views)
    );
    Ok(())
}

/// Submit URLs from the command line and, optionally, a file with one URL per
/// line. Blank lines and `#` comments in the file are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or no URL is a valid reference.
pub(crate) async fn run_batch(
    tracker: &Tracker,
    mut urls: Vec<String>,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read URL file {}", path.display()))?;
        urls.extend(parse_url_lines(&content));
    }

    let report = tracker.submit_batch(&urls).await?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(post) => println!("  ok      {} {}", post.shortcode, post.id),
            Err(e) => println!("  failed  {}: {e}", outcome.url),
        }
    }
    for url in &report.rejected {
        println!("  skipped {url}: not an Instagram reel, post or video URL");
    }
    println!(
        "{} admitted, {} failed, {} skipped",
        report.admitted(),
        report.failed(),
        report.rejected.len()
    );
    Ok(())
}

pub(crate) async fn run_delete(tracker: &Tracker, id: &str) -> anyhow::Result<()> {
    let id = Uuid::parse_str(id).with_context(|| format!("'{id}' is not a valid post id"))?;
    if tracker.delete_post(id).await? {
        println!("deleted {id}");
    } else {
        println!("no tracked post with id {id}");
    }
    Ok(())
}

pub(crate) fn run_list(tracker: &Tracker, limit: usize) {
    let posts = tracker.posts();
    if posts.is_empty() {
        println!("no posts tracked yet; run `submit <url>` first");
        return;
    }

    println!(
        "{:<38}{:<14}{:>8}{:>8}{:>8}  {:<10}CAPTION",
        "ID", "SHORTCODE", "VIEWS", "LIKES", "CMTS", "UPDATED"
    );
    let now = Utc::now();
    for post in posts.iter().take(limit) {
        println!(
            "{:<38}{:<14}{:>8}{:>8}{:>8}  {:<10}{}",
            post.id,
            truncate_text(&post.shortcode, 13),
            format_views(post.views),
            format_views(post.likes),
            format_views(post.comments),
            time_ago(now - post.last_updated),
            truncate_text(&post.caption, 40)
        );
    }
    if posts.len() > limit {
        println!("... {} more", posts.len() - limit);
    }
}

/// Trimmed non-empty lines that are not `#` comments.
pub(crate) fn parse_url_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Coarse relative age: `just now`, `5m ago`, `3h ago`, `2d ago`.
pub(crate) fn time_ago(age: chrono::Duration) -> String {
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}
