//! Analytics, profile and settings commands.

use std::path::Path;

use reeltrack_core::format::{format_currency, format_views, truncate_text};
use reeltrack_core::{load_creator_settings, timestamp, CreatorProfile};
use reeltrack_tracker::{AnalyticsSnapshot, Tracker};

pub(crate) fn run_analytics(tracker: &Tracker) {
    print_analytics(&tracker.compute_analytics());
}

pub(crate) fn print_analytics(analytics: &AnalyticsSnapshot) {
    println!("total views:   {}", format_views(analytics.total_views));
    println!("total posts:   {}", analytics.total_posts);
    println!("24h growth:    {:+.1}%", analytics.view_growth_percent);

    match &analytics.top_post {
        Some(post) => println!(
            "top post:      {} ({} views)",
            post.shortcode,
            format_views(post.views)
        ),
        None => println!("top post:      none"),
    }

    if analytics.recent_activity.is_empty() {
        return;
    }
    println!("recent activity:");
    for post in &analytics.recent_activity {
        println!(
            "  {:<14}{:>8} views  {}",
            truncate_text(&post.shortcode, 13),
            format_views(post.views),
            timestamp::to_iso8601(&post.last_updated)
        );
    }
}

pub(crate) async fn run_refresh(tracker: &Tracker) -> anyhow::Result<()> {
    println!("refreshing metrics...");
    let refreshed = tracker.force_refresh().await?;
    println!("refreshed {refreshed} posts");
    Ok(())
}

pub(crate) fn run_profile(tracker: &Tracker) {
    print_profile(&tracker.profile());
}

fn print_profile(profile: &CreatorProfile) {
    println!("handle:           @{}", profile.handle);
    println!("total views:      {}", format_views(profile.total_views));
    println!("total posts:      {}", profile.total_posts);
    println!(
        "estimated payout: {}",
        format_currency(profile.estimated_payout)
    );
    println!(
        "status:           {}",
        if profile.approved { "approved" } else { "pending" }
    );
    if !profile.linked_accounts.is_empty() {
        println!("linked accounts:  {}", profile.linked_accounts.join(", "));
    }

    let methods = &profile.payment_methods;
    if methods.is_empty() {
        println!("payment methods:  none");
        return;
    }
    println!("payment methods:");
    if let Some(usdt) = &methods.usdt {
        println!("  USDT (ERC20): {usdt}");
    }
    if let Some(paypal) = &methods.paypal {
        println!("  PayPal:       {paypal}");
    }
    if let Some(upi) = &methods.upi {
        println!("  UPI:          {upi}");
    }
}

/// Apply creator settings from `file`, or from `default_path` when no file is
/// given. A missing default file is reported rather than treated as an error.
///
/// # Errors
///
/// Returns an error if the settings file is missing (when given explicitly),
/// unreadable or invalid, or the profile cannot be saved.
pub(crate) async fn run_settings(
    tracker: &Tracker,
    file: Option<&Path>,
    default_path: &Path,
) -> anyhow::Result<()> {
    let path = match file {
        Some(path) => path,
        None if default_path.exists() => default_path,
        None => {
            println!(
                "no creator settings file at {}; pass --file or set REELTRACK_CREATOR_PATH",
                default_path.display()
            );
            return Ok(());
        }
    };

    let settings = load_creator_settings(path)?;
    let profile = tracker.update_settings(settings).await?;
    println!("updated creator settings from {}", path.display());
    print_profile(&profile);
    Ok(())
}
