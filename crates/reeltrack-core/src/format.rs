//! Display helpers for view counts, money and captions.

use rust_decimal::{Decimal, RoundingStrategy};

/// Compact view count: `950`, `1.2K`, `3.4M`, `1.0B`.
#[must_use]
pub fn format_views(views: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let v = views as f64;
    if views >= 1_000_000_000 {
        format!("{:.1}B", v / 1_000_000_000.0)
    } else if views >= 1_000_000 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", v / 1_000.0)
    } else {
        views.to_string()
    }
}

/// USD amount with two decimals and thousands separators: `$1,234.57`.
#[must_use]
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{frac}")
}

/// Truncate `text` to at most `max_chars` characters, ending in `…` when cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('\u{2026}');
    out
}
