//! The aggregate creator record and its editable settings.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::posts::TrackedPost;
use crate::ConfigError;

/// Default handle for a freshly created profile.
pub const DEFAULT_CREATOR_HANDLE: &str = "creator";

/// Payout rate in USD per 1000 views.
#[must_use]
pub fn payout_rate_per_thousand() -> Decimal {
    Decimal::new(25, 3)
}

/// Estimated payout for `total_views`: `(views / 1000) * 0.025`.
#[must_use]
pub fn estimated_payout(total_views: u64) -> Decimal {
    Decimal::from(total_views) / Decimal::from(1000) * payout_rate_per_thousand()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethods {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usdt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi: Option<String>,
}

impl PaymentMethods {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.usdt.is_none() && self.paypal.is_none() && self.upi.is_none()
    }
}

/// Summary of every tracked post for the single creator.
///
/// `total_views`, `total_posts` and `estimated_payout` are derived from the
/// post collection by [`CreatorProfile::recompute`] and are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub id: Uuid,
    pub handle: String,
    pub total_views: u64,
    pub total_posts: u64,
    pub estimated_payout: Decimal,
    pub linked_accounts: Vec<String>,
    pub payment_methods: PaymentMethods,
    pub approved: bool,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl CreatorProfile {
    #[must_use]
    pub fn new(handle: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle: handle.into(),
            total_views: 0,
            total_posts: 0,
            estimated_payout: Decimal::ZERO,
            linked_accounts: Vec::new(),
            payment_methods: PaymentMethods::default(),
            approved: true,
            created_at,
        }
    }

    /// Re-derive the aggregate fields from `posts`.
    pub fn recompute(&mut self, posts: &[TrackedPost]) {
        let total_views = posts
            .iter()
            .fold(0u64, |sum, post| sum.saturating_add(post.views));
        self.total_views = total_views;
        self.total_posts = u64::try_from(posts.len()).unwrap_or(u64::MAX);
        self.estimated_payout = estimated_payout(total_views);
    }

    /// Replace the user-editable fields with `settings`.
    pub fn apply_settings(&mut self, settings: CreatorSettings) {
        self.handle = settings.handle;
        self.linked_accounts = settings.linked_accounts;
        self.payment_methods = settings.payment_methods;
    }
}

/// User-editable creator fields, loadable from a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorSettings {
    pub handle: String,
    #[serde(default)]
    pub linked_accounts: Vec<String>,
    #[serde(default)]
    pub payment_methods: PaymentMethods,
}

/// Load and validate creator settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_creator_settings(path: &Path) -> Result<CreatorSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CreatorFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let settings: CreatorSettings =
        serde_yaml::from_str(&content).map_err(ConfigError::CreatorFileParse)?;

    validate_settings(&settings)?;
    Ok(settings)
}

/// Validate handles and payment details.
///
/// # Errors
///
/// Returns `ConfigError::Validation` describing the first invalid field.
pub fn validate_settings(settings: &CreatorSettings) -> Result<(), ConfigError> {
    if !is_valid_handle(&settings.handle) {
        return Err(ConfigError::Validation(format!(
            "invalid creator handle '{}'",
            settings.handle
        )));
    }

    for account in &settings.linked_accounts {
        if !is_valid_handle(account) {
            return Err(ConfigError::Validation(format!(
                "invalid linked account handle '{account}'"
            )));
        }
    }

    let methods = &settings.payment_methods;
    if let Some(usdt) = &methods.usdt {
        if !is_valid_usdt_address(usdt) {
            return Err(ConfigError::Validation(format!(
                "invalid USDT ERC20 address '{usdt}'"
            )));
        }
    }
    if let Some(paypal) = &methods.paypal {
        if !is_valid_email(paypal) {
            return Err(ConfigError::Validation(format!(
                "invalid PayPal email '{paypal}'"
            )));
        }
    }
    if let Some(upi) = &methods.upi {
        if !is_valid_upi_address(upi) {
            return Err(ConfigError::Validation(format!(
                "invalid UPI address '{upi}'"
            )));
        }
    }

    Ok(())
}

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._]{1,30}$").expect("valid handle regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// 1-30 letters, digits, periods or underscores, with an optional leading `@`.
#[must_use]
pub fn is_valid_handle(handle: &str) -> bool {
    let handle = handle.trim();
    let handle = handle.strip_prefix('@').unwrap_or(handle);
    HANDLE_RE.is_match(handle)
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// `0x` followed by exactly 40 hex digits.
#[must_use]
pub fn is_valid_usdt_address(address: &str) -> bool {
    address
        .trim()
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[must_use]
pub fn is_valid_upi_address(upi: &str) -> bool {
    let upi = upi.trim();
    upi.contains('@') && upi.len() >= 5
}
