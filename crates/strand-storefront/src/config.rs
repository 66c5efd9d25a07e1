//! Storefront configuration.
//!
//! Loaded from a TOML file or from environment variables. The public
//! base URL is the one value checkout cannot run without: redirect URLs
//! handed to the payment provider are built from it, and the provider
//! requires them to be HTTPS.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use strand_payments::PaymentCredentials;

/// Storefront configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Publicly reachable base URL of the storefront (e.g.
    /// "https://shop.example.is"). Required for checkout.
    pub public_base_url: Option<String>,

    /// Payment provider credentials.
    pub payment: PaymentCredentials,

    /// Notification settings.
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// Order-notification settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    /// Address order notifications are intended for. Informational for
    /// the logging notifier; an SMTP notifier would deliver to it.
    #[serde(default)]
    pub order_email: Option<String>,
}

impl StoreConfig {
    /// Load config from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path))
    }

    /// Assemble config from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            public_base_url: std::env::var("STRAND_PUBLIC_BASE_URL").ok(),
            payment: PaymentCredentials {
                api_base_url: std::env::var("STRAND_PAYMENT_API_BASE_URL")
                    .unwrap_or_else(|_| "https://sandboxapi.rapyd.net".to_string()),
                access_key: std::env::var("STRAND_PAYMENT_ACCESS_KEY")
                    .context("STRAND_PAYMENT_ACCESS_KEY is not set")?,
                secret_key: std::env::var("STRAND_PAYMENT_SECRET_KEY")
                    .context("STRAND_PAYMENT_SECRET_KEY is not set")?,
            },
            notifications: NotificationSettings {
                order_email: std::env::var("STRAND_ORDER_EMAIL").ok(),
            },
        })
    }

    /// Base URL for checkout redirect targets.
    ///
    /// A configured value that is not HTTPS is upgraded by prefixing
    /// `https://`; a missing value is a fatal configuration error.
    pub fn checkout_redirect_base(&self) -> Result<String> {
        let url = match &self.public_base_url {
            Some(url) if !url.is_empty() => url,
            _ => bail!("public_base_url is not set"),
        };

        if url.starts_with("https://") {
            Ok(url.clone())
        } else {
            Ok(format!("https://{}", url))
        }
    }
}
