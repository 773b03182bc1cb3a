//! Per-venue connection + credential configuration.
//!
//! Secret fields (`api_secret`, `private_key_pem`) are never populated from
//! the TOML file — they're read from environment variables during
//! [`super::Config::load`] and the `Debug` impls below redact them.

use serde::Deserialize;

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolymarketConfig {
    #[serde(default = "default_poly_api_url")]
    pub api_url: String,
    #[serde(default = "default_poly_ws_url")]
    pub ws_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub passphrase: String,
    /// On-chain address whose balance the signature attests to; sent as
    /// `POLY-ADDRESS`. For `Eoa` this is the signer's own wallet; for
    /// `Proxy`/`Gnosis` it's the funded proxy/multisig address.
    #[serde(default)]
    pub funder_address: String,
    #[serde(default)]
    pub signature_type: crate::venue::auth::SignatureType,
    /// Loaded from `POLYMARKET_API_SECRET`, never read from the file.
    #[serde(skip)]
    pub api_secret: String,
}

impl std::fmt::Debug for PolymarketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolymarketConfig")
            .field("api_url", &self.api_url)
            .field("ws_url", &self.ws_url)
            .field("api_key", &self.api_key)
            .field("passphrase", &"<redacted>")
            .field("funder_address", &self.funder_address)
            .field("signature_type", &self.signature_type)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

fn default_poly_api_url() -> String {
    "https://clob.polymarket.com".into()
}

fn default_poly_ws_url() -> String {
    "wss://ws-subscriptions-clob.polymarket.com/ws/market".into()
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            api_url: default_poly_api_url(),
            ws_url: default_poly_ws_url(),
            api_key: String::new(),
            passphrase: String::new(),
            funder_address: String::new(),
            signature_type: crate::venue::auth::SignatureType::Eoa,
            api_secret: String::new(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KalshiConfig {
    #[serde(default = "default_kalshi_api_url")]
    pub api_url: String,
    #[serde(default = "default_kalshi_ws_url")]
    pub ws_url: String,
    #[serde(default)]
    pub key_id: String,
    /// Loaded from `KALSHI_PRIVATE_KEY_PEM`, never read from the file.
    #[serde(skip)]
    pub private_key_pem: String,
}

impl std::fmt::Debug for KalshiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiConfig")
            .field("api_url", &self.api_url)
            .field("ws_url", &self.ws_url)
            .field("key_id", &self.key_id)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

fn default_kalshi_api_url() -> String {
    "https://trading-api.kalshi.com/trade-api/v2".into()
}

fn default_kalshi_ws_url() -> String {
    "wss://trading-api.kalshi.com/trade-api/ws/v2".into()
}

impl Default for KalshiConfig {
    fn default() -> Self {
        Self {
            api_url: default_kalshi_api_url(),
            ws_url: default_kalshi_ws_url(),
            key_id: String::new(),
            private_key_pem: String::new(),
        }
    }
}
