//! Request signing for both venues (spec §4.2).
//!
//! Secret material is never logged or serialized: both signer types derive
//! only `Clone`, never `Debug`.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Which on-chain balance a Polymarket-like signature attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignatureType {
    /// Externally-owned account signing directly.
    Eoa,
    /// Signing on behalf of a funded proxy wallet.
    Proxy,
    /// Signing on behalf of a Gnosis Safe multisig.
    Gnosis,
}

impl Default for SignatureType {
    fn default() -> Self {
        Self::Eoa
    }
}

/// L2 credential tuple plus HMAC signer for the Polymarket-like venue.
#[derive(Clone)]
pub struct HmacSigner {
    api_key: String,
    secret: String,
    passphrase: String,
    /// On-chain address whose balance this signer attests to; sent as
    /// `POLY-ADDRESS` alongside every signed request.
    address: String,
    signature_type: SignatureType,
}

/// One fully-built set of auth headers for a signed request.
#[derive(Debug, Clone)]
pub struct PolymarketAuthHeaders {
    pub api_key: String,
    pub passphrase: String,
    pub address: String,
    pub timestamp: String,
    pub signature: String,
}

impl HmacSigner {
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
        address: impl Into<String>,
        signature_type: SignatureType,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
            address: address.into(),
            signature_type,
        }
    }

    #[must_use]
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// Sign `timestamp || method || path || body` with HMAC-SHA256 and
    /// base64-URL encode the digest, then assemble the full header set.
    pub fn sign(&self, timestamp_secs: i64, method: &str, path: &str, body: &str) -> Result<PolymarketAuthHeaders> {
        let timestamp = timestamp_secs.to_string();
        let message = format!("{timestamp}{method}{path}{body}");

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Signing(e.to_string()))?;
        mac.update(message.as_bytes());
        let signature = URL_SAFE.encode(mac.finalize().into_bytes());

        Ok(PolymarketAuthHeaders {
            api_key: self.api_key.clone(),
            passphrase: self.passphrase.clone(),
            address: self.address.clone(),
            timestamp,
            signature,
        })
    }
}

/// RSA-PSS signer for the Kalshi-like venue.
#[derive(Clone)]
pub struct RsaPssSigner {
    key_id: String,
    private_key: RsaPrivateKey,
}

#[derive(Debug, Clone)]
pub struct KalshiAuthHeaders {
    pub access_key: String,
    pub timestamp_ms: String,
    pub signature: String,
}

impl RsaPssSigner {
    /// Parse a PKCS#8 PEM-encoded RSA private key.
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| Error::Signing(format!("invalid RSA private key: {e}")))?;
        Ok(Self { key_id: key_id.into(), private_key })
    }

    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign `timestamp_ms || method || path_without_query` with
    /// RSA-PSS/SHA-256, salt length equal to the digest length.
    pub fn sign(&self, timestamp_ms: i64, method: &str, path_without_query: &str) -> Result<KalshiAuthHeaders> {
        let timestamp_ms_str = timestamp_ms.to_string();
        let message = format!("{timestamp_ms_str}{method}{path_without_query}");

        let signing_key = SigningKey::<Sha256>::new(self.private_key.clone());
        let signature = signing_key.sign_with_rng(&mut OsRng, message.as_bytes());
        let encoded = STANDARD.encode(signature.to_bytes());

        Ok(KalshiAuthHeaders {
            access_key: self.key_id.clone(),
            timestamp_ms: timestamp_ms_str,
            signature: encoded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_signature_is_stable_for_identical_inputs() {
        let signer = HmacSigner::new("key", "secret", "pass", "0xabc", SignatureType::Eoa);
        let a = signer.sign(1_700_000_000, "POST", "/orders", "{}").unwrap();
        let b = signer.sign(1_700_000_000, "POST", "/orders", "{}").unwrap();
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn hmac_signature_changes_with_body() {
        let signer = HmacSigner::new("key", "secret", "pass", "0xabc", SignatureType::Eoa);
        let a = signer.sign(1_700_000_000, "POST", "/orders", "{\"a\":1}").unwrap();
        let b = signer.sign(1_700_000_000, "POST", "/orders", "{\"a\":2}").unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn rsa_pss_signs_and_verifies_round_trip() {
        use rsa::pss::VerifyingKey;
        use rsa::signature::Verifier;

        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let pem = {
            use rsa::pkcs8::EncodePrivateKey;
            private_key.to_pkcs8_pem(Default::default()).unwrap()
        };
        let signer = RsaPssSigner::from_pem("key-id", &pem).unwrap();
        let headers = signer.sign(1_700_000_000_000, "GET", "/trade-api/v2/portfolio/balance").unwrap();

        let verifying_key: VerifyingKey<Sha256> = VerifyingKey::new(signer.private_key.to_public_key());
        let message = format!("{}GET/trade-api/v2/portfolio/balance", headers.timestamp_ms);
        let signature_bytes = STANDARD.decode(&headers.signature).unwrap();
        let signature = signature_bytes.as_slice().try_into().unwrap();
        verifying_key.verify(message.as_bytes(), &signature).unwrap();
    }
}
