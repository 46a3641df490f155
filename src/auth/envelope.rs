use std::convert::TryInto;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("el token ha expirado")]
    Expired,

    #[error("token inválido")]
    Invalid,

    #[error("no se pudo firmar el token: {0}")]
    Encoding(String),
}

/// Produces tamper-evident, time-stamped envelopes of the form
/// `payload.issued_at.signature`, every part URL-safe base64 without padding.
///
/// The payload is the JSON encoding of the wrapped value and `issued_at` is
/// the big-endian unix time in seconds. The HMAC-SHA256 signature covers
/// `payload.issued_at` under a key derived from the secret and a salt, so
/// envelopes minted for one purpose never verify for another.
#[derive(Clone)]
pub struct TimedSigner {
    key: Vec<u8>,
}

impl TimedSigner {
    pub fn new(secret: &[u8], salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"signer");
        hasher.update(secret);
        Self {
            key: hasher.finalize().to_vec(),
        }
    }

    pub fn sign<T: Serialize>(&self, value: &T) -> Result<String, EnvelopeError> {
        self.sign_at(value, Utc::now())
    }

    pub fn sign_at<T: Serialize>(
        &self,
        value: &T,
        issued_at: DateTime<Utc>,
    ) -> Result<String, EnvelopeError> {
        let payload =
            serde_json::to_vec(value).map_err(|err| EnvelopeError::Encoding(err.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let issued_b64 = URL_SAFE_NO_PAD.encode(issued_at.timestamp().to_be_bytes());

        let mut mac = self
            .mac()
            .ok_or_else(|| EnvelopeError::Encoding("clave de firma inválida".to_string()))?;
        mac.update(payload_b64.as_bytes());
        mac.update(b".");
        mac.update(issued_b64.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}.{}", payload_b64, issued_b64, signature))
    }

    pub fn unsign<T: DeserializeOwned>(
        &self,
        envelope: &str,
        max_age: Duration,
    ) -> Result<T, EnvelopeError> {
        self.unsign_at(envelope, max_age, Utc::now())
    }

    /// Age is checked before the signature: an envelope past `max_age` is
    /// `Expired` whatever its signature says.
    pub fn unsign_at<T: DeserializeOwned>(
        &self,
        envelope: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<T, EnvelopeError> {
        let mut parts = envelope.split('.');
        let (payload_b64, issued_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(p), Some(i), Some(s), None) => (p, i, s),
                _ => {
                    debug!("envelope does not have three parts");
                    return Err(EnvelopeError::Invalid);
                }
            };

        let issued_bytes = decode_part(issued_b64)?;
        let issued_bytes: [u8; 8] = issued_bytes
            .as_slice()
            .try_into()
            .map_err(|_| EnvelopeError::Invalid)?;
        let issued_at = i64::from_be_bytes(issued_bytes);
        let age = now.timestamp().saturating_sub(issued_at);
        if age > max_age.num_seconds() {
            debug!(age, "envelope expired");
            return Err(EnvelopeError::Expired);
        }

        let signature = decode_part(signature_b64)?;
        let mut mac = self.mac().ok_or(EnvelopeError::Invalid)?;
        mac.update(payload_b64.as_bytes());
        mac.update(b".");
        mac.update(issued_b64.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            debug!("envelope signature verification failed");
            return Err(EnvelopeError::Invalid);
        }

        let payload = decode_part(payload_b64)?;
        serde_json::from_slice(&payload).map_err(|err| {
            debug!("envelope payload does not decode: {}", err);
            EnvelopeError::Invalid
        })
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).ok()
    }
}

fn decode_part(part: &str) -> Result<Vec<u8>, EnvelopeError> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|_| EnvelopeError::Invalid)
}
