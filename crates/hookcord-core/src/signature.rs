//! Request signature validation.
//!
//! The platform signs every interaction request with Ed25519 over the
//! concatenation of the `X-Signature-Timestamp` header and the raw body. The
//! application's public key is configured as 64 hex characters.
//!
//! # Example
//!
//! ```rust,ignore
//! let verifier = SignatureVerifier::from_hex(&config.platform.public_key)?;
//! let body = verifier.validate(request.headers(), body)?;
//! ```

use bytes::Bytes;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use http::HeaderMap;
use tracing::trace;

use crate::error::{SignatureError, SignatureResult};

/// Header carrying the hex-encoded detached signature.
pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Verifies interaction requests against the application's public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Creates a verifier from a hex-encoded Ed25519 public key.
    pub fn from_hex(public_key: &str) -> SignatureResult<Self> {
        let raw = hex::decode(public_key.trim())
            .map_err(|e| SignatureError::MalformedKey(e.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| SignatureError::MalformedKey("expected 32 bytes".into()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| SignatureError::MalformedKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Verifies `signature` over `timestamp ‖ body`.
    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> SignatureResult<()> {
        let raw = hex::decode(signature.trim()).map_err(|_| SignatureError::MalformedSignature)?;
        let bytes: [u8; 64] = raw
            .try_into()
            .map_err(|_| SignatureError::MalformedSignature)?;
        let signature = Signature::from_bytes(&bytes);

        let mut signed = Vec::with_capacity(timestamp.len() + body.len());
        signed.extend_from_slice(timestamp.as_bytes());
        signed.extend_from_slice(body);

        self.key
            .verify(&signed, &signature)
            .map_err(|_| SignatureError::Invalid)
    }

    /// Validates a request from its headers, handing the body back on success.
    ///
    /// The body is moved in and either returned or dropped, so callers never
    /// read it twice.
    pub fn validate(&self, headers: &HeaderMap, body: Bytes) -> SignatureResult<Bytes> {
        let checked = header_str(headers, SIGNATURE_HEADER).and_then(|signature| {
            let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
            self.verify(signature, timestamp, &body)
        });

        match checked {
            Ok(()) => Ok(body),
            Err(e) => {
                trace!(error = %e, len = body.len(), "Signature check failed");
                Err(e)
            }
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> SignatureResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use http::HeaderValue;

    const TIMESTAMP: &str = "1700000000";
    const BODY: &[u8] = br#"{"type":1}"#;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::from_hex(&hex::encode(signing_key().verifying_key().to_bytes()))
            .unwrap()
    }

    fn sign(timestamp: &str, body: &[u8]) -> [u8; 64] {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        signing_key().sign(&message).to_bytes()
    }

    #[test]
    fn test_valid_signature_verifies() {
        let signature = hex::encode(sign(TIMESTAMP, BODY));
        assert!(verifier().verify(&signature, TIMESTAMP, BODY).is_ok());
    }

    #[test]
    fn test_signature_bit_flip_fails() {
        let mut signature = sign(TIMESTAMP, BODY);
        signature[10] ^= 0x01;
        assert_eq!(
            verifier().verify(&hex::encode(signature), TIMESTAMP, BODY),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_timestamp_bit_flip_fails() {
        let signature = hex::encode(sign(TIMESTAMP, BODY));
        // '0' ^ 0x01 == '1'
        assert_eq!(
            verifier().verify(&signature, "1700000001", BODY),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_body_bit_flip_fails() {
        let signature = hex::encode(sign(TIMESTAMP, BODY));
        let mut body = BODY.to_vec();
        body[2] ^= 0x01;
        assert_eq!(
            verifier().verify(&signature, TIMESTAMP, &body),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn test_malformed_signature() {
        assert_eq!(
            verifier().verify("zz", TIMESTAMP, BODY),
            Err(SignatureError::MalformedSignature)
        );
        assert_eq!(
            verifier().verify("abcd", TIMESTAMP, BODY),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn test_malformed_key() {
        assert!(matches!(
            SignatureVerifier::from_hex("1234"),
            Err(SignatureError::MalformedKey(_))
        ));
        assert!(matches!(
            SignatureVerifier::from_hex("not hex"),
            Err(SignatureError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_validate_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&hex::encode(sign(TIMESTAMP, BODY))).unwrap(),
        );
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static(TIMESTAMP));

        let body = verifier()
            .validate(&headers, Bytes::from_static(BODY))
            .unwrap();
        assert_eq!(&body[..], BODY);
    }

    #[test]
    fn test_validate_missing_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static(TIMESTAMP));

        assert_eq!(
            verifier().validate(&headers, Bytes::from_static(BODY)),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
    }

    #[test]
    fn test_validate_rejects_tampered_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&hex::encode(sign(TIMESTAMP, BODY))).unwrap(),
        );
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static(TIMESTAMP));

        assert_eq!(
            verifier().validate(&headers, Bytes::from_static(br#"{"type":2}"#)),
            Err(SignatureError::Invalid)
        );
    }
}
