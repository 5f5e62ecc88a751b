//! HMAC-SHA256 verification for inbound payment webhooks.
//!
//! The provider signs a manifest of the form `{id};{timestamp};{topic};{resource}`
//! with a shared secret and delivers:
//! - `x-signature`: `v1,{base64-hmac-sha256}`
//! - `x-signature-timestamp`: unix seconds used in the manifest

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature value.
pub const SIGNATURE_HEADER: &str = "x-signature";
/// Header carrying the unix timestamp the signature covers.
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Generate a new webhook secret: base64-encoded 32 random bytes.
///
/// Exposed so operators can mint a secret to share with the provider.
pub fn generate_secret() -> String {
    use rand::RngCore;

    let mut secret_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret_bytes);

    BASE64_STANDARD.encode(secret_bytes)
}

/// Build the signed manifest: `{id};{timestamp};{topic};{resource}`.
pub fn manifest(id: &str, timestamp: i64, topic: &str, resource: &str) -> String {
    format!("{id};{timestamp};{topic};{resource}")
}

/// Sign a webhook manifest.
///
/// Returns the signature in format `v1,{base64-hmac-sha256}`.
pub fn sign(id: &str, timestamp: i64, topic: &str, resource: &str, secret: &str) -> String {
    let signed_content = manifest(id, timestamp, topic, resource);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signed_content.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("v1,{}", BASE64_STANDARD.encode(signature))
}

/// Verify a webhook signature.
///
/// Returns `true` only for a well-formed `v1,` signature that matches the
/// manifest under the shared secret.
pub fn verify(id: &str, timestamp: i64, topic: &str, resource: &str, signature: &str, secret: &str) -> bool {
    let Some(sig_value) = signature.strip_prefix("v1,") else {
        return false;
    };

    let expected = sign(id, timestamp, topic, resource, secret);
    let expected_value = expected.strip_prefix("v1,").expect("sign always emits v1 prefix");

    // Constant-time comparison to prevent timing attacks
    constant_time_eq(sig_value.as_bytes(), expected_value.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let secret = "webhook-shared-secret";
        let timestamp = 1704067200; // 2024-01-01 00:00:00 UTC

        let signature = sign("12345", timestamp, "payment", "/v1/payments/12345", secret);
        assert!(signature.starts_with("v1,"));

        assert!(verify("12345", timestamp, "payment", "/v1/payments/12345", &signature, secret));

        // Any field change breaks the signature
        assert!(!verify("12346", timestamp, "payment", "/v1/payments/12345", &signature, secret));
        assert!(!verify("12345", timestamp + 1, "payment", "/v1/payments/12345", &signature, secret));
        assert!(!verify("12345", timestamp, "merchant_order", "/v1/payments/12345", &signature, secret));
        assert!(!verify("12345", timestamp, "payment", "/other", &signature, secret));

        // Wrong secret fails
        assert!(!verify("12345", timestamp, "payment", "/v1/payments/12345", &signature, "other-secret"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let secret = "webhook-shared-secret";
        let a = sign("9", 1614265330, "payment", "r", secret);
        let b = sign("9", 1614265330, "payment", "r", secret);
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_signature_format() {
        let secret = "webhook-shared-secret";
        assert!(!verify("1", 1, "payment", "r", "invalid", secret));
        assert!(!verify("1", 1, "payment", "r", "v2,abc", secret));
        assert!(!verify("1", 1, "payment", "r", "", secret));
    }

    #[test]
    fn test_generate_secret() {
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a, b);
        assert_eq!(BASE64_STANDARD.decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_manifest_layout() {
        assert_eq!(manifest("12345", 1704067200, "payment", "res"), "12345;1704067200;payment;res");
    }
}
