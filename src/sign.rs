use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::codec::SIGNATURE_LENGTH;

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Per-user signing key: the password-derived value keyed by the application
/// secret. Recomputed on every call, never cached; the password value changes
/// whenever the user changes their password and the key must follow it.
pub(crate) fn derive_user_key(pwdval: &[u8], secret: &[u8]) -> [u8; SIGNATURE_LENGTH] {
    hmac_sha256(secret, pwdval)
}

/// Two-stage keyed hash over the payload: the inner round digests the payload
/// under the user key, the outer round signs the payload under that digest.
pub(crate) fn sign(
    payload: &[u8],
    user_key: &[u8; SIGNATURE_LENGTH],
) -> [u8; SIGNATURE_LENGTH] {
    let inner = hmac_sha256(user_key, payload);
    hmac_sha256(&inner, payload)
}

/// Recompute the signature and compare in constant time.
pub(crate) fn verify_signature(
    payload: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    user_key: &[u8; SIGNATURE_LENGTH],
) -> bool {
    sign(payload, user_key).ct_eq(signature).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_payload;

    const TEST_PWDVAL: &[u8] = b"password value";
    const TEST_SECRET: &[u8] = b"application secret key";

    // HMAC-SHA256(key = TEST_SECRET, message = TEST_PWDVAL).
    const USER_KEY: [u8; SIGNATURE_LENGTH] = [
        0x0c, 0x01, 0x9f, 0x43, 0xda, 0x56, 0x53, 0x8c, 0x70, 0x3b, 0x58, 0x9a, 0x6b, 0xe1,
        0x2d, 0xe2, 0x1c, 0x5b, 0xa7, 0xa8, 0x95, 0xa8, 0x21, 0x43, 0x8b, 0x32, 0x76, 0xff,
        0x7c, 0x9b, 0xd1, 0xbf,
    ];

    // Two-stage signature over encode_payload(1_700_000_120, b"alice").
    const SIGNATURE: [u8; SIGNATURE_LENGTH] = [
        0xbc, 0x65, 0xd6, 0xb3, 0x24, 0x65, 0x64, 0x5b, 0x05, 0x87, 0xbe, 0x77, 0x03, 0x3a,
        0x6f, 0xfd, 0x9c, 0xc7, 0x12, 0xbe, 0x33, 0xb7, 0x29, 0x0c, 0x67, 0x3c, 0x0d, 0x1c,
        0xb6, 0x65, 0xf2, 0x15,
    ];

    #[test]
    fn derives_user_key_from_secret_and_pwdval() {
        assert_eq!(derive_user_key(TEST_PWDVAL, TEST_SECRET), USER_KEY);
        // Either input changing must change the key.
        assert_ne!(derive_user_key(b"other value", TEST_SECRET), USER_KEY);
        assert_ne!(derive_user_key(TEST_PWDVAL, b"other secret"), USER_KEY);
    }

    #[test]
    fn signature_golden_vector() {
        let payload = encode_payload(1_700_000_120, b"alice");
        assert_eq!(sign(&payload, &USER_KEY), SIGNATURE);
    }

    #[test]
    fn signature_uses_two_keyed_rounds() {
        let payload = encode_payload(1_700_000_120, b"alice");
        // A single HMAC round under the user key is not a valid signature.
        let single = hmac_sha256(&USER_KEY, &payload);
        assert_ne!(sign(&payload, &USER_KEY), single);
        assert!(!verify_signature(&payload, &single, &USER_KEY));
    }

    #[test]
    fn verifies_matching_signature_only() {
        let payload = encode_payload(1_700_000_120, b"alice");
        assert!(verify_signature(&payload, &SIGNATURE, &USER_KEY));

        let mut wrong = SIGNATURE;
        wrong[0] ^= 0x01;
        assert!(!verify_signature(&payload, &wrong, &USER_KEY));
        assert!(!verify_signature(b"other payload", &SIGNATURE, &USER_KEY));
    }
}
