use base64ct::{Base64Url, Base64UrlUnpadded, Encoding};

use crate::error::Error;

/// Number of bytes in the big-endian expiration prefix.
const EXPIRATION_LENGTH: usize = 4;

/// Number of bytes in the trailing HMAC-SHA256 signature.
pub const SIGNATURE_LENGTH: usize = 32;

/// Minimum encoded length of a token string.
///
/// The shortest wire image is the zero-length-login edge case: 4 expiration
/// bytes plus 32 signature bytes encode to 48 characters in both base64
/// variants. Before handing untrusted input to [`verify_token`], callers can
/// cheaply reject anything longer than the maximum login length allowed in
/// their application plus `MIN_TOKEN_LENGTH`.
///
/// [`verify_token`]: crate::verify_token
pub const MIN_TOKEN_LENGTH: usize = (EXPIRATION_LENGTH + SIGNATURE_LENGTH) / 3 * 4;

/// Base64 variant used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Padding {
    Padded,
    Unpadded,
}

impl Padding {
    /// Unpadded URL-safe base64 never contains `=`, so a trailing padding
    /// character identifies the variant without any encoder state.
    fn detect(token: &str) -> Self {
        if token.ends_with('=') {
            Padding::Padded
        } else {
            Padding::Unpadded
        }
    }
}

/// Decoded wire image of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Expiration as seconds since the Unix epoch.
    pub expiration: u32,
    /// Raw login bytes, everything between the expiration prefix and the
    /// trailing signature. Not null-terminated, no length prefix.
    pub login: Vec<u8>,
    /// Signature over `expiration || login`.
    pub signature: [u8; SIGNATURE_LENGTH],
}

impl DecodedToken {
    /// Signed portion of the token: the expiration prefix followed by the
    /// login bytes.
    pub(crate) fn payload(&self) -> Vec<u8> {
        encode_payload(self.expiration, &self.login)
    }
}

pub(crate) fn encode_payload(expiration: u32, login: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(EXPIRATION_LENGTH + login.len());
    payload.extend_from_slice(&expiration.to_be_bytes());
    payload.extend_from_slice(login);
    payload
}

pub(crate) fn encode_token(
    payload: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    padding: Padding,
) -> String {
    let mut raw = Vec::with_capacity(payload.len() + SIGNATURE_LENGTH);
    raw.extend_from_slice(payload);
    raw.extend_from_slice(signature);
    match padding {
        Padding::Padded => Base64Url::encode_string(&raw),
        Padding::Unpadded => Base64UrlUnpadded::encode_string(&raw),
    }
}

/// Decode a token string into its expiration, login, and signature.
///
/// Both base64 variants are accepted; the variant is detected from the input.
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] if the input is not valid URL-safe
/// base64, or if the decoded form is too short to carry a 4-byte expiration,
/// at least one login byte, and a 32-byte signature.
pub fn decode_token(token: &str) -> Result<DecodedToken, Error> {
    // Cheap length screen before any allocation.
    if token.len() < MIN_TOKEN_LENGTH {
        return Err(Error::MalformedToken);
    }
    let raw = match Padding::detect(token) {
        Padding::Padded => Base64Url::decode_vec(token),
        Padding::Unpadded => Base64UrlUnpadded::decode_vec(token),
    }
    .map_err(|_| Error::MalformedToken)?;
    // At least one login byte must sit between the prefix and the signature.
    if raw.len() <= EXPIRATION_LENGTH + SIGNATURE_LENGTH {
        return Err(Error::MalformedToken);
    }
    let (payload, signature) = raw.split_at(raw.len() - SIGNATURE_LENGTH);
    let (expiration, login) = payload.split_at(EXPIRATION_LENGTH);
    Ok(DecodedToken {
        expiration: u32::from_be_bytes(
            expiration.try_into().map_err(|_| Error::MalformedToken)?,
        ),
        login: login.to_vec(),
        signature: signature.try_into().map_err(|_| Error::MalformedToken)?,
    })
}
