use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::codec::{self, Padding};
use crate::error::{Error, LookupError};
use crate::sign::{derive_user_key, sign, verify_signature};

/// Create a password reset token for `login`, expiring `valid_for` after now.
///
/// `pwdval` is any value derived from the user's current password that will
/// change once the password changes (a password hash, the salt used to
/// produce it, the time of the last password change). `secret` is the
/// application-wide secret key. Neither value is embedded in the token.
///
/// The token is encoded as padded URL-safe base64; see
/// [`new_token_unpadded`] for the shorter unpadded variant. A negative
/// `valid_for` is allowed and produces an already-expired token.
pub fn new_token(login: &str, valid_for: Duration, pwdval: &[u8], secret: &[u8]) -> String {
    new_token_at(login, valid_for, pwdval, secret, unix_now())
}

/// [`new_token`] with the unpadded base64 variant, yielding a shorter string.
pub fn new_token_unpadded(
    login: &str,
    valid_for: Duration,
    pwdval: &[u8],
    secret: &[u8],
) -> String {
    new_token_unpadded_at(login, valid_for, pwdval, secret, unix_now())
}

/// [`new_token`] relative to an explicit timestamp instead of the wall clock.
pub fn new_token_at(
    login: &str,
    valid_for: Duration,
    pwdval: &[u8],
    secret: &[u8],
    now_unix_seconds: i64,
) -> String {
    mint(login, valid_for, pwdval, secret, now_unix_seconds, Padding::Padded)
}

/// [`new_token_unpadded`] relative to an explicit timestamp.
pub fn new_token_unpadded_at(
    login: &str,
    valid_for: Duration,
    pwdval: &[u8],
    secret: &[u8],
    now_unix_seconds: i64,
) -> String {
    mint(login, valid_for, pwdval, secret, now_unix_seconds, Padding::Unpadded)
}

/// Verify a password reset token and return the login it was issued for.
///
/// `lookup_pwdval` must return the *current* password-derived value for the
/// login it receives, or an error if there is no such user. It is called at
/// most once, only after the cheap expiration check has passed. A token
/// minted before the stored value changed fails with
/// [`Error::WrongSignature`]; this is what makes tokens one-time.
///
/// The expiration timestamp carries whole seconds but the wall clock is read
/// at nanosecond resolution, so a token minted with a zero duration is
/// already expired by the time it can be verified.
///
/// # Errors
///
/// - [`Error::MalformedToken`] if the token cannot be decoded.
/// - [`Error::ExpiredToken`] if the expiration timestamp is in the past.
/// - [`Error::Lookup`] carrying the collaborator's error, verbatim.
/// - [`Error::WrongSignature`] if the recomputed signature does not match.
pub fn verify_token<F>(token: &str, lookup_pwdval: F, secret: &[u8]) -> Result<String, Error>
where
    F: FnOnce(&str) -> Result<Vec<u8>, LookupError>,
{
    verify_at_nanos(
        token,
        lookup_pwdval,
        secret,
        OffsetDateTime::now_utc().unix_timestamp_nanos(),
    )
}

/// [`verify_token`] against an explicit whole-second timestamp instead of the
/// wall clock. A token expiring exactly at `now_unix_seconds` is still valid.
pub fn verify_token_at<F>(
    token: &str,
    lookup_pwdval: F,
    secret: &[u8],
    now_unix_seconds: i64,
) -> Result<String, Error>
where
    F: FnOnce(&str) -> Result<Vec<u8>, LookupError>,
{
    verify_at_nanos(
        token,
        lookup_pwdval,
        secret,
        i128::from(now_unix_seconds) * NANOS_PER_SECOND,
    )
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;

fn verify_at_nanos<F>(
    token: &str,
    lookup_pwdval: F,
    secret: &[u8],
    now_unix_nanos: i128,
) -> Result<String, Error>
where
    F: FnOnce(&str) -> Result<Vec<u8>, LookupError>,
{
    let decoded = codec::decode_token(token)?;
    // Expiration comes before the lookup collaborator, so a trivially
    // expired token never costs an external call.
    if i128::from(decoded.expiration) * NANOS_PER_SECOND < now_unix_nanos {
        debug!(expiration = decoded.expiration, "rejected expired reset token");
        return Err(Error::ExpiredToken);
    }
    let payload = decoded.payload();
    let login = String::from_utf8(decoded.login).map_err(|_| Error::MalformedToken)?;
    let pwdval = lookup_pwdval(&login)?;
    let user_key = derive_user_key(&pwdval, secret);
    if !verify_signature(&payload, &decoded.signature, &user_key) {
        debug!(%login, "rejected reset token with wrong signature");
        return Err(Error::WrongSignature);
    }
    Ok(login)
}

fn mint(
    login: &str,
    valid_for: Duration,
    pwdval: &[u8],
    secret: &[u8],
    now_unix_seconds: i64,
    padding: Padding,
) -> String {
    // Timestamps outside the u32 wire range clamp to the nearest bound: a
    // pre-epoch expiration is long expired, a post-2106 one never expires.
    let expires = now_unix_seconds.saturating_add(valid_for.whole_seconds());
    let expiration = expires.clamp(0, i64::from(u32::MAX)) as u32;
    let user_key = derive_user_key(pwdval, secret);
    let payload = codec::encode_payload(expiration, login.as_bytes());
    let signature = sign(&payload, &user_key);
    codec::encode_token(&payload, &signature, padding)
}

fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
