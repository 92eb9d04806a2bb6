//! Creation and verification of secure tokens for the "reset forgotten
//! password" feature of web applications.
//!
//! Tokens are stateless: nothing is stored server-side. A token carries its
//! own expiration and is signed with a key derived from the application
//! secret and a per-user password-derived value, so it invalidates itself
//! when the expiry passes or when the user changes their password. That
//! second property makes a token one-time: the reset it authorizes changes
//! the password, which invalidates the token.
//!
//! Wire format, URL-safe base64 (padded or unpadded) over:
//!
//! ```text
//! expiration (4 bytes, big-endian, seconds since epoch) || login || signature
//! ```
//!
//! where signature is `HMAC-SHA256(payload, k)` with
//! `k = HMAC-SHA256(payload, userkey)` and
//! `userkey = HMAC-SHA256(pwdval, secret)`.
//!
//! # Example
//!
//! ```
//! use time::Duration;
//!
//! # fn main() -> Result<(), reset_token::Error> {
//! // Application-wide secret, dedicated to password resets.
//! let secret = b"assume a long randomly generated secret key here";
//! // Anything derived from the user's current password: its hash, the salt
//! // used to produce it, the time of the last change.
//! let pwdval = b"$argon2id$v=19$m=65536,t=3$c29tZXNhbHQ$hash";
//!
//! // Mint a token that expires in 12 hours and email it to the user.
//! let token = reset_token::new_token("alice", Duration::hours(12), pwdval, secret);
//!
//! // When the reset link comes back, verify the token against the *current*
//! // password value for the login it names.
//! let login = reset_token::verify_token(
//!     &token,
//!     |_login| Ok(pwdval.to_vec()), // query the user store here
//!     secret,
//! )?;
//! assert_eq!(login, "alice");
//! # Ok(())
//! # }
//! ```

mod codec;
mod error;
mod sign;
mod token;

pub use codec::{DecodedToken, MIN_TOKEN_LENGTH, SIGNATURE_LENGTH, decode_token};
pub use error::{Error, LookupError};
pub use token::{
    new_token, new_token_at, new_token_unpadded, new_token_unpadded_at, verify_token,
    verify_token_at,
};
