use thiserror::Error;

/// Error type produced by the password lookup collaborator.
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Token could not be decoded, or its decoded form is too short to carry
    /// an expiration, a login, and a signature.
    #[error("malformed token")]
    MalformedToken,
    /// Token expiration timestamp is in the past.
    #[error("token expired")]
    ExpiredToken,
    /// Recomputed signature does not match the one carried by the token.
    /// Also the result of verifying with a different application secret, and
    /// of presenting a token minted before the user's password value changed.
    #[error("wrong token signature")]
    WrongSignature,
    /// Error returned by the password lookup collaborator, passed through
    /// verbatim.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
