/// Every way an issuance, verification, or session operation can fail.
///
/// All variants are terminal for the request that produced them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("session expired")]
    SessionExpired,
    #[error("invalid account_id")]
    AccountMismatch,
    #[error("invalid client_id")]
    OriginMismatch,
    #[error("client_id is not in approved_clients")]
    ClientNotApproved,
    #[error("assertion signature is invalid")]
    SignatureInvalid,
    #[error("assertion issuer does not match")]
    IssuerMismatch,
    #[error("assertion audience does not match")]
    AudienceMismatch,
    #[error("nonce does not match")]
    NonceMismatch,
    #[error("assertion expired")]
    AssertionExpired,
    #[error("account lookup failed")]
    AccountLookupFailed,
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable snake_case code reported to clients.
    pub fn code(&self) -> &'static str {
        use Error::*;

        match self {
            SessionExpired => "session_expired",
            AccountMismatch => "account_mismatch",
            OriginMismatch => "origin_mismatch",
            ClientNotApproved => "client_not_approved",
            SignatureInvalid => "signature_invalid",
            IssuerMismatch => "issuer_mismatch",
            AudienceMismatch => "audience_mismatch",
            NonceMismatch => "nonce_mismatch",
            AssertionExpired => "assertion_expired",
            AccountLookupFailed => "account_lookup_failed",
            MalformedRequest(_) => "malformed_request",
            InvalidCredentials => "invalid_credentials",
            Internal(_) => "server_error",
        }
    }

    pub fn malformed(reason: &str) -> Self {
        Self::MalformedRequest(reason.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_snake_case() {
        assert_eq!(Error::NonceMismatch.code(), "nonce_mismatch");
        assert_eq!(Error::malformed("missing").code(), "malformed_request");
        assert_eq!(Error::Internal("key".into()).code(), "server_error");
    }

    #[test]
    fn malformed_keeps_reason() {
        let e = Error::malformed("sec-fetch-dest is not webidentity");
        assert_eq!(
            e.to_string(),
            "malformed request: sec-fetch-dest is not webidentity"
        );
    }
}
