//! Error types for authentication operations

/// Errors that can occur while building credentials or signing a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credential material is missing or malformed
    ///
    /// Only produced while constructing credentials, never while signing.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Computing the signature or token for a request failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

impl AuthError {
    /// Check if this error was raised while constructing credentials
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_) | Self::EnvVarNotSet(_))
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::EnvVarNotSet("COINBASE_API_KEY".to_string());
        assert!(err.to_string().contains("COINBASE_API_KEY"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(AuthError::InvalidCredentials("bad pem".into()).is_configuration());
        assert!(!AuthError::Signing("entropy".into()).is_configuration());
    }
}
