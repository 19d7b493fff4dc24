//! Credential handling for the two authentication strategies the scanner
//! supports: short-lived session tokens obtained from username/password, and
//! long-lived API key pairs sent as a static header.

/// Authentication material supplied at client construction.
///
/// Exactly one strategy is active per client instance. API keys are applied
/// to the session header state immediately; username/password is held until
/// `NessusClient::session_create` exchanges it for a session token.
#[derive(Debug, Clone)]
pub enum Credentials {
    UserPassword { username: String, password: String },
    ApiKeys { access_key: String, secret_key: String },
}

impl Credentials {
    pub fn user_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::UserPassword {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn api_keys(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Credentials::ApiKeys {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Value for the `X-ApiKeys` header, or `None` for the session flow.
    pub(crate) fn api_key_header(&self) -> Option<String> {
        match self {
            Credentials::ApiKeys {
                access_key,
                secret_key,
            } => Some(format!("accessKey={}; secretKey={}", access_key, secret_key)),
            Credentials::UserPassword { .. } => None,
        }
    }
}

/// Value for the `X-Cookie` header carrying a session token.
pub(crate) fn cookie_header(token: &str) -> String {
    format!("token={};", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_header_format() {
        let creds = Credentials::api_keys("ak-123", "sk-456");
        assert_eq!(
            creds.api_key_header().unwrap(),
            "accessKey=ak-123; secretKey=sk-456"
        );
    }

    #[test]
    fn user_password_has_no_static_header() {
        let creds = Credentials::user_password("admin", "hunter2");
        assert!(creds.api_key_header().is_none());
    }

    #[test]
    fn cookie_header_format() {
        assert_eq!(cookie_header("abc123"), "token=abc123;");
    }
}
