//! Configuration for the token manager

use std::fmt;
use std::time::Duration;

/// Login domain used when no instance URL is configured ("test" = sandbox)
pub const DEFAULT_LOGIN_DOMAIN: &str = "test";

/// Default timeout for token requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for token requests (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connected-app credentials for the client-credentials grant
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Consumer key
    pub client_id: String,
    /// Consumer secret
    pub client_secret: String,
}

impl ClientCredentials {
    /// Create a credential pair
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// User credentials for the password-grant fallback
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// Security token appended to the password, if the org requires one
    pub security_token: Option<String>,
}

impl PasswordCredentials {
    /// Create user credentials
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: Option<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token,
        }
    }

    /// Password with the security token appended, as the token endpoint expects
    pub(crate) fn password_with_token(&self) -> String {
        match &self.security_token {
            Some(token) => format!("{}{}", self.password, token),
            None => self.password.clone(),
        }
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("security_token", &self.security_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration for [`crate::TokenManager`]
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Org instance URL; the token endpoint is derived from it when set
    pub instance_url: Option<String>,

    /// Login domain for the fallback endpoint (`https://{domain}.salesforce.com`)
    pub login_domain: String,

    /// Credentials for the client-credentials grant
    pub client_credentials: Option<ClientCredentials>,

    /// Credentials for the password-grant fallback
    pub password_credentials: Option<PasswordCredentials>,

    /// Total request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,
}

impl AuthConfig {
    /// Set the instance URL
    pub fn with_instance_url(mut self, url: impl Into<String>) -> Self {
        self.instance_url = Some(url.into());
        self
    }

    /// Set the login domain
    pub fn with_login_domain(mut self, domain: impl Into<String>) -> Self {
        self.login_domain = domain.into();
        self
    }

    /// Set the client credentials
    pub fn with_client_credentials(mut self, credentials: ClientCredentials) -> Self {
        self.client_credentials = Some(credentials);
        self
    }

    /// Set the password-grant credentials
    pub fn with_password_credentials(mut self, credentials: PasswordCredentials) -> Self {
        self.password_credentials = Some(credentials);
        self
    }

    /// Set both request timeouts
    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    /// Base URL the token request is sent to
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscan_auth::AuthConfig;
    ///
    /// let config = AuthConfig::default();
    /// assert_eq!(config.login_base_url(), "https://test.salesforce.com");
    ///
    /// let config = config.with_instance_url("https://acme.my.salesforce.com/");
    /// assert_eq!(config.login_base_url(), "https://acme.my.salesforce.com");
    /// ```
    pub fn login_base_url(&self) -> String {
        match &self.instance_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.salesforce.com", self.login_domain),
        }
    }

    /// Full token endpoint URL
    pub fn token_endpoint(&self) -> String {
        format!("{}/services/oauth2/token", self.login_base_url())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            instance_url: None,
            login_domain: DEFAULT_LOGIN_DOMAIN.to_string(),
            client_credentials: None,
            password_credentials: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}
