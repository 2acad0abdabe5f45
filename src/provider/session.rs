//! HTTP client identity for one indexing site
//!
//! A session owns the cookie-carrying client used for every request to a
//! site. Sites behind a login wall get a client only after a successful form
//! login; open sites get a bare client that looks enough like a browser to
//! pass basic anti-automation checks.

use super::SiteProfile;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;

/// Path of the login form, relative to the site's base URL
const LOGIN_PATH: &str = "user/account/login";

/// User agent presented to upstream sites
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Errors that can occur while establishing a session
#[derive(Debug, Error)]
pub enum LoginError {
    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The login request could not be sent or its response not read
    #[error("Login request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// The site refused the login with an authorization status
    #[error("Login rejected with HTTP {status}")]
    Rejected { status: u16 },

    /// The site answered with a page indicating bad credentials
    #[error("Login failed, invalid username or password (page contained '{marker}')")]
    InvalidCredentials { marker: String },
}

/// Credentials and failure detection for a login-wall site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    pub username: String,
    pub password: String,
    /// Phrases whose presence in the login response signals failure
    pub failure_markers: Vec<String>,
}

/// Authentication state for one site
///
/// The session is created lazily by [`SiteSession::ensure_authenticated`]
/// and kept until it is invalidated or the owner is dropped.
#[derive(Debug)]
pub struct SiteSession {
    base_url: String,
    login: Option<LoginSettings>,
    request_timeout: Duration,
    login_timeout: Duration,
    client: Option<Client>,
}

impl SiteSession {
    /// Creates an unauthenticated session for the given site
    pub fn new(profile: &SiteProfile) -> Self {
        Self {
            base_url: profile.base_url.clone(),
            login: profile.login.clone(),
            request_timeout: profile.request_timeout,
            login_timeout: profile.login_timeout,
            client: None,
        }
    }

    /// Returns true if this site sits behind a login wall
    pub fn requires_login(&self) -> bool {
        self.login.is_some()
    }

    /// Returns true if a usable session currently exists
    pub fn is_authenticated(&self) -> bool {
        self.client.is_some()
    }

    /// Makes sure a session exists, logging in if necessary
    ///
    /// Returns false if the login failed. In that case no session is kept,
    /// so the next call starts over with a fresh login attempt.
    pub fn ensure_authenticated(&mut self) -> bool {
        if self.client.is_some() {
            return true;
        }

        match self.establish() {
            Ok(client) => {
                self.client = Some(client);
                true
            }
            Err(e) => {
                tracing::error!(base_url = %self.base_url, "{}", e);
                false
            }
        }
    }

    /// Drops the current session so the next request re-authenticates
    pub fn invalidate(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(base_url = %self.base_url, "Session invalidated");
        }
    }

    /// The authenticated client, if a session exists
    pub(crate) fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Builds a client and, for login-wall sites, performs the login
    fn establish(&self) -> Result<Client, LoginError> {
        let client = self.build_client()?;

        if let Some(login) = &self.login {
            tracing::info!(base_url = %self.base_url, "Attempting to login");
            self.login(&client, login)?;
            tracing::debug!(base_url = %self.base_url, "Login succeeded");
        }

        Ok(client)
    }

    /// Creates a cookie-storing client with browser-like defaults
    ///
    /// Certificate verification is disabled, upstream certificates are
    /// routinely broken.
    fn build_client(&self) -> Result<Client, LoginError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .danger_accept_invalid_certs(true)
            .timeout(self.request_timeout)
            .build()
            .map_err(LoginError::ClientBuild)
    }

    /// Posts the login form and checks the response for failure signs
    fn login(&self, client: &Client, login: &LoginSettings) -> Result<(), LoginError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let params = [
            ("username", login.username.as_str()),
            ("password", login.password.as_str()),
            ("remember_me", "on"),
            ("login", "submit"),
        ];

        let response = client
            .post(&url)
            .form(&params)
            .timeout(self.login_timeout)
            .send()
            .map_err(|e| LoginError::Transport {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status().as_u16();
        if matches!(status, 401 | 403) {
            return Err(LoginError::Rejected { status });
        }

        let body = response
            .text()
            .map_err(|e| LoginError::Transport { url, source: e })?;

        if let Some(marker) = login
            .failure_markers
            .iter()
            .find(|marker| body.contains(marker.as_str()))
        {
            return Err(LoginError::InvalidCredentials {
                marker: marker.clone(),
            });
        }

        Ok(())
    }
}
