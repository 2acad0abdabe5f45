//! Single-request retrieval with status classification
//!
//! Every GET goes through the site's [`SiteSession`]. The outcome is an
//! explicit result: a body, an empty-but-successful answer, or a
//! [`FetchError`] describing why no data is available.

use super::session::SiteSession;
use thiserror::Error;

/// Errors that can occur while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// No session could be established for the site
    #[error("Not authenticated, unable to fetch {url}")]
    NotAuthenticated { url: String },

    /// The request failed on the network level
    #[error("Error loading URL {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// The site refused the request even after logging in again
    #[error("Requested URL {url} was refused with HTTP {status}")]
    Unauthorized { url: String, status: u16 },

    /// The site answered with a status that carries no usable data
    #[error("Requested URL {url} returned status code {status}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// Issues GET requests and classifies their responses
#[derive(Debug, Clone, Copy)]
pub struct ResultFetcher {
    /// Whether the site answers "no results" with a 404
    not_found_is_empty: bool,
}

impl ResultFetcher {
    pub fn new(not_found_is_empty: bool) -> Self {
        Self { not_found_is_empty }
    }

    /// Fetches `url`, returning `Ok(None)` for an explicit empty answer
    ///
    /// When a login-wall site refuses the request with 401/403 the session
    /// is assumed to have expired: it is dropped, a fresh login is attempted
    /// and the request is retried once.
    pub fn fetch(
        &self,
        session: &mut SiteSession,
        url: &str,
    ) -> Result<Option<String>, FetchError> {
        match self.fetch_once(session, url) {
            Err(FetchError::Unauthorized { status, .. }) if session.requires_login() => {
                tracing::warn!(url, status, "Session appears to have expired, logging in again");
                self.fetch_once(session, url)
            }
            outcome => outcome,
        }
    }

    fn fetch_once(
        &self,
        session: &mut SiteSession,
        url: &str,
    ) -> Result<Option<String>, FetchError> {
        if !session.ensure_authenticated() {
            return Err(FetchError::NotAuthenticated {
                url: url.to_string(),
            });
        }

        let client = session.client().ok_or_else(|| FetchError::NotAuthenticated {
            url: url.to_string(),
        })?;

        tracing::debug!(url, "Retrieving URL");

        let response = client.get(url).send().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status().as_u16();
        match status {
            200 | 302 | 303 => {
                let body = response.text().map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                })?;
                Ok(Some(body))
            }
            404 if self.not_found_is_empty => Ok(None),
            401 | 403 => {
                session.invalidate();
                Err(FetchError::Unauthorized {
                    url: url.to_string(),
                    status,
                })
            }
            _ => Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status,
            }),
        }
    }
}
