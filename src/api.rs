// API client module: a small blocking HTTP client that talks to the GitHub
// REST API on behalf of the token owner. Kept synchronous on purpose: every
// call is issued one at a time so progress and per-account reporting stay
// unambiguous.

use crate::config::Config;
use crate::diff::{dedup_preserving_order, Login};
use crate::error::SyncError;
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("follow-sync/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The operations the orchestrator needs from the platform. Implemented by
/// `GitHubClient` for real runs and by fakes in tests.
pub trait FollowApi {
    /// Pre-flight check. `Ok(None)` means the platform answered with an
    /// unexpected status that is not an authentication rejection.
    fn current_user(&self) -> Result<Option<Login>, SyncError>;
    fn fetch_following(&self) -> Result<Vec<Login>, SyncError>;
    fn fetch_followers(&self) -> Result<Vec<Login>, SyncError>;
    /// Remove the follow relationship. Unfollowing an account that is not
    /// followed is not an error.
    fn unfollow(&self, login: &str) -> Result<(), SyncError>;
    fn follow(&self, login: &str) -> Result<(), SyncError>;
}

/// Entry of a follower/following listing. Other fields are ignored, and
/// entries without a login are skipped.
#[derive(Deserialize, Debug)]
struct AccountRef {
    login: Option<String>,
}

/// Response of `GET /user`.
#[derive(Deserialize, Debug)]
pub struct UserProfile {
    pub login: String,
}

/// Blocking GitHub client holding the authenticated reqwest client, the API
/// base URL and the page size used for listings.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    per_page: u32,
}

impl GitHubClient {
    /// Build a client from an already loaded `Config`. The token goes into
    /// the default headers and is not kept anywhere else.
    pub fn new(config: Config) -> Result<Self, SyncError> {
        let client = Client::builder()
            .default_headers(auth_headers(&config.token)?)
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(GitHubClient {
            client,
            base_url: config.api_base,
            per_page: config.per_page,
        })
    }

    /// Collect every login from a paginated listing, requesting pages until
    /// one comes back empty.
    fn fetch_all(&self, path: &str) -> Result<Vec<Login>, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        let mut logins = Vec::new();
        let mut page = 1u32;
        loop {
            debug!("GET {} page {}", path, page);
            let res = self
                .client
                .get(&url)
                .query(&[("per_page", self.per_page), ("page", page)])
                .send()?;
            let res = check_status(res)?;
            let entries: Vec<AccountRef> = decode(res)?;
            if entries.is_empty() {
                break;
            }
            logins.extend(entries.into_iter().filter_map(|entry| entry.login));
            page += 1;
        }
        debug!("{} returned {} accounts over {} pages", path, logins.len(), page - 1);
        Ok(dedup_preserving_order(logins))
    }

    fn following_url(&self, login: &str) -> String {
        format!("{}/user/following/{}", self.base_url, login)
    }
}

impl FollowApi for GitHubClient {
    fn current_user(&self) -> Result<Option<Login>, SyncError> {
        let url = format!("{}/user", self.base_url);
        let res = self.client.get(&url).send()?;
        let status = res.status();
        if status.is_success() {
            return match decode::<UserProfile>(res) {
                Ok(profile) => Ok(Some(profile.login)),
                Err(SyncError::Decode(e)) => {
                    warn!("Unreadable /user response: {}", e);
                    Ok(None)
                }
                Err(e) => Err(e),
            };
        }
        match check_status(res) {
            Ok(_) => Ok(None),
            Err(SyncError::Api { status, body }) => {
                warn!("GitHub returned {} for /user: {}", status, body);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn fetch_following(&self) -> Result<Vec<Login>, SyncError> {
        self.fetch_all("/user/following")
    }

    fn fetch_followers(&self) -> Result<Vec<Login>, SyncError> {
        self.fetch_all("/user/followers")
    }

    fn unfollow(&self, login: &str) -> Result<(), SyncError> {
        debug!("DELETE /user/following/{}", login);
        let res = self.client.delete(self.following_url(login)).send()?;
        if res.status() == StatusCode::NOT_FOUND {
            debug!("{} was not followed", login);
            return Ok(());
        }
        check_status(res).map(|_| ())
    }

    fn follow(&self, login: &str) -> Result<(), SyncError> {
        debug!("PUT /user/following/{}", login);
        let res = self
            .client
            .put(self.following_url(login))
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()?;
        check_status(res).map(|_| ())
    }
}

/// Headers sent with every request.
fn auth_headers(token: &str) -> Result<HeaderMap, SyncError> {
    let mut headers = HeaderMap::new();
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        SyncError::Configuration("token contains characters not allowed in a header".into())
    })?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
    Ok(headers)
}

/// Map an unsuccessful response onto the error taxonomy.
fn check_status(res: Response) -> Result<Response, SyncError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && header_str(&res, "x-ratelimit-remaining") == Some("0"));
    let reset = header_str(&res, "x-ratelimit-reset").map(str::to_string);
    let body = res.text().unwrap_or_default();

    if rate_limited {
        let msg = match reset {
            Some(reset) => format!("{} (limit resets at epoch {})", status, reset),
            None => status.to_string(),
        };
        return Err(SyncError::RateLimit(msg));
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(SyncError::Authentication("invalid or expired token".into())),
        StatusCode::FORBIDDEN => Err(SyncError::Authentication(format!(
            "token lacks the required scope ({})",
            body.trim()
        ))),
        _ => Err(SyncError::Api { status, body }),
    }
}

fn header_str<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

fn decode<T: DeserializeOwned>(res: Response) -> Result<T, SyncError> {
    let text = res.text()?;
    serde_json::from_str(&text).map_err(|e| SyncError::Decode(e.to_string()))
}
