//! Bearer-token REST implementation of [`StatusClient`].
//!
//! Authentication internals (request signing, token refresh) are the
//! network's problem, not this framework's: the client sends a bearer token
//! and translates HTTP outcomes into [`TransportError`]. The base URL is
//! injectable so nothing here hard-wires a particular deployment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::SettingsDoc;
use crate::types::{Handle, Mention, PendingUpdate, StatusId};

use super::error::TransportError;
use super::StatusClient;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/1.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for posting, favoriting, and reading mentions.
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpStatusClient {
    /// Builds a client from the credentials in the settings document.
    pub fn from_settings(doc: &SettingsDoc) -> Result<Self, TransportError> {
        Self::new(DEFAULT_BASE_URL, &doc.access_token)
    }

    /// Builds a client against an explicit API base URL.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("minibot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpStatusClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TransportError::api(
            status.as_u16(),
            if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        ))
    }
}

/// Wire shape of one mention in the timeline response.
#[derive(Debug, Deserialize)]
struct RawMention {
    id_str: String,
    text: String,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    screen_name: String,
}

impl From<RawMention> for Mention {
    fn from(raw: RawMention) -> Self {
        Mention {
            id: StatusId::new(raw.id_str),
            author: Handle::new(raw.user.screen_name),
            text: raw.text,
        }
    }
}

/// Wire shape of a status update request.
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    in_reply_to_status_id: Option<&'a str>,
}

impl StatusClient for HttpStatusClient {
    async fn fetch_mentions_since(
        &self,
        cursor: Option<&StatusId>,
    ) -> Result<Vec<Mention>, TransportError> {
        let mut request = self
            .http
            .get(self.url("/statuses/mentions_timeline.json"))
            .bearer_auth(&self.token);
        if let Some(cursor) = cursor {
            request = request.query(&[("since_id", cursor.as_str())]);
        }

        let resp = Self::check(request.send().await?).await?;
        let raw: Vec<RawMention> = resp.json().await?;
        debug!(count = raw.len(), "fetched mentions");
        Ok(raw.into_iter().map(Mention::from).collect())
    }

    async fn post_update(&self, update: &PendingUpdate) -> Result<(), TransportError> {
        let body = UpdateRequest {
            status: &update.text,
            in_reply_to_status_id: update.reply_to.as_ref().map(StatusId::as_str),
        };
        let resp = self
            .http
            .post(self.url("/statuses/update.json"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn favorite(&self, id: &StatusId) -> Result<(), TransportError> {
        let resp = self
            .http
            .post(self.url("/favorites/create.json"))
            .bearer_auth(&self.token)
            .query(&[("id", id.as_str())])
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
