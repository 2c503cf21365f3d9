//! Minimal Trello REST client.
//!
//! Authentication is the `key`/`token` query-parameter pair Trello issues
//! to personal integrations. Every non-success response becomes a
//! [`ToolError::ExternalTool`]; there is no retry or backoff.

use crate::error::{Result, ToolError};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub id_list: String,
    #[serde(default)]
    pub id_labels: Vec<String>,
    #[serde(default)]
    pub url: String,
}

/// Fields for a new card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub list_id: String,
    pub name: String,
    pub description: Option<String>,
    pub label_ids: Vec<String>,

    /// `top`, `bottom`, or a numeric position
    pub position: String,
}

impl NewCard {
    pub fn new(list_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            name: name.into(),
            description: None,
            label_ids: Vec::new(),
            position: "top".to_string(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("idList", self.list_id.clone()),
            ("name", self.name.clone()),
            ("pos", self.position.clone()),
        ];
        if let Some(description) = self.description.as_ref().filter(|d| !d.is_empty()) {
            params.push(("desc", description.clone()));
        }
        if !self.label_ids.is_empty() {
            params.push(("idLabels", self.label_ids.join(",")));
        }
        params
    }
}

#[derive(Deserialize)]
struct CreatedCard {
    id: String,
}

pub struct TrelloClient {
    http: Client,
    base_url: String,
    api_key: String,
    api_token: String,
}

impl TrelloClient {
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, api_token)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_token: api_token.into(),
        }
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.api_token.as_str())]
    }

    pub async fn list_cards(&self, board_id: &str) -> Result<Vec<Card>> {
        tracing::debug!("Getting all cards on board: {}", board_id);

        let response = self
            .http
            .get(format!("{}/boards/{}/cards", self.base_url, board_id))
            .query(&self.auth())
            .send()
            .await?;
        let cards: Vec<Card> = check_status(response).await?.json().await?;

        tracing::debug!("Found {} cards on board: {}", cards.len(), board_id);
        Ok(cards)
    }

    /// Create a card and return its id.
    pub async fn create_card(&self, card: &NewCard) -> Result<String> {
        tracing::debug!("Creating card: {}", card.name);

        let response = self
            .http
            .post(format!("{}/cards", self.base_url))
            .query(&self.auth())
            .query(&card.query())
            .send()
            .await?;
        let created: CreatedCard = check_status(response).await?.json().await?;

        tracing::debug!("Created card: {}", created.id);
        Ok(created.id)
    }

    pub async fn add_attachment(&self, card_id: &str, url: Option<&str>) -> Result<()> {
        tracing::debug!("Adding attachment to card: {}", card_id);

        let mut request = self
            .http
            .post(format!("{}/cards/{}/attachments", self.base_url, card_id))
            .query(&self.auth());
        if let Some(url) = url {
            request = request.query(&[("url", url)]);
        }
        check_status(request.send().await?).await?;

        tracing::debug!("Added attachment to card: {}", card_id);
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::error!("Trello request to {} failed with {}", url, status);
    Err(ToolError::external(
        "trello",
        format!("{} returned {}: {}", url, status, body.trim()),
    ))
}
