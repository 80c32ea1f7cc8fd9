use crate::{
    config::OrderingConfig,
    domain::{Card, List, PositionUpdate},
    error::{OrderingError, Result},
    gateway::{RemoteOrderingGateway, TransferGateway},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderListDto<'a> {
    list_id: &'a str,
    new_position: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderCardDto<'a> {
    card_id: &'a str,
    new_position: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveCardDto<'a> {
    card_id: &'a str,
    target_list_id: &'a str,
    new_position: usize,
}

/// REST client for the board backend
///
/// Lists are ordered per board, cards per list. Only cards can change
/// container, through the dedicated move endpoint.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Creates a gateway for `base_url` with a default client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Creates a gateway from config; the client carries the request timeout
    pub fn from_config(config: &OrderingConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL; ids are percent-encoded so a `/`
    /// or `?` inside one stays part of that segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            OrderingError::ConfigError(format!(
                "invalid api_base_url '{}': {}",
                self.base_url, err
            ))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                OrderingError::ConfigError(format!(
                    "api_base_url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, segments: &[&str]) -> Result<R> {
        let url = self.url(segments)?;
        debug!(%url, "GET");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<R>().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.url(segments)?;
        debug!(%url, "POST");

        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

#[async_trait]
impl RemoteOrderingGateway<List> for HttpGateway {
    async fn fetch_items(&self, board_id: &str) -> Result<Vec<List>> {
        self.get_json(&["lists", "board", board_id]).await
    }

    async fn persist_order(&self, board_id: &str, updates: &[PositionUpdate]) -> Result<()> {
        let body: Vec<ReorderListDto<'_>> = updates
            .iter()
            .map(|update| ReorderListDto {
                list_id: &update.id,
                new_position: update.new_position,
            })
            .collect();

        self.post_json(&["lists", "board", board_id, "reorder"], &body)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteOrderingGateway<Card> for HttpGateway {
    async fn fetch_items(&self, list_id: &str) -> Result<Vec<Card>> {
        self.get_json(&["cards", "list", list_id]).await
    }

    async fn persist_order(&self, list_id: &str, updates: &[PositionUpdate]) -> Result<()> {
        let body: Vec<ReorderCardDto<'_>> = updates
            .iter()
            .map(|update| ReorderCardDto {
                card_id: &update.id,
                new_position: update.new_position,
            })
            .collect();

        self.post_json(&["cards", "list", list_id, "reorder"], &body)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TransferGateway<Card> for HttpGateway {
    async fn move_item(
        &self,
        card_id: &str,
        target_list_id: &str,
        target_index: usize,
    ) -> Result<Card> {
        let body = MoveCardDto {
            card_id,
            target_list_id,
            new_position: target_index,
        };

        let response = self
            .post_json(&["cards", card_id, "move"], &body)
            .await?;
        Ok(response.json::<Card>().await?)
    }
}
