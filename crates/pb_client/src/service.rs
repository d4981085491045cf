//! `PlayGateway` implementation over the remote HTTP API.

use crate::client::{ApiClient, ClientConfig};
use async_trait::async_trait;
use pb_core::gateway::{
    validate_name, validate_play_id, validate_team_id, validate_wire_data, GatewayError,
    PlayDetail, PlayGateway, PlaySummary,
};
use pb_core::WirePlay;
use serde::Serialize;

/// Remote play store client.
///
/// Every operation validates its inputs locally and short-circuits with
/// [`GatewayError::Validation`] before anything touches the network.
pub struct PlayApi {
    api: ApiClient,
}

impl PlayApi {
    pub fn new(config: &ClientConfig) -> Result<Self, GatewayError> {
        Ok(Self { api: ApiClient::new(config)? })
    }
}

#[derive(Serialize)]
struct PlayUploadRequest<'a> {
    team_id: i64,
    name: &'a str,
    data: &'a WirePlay,
}

#[derive(Serialize)]
struct PlayUpdateRequest<'a> {
    name: &'a str,
    data: &'a WirePlay,
}

fn parse_detail(body: &str) -> Result<PlayDetail, GatewayError> {
    let detail: PlayDetail = serde_json::from_str(body).map_err(|err| {
        log::error!("Failed to parse play detail: {}", err);
        GatewayError::Parse(err.to_string())
    })?;

    if detail.data.is_empty() {
        return Err(GatewayError::Parse("Invalid play data structure".to_string()));
    }
    Ok(detail)
}

#[async_trait]
impl PlayGateway for PlayApi {
    async fn create(
        &self,
        team_id: i64,
        name: &str,
        data: &WirePlay,
    ) -> Result<PlayDetail, GatewayError> {
        validate_wire_data(data)?;
        validate_team_id(team_id)?;
        validate_name(name)?;

        let request = PlayUploadRequest { team_id, name, data };
        let body = self.api.post("/plays/", &request).await?;
        let detail = parse_detail(&body)?;
        log::info!("Play uploaded: {} (ID: {})", detail.name, detail.id);
        Ok(detail)
    }

    async fn list(&self, team_id: i64) -> Result<Vec<PlaySummary>, GatewayError> {
        validate_team_id(team_id)?;

        let body = self.api.get(&format!("/plays/{}", team_id)).await?;
        serde_json::from_str(&body).map_err(|err| {
            log::error!("Failed to parse play list: {}", err);
            GatewayError::Parse(err.to_string())
        })
    }

    async fn fetch(&self, play_id: i64) -> Result<PlayDetail, GatewayError> {
        validate_play_id(play_id)?;

        let body = self.api.get(&format!("/plays/{}/data", play_id)).await?;
        parse_detail(&body)
    }

    async fn update(
        &self,
        play_id: i64,
        name: &str,
        data: &WirePlay,
    ) -> Result<(), GatewayError> {
        validate_play_id(play_id)?;
        validate_wire_data(data)?;

        let request = PlayUpdateRequest { name, data };
        self.api.put(&format!("/plays/{}", play_id), &request).await?;
        log::info!("Play {} updated", play_id);
        Ok(())
    }

    async fn delete(&self, play_id: i64) -> Result<(), GatewayError> {
        validate_play_id(play_id)?;

        self.api.delete(&format!("/plays/{}", play_id)).await?;
        log::info!("Play {} deleted", play_id);
        Ok(())
    }

    async fn duplicate(&self, play_id: i64) -> Result<PlayDetail, GatewayError> {
        validate_play_id(play_id)?;

        let body = self
            .api
            .post(&format!("/plays/{}/duplicate", play_id), &serde_json::json!({}))
            .await?;
        let detail = parse_detail(&body)?;
        log::info!("Play duplicated: {} (ID: {})", detail.name, detail.id);
        Ok(detail)
    }
}
