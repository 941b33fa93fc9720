use async_trait::async_trait;
use limelight_core::{Identity, ParticipantMetadata, RoomId, StageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Server side of a stage change, as seen from the client.
#[async_trait(?Send)]
pub trait StageGateway {
    async fn set_stage(
        &self,
        room: &RoomId,
        caller: &Identity,
        target: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError>;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<GatewayError> for StageError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Status { status, body } => {
                serde_json::from_str(&body).unwrap_or_else(|_| {
                    StageError::transport(format!("server answered {}: {}", status, body))
                })
            }
            other => StageError::transport(other.to_string()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageChangeBody<'a> {
    participant_identity: &'a Identity,
    on_stage: bool,
}

#[derive(Deserialize)]
struct StageChangeResponse {
    updated: ParticipantMetadata,
}

/// Talks to the stage server over HTTP.
///
/// The server identifies the caller by the credential from its join grant,
/// so the `caller` passed to [`StageGateway::set_stage`] is not sent.
#[derive(Clone)]
pub struct HttpStageGateway {
    client: reqwest::Client,
    base_url: String,
    credential: Option<String>,
}

impl HttpStageGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn stage_url(&self, room: &RoomId) -> String {
        format!("{}/rooms/{}/stage", self.base_url, room)
    }

    async fn post_stage(
        &self,
        room: &RoomId,
        body: &StageChangeBody<'_>,
    ) -> Result<ParticipantMetadata, GatewayError> {
        let mut request = self.client.post(self.stage_url(room)).json(body);
        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Stage change in {} rejected with {}", room, status);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: StageChangeResponse = response.json().await?;
        Ok(parsed.updated)
    }
}

#[async_trait(?Send)]
impl StageGateway for HttpStageGateway {
    async fn set_stage(
        &self,
        room: &RoomId,
        _caller: &Identity,
        target: &Identity,
        on_stage: bool,
    ) -> Result<ParticipantMetadata, StageError> {
        let body = StageChangeBody {
            participant_identity: target,
            on_stage,
        };
        Ok(self.post_stage(room, &body).await?)
    }
}
