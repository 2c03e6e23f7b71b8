//! Google Cloud Pub/Sub backend over the REST API.
//!
//! Publish, pull, acknowledge, and negative-acknowledge (modifyAckDeadline
//! with a zero deadline) against `pubsub.googleapis.com`. Payloads are
//! base64 on the wire.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use crate::message::BusMessage;
use crate::traits::{BusError, BusResult, DeliveredMessage, Publisher, Subscriber};

const API_BASE: &str = "https://pubsub.googleapis.com/v1";
const HTTP_TIMEOUT_SECS: u64 = 90;

fn build_client() -> BusResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| BusError::ConfigError(format!("failed to build HTTP client: {e}")))
}

fn authorize(req: reqwest::RequestBuilder, token: &Option<String>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => req.bearer_auth(token),
        None => req,
    }
}

async fn check_status(
    response: reqwest::Response,
    what: impl Fn(String) -> BusError,
) -> BusResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(what(format!("{status} {body}")))
}

pub struct PubSubPublisher {
    http_client: reqwest::Client,
    project_id: String,
    access_token: Option<String>,
}

impl PubSubPublisher {
    pub fn new(project_id: impl Into<String>, access_token: Option<String>) -> BusResult<Self> {
        Ok(Self {
            http_client: build_client()?,
            project_id: project_id.into(),
            access_token,
        })
    }
}

#[async_trait]
impl Publisher for PubSubPublisher {
    async fn publish(&self, topic: &str, message: BusMessage) -> BusResult<()> {
        let url = format!(
            "{API_BASE}/projects/{}/topics/{topic}:publish",
            self.project_id
        );
        let body = json!({
            "messages": [{
                "data": base64::engine::general_purpose::STANDARD.encode(&message.data),
                "attributes": message.attributes,
            }]
        });

        let response = authorize(self.http_client.post(&url), &self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BusError::PublishFailed(e.to_string()))?;
        check_status(response, BusError::PublishFailed).await?;

        tracing::debug!(topic = %topic, "Published message");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedMessage {
    ack_id: String,
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    data: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
}

pub struct PubSubSubscriber {
    http_client: reqwest::Client,
    project_id: String,
    subscription: String,
    access_token: Option<String>,
}

impl PubSubSubscriber {
    pub fn new(
        project_id: impl Into<String>,
        subscription: impl Into<String>,
        access_token: Option<String>,
    ) -> BusResult<Self> {
        Ok(Self {
            http_client: build_client()?,
            project_id: project_id.into(),
            subscription: subscription.into(),
            access_token,
        })
    }

    fn subscription_url(&self, verb: &str) -> String {
        format!(
            "{API_BASE}/projects/{}/subscriptions/{}:{verb}",
            self.project_id, self.subscription
        )
    }
}

#[async_trait]
impl Subscriber for PubSubSubscriber {
    async fn pull(&self, max_messages: usize) -> BusResult<Vec<DeliveredMessage>> {
        let response = authorize(
            self.http_client.post(self.subscription_url("pull")),
            &self.access_token,
        )
        .json(&json!({ "maxMessages": max_messages }))
        .send()
        .await
        .map_err(|e| BusError::PullFailed(e.to_string()))?;
        let response = check_status(response, BusError::PullFailed).await?;

        let pulled: PullResponse = response
            .json()
            .await
            .map_err(|e| BusError::PullFailed(format!("invalid pull response: {e}")))?;

        let mut delivered = Vec::with_capacity(pulled.received_messages.len());
        for received in pulled.received_messages {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&received.message.data)
                .map_err(|e| BusError::PullFailed(format!("invalid message payload: {e}")))?;
            delivered.push(DeliveredMessage {
                message: BusMessage {
                    data: data.into(),
                    attributes: received.message.attributes,
                },
                ack_id: received.ack_id,
            });
        }
        Ok(delivered)
    }

    async fn acknowledge(&self, ack_id: &str) -> BusResult<()> {
        let response = authorize(
            self.http_client.post(self.subscription_url("acknowledge")),
            &self.access_token,
        )
        .json(&json!({ "ackIds": [ack_id] }))
        .send()
        .await
        .map_err(|e| BusError::AckFailed(e.to_string()))?;
        check_status(response, BusError::AckFailed).await?;
        Ok(())
    }

    async fn nack(&self, ack_id: &str) -> BusResult<()> {
        // A zero ack deadline makes the message immediately redeliverable.
        let response = authorize(
            self.http_client
                .post(self.subscription_url("modifyAckDeadline")),
            &self.access_token,
        )
        .json(&json!({ "ackIds": [ack_id], "ackDeadlineSeconds": 0 }))
        .send()
        .await
        .map_err(|e| BusError::AckFailed(e.to_string()))?;
        check_status(response, BusError::AckFailed).await?;
        Ok(())
    }
}
