//! HTTP transport for the document chat backend.
//!
//! One `POST {base_url}/api/chat` per message, full JSON reply, no streaming.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::core::message::Message;
use crate::transport::{
    AssistantReply, ChatRequest, ChatResponse, ChatTransport, HistoryEntry, TransportError,
};

pub struct HttpChatTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TransportError::Config("backend URL is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(
        &self,
        document_id: &str,
        message: &str,
        context: &[Message],
    ) -> Result<AssistantReply, TransportError> {
        let request = ChatRequest {
            file_id: document_id.to_string(),
            message: message.to_string(),
            chat_history: context.iter().map(HistoryEntry::from).collect(),
        };

        info!(
            "Chat request: file_id={}, message_chars={}, history={}",
            document_id,
            message.chars().count(),
            request.chat_history.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Chat response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Chat API error: {} - {}", status.as_u16(), body);
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| TransportError::Parse(e.to_string()))?;

        info!("Chat reply received: {} chars", parsed.response.chars().count());
        Ok(AssistantReply {
            text: parsed.response,
        })
    }
}
