use log::debug;

use crate::core::action::Action;
use crate::core::message::Message;
use crate::transport::ChatTransport;

/// Tags one accepted submission so its terminal event can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(pub u64);

/// An accepted submission waiting on the backend. Produced by `update()` as
/// `Effect::SpawnRequest`; the caller runs it and feeds the returned action
/// back into `update()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub id: ExchangeId,
    pub document_id: String,
    pub message: String,
    /// Prior turns, oldest first, not including `message` itself.
    pub context: Vec<Message>,
}

impl Exchange {
    /// Performs the round trip and converts the outcome into the matching
    /// terminal action. Always yields exactly one action.
    pub async fn run(self, transport: &dyn ChatTransport) -> Action {
        debug!(
            "Running exchange {} via {} ({} context messages)",
            self.id.0,
            transport.name(),
            self.context.len()
        );
        match transport
            .send(&self.document_id, &self.message, &self.context)
            .await
        {
            Ok(reply) => Action::ResponseReceived {
                exchange: self.id,
                reply,
            },
            Err(error) => Action::ResponseFailed {
                exchange: self.id,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use crate::transport::{AssistantReply, TransportError};

    fn exchange() -> Exchange {
        Exchange {
            id: ExchangeId(3),
            document_id: "abc".into(),
            message: "hi".into(),
            context: vec![],
        }
    }

    #[tokio::test]
    async fn test_run_maps_success() {
        let transport = ScriptedTransport::replying("hello");
        let action = exchange().run(&transport).await;
        assert_eq!(
            action,
            Action::ResponseReceived {
                exchange: ExchangeId(3),
                reply: AssistantReply {
                    text: "hello".into()
                },
            }
        );
        assert_eq!(transport.calls(), vec![("abc".to_string(), "hi".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_run_maps_failure() {
        let transport = ScriptedTransport::failing(TransportError::Network("refused".into()));
        let action = exchange().run(&transport).await;
        assert!(matches!(
            action,
            Action::ResponseFailed { exchange: ExchangeId(3), error: TransportError::Network(_) }
        ));
    }
}
