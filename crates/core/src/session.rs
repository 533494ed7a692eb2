use crate::dispatch::{PendingQuery, Settled};
use crate::domain::message::{Message, MessageId};
use crate::store::Transcript;

pub const GREETING_TEXT: &str = "Hello! I'm StockSense, your AI stock analysis assistant. What stock would you like me to analyze today?";
pub const APOLOGY_TEXT: &str = "I'm having trouble connecting to my analysis engine right now. Please try again in a moment.";

/// Transcript plus the count of queries still waiting for a reply.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Transcript,
    in_flight: usize,
}

impl ChatSession {
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        transcript.append(Message::assistant(GREETING_TEXT, None));
        Self {
            transcript,
            in_flight: 0,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_awaiting(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Appends the user's message before any network activity. Whitespace-only
    /// input is ignored.
    pub fn compose(&mut self, input: &str) -> Option<PendingQuery> {
        let query = input.trim();
        if query.is_empty() {
            return None;
        }

        let message = Message::user(query);
        let pending = PendingQuery {
            id: message.id,
            query: query.to_string(),
        };
        self.transcript.append(message);
        self.in_flight += 1;
        Some(pending)
    }

    /// Appends exactly one assistant message for a finished query and returns
    /// its id.
    pub fn settle(&mut self, settled: Settled) -> MessageId {
        let message = match settled.outcome {
            Ok(reply) => Message::assistant(reply.text, reply.analysis),
            Err(err) => {
                tracing::debug!(
                    query_id = %settled.pending.id,
                    error = %err,
                    "replacing failed reply with apology"
                );
                Message::assistant(APOLOGY_TEXT, None)
            }
        };
        let id = message.id;
        self.transcript.append(message);
        self.in_flight = self.in_flight.saturating_sub(1);
        id
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::error::{DispatchError, DispatchStage};
    use crate::dispatch::testing::ScriptedClient;
    use crate::dispatch::Dispatcher;
    use crate::domain::contract::{AnalysisReply, WebhookResponse};
    use crate::domain::message::Author;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn starts_with_greeting() {
        let session = ChatSession::new();
        let list = session.transcript().list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].author, Author::Assistant);
        assert_eq!(list[0].text, GREETING_TEXT);
        assert!(!session.is_awaiting());
    }

    #[test]
    fn blank_input_is_a_no_op() {
        let mut session = ChatSession::new();
        assert!(session.compose("").is_none());
        assert!(session.compose("  \n\t ").is_none());
        assert_eq!(session.transcript().len(), 1);
        assert!(!session.is_awaiting());
    }

    #[test]
    fn compose_appends_user_message_immediately() {
        let mut session = ChatSession::new();
        let pending = session.compose("  Analyze AAPL \n").unwrap();

        assert_eq!(pending.query, "Analyze AAPL");
        let last = session.transcript().last().unwrap();
        assert_eq!(last.author, Author::User);
        assert_eq!(last.text, "Analyze AAPL");
        assert_eq!(last.id, pending.id);
        assert!(session.is_awaiting());
    }

    #[test]
    fn failure_appends_apology_without_analysis() {
        let mut session = ChatSession::new();
        let pending = session.compose("AAPL").unwrap();
        let id = session.settle(Settled {
            pending,
            outcome: Err(DispatchError::new(DispatchStage::JsonParse, "bad").into()),
        });
        let msg = session.transcript().last().unwrap();
        assert_eq!(msg.id, id);

        assert_eq!(msg.author, Author::Assistant);
        assert_eq!(msg.text, APOLOGY_TEXT);
        assert!(msg.analysis.is_none());
        assert!(!session.is_awaiting());
    }

    #[test]
    fn success_attaches_mapped_analysis() {
        let mut session = ChatSession::new();
        let pending = session.compose("aapl").unwrap();
        let reply = WebhookResponse::from_value(json!({
            "message": "Buy.",
            "analysis": { "symbol": "aapl", "price": 150 }
        }))
        .into_reply();

        let id = session.settle(Settled {
            pending,
            outcome: Ok(reply),
        });
        let msg = session.transcript().last().unwrap();
        assert_eq!(msg.id, id);
        assert_eq!(msg.text, "Buy.");
        assert_eq!(msg.analysis.as_ref().unwrap().symbol, "AAPL");
    }

    #[tokio::test]
    async fn each_send_grows_transcript_by_two() {
        let client = Arc::new(ScriptedClient::new(vec![
            (
                Duration::ZERO,
                Ok(AnalysisReply {
                    text: "ok".to_string(),
                    analysis: None,
                }),
            ),
            (
                Duration::ZERO,
                Err(DispatchError::new(DispatchStage::Transport, "refused").into()),
            ),
        ]));
        let dispatcher = Dispatcher::new(client);
        let mut session = ChatSession::new();

        for query in ["AAPL", "TSLA"] {
            let before = session.transcript().len();
            let pending = session.compose(query).unwrap();
            assert_eq!(session.transcript().len(), before + 1);
            let settled = dispatcher.resolve(pending).await;
            session.settle(settled);
            assert_eq!(session.transcript().len(), before + 2);
        }
        assert!(!session.is_awaiting());
    }

    #[test]
    fn indicator_stays_up_until_every_query_settles() {
        let mut session = ChatSession::new();
        let first = session.compose("AAPL").unwrap();
        let second = session.compose("TSLA").unwrap();
        assert_eq!(session.in_flight(), 2);

        session.settle(Settled {
            pending: second,
            outcome: Err(DispatchError::new(DispatchStage::Transport, "x").into()),
        });
        assert!(session.is_awaiting());

        session.settle(Settled {
            pending: first,
            outcome: Err(DispatchError::new(DispatchStage::Transport, "x").into()),
        });
        assert!(!session.is_awaiting());
        assert_eq!(session.transcript().len(), 5);
    }
}
