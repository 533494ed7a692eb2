use crate::dispatch::error::DispatchError;
use crate::domain::contract::AnalysisReply;
use crate::domain::message::MessageId;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

pub mod demo;
pub mod error;
pub mod webhook;

/// Source of analysis replies for a single user query.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn analyze(&self, query: &str) -> anyhow::Result<AnalysisReply>;
}

/// A composed query whose reply has not been appended yet. `id` is the id of
/// the user message that started it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub id: MessageId,
    pub query: String,
}

#[derive(Debug)]
pub struct Settled {
    pub pending: PendingQuery,
    pub outcome: anyhow::Result<AnalysisReply>,
}

#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn AnalysisClient>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn AnalysisClient>) -> Self {
        Self { client }
    }

    pub fn source_name(&self) -> &'static str {
        self.client.source_name()
    }

    /// Runs the query to completion. Never retries.
    pub async fn resolve(&self, pending: PendingQuery) -> Settled {
        let started = Instant::now();
        let outcome = self.client.analyze(&pending.query).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &outcome {
            Ok(reply) => {
                tracing::info!(
                    query_id = %pending.id,
                    source = self.source_name(),
                    has_analysis = reply.analysis.is_some(),
                    elapsed_ms,
                    "analysis query settled"
                );
            }
            Err(err) => {
                let diag = err.downcast_ref::<DispatchError>();
                let stage = diag.map(|d| d.stage.as_str()).unwrap_or("unknown");
                tracing::warn!(
                    query_id = %pending.id,
                    source = self.source_name(),
                    stage,
                    elapsed_ms,
                    error = %format!("{err:#}"),
                    "analysis query failed"
                );
                if let Some(d) = diag {
                    tracing::debug!(
                        query_id = %pending.id,
                        stage,
                        status = ?d.status,
                        raw = ?d.raw_body,
                        "failed webhook response body"
                    );
                }
            }
        }

        Settled { pending, outcome }
    }

    /// Resolves on the tokio runtime and delivers the result over `tx`.
    /// Overlapping queries settle in whatever order they complete.
    pub fn spawn(
        &self,
        pending: PendingQuery,
        tx: mpsc::UnboundedSender<Settled>,
    ) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let settled = this.resolve(pending).await;
            if tx.send(settled).is_err() {
                tracing::debug!("settled query dropped; receiver closed");
            }
        })
    }
}
