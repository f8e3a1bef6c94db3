//! Network actor - runs provider requests in the Tokio async runtime

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{ImageProvider, ProgressSink};

/// Network actor that processes generation commands
pub struct NetworkActor {
    provider: Arc<dyn ImageProvider>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            provider,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Generate(request)) => {
                            let response_tx = self.response_tx.clone();
                            let provider = Arc::clone(&self.provider);

                            self.active_requests.spawn(async move {
                                let id = request.id;
                                tracing::info!(id, prompt_len = request.prompt.as_str().len(), "Executing generation");
                                let start = Instant::now();
                                let progress = ProgressSink::new(id, response_tx.clone());
                                let result = provider.generate(&request, progress).await;
                                let time_ms = start.elapsed().as_millis() as u64;
                                tracing::info!(id, time_ms, ok = result.is_ok(), "Generation completed");
                                let _ = response_tx.send(NetworkResponse::Settled { id, result, time_ms });
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.active_requests.abort_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {
                    // Task completed - the task sent its own settlement
                }
            }
        }
    }
}
