//! Operator prompts: the confirmation dialog in front of emergency stop and
//! the acknowledgement shown after it.
//!
//! The core only sees the `OperatorPrompt` trait.  The TUI backs it with
//! `ChannelPrompt`, which forwards each request to the render loop and waits
//! for the modal's answer on a oneshot.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

pub trait OperatorPrompt: Send + Sync + 'static {
    /// Ask a yes/no question.  Resolves to `false` if the question could not
    /// be shown or was dismissed.
    fn confirm(&self, message: &str) -> impl Future<Output = bool> + Send;

    /// Show an informational message.  Fire and forget.
    fn acknowledge(&self, message: &str);
}

#[derive(Debug)]
pub enum PromptRequest {
    Confirm {
        message: String,
        reply: oneshot::Sender<bool>,
    },
    Acknowledge {
        message: String,
    },
}

impl PromptRequest {
    pub fn message(&self) -> &str {
        match self {
            PromptRequest::Confirm { message, .. } | PromptRequest::Acknowledge { message } => {
                message
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChannelPrompt {
    tx: mpsc::Sender<PromptRequest>,
}

impl ChannelPrompt {
    pub fn new(tx: mpsc::Sender<PromptRequest>) -> Self {
        Self { tx }
    }
}

impl OperatorPrompt for ChannelPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let request = PromptRequest::Confirm {
            message: message.to_string(),
            reply,
        };
        if self.tx.send(request).await.is_err() {
            warn!("prompt channel closed, treating confirmation as declined");
            return false;
        }
        answer.await.unwrap_or(false)
    }

    fn acknowledge(&self, message: &str) {
        let request = PromptRequest::Acknowledge {
            message: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(request) {
            warn!("could not show acknowledgement: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_confirm_round_trips_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let prompt = ChannelPrompt::new(tx);

        let answer = tokio::spawn(async move { prompt.confirm("really?").await });
        match rx.recv().await {
            Some(PromptRequest::Confirm { message, reply }) => {
                assert_eq!(message, "really?");
                reply.send(true).unwrap();
            }
            other => panic!("unexpected request: {:?}", other),
        }
        assert!(answer.await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_reply_counts_as_declined() {
        let (tx, mut rx) = mpsc::channel(4);
        let prompt = ChannelPrompt::new(tx);

        let answer = tokio::spawn(async move { prompt.confirm("really?").await });
        drop(rx.recv().await);
        assert!(!answer.await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_channel_declines() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let prompt = ChannelPrompt::new(tx);
        assert!(!prompt.confirm("really?").await);
        // Must not panic either.
        prompt.acknowledge("done");
    }

    #[tokio::test]
    async fn test_acknowledge_is_forwarded() {
        let (tx, mut rx) = mpsc::channel(4);
        ChannelPrompt::new(tx).acknowledge("halted");
        let request = rx.recv().await.unwrap();
        assert!(matches!(request, PromptRequest::Acknowledge { .. }));
        assert_eq!(request.message(), "halted");
    }
}
