//! Per-session progress broadcast
//!
//! One producer (the session's orchestrator), any number of subscribers. Delivery is
//! best-effort: there is no replay, a subscriber only sees events emitted after it
//! subscribed, and a subscriber that falls more than the buffer size behind skips the
//! overwritten events.

use crate::types::ProgressEvent;
use futures::Stream;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};

/// Broadcast channel carrying one session's [`ProgressEvent`]s
#[derive(Debug)]
pub struct ProgressChannel {
    sender: RwLock<Option<broadcast::Sender<ProgressEvent>>>,
}

impl ProgressChannel {
    /// Create a channel buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: RwLock::new(Some(sender)),
        }
    }

    /// Send an event to every current subscriber
    ///
    /// Having no subscribers is not an error, and emitting after [`close`](Self::close)
    /// is a no-op.
    pub async fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = self.sender.read().await.as_ref() {
            // send() errors only when nobody is listening
            sender.send(event).ok();
        }
    }

    /// Subscribe to future events
    ///
    /// The subscription yields [`ProgressEvent::Keepalive`] whenever `keepalive_interval`
    /// passes without an event, and ends after the terminal event or once the channel
    /// is closed. Subscribing to a closed channel yields an empty subscription.
    pub async fn subscribe(&self, keepalive_interval: Duration) -> ProgressSubscription {
        let receiver = self.sender.read().await.as_ref().map(|s| s.subscribe());
        ProgressSubscription {
            receiver,
            keepalive_interval,
        }
    }

    /// Close the channel; subscribers drain what is buffered and then end
    pub async fn close(&self) {
        self.sender.write().await.take();
    }

    /// Whether [`close`](Self::close) has been called
    pub async fn is_closed(&self) -> bool {
        self.sender.read().await.is_none()
    }

    /// Number of live subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .await
            .as_ref()
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }
}

/// One subscriber's view of a [`ProgressChannel`]
#[derive(Debug)]
pub struct ProgressSubscription {
    receiver: Option<broadcast::Receiver<ProgressEvent>>,
    keepalive_interval: Duration,
}

impl ProgressSubscription {
    /// Wait for the next event; `None` once the stream has ended
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        let receiver = self.receiver.as_mut()?;

        loop {
            match tokio::time::timeout(self.keepalive_interval, receiver.recv()).await {
                Err(_) => return Some(ProgressEvent::Keepalive),
                Ok(Ok(event)) => {
                    if event.is_terminal() {
                        self.receiver = None;
                    }
                    return Some(event);
                }
                Ok(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "Progress subscriber lagged, skipping events");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Adapt into a [`Stream`] of events
    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|event| (event, subscription))
        })
    }
}
