use tokio::sync::broadcast::{self, error::RecvError};

const CAPACITY: usize = 100;

/// A named change feed. Every subscriber sees every row published after it
/// subscribed.
#[derive(Clone, Debug)]
pub struct Topic<T> {
    pub name: String,
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Topic<T> {
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Topic {
            name: name.into(),
            sender,
        }
    }

    /// Returns how many subscribers received the row.
    pub fn publish(&self, row: T) -> usize {
        match self.sender.send(row) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(topic = %self.name, "no subscribers for change");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}

/// Waits for the next change, skipping over rows lost to a slow consumer.
/// Returns `None` once the feed is closed.
pub async fn next_change<T: Clone>(receiver: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match receiver.recv().await {
            Ok(row) => return Some(row),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "change feed lagged, continuing with newest rows");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let topic = Topic::<u32>::new("teams");
        let mut first = topic.subscribe();
        let mut second = topic.subscribe();

        assert_eq!(topic.publish(7), 2);

        assert_eq!(next_change(&mut first).await, Some(7));
        assert_eq!(next_change(&mut second).await, Some(7));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let topic = Topic::<u32>::new("teams");

        assert_eq!(topic.publish(1), 0);
    }

    #[tokio::test]
    async fn test_lagged_receiver_keeps_listening() {
        let topic = Topic::<usize>::new("teams");
        let mut raw = topic.subscribe();
        let mut receiver = topic.subscribe();

        // the channel rounds its capacity up, so go well past it
        for i in 0..CAPACITY * 2 {
            topic.publish(i);
        }

        assert!(matches!(raw.recv().await, Err(RecvError::Lagged(_))));
        let next = next_change(&mut receiver).await;
        assert!(next.is_some_and(|row| row > 0 && row < CAPACITY * 2));
    }

    #[tokio::test]
    async fn test_closed_feed_ends() {
        let topic = Topic::<u32>::new("teams");
        let mut receiver = topic.subscribe();
        drop(topic);

        assert_eq!(next_change(&mut receiver).await, None);
    }
}
