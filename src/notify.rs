use crate::error::DeliveryError;
use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, CreateAllowedMentions, CreateMessage, Http, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_direct(&self, owner_id: &str, text: &str) -> Result<(), DeliveryError>;

    async fn send_broadcast(&self, channel_id: ChannelId, text: &str) -> Result<(), DeliveryError>;
}

/// Delivers through the bot's HTTP client, giving up on any call that takes
/// longer than `timeout`.
pub struct DiscordNotifier {
    http: Arc<Http>,
    timeout: Duration,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    async fn bounded<T>(
        &self, call: impl Future<Output = Result<T, poise::serenity_prelude::Error>>,
    ) -> Result<T, DeliveryError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DeliveryError::TimedOut(self.timeout)),
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier {
    async fn send_direct(&self, owner_id: &str, text: &str) -> Result<(), DeliveryError> {
        let user_id = match owner_id.parse::<u64>() {
            Ok(id) if id != 0 => UserId::new(id),
            _ => return Err(DeliveryError::InvalidRecipient(owner_id.to_string())),
        };
        self.bounded(user_id.direct_message(&self.http, CreateMessage::new().content(text)))
            .await?;
        Ok(())
    }

    async fn send_broadcast(&self, channel_id: ChannelId, text: &str) -> Result<(), DeliveryError> {
        // the digest mentions owners, but shouldn't ping all of them every day
        let builder = CreateMessage::new()
            .content(text)
            .allowed_mentions(CreateAllowedMentions::new());
        self.bounded(channel_id.send_message(&self.http, builder)).await?;
        Ok(())
    }
}
