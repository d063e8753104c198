mod commands;
mod config;
mod error;
mod notify;
mod power;
mod tasks;
mod util;

use crate::config::Config;
use crate::error::PowerError;
use crate::notify::DiscordNotifier;
use crate::power::{DurationParser, RecordStore};
use crate::tasks::task_handler;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Color;
use poise::CreateReply;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const BOT_COLOR: Color = Color::new(0xf5c542);

pub struct Data {
    config: Config,
    parser: DurationParser,
    store: Arc<dyn RecordStore>,
} // User data, which is stored and accessible in all command invocations
type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Arc<Data>, Error>;
pub type Command = poise::Command<Arc<Data>, Error>;

async fn on_error(error: poise::FrameworkError<'_, Arc<Data>, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let content = match error.downcast_ref::<PowerError>() {
                Some(e @ PowerError::StorageUnavailable(_)) => {
                    error!("`{}` failed for {}: {e}", ctx.command().name, ctx.author().id);
                    "Something went wrong saving or loading power data, please try again later."
                        .to_string()
                }
                _ => error.to_string(),
            };
            if let Err(e) = ctx.send(CreateReply::default().content(content).ephemeral(true)).await {
                error!("could not report command error: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("error while handling error: {e}");
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let config = Config::from_env().expect("invalid configuration");
    let store = power::store::open(&config.storage).await.expect("could not open power store");
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord_token.clone();
    let prefix = config.command_prefix.clone();
    let data = Arc::new(Data {
        config,
        parser: DurationParser::new(),
        store,
    });

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            commands: commands::commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                let notifier = Arc::new(DiscordNotifier::new(
                    ctx.http.clone(),
                    data.config.delivery_timeout,
                ));
                let data_clone = data.clone();
                tokio::spawn(async move { task_handler(data_clone, notifier).await });
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await;
    client.unwrap().start().await.unwrap();
}
