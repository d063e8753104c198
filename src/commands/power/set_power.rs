use crate::commands::power::util::store_power;
use crate::{Context, Error, BOT_COLOR};
use chrono::Utc;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};
use poise::CreateReply;

/// Set how long one of your bases stays powered
///
/// !setpower <base> <duration>, e.g. !setpower Alpha 19d 17h 52m
#[poise::command(slash_command, prefix_command, rename = "setpower", aliases("power"))]
pub async fn set_power(
    ctx: Context<'_>, #[description = "Name of your base"] base_name: String,
    #[description = "Power left, like 19d 17h 52m"]
    #[rest]
    duration: String,
) -> Result<(), Error> {
    let data = ctx.data();
    let owner_id = ctx.author().id.to_string();
    let record = store_power(
        data.store.as_ref(),
        &data.parser,
        &owner_id,
        &base_name,
        &duration,
        Utc::now(),
    )
    .await?;

    let runs_out = record
        .expires_at()
        .map(|t| format!(", runs out <t:{}:R>", t.timestamp()))
        .unwrap_or_default();
    let embed = CreateEmbed::new()
        .author(CreateEmbedAuthor::from(ctx.author().clone()))
        .color(BOT_COLOR)
        .title(format!("Base {} updated.", record.base_name))
        .description(format!(
            "**{}** set to **{}** ({} minutes){runs_out}.",
            record.base_name, record.raw, record.total_minutes
        ))
        .footer(CreateEmbedFooter::new("I'll DM you once it's down to a day of power."));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
