use crate::error::PowerError;
use crate::{Context, Error, BOT_COLOR};
use poise::serenity_prelude::{CreateEmbed, CreateEmbedAuthor};
use poise::CreateReply;

/// Stop tracking one of your bases
///
/// !removepower <base>
#[poise::command(
    slash_command,
    prefix_command,
    rename = "removepower",
    aliases("unsetpower"),
    discard_spare_arguments
)]
pub async fn remove_power(
    ctx: Context<'_>, #[description = "The base to forget"] base_name: String,
) -> Result<(), Error> {
    let owner_id = ctx.author().id.to_string();
    let removed = ctx
        .data()
        .store
        .remove(&owner_id, base_name.trim())
        .await
        .map_err(PowerError::from)?;
    if !removed {
        return Err(format!("You don't have a base called **{}**.", base_name.trim()).into());
    }

    let embed = CreateEmbed::new()
        .author(CreateEmbedAuthor::from(ctx.author().clone()))
        .color(BOT_COLOR)
        .description(format!("Base **{}** is no longer tracked.", base_name.trim()));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
