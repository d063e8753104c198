use crate::commands::power::util::{listing_line, PAGE_ITEMS};
use crate::error::PowerError;
use crate::util::{into_pages, paginate};
use crate::{Context, Error};
use chrono::Utc;

/// Lists every base of every user
///
/// !listpower [page]
#[poise::command(
    slash_command,
    prefix_command,
    rename = "listpower",
    aliases("powerlist"),
    discard_spare_arguments
)]
pub async fn list_power(
    ctx: Context<'_>, #[description = "The page to start on"] start_page: Option<usize>,
) -> Result<(), Error> {
    let records = ctx.data().store.get_all().await.map_err(PowerError::from)?;
    if records.is_empty() {
        return Err("No power levels have been set yet.".into());
    }
    let now = Utc::now();
    let lines = records.iter().map(|r| listing_line(r, now)).collect();

    paginate(
        ctx,
        &into_pages(lines, PAGE_ITEMS),
        "📋 All Power Levels".to_string(),
        start_page.unwrap_or(1).saturating_sub(1),
    )
    .await
}
