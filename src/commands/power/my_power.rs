use crate::commands::power::util::{owner_line, PAGE_ITEMS};
use crate::error::PowerError;
use crate::util::{into_pages, paginate};
use crate::{Context, Error};
use chrono::Utc;

/// Shows the power left on each of your bases
///
/// !mypower [page]
#[poise::command(slash_command, prefix_command, rename = "mypower", discard_spare_arguments)]
pub async fn my_power(
    ctx: Context<'_>, #[description = "The page to start on"] start_page: Option<usize>,
) -> Result<(), Error> {
    let owner_id = ctx.author().id.to_string();
    let records = ctx
        .data()
        .store
        .get_by_owner(&owner_id)
        .await
        .map_err(PowerError::from)?;
    if records.is_empty() {
        return Err(format!(
            "You haven't set any bases yet! Use `{}setpower <BaseName> <Duration>`.",
            ctx.prefix()
        )
        .into());
    }

    let now = Utc::now();
    let lines = records.iter().map(|r| owner_line(r, now)).collect();
    paginate(
        ctx,
        &into_pages(lines, PAGE_ITEMS),
        format!("🔋 {}'s Bases", ctx.author().display_name()),
        start_page.unwrap_or(1).saturating_sub(1),
    )
    .await
}
