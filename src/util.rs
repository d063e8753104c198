use crate::{Context, Error, BOT_COLOR};
use poise::serenity_prelude::{
    ComponentInteractionCollector, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedAuthor,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use poise::CreateReply;

/// Discord's per-message content limit.
pub const MESSAGE_LIMIT: usize = 2000;
/// Discord's limit on an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

fn create_page_embed(
    ctx: Context<'_>, pages: &[Vec<String>], title: &str, page: usize,
) -> CreateEmbed {
    let total: usize = pages.iter().map(Vec::len).sum();
    let first = pages[..page].iter().map(Vec::len).sum::<usize>() + 1;
    CreateEmbed::default()
        .color(BOT_COLOR)
        .author(CreateEmbedAuthor::from(ctx.author().clone()))
        .title(title)
        .description(pages[page].join("\n"))
        .footer(CreateEmbedFooter::new(format!(
            "Page {}/{} - Showing entries {}-{} out of {}.",
            page + 1,
            pages.len(),
            first,
            first + pages[page].len() - 1,
            total
        )))
}

pub async fn paginate(
    ctx: Context<'_>, pages: &[Vec<String>], title: String, mut page: usize,
) -> Result<(), Error> {
    if pages.is_empty() {
        return Ok(());
    }
    let ctx_id = ctx.id();
    if page >= pages.len() {
        page = 0;
    }
    let prev_button_id = format!("{}prev", ctx_id);
    let next_button_id = format!("{}next", ctx_id);

    let mut reply = CreateReply::default().embed(create_page_embed(ctx, pages, &title, page));
    if pages.len() > 1 {
        let components = CreateActionRow::Buttons(vec![
            CreateButton::new(&prev_button_id).emoji('◀'),
            CreateButton::new(&next_button_id).emoji('▶'),
        ]);
        reply = reply.components(vec![components])
    }

    ctx.send(reply).await?;

    if pages.len() == 1 {
        return Ok(());
    }

    // Stop listening once nobody has pressed a button for two minutes
    while let Some(press) = ComponentInteractionCollector::new(ctx)
        .filter(move |press| press.data.custom_id.starts_with(&ctx_id.to_string()))
        .timeout(std::time::Duration::from_secs(120))
        .await
    {
        if press.data.custom_id == next_button_id {
            page += 1;
            if page >= pages.len() {
                page = 0;
            }
        } else {
            page = page.checked_sub(1).unwrap_or(pages.len() - 1);
        }

        press
            .create_response(
                ctx.serenity_context(),
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(create_page_embed(ctx, pages, &title, page)),
                ),
            )
            .await?;
    }

    Ok(())
}

/// Groups lines into messages no longer than `limit` characters, breaking
/// only between lines. A single oversized line is cut down to fit.
pub fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in lines {
        let line: String = if line.chars().count() > limit {
            line.chars().take(limit).collect()
        } else {
            line.clone()
        };
        let needed = if current.is_empty() { 0 } else { 1 } + line.chars().count();
        if !current.is_empty() && current.chars().count() + needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Splits entries into pages of at most `per_page` that each fit in one
/// embed description once joined with newlines.
pub fn into_pages(entries: Vec<String>, per_page: usize) -> Vec<Vec<String>> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    let mut page: Vec<String> = Vec::new();
    let mut used = 0;
    for entry in entries {
        let entry: String = entry.chars().take(EMBED_DESCRIPTION_LIMIT).collect();
        let len = entry.chars().count();
        if !page.is_empty() && (page.len() == per_page || used + 1 + len > EMBED_DESCRIPTION_LIMIT) {
            pages.push(std::mem::take(&mut page));
            used = 0;
        }
        used += if page.is_empty() { len } else { len + 1 };
        page.push(entry);
    }
    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_break_between_lines() {
        let lines: Vec<String> = vec!["a".repeat(6), "b".repeat(3), "c".repeat(5)];
        assert_eq!(chunk_lines(&lines, 10), ["aaaaaa\nbbb", "ccccc"]);
        assert_eq!(chunk_lines(&lines, 100), ["aaaaaa\nbbb\nccccc"]);
        assert!(chunk_lines(&[], 10).is_empty());
    }

    #[test]
    fn oversized_line_is_cut() {
        let lines = vec!["x".repeat(25), "y".into()];
        let chunks = chunk_lines(&lines, 10);
        assert_eq!(chunks, ["x".repeat(10), "y".to_string()]);
    }

    #[test]
    fn chunks_respect_message_limit() {
        let lines: Vec<String> = (0..500).map(|i| format!("**Base{i}** (<@1234567890>): 1d 2h 3m")).collect();
        let chunks = chunk_lines(&lines, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= MESSAGE_LIMIT));
        assert_eq!(chunks.iter().map(|c| c.lines().count()).sum::<usize>(), 500);
    }

    #[test]
    fn pages_hold_at_most_per_page() {
        let entries: Vec<String> = (0..17).map(|i| i.to_string()).collect();
        let pages = into_pages(entries, 8);
        assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), [8, 8, 1]);
        assert!(into_pages(Vec::new(), 8).is_empty());
    }

    #[test]
    fn pages_fit_in_an_embed() {
        // long base names: eight of these would overflow one description
        let entries: Vec<String> = (0..8).map(|i| format!("**{i}{}**: 1d 0h 0m left", "B".repeat(900))).collect();
        let pages = into_pages(entries, 8);
        assert!(pages.len() > 1);
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 8);
        assert!(pages.iter().all(|p| p.join("\n").chars().count() <= EMBED_DESCRIPTION_LIMIT));

        let huge = into_pages(vec!["x".repeat(5000), "y".into()], 8);
        assert_eq!(huge.len(), 2);
        assert_eq!(huge[0][0].chars().count(), EMBED_DESCRIPTION_LIMIT);
    }
}
