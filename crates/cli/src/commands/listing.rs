//! Public listing commands.

use marketplace_client::views::ListingView;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Context;
use crate::render;

/// Show page `page` (1-based) of the listing.
pub async fn show(ctx: &Context, page: u32) {
    let mut view = ListingView::new(ctx.api.clone(), ctx.config.page_size);
    view.load().await;

    let index = page.saturating_sub(1);
    if index > 0 && !view.show_page(index).await {
        render::notice(&format!("There is no page {page}."));
    }
    render::listing(&view.view_model());
}

/// Interactive listing: one keystroke command per line.
pub async fn browse(ctx: &Context) -> std::io::Result<()> {
    let mut view = ListingView::new(ctx.api.clone(), ctx.config.page_size);
    view.load().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        render::listing(&view.view_model());
        render::prompt("[n]ext, [p]rev, [q]uit > ")?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "n" | "next" => {
                if !view.next().await {
                    render::notice("Already on the last page.");
                }
            }
            "p" | "prev" => {
                if !view.prev().await {
                    render::notice("Already on the first page.");
                }
            }
            "q" | "quit" => break,
            other => render::notice(&format!("Unknown command: {other}")),
        }
    }
    Ok(())
}
