//! Plain-text rendering of view models.

#![allow(clippy::print_stdout)]

use std::io::Write;

use marketplace_client::views::{DashboardViewModel, Flash, FlashKind, ListingViewModel, Page};

pub fn listing(model: &ListingViewModel) {
    if let Some(flash) = &model.flash {
        self::flash(flash);
    }

    if model.rows.is_empty() {
        println!("No products to show.");
    } else {
        println!(
            "{:>5}  {:<24}  {:<36}  {:>10}  {:>4}  Image",
            "ID", "Name", "Description", "Price", "Qty"
        );
        for row in &model.rows {
            println!(
                "{:>5}  {:<24}  {:<36}  {:>10}  {:>4}  {}",
                row.id,
                clip(&row.name, 24),
                clip(&row.description, 36),
                row.price,
                row.quantity,
                row.image.as_deref().unwrap_or("-"),
            );
        }
    }

    let prev = if model.prev_enabled { "< prev" } else { "      " };
    let next = if model.next_enabled { "next >" } else { "      " };
    println!("{prev}   {}   {next}", model.page_label);
}

pub fn dashboard(model: &DashboardViewModel) {
    println!("Welcome, {}", model.greeting);
    if let Some(flash) = &model.flash {
        self::flash(flash);
    }

    if let Some(message) = model.empty_message {
        println!("{message}");
        return;
    }
    for row in &model.rows {
        println!(
            "{:>5}  {:<24}  {:<36}  {:>10}  {:>4}  {}",
            row.id,
            clip(&row.name, 24),
            clip(&row.description, 36),
            row.price,
            row.quantity,
            row.image_src.as_deref().unwrap_or("-"),
        );
    }
    if !model.rows.is_empty() {
        println!("Delete a product with `mp-cli delete <ID>`.");
    }
}

pub fn flash(flash: &Flash) {
    match flash.kind {
        FlashKind::Success => println!("{}", flash.text),
        FlashKind::Error => println!("error: {}", flash.text),
    }
}

pub fn inline_error(message: &str) {
    println!("error: {message}");
}

pub fn notice(message: &str) {
    println!("{message}");
}

/// Tell the user which command corresponds to the page they were sent to.
pub fn redirect(page: Page) {
    match page {
        Page::Login => {
            println!("You need to be logged in to view this page. Run `mp-cli login`.");
        }
        Page::Signup => println!("Run `mp-cli signup` to create an account."),
        Page::Listing => println!("Run `mp-cli products` to see the listing."),
        Page::Dashboard => println!("Run `mp-cli dashboard` to see your products."),
    }
}

pub fn prompt(text: &str) -> std::io::Result<()> {
    print!("{text}");
    std::io::stdout().flush()
}

/// Truncate to `width` characters for table cells.
fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_keeps_short_text() {
        assert_eq!(clip("Lamp", 24), "Lamp");
    }

    #[test]
    fn test_clip_marks_truncation() {
        assert_eq!(clip("abcdefgh", 5), "abcd~");
    }
}
