use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_55_30;
/// Used when a pass or command hit failures.
pub const WARNING_EMBED_COLOR: u32 = 0xC2_7C_0E;

/// Titled embed with the default color.
pub fn titled_embed(title: &str, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title.to_owned())
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
}

/// Page-aware footer text. Single pages only show the note.
pub fn page_footer_text(page: usize, total_pages: usize, note: Option<&str>) -> String {
    let page = page.max(1);
    let total_pages = total_pages.max(1);
    let note = note.filter(|note| !note.is_empty());

    match (total_pages > 1, note) {
        (true, Some(note)) => format!("Page {}/{} • {}", page, total_pages, note),
        (true, None) => format!("Page {}/{}", page, total_pages),
        (false, Some(note)) => note.to_owned(),
        (false, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::page_footer_text;

    #[test]
    fn footer_shows_pages_only_when_paginated() {
        assert_eq!(page_footer_text(1, 1, None), "");
        assert_eq!(page_footer_text(1, 1, Some("dry run")), "dry run");
        assert_eq!(page_footer_text(2, 3, None), "Page 2/3");
        assert_eq!(page_footer_text(2, 3, Some("dry run")), "Page 2/3 • dry run");
        assert_eq!(page_footer_text(0, 0, Some("")), "");
    }
}
