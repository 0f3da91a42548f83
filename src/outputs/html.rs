//! HTML rendering of the front page.
//!
//! The page is small enough that it is assembled directly with `writeln!`
//! instead of a template engine. Scraped text is escaped with `encode_text`
//! and link targets with `encode_double_quoted_attribute`.

use crate::models::{PublishedStory, Snapshot};
use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;
use std::fmt::Write;

/// Render the complete front page for a snapshot.
pub fn render_front_page(snapshot: &Snapshot) -> String {
    let mut page = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(page, "<!DOCTYPE html>");
    let _ = writeln!(page, "<html lang=\"en\">");
    let _ = writeln!(page, "<head>");
    let _ = writeln!(page, "<meta charset=\"utf-8\">");
    let _ = writeln!(page, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    let _ = writeln!(page, "<title>Conflict News</title>");
    let _ = writeln!(page, "</head>");
    let _ = writeln!(page, "<body>");
    let _ = writeln!(page, "<h1>Conflict News</h1>");
    let _ = writeln!(
        page,
        "<p class=\"updated\">Last updated: {}</p>",
        encode_text(&snapshot.refreshed_label())
    );

    if snapshot.stories.is_empty() {
        let _ = writeln!(page, "<p class=\"empty\">No stories yet. Check back after the next refresh.</p>");
    } else {
        let _ = writeln!(page, "<ol class=\"stories\">");
        for story in &snapshot.stories {
            render_story(&mut page, story);
        }
        let _ = writeln!(page, "</ol>");
    }

    let _ = writeln!(page, "</body>");
    let _ = writeln!(page, "</html>");
    page
}

fn render_story(page: &mut String, story: &PublishedStory) {
    let _ = writeln!(page, "<li class=\"story\">");
    let _ = writeln!(page, "<h2>{}</h2>", encode_text(&story.headline));
    let _ = writeln!(page, "<p class=\"time\">{}</p>", encode_text(&story.time));
    let _ = writeln!(page, "<p class=\"summary\">{}</p>", encode_text(&story.summary));

    let alternates = story
        .headlines
        .iter()
        .filter(|h| **h != story.headline)
        .unique()
        .map(|h| encode_text(h))
        .join(" / ");
    if !alternates.is_empty() {
        let _ = writeln!(page, "<p class=\"also\">Also reported as: {alternates}</p>");
    }

    let links = story
        .source_links()
        .into_iter()
        .map(|(source, url)| {
            format!(
                "<a href=\"{}\">{}</a>",
                encode_double_quoted_attribute(url),
                encode_text(source)
            )
        })
        .join(" | ");
    let _ = writeln!(page, "<p class=\"sources\">{links}</p>");
    let _ = writeln!(page, "</li>");
}
