//! Last-resort extraction of book data from the public HTML page.
//!
//! The page layout is queried by structural position: the title heading,
//! the description block, author links, the cover image, and one row per
//! chapter carrying a name link, an optional reader link, and a trailing
//! duration cell.

use scraper::{ElementRef, Html, Selector};

use crate::app::{AuricleError, Result};
use crate::normalizer::{ScrapedBook, ScrapedChapter, ScrapedLink};

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

pub fn extract_book(url: &str, html: &str) -> Result<ScrapedBook> {
    let doc = Html::parse_document(html);

    let title = first_text(doc.root_element(), "h1");
    let description = first_text(doc.root_element(), "div.description");
    let cover = doc
        .select(&sel("img.cover"))
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(String::from);

    let authors: Vec<ScrapedLink> = doc
        .select(&sel("a.author-link"))
        .map(|el| link_of(el))
        .collect();

    let chapters: Vec<ScrapedChapter> = doc
        .select(&sel("div.chapter-row"))
        .map(|row| {
            let name = row.select(&sel("a.chapter-name")).next();
            let reader = row.select(&sel("a.reader-link")).next().map(link_of);
            let duration_secs = row
                .select(&sel("span.chapter-time"))
                .next()
                .map(|el| parse_duration(&text_of(el)))
                .unwrap_or(0);

            ScrapedChapter {
                title: name.map(|el| text_of(el)).filter(|t| !t.is_empty()),
                audio_url: name
                    .and_then(|el| el.value().attr("href"))
                    .map(String::from),
                reader,
                duration_secs,
            }
        })
        .collect();

    if title.is_none() && chapters.is_empty() {
        return Err(AuricleError::Malformed(
            url.to_string(),
            "page has neither a title nor chapter rows".to_string(),
        ));
    }

    Ok(ScrapedBook {
        url: url.to_string(),
        title,
        description,
        authors,
        cover,
        chapters,
    })
}

/// Parse a `H:MM:SS` or `MM:SS` duration cell. Any malformed component
/// yields 0 for the whole duration.
pub fn parse_duration(text: &str) -> u32 {
    let components: Option<Vec<u32>> = text
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>().ok())
        .collect();

    match components.as_deref() {
        Some([hours, minutes, seconds]) => hours * 3600 + minutes * 60 + seconds,
        Some([minutes, seconds]) => minutes * 60 + seconds,
        _ => 0,
    }
}

fn first_text(scope: ElementRef<'_>, selector: &str) -> Option<String> {
    scope
        .select(&sel(selector))
        .next()
        .map(|el| text_of(el))
        .filter(|t| !t.is_empty())
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn link_of(el: ElementRef<'_>) -> ScrapedLink {
    ScrapedLink {
        name: text_of(el),
        href: el.value().attr("href").map(String::from),
    }
}
