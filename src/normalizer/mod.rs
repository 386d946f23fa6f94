//! Converts heterogeneous upstream records (structured API JSON or
//! scraped HTML rows) into the canonical catalog entities. Each source
//! feeds a tagged variant into one normalization path; normalization
//! never fails on missing fields, it applies ordered fallback chains.

use html_escape::decode_html_entities;
use url::Url;

use crate::api::{ApiBook, ApiPerson, ApiSection, DetailResponse};
use crate::domain::{Author, BookDetail, CatalogEntry, ChapterEntry, PersonRef, Reader};

pub const UNKNOWN_TITLE: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
/// Platform default cover asset, relative to the site root.
pub const DEFAULT_COVER: &str = "/static/images/default-cover.jpg";

/// Book-shaped record from either source.
#[derive(Debug, Clone)]
pub enum BookRecord {
    Api(ApiBook),
    Scraped(ScrapedBook),
}

/// Chapter-shaped record from either source.
#[derive(Debug, Clone)]
pub enum ChapterRecord {
    Api(ApiSection),
    Scraped(ScrapedChapter),
}

/// Full detail payload from either source.
#[derive(Debug)]
pub enum DetailRecord {
    Api(DetailResponse),
    Scraped(ScrapedBook),
}

/// Book data extracted from a fallback HTML page.
#[derive(Debug, Clone, Default)]
pub struct ScrapedBook {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<ScrapedLink>,
    pub cover: Option<String>,
    pub chapters: Vec<ScrapedChapter>,
}

#[derive(Debug, Clone)]
pub struct ScrapedLink {
    pub name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScrapedChapter {
    pub title: Option<String>,
    pub audio_url: Option<String>,
    pub reader: Option<ScrapedLink>,
    pub duration_secs: u32,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    site: Url,
}

impl Normalizer {
    pub fn new(site: Url) -> Self {
        Self { site }
    }

    pub fn normalize_book(&self, record: BookRecord) -> CatalogEntry {
        match record {
            BookRecord::Api(book) => self.book_from_api(book),
            BookRecord::Scraped(book) => self.book_from_scrape(book),
        }
    }

    pub fn normalize_chapter(&self, record: ChapterRecord, index: usize) -> ChapterEntry {
        match record {
            ChapterRecord::Api(section) => ChapterEntry {
                index,
                title: section
                    .title
                    .or(section.name)
                    .map(|t| decode(&t))
                    .unwrap_or_else(|| format!("Part {}", index + 1)),
                duration_secs: section.duration.unwrap_or(0),
                audio_url: section.audio_url.map(|u| self.absolutize(&u)),
                section_id: section.id.map(|id| id.to_string()),
                hls_id: section.hls_id,
                readers: section
                    .readers
                    .into_iter()
                    .map(|p| self.person_ref(p))
                    .collect(),
            },
            ChapterRecord::Scraped(chapter) => ChapterEntry {
                index,
                title: chapter
                    .title
                    .map(|t| decode(&t))
                    .unwrap_or_else(|| format!("Part {}", index + 1)),
                duration_secs: chapter.duration_secs,
                audio_url: chapter.audio_url.map(|u| self.absolutize(&u)),
                section_id: None,
                hls_id: None,
                readers: chapter
                    .reader
                    .into_iter()
                    .map(|link| self.link_ref(link))
                    .collect(),
            },
        }
    }

    pub fn normalize_detail(&self, record: DetailRecord) -> BookDetail {
        match record {
            DetailRecord::Api(detail) => {
                let chapters = detail
                    .sections
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| self.normalize_chapter(ChapterRecord::Api(s), i))
                    .collect();
                let book = detail.book;
                let authors: Vec<PersonRef> = book
                    .authors
                    .iter()
                    .cloned()
                    .map(|p| self.person_ref(p))
                    .collect();
                let entry = self.book_from_api(book.clone());

                BookDetail {
                    id: entry.id,
                    title: entry.title,
                    description: book
                        .description
                        .map(|d| decode(&d))
                        .unwrap_or_default(),
                    cover: entry.thumbnail,
                    author: entry.author,
                    authors,
                    chapters,
                    view_count: book.views,
                    url: entry.url,
                }
            }
            DetailRecord::Scraped(book) => {
                let chapters = book
                    .chapters
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(i, c)| self.normalize_chapter(ChapterRecord::Scraped(c), i))
                    .collect();
                let authors: Vec<PersonRef> = book
                    .authors
                    .iter()
                    .cloned()
                    .map(|link| self.link_ref(link))
                    .collect();
                let description = book
                    .description
                    .as_deref()
                    .map(|d| decode(d))
                    .unwrap_or_default();
                let entry = self.book_from_scrape(book);

                BookDetail {
                    id: entry.id,
                    title: entry.title,
                    description,
                    cover: entry.thumbnail,
                    author: entry.author,
                    authors,
                    chapters,
                    view_count: None,
                    url: entry.url,
                }
            }
        }
    }

    pub fn normalize_author(&self, person: ApiPerson) -> Author {
        let id = person
            .id
            .map(|id| id.to_string())
            .or_else(|| person.name.clone())
            .unwrap_or_default();
        let url = person
            .url
            .as_deref()
            .map(|u| self.absolutize(u))
            .unwrap_or_else(|| self.channel_url("author", &id));

        Author {
            name: person
                .name
                .map(|n| decode(&n))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            url,
            thumbnail: person.image.map(|u| self.absolutize(&u)),
            links: person.links,
            birth_year: person.birth_year,
            death_year: person.death_year,
            id,
        }
    }

    pub fn normalize_reader(&self, person: ApiPerson) -> Reader {
        let id = person
            .id
            .map(|id| id.to_string())
            .or_else(|| person.name.clone())
            .unwrap_or_default();
        let url = person
            .url
            .as_deref()
            .map(|u| self.absolutize(u))
            .unwrap_or_else(|| self.channel_url("reader", &id));

        Reader {
            name: person
                .name
                .map(|n| decode(&n))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            url,
            thumbnail: person.image.map(|u| self.absolutize(&u)),
            id,
        }
    }

    fn book_from_api(&self, book: ApiBook) -> CatalogEntry {
        let title = book
            .title
            .or(book.name)
            .map(|t| decode(&t))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let author = book
            .authors
            .into_iter()
            .next()
            .map(|p| self.person_ref(p))
            .or_else(|| {
                book.author_name.map(|name| PersonRef {
                    id: None,
                    name: decode(&name),
                    url: None,
                })
            })
            .unwrap_or_else(|| unknown_author());

        let thumbnail = book
            .image_big
            .or(book.image_thumb)
            .as_deref()
            .map(|u| self.absolutize(u))
            .unwrap_or_else(|| self.absolutize(DEFAULT_COVER));

        let url = book
            .url
            .as_deref()
            .map(|u| self.absolutize(u))
            .or_else(|| {
                book.slug
                    .as_deref()
                    .map(|slug| self.absolutize(&format!("/{slug}/")))
            })
            .unwrap_or_else(|| self.site.to_string());

        let id = book
            .id
            .map(|id| id.to_string())
            .or(book.slug)
            .unwrap_or_else(|| url.clone());

        CatalogEntry {
            id,
            title,
            author,
            thumbnail,
            chapter_count: book.sections_count.unwrap_or(-1),
            url,
        }
    }

    fn book_from_scrape(&self, book: ScrapedBook) -> CatalogEntry {
        let url = self.absolutize(&book.url);
        let id = slug_of(&url).unwrap_or_else(|| url.clone());
        let chapter_count = book.chapters.len() as i32;

        CatalogEntry {
            id,
            title: book
                .title
                .map(|t| decode(&t))
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: book
                .authors
                .into_iter()
                .next()
                .map(|link| self.link_ref(link))
                .unwrap_or_else(|| unknown_author()),
            thumbnail: book
                .cover
                .as_deref()
                .map(|u| self.absolutize(u))
                .unwrap_or_else(|| self.absolutize(DEFAULT_COVER)),
            chapter_count,
            url,
        }
    }

    fn person_ref(&self, person: ApiPerson) -> PersonRef {
        PersonRef {
            id: person.id.map(|id| id.to_string()),
            name: person
                .name
                .map(|n| decode(&n))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            url: person.url.as_deref().map(|u| self.absolutize(u)),
        }
    }

    fn link_ref(&self, link: ScrapedLink) -> PersonRef {
        PersonRef {
            id: None,
            name: if link.name.is_empty() {
                UNKNOWN_AUTHOR.to_string()
            } else {
                decode(&link.name)
            },
            url: link.href.as_deref().map(|u| self.absolutize(u)),
        }
    }

    fn channel_url(&self, kind: &str, id: &str) -> String {
        self.absolutize(&format!("/{kind}/{id}"))
    }

    fn absolutize(&self, href: &str) -> String {
        self.site
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string())
    }
}

fn decode(text: &str) -> String {
    decode_html_entities(text.trim()).to_string()
}

fn unknown_author() -> PersonRef {
    PersonRef {
        id: None,
        name: UNKNOWN_AUTHOR.to_string(),
        url: None,
    }
}

/// Last non-empty path segment of a book URL.
fn slug_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(String::from)
}
