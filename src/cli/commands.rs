use crate::app::{Result, Session};
use crate::domain::{Author, CatalogEntry, Channel};
use crate::pager::Pager;

pub async fn home(session: &Session, pages: usize) -> Result<()> {
    let mut pager = session.home();
    print_book_pages(&mut pager, pages).await
}

pub async fn search(session: &Session, query: &str, pages: usize) -> Result<()> {
    let mut pager = session.search(query);
    print_book_pages(&mut pager, pages).await
}

pub async fn search_authors(session: &Session, query: &str, pages: usize) -> Result<()> {
    let mut pager = session.search_authors(query);
    let mut shown = 0;

    for _ in 0..pages {
        let page = pager.next_page().await?;
        for author in &page.items {
            print_author(author);
            shown += 1;
        }
        if !page.has_more {
            break;
        }
    }

    if shown == 0 {
        println!("No authors found");
    }
    Ok(())
}

pub async fn book(session: &Session, url: &str) -> Result<()> {
    let detail = session.book_detail(url).await?;

    println!("{}", detail.title);
    println!("  by {}", detail.display_authors());
    if let Some(views) = detail.view_count {
        println!("  {views} views");
    }
    if !detail.description.is_empty() {
        println!("  {}", detail.description);
    }
    println!("  {} chapters:", detail.chapters.len());
    for chapter in &detail.chapters {
        println!(
            "    {:>3}. {} ({})",
            chapter.index + 1,
            chapter.title,
            format_duration(chapter.duration_secs)
        );
    }

    Ok(())
}

pub async fn chapter(session: &Session, url: &str) -> Result<()> {
    let detail = session.chapter_detail(url).await?;

    println!("{} — {}", detail.book_title, detail.chapter.title);
    for source in &detail.sources {
        println!(
            "  [{}] {} ({}, {})",
            source.label, source.url, source.container, source.codec
        );
    }

    Ok(())
}

pub async fn channel(session: &Session, url: &str) -> Result<()> {
    match session.channel(url).await? {
        Channel::Author(author) => {
            print_author(&author);
            for link in &author.links {
                println!("    {link}");
            }
        }
        Channel::Reader(reader) => {
            println!("{} (reader)", reader.name);
            println!("  {}", reader.url);
        }
    }

    Ok(())
}

pub async fn channel_contents(session: &Session, url: &str, pages: usize) -> Result<()> {
    let mut pager = session.channel_contents(url)?;
    print_book_pages(&mut pager, pages).await
}

pub fn state(session: &Session) -> Result<()> {
    let summary = session.state_summary();

    println!("Cached book details: {}", summary.books);
    println!("Cached readers:      {}", summary.readers);
    println!("Known authors:       {}", summary.authors);
    println!("Latest-release ids:  {}", summary.latest_releases);

    Ok(())
}

async fn print_book_pages(pager: &mut Pager<CatalogEntry>, pages: usize) -> Result<()> {
    let mut shown = 0;

    for _ in 0..pages {
        let page = pager.next_page().await?;
        for entry in &page.items {
            print_entry(entry);
            shown += 1;
        }
        if !page.has_more {
            break;
        }
    }

    if shown == 0 {
        println!("No books found");
    }
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    let chapters = if entry.chapter_count >= 0 {
        format!("{} chapters", entry.chapter_count)
    } else {
        "chapters unknown".to_string()
    };
    println!("{} — {} ({})", entry.title, entry.author.name, chapters);
    println!("  {}", entry.url);
}

fn print_author(author: &Author) {
    match author.lifespan() {
        Some(years) => println!("{} ({})", author.name, years),
        None => println!("{}", author.name),
    }
    println!("  {}", author.url);
}

fn format_duration(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
