pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "auricle")]
#[command(about = "Browse a public audiobook catalog from the terminal", long_about = None)]
pub struct Cli {
    /// Number of pages to fetch for listing commands
    #[arg(short, long, default_value_t = 1, global = true)]
    pub pages: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the home feed: latest releases, then the catalog
    Home,
    /// Search the catalog for books
    Search {
        /// Free-text query
        query: String,
    },
    /// Search for authors
    Authors {
        /// Free-text query
        query: String,
    },
    /// Show details for a book page URL
    Book {
        /// Book page URL
        url: String,
    },
    /// Show a chapter with its playable sources
    Chapter {
        /// Book page URL carrying a chapter parameter
        url: String,
    },
    /// Show an author or reader channel
    Channel {
        /// Channel URL
        url: String,
    },
    /// List the books of an author or reader channel
    List {
        /// Channel URL
        url: String,
    },
    /// Show what the persisted state currently caches
    State,
}
