pub mod book;
pub mod chapter;
pub mod person;

pub use book::{BookDetail, CatalogEntry};
pub use chapter::{AudioSource, ChapterDetail, ChapterEntry};
pub use person::{Author, Channel, PersonRef, Reader};
