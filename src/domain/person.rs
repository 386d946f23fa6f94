use serde::{Deserialize, Serialize};

/// Lightweight reference to a person as it appears inside a book or
/// chapter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

/// A full author entity, as returned for an author channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub url: String,
    pub thumbnail: Option<String>,
    /// Bibliographic identifiers (external catalog links).
    pub links: Vec<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

impl Author {
    /// Render estimated lifespan metadata for display, when known.
    pub fn lifespan(&self) -> Option<String> {
        match (self.birth_year, self.death_year) {
            (Some(birth), Some(death)) => Some(format!("{birth}\u{2013}{death}")),
            (Some(birth), None) => Some(format!("b. {birth}")),
            (None, Some(death)) => Some(format!("d. {death}")),
            (None, None) => None,
        }
    }
}

/// A narrator entity. Cached keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    pub id: String,
    pub name: String,
    pub url: String,
    pub thumbnail: Option<String>,
}

/// Either kind of channel a catalog URL can point at.
#[derive(Debug, Clone, PartialEq)]
pub enum Channel {
    Author(Author),
    Reader(Reader),
}

impl Channel {
    pub fn name(&self) -> &str {
        match self {
            Channel::Author(a) => &a.name,
            Channel::Reader(r) => &r.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: "142".into(),
            name: "Herman Melville".into(),
            url: "https://example.org/author/142".into(),
            thumbnail: None,
            links: vec![],
            birth_year: None,
            death_year: None,
        }
    }

    #[test]
    fn test_lifespan_both_years() {
        let mut a = author();
        a.birth_year = Some(1819);
        a.death_year = Some(1891);
        assert_eq!(a.lifespan().as_deref(), Some("1819\u{2013}1891"));
    }

    #[test]
    fn test_lifespan_birth_only() {
        let mut a = author();
        a.birth_year = Some(1952);
        assert_eq!(a.lifespan().as_deref(), Some("b. 1952"));
    }

    #[test]
    fn test_lifespan_unknown() {
        assert_eq!(author().lifespan(), None);
    }
}
