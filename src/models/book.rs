//! Book and collaborator representations.
//!
//! Books appear in two shapes: the summary nested under an author, and the
//! standalone form that carries its author reference and collaborators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::db::{Author, Book, Collaborator};

/// `{id, name, created, publish_date}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookSummaryView {
    pub id: String,
    pub name: String,
    #[serde(with = "super::timestamp")]
    pub created: DateTime<Utc>,
    pub publish_date: Option<NaiveDate>,
}

impl From<Book> for BookSummaryView {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            created: book.created,
            publish_date: book.publish_date,
        }
    }
}

/// `{id, name}` reference to a book's author.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
}

impl From<&Author> for AuthorRef {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.clone(),
            name: author.name.clone(),
        }
    }
}

/// `{id, name}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollaboratorView {
    pub id: String,
    pub name: String,
}

impl From<Collaborator> for CollaboratorView {
    fn from(collaborator: Collaborator) -> Self {
        Self {
            id: collaborator.id,
            name: collaborator.name,
        }
    }
}

/// `{id, name, created, publish_date, author, collaborators}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookView {
    pub id: String,
    pub name: String,
    #[serde(with = "super::timestamp")]
    pub created: DateTime<Utc>,
    pub publish_date: Option<NaiveDate>,
    pub author: AuthorRef,
    pub collaborators: Vec<CollaboratorView>,
}

impl BookView {
    /// Build the standalone representation; `collaborators` keep their given order.
    pub fn new(book: Book, author: &Author, collaborators: Vec<Collaborator>) -> Self {
        Self {
            id: book.id,
            name: book.name,
            created: book.created,
            publish_date: book.publish_date,
            author: AuthorRef::from(author),
            collaborators: collaborators
                .into_iter()
                .map(CollaboratorView::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_book_view_nests_author_and_collaborators() {
        let created = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap();
        let author = Author {
            id: "author-2".into(),
            name: "Jorge Luis Borges".into(),
            biography: String::new(),
            birthday: None,
            created,
            modified: created,
        };
        let book = Book {
            id: "book-3".into(),
            author_id: "author-2".into(),
            name: "El Aleph".into(),
            publish_date: NaiveDate::from_ymd_opt(1949, 6, 1),
            created,
            modified: created,
        };
        let collaborator = Collaborator {
            id: "collab-1".into(),
            name: "Collaborator 1".into(),
            created,
            modified: created,
        };

        let view = BookView::new(book, &author, vec![collaborator]);

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "book-3",
                "name": "El Aleph",
                "created": "2023-01-20T10:00:00Z",
                "publish_date": "1949-06-01",
                "author": {"id": "author-2", "name": "Jorge Luis Borges"},
                "collaborators": [{"id": "collab-1", "name": "Collaborator 1"}]
            })
        );
    }

    #[test]
    fn test_book_without_publish_date() {
        let created = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap();
        let book = Book {
            id: "book-1".into(),
            author_id: "author-1".into(),
            name: "Untitled".into(),
            publish_date: None,
            created,
            modified: created,
        };

        let value = serde_json::to_value(BookSummaryView::from(book)).unwrap();
        assert_eq!(value["publish_date"], serde_json::Value::Null);
    }
}
