//! Author representation and inbound author payload validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::BookSummaryView;
use crate::db::{Author, Book, CreateAuthor, UpdateAuthor};
use crate::error::{Error, FieldErrors, Result};

/// Longest accepted author name, in characters.
pub const NAME_MAX_LENGTH: usize = 1500;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const BAD_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// `{id, name, created, biography, birthday, books}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    #[serde(with = "super::timestamp")]
    pub created: DateTime<Utc>,
    pub biography: String,
    pub birthday: Option<NaiveDate>,
    pub books: Vec<BookSummaryView>,
}

impl AuthorView {
    /// Build the representation of `author` with `books` nested by name.
    pub fn new(author: Author, mut books: Vec<Book>) -> Self {
        books.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Self {
            id: author.id,
            name: author.name,
            created: author.created,
            biography: author.biography,
            birthday: author.birthday,
            books: books.into_iter().map(BookSummaryView::from).collect(),
        }
    }
}

/// A validated author payload. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorPayload {
    pub name: Option<String>,
    pub biography: Option<String>,
    /// `Some(None)` means an explicit `null`.
    pub birthday: Option<Option<NaiveDate>>,
}

impl AuthorPayload {
    /// Validate a JSON payload.
    ///
    /// With `partial == false` the name is required. Read-only fields
    /// (`id`, `created`, `books`) and unknown keys are ignored.
    pub fn from_json(value: &Value, partial: bool) -> Result<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::field(
                    "non_field_errors",
                    format!(
                        "Invalid data. Expected a dictionary, but got {}.",
                        json_type_name(other)
                    ),
                ))
            }
        };

        let mut errors = FieldErrors::new();
        let mut payload = AuthorPayload::default();

        match object.get("name") {
            None if !partial => push(&mut errors, "name", REQUIRED),
            None => {}
            Some(raw) => match validate_name(raw) {
                Ok(name) => payload.name = Some(name),
                Err(message) => push(&mut errors, "name", message),
            },
        }

        if let Some(raw) = object.get("biography") {
            match coerce_string(raw) {
                Ok(biography) => payload.biography = Some(biography.trim().to_string()),
                Err(message) => push(&mut errors, "biography", message),
            }
        }

        if let Some(raw) = object.get("birthday") {
            match validate_date(raw) {
                Ok(birthday) => payload.birthday = Some(birthday),
                Err(message) => push(&mut errors, "birthday", message),
            }
        }

        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// Parse a raw request body. An empty body counts as `{}`.
    pub fn from_body(body: &[u8], partial: bool) -> Result<Self> {
        let value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(body)?
        };
        Self::from_json(&value, partial)
    }

    pub fn into_create(self) -> CreateAuthor {
        CreateAuthor {
            name: self.name.unwrap_or_default(),
            biography: self.biography.unwrap_or_default(),
            birthday: self.birthday.flatten(),
        }
    }

    pub fn into_update(self) -> UpdateAuthor {
        UpdateAuthor {
            name: self.name,
            biography: self.biography,
            birthday: self.birthday,
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// Strings pass through, numbers are stringified, anything else is rejected.
fn coerce_string(raw: &Value) -> std::result::Result<String, &'static str> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(NOT_NULL),
        _ => Err(NOT_STRING),
    }
}

fn validate_name(raw: &Value) -> std::result::Result<String, &'static str> {
    let name = coerce_string(raw)?.trim().to_string();
    if name.is_empty() {
        return Err(NOT_BLANK);
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err("Ensure this field has no more than 1500 characters.");
    }
    Ok(name)
}

fn validate_date(raw: &Value) -> std::result::Result<Option<NaiveDate>, &'static str> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| BAD_DATE),
        _ => Err(BAD_DATE),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn field_errors(err: Error) -> FieldErrors {
        match err {
            Error::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_payload_requires_name() {
        let err = AuthorPayload::from_json(&json!({}), false).unwrap_err();
        assert_eq!(
            json!(field_errors(err)),
            json!({"name": ["This field is required."]})
        );
    }

    #[test]
    fn test_partial_payload_may_omit_name() {
        let payload = AuthorPayload::from_json(&json!({"biography": "bio"}), true).unwrap();
        assert_eq!(payload.name, None);
        assert_eq!(payload.biography.as_deref(), Some("bio"));
        assert_eq!(payload.birthday, None);
    }

    #[test]
    fn test_full_payload() {
        let payload = AuthorPayload::from_json(
            &json!({
                "name": "  New author ",
                "biography": "Some bio here",
                "birthday": "1950-12-25",
                "id": "ignored",
                "books": [],
                "unknown": 42
            }),
            false,
        )
        .unwrap();

        let create = payload.into_create();
        assert_eq!(create.name, "New author");
        assert_eq!(create.biography, "Some bio here");
        assert_eq!(create.birthday, NaiveDate::from_ymd_opt(1950, 12, 25));
    }

    #[test]
    fn test_collects_errors_per_field() {
        let long_name = "x".repeat(NAME_MAX_LENGTH + 1);
        let err = AuthorPayload::from_json(
            &json!({"name": long_name, "biography": null, "birthday": "25/12/1950"}),
            false,
        )
        .unwrap_err();

        assert_eq!(
            json!(field_errors(err)),
            json!({
                "name": ["Ensure this field has no more than 1500 characters."],
                "biography": ["This field may not be null."],
                "birthday": ["Date has wrong format. Use one of these formats instead: YYYY-MM-DD."]
            })
        );
    }

    #[test]
    fn test_name_rules() {
        let blank = AuthorPayload::from_json(&json!({"name": "   "}), true).unwrap_err();
        assert_eq!(field_errors(blank)["name"], vec![NOT_BLANK]);

        let null = AuthorPayload::from_json(&json!({"name": null}), true).unwrap_err();
        assert_eq!(field_errors(null)["name"], vec![NOT_NULL]);

        let boolean = AuthorPayload::from_json(&json!({"name": true}), true).unwrap_err();
        assert_eq!(field_errors(boolean)["name"], vec![NOT_STRING]);

        let number = AuthorPayload::from_json(&json!({"name": 1984}), true).unwrap();
        assert_eq!(number.name.as_deref(), Some("1984"));

        let exact = "é".repeat(NAME_MAX_LENGTH);
        assert!(AuthorPayload::from_json(&json!({ "name": exact }), false).is_ok());
    }

    #[test]
    fn test_birthday_can_be_cleared() {
        let payload = AuthorPayload::from_json(&json!({"birthday": null}), true).unwrap();
        assert_eq!(payload.birthday, Some(None));
        assert_eq!(payload.into_update().birthday, Some(None));
    }

    #[test]
    fn test_blank_birthday_is_a_format_error() {
        let err = AuthorPayload::from_json(&json!({"birthday": ""}), true).unwrap_err();
        assert_eq!(field_errors(err)["birthday"], vec![BAD_DATE]);
    }

    #[test]
    fn test_biography_is_trimmed_and_may_be_blank() {
        let payload =
            AuthorPayload::from_json(&json!({"name": "A", "biography": "  bio  "}), false).unwrap();
        assert_eq!(payload.biography.as_deref(), Some("bio"));

        let blank = AuthorPayload::from_json(&json!({"biography": "   "}), true).unwrap();
        assert_eq!(blank.biography.as_deref(), Some(""));
    }

    #[test]
    fn test_non_object_payload() {
        let err = AuthorPayload::from_json(&json!(["name"]), false).unwrap_err();
        assert_eq!(
            json!(field_errors(err)),
            json!({"non_field_errors": ["Invalid data. Expected a dictionary, but got list."]})
        );
    }

    #[test]
    fn test_from_body() {
        let err = AuthorPayload::from_body(b"", false).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = AuthorPayload::from_body(b"{not json", false).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));

        let payload = AuthorPayload::from_body(br#"{"name": "A"}"#, false).unwrap();
        assert_eq!(payload.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_author_view_shape() {
        let created = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap();
        let author = Author {
            id: "author-1".into(),
            name: "J. K. Rowling".into(),
            biography: "Some biography of the author here".into(),
            birthday: NaiveDate::from_ymd_opt(1965, 7, 31),
            created,
            modified: created,
        };
        let book = |id: &str, name: &str| Book {
            id: id.into(),
            author_id: "author-1".into(),
            name: name.into(),
            publish_date: NaiveDate::from_ymd_opt(1997, 6, 26),
            created,
            modified: created,
        };

        let view = AuthorView::new(author, vec![book("b2", "Book 2"), book("b1", "Book 1")]);

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "author-1",
                "name": "J. K. Rowling",
                "created": "2023-01-20T10:00:00Z",
                "biography": "Some biography of the author here",
                "birthday": "1965-07-31",
                "books": [
                    {"id": "b1", "name": "Book 1", "created": "2023-01-20T10:00:00Z", "publish_date": "1997-06-26"},
                    {"id": "b2", "name": "Book 2", "created": "2023-01-20T10:00:00Z", "publish_date": "1997-06-26"}
                ]
            })
        );
    }

    #[test]
    fn test_author_without_books_has_empty_list() {
        let created = Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap();
        let author = Author {
            id: "author-3".into(),
            name: "George R. R. Martin".into(),
            biography: String::new(),
            birthday: None,
            created,
            modified: created,
        };

        let value = serde_json::to_value(AuthorView::new(author, Vec::new())).unwrap();
        assert_eq!(value["books"], json!([]));
        assert_eq!(value["birthday"], Value::Null);
    }
}
