use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hex representation of the document id assigned by the store
pub type BookId = String;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Validate, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Payload accepted when appending a book, every field is required
pub struct NewBook {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub author: String,
    pub published_year: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Book as stored in the catalog, together with its assigned id
pub struct Book {
    pub title: String,
    pub author: String,
    pub published_year: i64,
    pub id: BookId,
}

impl Book {
    pub fn new(id: BookId, details: NewBook) -> Self {
        Self {
            title: details.title,
            author: details.author,
            published_year: details.published_year,
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorMessage {
    pub message: String,
}
