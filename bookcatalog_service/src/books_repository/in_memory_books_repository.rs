use mongodb::bson::oid::ObjectId;

use crate::api::{Book, NewBook};
use crate::books_repository::{BookRepository, BookRepositoryError};

#[derive(Default)]
pub struct InMemoryBookRepository {
    books: parking_lot::RwLock<Vec<Book>>,
    raw_documents: parking_lot::RwLock<Vec<serde_json::Value>>,
}

impl InMemoryBookRepository {
    /// Creates repository whose raw collection is pre-filled with given documents
    pub fn with_raw_documents(raw_documents: Vec<serde_json::Value>) -> Self {
        Self {
            books: Default::default(),
            raw_documents: parking_lot::RwLock::new(raw_documents),
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, details: NewBook) -> Result<Book, BookRepositoryError> {
        let book = Book::new(ObjectId::new().to_hex(), details);
        self.books.write().push(book.clone());
        Ok(book)
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(self.books.read().clone())
    }

    async fn list_raw_documents(&self) -> Result<Vec<serde_json::Value>, BookRepositoryError> {
        Ok(self.raw_documents.read().clone())
    }
}
