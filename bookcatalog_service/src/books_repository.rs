pub use in_memory_books_repository::InMemoryBookRepository;
pub use mongo_books_repository::{MongoBooksRepository, MongoBooksRepositoryConfig};

use crate::api::{Book, NewBook};

mod in_memory_books_repository;
mod mongo_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] mongodb::error::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Persists a new book, returns it together with the id assigned by the store
    async fn add_book(&self, details: NewBook) -> Result<Book, BookRepositoryError>;
    /// Lists all books in the repository, in the order the store returns them
    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError>;
    /// Lists every document of the raw collection without mapping it to a model
    async fn list_raw_documents(&self) -> Result<Vec<serde_json::Value>, BookRepositoryError>;
}
