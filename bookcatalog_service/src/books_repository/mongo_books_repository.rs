use std::time::Duration;

use anyhow::Context;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::api::{Book, NewBook};
use crate::books_repository::{BookRepository, BookRepositoryError};

/// Shape of a book inside the books collection
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    author: String,
    published_year: i64,
}

impl From<NewBook> for BookDocument {
    fn from(details: NewBook) -> Self {
        Self {
            id: None,
            title: details.title,
            author: details.author,
            published_year: details.published_year,
        }
    }
}

impl TryFrom<BookDocument> for Book {
    type Error = BookRepositoryError;

    fn try_from(document: BookDocument) -> Result<Self, Self::Error> {
        let id = document
            .id
            .ok_or_else(|| BookRepositoryError::Other("Document without _id".to_string()))?;
        Ok(Book {
            title: document.title,
            author: document.author,
            published_year: document.published_year,
            id: id.to_hex(),
        })
    }
}

/// Renders a stored value the way a JSON API client expects it:
/// ids as hex strings, dates as RFC 3339 strings, anything else as relaxed Extended JSON
fn bson_to_json(value: Bson) -> serde_json::Value {
    match value {
        Bson::ObjectId(id) => serde_json::Value::String(id.to_hex()),
        Bson::DateTime(date) => match date.try_to_rfc3339_string() {
            Ok(text) => serde_json::Value::String(text),
            Err(_) => Bson::DateTime(date).into_relaxed_extjson(),
        },
        Bson::Document(document) => serde_json::Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(bson_to_json).collect())
        }
        other => other.into_relaxed_extjson(),
    }
}

pub struct MongoBooksRepository {
    books: Collection<BookDocument>,
    raw_documents: Collection<Document>,
}

pub struct MongoBooksRepositoryConfig {
    pub uri: String,
    pub database_name: String,
    pub books_collection: String,
    pub raw_collection: String,
    /// How long to wait for a reachable server before giving up
    pub connect_timeout: Duration,
}

impl MongoBooksRepository {
    /// Connects to the store and verifies the connection with a ping.
    /// Fails if no server answers within `connect_timeout`.
    pub async fn init(config: MongoBooksRepositoryConfig) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .context("Failed to parse MongoDB connection uri")?;
        options.app_name = Some("bookcatalog_service".to_string());
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;
        let database = client.database(&config.database_name);

        database
            .run_command(doc! {"ping": 1})
            .await
            .context("Failed to ping MongoDB")?;
        tracing::info!(
            database = %config.database_name,
            books_collection = %config.books_collection,
            raw_collection = %config.raw_collection,
            "Connected to MongoDB"
        );

        Ok(Self {
            books: database.collection(&config.books_collection),
            raw_documents: database.collection(&config.raw_collection),
        })
    }
}

#[async_trait::async_trait]
impl BookRepository for MongoBooksRepository {
    async fn add_book(&self, details: NewBook) -> Result<Book, BookRepositoryError> {
        let document = BookDocument::from(details);
        let result = self.books.insert_one(&document).await?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookRepositoryError::Other("Id not returned".to_string()))?;

        Book::try_from(BookDocument {
            id: Some(id),
            ..document
        })
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let documents: Vec<BookDocument> = self.books.find(doc! {}).await?.try_collect().await?;

        documents.into_iter().map(Book::try_from).collect()
    }

    async fn list_raw_documents(&self) -> Result<Vec<serde_json::Value>, BookRepositoryError> {
        let documents: Vec<Document> = self
            .raw_documents
            .find(doc! {})
            .await?
            .try_collect()
            .await?;

        Ok(documents
            .into_iter()
            .map(|document| bson_to_json(Bson::Document(document)))
            .collect())
    }
}

#[cfg(test)]
mod mongo_book_repository_tests {
    use std::time::Duration;

    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::{doc, Bson, DateTime};
    use serde_json::json;
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use crate::api::NewBook;
    use crate::books_repository::mongo_books_repository::bson_to_json;
    use crate::books_repository::{
        BookRepository, MongoBooksRepository, MongoBooksRepositoryConfig,
    };

    fn repository_config(uri: &str) -> MongoBooksRepositoryConfig {
        MongoBooksRepositoryConfig {
            uri: uri.to_string(),
            database_name: "sample".to_string(),
            books_collection: "books".to_string(),
            raw_collection: "data".to_string(),
            connect_timeout: Duration::from_millis(500),
        }
    }

    async fn start_mongo_container_and_init_repo(
    ) -> (ContainerAsync<GenericImage>, MongoBooksRepository) {
        let _mongo_container = GenericImage::new("mongo", "7")
            .with_mapped_port(27017, 27017.tcp())
            .start()
            .await
            .expect("Failed to start mongo");

        for _ in 0..20 {
            if let Ok(repo) =
                MongoBooksRepository::init(repository_config("mongodb://127.0.0.1:27017")).await
            {
                return (_mongo_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup mongo container")
    }

    #[test]
    fn test_bson_to_json_renders_ids_and_dates_as_strings() {
        let id = ObjectId::new();
        let nested_id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "at": DateTime::from_millis(0),
            "name": "sensor",
            "count": 42,
            "ratio": 0.5,
            "missing": Bson::Null,
            "tags": ["a", "b"],
            "parts": [{"ref": nested_id}],
        };

        let rendered = bson_to_json(Bson::Document(document));

        assert_eq!(rendered["_id"], json!(id.to_hex()));
        let at = rendered["at"].as_str().expect("Date is not a string");
        assert!(at.starts_with("1970-01-01T00:00:00"));
        assert_eq!(rendered["name"], json!("sensor"));
        assert_eq!(rendered["count"], json!(42));
        assert_eq!(rendered["ratio"], json!(0.5));
        assert_eq!(rendered["missing"], json!(null));
        assert_eq!(rendered["tags"], json!(["a", "b"]));
        assert_eq!(rendered["parts"], json!([{"ref": nested_id.to_hex()}]));
    }

    #[tokio::test]
    /// Connection to a store that does not answer is reported as an error
    async fn test_init_fails_when_store_is_unreachable() {
        let result = MongoBooksRepository::init(repository_config("mongodb://127.0.0.1:1")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_init_fails_for_invalid_uri() {
        let result = MongoBooksRepository::init(repository_config("postgresql://localhost")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[file_serial(key, path => "../.mongotestslock")]
    /// Tests if add_book and list_books work correctly
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_books_and_list_them() {
        let (_container, repo) = start_mongo_container_and_init_repo().await;

        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![]);

        let dune = NewBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_year: 1965,
        };
        let book1 = repo
            .add_book(dune.clone())
            .await
            .expect("Failed to add book");
        assert_eq!(book1.id.len(), 24);
        assert_eq!(book1.title, "Dune");
        assert_eq!(book1.author, "Herbert");
        assert_eq!(book1.published_year, 1965);

        let list = repo.list_books().await.expect("Failed to list books");
        assert_eq!(list, vec![book1.clone()]);

        let book2 = repo
            .add_book(NewBook {
                title: "Dune Messiah".to_string(),
                published_year: 1969,
                ..dune
            })
            .await
            .expect("Failed to add book");
        assert_ne!(book1.id, book2.id);

        let mut list = repo.list_books().await.expect("Failed to list books");
        list.sort_by(|a, b| a.id.cmp(&b.id));
        let mut expected = vec![book1, book2];
        expected.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(list, expected);

        let mut list_again = repo.list_books().await.expect("Failed to list books");
        list_again.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(list, list_again);
    }

    #[tokio::test]
    #[file_serial(key, path => "../.mongotestslock")]
    /// Tests if raw documents are returned as stored
    async fn test_list_raw_documents() {
        let (_container, repo) = start_mongo_container_and_init_repo().await;

        let list = repo.list_raw_documents().await.expect("Failed to list");
        assert!(list.is_empty());

        repo.raw_documents
            .insert_one(doc! {"name": "sensor", "value": 42})
            .await
            .expect("Failed to insert raw document");

        let list = repo.list_raw_documents().await.expect("Failed to list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["name"], json!("sensor"));
        assert_eq!(list[0]["value"], json!(42));
        assert_eq!(list[0]["_id"].as_str().map(str::len), Some(24));
    }
}
