use std::sync::Arc;

use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};
use validator::Validate;

use crate::api::{ErrorMessage, NewBook};
use crate::books_repository::BookRepository;

pub const LIST_BOOKS_ERROR: &str = "Error fetching books";
pub const ADD_BOOK_ERROR: &str = "Error saving book";
pub const LIST_DATA_ERROR: &str = "Internal Server Error";

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_raw_documents(
    books_repository: Data<Arc<dyn BookRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.list_raw_documents().await {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(err) => {
            tracing::error!("Get all raw documents failed {}", err);
            HttpResponse::InternalServerError().json(ErrorMessage {
                message: LIST_DATA_ERROR.to_string(),
            })
        }
    })
}

#[api_v2_operation]
pub async fn get_all_books(
    books_repository: Data<Arc<dyn BookRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.list_books().await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => {
            tracing::error!("Get all books failed {}", err);
            HttpResponse::InternalServerError().body(LIST_BOOKS_ERROR)
        }
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    details: web::Json<NewBook>,
) -> Result<HttpResponse, Error> {
    let details = details.into_inner();
    if let Err(err) = details.validate() {
        tracing::warn!("Rejected book {}", err);
        return Ok(HttpResponse::InternalServerError().body(ADD_BOOK_ERROR));
    }

    Ok(match books_repository.add_book(details).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            HttpResponse::InternalServerError().body(ADD_BOOK_ERROR)
        }
    })
}
