use actix_web::error::InternalError;
use actix_web::web::JsonConfig;
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/data").route(web::get().to(handlers::get_all_raw_documents)))
        .service(
            web::resource("/books")
                .route(web::get().to(handlers::get_all_books))
                .route(web::post().to(handlers::add_book)),
        );
}

/// Body that cannot be decoded into a book is answered the same way as a failed save
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        tracing::warn!("Rejected request body {}", err);
        InternalError::from_response(
            err,
            HttpResponse::InternalServerError().body(handlers::ADD_BOOK_ERROR),
        )
        .into()
    })
}
