use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookcatalog_service::app_config::{config_app, json_config};
use bookcatalog_service::books_repository::{
    BookRepository, InMemoryBookRepository, MongoBooksRepository,
};
use bookcatalog_service::settings::Settings;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "bookcatalog_service";

    // Spans go to the Jaeger agent through a plain UDP socket, no runtime is needed for export.
    // Without a tracer only the structured logs are emitted.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_simple();
    let (telemetry, tracer_error) = match tracer {
        Ok(tracer) => (Some(tracing_opentelemetry::layer().with_tracer(tracer)), None),
        Err(err) => (None, Some(err)),
    };

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.");

    if let Some(err) = tracer_error {
        tracing::warn!("OpenTelemetry tracer not installed, span export disabled: {}", err);
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry();

    let settings = Settings::load().context("Failed to load settings")?;

    // The listener is bound only once the store answered
    let books_repository: Arc<dyn BookRepository> = if settings.use_in_memory_db {
        tracing::warn!("Using in-memory book repository, data is lost on restart");
        Arc::new(InMemoryBookRepository::default())
    } else {
        match MongoBooksRepository::init(settings.mongo_repository_config()).await {
            Ok(repository) => Arc::new(repository),
            Err(err) => {
                tracing::error!("Failed to connect to the document store: {:#}", err);
                return Err(err);
            }
        }
    };

    tracing::info!(
        "starting HTTP server at http://{}:{}",
        settings.host,
        settings.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .app_data(json_config())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("Failed to bind port {}", settings.port))?
    .run()
    .await
    .context("HTTP server failed")
}
