use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use fcm_shared::FCMClient;
use message_notification_service::{
    handlers::register_routes as register_triggers,
    metrics,
    repository::{create_pool, PgUserRepository},
    Config, FcmPushGateway, NotificationDispatcher,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(env = %config.app.env, "Starting message notification service");

    let db_pool = create_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("failed to run migrations")?;

    // One FCM client for the whole process; the dispatcher shares it
    let mut fcm_client = FCMClient::from_service_account_file(
        config.fcm.project_id.clone(),
        &config.fcm.service_account_path,
    )
    .context("failed to initialize FCM client")?;
    if let Some(endpoint) = &config.fcm.endpoint {
        fcm_client = fcm_client.with_endpoint(endpoint.clone());
    }
    tracing::info!(project_id = %fcm_client.project_id, "FCM client initialized");

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(PgUserRepository::new(db_pool)),
        Arc::new(FcmPushGateway::new(Arc::new(fcm_client))),
    ));

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(dispatcher.clone()))
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(register_triggers)
    })
    .bind(&addr)?
    .run()
    .await?;

    Ok(())
}
