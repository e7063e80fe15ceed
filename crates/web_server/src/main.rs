//! Main entry point for the Plan A booking marketplace backend.
//! This crate wires the REST API: activity browsing, booking confirmations,
//! guide registration, reviews, and the admin diagnostics surface.

use actix_web::{App, HttpServer, middleware::Logger, web};
use email_services::{EmailConfig, EmailSender};
use postgres::database::*;
use web_handlers::*;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting Plan A backend...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    // Build the email delivery chain from the environment
    let email_config = EmailConfig::from_env();
    log::info!(
        "📧 Email channel: {} (max {} attempts)",
        email_config.active_provider().as_str(),
        email_config.policy.max_attempts
    );
    let email_sender = EmailSender::new(email_config);

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("🌐 Server will be available at: http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(email_sender.clone()))
            .wrap(Logger::default())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/activities", web::get().to(list_activities))
                    .route("/activities/{activity_id}", web::get().to(get_activity))
                    .route(
                        "/activities/{activity_id}/reviews",
                        web::get().to(list_activity_reviews),
                    )
                    .route(
                        "/bookings/confirmation",
                        web::post().to(send_booking_confirmation),
                    )
                    .route("/reviews", web::post().to(create_review))
                    .service(
                        web::scope("/guides")
                            .route("/register", web::post().to(register_guide))
                            .route("/{guide_id}", web::get().to(get_guide))
                            .route("/{guide_id}/reviews", web::get().to(list_guide_reviews)),
                    )
                    // Admin routes (require the shared admin token)
                    .service(
                        web::scope("/admin")
                            .wrap(AdminAuth::from_env())
                            .route("/guides", web::get().to(list_guides))
                            .route("/guides/{guide_id}/verify", web::put().to(verify_guide))
                            .route(
                                "/activities/{activity_id}",
                                web::put().to(update_activity),
                            )
                            .route("/email/status", web::get().to(email_status))
                            .route("/email/test", web::post().to(send_test_email))
                            .route("/notify", web::post().to(notify_admin)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
