mod booking;
mod cron;
mod error;
mod shared;
mod status;
mod webhook;
mod workflow;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use chime_infra::ChimeContext;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// The service api: bookings, workflows and the health endpoint.
pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    booking::configure_routes(cfg);
    status::configure_routes(cfg);
    workflow::configure_routes(cfg);
}

/// The surface invoked by the delivery providers and the platform
/// scheduler: delivery webhooks and the cron endpoints.
pub fn configure_platform_api(cfg: &mut web::ServiceConfig) {
    cron::configure_routes(cfg);
    webhook::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: ChimeContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context).await?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(context: ChimeContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr().unwrap().port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
                .service(web::scope("/api").configure(configure_platform_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
