use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::routes::{complete_preflight, complete_task, health_check};
use crate::store::RestTaskStore;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let store = configuration.store.client();
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store, configuration.application.dashboard_url)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// Wrapper type so the handler can retrieve the dashboard link from app data
pub struct DashboardUrl(pub Option<String>);

pub fn run(
    listener: TcpListener,
    store: RestTaskStore,
    dashboard_url: Option<String>,
) -> Result<Server, anyhow::Error> {
    let store = web::Data::new(store);
    let dashboard_url = web::Data::new(DashboardUrl(dashboard_url));
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // completion links are opened from mail clients and the dashboard,
            // which live on other origins
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add((
                        "Access-Control-Allow-Headers",
                        "authorization, x-client-info, apikey, content-type",
                    )),
            )
            .route("/health", web::get().to(health_check))
            .route("/complete", web::get().to(complete_task))
            .route(
                "/complete",
                web::route().method(Method::OPTIONS).to(complete_preflight),
            )
            .app_data(store.clone())
            .app_data(dashboard_url.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
