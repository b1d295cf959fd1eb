use once_cell::sync::Lazy;
use taskping::configuration::get_configuration;
use taskping::startup::Application;
use taskping::telemetry::{get_subscriber, init_subscriber};
use wiremock::MockServer;

// Ensure that the `tracing` stack is only initialized once
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // The sink is part of the type returned by `get_subscriber`, so the two
    // branches cannot be folded into a single assignment
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub server_address: String,
    pub store_server: MockServer,
}

impl TestApp {
    pub async fn get_complete(&self, query: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/complete{}", self.server_address, query))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_dashboard(Some("https://tasks.example.com/dashboard".to_string())).await
}

pub async fn spawn_app_with_dashboard(dashboard_url: Option<String>) -> TestApp {
    // The first time this is invoked the code in `TRACING` runs. All other
    // invocations skip it
    Lazy::force(&TRACING);

    // stands in for the hosted PostgREST endpoint
    let store_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        // let the OS pick a free port
        c.application.port = 0;
        c.application.dashboard_url = dashboard_url;
        c.store.base_url = store_server.uri();
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application");
    let server_address = format!("http://127.0.0.1:{}", application.port());
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        server_address,
        store_server,
    }
}

/// A task row the way the store serializes one, extra columns included.
pub fn task_row(id: i64, title: &str, token: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "hmac_token": token,
        "status": "pending",
        "last_completed_at": null,
        "updated_at": "2025-06-01T09:00:00Z",
        "frequency": "weekly",
        "assignee_email": "mina@example.com"
    })
}
