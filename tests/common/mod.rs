//! Shared scaffolding for integration tests
//!
//! Spins up a wiremock upstream and produces settings pointing the
//! relay at it.

use claila_relay::Settings;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/api/v2/getcsrftoken";
pub const CHAT_PATH: &str = "/api/v2/unichat4";

/// Settings wired to the given mock upstream
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.upstream.token_url = format!("{}{}", server.uri(), TOKEN_PATH);
    settings.upstream.chat_url = format!("{}{}", server.uri(), CHAT_PATH);
    settings.upstream.token_timeout_secs = 5;
    settings.upstream.chat_timeout_secs = 5;
    settings.pool.max_sessions = 2;
    settings
}

/// Mount a token endpoint that always hands out the given token
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(token))
        .mount(server)
        .await;
}
