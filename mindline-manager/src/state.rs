use std::sync::Arc;

use mindline_agent::ConversationController;
use mindline_core::config::Config;
use mindline_core::session::SessionStore;
use mindline_providers::{ChatCompletionsClient, LLMProvider, SupportClient};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{CookieCodec, PasswordHasher};
use crate::users::UserRepository;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConversationController>,
    pub users: UserRepository,
    pub cookies: Arc<CookieCodec>,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(
        controller: Arc<ConversationController>,
        users: UserRepository,
        cookies: CookieCodec,
    ) -> Self {
        Self {
            controller,
            users,
            cookies: Arc::new(cookies),
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Wire every component from a loaded configuration
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = ChatCompletionsClient::from_config(&config.inference);
        if !client.has_credentials() {
            warn!("No inference API key configured; chat replies will use the fallback message");
        }
        info!(
            "Using model {} at {}",
            client.get_default_model(),
            client.endpoint()
        );

        let responder = Arc::new(SupportClient::new(Arc::new(client)));
        let controller = Arc::new(ConversationController::new(
            Arc::new(SessionStore::new()),
            responder,
        ));
        let users = UserRepository::connect(&config.database).await?;
        let cookies = CookieCodec::new(&config.auth.session_secret, &config.auth.cookie_name);

        Ok(Self::new(controller, users, cookies))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub message_id: String,
}

#[derive(Debug, Serialize)]
pub struct NewChatResponse {
    pub success: bool,
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
    pub message: String,
}
