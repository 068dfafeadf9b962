#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use crispr_bot::application::errors::TransportError;
use crispr_bot::application::messaging::{CommandDispatcher, CommandParser};
use crispr_bot::application::services::GuideService;
use crispr_bot::domain::entities::Species;
use crispr_bot::domain::traits::{Bot, BotInfo};
use crispr_bot::infrastructure::config::{Credentials, IdtConfig};
use crispr_bot::infrastructure::idt::{self, IdtClient, TokenProvider};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const TOKEN_PATH: &str = "/Identityserver/connect/token";
pub const CHECKER_PATH: &str = "/restapi/v1/CRISPR/Design/CRISPRSequenceChecker";
pub const CUSTOM_PATH: &str = "/restapi/v1/CRISPR/Design/CRISPRCustom";
pub const PREDESIGN_PATH: &str = "/restapi/v1/CRISPR/Design/CRISPRPredesign";

pub const CLIENT_SECRET: &str = "s3cr3t-client-value";
pub const PASSWORD: &str = "hunter2-password-value";

/// Records every message instead of posting it
#[derive(Default)]
pub struct RecordingBot {
    pub sent: Mutex<Vec<(String, String)>>,
    pub threaded: Mutex<Vec<(String, String, String)>>,
}

impl RecordingBot {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn only_reply(&self) -> String {
        let sent = self.sent.lock().unwrap();
        assert_eq!(sent.len(), 1, "expected exactly one reply, got {:?}", *sent);
        sent[0].1.clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<String, TransportError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel_id.to_string(), text.to_string()));
        Ok(format!("{}.000", sent.len()))
    }

    async fn send_thread_reply(&self, channel_id: &str, thread_ts: &str, text: &str) -> Result<String, TransportError> {
        self.threaded
            .lock()
            .unwrap()
            .push((channel_id.to_string(), thread_ts.to_string(), text.to_string()));
        Ok(thread_ts.to_string())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "B0TEST".to_string(),
            name: "crispr-bot".to_string(),
            team: "lab".to_string(),
        }
    }
}

pub fn idt_config(base_url: &str) -> IdtConfig {
    IdtConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..IdtConfig::default()
    }
}

pub fn credentials() -> Credentials {
    Credentials::from_lookup(|name| {
        let value = match name {
            "SLACK_BOT_TOKEN" => "xoxb-test",
            "SLACK_APP_TOKEN" => "xapp-test",
            "IDT_CLIENT_ID" => "lab-client",
            "IDT_CLIENT_SECRET" => CLIENT_SECRET,
            "IDT_USERNAME" => "lab-user",
            "IDT_PASSWORD" => PASSWORD,
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

/// Dispatcher wired to a mock IDT server and a recording bot
pub struct Harness {
    pub dispatcher: Arc<CommandDispatcher>,
    pub tokens: Arc<TokenProvider>,
    pub bot: Arc<RecordingBot>,
}

impl Harness {
    pub fn new(config: IdtConfig) -> Self {
        Self::with_default_species(config, Species::Human)
    }

    pub fn with_default_species(config: IdtConfig, species: Species) -> Self {
        ensure_init();
        let http = idt::build_http_client(&config).unwrap();
        let tokens = Arc::new(TokenProvider::new(http.clone(), &config, &credentials()));
        let vendor = Arc::new(IdtClient::new(http, config));
        let bot = Arc::new(RecordingBot::default());
        let dispatcher = Arc::new(CommandDispatcher::new(
            CommandParser::new(species),
            GuideService::new(tokens.clone(), vendor),
            bot.clone(),
        ));
        Self { dispatcher, tokens, bot }
    }

    pub fn for_server(url: &str) -> Self {
        Self::new(idt_config(url))
    }
}
