use chrono::{DateTime, Duration, Utc};

/// One slash-command delivery from the chat platform
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: String,
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub received_at: DateTime<Utc>,
    pub platform: String,
}

impl Invocation {
    pub fn new(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            command: "/crispr".to_string(),
            text: text.into(),
            channel_id: channel_id.into(),
            user_id: None,
            user_name: None,
            received_at: Utc::now(),
            platform: "unknown".to_string(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_user(mut self, id: impl Into<String>, name: Option<String>) -> Self {
        self.user_id = Some(id.into());
        self.user_name = name;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn display_user(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.user_id.as_deref())
            .unwrap_or("unknown")
    }

    /// Time since the platform delivered this invocation
    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.received_at
    }
}
