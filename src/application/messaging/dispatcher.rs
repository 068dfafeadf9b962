//! Command dispatcher - Routes slash commands to the vendor and replies

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::formatter::ResponseFormatter;
use super::parser::CommandParser;
use crate::application::errors::BotError;
use crate::application::services::GuideService;
use crate::domain::entities::Invocation;
use crate::domain::traits::Bot;

/// Lifecycle of a single invocation. Transitions only move forward; any
/// failure jumps straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DispatchState {
    Received,
    Parsed,
    Authenticated,
    Called,
    Replied,
    Failed,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchState::Received => "received",
            DispatchState::Parsed => "parsed",
            DispatchState::Authenticated => "authenticated",
            DispatchState::Called => "called",
            DispatchState::Replied => "replied",
            DispatchState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// State of one invocation, tagged with its id for logging
struct Progress<'a> {
    id: &'a str,
    state: DispatchState,
}

impl<'a> Progress<'a> {
    fn new(id: &'a str) -> Self {
        tracing::debug!("[{}] {}", id, DispatchState::Received);
        Self {
            id,
            state: DispatchState::Received,
        }
    }

    fn advance(&mut self, next: DispatchState) {
        if self.state == DispatchState::Failed || next <= self.state {
            tracing::warn!("[{}] ignoring transition {} -> {}", self.id, self.state, next);
            return;
        }
        tracing::debug!("[{}] {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    fn fail(&mut self) {
        tracing::debug!("[{}] {} -> {}", self.id, self.state, DispatchState::Failed);
        self.state = DispatchState::Failed;
    }
}

/// Wires parser, vendor service and formatter for each slash command and
/// posts exactly one reply per invocation.
pub struct CommandDispatcher {
    parser: CommandParser,
    formatter: ResponseFormatter,
    service: GuideService,
    bot: Arc<dyn Bot>,
}

impl CommandDispatcher {
    pub fn new(parser: CommandParser, service: GuideService, bot: Arc<dyn Bot>) -> Self {
        Self {
            formatter: ResponseFormatter::new(parser.default_species()),
            parser,
            service,
            bot,
        }
    }

    /// Process an invocation on its own task so slow vendor calls never
    /// hold up other invocations or the transport loop.
    pub fn spawn(self: &Arc<Self>, invocation: Invocation) -> JoinHandle<DispatchState> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.dispatch(invocation).await })
    }

    /// Process one invocation to completion, returning its final state
    pub async fn dispatch(&self, invocation: Invocation) -> DispatchState {
        tracing::info!(
            "[{}] {} {} from {} in {}",
            invocation.id,
            invocation.command,
            invocation.text,
            invocation.display_user(),
            invocation.channel_id
        );

        let mut progress = Progress::new(&invocation.id);
        let reply = match self.run(&invocation, &mut progress).await {
            Ok(text) => text,
            Err(err) => {
                progress.fail();
                self.failure_reply(&invocation.id, &err)
            }
        };

        match self.bot.send_message(&invocation.channel_id, &reply).await {
            Ok(_) => progress.advance(DispatchState::Replied),
            Err(e) => {
                tracing::error!("[{}] reply to {} lost: {}", invocation.id, invocation.channel_id, e);
                progress.fail();
            }
        }

        tracing::info!(
            "[{}] finished {} in {} ms",
            invocation.id,
            progress.state,
            invocation.elapsed().num_milliseconds()
        );
        progress.state
    }

    async fn run(&self, invocation: &Invocation, progress: &mut Progress<'_>) -> Result<String, BotError> {
        let request = self.parser.parse(&invocation.text)?;
        progress.advance(DispatchState::Parsed);

        if request.is_help() {
            return Ok(self.formatter.help());
        }

        let token = self.service.authenticate().await?;
        progress.advance(DispatchState::Authenticated);

        let result = self.service.execute(&request, token).await?;
        progress.advance(DispatchState::Called);
        tracing::info!(
            "[{}] {} returned {} guide(s) for {}",
            invocation.id,
            self.service.vendor_name(),
            result.len(),
            request.subcommand
        );

        Ok(self.formatter.format(&request, &result))
    }

    fn failure_reply(&self, id: &str, err: &BotError) -> String {
        match err {
            BotError::Parse(e) => {
                tracing::info!("[{}] rejected input: {}", id, e);
                self.formatter.parse_error(e)
            }
            BotError::Auth(e) => {
                tracing::error!("[{}] IDT authentication failed: {}", id, e);
                self.formatter.auth_failure()
            }
            BotError::Vendor(e) => {
                tracing::warn!("[{}] IDT call failed: {}", id, e);
                self.formatter.vendor_failure(e)
            }
            other => {
                tracing::error!("[{}] unexpected failure: {}", id, other);
                self.formatter.auth_failure()
            }
        }
    }

    /// Answer a mention with the help text in its thread
    pub async fn reply_help(&self, channel_id: &str, thread_ts: &str) {
        if let Err(e) = self.bot.send_thread_reply(channel_id, thread_ts, &self.formatter.help()).await {
            tracing::error!("Failed to post help reply to {}: {}", channel_id, e);
        }
    }
}
