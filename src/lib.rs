//! crispr-bot - Slack slash command bot for IDT CRISPR guide design

pub mod domain;
pub mod application;
pub mod infrastructure;
