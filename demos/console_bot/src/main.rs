//! Console Bot
//!
//! Runs the full Da Vinci command set against the terminal: every line you
//! type becomes a message or interaction, every reply is printed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package console-bot -- --memory --moderator
//! ```
//!
//! Then try `!help`, `:press <id> right-you`, `:attach <image-url>` followed by
//! `:reply <id> !rotate 90`, or `:slash bookmark/list`. `:quit` exits.

mod gateway;
mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use davinci::core::{InboundEvent, User};
use davinci::runtime::DavinciRuntime;
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::gateway::ConsoleGateway;
use crate::input::{Console, Line};

#[derive(Parser, Debug)]
#[command(name = "console-bot", about = "Chat with Da Vinci from a terminal")]
struct Args {
    /// Configuration file (defaults to davinci.toml in the usual places).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(short, long)]
    profile: Option<String>,

    /// Your user id.
    #[arg(short, long, default_value = "you")]
    user: String,

    /// Grant yourself the manage-messages permission.
    #[arg(long)]
    moderator: bool,

    /// Keep bookmarks in memory instead of SQLite.
    #[arg(long)]
    memory: bool,

    /// Override the command prefix.
    #[arg(long)]
    prefix: Option<String>,

    /// Save uploaded files (rotated images) here.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

pub(crate) fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(dir) = &args.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let moderators = args.moderator.then(|| args.user.clone());
    let gateway = Arc::new(ConsoleGateway::new(moderators, args.out_dir.clone()));

    let mut builder = DavinciRuntime::builder(gateway.clone());
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    if args.memory {
        builder = builder.set("storage.backend", "memory");
    }
    if let Some(prefix) = &args.prefix {
        builder = builder.set("bot.prefix", prefix);
    }
    let runtime = builder.build().context("starting the bot")?;

    let (tx, rx) = mpsc::channel(64);
    let shutdown = runtime.shutdown_token();
    let user = User::new(args.user.clone(), format!("{}#0001", args.user));
    let ids = Arc::clone(&gateway);
    let console = Console::new(user, move |prefix: char| ids.next_id(prefix));

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            };

            match console.parse(&line) {
                Line::Event(event) => {
                    match &event {
                        InboundEvent::TextMessage(msg) => gateway.remember(msg.message.clone()),
                        InboundEvent::MessageDeleted(deleted) => {
                            gateway.forget(&deleted.message.message_id)
                        }
                        _ => {}
                    }
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                Line::Quit => {
                    shutdown.cancel();
                    break;
                }
                Line::Usage(usage) => println!("usage: {usage}"),
                Line::Empty => {}
            }
        }
    });

    info!("Type !help to get started, :quit to exit");
    runtime.run(rx).await?;
    Ok(())
}
