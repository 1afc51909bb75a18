//! # Main Entry Point
//!
//! Initializes the application:
//! - Domain: Configuration and Traits
//! - Infrastructure: Matrix
//! - Application: Session engine, Registry, Router
//! - Interface: Command and Reaction Handlers
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::UserId,
    ruma::events::reaction::SyncReactionEvent,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::SyncRoomMessageEvent,
        redaction::SyncRoomRedactionEvent,
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::registry::SessionRegistry;
use crate::application::router::CommandRouter;
use crate::domain::config::AppConfig;
use crate::infrastructure::matrix::MatrixService;
use crate::interface::reactions;

#[derive(Parser)]
#[command(name = "barista", about = "Run Lean Coffee sessions in Matrix rooms")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,
}

/// Resolves a member's display name, falling back to the localpart.
async fn display_name(room: &Room, user_id: &UserId) -> String {
    match room.get_member(user_id).await {
        Ok(Some(member)) => member.name().to_string(),
        _ => user_id.localpart().to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    // Ensure data directory exists
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn")
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting Barista...");

    // 3. Application State
    let registry = Arc::new(Mutex::new(SessionRegistry::new()));

    // 4. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    if let Some(name) = &config.services.matrix.display_name {
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("Failed to set display name: {}", e);
        }
    }

    // 5. Event Handlers
    let start_time = std::time::SystemTime::now();

    // Commands and topic proposals
    let loop_config = config.clone();
    let loop_registry = registry.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let config = loop_config.clone();
        let registry = loop_registry.clone();

        async move {
            if let Some(original_msg) = ev.as_original() {
                // Ignore events older than start_time
                let ts = ev.origin_server_ts();
                let event_time =
                    std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
                if event_time < start_time {
                    return;
                }

                if let matrix_sdk::ruma::events::room::message::MessageType::Text(text_content) =
                    &original_msg.content.msgtype
                {
                    let body = &text_content.body;
                    if original_msg.sender == room.own_user_id() {
                        return;
                    }
                    tracing::info!("Received message from {}: \n{}", original_msg.sender, body);

                    let sender = original_msg.sender.clone();
                    let event_id = original_msg.event_id.to_string();
                    let sender_name = display_name(&room, &sender).await;

                    let chat = MatrixService::new(room);
                    let router = CommandRouter::new(config, registry);

                    if let Err(e) = router
                        .route(&chat, body, sender.as_str(), &sender_name, &event_id)
                        .await
                    {
                        tracing::error!("Failed to route message: {}", e);
                    }
                }
            }
        }
    });

    // Votes and continue-votes arrive as reactions
    let reaction_registry = registry.clone();
    client.add_event_handler(move |ev: SyncReactionEvent, room: Room| {
        let registry = reaction_registry.clone();

        async move {
            let Some(original) = ev.as_original() else {
                return;
            };
            let event_time = std::time::UNIX_EPOCH
                + std::time::Duration::from_millis(original.origin_server_ts.get().into());
            if event_time < start_time {
                return;
            }
            if original.sender == room.own_user_id() {
                return;
            }

            let relates = &original.content.relates_to;
            let sender_name = display_name(&room, &original.sender).await;
            reactions::handle_reaction_added(
                &registry,
                room.room_id().as_str(),
                original.event_id.as_str(),
                relates.event_id.as_str(),
                &relates.key,
                original.sender.as_str(),
                &sender_name,
            )
            .await;
        }
    });

    // Removed reactions and deleted topic messages arrive as redactions
    let redaction_registry = registry.clone();
    client.add_event_handler(move |ev: SyncRoomRedactionEvent, room: Room| {
        let registry = redaction_registry.clone();

        async move {
            let Some(original) = ev.as_original() else {
                return;
            };
            // Room v11 carries the target in content, older versions on the event
            let redacts = original
                .content
                .redacts
                .clone()
                .or_else(|| original.redacts.clone());
            let Some(redacts) = redacts else {
                return;
            };
            reactions::handle_redaction(&registry, room.room_id().as_str(), redacts.as_str())
                .await;
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            let _ = room.join().await;
        }
    });

    // 6. Sync Loop
    tracing::info!("Barista ready; syncing...");
    client
        .sync(SyncSettings::default())
        .await
        .context("Matrix sync failed")?;

    Ok(())
}
