use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use courier_chat::{
    ChatClient, ChatUser, ListChatMessagesOptions, ListChatParticipantsOptions,
    ListChatThreadsOptions, SendChatMessageRequest, UpdateChatMessageRequest,
};
use courier_config::{load as load_config, CourierConfig};
use courier_runtime::{shutdown_signal, telemetry, ChatSession};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Drive the chat service from the command line")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Values that take precedence over files and `COURIER__*` variables.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Communication resource host
    #[arg(long, global = true)]
    host: Option<String>,
    /// Base64 resource access key, used to bootstrap a new identity
    #[arg(long, global = true)]
    access_key: Option<String>,
    /// Pre-minted bearer token to attach to
    #[arg(long, global = true)]
    token: Option<String>,
    /// RFC 3339 expiry of --token
    #[arg(long, global = true)]
    expires_at: Option<String>,
    /// Append logs to this file instead of stdout
    #[arg(long, global = true)]
    log_file: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut CourierConfig) {
        if let Some(host) = self.host {
            config.service.host = host;
        }
        if let Some(access_key) = self.access_key {
            config.service.access_key = Some(access_key);
        }
        if let Some(token) = self.token {
            config.credential.token = Some(token);
        }
        if let Some(expires_at) = self.expires_at {
            config.credential.expires_at = Some(expires_at);
        }
        if let Some(log_file) = self.log_file {
            config.telemetry.log_file = Some(log_file);
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Create a thread and exercise every message operation on it (default)
    Walkthrough {
        /// Participant to add; defaults to the bootstrapped identity
        #[arg(long)]
        participant: Option<String>,
        /// Keep the thread instead of deleting it at the end
        #[arg(long)]
        keep_thread: bool,
    },
    /// List the threads visible to the current identity
    Threads {
        #[arg(long)]
        max_page_size: Option<u32>,
    },
    /// Send a text message to a thread
    Send {
        #[arg(long)]
        thread: String,
        #[arg(long)]
        content: String,
    },
    /// Print the current bearer token and its expiry
    Token,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config().context("failed to load configuration")?;
    cli.overrides.apply(&mut config);

    telemetry::init_tracing(&config.telemetry).context("failed to initialise tracing")?;

    let session = ChatSession::connect(&config)
        .await
        .context("failed to connect chat session")?;
    info!(mode = ?session.mode, "chat session ready");
    let client = session.into_client();

    let command = cli.command.unwrap_or(Commands::Walkthrough {
        participant: None,
        keep_thread: false,
    });

    tokio::select! {
        result = run(&client, command) => result,
        _ = shutdown_signal() => {
            info!("interrupted");
            Ok(())
        }
    }
}

async fn run(client: &ChatClient, command: Commands) -> Result<()> {
    match command {
        Commands::Walkthrough {
            participant,
            keep_thread,
        } => walkthrough(client, participant, keep_thread).await,
        Commands::Threads { max_page_size } => list_threads(client, max_page_size).await,
        Commands::Send { thread, content } => {
            let sent = client
                .send_chat_message(&thread, SendChatMessageRequest::text(content))
                .await
                .context("failed to send message")?;
            report("sent", &sent)
        }
        Commands::Token => {
            let token = client.get_token().await.context("failed to obtain token")?;
            report(
                "token",
                &serde_json::json!({
                    "token": token,
                    "expiresAt": client.credential().expires_at(),
                    "userId": client.user_id(),
                }),
            )
        }
    }
}

async fn walkthrough(
    client: &ChatClient,
    participant: Option<String>,
    keep_thread: bool,
) -> Result<()> {
    let Some(participant) = participant.or_else(|| client.user_id().map(str::to_string)) else {
        bail!("walkthrough needs --participant when attached to a pre-minted token");
    };
    let user = ChatUser::new(participant, "courier");

    let created = client
        .create_chat_thread("courier walkthrough", &[user])
        .await
        .context("failed to create thread")?;
    report("create_chat_thread", &created)?;
    let thread_id = created.chat_thread.id.as_str();

    let threads = client
        .list_chat_threads(&ListChatThreadsOptions::default())
        .await
        .context("failed to list threads")?;
    report("list_chat_threads", &threads)?;

    let participants = client
        .list_chat_participants(thread_id, &ListChatParticipantsOptions::default())
        .await
        .context("failed to list participants")?;
    report("list_chat_participants", &participants)?;

    let sent = client
        .send_chat_message(thread_id, SendChatMessageRequest::text("courier walkthrough message"))
        .await
        .context("failed to send message")?;
    report("send_chat_message", &sent)?;

    let message = client
        .get_chat_message(thread_id, &sent.id)
        .await
        .context("failed to fetch message")?;
    report("get_chat_message", &message)?;

    let update = UpdateChatMessageRequest::content("courier walkthrough message (edited)")
        .with_metadata("edited-by", "courier");
    client
        .update_chat_message(thread_id, &sent.id, &update)
        .await
        .context("failed to update message")?;
    info!(message_id = %sent.id, "message updated");

    let message = client
        .get_chat_message(thread_id, &sent.id)
        .await
        .context("failed to fetch updated message")?;
    report("get_chat_message", &message)?;

    let messages = client
        .list_chat_messages(thread_id, &ListChatMessagesOptions::default())
        .await
        .context("failed to list messages")?;
    report("list_chat_messages", &messages)?;

    client
        .delete_chat_message(thread_id, &sent.id)
        .await
        .context("failed to delete message")?;
    info!(message_id = %sent.id, "message deleted");

    if !keep_thread {
        client
            .delete_chat_thread(thread_id)
            .await
            .context("failed to delete thread")?;
        info!(thread_id, "thread deleted");
    }

    Ok(())
}

async fn list_threads(client: &ChatClient, max_page_size: Option<u32>) -> Result<()> {
    let options = ListChatThreadsOptions {
        max_page_size,
        start_time: None,
    };
    let mut page = Some(
        client
            .list_chat_threads(&options)
            .await
            .context("failed to list threads")?,
    );

    while let Some(current) = page {
        for thread in &current.items {
            println!("{:<50} {}", thread.id, thread.topic);
        }
        page = client
            .next_page(&current)
            .await
            .context("failed to fetch next page")?;
    }
    Ok(())
}

fn report<T: Serialize>(step: &str, value: &T) -> Result<()> {
    let formatted = serde_json::to_string_pretty(value).context("failed to render result")?;
    println!("{step} = {formatted}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_loaded_values() {
        let cli = Cli::parse_from([
            "courier",
            "--host",
            "contoso.communication.azure.com",
            "--token",
            "abc",
            "--expires-at",
            "2099-01-01T00:00:00Z",
            "token",
        ]);
        assert_eq!(cli.command, Some(Commands::Token));

        let mut config = CourierConfig::default();
        config.service.access_key = Some("kept".into());
        cli.overrides.apply(&mut config);

        assert_eq!(config.service.host, "contoso.communication.azure.com");
        assert_eq!(config.service.access_key.as_deref(), Some("kept"));
        assert_eq!(config.credential.token.as_deref(), Some("abc"));
        assert_eq!(
            config.credential.expires_at.as_deref(),
            Some("2099-01-01T00:00:00Z")
        );
        assert!(config.telemetry.log_file.is_none());
    }

    #[test]
    fn global_options_are_accepted_after_the_subcommand() {
        let cli = Cli::parse_from([
            "courier",
            "send",
            "--thread",
            "th-1",
            "--content",
            "hi",
            "--log-file",
            "courier.log",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Send {
                thread: "th-1".into(),
                content: "hi".into(),
            })
        );
        assert_eq!(cli.overrides.log_file.as_deref(), Some("courier.log"));
    }

    #[test]
    fn no_subcommand_defaults_to_walkthrough() {
        let cli = Cli::parse_from(["courier"]);
        assert!(cli.command.is_none());
    }
}
