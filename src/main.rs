//! chatcore - chat connection core, standalone runner.
//!
//! Connects with credentials from the environment, registers a few built-in
//! commands and runs until Ctrl-C or a permanent connection failure.

use chatcore::config::validate;
use chatcore::{
    ChatClient, CommandSpec, Config, ConnectionState, CredentialProvider, EnvCredentials,
    HandlerError,
};
use rand::Rng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Component tag for the built-in commands.
const OWNER: &str = "builtin";

fn register_builtins(client: &mut ChatClient) -> anyhow::Result<()> {
    client.register_command(
        CommandSpec::new("ping", |ctx| {
            ctx.reply_threaded("pong");
            Ok(())
        })
        .description("Check that the bot is alive")
        .usage("!ping")
        .owner(OWNER),
    )?;

    client.register_command(
        CommandSpec::new("echo", |ctx| {
            let text = ctx.args.join(" ");
            ctx.reply(text);
            Ok(())
        })
        .description("Repeat the arguments")
        .usage("!echo <text...>")
        .requires_args(true)
        .owner(OWNER)
        .allowed_roles(["broadcaster", "moderator"]),
    )?;

    client.register_command(
        CommandSpec::new("roll", |ctx| {
            let sides = match ctx.arg(0) {
                Some(raw) => raw
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 1)
                    .ok_or_else(|| HandlerError::InvalidArgument(raw.to_owned()))?,
                None => 6,
            };
            let result = rand::thread_rng().gen_range(1..=sides);
            let sender = ctx.sender.to_owned();
            ctx.reply(format!("{sender} rolled {result} (d{sides})"));
            Ok(())
        })
        .description("Roll a die")
        .usage("!roll [sides]")
        .owner(OWNER),
    )?;

    // Registered last so the listing includes every built-in.
    let listing = client
        .commands()
        .iter()
        .map(|cmd| cmd.name)
        .chain(std::iter::once("help"))
        .map(|name| format!("!{name}"))
        .collect::<Vec<_>>()
        .join(" ");
    client.register_command(
        CommandSpec::new("help", move |ctx| {
            ctx.reply(format!("Commands: {listing}"));
            Ok(())
        })
        .description("List commands")
        .usage("!help")
        .owner(OWNER),
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    let credentials = EnvCredentials.credentials().map_err(|e| {
        error!(
            error = %e,
            "Set {}, {} and {}",
            EnvCredentials::TOKEN_VAR,
            EnvCredentials::NICK_VAR,
            EnvCredentials::CHANNEL_VAR
        );
        e
    })?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        channel = %credentials.channel(),
        "Starting chatcore"
    );

    let mut client = ChatClient::new(&config);
    register_builtins(&mut client)?;
    client.connect(credentials)?;

    let final_state = chatcore::run(&mut client, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await;

    if final_state == ConnectionState::Failed {
        anyhow::bail!("connection failed permanently");
    }
    info!("chatcore stopped");
    Ok(())
}
