use std::{io, sync::Arc};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::oneshot,
    task::JoinHandle,
};

use crate::{
    api::AppState,
    chat::ChatHandler,
    cli::{build_search_service, load_config},
    error, info,
    management::{SessionRegistry, TransportFactory},
    server, success,
    transport::{CommandTransport, VoiceTransport},
    types::GuildId,
    warning,
};

/// Runs the bot until Ctrl-C or `quit` on the console.
pub async fn serve(guild: Option<String>, console: bool) {
    let config = load_config();

    let player = match CommandTransport::new(&config.player_command) {
        Ok(player) => player,
        Err(e) => error!("Invalid PLAYER_COMMAND: {}", e),
    };
    let transports: TransportFactory =
        Arc::new(move |_: &GuildId| Box::new(player.fresh()) as Box<dyn VoiceTransport>);

    let registry = Arc::new(SessionRegistry::new(config.max_queue_size, transports));
    let search = Arc::new(build_search_service(&config));

    if search.spotify_available() {
        info!("Spotify search enabled");
    } else {
        warning!("Spotify credentials not set, searching YouTube only");
    }
    if config.auth_enabled() {
        info!("Discord login enabled, read access: {:?}", config.read_access);
    } else {
        warning!("Discord credentials not set, the dashboard is open to everyone");
    }

    let dashboard_url = format!("http://{}", config.server_addr);
    let guild = guild
        .map(GuildId::new)
        .unwrap_or_else(|| config.default_guild.clone());
    let chat = ChatHandler::new(
        Arc::clone(&registry),
        Arc::clone(&search),
        config.command_prefix.clone(),
        dashboard_url.clone(),
    );

    let state = Arc::new(AppState::new(config, Arc::clone(&registry), search));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(server::start_api_server(state, async {
        let _ = shutdown_rx.await;
    }));

    success!("Dashboard: {}", dashboard_url);

    let stop = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = run_console(&chat, guild), if console => {}
        }
    };
    let exit = wait_for_exit(&mut server, stop).await;

    info!("Shutting down...");
    registry.shutdown().await;

    match exit {
        Exit::Requested => {
            let _ = shutdown_tx.send(());
            if let Err(e) = server.await {
                tracing::warn!("web interface task failed: {e}");
            }
        }
        Exit::ServerStopped => warning!("Web interface stopped"),
        Exit::ServerFailed(message) => error!("{}", message),
    }
    success!("Bye");
}

/// Why the main loop stopped.
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    /// Ctrl-C or `quit`. The web interface is still running.
    Requested,
    ServerStopped,
    ServerFailed(String),
}

/// Waits for the web interface to end or for `stop`, whichever is first.
async fn wait_for_exit(
    server: &mut JoinHandle<io::Result<()>>,
    stop: impl Future<Output = ()>,
) -> Exit {
    tokio::select! {
        res = server => match res {
            Ok(Ok(())) => Exit::ServerStopped,
            Ok(Err(e)) => Exit::ServerFailed(format!("Web interface failed: {e}")),
            Err(e) => Exit::ServerFailed(format!("Web interface task failed: {e}")),
        },
        _ = stop => Exit::Requested,
    }
}

/// Reads commands from stdin and runs them against `guild`.
///
/// `guild <id>` switches the target session. Returns on `quit`; at end of
/// input it keeps waiting so the server stays up.
async fn run_console(chat: &ChatHandler, mut guild: GuildId) {
    info!(
        "Console ready on guild '{}'. Type {}help for commands, quit to exit.",
        guild,
        chat.prefix()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("console input failed: {e}");
                break;
            }
        };

        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => return,
            _ => {}
        }

        if let Some(id) = line.strip_prefix("guild ") {
            guild = GuildId::new(id.trim());
            info!("Switched to guild '{}'", guild);
            continue;
        }

        match chat.handle(&guild, line).await {
            Some(reply) => println!("{reply}"),
            None => warning!("Unknown command. Type {}help", chat.prefix()),
        }
    }

    std::future::pending::<()>().await
}
