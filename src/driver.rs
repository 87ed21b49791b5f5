//! Tokio drive loop.
//!
//! Ticks a [`ChatClient`] on its configured cadence until a shutdown signal
//! arrives or the connection reaches a terminal state.

use std::future::Future;

use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::client::ChatClient;
use crate::network::ConnectionState;

/// Drive `client` until `shutdown` resolves or the connection ends in
/// `Disconnected` or `Failed`. Returns the final state.
///
/// On shutdown the client is disconnected without reconnecting.
pub async fn run<F>(client: &mut ChatClient, shutdown: F) -> ConnectionState
where
    F: Future<Output = ()>,
{
    let mut ticker = interval(client.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Shutdown requested");
                client.disconnect(false);
                break;
            }
            _ = ticker.tick() => {
                client.tick();
                if client.state().is_terminal() {
                    break;
                }
            }
        }
    }

    let state = client.state();
    info!(state = %state, "Drive loop stopped");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::credentials::Credentials;
    use std::net::TcpListener;
    use std::time::Duration;

    fn fast_config(port: u16) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = port;
        config.dispatch.tick_ms = 5;
        config.reconnect.initial_delay_ms = 10;
        config.reconnect.max_delay_ms = 20;
        config.reconnect.max_attempts = 2;
        config
    }

    #[tokio::test]
    async fn test_stops_when_reconnects_are_exhausted() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut client = ChatClient::new(&fast_config(port));
        client.connect(Credentials::new("t", "bot", "chan")).unwrap();

        let state = tokio::time::timeout(
            Duration::from_secs(5),
            run(&mut client, std::future::pending::<()>()),
        )
        .await
        .unwrap();
        assert_eq!(state, ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_shutdown_disconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut client = ChatClient::new(&fast_config(port));
        client.connect(Credentials::new("t", "bot", "chan")).unwrap();

        let state = run(&mut client, tokio::time::sleep(Duration::from_millis(50))).await;
        assert_eq!(state, ConnectionState::Disconnected);
        drop(listener);
    }

    #[tokio::test]
    async fn test_returns_at_once_when_never_connected() {
        let mut client = ChatClient::new(&Config::default());
        let state = run(&mut client, std::future::pending::<()>()).await;
        assert_eq!(state, ConnectionState::Disconnected);
    }
}
