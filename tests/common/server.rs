//! Scripted chat server.
//!
//! Accepts real TCP connections on an ephemeral port so the client's reader
//! thread, handshake and write path run unmodified. Each accepted socket is
//! driven line by line from the test body.

use std::time::{Duration, Instant};

use chatcore::{ChatClient, Config, Credentials};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

/// How long any single wait in a test may take.
const WAIT: Duration = Duration::from_secs(5);

/// A listening fake server.
pub struct FakeServer {
    listener: TcpListener,
}

#[allow(dead_code)]
impl FakeServer {
    /// Bind to an ephemeral loopback port.
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// A configuration pointing at this server with test-friendly timings.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = self.port();
        config.server.connect_timeout_ms = 1000;
        config.reconnect.initial_delay_ms = 20;
        config.reconnect.max_delay_ms = 100;
        config.reconnect.max_attempts = 3;
        config.dispatch.tick_ms = 5;
        config
    }

    /// Credentials used by every test.
    pub fn credentials() -> Credentials {
        Credentials::new("oauth:secret", "bot", "Chan")
    }

    /// Wait for the next client connection.
    pub async fn accept(&self) -> anyhow::Result<ServerConn> {
        let (stream, _) = timeout(WAIT, self.listener.accept()).await??;
        Ok(ServerConn::new(stream))
    }
}

/// One accepted client socket.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    pending: Vec<u8>,
}

#[allow(dead_code)]
impl ServerConn {
    fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            pending: Vec::new(),
        }
    }

    /// Send one line, adding the terminator.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read the next line the client wrote, terminator stripped.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(WAIT).await
    }

    /// Read the next line, or fail after `dur`.
    ///
    /// A partial line survives a timeout and is completed by the next call.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let n = timeout(dur, self.reader.read_until(b'\n', &mut self.pending)).await??;
        if n == 0 && self.pending.is_empty() {
            anyhow::bail!("client closed the connection");
        }
        let line = String::from_utf8(std::mem::take(&mut self.pending))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    /// Read the four handshake lines.
    pub async fn handshake(&mut self) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::with_capacity(4);
        for _ in 0..4 {
            lines.push(self.recv().await?);
        }
        Ok(lines)
    }

    /// Tick `client` until it writes a line, and return that line.
    pub async fn recv_while_ticking(&mut self, client: &mut ChatClient) -> anyhow::Result<String> {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            client.tick();
            match self.recv_timeout(Duration::from_millis(10)).await {
                Ok(line) => return Ok(line),
                Err(e) if e.is::<tokio::time::error::Elapsed>() => continue,
                Err(e) => return Err(e),
            }
        }
        anyhow::bail!("client wrote nothing within {WAIT:?}")
    }

    /// Whether the client has closed its side.
    pub async fn is_closed(&mut self) -> bool {
        matches!(
            timeout(WAIT, self.reader.read_until(b'\n', &mut self.pending)).await,
            Ok(Ok(0)) | Ok(Err(_))
        )
    }

    /// Drop the socket from the server side.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
    }
}

/// Tick `client` every few milliseconds until `done` holds.
///
/// Returns false when the condition did not hold within the wait limit.
#[allow(dead_code)]
pub async fn tick_until<F>(client: &mut ChatClient, mut done: F) -> bool
where
    F: FnMut(&ChatClient) -> bool,
{
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        client.tick();
        if done(client) {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }
    false
}
