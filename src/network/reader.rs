//! Reader thread: connect, then blocking line reads.
//!
//! One thread per connection attempt. It opens the socket with a bounded
//! timeout, posts the outcome, then forwards every line it reads into the
//! [`HandoffQueue`]. It never writes to the socket; the consumer gets a
//! cloned write half in [`ReaderEvent::Established`].
//!
//! Every event is tagged with the connection epoch that spawned the thread
//! so the consumer can discard output from a superseded connection.
//!
//! Cancellation is cooperative: [`CancelToken`] is checked at each loop
//! boundary and the consumer shuts the socket down to unblock a pending
//! read. Errors observed after cancellation are not reported.

use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chatcore_proto::{LineReader, ProtocolError};
use tracing::{debug, trace, warn};

use crate::dispatch::HandoffQueue;
use crate::error::ConnectError;

/// Cooperative cancellation flag shared with a reader thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Something the reader thread observed.
#[derive(Debug)]
pub enum ReaderEvent {
    /// The socket is open; carries the write half.
    Established(TcpStream),
    /// The connect attempt failed.
    ConnectFailed(ConnectError),
    /// One inbound line, terminator stripped.
    Line(String),
    /// The stream ended or failed.
    ConnectionLost(String),
}

/// A queued reader event and the connection epoch it belongs to.
#[derive(Debug)]
pub struct WorkItem {
    pub epoch: u64,
    pub event: ReaderEvent,
}

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct ConnectTarget {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub max_line_len: usize,
}

/// Handle to a running reader thread.
#[derive(Debug)]
pub struct ReaderHandle {
    cancel: CancelToken,
    thread: JoinHandle<()>,
}

impl ReaderHandle {
    /// Ask the thread to stop. The caller shuts the socket down to unblock
    /// a pending read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Start a reader thread for `epoch`.
pub fn spawn(
    epoch: u64,
    target: ConnectTarget,
    queue: HandoffQueue<WorkItem>,
) -> io::Result<ReaderHandle> {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let thread = thread::Builder::new()
        .name(format!("chatcore-reader-{epoch}"))
        .spawn(move || run(epoch, &target, &queue, &token))?;
    Ok(ReaderHandle {
        cancel,
        thread,
    })
}

/// Resolve `target` and connect to the first address that answers.
pub fn connect(target: &ConnectTarget) -> Result<TcpStream, ConnectError> {
    let addrs: Vec<SocketAddr> = (target.host.as_str(), target.port)
        .to_socket_addrs()
        .map_err(|_| ConnectError::Resolve {
            host: target.host.clone(),
            port: target.port,
        })?
        .collect();

    let mut last_err = ConnectError::Resolve {
        host: target.host.clone(),
        port: target.port,
    };
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, target.connect_timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                last_err = ConnectError::Timeout {
                    addr,
                    timeout: target.connect_timeout,
                };
            }
            Err(e) => last_err = ConnectError::Io(e),
        }
    }
    Err(last_err)
}

fn run(epoch: u64, target: &ConnectTarget, queue: &HandoffQueue<WorkItem>, cancel: &CancelToken) {
    let post = |event| {
        queue.push(WorkItem { epoch, event });
    };

    let stream = match connect(target) {
        Ok(stream) => stream,
        Err(e) => {
            if !cancel.is_cancelled() {
                post(ReaderEvent::ConnectFailed(e));
            }
            return;
        }
    };
    if cancel.is_cancelled() {
        let _ = stream.shutdown(Shutdown::Both);
        return;
    }
    let writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(e) => {
            post(ReaderEvent::ConnectFailed(ConnectError::Io(e)));
            return;
        }
    };
    debug!(epoch, host = %target.host, port = target.port, "Socket open");
    post(ReaderEvent::Established(writer));

    let mut reader = LineReader::with_max_len(BufReader::new(stream), target.max_line_len);
    loop {
        if cancel.is_cancelled() {
            break;
        }
        match reader.read_line() {
            Ok(Some(line)) => {
                if cancel.is_cancelled() {
                    break;
                }
                trace!(epoch, line = %line, "Received");
                post(ReaderEvent::Line(line));
            }
            Ok(None) => {
                if !cancel.is_cancelled() {
                    post(ReaderEvent::ConnectionLost("stream closed by server".into()));
                }
                break;
            }
            Err(ProtocolError::LineTooLong { actual, limit }) => {
                debug!(epoch, actual, limit, "Dropped oversize line");
            }
            Err(e) => {
                if !cancel.is_cancelled() {
                    warn!(epoch, error = %e, "Read failed");
                    post(ReaderEvent::ConnectionLost(e.to_string()));
                }
                break;
            }
        }
    }
    debug!(epoch, "Reader thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::time::Instant;

    fn target_for(listener: &TcpListener) -> ConnectTarget {
        let addr = listener.local_addr().unwrap();
        ConnectTarget {
            host: addr.ip().to_string(),
            port: addr.port(),
            connect_timeout: Duration::from_secs(2),
            max_line_len: 64,
        }
    }

    /// Drain until `n` items arrived or two seconds passed.
    fn collect(queue: &HandoffQueue<WorkItem>, n: usize) -> Vec<WorkItem> {
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut items = Vec::new();
        while items.len() < n && Instant::now() < deadline {
            items.extend(queue.drain_batch(n - items.len()));
            thread::sleep(Duration::from_millis(5));
        }
        items
    }

    #[test]
    fn test_lines_then_connection_lost() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let queue = HandoffQueue::new();
        let handle = spawn(7, target_for(&listener), queue.clone()).unwrap();

        let (mut server, _) = listener.accept().unwrap();
        let oversize = "x".repeat(100);
        write!(server, "PING :a\r\n{oversize}\r\nsecond\n").unwrap();
        drop(server);

        let items = collect(&queue, 4);
        assert!(items.iter().all(|item| item.epoch == 7));
        assert!(matches!(items[0].event, ReaderEvent::Established(_)));
        assert!(matches!(&items[1].event, ReaderEvent::Line(l) if l == "PING :a"));
        assert!(matches!(&items[2].event, ReaderEvent::Line(l) if l == "second"));
        assert!(matches!(items[3].event, ReaderEvent::ConnectionLost(_)));

        handle.thread.join().unwrap();
    }

    #[test]
    fn test_connect_refused_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let target = target_for(&listener);
        drop(listener);

        let queue = HandoffQueue::new();
        spawn(1, target, queue.clone()).unwrap();
        let items = collect(&queue, 1);
        assert!(matches!(items[0].event, ReaderEvent::ConnectFailed(_)));
    }

    #[test]
    fn test_cancel_with_shutdown_is_silent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let queue = HandoffQueue::new();
        let handle = spawn(3, target_for(&listener), queue.clone()).unwrap();
        let (_server, _) = listener.accept().unwrap();

        let items = collect(&queue, 1);
        let ReaderEvent::Established(writer) = &items[0].event else {
            panic!("expected Established, got {:?}", items[0].event);
        };
        handle.cancel();
        writer.shutdown(Shutdown::Both).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unresolvable_host() {
        let target = ConnectTarget {
            host: "host.invalid".into(),
            port: 6667,
            connect_timeout: Duration::from_millis(100),
            max_line_len: 64,
        };
        assert!(matches!(connect(&target), Err(ConnectError::Resolve { .. })));
    }
}
