//! Authentication handshake.
//!
//! Runs on the consumer as soon as the reader thread reports an open socket:
//! request capabilities, authenticate, join. The server does not confirm
//! login on success; a rejected token arrives later as a `NOTICE`, checked
//! with [`is_auth_failure`].

use std::io::{self, Write};

use chatcore_proto::Command;
use tracing::trace;

use crate::credentials::Credentials;

/// Notice texts the server uses to reject a login.
const AUTH_FAILURE_NOTICES: &[&str] = &["Login authentication failed", "Improperly formatted auth"];

/// The lines sent after connecting, in order.
pub fn handshake_commands(credentials: &Credentials, capabilities: &[String]) -> Vec<Command> {
    let mut commands = Vec::with_capacity(4);
    if !capabilities.is_empty() {
        commands.push(Command::CapReq(capabilities.to_vec()));
    }
    commands.push(Command::Pass(credentials.token().to_owned()));
    commands.push(Command::Nick(credentials.nick().to_owned()));
    commands.push(Command::Join(credentials.channel().to_owned()));
    commands
}

/// Write one command and its terminator.
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> io::Result<()> {
    writer.write_all(command.to_line().as_bytes())?;
    writer.flush()?;
    trace!(line = %command.redacted(), "Sent");
    Ok(())
}

/// Write the full handshake.
pub fn perform<W: Write>(
    writer: &mut W,
    credentials: &Credentials,
    capabilities: &[String],
) -> io::Result<()> {
    for command in handshake_commands(credentials, capabilities) {
        write_command(writer, &command)?;
    }
    Ok(())
}

/// True when a notice reports a rejected login.
pub fn is_auth_failure(notice: &str) -> bool {
    AUTH_FAILURE_NOTICES.iter().any(|text| notice.contains(text))
}
