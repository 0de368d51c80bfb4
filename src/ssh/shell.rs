//! Interactive remote shell
//!
//! [`RemoteShell`] is the seam between the commit sequence and the transport;
//! [`SshShell`] is the `ssh2`-backed implementation used against real devices.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use ssh2::{Channel, Session};

use super::SshError;
use crate::config::Settings;

/// Read buffer size for draining shell output
const READ_CHUNK: usize = 64 * 1024;

/// Time to let the login banner and prompt arrive before the first command
const BANNER_SETTLE: Duration = Duration::from_secs(1);

/// A line-oriented interactive shell
pub trait RemoteShell {
    /// Type `command` followed by a newline, wait `settle`, and return
    /// whatever output arrived in the meantime.
    fn send(&mut self, command: &str, settle: Duration) -> Result<String, SshError>;
}

/// Where and how to log in
#[derive(Debug, Clone, PartialEq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
}

impl SshTarget {
    /// Build the target from settings with optional CLI overrides
    pub fn from_settings(
        settings: &Settings,
        address: Option<&str>,
        port: Option<u16>,
    ) -> Result<Self, SshError> {
        let host = address
            .map(str::to_string)
            .or_else(|| settings.host.clone())
            .ok_or(SshError::MissingHost)?;

        let (Some(username), Some(password)) = (&settings.username, &settings.password) else {
            return Err(SshError::MissingCredentials);
        };
        if username.is_empty() || password.is_empty() {
            return Err(SshError::MissingCredentials);
        }

        Ok(Self {
            host,
            port: port.unwrap_or(settings.ssh.port),
            username: username.clone(),
            password: password.clone(),
            connect_timeout: Duration::from_secs(settings.ssh.connect_timeout),
        })
    }
}

/// Interactive PTY shell over an SSH session
pub struct SshShell {
    session: Session,
    channel: Channel,
}

impl SshShell {
    /// Connect, authenticate with a password, and open an interactive shell
    pub fn connect(target: &SshTarget) -> Result<Self, SshError> {
        let addr = (target.host.as_str(), target.port)
            .to_socket_addrs()
            .map_err(|source| SshError::Connect {
                host: target.host.clone(),
                port: target.port,
                source,
            })?
            .next()
            .ok_or_else(|| SshError::Resolve {
                host: target.host.clone(),
                port: target.port,
            })?;

        tracing::info!(host = %target.host, port = target.port, "connecting");
        let tcp = TcpStream::connect_timeout(&addr, target.connect_timeout).map_err(|source| {
            SshError::Connect {
                host: target.host.clone(),
                port: target.port,
                source,
            }
        })?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;

        if session
            .userauth_password(&target.username, &target.password)
            .is_err()
            || !session.authenticated()
        {
            return Err(SshError::AuthenticationFailed {
                username: target.username.clone(),
                host: target.host.clone(),
            });
        }
        tracing::info!(host = %target.host, "connected");

        let mut channel = session.channel_session()?;
        channel.request_pty("vt100", None, None)?;
        channel.shell()?;

        let mut shell = Self { session, channel };
        thread::sleep(BANNER_SETTLE);
        let banner = shell.drain()?;
        tracing::debug!(bytes = banner.len(), "discarded login banner");
        Ok(shell)
    }

    /// Read everything currently buffered without blocking
    fn drain(&mut self) -> Result<String, SshError> {
        self.session.set_blocking(false);
        let result = read_available(&mut self.channel);
        self.session.set_blocking(true);
        let bytes = result?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl RemoteShell for SshShell {
    fn send(&mut self, command: &str, settle: Duration) -> Result<String, SshError> {
        self.channel.write_all(command.as_bytes())?;
        self.channel.write_all(b"\n")?;
        self.channel.flush()?;
        thread::sleep(settle);
        self.drain()
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        let _ = self.channel.send_eof();
        let _ = self.channel.close();
        let _ = self.session.disconnect(None, "done", None);
        tracing::info!("connection closed");
    }
}

/// Read until the source would block or reaches EOF
fn read_available(source: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields its chunks, then reports WouldBlock
    struct Chunked(Vec<&'static [u8]>);

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let chunk = self.0.remove(0);
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_read_available_stops_on_would_block() {
        let mut source = Chunked(vec![b"RP/0/RP0/CPU0:router(config)#", b" ok"]);
        let bytes = read_available(&mut source).unwrap();
        assert_eq!(bytes, b"RP/0/RP0/CPU0:router(config)# ok");
    }

    #[test]
    fn test_read_available_stops_on_eof() {
        let mut source: &[u8] = b"done";
        assert_eq!(read_available(&mut source).unwrap(), b"done");
    }

    fn settings() -> Settings {
        Settings {
            host: Some("10.0.0.1".to_string()),
            username: Some("cisco".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_target_from_settings() {
        let target = SshTarget::from_settings(&settings(), None, None).unwrap();
        assert_eq!(target.host, "10.0.0.1");
        assert_eq!(target.port, 22);
        assert_eq!(target.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_target_overrides() {
        let target = SshTarget::from_settings(&settings(), Some("10.9.9.9"), Some(2222)).unwrap();
        assert_eq!(target.host, "10.9.9.9");
        assert_eq!(target.port, 2222);
    }

    #[test]
    fn test_target_missing_host() {
        let mut s = settings();
        s.host = None;
        assert!(matches!(
            SshTarget::from_settings(&s, None, None),
            Err(SshError::MissingHost)
        ));
    }

    #[test]
    fn test_target_missing_password() {
        let mut s = settings();
        s.password = Some(String::new());
        assert!(matches!(
            SshTarget::from_settings(&s, None, None),
            Err(SshError::MissingCredentials)
        ));
    }
}
