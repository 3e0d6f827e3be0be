use clap::Parser;
use std::time::Duration;

/// Command-line and environment configuration of the relay.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "livepad-server",
    version,
    about = "Relays a shared code buffer, pins and live cursors between connected clients"
)]
pub struct Config {
    /// Address the HTTP/WebSocket listener binds to.
    #[arg(long, env = "LIVEPAD_BIND", default_value = "127.0.0.1:3001")]
    pub bind: String,

    /// Origins allowed by CORS. `*` allows any origin.
    #[arg(
        long = "allowed-origin",
        env = "LIVEPAD_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum number of attached clients. Unlimited when unset.
    #[arg(long, env = "LIVEPAD_MAX_CLIENTS")]
    pub max_clients: Option<usize>,

    /// Outbound events buffered per connection before it counts as unreachable.
    #[arg(long, env = "LIVEPAD_CONNECTION_BUFFER", default_value_t = 32)]
    pub connection_buffer: usize,

    #[arg(long, env = "LIVEPAD_HEARTBEAT_INTERVAL_SECS", default_value_t = 5)]
    pub heartbeat_interval_secs: u64,

    /// Connections silent for longer than this are closed and detached.
    #[arg(long, env = "LIVEPAD_CLIENT_TIMEOUT_SECS", default_value_t = 10)]
    pub client_timeout_secs: u64,
}

impl Config {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".into(),
            allowed_origins: vec!["http://localhost:5173".into()],
            max_clients: None,
            connection_buffer: 32,
            heartbeat_interval_secs: 5,
            client_timeout_secs: 10,
        }
    }
}
