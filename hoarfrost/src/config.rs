//! Session configuration

use serde::{Deserialize, Serialize};

/// Connection settings for a [`Session`](crate::Session).
///
/// Loading or merging these from files is the caller's concern; the struct
/// only carries the values and their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Database server hostname
    pub hostname: String,
    /// Database server port
    pub port: u16,
    /// Username used to authenticate
    pub username: String,
    /// Password used to authenticate
    pub password: String,
    /// Database selected after connecting
    pub database: String,
    /// Table prefix exposed through the `{PRE}`/`{PREFIX}` tokens
    pub prefix: String,
    /// Ask the driver for a persistent connection
    pub persistent: bool,
    /// Raise errors instead of logging and returning sentinels
    pub verbose: bool,
    /// Render queries in the readable multi-line format
    pub format: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            hostname: "localhost".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: String::new(),
            database: String::new(),
            prefix: String::new(),
            persistent: true,
            verbose: false,
            format: false,
        }
    }
}

impl SessionConfig {
    /// Hostname in the `host:port` form drivers connect to; the port is
    /// omitted when it is the default 3306.
    pub fn connection_hostname(&self) -> String {
        if self.port != 3306 {
            format!("{}:{}", self.hostname, self.port)
        } else {
            self.hostname.clone()
        }
    }
}
