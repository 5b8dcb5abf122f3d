pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;

/// Ship lengths, indexed by ship id.
pub const FLEET: [usize; NUM_SHIPS] = [2, 3, 3, 4, 5];

/// Number of player seats in a session.
pub const SEATS: usize = 2;

pub const DEFAULT_PORT: u16 = 9002;

/// Largest encoded frame accepted from a connection (64 KiB).
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Length of ship `ship_id`, or `None` if the id is outside the fleet.
pub fn ship_length(ship_id: usize) -> Option<usize> {
    FLEET.get(ship_id).copied()
}

#[cfg(feature = "std")]
pub use runtime::ServerConfig;

#[cfg(feature = "std")]
mod runtime {
    use std::string::{String, ToString};
    use std::time::Duration;

    use super::{DEFAULT_PORT, MAX_FRAME_SIZE};

    /// Runtime settings for the session server.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ServerConfig {
        /// Address the TCP listener binds to.
        pub bind: String,
        /// Bound on every hand-off wait; `None` waits forever.
        pub handoff_timeout: Option<Duration>,
        /// Largest frame accepted from a client.
        pub max_frame_size: u32,
        /// Per-read/write timeout on client connections; `None` disables it.
        pub io_timeout: Option<Duration>,
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind: std::format!("0.0.0.0:{}", DEFAULT_PORT),
                handoff_timeout: None,
                max_frame_size: MAX_FRAME_SIZE,
                io_timeout: None,
            }
        }
    }

    impl ServerConfig {
        pub fn with_bind(bind: &str) -> Self {
            Self {
                bind: bind.to_string(),
                ..Self::default()
            }
        }
    }
}
