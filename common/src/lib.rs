mod dialog;
pub use dialog::*;

mod config;
pub use config::*;

pub mod test_case;

/// Result of loading host-side files such as the player configuration.
pub type ConfigResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;
