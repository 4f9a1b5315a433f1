pub mod toml_config;

#[cfg(feature = "cli")]
pub mod cli;

pub use toml_config::{ClientConfig, LogFormat};

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, Credentials, FriendsCommand};
