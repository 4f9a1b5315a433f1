use crate::config::toml_config::{ClientConfig, LogFormat};
use crate::core::reorder::Move;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "swiftmatch")]
#[command(about = "Rank albums and tracks against a SwiftMatch server", version)]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SWIFTMATCH_API_URL", global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(flatten)]
    pub credentials: Credentials,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct Credentials {
    #[arg(long, env = "SWIFTMATCH_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "SWIFTMATCH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

impl Credentials {
    pub fn require(&self) -> Result<(&str, &str)> {
        let username = self.username.as_deref().ok_or_else(|| ClientError::MissingConfigError {
            field: "username (--username or SWIFTMATCH_USERNAME)".to_string(),
        })?;
        let password = self.password.as_deref().ok_or_else(|| ClientError::MissingConfigError {
            field: "password (--password or SWIFTMATCH_PASSWORD)".to_string(),
        })?;
        Ok((username, password))
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in and show where the app would go next
    Login,
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        country: String,
    },
    /// Show the logged-in user's profile
    Profile,
    /// Print the tracks of an album in their current order
    Tracks {
        #[arg(long)]
        album: Option<i64>,
    },
    /// Reorder an album's tracks and save the ranking
    Rank {
        #[arg(long)]
        album: Option<i64>,
        /// 1-based FROM:TO, applied in order as drag gestures
        #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
        moves: Vec<Move>,
        #[arg(long, help = "Print the payload without saving")]
        dry_run: bool,
    },
    /// Friend requests
    Friends {
        #[command(subcommand)]
        action: FriendsCommand,
    },
    /// Check whether a compatibility view against a user can be opened
    Match {
        #[arg(long)]
        user: i64,
        /// Album title; omit for album-level matching
        album: Option<String>,
    },
    /// Per-country ranking aggregates
    Analytics {
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum FriendsCommand {
    List,
    Search { term: String },
    Request { user_id: i64 },
    Accept { request_id: i64 },
    Reject { request_id: i64 },
}

/// Parses `FROM:TO` with 1-based positions into a zero-based move.
pub fn parse_move(raw: &str) -> std::result::Result<Move, String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", raw))?;
    let position = |value: &str| -> std::result::Result<usize, String> {
        match value.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("'{}' is not a position (positions start at 1)", value)),
        }
    };
    Ok(Move {
        from: position(from)?,
        to: position(to)?,
    })
}

impl CliConfig {
    /// File config (or defaults) with command-line values layered on top.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_seconds = timeout;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        match &self.command {
            Command::Tracks { album: Some(id) } | Command::Rank { album: Some(id), .. } => {
                config.ranking.collection_id = Some(*id);
            }
            _ => {}
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(username) = &self.credentials.username {
            validate_non_empty_string("username", username)?;
        }
        match &self.command {
            Command::Register { email, first_name, country } => {
                validate_non_empty_string("email", email)?;
                validate_non_empty_string("first_name", first_name)?;
                validate_non_empty_string("country", country)?;
            }
            Command::Match { album: Some(album), .. } => {
                validate_non_empty_string("album", album)?;
            }
            _ => {}
        }
        Ok(())
    }
}
