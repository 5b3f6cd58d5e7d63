use std::str::FromStr;

use crate::engine::player::DEFAULT_RATING;
use crate::engine::types::ChessError;

/// Draw thresholds applied by a `Match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesConfig {
    /// Halfmoves without a pawn move or capture before the game is drawn.
    pub halfmove_limit: u16,
    /// Occurrences of one position that draw the game.
    pub repetition_limit: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            halfmove_limit: 50,
            repetition_limit: 3,
        }
    }
}

/// How the binary prints move reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ChessError::InvalidConfig(format!("unknown output format: {other}"))),
        }
    }
}

/// Application configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the player holding the black pieces.
    pub black_player: String,
    /// Name of the player holding the white pieces.
    pub white_player: String,
    /// Rating handed to players created on the spot.
    pub default_rating: i32,
    pub rules: RulesConfig,
    pub output: OutputFormat,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        AppConfig {
            black_player: lookup("CHESS_BLACK_PLAYER").unwrap_or(defaults.black_player),
            white_player: lookup("CHESS_WHITE_PLAYER").unwrap_or(defaults.white_player),
            default_rating: lookup("CHESS_DEFAULT_RATING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_rating),
            rules: RulesConfig {
                halfmove_limit: lookup("CHESS_FIFTY_MOVE_LIMIT")
                    .and_then(|v| v.parse().ok())
                    .filter(|&n| n > 0)
                    .unwrap_or(defaults.rules.halfmove_limit),
                repetition_limit: lookup("CHESS_REPETITION_LIMIT")
                    .and_then(|v| v.parse().ok())
                    .filter(|&n| n > 1)
                    .unwrap_or(defaults.rules.repetition_limit),
            },
            output: lookup("CHESS_OUTPUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.output),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            black_player: "Black".to_string(),
            white_player: "White".to_string(),
            default_rating: DEFAULT_RATING,
            rules: RulesConfig::default(),
            output: OutputFormat::Text,
        }
    }
}
