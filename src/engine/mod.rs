pub mod board;
pub mod game;
pub mod player;
pub mod rules;
pub mod types;

pub use board::Position;
pub use game::{Match, MoveRecord, MoveReport};
pub use player::{Player, RatingPreview};
pub use types::*;
