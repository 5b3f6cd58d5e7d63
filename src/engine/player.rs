//! Player records and rating arithmetic.
//!
//! Records are plain data: the roster collaborator loads and stores them,
//! a `Match` borrows them by value for its lifetime and updates the counters
//! when the match ends decisively.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Rating given to a player nobody has seen before.
pub const DEFAULT_RATING: i32 = 1000;

/// Smallest rating change a decisive game produces.
const MIN_DELTA: i32 = 2;

/// A winner leading by more than this gains nothing.
const MAX_LEAD: i32 = 500;

/// A known player and their record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    pub games_played: u32,
    pub wins: u32,
    pub rating: i32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rating(name, DEFAULT_RATING)
    }

    pub fn with_rating(name: impl Into<String>, rating: i32) -> Self {
        Player {
            name: name.into(),
            games_played: 0,
            wins: 0,
            rating,
        }
    }

    /// Games played that were not won.
    pub fn losses(&self) -> u32 {
        self.games_played.saturating_sub(self.wins)
    }

    /// This player's rating after beating `loser`.
    ///
    /// Beating a stronger player earns half the gap, a weaker one a quarter,
    /// never less than 2 unless the lead already exceeds 500.
    pub fn rating_after_win(&self, loser: &Player) -> i32 {
        let diff = self.rating - loser.rating;
        if diff > MAX_LEAD {
            return self.rating;
        }
        let divisor = if self.rating < loser.rating { 2 } else { 4 };
        self.rating + MIN_DELTA.max(diff.abs() / divisor)
    }

    /// This player's rating after losing to `winner`.
    pub fn rating_after_loss(&self, winner: &Player) -> i32 {
        let diff = (self.rating - winner.rating).abs();
        let divisor = if self.rating > winner.rating { 2 } else { 4 };
        self.rating - MIN_DELTA.max(diff / divisor)
    }

    /// Apply a decisive result to both records. Ratings are computed from the
    /// values held before the game.
    ///
    /// Older rosters computed the loser's change from the winner's already
    /// updated rating, so an upset there moved the loser less: 1000 beating
    /// 1200 left the loser on 1150, where this gives 1100.
    pub fn record_result(winner: &mut Player, loser: &mut Player) {
        let won = winner.rating_after_win(loser);
        let lost = loser.rating_after_loss(winner);
        winner.games_played += 1;
        winner.wins += 1;
        winner.rating = won;
        loser.games_played += 1;
        loser.rating = lost;
    }

    /// Multi-line statistics summary.
    pub fn stats(&self) -> String {
        format!(
            "Games played: {}\nWins: {}\nLosses: {}\nRating: {}",
            self.games_played,
            self.wins,
            self.losses(),
            self.rating
        )
    }
}

/// Players sort by rating, lowest first.
impl Ord for Player {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rating
            .cmp(&other.rating)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Player {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.rating)
    }
}

// ---------------------------------------------------------------------------
// RatingPreview
// ---------------------------------------------------------------------------

/// What each side's rating would become, shown before a pairing is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPreview {
    pub black_if_loss: i32,
    pub black_if_win: i32,
    pub white_if_loss: i32,
    pub white_if_win: i32,
}

impl RatingPreview {
    pub fn between(black: &Player, white: &Player) -> Self {
        RatingPreview {
            black_if_loss: black.rating_after_loss(white),
            black_if_win: black.rating_after_win(white),
            white_if_loss: white.rating_after_loss(black),
            white_if_win: white.rating_after_win(black),
        }
    }
}

impl fmt::Display for RatingPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "B: ({}, {})\nW: ({}, {})",
            self.black_if_loss, self.black_if_win, self.white_if_loss, self.white_if_win
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_defaults() {
        let p = Player::new("Ada");
        assert_eq!(p.rating, DEFAULT_RATING);
        assert_eq!(p.games_played, 0);
        assert_eq!(p.wins, 0);
        assert_eq!(p.losses(), 0);
        assert_eq!(p.to_string(), "Ada (1000)");
    }

    #[test]
    fn equal_ratings_move_by_minimum() {
        let a = Player::new("a");
        let b = Player::new("b");
        assert_eq!(a.rating_after_win(&b), 1002);
        assert_eq!(a.rating_after_loss(&b), 998);
    }

    #[test]
    fn upset_win_earns_half_the_gap() {
        let underdog = Player::with_rating("u", 1000);
        let favourite = Player::with_rating("f", 1200);
        assert_eq!(underdog.rating_after_win(&favourite), 1100);
        assert_eq!(favourite.rating_after_loss(&underdog), 1100);
    }

    #[test]
    fn expected_win_earns_a_quarter() {
        let favourite = Player::with_rating("f", 1200);
        let underdog = Player::with_rating("u", 1000);
        assert_eq!(favourite.rating_after_win(&underdog), 1250);
        assert_eq!(underdog.rating_after_loss(&favourite), 950);
    }

    #[test]
    fn large_lead_gains_nothing() {
        let strong = Player::with_rating("s", 1600);
        let weak = Player::with_rating("w", 1000);
        assert_eq!(strong.rating_after_win(&weak), 1600);
        // The loser still drops by a quarter of the gap.
        assert_eq!(weak.rating_after_loss(&strong), 850);

        let edge = Player::with_rating("e", 1500);
        assert_eq!(edge.rating_after_win(&weak), 1625);
    }

    #[test]
    fn small_gap_uses_minimum() {
        let a = Player::with_rating("a", 1005);
        let b = Player::with_rating("b", 1000);
        assert_eq!(a.rating_after_win(&b), 1007);
        assert_eq!(b.rating_after_win(&a), 1002);
    }

    #[test]
    fn record_result_uses_pre_game_ratings() {
        let mut winner = Player::with_rating("w", 1000);
        let mut loser = Player::with_rating("l", 1200);
        Player::record_result(&mut winner, &mut loser);
        assert_eq!(winner.rating, 1100);
        assert_eq!(loser.rating, 1100);
        assert_eq!(winner.games_played, 1);
        assert_eq!(winner.wins, 1);
        assert_eq!(loser.games_played, 1);
        assert_eq!(loser.wins, 0);
        assert_eq!(loser.losses(), 1);
    }

    #[test]
    fn players_sort_by_rating() {
        let mut roster = vec![
            Player::with_rating("c", 1200),
            Player::with_rating("a", 900),
            Player::with_rating("b", 1000),
        ];
        roster.sort();
        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn preview_between_players() {
        let black = Player::with_rating("b", 1000);
        let white = Player::with_rating("w", 1200);
        let preview = RatingPreview::between(&black, &white);
        assert_eq!(preview.black_if_win, 1100);
        assert_eq!(preview.black_if_loss, 950);
        assert_eq!(preview.white_if_win, 1250);
        assert_eq!(preview.white_if_loss, 1100);
        assert_eq!(preview.to_string(), "B: (950, 1100)\nW: (1100, 1250)");
    }

    #[test]
    fn serializes_camel_case() {
        let p = Player::with_rating("Ada", 1234);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["gamesPlayed"], 0);
        assert_eq!(json["rating"], 1234);
        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn stats_summary() {
        let mut p = Player::new("x");
        p.games_played = 5;
        p.wins = 3;
        assert_eq!(p.stats(), "Games played: 5\nWins: 3\nLosses: 2\nRating: 1000");
    }
}
