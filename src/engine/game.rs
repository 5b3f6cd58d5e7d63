//! Stateful match controller wrapping Position.
//!
//! `Match` validates proposed moves, commits them, and tracks everything the
//! end-of-game rules need: whose turn it is, the halfmove clock, the snapshot
//! history for repetition, and the outcome. It is the only type the
//! presentation layer mutates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::RulesConfig;
use crate::engine::board::{KING_FILE, Position};
use crate::engine::player::Player;
use crate::engine::rules;
use crate::engine::types::{
    ChessError, Color, MoveError, MoveKind, Outcome, PieceType, Promotion, Square,
};

// =========================================================================
// MoveRecord / MoveReport
// =========================================================================

/// A committed move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub src: Square,
    pub dst: Square,
    pub piece: PieceType,
    pub kind: MoveKind,
    pub promotion: Option<Promotion>,
}

impl MoveRecord {
    /// A pawn advancing two ranks in one go.
    pub fn is_double_step(&self) -> bool {
        self.piece == PieceType::Pawn && self.src.rank().abs_diff(self.dst.rank()) == 2
    }
}

/// What the presentation layer gets back from every mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub accepted: bool,
    pub message: String,
    pub board_snapshot: String,
    pub outcome: Outcome,
}

// =========================================================================
// Match
// =========================================================================

/// A two-player match from the opening position to its outcome.
#[derive(Clone, Debug)]
pub struct Match {
    // Core state
    position: Position,
    active: Color,
    halfmove_clock: u16,
    /// Snapshots of every position reached, the starting one included.
    history: Vec<String>,
    moves: Vec<MoveRecord>,

    // Status
    outcome: Outcome,
    message: String,

    // Participants
    black: Player,
    white: Player,

    rules: RulesConfig,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Match {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Standard opening position, Black to move.
    pub fn new(black: Player, white: Player) -> Self {
        Self::with_rules(black, white, RulesConfig::default())
    }

    /// Standard opening position with custom draw thresholds.
    pub fn with_rules(black: Player, white: Player, rules: RulesConfig) -> Self {
        let mut game = Self::from_position(Position::starting(), Color::Black, black, white);
        game.rules = rules;
        game
    }

    /// Start from an arbitrary placement with `active` to move.
    ///
    /// The placement is taken as is: no checkmate or stalemate test runs
    /// until the first move has been played.
    pub fn from_position(position: Position, active: Color, black: Player, white: Player) -> Self {
        let history = vec![position.snapshot()];
        let mut game = Self {
            position,
            active,
            halfmove_clock: 0,
            history,
            moves: Vec::new(),
            outcome: Outcome::InProgress,
            message: String::new(),
            black,
            white,
            rules: RulesConfig::default(),
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        game.message = game.turn_message();
        info!(match_id = %game.id, black = %game.black, white = %game.white, "match created");
        game
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Side to move.
    pub fn active_color(&self) -> Color {
        self.active
    }

    /// Halfmoves since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    /// Last message meant for the players.
    pub fn status_message(&self) -> &str {
        &self.message
    }

    /// One character per square, rank 0 first, `' '` when empty.
    pub fn board_snapshot(&self) -> String {
        self.position.snapshot()
    }

    /// Snapshots of every position reached so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Committed moves in order.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// The most recent committed move, if any.
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn rules(&self) -> RulesConfig {
        self.rules
    }

    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Hand the player records back to the roster: (black, white).
    pub fn into_players(self) -> (Player, Player) {
        (self.black, self.white)
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Try to play `src` → `dst`. `promotion` is required when a pawn
    /// reaches its last rank and ignored otherwise.
    ///
    /// A rejected move leaves the match untouched.
    pub fn attempt_move(
        &mut self,
        src: Square,
        dst: Square,
        promotion: Option<Promotion>,
    ) -> MoveReport {
        match self.play(src, dst, promotion) {
            Ok(kind) => {
                info!(match_id = %self.id, %src, %dst, ?kind, outcome = %self.outcome, "move accepted");
                self.report(true)
            }
            Err(err) => {
                debug!(match_id = %self.id, %src, %dst, reason = %err, "move rejected");
                self.message = err.to_string();
                self.report(false)
            }
        }
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> MoveReport {
        if self.outcome.is_over() {
            warn!(match_id = %self.id, outcome = %self.outcome, "resignation after the end");
            self.message = MoveError::MatchOver(self.outcome).to_string();
            return self.report(false);
        }
        let loser = self.active;
        self.conclude(!loser);
        self.message = format!(
            "{} resigned: {} wins",
            self.player(loser).name,
            self.player(!loser).name
        );
        info!(match_id = %self.id, %loser, "resignation");
        self.report(true)
    }

    /// Would `src` → `dst` be accepted right now? Nothing is changed.
    pub fn check_move(&self, src: Square, dst: Square) -> Result<MoveKind, MoveError> {
        if self.outcome.is_over() {
            return Err(MoveError::MatchOver(self.outcome));
        }
        self.validate(src, dst)
    }

    fn play(
        &mut self,
        src: Square,
        dst: Square,
        promotion: Option<Promotion>,
    ) -> Result<MoveKind, MoveError> {
        if self.outcome.is_over() {
            warn!(match_id = %self.id, outcome = %self.outcome, "move after the end");
            return Err(MoveError::MatchOver(self.outcome));
        }

        let kind = self.validate(src, dst)?;
        let piece = self.position.piece_at(src).ok_or(MoveError::NoPiece)?;

        let promotes = piece.kind == PieceType::Pawn && dst.rank() == self.active.promotion_rank();
        let promotion = if promotes {
            Some(promotion.ok_or(MoveError::PromotionRequired)?)
        } else {
            None
        };

        match kind {
            MoveKind::Normal | MoveKind::Capture => self.position.execute_move(src, dst),
            MoveKind::Castle { queenside } => self.position.execute_castle(self.active, queenside),
            MoveKind::EnPassant => self.position.execute_en_passant(src, dst),
        }
        if let Some(choice) = promotion {
            self.position.promote(dst, choice);
        }

        self.moves.push(MoveRecord {
            src,
            dst,
            piece: piece.kind,
            kind,
            promotion,
        });
        self.after_move(piece.kind == PieceType::Pawn || kind.is_capture());
        Ok(kind)
    }

    // -----------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------

    /// Full legality check for the side to move.
    ///
    /// The ordinary pipeline runs first; castling and en passant are only
    /// considered when it refuses the move on geometry or obstruction.
    fn validate(&self, src: Square, dst: Square) -> Result<MoveKind, MoveError> {
        let primary = match self.validate_standard(src, dst) {
            Ok(kind) => return Ok(kind),
            Err(err @ (MoveError::BadGeometry | MoveError::Blocked)) => err,
            Err(err) => return Err(err),
        };

        if let Some(queenside) = self.castle_shape(src, dst) {
            if self.position.can_castle(self.active, queenside) {
                return self.validate_castle(queenside);
            }
        }
        if self.en_passant_shape(src, dst) {
            let mut trial = self.position.clone();
            trial.execute_en_passant(src, dst);
            self.ensure_safe(&trial)?;
            return Ok(MoveKind::EnPassant);
        }
        Err(primary)
    }

    fn validate_standard(&self, src: Square, dst: Square) -> Result<MoveKind, MoveError> {
        let piece = self.position.piece_at(src).ok_or(MoveError::NoPiece)?;
        if piece.color != self.active {
            return Err(MoveError::NotYourPiece);
        }

        let kind = match self.position.piece_at(dst) {
            Some(target) if target.color == self.active => return Err(MoveError::OwnPiece),
            Some(_) => {
                if !rules::can_capture(piece.kind, piece.color, src, dst) {
                    return Err(MoveError::BadGeometry);
                }
                MoveKind::Capture
            }
            None => {
                if !rules::can_move(piece.kind, piece.color, piece.moved, src, dst) {
                    return Err(MoveError::BadGeometry);
                }
                MoveKind::Normal
            }
        };

        if !piece.kind.floats() && !self.position.path_clear(src, dst) {
            return Err(MoveError::Blocked);
        }

        let mut trial = self.position.clone();
        trial.execute_move(src, dst);
        self.ensure_safe(&trial)?;
        Ok(kind)
    }

    /// King from its home square to file 2 or 6 of the back rank.
    fn castle_shape(&self, src: Square, dst: Square) -> Option<bool> {
        let rank = self.active.back_rank();
        if src != Square::new(rank, KING_FILE) || dst.rank() != rank {
            return None;
        }
        match dst.file() {
            2 => Some(true),
            6 => Some(false),
            _ => None,
        }
    }

    /// The King may not castle out of, through, or into a threatened square.
    fn validate_castle(&self, queenside: bool) -> Result<MoveKind, MoveError> {
        let (king_sq, _) = Position::castle_home(self.active, queenside);
        self.ensure_safe(&self.position)?;

        let step = if queenside { -1 } else { 1 };
        if let Some(transit) = king_sq.offset(0, step) {
            let mut trial = self.position.clone();
            trial.execute_move(king_sq, transit);
            self.ensure_safe(&trial)?;
        }

        let mut trial = self.position.clone();
        trial.execute_castle(self.active, queenside);
        self.ensure_safe(&trial)?;
        Ok(MoveKind::Castle { queenside })
    }

    /// A pawn capturing diagonally onto an empty square behind an enemy pawn
    /// that has just advanced two ranks past it.
    fn en_passant_shape(&self, src: Square, dst: Square) -> bool {
        let Some(pawn) = self.position.piece_at(src) else {
            return false;
        };
        if pawn.kind != PieceType::Pawn
            || pawn.color != self.active
            || !self.position.is_empty(dst)
            || dst.rank() != self.active.en_passant_rank()
            || !rules::can_capture(pawn.kind, pawn.color, src, dst)
        {
            return false;
        }
        let Some(behind) = dst.offset(-self.active.forward(), 0) else {
            return false;
        };
        let victim_ok = self
            .position
            .piece_at(behind)
            .is_some_and(|p| p.kind == PieceType::Pawn && p.color != self.active);
        let jumped = self
            .last_move()
            .is_some_and(|last| last.is_double_step() && last.dst == behind);
        victim_ok && jumped
    }

    /// Reject when the mover's King is exposed on `trial`.
    fn ensure_safe(&self, trial: &Position) -> Result<(), MoveError> {
        if king_exposed(trial, self.active) {
            return Err(MoveError::SelfCheck);
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Check, checkmate, stalemate
    // -----------------------------------------------------------------

    /// Pieces threatening the King of `color` right now.
    pub fn king_threats(&self, color: Color) -> Result<Vec<Square>, ChessError> {
        self.position.king_threats(color)
    }

    /// Is the side to move in check?
    pub fn in_check(&self) -> bool {
        self.position
            .king_threats(self.active)
            .is_ok_and(|t| !t.is_empty())
    }

    /// Is the side to move checkmated?
    pub fn is_checkmate(&self) -> bool {
        match self.position.king_threats(self.active) {
            Ok(threats) if !threats.is_empty() => self.checkmated(&threats),
            _ => false,
        }
    }

    /// Does the side to move have no legal move while not in check?
    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_move()
    }

    fn checkmated(&self, threats: &[Square]) -> bool {
        let Ok(king) = self.position.king_square(self.active) else {
            return false;
        };
        // Only a King move answers a double check.
        if threats.len() == 1 && self.can_capture_or_block(threats[0], king) {
            return false;
        }
        !self.king_can_escape(king)
    }

    fn can_capture_or_block(&self, threat: Square, king: Square) -> bool {
        let Some(attacker) = self.position.piece_at(threat) else {
            return false;
        };
        let mut targets = vec![threat];
        if !attacker.kind.floats() {
            targets.extend(rules::between(threat, king));
        }
        if attacker.kind == PieceType::Pawn {
            // The landing square of an en passant capture of the checking pawn.
            if let Some(landing) = threat.offset(self.active.forward(), 0) {
                targets.push(landing);
            }
        }

        self.position
            .pieces(self.active)
            .filter(|(_, p)| p.kind != PieceType::King)
            .any(|(src, _)| targets.iter().any(|&dst| self.validate(src, dst).is_ok()))
    }

    fn king_can_escape(&self, king: Square) -> bool {
        (-1i8..=1)
            .flat_map(|dr| (-1i8..=1).map(move |df| (dr, df)))
            .filter(|&step| step != (0, 0))
            .filter_map(|(dr, df)| king.offset(dr, df))
            .any(|dst| self.validate(king, dst).is_ok())
    }

    fn has_legal_move(&self) -> bool {
        self.position
            .pieces(self.active)
            .any(|(src, _)| Square::all().any(|dst| self.validate(src, dst).is_ok()))
    }

    // -----------------------------------------------------------------
    // Housekeeping
    // -----------------------------------------------------------------

    fn after_move(&mut self, resets_clock: bool) {
        let mover = self.active;
        self.active = !mover;

        if resets_clock {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        let snapshot = self.position.snapshot();
        let seen = self.history.iter().filter(|s| **s == snapshot).count() + 1;
        self.history.push(snapshot);

        let threats = match self.position.king_threats(self.active) {
            Ok(threats) => threats,
            Err(err) => {
                error!(match_id = %self.id, %err, "position lost a king");
                Vec::new()
            }
        };

        if !threats.is_empty() && self.checkmated(&threats) {
            self.conclude(mover);
            self.message = format!("Checkmate: {} wins", self.player(mover).name);
            return;
        }

        if self.halfmove_clock >= self.rules.halfmove_limit {
            self.draw(Outcome::DrawFiftyMove);
        } else if seen >= self.rules.repetition_limit {
            self.draw(Outcome::DrawRepetition);
        } else if threats.is_empty() && !self.has_legal_move() {
            self.draw(Outcome::DrawStalemate);
        } else if threats.is_empty() {
            self.message = self.turn_message();
        } else {
            debug!(match_id = %self.id, color = %self.active, ?threats, "check");
            self.message = format!("{} is in check", self.player(self.active).name);
        }
    }

    /// Record a decisive result and update both players.
    fn conclude(&mut self, winner: Color) {
        self.outcome = Outcome::Win(winner);
        let (won, lost) = match winner {
            Color::White => (&mut self.white, &mut self.black),
            Color::Black => (&mut self.black, &mut self.white),
        };
        Player::record_result(won, lost);
        info!(
            match_id = %self.id,
            %winner,
            winner_rating = won.rating,
            loser_rating = lost.rating,
            "match won"
        );
    }

    /// Draws close the match without touching either record.
    fn draw(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        self.message = match outcome {
            Outcome::DrawFiftyMove => "Draw by the fifty-move rule".to_string(),
            Outcome::DrawRepetition => "Draw by threefold repetition".to_string(),
            _ => "Draw by stalemate".to_string(),
        };
        info!(match_id = %self.id, %outcome, "match drawn");
    }

    fn turn_message(&self) -> String {
        format!("{} to play", self.player(self.active).name)
    }

    fn report(&self, accepted: bool) -> MoveReport {
        MoveReport {
            accepted,
            message: self.message.clone(),
            board_snapshot: self.position.snapshot(),
            outcome: self.outcome,
        }
    }
}

/// A missing King counts as exposed so that no such position is committed.
fn king_exposed(pos: &Position, color: Color) -> bool {
    match pos.king_square(color) {
        Ok(king) => pos.is_attacked(king, !color),
        Err(_) => true,
    }
}

// =========================================================================
// Tests
// =========================================================================
