use std::io::{self, BufRead, Write};

use chess_referee::config::{AppConfig, OutputFormat};
use chess_referee::engine::{
    ChessError, Color, Match, MoveReport, Player, Promotion, RatingPreview, Square,
};

/// One line of input from the players.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move(Square, Square, Option<Promotion>),
    Resign,
    Board,
    Quit,
}

fn parse_square(s: &str) -> Result<Square, ChessError> {
    Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
}

/// Accepts `e7 e5`, `e7e5`, `a2 a1 q`, `resign`, `board` and `quit`.
fn parse_command(line: &str) -> Result<Command, ChessError> {
    let compact = line.split_whitespace().collect::<String>().to_ascii_lowercase();
    match compact.as_str() {
        "resign" => return Ok(Command::Resign),
        "board" => return Ok(Command::Board),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }
    if !compact.is_ascii() || !(4..=5).contains(&compact.len()) {
        return Err(ChessError::InvalidSquare(line.trim().to_string()));
    }
    let src = parse_square(&compact[0..2])?;
    let dst = parse_square(&compact[2..4])?;
    let promotion = match compact[4..].chars().next() {
        Some(c) => Some(
            Promotion::from_char(c).ok_or_else(|| ChessError::InvalidPromotion(c.to_string()))?,
        ),
        None => None,
    };
    Ok(Command::Move(src, dst, promotion))
}

fn render(game: &Match, report: &MoveReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(report)
            .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
        OutputFormat::Text => format!("{}\n{}", game.position().board_string(), report.message),
    }
}

fn main() -> io::Result<()> {
    // Initialize tracing (structured logging) on stderr so stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_referee=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let black = Player::with_rating(config.black_player.clone(), config.default_rating);
    let white = Player::with_rating(config.white_player.clone(), config.default_rating);

    tracing::info!(
        "chess-referee v{} starting: {black} vs {white}",
        env!("CARGO_PKG_VERSION")
    );

    let mut game = Match::with_rules(black, white, config.rules);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if config.output == OutputFormat::Text {
        let preview = RatingPreview::between(game.player(Color::Black), game.player(Color::White));
        writeln!(out, "{preview}")?;
        writeln!(out, "{}\n{}", game.position().board_string(), game.status_message())?;
    }

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let report = match parse_command(&line) {
            Ok(Command::Move(src, dst, promotion)) => game.attempt_move(src, dst, promotion),
            Ok(Command::Resign) => game.resign(),
            Ok(Command::Board) => {
                writeln!(out, "{}\n{}", game.position().board_string(), game.status_message())?;
                continue;
            }
            Ok(Command::Quit) => break,
            Err(err) => {
                tracing::debug!(%err, "unreadable input");
                writeln!(out, "{err}")?;
                continue;
            }
        };
        writeln!(out, "{}", render(&game, &report, config.output))?;
        if game.is_over() {
            break;
        }
    }

    let (black, white) = game.into_players();
    if config.output == OutputFormat::Text {
        writeln!(out, "{black}\n{}\n{white}\n{}", black.stats(), white.stats())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!(
            parse_command("e7 e5").unwrap(),
            Command::Move(Square::new(1, 4), Square::new(3, 4), None)
        );
        assert_eq!(
            parse_command("a2a1Q").unwrap(),
            Command::Move(Square::new(6, 0), Square::new(7, 0), Some(Promotion::Queen))
        );
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_command(" resign ").unwrap(), Command::Resign);
        assert_eq!(parse_command("BOARD").unwrap(), Command::Board);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_command("z9 e4"), Err(ChessError::InvalidSquare(_))));
        assert!(matches!(parse_command("e7 e8 k"), Err(ChessError::InvalidPromotion(_))));
        assert!(parse_command("e7").is_err());
        assert!(parse_command("é7e5").is_err());
    }
}
