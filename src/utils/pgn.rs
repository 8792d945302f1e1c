//! PGN read/write for game sessions.
//!
//! Movetext uses the notation recorded when each move was played
//! (`Action::notation`). Reading accepts that notation or coordinate
//! notation (`e2e4`) for every move.

use std::collections::BTreeMap;

use chrono::Local;

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::Side;
use crate::game_state::game_session::GameSession;
use crate::moves::actions::Action;
use crate::utils::fen_parser::parse_fen;
use crate::utils::long_algebraic::long_algebraic_to_action;

#[derive(Debug, Clone)]
pub struct PgnGame {
    pub headers: BTreeMap<String, String>,
    pub session: GameSession,
    pub result: String,
}

/// PGN with the standard seven-tag roster, dated today.
pub fn write_pgn(session: &GameSession, white: &str, black: &str) -> String {
    let result = session
        .outcome()
        .map(|outcome| outcome.result_token())
        .unwrap_or("*");

    let mut headers = BTreeMap::<String, String>::new();
    headers.insert("Event".to_owned(), "Glider Chess Game".to_owned());
    headers.insert("Site".to_owned(), "Local".to_owned());
    headers.insert("Date".to_owned(), Local::now().format("%Y.%m.%d").to_string());
    headers.insert("Round".to_owned(), "-".to_owned());
    headers.insert("White".to_owned(), white.to_owned());
    headers.insert("Black".to_owned(), black.to_owned());
    headers.insert("Result".to_owned(), result.to_owned());

    if session.is_chess960() {
        headers.insert("Variant".to_owned(), "Chess960".to_owned());
    }
    if session.initial_fen() != STARTING_POSITION_FEN {
        headers.insert("SetUp".to_owned(), "1".to_owned());
        headers.insert("FEN".to_owned(), session.initial_fen().to_owned());
    }

    write_pgn_with_headers(session, &headers)
}

pub fn write_pgn_with_headers(session: &GameSession, headers: &BTreeMap<String, String>) -> String {
    let mut out = String::new();

    for (key, value) in headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut movetext_parts = Vec::<String>::with_capacity(session.moves().len() + 1);
    let mut fullmove = initial_fullmove(session);
    for (ply, played) in session.moves().iter().enumerate() {
        match played.side {
            Side::White => {
                movetext_parts.push(format!("{}. {}", fullmove, played.notation));
            }
            Side::Black => {
                if ply == 0 {
                    movetext_parts.push(format!("{}... {}", fullmove, played.notation));
                } else {
                    movetext_parts.push(played.notation.clone());
                }
                fullmove += 1;
            }
        }
    }

    let result = headers
        .get("Result")
        .map(|x| normalize_result(x))
        .unwrap_or("*");
    movetext_parts.push(result.to_owned());
    out.push_str(&movetext_parts.join(" "));
    out.push('\n');

    out
}

fn initial_fullmove(session: &GameSession) -> u16 {
    session
        .initial_fen()
        .split_whitespace()
        .nth(5)
        .and_then(|field| field.parse::<u16>().ok())
        .unwrap_or(1)
}

pub fn read_pgn(pgn: &str) -> ChessResult<PgnGame> {
    let mut headers = BTreeMap::<String, String>::new();
    let mut movetext_lines = Vec::<String>::new();

    for line in pgn.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('[') {
            let (k, v) = parse_header_line(trimmed)?;
            headers.insert(k, v);
        } else {
            movetext_lines.push(trimmed.to_owned());
        }
    }

    let mut session = if headers.get("SetUp").map(|x| x.as_str()) == Some("1") {
        let fen = headers.get("FEN").ok_or_else(|| {
            ChessErrors::InvalidFen("PGN SetUp=1 is present but FEN header is missing".to_owned())
        })?;
        parse_fen(fen)?
    } else {
        GameSession::new()
    };
    if headers.get("Variant").map(|x| x.as_str()) == Some("Chess960") {
        session.set_chess960(true);
    }

    let mut result = "*".to_owned();
    let movetext = strip_pgn_comments_and_variations(&movetext_lines.join(" "));
    for token in movetext.split_whitespace() {
        if is_move_number_token(token) {
            continue;
        }

        let cleaned = trim_annotation_suffix(token);
        if is_result_token(cleaned) {
            result = normalize_result(cleaned).to_owned();
            break;
        }

        let action = resolve_move_token(&session, cleaned)?;
        session.play_action(action)?;
    }

    if let Some(header_result) = headers.get("Result") {
        result = normalize_result(header_result).to_owned();
    }

    Ok(PgnGame {
        headers,
        session,
        result,
    })
}

/// Finds the legal action whose notation matches `token`, falling back to
/// coordinate notation. The first match in generation order wins.
fn resolve_move_token(session: &GameSession, token: &str) -> ChessResult<Action> {
    let position = session.position();
    let side = session.side_to_move();
    let by_notation = position.all_actions(side).into_iter().find(|action| {
        let after = action.apply(position);
        trim_annotation_suffix(&action.notation(&after)) == token
    });
    match by_notation {
        Some(action) => Ok(action),
        None => long_algebraic_to_action(token, position, side)
            .map_err(|_| ChessErrors::InvalidAlgebraic(format!("unplayable PGN move '{token}'"))),
    }
}

fn parse_header_line(line: &str) -> ChessResult<(String, String)> {
    let invalid = || ChessErrors::InvalidAlgebraic(format!("invalid PGN header line: {line}"));
    if !line.starts_with('[') || !line.ends_with(']') {
        return Err(invalid());
    }
    let inner = &line[1..line.len() - 1];
    let mut parts = inner.splitn(2, ' ');
    let key = parts.next().ok_or_else(invalid)?.trim();
    let value_raw = parts.next().ok_or_else(invalid)?.trim();

    if !value_raw.starts_with('"') || !value_raw.ends_with('"') || value_raw.len() < 2 {
        return Err(invalid());
    }
    let value = value_raw[1..value_raw.len() - 1].replace("\\\"", "\"");
    Ok((key.to_owned(), value))
}

fn strip_pgn_comments_and_variations(text: &str) -> String {
    let mut out = String::new();
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => brace_depth = brace_depth.saturating_add(1),
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' => paren_depth = paren_depth.saturating_add(1),
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(ch),
            _ => {}
        }
    }

    out
}

fn is_move_number_token(token: &str) -> bool {
    if token.contains("...") {
        let head = token.split("...").next().unwrap_or_default();
        return !head.is_empty() && head.chars().all(|c| c.is_ascii_digit());
    }
    if token.ends_with('.') {
        return token
            .trim_end_matches('.')
            .chars()
            .all(|c| c.is_ascii_digit());
    }
    false
}

fn trim_annotation_suffix(token: &str) -> &str {
    token.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

fn normalize_result(result: &str) -> &str {
    if is_result_token(result) {
        result
    } else {
        "*"
    }
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::algebraic::algebraic_to_coordinate;

    fn play(session: &mut GameSession, moves: &[&str]) {
        for lan in moves {
            let from = algebraic_to_coordinate(&lan[0..2]).expect("square");
            let to = algebraic_to_coordinate(&lan[2..4]).expect("square");
            session.make_move(from, to).expect("legal move");
        }
    }

    #[test]
    fn written_pgn_carries_headers_and_movetext() {
        let mut session = GameSession::new();
        play(&mut session, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let pgn = write_pgn(&session, "Alice", "Bob");

        assert!(pgn.contains("[White \"Alice\"]"));
        assert!(pgn.contains("[Result \"0-1\"]"));
        assert!(!pgn.contains("[SetUp"));
        let today = Local::now().format("%Y.%m.%d").to_string();
        assert!(pgn.contains(&format!("[Date \"{today}\"]")));
        assert!(pgn.trim_end().ends_with("1. f3 e5 2. g4 Qh4# 0-1"));
    }

    #[test]
    fn pgn_round_trip_replays_the_game() {
        let mut session = GameSession::new();
        play(&mut session, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1"]);
        assert_eq!(session.moves().last().expect("move").notation, "O-O");

        let parsed = read_pgn(&write_pgn(&session, "W", "B")).expect("PGN should parse");
        assert_eq!(parsed.session.fen(), session.fen());
        assert_eq!(parsed.session.moves().len(), 7);
        assert_eq!(parsed.result, "*");
    }

    #[test]
    fn custom_setup_starting_with_black() {
        let mut session = parse_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").expect("valid");
        play(&mut session, &["e8d8", "e2e4"]);
        let pgn = write_pgn(&session, "W", "B");
        assert!(pgn.contains("[SetUp \"1\"]"));
        assert!(pgn.contains("12... Kd8 13. e4"));

        let parsed = read_pgn(&pgn).expect("PGN should parse");
        assert_eq!(parsed.session.fen(), session.fen());
    }

    #[test]
    fn coordinate_movetext_and_comments_are_accepted() {
        let pgn = "[Event \"x\"]\n\n1. e2e4 {best by test} e7e5 (1... c5) 2. Nf3 1-0\n";
        let parsed = read_pgn(pgn).expect("PGN should parse");
        assert_eq!(parsed.session.moves().len(), 3);
        assert_eq!(parsed.result, "1-0");
    }

    #[test]
    fn unplayable_move_is_an_error() {
        assert!(read_pgn("1. e5 *").is_err());
    }
}
