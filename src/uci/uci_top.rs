//! UCI protocol front end and command loop.
//!
//! Parses UCI commands, keeps the current game session, routes `go`
//! requests to the engine selected by `Skill Level` and prints the reply.
//! Errors never end the loop; they are reported as `info string` lines.

use std::io::{self, BufRead, Write};

use crate::chess_errors::{ChessErrors, ChessResult};
use crate::engines::engine_alpha_beta::AlphaBetaEngine;
use crate::engines::engine_random::RandomEngine;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::game_state::game_session::GameSession;
use crate::search::alpha_beta::MAX_SEARCH_DEPTH;
use crate::utils::fen_parser::parse_fen;
use crate::utils::long_algebraic::{action_to_long_algebraic, long_algebraic_to_action};
use crate::utils::render_game_state::render_session;

const UCI_ENGINE_NAME: &str = "Glider Chess";
const UCI_ENGINE_AUTHOR: &str = "the Glider Chess developers";
const DEFAULT_SKILL_LEVEL: u8 = 5;

pub fn run_stdio_loop() -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut uci = UciState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = uci.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

struct UciState {
    session: GameSession,
    engine: Box<dyn Engine>,
    skill_level: u8,
    fixed_depth_override: Option<u8>,
    chess960: bool,
    /// Engine-specific options, replayed when the skill level swaps engines.
    engine_options: Vec<(String, String)>,
}

impl UciState {
    fn new() -> Self {
        Self {
            session: GameSession::new(),
            engine: build_engine(DEFAULT_SKILL_LEVEL),
            skill_level: DEFAULT_SKILL_LEVEL,
            fixed_depth_override: None,
            chess960: false,
            engine_options: Vec::new(),
        }
    }

    fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "uci" => {
                writeln!(out, "id name {}", UCI_ENGINE_NAME)?;
                writeln!(out, "id author {}", UCI_ENGINE_AUTHOR)?;
                writeln!(
                    out,
                    "option name Skill Level type spin default {} min 1 max 10",
                    DEFAULT_SKILL_LEVEL
                )?;
                writeln!(
                    out,
                    "option name FixedDepth type spin default 0 min 0 max {}",
                    MAX_SEARCH_DEPTH
                )?;
                writeln!(
                    out,
                    "option name CachePolicy type combo default depth var disabled var position var depth"
                )?;
                writeln!(out, "option name Seed type string default <empty>")?;
                writeln!(out, "option name UCI_Chess960 type check default false")?;
                writeln!(out, "uciok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    writeln!(out, "info string setoption error: {}", err)?;
                }
            }
            "ucinewgame" => {
                self.session = self.fresh_session();
                self.engine.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    writeln!(out, "info string position error: {}", err)?;
                }
            }
            "go" => match self.run_go(trimmed) {
                Ok(result) => self.write_go_result(&result, out)?,
                Err(err) => {
                    writeln!(out, "info string go error: {}", err)?;
                    writeln!(out, "bestmove 0000")?;
                }
            },
            "d" => {
                writeln!(out, "{}", render_session(&self.session))?;
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                // Unknown commands are ignored for UCI compatibility.
            }
        }

        Ok(false)
    }

    fn fresh_session(&self) -> GameSession {
        let mut session = GameSession::new();
        session.set_chess960(self.chess960);
        session
    }

    fn handle_setoption(&mut self, line: &str) -> ChessResult<()> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        let value = value_tokens.join(" ");
        let invalid = || ChessErrors::InvalidOption {
            name: name.clone(),
            value: value.clone(),
        };

        if name.eq_ignore_ascii_case("Skill Level") {
            let parsed = value
                .parse::<u8>()
                .ok()
                .filter(|level| (1..=10).contains(level))
                .ok_or_else(invalid)?;
            self.skill_level = parsed;
            self.engine = build_engine(self.skill_level);
            for (option, setting) in &self.engine_options {
                let _ = self.engine.set_option(option, setting);
            }
            self.engine.new_game();
        } else if name.eq_ignore_ascii_case("FixedDepth") {
            let parsed = value
                .parse::<u8>()
                .ok()
                .filter(|depth| *depth <= MAX_SEARCH_DEPTH)
                .ok_or_else(invalid)?;
            self.fixed_depth_override = if parsed == 0 { None } else { Some(parsed) };
        } else if name.eq_ignore_ascii_case("UCI_Chess960") {
            let lower = value.to_ascii_lowercase();
            self.chess960 = matches!(lower.as_str(), "true" | "1" | "yes" | "on");
            self.session.set_chess960(self.chess960);
        } else {
            self.engine.set_option(&name, &value)?;
            self.engine_options.retain(|(option, _)| !option.eq_ignore_ascii_case(&name));
            self.engine_options.push((name, value));
        }

        Ok(())
    }

    fn handle_position(&mut self, line: &str) -> ChessResult<()> {
        let mut tokens = line.split_whitespace().peekable();
        let _ = tokens.next(); // "position"

        let mut session = match tokens.next() {
            Some("startpos") => GameSession::new(),
            Some("fen") => {
                let mut fen_parts = Vec::<&str>::new();
                while let Some(next) = tokens.peek() {
                    if *next == "moves" {
                        break;
                    }
                    fen_parts.push(next);
                    tokens.next();
                }
                if fen_parts.is_empty() {
                    return Err(ChessErrors::InvalidFen(
                        "missing FEN after 'position fen'".to_owned(),
                    ));
                }
                parse_fen(&fen_parts.join(" "))?
            }
            Some(other) => {
                return Err(ChessErrors::InvalidFen(format!(
                    "unsupported position token '{}'",
                    other
                )))
            }
            None => {
                return Err(ChessErrors::InvalidFen(
                    "incomplete position command".to_owned(),
                ))
            }
        };
        session.set_chess960(self.chess960);

        if tokens.peek().copied() == Some("moves") {
            let _ = tokens.next();
            for lan in tokens {
                let action =
                    long_algebraic_to_action(lan, session.position(), session.side_to_move())?;
                session.play_action(action)?;
            }
        }

        self.session = session;
        Ok(())
    }

    fn run_go(&mut self, line: &str) -> ChessResult<EngineOutput> {
        let mut params = parse_go_params(line);
        if params.depth.is_none() {
            params.depth = self.fixed_depth_override;
        }
        self.engine
            .choose_move(self.session.position(), self.session.side_to_move(), &params)
    }

    fn write_go_result(&self, result: &EngineOutput, out: &mut impl Write) -> io::Result<()> {
        for info in &result.info_lines {
            writeln!(out, "{}", info)?;
        }
        match result.best_move {
            Some(action) => writeln!(
                out,
                "bestmove {}",
                action_to_long_algebraic(&action, self.chess960)
            ),
            None => writeln!(out, "bestmove 0000"),
        }
    }
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let mut i = 0usize;
    while i < tokens.len() {
        if tokens[i] == "depth" {
            i += 1;
            params.depth = tokens.get(i).and_then(|x| x.parse::<u8>().ok());
        }
        // Clock and node limits are accepted and ignored: the search is
        // fixed-depth.
        i += 1;
    }
    params
}

fn build_engine(skill_level: u8) -> Box<dyn Engine> {
    match skill_level {
        0 | 1 => Box::new(RandomEngine::new()),
        level => Box::new(AlphaBetaEngine::with_depth((level - 1).min(MAX_SEARCH_DEPTH))),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_go_params, UciState};
    use crate::game_state::chess_types::Side;

    fn run(state: &mut UciState, line: &str) -> String {
        let mut out = Vec::<u8>::new();
        state
            .handle_command(line, &mut out)
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).expect("UCI output is UTF-8")
    }

    #[test]
    fn uci_handshake_lists_options() {
        let mut state = UciState::new();
        let reply = run(&mut state, "uci");
        assert!(reply.starts_with("id name Glider Chess\n"));
        assert!(reply.contains("option name Skill Level"));
        assert!(reply.trim_end().ends_with("uciok"));
        assert_eq!(run(&mut state, "isready"), "readyok\n");
    }

    #[test]
    fn position_startpos_with_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position startpos moves e2e4 e7e5 g1f3")
            .expect("position command should parse");
        assert_eq!(state.session.side_to_move(), Side::Black);
        assert_eq!(state.session.moves().len(), 3);
    }

    #[test]
    fn position_fen_without_moves_updates_state() {
        let mut state = UciState::new();
        state
            .handle_position("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
            .expect("position fen should parse");
        assert_eq!(state.session.fen(), "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
    }

    #[test]
    fn bad_position_reports_and_keeps_previous_state() {
        let mut state = UciState::new();
        let reply = run(&mut state, "position startpos moves e2e5");
        assert!(reply.starts_with("info string position error: illegal move e2e5"));
        assert_eq!(state.session.moves().len(), 0);
    }

    #[test]
    fn setoption_skill_level_switches_engine() {
        let mut state = UciState::new();
        state
            .handle_setoption("setoption name Skill Level value 1")
            .expect("setoption should parse");
        assert_eq!(state.skill_level, 1);
        assert_eq!(state.engine.name(), "random");

        state
            .handle_setoption("setoption name Skill Level value 3")
            .expect("setoption should parse");
        assert_eq!(state.engine.name(), "alpha_beta");
        assert!(state
            .handle_setoption("setoption name Skill Level value 42")
            .is_err());
        assert_eq!(state.skill_level, 3);
    }

    #[test]
    fn setoption_fixed_depth_sets_override() {
        let mut state = UciState::new();
        state
            .handle_setoption("setoption name FixedDepth value 4")
            .expect("setoption should parse");
        assert_eq!(state.fixed_depth_override, Some(4));
        state
            .handle_setoption("setoption name FixedDepth value 0")
            .expect("setoption should parse");
        assert_eq!(state.fixed_depth_override, None);
    }

    #[test]
    fn engine_options_survive_a_skill_change() {
        let mut state = UciState::new();
        state
            .handle_setoption("setoption name CachePolicy value disabled")
            .expect("valid policy");
        assert!(state
            .handle_setoption("setoption name CachePolicy value sometimes")
            .is_err());
        state
            .handle_setoption("setoption name Skill Level value 2")
            .expect("valid level");
        assert_eq!(state.engine_options.len(), 1);
        assert_eq!(state.engine_options[0].1, "disabled");
    }

    #[test]
    fn go_finds_mate_in_one() {
        let mut state = UciState::new();
        run(&mut state, "position fen 6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let reply = run(&mut state, "go depth 2");
        assert!(reply.contains("info depth 2 "));
        assert!(reply.trim_end().ends_with("bestmove a1a8"));
    }

    #[test]
    fn go_without_moves_reports_null_move() {
        let mut state = UciState::new();
        run(
            &mut state,
            "position startpos moves f2f3 e7e5 g2g4 d8h4",
        );
        let reply = run(&mut state, "go");
        assert!(reply.trim_end().ends_with("bestmove 0000"));
    }

    #[test]
    fn chess960_castling_is_written_king_takes_rook() {
        let mut state = UciState::new();
        run(&mut state, "setoption name UCI_Chess960 value true");
        run(&mut state, "position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1h1");
        assert_eq!(state.session.moves().len(), 1);
        assert_eq!(state.session.fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");
    }

    #[test]
    fn go_params_ignore_clock_fields() {
        let params = parse_go_params("go wtime 120000 btime 60000 depth 3");
        assert_eq!(params.depth, Some(3));
        assert_eq!(parse_go_params("go infinite").depth, None);
    }

    #[test]
    fn display_command_renders_board() {
        let mut state = UciState::new();
        let reply = run(&mut state, "d");
        assert!(reply.contains("Fen: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(run(&mut state, "quit").is_empty());
    }
}
