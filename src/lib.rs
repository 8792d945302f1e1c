//! Crate root module declarations for the Glider Chess engine.
//!
//! Exposes the rules engine (positions, actions, legal move generation),
//! the game session, search and engines, the UCI front end and the
//! notation helpers (FEN, long algebraic, PGN).

pub mod chess_errors;

pub mod game_state {
    pub mod chess960;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_session;
    pub mod position;
}

pub mod moves {
    pub mod actions;
    pub mod king_moves;
    pub mod leaping_moves;
    pub mod pawn_moves;
    pub mod piece_rules;
    pub mod sliding_moves;
}

pub mod move_generation {
    pub mod legal_move_generator;
    pub mod move_generator;
    pub mod perft;
}

pub mod search {
    pub mod alpha_beta;
    pub mod value_cache;
}

pub mod uci {
    pub mod uci_top;
}

pub mod engines {
    pub mod engine_alpha_beta;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_game_state;
}
