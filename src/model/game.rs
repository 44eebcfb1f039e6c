//! # The live game
//!
//! [`CheckersGame`] owns the current board and everything needed to
//! decide when the game ends: the side to move, the plies played since
//! the last advancing move, and the positions seen since then. The list
//! of legal moves is regenerated after every transition and is the only
//! thing a proposed move is checked against.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    error::GameError,
    model::{Board, GameOver, Move, Player, Position, movegen::generate},
};

/// Plies without advancement after which the game is tied.
pub const MAX_PLIES_WITHOUT_ADVANCEMENT: u32 = 80;

/// Occurrences of a position that tie the game.
pub const REPETITION_LIMIT: u8 = 3;

pub type MoveCallback = Box<dyn FnMut(&Move) + Send>;

pub struct CheckersGame {
    board: Board,
    turn: Player,
    plies_without_advancement: u32,
    repetition: IndexMap<Position, u8>,
    legal_moves: Vec<Move>,
    game_over: GameOver,
    on_move: Option<MoveCallback>,
}

impl CheckersGame {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(&Position::startpos())
    }

    pub fn from_position(position: &Position) -> Self {
        let mut game = Self {
            board: position.board,
            turn: position.turn,
            plies_without_advancement: 0,
            repetition: IndexMap::new(),
            legal_moves: Vec::new(),
            game_over: GameOver::NONE,
            on_move: None,
        };
        game.check_legal_moves();
        game
    }

    pub fn from_notation(position: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(&position.parse()?))
    }

    /// Start over from `position`, or from the standard start if `None`.
    ///
    /// A registered move callback survives the reset. On error the game is
    /// left untouched.
    pub fn reset(&mut self, position: Option<&str>) -> Result<(), GameError> {
        let position = match position {
            Some(s) => s.parse()?,
            None => Position::startpos(),
        };

        let on_move = self.on_move.take();
        *self = Self::from_position(&position);
        self.on_move = on_move;

        debug!(position = %position, "game reset");
        Ok(())
    }

    /// Register the observer invoked after every applied move.
    pub fn on_move(&mut self, callback: impl FnMut(&Move) + Send + 'static) {
        self.on_move = Some(Box::new(callback));
    }

    /// Parse `notation` and apply it, returning the move played.
    pub fn play(&mut self, notation: &str) -> Result<Move, GameError> {
        let mv: Move = notation.parse()?;
        self.apply(&mv)?;
        Ok(mv)
    }

    /// Apply one of the current legal moves.
    ///
    /// Nothing is modified unless the whole transition succeeds.
    pub fn apply(&mut self, mv: &Move) -> Result<(), GameError> {
        if self.game_over.is_over() {
            return Err(GameError::GameOver(self.game_over));
        }

        if !self.legal_moves.contains(mv) {
            return Err(GameError::IllegalMove(mv.to_string()));
        }

        let (board, effects) = self.board.clone_make_move(self.turn, mv)?;

        self.board = board;
        self.turn = self.turn.opp();

        debug!(
            %mv,
            captured = effects.captured,
            crowned = effects.crowned,
            "move applied"
        );

        self.check_forty_move_rule(effects.advancement);
        self.check_repetition(effects.advancement);
        self.check_legal_moves();

        if let Some(callback) = self.on_move.as_mut() {
            callback(mv);
        }

        Ok(())
    }

    fn check_forty_move_rule(&mut self, advancement: bool) {
        if advancement {
            self.plies_without_advancement = 0;
            return;
        }

        self.plies_without_advancement += 1;
        if self.plies_without_advancement >= MAX_PLIES_WITHOUT_ADVANCEMENT {
            info!(
                plies = self.plies_without_advancement,
                "tie by the forty move rule"
            );
            self.game_over = GameOver::TIE;
        }
    }

    fn check_repetition(&mut self, advancement: bool) {
        if advancement {
            self.repetition.clear();
        }

        let position = self.position();
        let count = self.repetition.entry(position).or_insert(0);
        *count += 1;

        if *count >= REPETITION_LIMIT {
            info!(%position, "tie by threefold repetition");
            self.game_over = GameOver::TIE;
        }
    }

    /// Regenerate the legal moves. Running out of moves loses, and
    /// overrides a tie decided by the same move.
    fn check_legal_moves(&mut self) {
        self.legal_moves = generate(&self.board, self.turn);

        if self.legal_moves.is_empty() {
            self.game_over = GameOver::winner(self.turn.opp());
            info!(outcome = %self.game_over, "no legal moves left");
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn plies_without_advancement(&self) -> u32 {
        self.plies_without_advancement
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    pub fn game_over(&self) -> GameOver {
        self.game_over
    }

    pub fn position(&self) -> Position {
        Position {
            board: self.board,
            turn: self.turn,
        }
    }

    pub fn position_string(&self) -> String {
        self.position().to_string()
    }

    /// Positions seen since the last advancing move, oldest first, with
    /// their number of occurrences.
    pub fn history(&self) -> impl Iterator<Item = (&Position, u8)> {
        self.repetition.iter().map(|(pos, &n)| (pos, n))
    }
}

impl Default for CheckersGame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CheckersGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckersGame")
            .field("position", &self.position_string())
            .field("plies_without_advancement", &self.plies_without_advancement)
            .field("game_over", &self.game_over)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
fn play_all(game: &mut CheckersGame, moves: &[&str]) {
    for mv in moves {
        assert!(!game.game_over().is_over(), "over before {mv}");
        game.play(mv).unwrap();
    }
}

#[test]
fn first_move() {
    let mut game = CheckersGame::from_notation(
        "B:W1,2,3,4,5,6,7,8,9,10,11,12:B21,22,23,24,25,26,27,28,29,30,31,32",
    )
    .unwrap();
    assert_eq!(game.legal_moves().len(), 7);

    game.play("22x18").unwrap();
    assert_eq!(game.turn(), Player::WHITE);

    assert_eq!(game.play("9x13"), Ok(Move::Normal { from: 8, to: 12 }));
    assert_eq!(game.turn(), Player::BLACK);
    assert_eq!(game.plies_without_advancement(), 0);
    assert_eq!(
        game.position_string(),
        "B:W1,2,3,4,5,6,7,8,10,11,12,13:B18,21,23,24,25,26,27,28,29,30,31,32"
    );
}

#[test]
fn illegal_moves_change_nothing() {
    let mut game = CheckersGame::new();
    let before = game.position();

    assert!(matches!(game.play("21-25"), Err(GameError::IllegalMove(_))));
    assert!(matches!(game.play("21"), Err(GameError::Notation(_))));
    assert!(matches!(game.play("1x40"), Err(GameError::Notation(_))));

    assert_eq!(game.position(), before);
    assert_eq!(game.legal_moves().len(), 7);
    assert_eq!(game.history().count(), 0);
}

#[test]
fn forty_move_rule() {
    // Both kings walk loops far enough apart that no position occurs a
    // third time within 80 plies.
    let white = [2, 7, 10, 6];
    let black = [30, 26, 31, 27, 24, 19, 23, 18, 22, 25];

    let mut game = CheckersGame::from_notation("W:WK2:BK30").unwrap();
    for ply in 0..80 {
        assert_eq!(game.game_over(), GameOver::NONE, "ply {ply}");
        let path: &[u8] = if ply % 2 == 0 { &white } else { &black };
        let i = ply / 2;
        let mv = format!("{}x{}", path[i % path.len()], path[(i + 1) % path.len()]);
        game.play(&mv).unwrap();
    }

    assert_eq!(game.plies_without_advancement(), 80);
    assert_eq!(game.game_over(), GameOver::TIE);
}

#[test]
fn threefold_repetition() {
    let mut game = CheckersGame::from_notation("W:WK2:BK30").unwrap();
    let shuffle = ["2x6", "30x26", "6x2", "26x30"];

    play_all(&mut game, &shuffle);
    play_all(&mut game, &shuffle);
    assert_eq!(game.game_over(), GameOver::NONE);
    assert_eq!(game.history().map(|(_, n)| n).max(), Some(2));

    game.play("2x6").unwrap();
    assert_eq!(game.game_over(), GameOver::TIE);
    assert_eq!(
        game.play("30x26"),
        Err(GameError::GameOver(GameOver::TIE))
    );
}

#[test]
fn advancement_clears_history() {
    let mut game = CheckersGame::new();
    play_all(&mut game, &["22x18", "11x15"]);
    assert_eq!(game.history().count(), 1);
    assert_eq!(game.plies_without_advancement(), 0);
}

#[test]
fn blockage_wins() {
    let mut game = CheckersGame::from_notation("W:W8:BK12,K15").unwrap();
    play_all(&mut game, &["8x11", "15x8"]);
    assert_eq!(game.game_over(), GameOver::WINNER_BLACK);
    assert!(game.legal_moves().is_empty());

    let mut game = CheckersGame::from_notation("B:W1,2,K7:B5,6,15,9").unwrap();
    play_all(&mut game, &["15x11", "7x16"]);
    assert_eq!(game.game_over(), GameOver::WINNER_WHITE);
    assert_eq!(game.board().count(Player::BLACK), 3);

    let mut game = CheckersGame::from_notation("W:WK7,K8:B16").unwrap();
    play_all(&mut game, &["7x3", "16x11", "8x15"]);
    assert_eq!(game.game_over(), GameOver::WINNER_WHITE);

    let mut game = CheckersGame::from_notation("W:W25,6:BK14,29,30").unwrap();
    play_all(&mut game, &["6x10", "14x7"]);
    assert_eq!(game.game_over(), GameOver::WINNER_BLACK);
}

#[test]
fn terminal_start_position() {
    let game = CheckersGame::from_notation("B:W1,2:B").unwrap();
    assert_eq!(game.game_over(), GameOver::WINNER_WHITE);
}

#[test]
fn callback_and_reset() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut game = CheckersGame::new();
    {
        let seen = seen.clone();
        game.on_move(move |mv| seen.lock().unwrap().push(mv.to_string()));
    }

    play_all(&mut game, &["22x18", "11x15"]);
    assert_eq!(*seen.lock().unwrap(), ["22x18", "11x15"]);

    assert!(game.reset(Some("nonsense")).is_err());
    assert_eq!(game.turn(), Player::BLACK);
    assert_eq!(game.board().count(Player::BLACK), 12);

    game.reset(Some("W:WK2:BK30")).unwrap();
    assert_eq!(game.position_string(), "W:WK2:BK30");
    game.play("2x7").unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);

    game.reset(None).unwrap();
    assert_eq!(game.position(), Position::startpos());
}
