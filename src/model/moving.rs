use crate::{
    error::GameError,
    model::{
        Board, Move, Player, Square,
        geometry::{ix_to_sq32, jumped_square, row, sq32_to_ix},
    },
};

/// What a completed move did, beyond relocating the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveEffects {
    /// A capture, or a man's simple step.
    pub advancement: bool,
    pub crowned: bool,
    pub captured: u8,
}

/// Reject moves naming squares off the board, or captures without landings.
fn check_squares(mv: &Move) -> Result<(), GameError> {
    let landings = match mv {
        Move::Normal { to, .. } => std::slice::from_ref(to),
        Move::Capture { from, to } if to.is_empty() => {
            return Err(GameError::Invariant {
                square: *from,
                reason: "capture without landing squares",
            });
        }
        Move::Capture { to, .. } => to.as_slice(),
    };

    let source = mv.source();
    match std::iter::once(&source)
        .chain(landings)
        .find(|&&ix| ix as usize >= Board::SIZE)
    {
        Some(&square) => Err(GameError::Invariant {
            square,
            reason: "square index off the board",
        }),
        None => Ok(()),
    }
}

impl Board {
    /// Play `mv` for `player` on this board.
    ///
    /// The move is trusted to be legal. Its squares are range checked up
    /// front, the board is still checked as the move is carried out, and a
    /// [`GameError::Invariant`] is returned on the first disagreement. The board may be partially modified in that
    /// case, so callers wanting atomicity should apply to a copy.
    pub fn make_move(&mut self, player: Player, mv: &Move) -> Result<MoveEffects, GameError> {
        check_squares(mv)?;
        let mut effects = MoveEffects::default();

        let piece = self.exchange(mv.source(), Square::EMPTY);
        if !piece.belongs_to(player) {
            return Err(GameError::Invariant {
                square: mv.source(),
                reason: "no piece of the side to move",
            });
        }

        match mv {
            Move::Normal { .. } => {
                effects.advancement = !piece.is_king();
            }
            Move::Capture { from, to } => {
                let mut at = *from;
                for &land in to {
                    let over = sq32_to_ix(jumped_square(ix_to_sq32(at), ix_to_sq32(land)));
                    if !self.exchange(over, Square::EMPTY).belongs_to(player.opp()) {
                        return Err(GameError::Invariant {
                            square: over,
                            reason: "jumped square holds no opposing piece",
                        });
                    }
                    effects.captured += 1;
                    at = land;
                }
                effects.advancement = true;
            }
        }

        let dest = mv.destination();
        if !self.get(dest).is_empty() {
            return Err(GameError::Invariant {
                square: dest,
                reason: "destination is occupied",
            });
        }

        let piece = if !piece.is_king() && row(dest) == player.crowning_row() {
            effects.crowned = true;
            piece.crowned()
        } else {
            piece
        };
        self.set(dest, piece);

        Ok(effects)
    }

    /// Copy-make variant of [`Board::make_move`].
    pub fn clone_make_move(&self, player: Player, mv: &Move) -> Result<(Self, MoveEffects), GameError> {
        let mut board = *self;
        let effects = board.make_move(player, mv)?;
        Ok((board, effects))
    }
}

#[test]
fn normal_step_relocates() {
    let start = crate::model::Position::startpos();
    let (board, effects) = start
        .board
        .clone_make_move(Player::BLACK, &Move::Normal { from: 20, to: 16 })
        .unwrap();

    assert!(board.get(20).is_empty());
    assert_eq!(board.get(16), Square::BLACK_MAN);
    assert!(effects.advancement);
    assert!(!effects.crowned);
}

#[test]
fn king_step_is_not_advancement() {
    let mut board = Board::default();
    board.set(13, Square::WHITE_KING);
    let effects = board
        .make_move(Player::WHITE, &Move::Normal { from: 13, to: 9 })
        .unwrap();
    assert!(!effects.advancement);
    assert_eq!(board.get(9), Square::WHITE_KING);
}

#[test]
fn capture_chain_removes_jumped_pieces() {
    let pos: crate::model::Position = "W:WK4:B6,7,8,14,15,16,22,23,24".parse().unwrap();
    let mv = Move::Capture {
        from: 3,
        to: vec![10, 1, 8, 17, 10, 19, 26, 17, 24],
    };
    let (board, effects) = pos.board.clone_make_move(Player::WHITE, &mv).unwrap();

    assert_eq!(effects.captured, 9);
    assert!(effects.advancement);
    assert_eq!(board.count(Player::BLACK), 0);
    assert_eq!(board.get(24), Square::WHITE_KING);
    assert!(board.get(3).is_empty());
}

#[test]
fn crowning_happens_at_chain_end() {
    // Black man on 10 jumps 6 and lands on 1.
    let mut board = Board::default();
    board.set(9, Square::BLACK_MAN);
    board.set(5, Square::WHITE_MAN);
    let effects = board
        .make_move(Player::BLACK, &Move::Capture { from: 9, to: vec![0] })
        .unwrap();

    assert!(effects.crowned);
    assert_eq!(board.get(0), Square::BLACK_KING);
    assert!(board.get(5).is_empty());
}

#[test]
fn corrupt_board_is_reported() {
    let mut board = Board::default();
    board.set(9, Square::BLACK_MAN);
    let err = board
        .make_move(Player::BLACK, &Move::Capture { from: 9, to: vec![0] })
        .unwrap_err();
    assert_eq!(
        err,
        GameError::Invariant {
            square: 5,
            reason: "jumped square holds no opposing piece"
        }
    );

    let err = Board::default()
        .make_move(Player::WHITE, &Move::Normal { from: 0, to: 4 })
        .unwrap_err();
    assert!(matches!(err, GameError::Invariant { square: 0, .. }));
}

#[test]
fn malformed_moves_are_reported() {
    let start = crate::model::Position::startpos();

    let err = start
        .board
        .clone_make_move(Player::BLACK, &Move::Normal { from: 20, to: 40 })
        .unwrap_err();
    assert_eq!(
        err,
        GameError::Invariant {
            square: 40,
            reason: "square index off the board"
        }
    );

    let err = start
        .board
        .clone_make_move(Player::BLACK, &Move::Capture { from: 200, to: vec![13] })
        .unwrap_err();
    assert!(matches!(err, GameError::Invariant { square: 200, .. }));

    let mut board = start.board;
    let err = board
        .make_move(Player::BLACK, &Move::Capture { from: 20, to: vec![] })
        .unwrap_err();
    assert_eq!(
        err,
        GameError::Invariant {
            square: 20,
            reason: "capture without landing squares"
        }
    );
    assert_eq!(board, start.board);
}
