//! Legal move generation.
//!
//! Generation is a pure function of a [`Board`] and the side to move.
//! Captures are searched first, square by square in index order, with
//! each jump chain explored depth first in the fixed order of
//! [`Direction::for_piece`]. If any capture exists only captures are
//! returned; otherwise the simple steps are.

use crate::model::{
    Board, Move, Player, Square,
    geometry::{Diagonal, Direction, offset},
};

/// All legal moves for `player` on `board`.
pub fn generate(board: &Board, player: Player) -> Vec<Move> {
    let mut buffer = Vec::with_capacity(16);
    generate_into(board, player, &mut buffer);
    buffer
}

/// Like [`generate`], appending to an existing buffer.
pub fn generate_into(board: &Board, player: Player, buffer: &mut Vec<Move>) {
    let start = buffer.len();

    for (ix, sq) in board.pieces() {
        if sq.belongs_to(player) {
            capture_moves(board, ix, sq, player, buffer);
        }
    }

    if buffer.len() > start {
        return;
    }

    for (ix, sq) in board.pieces() {
        if sq.belongs_to(player) {
            normal_moves(board, ix, sq, player, buffer);
        }
    }
}

/// True if `player` has at least one legal move.
pub fn has_moves(board: &Board, player: Player) -> bool {
    let mut buffer = Vec::new();
    generate_into(board, player, &mut buffer);
    !buffer.is_empty()
}

fn normal_moves(board: &Board, from: u8, sq: Square, player: Player, buffer: &mut Vec<Move>) {
    for &dir in Direction::for_piece(player, sq.is_king()) {
        if let Some(to) = offset(from, dir, Diagonal::SHORT)
            && board.get(to).is_empty()
        {
            buffer.push(Move::Normal { from, to });
        }
    }
}

fn capture_moves(board: &Board, from: u8, sq: Square, player: Player, buffer: &mut Vec<Move>) {
    let mut ctx = JumpContext {
        scratch: *board,
        from,
        enemy: player.opp(),
        directions: Direction::for_piece(player, sq.is_king()),
        landings: Vec::new(),
    };

    ctx.search(from, buffer);
}

/// Backtracking state of one piece's jump search.
///
/// The scratch board always reflects the chain so far: captured pieces
/// are lifted off and the jumper stands on its latest landing square.
struct JumpContext {
    scratch: Board,
    from: u8,
    enemy: Player,
    directions: &'static [Direction],
    landings: Vec<u8>,
}

impl JumpContext {
    /// Explore every jump out of `at`, pushing each maximal chain.
    /// Returns whether any jump was possible from `at`.
    fn search(&mut self, at: u8, buffer: &mut Vec<Move>) -> bool {
        let mut jumped = false;

        for &dir in self.directions {
            let (Some(over), Some(land)) = (
                offset(at, dir, Diagonal::SHORT),
                offset(at, dir, Diagonal::LONG),
            ) else {
                continue;
            };

            if !self.scratch.get(over).belongs_to(self.enemy) || !self.scratch.get(land).is_empty()
            {
                continue;
            }

            jumped = true;

            let taken = self.scratch.exchange(over, Square::EMPTY);
            self.scratch.swap(at, land);
            self.landings.push(land);

            if !self.search(land, buffer) {
                buffer.push(Move::Capture {
                    from: self.from,
                    to: self.landings.clone(),
                });
            }

            self.landings.pop();
            self.scratch.swap(at, land);
            self.scratch.set(over, taken);
        }

        jumped
    }
}

#[cfg(test)]
fn moves_of(position: &str) -> Vec<Move> {
    let pos: crate::model::Position = position.parse().unwrap();
    generate(&pos.board, pos.turn)
}

#[test]
fn startpos_has_seven_steps() {
    let pos = crate::model::Position::startpos();
    let moves = generate(&pos.board, pos.turn);
    assert_eq!(moves.len(), 7);
    assert!(moves.iter().all(Move::is_normal));
    assert_eq!(moves[0], Move::Normal { from: 20, to: 16 });
}

#[test]
fn captures_are_mandatory() {
    // Black could step 23-19, but 20 must jump 16.
    let moves = moves_of("B:W16:B20,23");
    assert_eq!(
        moves,
        vec![Move::Capture {
            from: 19,
            to: vec![10]
        }]
    );
}

#[test]
fn branched_capture() {
    let moves = moves_of("B:W1,3,8,9,10,16,17:B12,20,21,23,26,27,29,31");
    assert!(moves.iter().all(Move::is_capture));
    assert_eq!(moves.len(), 3);

    let from_21: Vec<_> = moves.iter().filter(|mv| mv.source() == 20).collect();
    assert_eq!(from_21.len(), 2);
    assert_eq!(
        from_21[0],
        &Move::Capture {
            from: 20,
            to: vec![13, 6]
        }
    );
    assert_eq!(
        from_21[1],
        &Move::Capture {
            from: 20,
            to: vec![13, 4]
        }
    );
}

#[test]
fn longest_capture() {
    let moves = moves_of("W:WK4:B6,7,8,14,15,16,22,23,24");
    assert_eq!(moves.len(), 9);
    assert!(moves.iter().all(|mv| mv.source() == 3));

    let longest = moves
        .iter()
        .filter_map(|mv| match mv {
            Move::Capture { to, .. } => Some(to.len()),
            Move::Normal { .. } => None,
        })
        .max();
    assert_eq!(longest, Some(9));

    // The king may pass through a square twice on one chain.
    assert_eq!(
        moves[0],
        Move::Capture {
            from: 3,
            to: vec![10, 1, 8, 17, 10, 19, 26, 17, 24]
        }
    );
}

#[test]
fn men_do_not_capture_backwards() {
    // The white man on 22 sits behind the black man on 18.
    let moves = moves_of("B:W22:B18");
    assert_eq!(moves.len(), 2);
    assert!(moves.iter().all(Move::is_normal));

    let moves = moves_of("B:W14:B18");
    assert_eq!(moves, vec![Move::Capture { from: 17, to: vec![8] }]);
}

#[test]
fn blocked_side_has_no_moves() {
    let pos: crate::model::Position = "W:W8:BK12,K15".parse().unwrap();
    assert!(has_moves(&pos.board, pos.turn));

    let pos: crate::model::Position = "W:WK2:BK30".parse().unwrap();
    assert!(has_moves(&pos.board, Player::WHITE));

    let mut board = Board::default();
    board.set(0, Square::WHITE_MAN);
    assert!(!has_moves(&board, Player::BLACK));
}
