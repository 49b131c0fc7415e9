#![no_main]

use libfuzzer_sys::fuzz_target;
use chess_study::{san::San, BoardPosition};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(pos) = BoardPosition::from_fen(text, false) else {
        return;
    };
    let mover = pos.turn();
    for m in pos.legal_moves() {
        let mut child = pos.clone();
        child.play_unchecked(m);
        assert!(child.king_safe(mover));
        assert_eq!(San::from_move(&pos, m).to_move(&pos), Ok(m));
    }
});
