use std::{
    fs::File,
    io::{prelude::*, BufReader},
};

use chess_study::{perft, BoardPosition};

fn test_perft_file(path: &str, node_limit: u64) {
    let file = File::open(path).expect("failed to open test suite");
    let reader = BufReader::new(file);

    let mut pos = BoardPosition::new();

    for line in reader.lines().map(|l| l.unwrap()) {
        println!("{}", line);

        let trimmed = line.trim();
        let mut slices = trimmed.splitn(2, ' ');

        match slices.next() {
            Some("fen") => {
                pos = BoardPosition::from_fen(slices.next().expect("missing fen"), false)
                    .expect("invalid fen");
            }
            Some("perft") => {
                let mut params = slices.next().expect("missing perft params").splitn(2, ' ');

                let depth = params
                    .next()
                    .expect("missing perft depth")
                    .parse()
                    .expect("depth not an integer");

                let nodes = params
                    .next()
                    .expect("missing perft nodes")
                    .parse()
                    .expect("nodes not an integer");

                if nodes <= node_limit {
                    assert_eq!(perft(&pos, depth), nodes);
                }
            }
            _ => {}
        }
    }
}

// macro for generating tests
macro_rules! gen_tests {
    ($($fn_name:ident, $path:tt, $num:expr,)+) => {
        $(
            #[test]
            #[cfg_attr(miri, ignore)]
            fn $fn_name() {
                test_perft_file($path, $num);
            }
        )+
    }
}

gen_tests! {
    test_tricky, "tests/tricky.perft", 100_000,
}

#[test]
fn test_legal_moves_keep_king_safe() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ] {
        let pos = BoardPosition::from_fen(fen, false).expect("valid fen");
        let mover = pos.turn();
        for m in pos.legal_moves() {
            let mut child = pos.clone();
            child.play_unchecked(m);
            assert!(child.king_safe(mover), "{fen}: {m:?} leaves the king in check");
        }
    }
}
