use chess_study::{fen, BoardPosition};
use serde::Deserialize;

#[derive(Deserialize)]
struct Record {
    fen: String,
    error: Option<String>,
}

#[test]
fn test_fen_suite() {
    let mut reader = csv::Reader::from_path("tests/fen.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");

        match (fen::parse(&record.fen, false), record.error) {
            (Ok(pos), None) => {
                assert_eq!(pos.fen(), record.fen, "line {}", i + 1);
                let reparsed: BoardPosition = pos.fen().parse().expect("round trip");
                assert_eq!(reparsed, pos, "line {}", i + 1);
            }
            (Err(err), Some(kind)) => {
                assert_eq!(format!("{:?}", err.kind), kind, "line {}", i + 1);
            }
            (result, expected) => {
                panic!("line {}: expected {expected:?}, got {result:?}", i + 1);
            }
        }
    }
}

#[test]
fn test_position_only() {
    let pos = fen::parse("8/8/8/8/8/8/8/K6k", true).expect("board only");
    assert_eq!(pos.fen(), "8/8/8/8/8/8/8/K6k w - - 0 1");
    assert!(pos.is_insufficient_material());

    assert_eq!(
        fen::short_fen(&BoardPosition::new()),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
    );
}
