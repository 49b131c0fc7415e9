use chess_study::{san::SanPlus, uci::Uci, BoardPosition};
use serde::Deserialize;
use serde_with::{formats::SpaceSeparator, serde_as, StringWithSeparator};

#[serde_as]
#[derive(Deserialize)]
struct Record {
    start: Option<String>,
    #[serde_as(as = "StringWithSeparator<SpaceSeparator, Uci>")]
    uci: Vec<Uci>,
    #[serde_as(as = "StringWithSeparator<SpaceSeparator, String>")]
    san: Vec<String>,
    fen: String,
}

fn start_position(record: &Record) -> BoardPosition {
    match record.start {
        Some(ref fen) => BoardPosition::from_fen(fen, false).expect("valid start fen"),
        None => BoardPosition::new(),
    }
}

#[test]
fn test_uci_to_san() {
    let mut reader = csv::Reader::from_path("tests/notation.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");
        let mut pos = start_position(&record);
        assert_eq!(record.uci.len(), record.san.len(), "line {}", i + 1);

        for (uci, expected) in record.uci.iter().zip(&record.san) {
            let m = uci.to_move(&pos).expect("legal uci");
            let san = SanPlus::from_move_and_play_unchecked(&mut pos, m);
            assert_eq!(&san.to_string(), expected, "line {}", i + 1);
            assert_eq!(Uci::from_move(m), *uci, "line {}", i + 1);
        }

        assert_eq!(pos.fen(), record.fen, "line {}", i + 1);
    }
}

#[test]
fn test_san_to_uci() {
    let mut reader = csv::Reader::from_path("tests/notation.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");
        let mut pos = start_position(&record);

        for (san, expected) in record.san.iter().zip(&record.uci) {
            let m = pos.play_san(san).expect("legal san");
            assert_eq!(Uci::from_move(m), *expected, "line {}", i + 1);
        }

        assert_eq!(pos.fen(), record.fen, "line {}", i + 1);
    }
}
