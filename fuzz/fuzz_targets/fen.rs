#![no_main]

use libfuzzer_sys::fuzz_target;

use chess_study::fen;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(pos) = fen::parse(text, false) {
        let roundtripped = fen::parse(&fen::fen(&pos), false).expect("roundtrip");
        assert_eq!(pos, roundtripped);
    }
});
