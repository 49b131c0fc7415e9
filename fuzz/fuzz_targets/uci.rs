#![no_main]

use libfuzzer_sys::fuzz_target;
use chess_study::uci::Uci;

fuzz_target!(|data: &[u8]| {
    if let Ok(uci) = Uci::from_ascii(data) {
        let roundtripped = Uci::from_ascii(uci.to_string().as_bytes()).expect("roundtrip");
        assert_eq!(uci, roundtripped);
    }
});
