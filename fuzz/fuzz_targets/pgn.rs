#![no_main]

use libfuzzer_sys::fuzz_target;
use chess_study::pgn;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(tree) = pgn::read(&text) else {
        return;
    };

    // Whatever was read must be written as valid text that reads back to
    // the same tree.
    let written = pgn::write(&tree);
    let reread = pgn::read(&written).expect("written pgn is valid");
    assert_eq!(reread.node_count(), tree.node_count());
    assert_eq!(pgn::write(&reread), written);
});
