use std::sync::Arc;
use std::thread;

use linepos_core::{ByteOffset, CompactLineIndex, FastLineIndex, LineNumber};

fn main() {
    let mut chunk = FastLineIndex::new();
    chunk.append(ByteOffset::new(4));
    chunk.append(ByteOffset::new(9));

    let mut building = CompactLineIndex::new();
    building.append_list(&chunk);

    // Once merged, the index is moved into a shared immutable snapshot
    let snapshot = Arc::new(std::mem::take(&mut building));
    let readers: Vec<_> = (0..2)
        .map(|_| {
            let snapshot = Arc::clone(&snapshot);
            thread::spawn(move || snapshot.at(LineNumber::new(1)))
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap(), Ok(ByteOffset::new(9)));
    }
    assert!(building.is_empty());
}
