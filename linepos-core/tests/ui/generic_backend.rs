use linepos_core::{
    ByteOffset, CompactOffsets, IndexConfig, LineCount, LineNumber, LineOffsetIndex,
    OffsetStorage, RawOffsets,
};

// Downstream code can stay generic over the storage backend
fn build<S: OffsetStorage>(ends: &[u64]) -> LineOffsetIndex<S> {
    let mut index = LineOffsetIndex::<S>::with_config(&IndexConfig::default());
    for &end in ends {
        index.append(ByteOffset::new(end));
    }
    index
}

fn main() {
    let fast = build::<RawOffsets>(&[4, 9]);
    let compact = build::<CompactOffsets>(&[4, 9]);

    let all = LineCount::new(2);
    assert_eq!(
        fast.range(LineNumber::new(0), all),
        compact.range(LineNumber::new(0), all)
    );
}
