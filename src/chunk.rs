//! Size-tiered chunk selection for streaming downloads.
//!
//! Small files get fine-grained chunks so progress updates stay responsive;
//! large files get coarse chunks to cut per-chunk overhead.

pub(crate) const KB: u64 = 1024;
pub(crate) const MB: u64 = 1024 * KB;

/// Chunk size used for files at or above the largest table bound, and for
/// files whose size is unknown.
pub const LARGE_FILE_CHUNK_SIZE: usize = 512 * KB as usize;

/// Ordered table mapping file-size brackets to read-chunk sizes.
///
/// Bounds are exclusive upper limits and strictly increasing; a size at or
/// above the last bound uses [`LARGE_FILE_CHUNK_SIZE`].
#[derive(Debug, Clone)]
pub struct ChunkTable {
    entries: Vec<(u64, usize)>,
    fallback: usize,
}

impl ChunkTable {
    /// Creates a table from `(bound_exclusive, chunk_size)` pairs.
    ///
    /// Returns `None` if the bounds are not strictly increasing or the
    /// fallback is not larger than every table entry.
    #[must_use]
    pub fn new(entries: Vec<(u64, usize)>, fallback: usize) -> Option<Self> {
        let increasing = entries.windows(2).all(|w| w[0].0 < w[1].0);
        let fallback_largest = entries.iter().all(|&(_, chunk)| chunk < fallback);
        (increasing && fallback_largest).then_some(Self { entries, fallback })
    }

    /// Returns the chunk size for a file of the given size.
    ///
    /// Scans the table in ascending order and picks the first bracket whose
    /// bound exceeds `size`. Unknown sizes fall through to the fallback.
    /// Pure and total.
    #[must_use]
    pub fn chunk_size_for(&self, size: Option<u64>) -> usize {
        let Some(size) = size else {
            return self.fallback;
        };
        self.entries
            .iter()
            .find(|&&(bound, _)| size < bound)
            .map_or(self.fallback, |&(_, chunk)| chunk)
    }
}

impl Default for ChunkTable {
    /// The stock table: 8 KB chunks below 1 MB, scaling up to 256 KB chunks
    /// below 250 MB, with a 512 KB fallback above that.
    fn default() -> Self {
        Self::new(
            vec![
                (MB, 8 * KB as usize),
                (10 * MB, 16 * KB as usize),
                (50 * MB, 64 * KB as usize),
                (100 * MB, 128 * KB as usize),
                (250 * MB, 256 * KB as usize),
            ],
            LARGE_FILE_CHUNK_SIZE,
        )
        .expect("stock chunk table is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_file_gets_fine_chunks() {
        let table = ChunkTable::default();
        assert_eq!(table.chunk_size_for(Some(500 * KB)), 8 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(0)), 8 * KB as usize);
    }

    #[test]
    fn brackets_scale_with_size() {
        let table = ChunkTable::default();
        assert_eq!(table.chunk_size_for(Some(2 * MB)), 16 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(20 * MB)), 64 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(80 * MB)), 128 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(200 * MB)), 256 * KB as usize);
    }

    #[test]
    fn exact_bound_falls_into_next_bracket() {
        let table = ChunkTable::default();
        // Bounds are exclusive upper limits of the lower bracket.
        assert_eq!(table.chunk_size_for(Some(MB)), 16 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(10 * MB)), 64 * KB as usize);
        assert_eq!(table.chunk_size_for(Some(250 * MB)), LARGE_FILE_CHUNK_SIZE);
    }

    #[test]
    fn huge_and_unknown_sizes_use_fallback() {
        let table = ChunkTable::default();
        assert_eq!(table.chunk_size_for(Some(u64::MAX)), LARGE_FILE_CHUNK_SIZE);
        assert_eq!(table.chunk_size_for(None), LARGE_FILE_CHUNK_SIZE);
    }

    #[test]
    fn rejects_non_increasing_bounds() {
        assert!(ChunkTable::new(vec![(10, 1), (10, 2)], 64).is_none());
        assert!(ChunkTable::new(vec![(20, 1), (10, 2)], 64).is_none());
    }

    #[test]
    fn rejects_fallback_not_larger_than_entries() {
        assert!(ChunkTable::new(vec![(10, 8), (20, 64)], 64).is_none());
    }

    #[test]
    fn empty_table_always_falls_back() {
        let table = ChunkTable::new(vec![], 42).unwrap();
        assert_eq!(table.chunk_size_for(Some(0)), 42);
        assert_eq!(table.chunk_size_for(None), 42);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chunk_size_never_panics(size in proptest::option::of(0u64..u64::MAX)) {
                let table = ChunkTable::default();
                let _ = table.chunk_size_for(size);
            }

            #[test]
            fn chunk_size_monotonic(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
                let table = ChunkTable::default();
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(table.chunk_size_for(Some(lo)) <= table.chunk_size_for(Some(hi)));
            }
        }
    }
}
