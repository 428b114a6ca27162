//! Size limited chunk buffer.

use crate::record::{compare_records, Record};

/// Buffer of pending records limited by the total byte length of the lines pushed into it.
///
/// The limit is a soft cap: it is checked before a line is added, so a buffer may exceed it by less
/// than one line, and a single line longer than the limit still makes up a chunk on its own.
pub struct ChunkBuffer {
    limit: u64,
    current_size: u64,
    inner: Vec<Record>,
}

impl ChunkBuffer {
    pub fn new(limit: u64) -> Self {
        ChunkBuffer {
            limit,
            current_size: 0,
            inner: Vec::new(),
        }
    }

    /// Checks if the buffer has to be flushed before a line of `line_size` bytes is added.
    pub fn is_full_for(&self, line_size: u64) -> bool {
        self.current_size > 0 && self.current_size + line_size > self.limit
    }

    /// Adds a new record to the buffer.
    pub fn push(&mut self, record: Record) {
        self.current_size += record.raw().len() as u64;
        self.inner.push(record);
    }

    /// Accounts for a line that carries no record.
    pub fn skip(&mut self, line_size: u64) {
        self.current_size += line_size;
    }

    /// Returns number of records in the buffer.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns byte length of all lines accounted so far.
    pub fn mem_size(&self) -> u64 {
        self.current_size
    }

    /// Sorts the pending records by sort key and drains them, leaving the buffer empty.
    /// Records with equal keys keep their insertion order.
    pub fn take_sorted(&mut self) -> Vec<Record> {
        self.current_size = 0;
        let mut records = std::mem::take(&mut self.inner);
        records.sort_by(compare_records);
        records
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::ChunkBuffer;
    use crate::record::Record;

    fn record(line: &str) -> Record {
        Record::parse(line.to_string()).unwrap()
    }

    #[rstest]
    fn test_soft_limit() {
        let mut buffer = ChunkBuffer::new(10);

        // an empty buffer accepts a line of any size
        assert_eq!(buffer.is_full_for(100), false);

        buffer.push(record("1. abc\n"));
        assert_eq!(buffer.mem_size(), 7);
        assert_eq!(buffer.is_full_for(3), false);
        assert_eq!(buffer.is_full_for(4), true);

        buffer.push(record("2.x\n"));
        assert_eq!(buffer.mem_size(), 11);
        assert_eq!(buffer.len(), 2);
    }

    #[rstest]
    fn test_skipped_lines_count() {
        let mut buffer = ChunkBuffer::new(4);
        buffer.skip(3);

        assert_eq!(buffer.is_empty(), true);
        assert_eq!(buffer.is_full_for(2), true);
    }

    #[rstest]
    fn test_take_sorted_is_stable() {
        let mut buffer = ChunkBuffer::new(u64::MAX);
        for line in ["5. Banana\n", "1. A\n", "2. Apple\n", " 1.A\n", "5. Apple\n"] {
            buffer.push(record(line));
        }

        let sorted: Vec<String> = buffer.take_sorted().into_iter().map(Record::into_raw).collect();

        assert_eq!(sorted, vec!["1. A\n", " 1.A\n", "2. Apple\n", "5. Apple\n", "5. Banana\n"]);
        assert_eq!(buffer.is_empty(), true);
        assert_eq!(buffer.mem_size(), 0);
    }
}
