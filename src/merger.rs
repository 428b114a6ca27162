//! K-way merger.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::heap::MinHeap;
use crate::record::{compare_records, Record};

/// Pending record of a chunk together with the chunk position in the merger input.
pub struct MergeEntry {
    pub record: Record,
    pub chunk_idx: usize,
}

/// Compares merge entries by record sort key. Entries with equal keys are ordered by chunk position,
/// so equal records of an earlier chunk always come first.
pub fn compare_entries(a: &MergeEntry, b: &MergeEntry) -> Ordering {
    compare_records(&a.record, &b.record).then(a.chunk_idx.cmp(&b.chunk_idx))
}

type EntryCompare = fn(&MergeEntry, &MergeEntry) -> Ordering;

/// K-way merger.
/// Merges multiple sorted inputs into a single sorted output keeping at most one pending record per input.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number of records,
/// *n* is the number of chunks (inputs).
///
/// An input is dropped as soon as it is exhausted. After an error is returned the merger yields nothing.
pub struct KWayMerger<E, C>
where
    C: Iterator<Item = Result<Record, E>>,
{
    heap: MinHeap<MergeEntry, EntryCompare>,
    chunks: Vec<Option<C>>,
    initiated: bool,
    failed: bool,

    /// Input error type.
    error_type: PhantomData<E>,
}

impl<E, C> KWayMerger<E, C>
where
    C: Iterator<Item = Result<Record, E>>,
{
    /// Creates an instance of a merger using chunks as inputs.
    /// Chunk records should be sorted by sort key otherwise the result is undefined.
    ///
    /// # Arguments
    /// * `chunks` - Chunks to be merged in a single sorted one
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<IntoIter = C>,
    {
        let chunks = Vec::from_iter(chunks.into_iter().map(|c| Some(c.into_iter())));
        let heap = MinHeap::with_capacity(chunks.len(), compare_entries as EntryCompare);

        return KWayMerger {
            heap,
            chunks,
            initiated: false,
            failed: false,
            error_type: PhantomData,
        };
    }

    /// Returns the number of inputs not exhausted yet.
    #[cfg(test)]
    pub(crate) fn open_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    fn init(&mut self) -> Result<(), E> {
        let mut entries = Vec::with_capacity(self.chunks.len());
        for (chunk_idx, slot) in self.chunks.iter_mut().enumerate() {
            let first = slot.as_mut().and_then(|chunk| chunk.next());
            match first {
                Some(Ok(record)) => entries.push(MergeEntry { record, chunk_idx }),
                Some(Err(err)) => return Err(err),
                None => *slot = None,
            }
        }
        self.heap = MinHeap::from_vec(entries, compare_entries as EntryCompare);

        return Ok(());
    }

    fn fail(&mut self, err: E) -> Option<Result<Record, E>> {
        self.failed = true;
        self.chunks.clear();
        Some(Err(err))
    }
}

impl<E, C> Iterator for KWayMerger<E, C>
where
    C: Iterator<Item = Result<Record, E>>,
{
    type Item = Result<Record, E>;

    /// Returns the next record from the inputs in sort key order.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if !self.initiated {
            self.initiated = true;
            if let Err(err) = self.init() {
                return self.fail(err);
            }
        }

        let chunk_idx = self.heap.peek()?.chunk_idx;
        let next = self.chunks[chunk_idx].as_mut().and_then(|chunk| chunk.next());

        let entry = match next {
            Some(Ok(record)) => self.heap.replace_top(MergeEntry { record, chunk_idx }),
            Some(Err(err)) => return self.fail(err),
            None => {
                self.chunks[chunk_idx] = None;
                self.heap.pop()
            }
        }?;

        return Some(Ok(entry.record));
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use std::error::Error;
    use std::io::{self, ErrorKind};

    use super::{compare_entries, KWayMerger, MergeEntry};
    use crate::record::Record;
    use std::cmp::Ordering;

    fn record(line: &str) -> Record {
        Record::parse(line.to_string()).unwrap()
    }

    fn chunk(lines: &[&str]) -> Vec<Result<Record, io::Error>> {
        lines.iter().map(|line| Ok(record(line))).collect()
    }

    fn test_error() -> io::Error {
        io::Error::new(ErrorKind::Other, "test error")
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(vec![chunk(&[]), chunk(&[])], vec![])]
    #[case(
        vec![
            chunk(&["4. d\n", "5. e\n", "7. g\n"]),
            chunk(&["1. a\n", "6. f\n"]),
            chunk(&["3. c\n"]),
            chunk(&[]),
        ],
        vec![Ok("1. a\n"), Ok("3. c\n"), Ok("4. d\n"), Ok("5. e\n"), Ok("6. f\n"), Ok("7. g\n")],
    )]
    #[case(
        vec![
            chunk(&["9. Apple\n", "1. Banana\n"]),
            chunk(&["2. Apple\n", "10. Apple\n"]),
        ],
        vec![Ok("2. Apple\n"), Ok("9. Apple\n"), Ok("10. Apple\n"), Ok("1. Banana\n")],
    )]
    #[case(
        vec![vec![Err(test_error())]],
        vec![Err(test_error())],
    )]
    #[case(
        vec![
            vec![Ok(record("3. c\n")), Err(test_error())],
            chunk(&["1. a\n", "2. b\n"]),
        ],
        vec![Ok("1. a\n"), Ok("2. b\n"), Err(test_error())],
    )]
    fn test_merger(
        #[case] chunks: Vec<Vec<Result<Record, io::Error>>>,
        #[case] expected_result: Vec<Result<&str, io::Error>>,
    ) {
        let merger = KWayMerger::new(chunks);
        let actual_result: Vec<Result<String, io::Error>> = merger.map(|r| r.map(Record::into_raw)).collect();
        assert!(
            compare_vectors_of_result(&actual_result, &expected_result),
            "actual={:?}, expected={:?}",
            actual_result,
            expected_result
        );
    }

    #[rstest]
    fn test_equal_keys_follow_chunk_order() {
        // the same key in every chunk, spelled differently to tell lines apart
        for _ in 0..3 {
            let merger = KWayMerger::new(vec![chunk(&["1. A\n"]), chunk(&["1.A\n"]), chunk(&[" 1. A \n"])]);
            let actual: Vec<String> = merger.map(|r| r.unwrap().into_raw()).collect();
            assert_eq!(actual, vec!["1. A\n", "1.A\n", " 1. A \n"]);
        }
    }

    #[rstest]
    fn test_exhausted_chunks_are_dropped() {
        let mut merger = KWayMerger::new(vec![chunk(&["1. a\n"]), chunk(&["2. b\n", "3. c\n"]), chunk(&[])]);

        assert_eq!(merger.next().unwrap().unwrap().raw(), "1. a\n");
        assert_eq!(merger.open_chunks(), 1);
        assert_eq!(merger.next().unwrap().unwrap().raw(), "2. b\n");
        assert_eq!(merger.next().unwrap().unwrap().raw(), "3. c\n");
        assert!(merger.next().is_none());
        assert_eq!(merger.open_chunks(), 0);
    }

    #[rstest]
    #[case("1. A\n", 0, "1. A\n", 1, Ordering::Less)]
    #[case("1. A\n", 1, "1. A\n", 0, Ordering::Greater)]
    #[case("2. A\n", 0, "1. B\n", 1, Ordering::Less)]
    #[case("2. A\n", 0, "1. A\n", 1, Ordering::Greater)]
    fn test_compare_entries(
        #[case] a: &str,
        #[case] a_idx: usize,
        #[case] b: &str,
        #[case] b_idx: usize,
        #[case] expected: Ordering,
    ) {
        let a = MergeEntry {
            record: record(a),
            chunk_idx: a_idx,
        };
        let b = MergeEntry {
            record: record(b),
            chunk_idx: b_idx,
        };
        assert_eq!(compare_entries(&a, &b), expected);
    }

    fn compare_vectors_of_result<E: Error + 'static>(
        actual: &Vec<Result<String, E>>,
        expected: &Vec<Result<&str, E>>,
    ) -> bool {
        actual.len() == expected.len()
            && actual
                .into_iter()
                .zip(expected)
                .all(
                    |(actual_result, expected_result)| match (actual_result, expected_result) {
                        (Ok(actual_result), Ok(expected_result)) if actual_result == expected_result => true,
                        (Err(actual_err), Err(expected_err)) => actual_err.to_string() == expected_err.to_string(),
                        _ => false,
                    },
                )
    }
}
