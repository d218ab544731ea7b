use std::marker::PhantomData;
use std::slice::ChunksExact;

use crate::error::WadError;

/// Iterates the fixed-size records of a lump, handing each record's bytes to
/// the `transformer` to build the typed value
pub struct LumpIter<'a, T, F: Fn(&'a [u8]) -> T> {
    records: ChunksExact<'a, u8>,
    transformer: F,
    _phantom: PhantomData<T>,
}

impl<'a, T, F> LumpIter<'a, T, F>
where
    F: Fn(&'a [u8]) -> T,
{
    /// Fails if the lump is not a whole number of records
    pub fn new(
        record: &'static str,
        bytes: &'a [u8],
        record_size: usize,
        transformer: F,
    ) -> Result<Self, WadError> {
        if record_size == 0 || bytes.len() % record_size != 0 {
            return Err(WadError::SizeMismatch {
                record,
                len: bytes.len(),
                record_size,
            });
        }
        Ok(Self {
            records: bytes.chunks_exact(record_size),
            transformer,
            _phantom: Default::default(),
        })
    }
}

impl<'a, T, F> Iterator for LumpIter<'a, T, F>
where
    F: Fn(&'a [u8]) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(&self.transformer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<'a, T, F> ExactSizeIterator for LumpIter<'a, T, F> where F: Fn(&'a [u8]) -> T {}

/// Decode a whole lump in to a `Vec` of records
pub(crate) fn decode_records<'a, T>(
    record: &'static str,
    bytes: &'a [u8],
    record_size: usize,
    transformer: impl Fn(&'a [u8]) -> T,
) -> Result<Vec<T>, WadError> {
    Ok(LumpIter::new(record, bytes, record_size, transformer)?.collect())
}
