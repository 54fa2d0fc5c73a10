//! Column-oriented storage for a batch of candidate identifiers.

use crate::filter::RejectionFilter;
use crate::token::ContentType;

/// A zero-copy view of one candidate living inside a [`CandidateBatch`].
#[derive(Copy, Clone)]
pub struct Candidate<'a> {
    /// The candidate's raw bytes.
    pub bytes: &'a [u8],
    /// What kind of content these bytes represent.
    pub content_type: ContentType,
    /// Precomputed rejection filter for these bytes.
    pub rejection_filter: RejectionFilter,
}

/// Append-only, column-oriented storage for many candidates' bytes.
///
/// Bytes for all candidates are concatenated into one buffer; offsets,
/// rejection filters and content types are stored in parallel arrays so that
/// scanning metadata never touches the (much larger) byte buffer.
#[derive(Clone, Default)]
pub struct CandidateBatch {
    bytes: Vec<u8>,
    candidate_byte_offsets: Vec<u32>,
    filters: Vec<RejectionFilter>,
    content_types: Vec<ContentType>,
}

impl CandidateBatch {
    /// Create an empty batch, reserving `byte_capacity` bytes up front.
    pub fn new(byte_capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(64);
        offsets.push(0);
        CandidateBatch {
            bytes: Vec::with_capacity(byte_capacity),
            candidate_byte_offsets: offsets,
            filters: Vec::new(),
            content_types: Vec::new(),
        }
    }

    /// Append one candidate's bytes, computing and storing its rejection
    /// filter.
    pub fn append(&mut self, bytes: &[u8], content_type: ContentType) {
        self.bytes.extend_from_slice(bytes);
        self.candidate_byte_offsets
            .push(self.bytes.len() as u32);
        self.filters.push(RejectionFilter::from_bytes(bytes));
        self.content_types.push(content_type);
    }

    /// Number of candidates in this batch.
    pub fn len(&self) -> usize {
        self.content_types.len()
    }

    /// Whether this batch has no candidates.
    pub fn is_empty(&self) -> bool {
        self.content_types.is_empty()
    }

    /// Raw bytes of candidate `index`.
    pub fn bytes_at(&self, index: usize) -> &[u8] {
        let start = self.candidate_byte_offsets[index] as usize;
        let end = self.candidate_byte_offsets[index + 1] as usize;
        &self.bytes[start..end]
    }

    /// Zero-copy view of candidate `index`.
    pub fn candidate_at(&self, index: usize) -> Candidate<'_> {
        Candidate {
            bytes: self.bytes_at(index),
            content_type: self.content_types[index],
            rejection_filter: self.filters[index],
        }
    }

    /// Invoke `f` for every candidate index in `range`.
    pub fn enumerate(&self, range: std::ops::Range<usize>, mut f: impl FnMut(usize, Candidate<'_>)) {
        for i in range {
            f(i, self.candidate_at(i));
        }
    }
}

impl PartialEq for CandidateBatch {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        (0..self.len()).all(|i| {
            self.bytes_at(i) == other.bytes_at(i)
                && self.content_types[i] == other.content_types[i]
                && self.filters[i].bits() == other.filters[i].bits()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_appended_candidates() {
        let mut batch = CandidateBatch::new(64);
        batch.append(b"loadData", ContentType::CodeCompletionSymbol);
        batch.append(b"loadFile", ContentType::CodeCompletionSymbol);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.bytes_at(0), b"loadData");
        assert_eq!(batch.bytes_at(1), b"loadFile");
        assert_eq!(
            batch.candidate_at(0).content_type,
            ContentType::CodeCompletionSymbol
        );
    }

    #[test]
    fn empty_batch_has_zero_length() {
        let batch = CandidateBatch::new(0);
        assert!(batch.is_empty());
    }

    #[test]
    fn equal_batches_compare_equal() {
        let mut a = CandidateBatch::new(8);
        let mut b = CandidateBatch::new(8);
        a.append(b"foo", ContentType::FileName);
        b.append(b"foo", ContentType::FileName);
        assert_eq!(a, b);
    }
}
