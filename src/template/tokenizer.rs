//! Request path tokenizer.
//!
//! Splits a request path into segments without allocating for paths with up to
//! [`MAX_INLINE_SEGMENTS`] segments. One leading and one trailing `/` are ignored;
//! empty segments in between are preserved so that the matcher can reject them.

use smallvec::SmallVec;

/// Maximum number of path segments before heap allocation.
pub const MAX_INLINE_SEGMENTS: usize = 16;

/// Tokenized view over a request path
#[derive(Debug, Clone)]
pub struct PathTokenizer<'p> {
    /// Path text with the leading and trailing separator removed
    text: &'p str,
    /// Byte ranges of each segment inside `text`
    ranges: SmallVec<[(usize, usize); MAX_INLINE_SEGMENTS]>,
}

impl<'p> PathTokenizer<'p> {
    #[must_use]
    pub fn new(path: &'p str) -> Self {
        let rest = path.strip_prefix('/').unwrap_or(path);
        let mut ranges = SmallVec::new();
        if rest.is_empty() {
            return Self { text: rest, ranges };
        }

        let text = rest.strip_suffix('/').unwrap_or(rest);
        let mut start = 0;
        for (i, b) in text.bytes().enumerate() {
            if b == b'/' {
                ranges.push((start, i));
                start = i + 1;
            }
        }
        ranges.push((start, text.len()));

        Self { text, ranges }
    }

    /// Number of segments in the path
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.ranges.len()
    }

    /// Segment at `index`, if any
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'p str> {
        let (start, end) = *self.ranges.get(index)?;
        self.text.get(start..end)
    }

    /// Raw path text from the start of segment `index` to the end of the path
    #[must_use]
    pub fn remainder(&self, index: usize) -> Option<&'p str> {
        let (start, _) = *self.ranges.get(index)?;
        self.text.get(start..)
    }

    /// Iterate over all segments in order
    pub fn iter(&self) -> impl Iterator<Item = &'p str> + '_ {
        (0..self.count()).filter_map(move |i| self.get(i))
    }
}
