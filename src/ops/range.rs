//! Range Iterator
//!
//! Turns the engine's cursor primitives into a bounded, directional,
//! paginated scan.
//!
//! ## Semantics
//! - `start` picks where traversal begins; an exclusive start skips an exact
//!   match
//! - `end` stops traversal: an exact match is emitted only when inclusive,
//!   a key past it is never emitted
//! - `limit` caps the number of emitted items (at most [`MAX_SCAN_LIMIT`])
//! - `truncated` reports that the cap stopped the scan while the next key
//!   would still have been inside the end bound; without an end bound it is
//!   always false
//!
//! ```text
//!  Forward:   a   b   c   d   e        start=Included(b) end=Excluded(e)
//!                 ^───────────┤           emits b, c, d
//!  Backward:  a   b   c   d   e        start=Excluded(d) end=Included(a)
//!             ├───────────^               emits c, b, a
//! ```

use std::cmp::Ordering;
use std::ops::{Bound, ControlFlow};

use crate::error::Result;
use crate::store::{KvCursor, KvRead};

/// Hard cap on items returned by one scan
pub const MAX_SCAN_LIMIT: usize = 1000;

/// Traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending key order
    #[default]
    Forward,
    /// Descending key order
    Backward,
}

/// A fully resolved range scan
///
/// The limit is clamped to [`MAX_SCAN_LIMIT`] on construction, whatever the
/// caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    start: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
    direction: Direction,
    limit: usize,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
            direction: Direction::Forward,
            limit: MAX_SCAN_LIMIT,
        }
    }
}

impl ScanRequest {
    pub fn new(
        start: Bound<Vec<u8>>,
        end: Bound<Vec<u8>>,
        direction: Direction,
        limit: usize,
    ) -> Self {
        Self {
            start,
            end,
            direction,
            limit: limit.min(MAX_SCAN_LIMIT),
        }
    }

    /// Unbounded ascending scan of up to [`MAX_SCAN_LIMIT`] items
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: Bound<Vec<u8>>) -> Self {
        self.start = start;
        self
    }

    pub fn with_end(mut self, end: Bound<Vec<u8>>) -> Self {
        self.end = end;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the item cap (clamped)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_SCAN_LIMIT);
        self
    }

    pub fn start(&self) -> &Bound<Vec<u8>> {
        &self.start
    }

    pub fn end(&self) -> &Bound<Vec<u8>> {
        &self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Collected outcome of a scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Key/value pairs in traversal order
    pub items: Vec<(Vec<u8>, Vec<u8>)>,
    /// The limit cut the scan short of its end bound
    pub truncated: bool,
}

/// Outcome of a streaming scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub emitted: usize,
    pub truncated: bool,
}

/// Where a key sits relative to the end bound, in traversal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCheck {
    /// Not yet at the end (always the case without an end bound)
    Before,
    /// Exactly the end key
    At { inclusive: bool },
    /// Beyond the end
    Past,
}

impl EndCheck {
    /// Whether a key in this position gets emitted
    fn admits(self) -> bool {
        match self {
            EndCheck::Before => true,
            EndCheck::At { inclusive } => inclusive,
            EndCheck::Past => false,
        }
    }

    /// Whether traversal ends at this position
    fn is_terminal(self) -> bool {
        !matches!(self, EndCheck::Before)
    }
}

/// The one end-bound predicate, used both for emit decisions and for the
/// truncation check at the limit
fn check_end(key: &[u8], end: &Bound<Vec<u8>>, direction: Direction) -> EndCheck {
    let (end_key, inclusive) = match end {
        Bound::Unbounded => return EndCheck::Before,
        Bound::Included(k) => (k, true),
        Bound::Excluded(k) => (k, false),
    };

    match (key.cmp(end_key.as_slice()), direction) {
        (Ordering::Equal, _) => EndCheck::At { inclusive },
        (Ordering::Less, Direction::Forward) | (Ordering::Greater, Direction::Backward) => {
            EndCheck::Before
        }
        _ => EndCheck::Past,
    }
}

fn step<C: KvCursor>(cursor: &mut C, direction: Direction) -> Result<()> {
    match direction {
        Direction::Forward => cursor.next(),
        Direction::Backward => cursor.prev(),
    }
}

/// Place the cursor on the first key the scan may emit.
///
/// Engine seek always lands on the first key >= target, which is right for
/// forward scans. Backward scans need the last key <= target, so the
/// landing spot is corrected: off the end means "start from the last key",
/// and overshooting the target means "step back once". An exclusive start
/// then skips an exact match in either direction.
fn position<C: KvCursor>(
    cursor: &mut C,
    start: &Bound<Vec<u8>>,
    direction: Direction,
) -> Result<()> {
    let (target, exclusive) = match start {
        Bound::Unbounded => {
            return match direction {
                Direction::Forward => cursor.seek_to_first(),
                Direction::Backward => cursor.seek_to_last(),
            };
        }
        Bound::Included(k) => (k.as_slice(), false),
        Bound::Excluded(k) => (k.as_slice(), true),
    };

    cursor.seek(target)?;

    if direction == Direction::Backward {
        let landed = cursor.current().map(|(key, _)| key.cmp(target));
        match landed {
            None => cursor.seek_to_last()?,
            Some(Ordering::Greater) => cursor.prev()?,
            Some(_) => {}
        }
    }

    if exclusive && cursor.current().is_some_and(|(key, _)| key == target) {
        step(cursor, direction)?;
    }

    Ok(())
}

/// Bounded, directional scan over any readable store
pub struct RangeIterator<'a, S> {
    store: &'a S,
}

impl<'a, S: KvRead> RangeIterator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Run a scan, handing each item to `emit` in traversal order.
    ///
    /// `emit` may return `ControlFlow::Break` to stop early; that is not
    /// truncation. A cursor error aborts the scan; items already emitted
    /// stay emitted.
    pub fn scan_with<F>(&self, request: &ScanRequest, mut emit: F) -> Result<ScanSummary>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        let mut cursor = self.store.cursor()?;
        position(&mut cursor, &request.start, request.direction)?;

        let has_end = !matches!(request.end, Bound::Unbounded);
        let mut summary = ScanSummary::default();

        while let Some((key, value)) = cursor.current() {
            let check = check_end(key, &request.end, request.direction);

            // The limit is checked before the end bound: a scan whose limit
            // and end land on the same key reports no truncation
            if summary.emitted >= request.limit {
                summary.truncated = has_end && check.admits();
                break;
            }

            if !check.admits() {
                break;
            }

            summary.emitted += 1;
            if emit(key, value).is_break() || check.is_terminal() {
                break;
            }

            step(&mut cursor, request.direction)?;
        }

        Ok(summary)
    }

    /// Run a scan and collect its items
    pub fn scan(&self, request: &ScanRequest) -> Result<ScanResult> {
        let mut items = Vec::with_capacity(request.limit.min(64));
        let summary = self.scan_with(request, |key, value| {
            items.push((key.to_vec(), value.to_vec()));
            ControlFlow::Continue(())
        })?;

        Ok(ScanResult {
            items,
            truncated: summary.truncated,
        })
    }
}
