//! Source line bookkeeping

use serde::{Deserialize, Serialize};

/// Running minimum/maximum of the lines occupied by visited prototypes.
///
/// Lines are 1-based. A fresh value holds the "nothing seen" sentinel
/// (`first = usize::MAX`, `last = 0`), which is what an empty file yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBounds {
    /// First line of the first prototype
    pub first: usize,
    /// Last line of the last prototype
    pub last: usize,
}

impl LineBounds {
    /// Widen the bounds to cover `start..=end`
    pub fn record(&mut self, start: usize, end: usize) {
        self.first = self.first.min(start);
        self.last = self.last.max(end.max(start));
    }

    /// Whether no line was ever recorded
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// The inclusive line range, if anything was recorded
    pub fn span(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            None
        } else {
            Some((self.first, self.last))
        }
    }

    /// Number of lines inside the region
    pub fn len(&self) -> usize {
        match self.span() {
            Some((first, last)) => last - first + 1,
            None => 0,
        }
    }
}

impl Default for LineBounds {
    fn default() -> Self {
        Self {
            first: usize::MAX,
            last: 0,
        }
    }
}

impl std::fmt::Display for LineBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span() {
            Some((first, last)) => write!(f, "{}-{}", first, last),
            None => write!(f, "<empty>"),
        }
    }
}
