//! Source spans.
//!
//! A `Span` is a half-open byte range `[start, end)` into the source text.
//! Nodes synthesized by the checker carry `Span::SYNTHETIC`.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span used for nodes that have no source text.
    pub const SYNTHETIC: Span = Span {
        start: u32::MAX,
        end: u32::MAX,
    };

    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn at(pos: u32) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.start == u32::MAX
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        if self.is_synthetic() {
            return other;
        }
        if other.is_synthetic() {
            return self;
        }
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ignores_synthetic_side() {
        let real = Span::new(4, 9);
        assert_eq!(real.merge(Span::SYNTHETIC), real);
        assert_eq!(Span::SYNTHETIC.merge(real), real);
        assert_eq!(Span::new(1, 3).merge(real), Span::new(1, 9));
        assert_eq!(real.len(), 5);
    }
}
