//! IMAP command tag generator.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tag generator for IMAP commands.
///
/// Produces `A001`, `A002`, … within one session. Numbers past 999 simply
/// widen (`A1000`); tags stay unique for the life of the generator.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU64,
    prefix: char,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            counter: AtomicU64::new(1),
            prefix,
        }
    }

    /// Generates the next tag.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n:03}", self.prefix)
    }

    /// Returns how many tags have been handed out.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed) - 1
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}
