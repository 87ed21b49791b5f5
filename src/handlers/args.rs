//! Command argument tokenizing and pooling.
//!
//! Arguments are split on whitespace except inside a double-quoted span,
//! where `""` is a literal quote and everything else is copied verbatim. A
//! quoted empty span (`""`) still produces an empty argument. An unterminated
//! quote runs to the end of the input.
//!
//! Tokens land in an [`ArgumentSlice`], a fixed-capacity buffer handed out by
//! an [`ArgumentPool`] so steady-state dispatch reuses the same allocations.

use std::ops::Deref;

/// Fixed-capacity list of arguments for one invocation.
#[derive(Debug)]
pub struct ArgumentSlice {
    items: Vec<String>,
    capacity: usize,
}

impl ArgumentSlice {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a token. Returns false, dropping the token, when full.
    pub fn push(&mut self, token: String) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push(token);
        true
    }

    /// Argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

impl Deref for ArgumentSlice {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.items
    }
}

/// Recycles [`ArgumentSlice`] buffers.
#[derive(Debug)]
pub struct ArgumentPool {
    free: Vec<ArgumentSlice>,
    slice_capacity: usize,
    max_pooled: usize,
}

impl ArgumentPool {
    /// Pool of slices holding up to `slice_capacity` arguments each, keeping
    /// at most `max_pooled` idle slices.
    pub fn new(slice_capacity: usize, max_pooled: usize) -> Self {
        Self {
            free: Vec::with_capacity(max_pooled),
            slice_capacity,
            max_pooled,
        }
    }

    /// Take an empty slice, reusing a pooled one when available.
    pub fn acquire(&mut self) -> ArgumentSlice {
        self.free
            .pop()
            .unwrap_or_else(|| ArgumentSlice::with_capacity(self.slice_capacity))
    }

    /// Return a slice. It is cleared before it can be handed out again.
    pub fn release(&mut self, mut slice: ArgumentSlice) {
        slice.clear();
        if self.free.len() < self.max_pooled && slice.capacity == self.slice_capacity {
            self.free.push(slice);
        }
    }

    /// Idle slices ready for reuse.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// Split `input` into `out`. Returns the number of tokens dropped because
/// `out` was full.
pub fn tokenize(input: &str, out: &mut ArgumentSlice) -> usize {
    let mut dropped = 0;
    let mut current = String::new();
    let mut started = false;
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    let mut flush = |current: &mut String, out: &mut ArgumentSlice| {
        if !out.push(std::mem::take(current)) {
            dropped += 1;
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                current.push(c);
            } else if chars.peek() == Some(&'"') {
                chars.next();
                current.push('"');
            } else {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
            started = true;
        } else if c.is_whitespace() {
            if started {
                flush(&mut current, out);
                started = false;
            }
        } else {
            current.push(c);
            started = true;
        }
    }
    if started {
        flush(&mut current, out);
    }

    dropped
}
