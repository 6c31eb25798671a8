use std::fmt;

use crate::Record;

/// Position of one request in the global result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub offset: u64,
    pub size: usize,
}

impl Window {
    pub fn new(offset: u64, size: usize) -> Self {
        Self { offset, size }
    }

    /// First offset past this window.
    pub fn end(&self) -> u64 {
        self.offset + self.size as u64
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// Records decoded from one response, plus the size that was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<Record>,
    pub requested_size: usize,
}

impl Page {
    pub fn new(records: Vec<Record>, requested_size: usize) -> Self {
        Self {
            records,
            requested_size,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A page is complete iff it holds exactly the requested number of records.
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.requested_size
    }
}
