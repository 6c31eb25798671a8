use thiserror::Error;

use crate::{Column, Page, Record};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("incomplete page: {observed} of {expected} records")]
    IncompletePage { observed: usize, expected: usize },
    #[error("page of {page_len} records overflows batch ({len} of {capacity} held)")]
    Overflow {
        page_len: usize,
        len: usize,
        capacity: usize,
    },
}

/// Column-oriented batch: one ordered vector per field, aligned by position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    pub id: Vec<String>,
    pub title: Vec<String>,
    pub summary: Vec<String>,
    pub time: Vec<String>,
    pub comment: Vec<String>,
    pub category: Vec<String>,
    pub authors: Vec<String>,
}

impl Batch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            id: Vec::with_capacity(capacity),
            title: Vec::with_capacity(capacity),
            summary: Vec::with_capacity(capacity),
            time: Vec::with_capacity(capacity),
            comment: Vec::with_capacity(capacity),
            category: Vec::with_capacity(capacity),
            authors: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn column(&self, column: Column) -> &[String] {
        match column {
            Column::Id => &self.id,
            Column::Title => &self.title,
            Column::Summary => &self.summary,
            Column::Time => &self.time,
            Column::Comment => &self.comment,
            Column::Category => &self.category,
            Column::Authors => &self.authors,
        }
    }

    /// Rebuild the record at position `index` from the seven columns.
    pub fn record(&self, index: usize) -> Option<Record> {
        Some(Record {
            id: self.id.get(index)?.clone(),
            title: self.title.get(index)?.clone(),
            published: self.time.get(index)?.clone(),
            category: self.category.get(index)?.clone(),
            authors: self.authors.get(index)?.clone(),
            summary: self.summary.get(index)?.clone(),
            comment: self.comment.get(index)?.clone(),
        })
    }

    /// True when all seven columns hold the same number of values.
    pub fn is_aligned(&self) -> bool {
        let len = self.len();
        Column::ALL
            .iter()
            .all(|column| self.column(*column).len() == len)
    }

    fn push(&mut self, record: Record) {
        for column in Column::ALL {
            let value = column.field(&record).to_string();
            self.column_mut(column).push(value);
        }
    }

    fn column_mut(&mut self, column: Column) -> &mut Vec<String> {
        match column {
            Column::Id => &mut self.id,
            Column::Title => &mut self.title,
            Column::Summary => &mut self.summary,
            Column::Time => &mut self.time,
            Column::Comment => &mut self.comment,
            Column::Category => &mut self.category,
            Column::Authors => &mut self.authors,
        }
    }
}

/// Collects complete pages into one batch until it reaches capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchAccumulator {
    capacity: usize,
    batch: Batch,
}

impl BatchAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            batch: Batch::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.batch.len() == self.capacity
    }

    /// Append every record of a complete page, in arrival order.
    pub fn append(&mut self, page: Page) -> Result<(), BatchError> {
        if !page.is_complete() {
            return Err(BatchError::IncompletePage {
                observed: page.len(),
                expected: page.requested_size,
            });
        }
        if self.len() + page.len() > self.capacity {
            return Err(BatchError::Overflow {
                page_len: page.len(),
                len: self.len(),
                capacity: self.capacity,
            });
        }
        for record in page.records {
            self.batch.push(record);
        }
        Ok(())
    }

    /// Hand out the accumulated columns and start over empty.
    pub fn drain(&mut self) -> Batch {
        std::mem::replace(&mut self.batch, Batch::with_capacity(self.capacity))
    }
}
