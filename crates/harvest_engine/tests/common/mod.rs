#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use harvest_core::{Batch, Record, Window};
use harvest_engine::{
    BatchWriter, DecodeError, DecodedPage, FailureKind, FetchError, HarvestEvent, PageDecoder,
    PageFetcher, PersistError, ProgressSink,
};

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

/// Fake search API: answers every window in full unless scripted otherwise,
/// and records each request.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

#[derive(Default)]
struct Script {
    calls: Vec<Window>,
    total: u64,
    short: HashMap<u64, u32>,
    transport: HashMap<u64, u32>,
    always_short: HashSet<u64>,
    always_fail: HashSet<u64>,
}

impl ScriptedApi {
    pub fn new(total: u64) -> Arc<Self> {
        let api = Self::default();
        api.script.lock().unwrap().total = total;
        Arc::new(api)
    }

    /// Answer the window at `offset` with half a page `times` times.
    pub fn short_times(&self, offset: u64, times: u32) {
        self.script.lock().unwrap().short.insert(offset, times);
    }

    pub fn fail_times(&self, offset: u64, times: u32) {
        self.script.lock().unwrap().transport.insert(offset, times);
    }

    pub fn always_short(&self, offset: u64) {
        self.script.lock().unwrap().always_short.insert(offset);
    }

    pub fn always_fail(&self, offset: u64) {
        self.script.lock().unwrap().always_fail.insert(offset);
    }

    pub fn calls(&self) -> Vec<Window> {
        self.script.lock().unwrap().calls.clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for ScriptedApi {
    async fn fetch_page(&self, _query: &str, window: Window) -> Result<Vec<u8>, FetchError> {
        let mut guard = self.script.lock().unwrap();
        let script = &mut *guard;
        script.calls.push(window);

        let offset = window.offset;
        let transient = match script.transport.get_mut(&offset) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        };
        if transient || script.always_fail.contains(&offset) {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(503),
                message: "503 Service Unavailable".to_string(),
            });
        }

        let short = match script.short.get_mut(&offset) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => script.always_short.contains(&offset),
        };
        let count = if short { window.size / 2 } else { window.size };
        Ok(format!("{} {} {}", offset, count, script.total).into_bytes())
    }
}

/// Decodes the `offset count total` bodies produced by [`ScriptedApi`].
pub struct ScriptedDecoder;

impl PageDecoder for ScriptedDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPage, DecodeError> {
        let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let fields: Vec<u64> = text
            .split_whitespace()
            .map(|field| field.parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let &[offset, count, total] = fields.as_slice() else {
            return Err(DecodeError::Malformed(text.to_string()));
        };
        Ok(DecodedPage {
            records: (offset..offset + count).map(record).collect(),
            total_results: Some(total),
        })
    }
}

pub fn record(n: u64) -> Record {
    Record {
        id: n.to_string(),
        title: format!("title {n}"),
        published: format!("2017-05-01T00:00:{:02}+00:00", n % 60),
        category: "astro-ph".to_string(),
        authors: format!("author {n}"),
        summary: format!("summary {n}"),
        comment: format!("comment {n}"),
    }
}

/// Collects every emitted event.
#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl TestSink {
    pub fn take(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Writer that keeps batches in memory and can be told to fail on an index.
#[derive(Default)]
pub struct MemoryWriter {
    written: Mutex<Vec<(usize, Batch)>>,
    fail_on: Option<usize>,
}

impl MemoryWriter {
    pub fn failing_on(batch_index: usize) -> Self {
        Self {
            fail_on: Some(batch_index),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<(usize, Batch)> {
        self.written.lock().unwrap().clone()
    }
}

impl BatchWriter for MemoryWriter {
    fn write_batch(&self, batch_index: usize, batch: &Batch) -> Result<PathBuf, PersistError> {
        if self.fail_on == Some(batch_index) {
            return Err(PersistError::OutputDir("disk full".to_string()));
        }
        self.written
            .lock()
            .unwrap()
            .push((batch_index, batch.clone()));
        Ok(PathBuf::from(format!("memory/batch_{batch_index}")))
    }
}
