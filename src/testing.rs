//! Scripted backend that records every call it receives.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::core::{BackendHandle, DfsBackend, FileList, Result};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Copy(String, String),
    CopyIn(String, Option<String>),
    CopyOut(String, Option<String>),
    Delete(Vec<String>),
    Stream(String, u64, Option<u64>),
    Read(String),
    Write(String, Vec<u8>),
    Rename(String, String),
    Exists(String),
    Size(String),
    ListFiles(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    Fail,
    Raise,
}

impl Outcome {
    fn apply(self, operation: &str) -> Result<bool> {
        match self {
            Outcome::Succeed => Ok(true),
            Outcome::Fail => Ok(false),
            Outcome::Raise => Err(anyhow!("{} raised by recording backend", operation)),
        }
    }
}

/// Mock backend: answers with scripted results and remembers the calls, in order.
#[derive(Debug)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    outcome: Outcome,
    write_outcome: Outcome,
    delete_outcome: Outcome,
    content: Option<Vec<u8>>,
    size: u64,
    entries: Vec<String>,
    scope: Option<String>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Outcome::Succeed,
            write_outcome: Outcome::Succeed,
            delete_outcome: Outcome::Succeed,
            content: Some(b"recorded contents".to_vec()),
            size: 0,
            entries: Vec::new(),
            scope: None,
        }
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of every boolean operation except `write` and `delete`.
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_write_outcome(mut self, outcome: Outcome) -> Self {
        self.write_outcome = outcome;
        self
    }

    pub fn with_delete_outcome(mut self, outcome: Outcome) -> Self {
        self.delete_outcome = outcome;
        self
    }

    /// Content returned by `read` and `stream`.
    pub fn with_content(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    /// Makes `read` and `size` fail as for a missing file.
    pub fn without_content(mut self) -> Self {
        self.content = None;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_entries(mut self, entries: &[&str]) -> Self {
        self.entries = entries.iter().map(|entry| entry.to_string()).collect();
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Wraps `self` into a handle, keeping a typed `Arc` to inspect the calls later.
    pub fn shared(self) -> (Arc<RecordingBackend>, BackendHandle) {
        let typed = Arc::new(self);
        let handle: BackendHandle = typed.clone();
        (typed, handle)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DfsBackend for RecordingBackend {
    fn copy_between_managed_storage(&self, src: &str, dst: &str) -> Result<bool> {
        self.record(Call::Copy(src.to_string(), dst.to_string()));
        self.outcome.apply("copy")
    }

    fn copy_in_from_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        self.record(Call::CopyIn(src.to_string(), dst.map(str::to_string)));
        self.outcome.apply("copy in")
    }

    fn copy_out_to_external(&self, src: &str, dst: Option<&str>) -> Result<bool> {
        self.record(Call::CopyOut(src.to_string(), dst.map(str::to_string)));
        self.outcome.apply("copy out")
    }

    fn delete(&self, paths: &[&str]) -> Result<bool> {
        self.record(Call::Delete(paths.iter().map(|p| p.to_string()).collect()));
        self.delete_outcome.apply("delete")
    }

    fn stream(
        &self,
        path: &str,
        offset: u64,
        length: Option<u64>,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        self.record(Call::Stream(path.to_string(), offset, length));
        if let Some(content) = &self.content {
            sink.write_all(content)?;
        }
        self.outcome.apply("stream")
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.record(Call::Read(path.to_string()));
        self.content
            .clone()
            .ok_or_else(|| anyhow!("{} does not exist", path))
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<bool> {
        self.record(Call::Write(path.to_string(), content.to_vec()));
        self.write_outcome.apply("write")
    }

    fn rename(&self, old_path: &str, new_path: &str) -> Result<bool> {
        self.record(Call::Rename(old_path.to_string(), new_path.to_string()));
        self.outcome.apply("rename")
    }

    fn exists(&self, path: &str) -> Result<bool> {
        self.record(Call::Exists(path.to_string()));
        self.outcome.apply("exists")
    }

    fn size(&self, path: &str) -> Result<u64> {
        self.record(Call::Size(path.to_string()));
        match self.content {
            Some(_) => Ok(self.size),
            None => Err(anyhow!("{} does not exist", path)),
        }
    }

    fn list_files(&self, base_path: &str) -> Result<FileList<'_>> {
        self.record(Call::ListFiles(base_path.to_string()));
        if self.outcome == Outcome::Raise {
            return Err(anyhow!("listing raised by recording backend"));
        }
        Ok(Box::new(
            self.entries.iter().cloned().map(Ok::<_, anyhow::Error>),
        ))
    }

    fn supports(&self, path: &str) -> bool {
        self.scope
            .as_deref()
            .is_some_and(|scope| path.starts_with(scope))
    }
}
