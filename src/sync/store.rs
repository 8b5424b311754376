//! Document store collaborator: one JSON object per `(collection, id)`.

use football_api::Document;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::{
    collections::HashMap,
    sync::Mutex,
    sync::atomic::{AtomicBool, Ordering},
};

pub trait DocumentStore: Send + Sync {
    fn read(&self, collection: &str, document_id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or update a document. With `merge`, only the top-level keys of
    /// `document` are replaced on an existing document; otherwise the whole
    /// document is overwritten.
    fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: Document,
        merge: bool,
    ) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error, PathBuf),
    Serde(serde_json::Error, PathBuf),
    Corrupt(String),
    InvalidKey(String),
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e, path) => write!(f, "I/O error for {}: {e}", path.display()),
            StoreError::Serde(e, path) => write!(f, "JSON error for {}: {e}", path.display()),
            StoreError::Corrupt(msg) => write!(f, "Corrupt document: {msg}"),
            StoreError::InvalidKey(key) => write!(f, "Invalid collection or document id: {key:?}"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e, _) => Some(e),
            StoreError::Serde(e, _) => Some(e),
            _ => None,
        }
    }
}

/// Field-level upsert semantics shared by every store.
pub fn apply_upsert(existing: Option<Document>, document: Document, merge: bool) -> Document {
    match existing {
        Some(mut current) if merge => {
            current.extend(document);
            current
        }
        _ => document,
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each document as `<root>/<collection>/<id>.json`. Writes go to a
/// temporary sibling and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, collection: &str, document_id: &str) -> Result<PathBuf, StoreError> {
        validate_key(collection)?;
        validate_key(document_id)?;
        if self.root.is_file() {
            return Err(StoreError::Unavailable(format!(
                "{} is a file, not a directory",
                self.root.display()
            )));
        }
        Ok(self.root.join(collection).join(format!("{document_id}.json")))
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.chars().any(|c| matches!(c, '/' | '\\' | '\0'));
    if bad { Err(StoreError::InvalidKey(key.to_owned())) } else { Ok(()) }
}

fn read_file(path: &Path) -> Result<Option<Document>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::Io(e, path.to_owned())),
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(doc)) => Ok(Some(doc)),
        Ok(other) => Err(StoreError::Corrupt(format!(
            "{} holds {} instead of an object",
            path.display(),
            json_kind(&other)
        ))),
        Err(e) => Err(StoreError::Serde(e, path.to_owned())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, collection: &str, document_id: &str) -> Result<Option<Document>, StoreError> {
        read_file(&self.path_for(collection, document_id)?)
    }

    fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let path = self.path_for(collection, document_id)?;
        let existing = if merge { read_file(&path)? } else { None };
        let combined = apply_upsert(existing, document, merge);

        let dir = self.root.join(collection);
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io(e, dir.clone()))?;

        let body = serde_json::to_vec_pretty(&Value::Object(combined))
            .map_err(|e| StoreError::Serde(e, path.clone()))?;
        let tmp = dir.join(format!(".{document_id}.json.tmp"));
        fs::write(&tmp, body).map_err(|e| StoreError::Io(e, tmp.clone()))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Io(e, path.clone())
        })
    }
}

// ---------------------------------------------------------------------------
// In-memory store (tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(String, String), Document>>,
    fail_writes: AtomicBool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, collection: &str, document_id: &str, document: Document) -> Self {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert((collection.into(), document_id.into()), document);
        }
        self
    }

    /// Make every subsequent upsert fail, leaving stored documents untouched.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn get(&self, collection: &str, document_id: &str) -> Option<Document> {
        self.docs
            .lock()
            .ok()?
            .get(&(collection.to_owned(), document_id.to_owned()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or_default()
    }
}

#[cfg(test)]
impl DocumentStore for MemoryStore {
    fn read(&self, collection: &str, document_id: &str) -> Result<Option<Document>, StoreError> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(docs.get(&(collection.to_owned(), document_id.to_owned())).cloned())
    }

    fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes are disabled".into()));
        }
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        let key = (collection.to_owned(), document_id.to_owned());
        let combined = apply_upsert(docs.remove(&key), document, merge);
        docs.insert(key, combined);
        Ok(())
    }
}
