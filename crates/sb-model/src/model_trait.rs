//! Widget model trait abstraction for testability
//!
//! Provides a trait-based interface for the host-owned widget model,
//! allowing for real (host-bound) and local (in-memory, file-backed)
//! implementations.
//!
//! The contract mirrors the host side: `get` reads the currently bound
//! value, `set` stages a change, and `save_changes` asks the host to
//! persist everything staged so far. Staged values are visible to `get`
//! immediately, before any save.

use parking_lot::Mutex;
use sb_types::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Trait for the host-owned widget model
pub trait WidgetModel: Send + Sync {
    /// Read the value currently bound to `key`, staged or persisted.
    fn get(&self, key: &str) -> AppResult<Option<Value>>;

    /// Stage a new value for `key`.
    fn set(&self, key: &str, value: Value) -> AppResult<()>;

    /// Ask the host to persist all staged changes.
    ///
    /// Failures should surface as `AppError::Persistence` so callers can
    /// distinguish a lost save from a bad read or write.
    fn save_changes(&self) -> AppResult<()>;
}

/// In-memory model for tests and standalone hosting
///
/// Staged values and the persisted snapshot are tracked separately so
/// callers can observe exactly what `save_changes` flushed, and every
/// persistence request is counted. `fail_next_save` injects a one-shot
/// save failure.
#[derive(Clone, Default)]
pub struct MemoryModel {
    inner: Arc<Mutex<MemoryModelInner>>,
}

#[derive(Default)]
struct MemoryModelInner {
    staged: HashMap<String, Value>,
    persisted: HashMap<String, Value>,
    save_count: usize,
    fail_next_save: bool,
}

impl MemoryModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value as both staged and persisted.
    pub fn with_value(self, key: &str, value: Value) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.staged.insert(key.to_string(), value.clone());
            inner.persisted.insert(key.to_string(), value);
        }
        self
    }

    /// Number of times `save_changes` has been requested.
    pub fn save_count(&self) -> usize {
        self.inner.lock().save_count
    }

    /// Value of `key` as of the last successful `save_changes`.
    pub fn persisted(&self, key: &str) -> Option<Value> {
        self.inner.lock().persisted.get(key).cloned()
    }

    /// Make the next `save_changes` call fail.
    pub fn fail_next_save(&self) {
        self.inner.lock().fail_next_save = true;
    }
}

impl WidgetModel for MemoryModel {
    fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.inner.lock().staged.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> AppResult<()> {
        trace!("MemoryModel: staged {}", key);
        self.inner.lock().staged.insert(key.to_string(), value);
        Ok(())
    }

    fn save_changes(&self) -> AppResult<()> {
        let mut inner = self.inner.lock();
        inner.save_count += 1;
        if inner.fail_next_save {
            inner.fail_next_save = false;
            return Err(AppError::Persistence(
                "save_changes failed (injected)".to_string(),
            ));
        }
        inner.persisted = inner.staged.clone();
        debug!("MemoryModel: persisted {} keys", inner.persisted.len());
        Ok(())
    }
}

/// File-backed model for development hosting
///
/// Staged values live in memory; `save_changes` flushes the whole map to a
/// JSON file. Intended for standalone development hosts; in a real
/// deployment the model belongs to the host application.
#[derive(Clone, Debug)]
pub struct FileModel {
    file_path: Arc<PathBuf>,
    staged: Arc<Mutex<HashMap<String, Value>>>,
}

impl FileModel {
    /// Create a file-backed model, loading existing state if present.
    pub fn new(file_path: PathBuf) -> AppResult<Self> {
        let model = Self {
            file_path: Arc::new(file_path.clone()),
            staged: Arc::new(Mutex::new(HashMap::new())),
        };

        if file_path.exists() {
            model.load_from_file()?;
        } else {
            warn!(
                "FileModel: state file does not exist, will create on first save: {}",
                file_path.display()
            );
        }

        Ok(model)
    }

    fn load_from_file(&self) -> AppResult<()> {
        let contents = fs::read_to_string(self.file_path.as_ref())
            .map_err(|e| AppError::Model(format!("Failed to read state file: {}", e)))?;

        // Empty file reads as an empty model
        let data: HashMap<String, Value> = if contents.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&contents)
                .map_err(|e| AppError::Model(format!("Failed to parse state file: {}", e)))?
        };

        let mut staged = self.staged.lock();
        *staged = data;
        debug!(
            "FileModel: loaded {} keys from {}",
            staged.len(),
            self.file_path.display()
        );

        Ok(())
    }
}

impl WidgetModel for FileModel {
    fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.staged.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> AppResult<()> {
        trace!("FileModel: staged {}", key);
        self.staged.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn save_changes(&self) -> AppResult<()> {
        let staged = self.staged.lock();

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Persistence(format!("Failed to create state directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(&*staged)
            .map_err(|e| AppError::Persistence(format!("Failed to serialize state: {}", e)))?;

        fs::write(self.file_path.as_ref(), contents)
            .map_err(|e| AppError::Persistence(format!("Failed to write state file: {}", e)))?;

        debug!(
            "FileModel: saved {} keys to {}",
            staged.len(),
            self.file_path.display()
        );
        Ok(())
    }
}
