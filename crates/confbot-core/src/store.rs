use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Need, NeedId},
    errors::Error,
    ports::NeedStore,
    Result,
};

/// In-memory need table shared by both store implementations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct NeedBook {
    /// Next id to hand out; ids are never reused, even after deletion.
    next_id: u64,
    needs: Vec<Need>,
}

impl NeedBook {
    fn create(&mut self, requester: &str, text: &str) -> NeedId {
        // Ids start at 1.
        self.next_id = self.next_id.max(1);
        let id = NeedId(self.next_id);
        self.next_id += 1;
        self.needs.push(Need {
            id,
            requester: requester.to_string(),
            text: text.to_string(),
        });
        id
    }

    fn delete(&mut self, id: NeedId, requester: &str) -> bool {
        let before = self.needs.len();
        self.needs
            .retain(|n| !(n.id == id && n.requester == requester));
        self.needs.len() != before
    }

    /// Repair books written by hand or by older versions.
    fn normalize(&mut self) {
        self.needs.sort_by_key(|n| n.id);
        let max_id = self.needs.last().map(|n| n.id.0).unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
    }
}

fn lock_book(book: &Mutex<NeedBook>) -> Result<MutexGuard<'_, NeedBook>> {
    book.lock()
        .map_err(|_| Error::External("need store lock poisoned".to_string()))
}

// ============== Memory Store ==============

/// Volatile store (tests, dry runs).
#[derive(Debug, Default)]
pub struct MemoryNeedStore {
    book: Mutex<NeedBook>,
}

impl MemoryNeedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NeedStore for MemoryNeedStore {
    fn create_need(&self, requester: &str, text: &str) -> Result<NeedId> {
        Ok(lock_book(&self.book)?.create(requester, text))
    }

    fn list_needs(&self) -> Result<Vec<Need>> {
        Ok(lock_book(&self.book)?.needs.clone())
    }

    fn delete_need(&self, id: NeedId, requester: &str) -> Result<bool> {
        Ok(lock_book(&self.book)?.delete(id, requester))
    }
}

// ============== JSON File Store ==============

/// Persistent store keeping every need in one JSON document.
///
/// The file is rewritten after each mutation; the in-memory copy only changes
/// once the write succeeded.
#[derive(Debug)]
pub struct JsonNeedStore {
    path: PathBuf,
    book: Mutex<NeedBook>,
}

impl JsonNeedStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let book = load_book(&path)?.unwrap_or_default();
        Ok(Self {
            path,
            book: Mutex::new(book),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut NeedBook) -> T) -> Result<T> {
        let mut guard = lock_book(&self.book)?;
        let mut next = guard.clone();
        let out = op(&mut next);
        save_book(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

impl NeedStore for JsonNeedStore {
    fn create_need(&self, requester: &str, text: &str) -> Result<NeedId> {
        self.mutate(|book| book.create(requester, text))
    }

    fn list_needs(&self) -> Result<Vec<Need>> {
        Ok(lock_book(&self.book)?.needs.clone())
    }

    fn delete_need(&self, id: NeedId, requester: &str) -> Result<bool> {
        let mut guard = lock_book(&self.book)?;
        let mut next = guard.clone();
        if !next.delete(id, requester) {
            return Ok(false);
        }
        save_book(&self.path, &next)?;
        *guard = next;
        Ok(true)
    }
}

fn load_book(path: &Path) -> Result<Option<NeedBook>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let mut book: NeedBook = serde_json::from_str(&txt).map_err(|e| Error::Store {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    book.normalize();
    Ok(Some(book))
}

/// Write to a sibling temp file, then rename it over `path`, so a crash
/// mid-write leaves the previous book in place.
fn save_book(path: &Path, book: &NeedBook) -> Result<()> {
    let txt = serde_json::to_string_pretty(book)?;
    let tmp = temp_path(path);
    let store_err = |e: std::io::Error| Error::Store {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = File::create(&tmp).map_err(store_err)?;
    file.write_all(txt.as_bytes()).map_err(store_err)?;
    file.sync_all().map_err(store_err)?;
    drop(file);

    fs::rename(&tmp, path).map_err(store_err)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
