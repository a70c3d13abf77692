use crate::calculator::{CalculatorRecord, Document};
use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Name of the collection holding calculator documents.
pub const COLLECTION: &str = "Calculators";

/// Document store holding the calculator collection.
///
/// Calls are independent request/response operations: there is no
/// transaction, retry or cancellation. `update` merges the given fields into
/// the stored document (creating it when absent) and `delete` of an unknown
/// id succeeds.
#[async_trait]
pub trait CalculatorStore: Send + Sync {
    /// Store a whole new document under a fresh id and return that id.
    async fn create(&self, doc: Document) -> Result<String, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    async fn update(&self, id: &str, patch: Document) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError>;
}

/// Fetch one calculator, defaulting any field absent from the document.
pub async fn fetch_record(
    store: &dyn CalculatorStore,
    id: &str,
) -> Result<Option<CalculatorRecord>, StoreError> {
    match store.get(id).await? {
        Some(doc) => Ok(Some(CalculatorRecord::from_document(id, doc)?)),
        None => Ok(None),
    }
}

/// Fetch every calculator. Documents that cannot be decoded are skipped.
pub async fn fetch_all(store: &dyn CalculatorStore) -> Result<Vec<CalculatorRecord>, StoreError> {
    let docs = store.list_all().await?;
    let mut records = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        match CalculatorRecord::from_document(&id, doc) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping calculator: {}", e),
        }
    }
    Ok(records)
}

pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Field-level merge: nested objects are merged key by key, anything else in
/// `patch` replaces the stored value.
pub fn merge_document(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        if let Value::Object(incoming) = value {
            if let Some(Value::Object(existing)) = target.get_mut(&key) {
                merge_document(existing, incoming);
                continue;
            }
            target.insert(key, Value::Object(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

/// In-process store, used for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: impl IntoIterator<Item = (String, Document)>) -> Self {
        MemoryStore {
            docs: RwLock::new(docs.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CalculatorStore for MemoryStore {
    async fn create(&self, doc: Document) -> Result<String, StoreError> {
        let id = new_document_id();
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.insert(id.clone(), doc);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        Ok(docs.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        merge_document(docs.entry(id.to_string()).or_default(), patch);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.remove(id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        Ok(docs.iter().map(|(id, doc)| (id.clone(), doc.clone())).collect())
    }
}

/// Store backed by one pretty-printed JSON file per collection inside the
/// database directory (`<dir>/Calculators.json`).
///
/// Every operation reads the whole file and, for mutations, rewrites it. The
/// internal lock only orders calls made through this handle.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the collection, creating the directory and an empty collection
    /// file if they don't exist.
    pub fn open(database_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = database_dir.as_ref();
        if !dir.exists() {
            create_dir_all(dir)?;
        }

        let path = dir.join(format!("{}.json", COLLECTION));
        if !path.exists() {
            let mut file = File::create(&path)?;
            file.write_all(b"{}")?;
        }

        Ok(JsonFileStore {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_collection(&self) -> Result<BTreeMap<String, Document>, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_collection(&self, docs: &BTreeMap<String, Document>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(docs)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl CalculatorStore for JsonFileStore {
    async fn create(&self, doc: Document) -> Result<String, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut docs = self.read_collection()?;
        let id = new_document_id();
        docs.insert(id.clone(), doc);
        self.write_collection(&docs)?;
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut docs = self.read_collection()?;
        Ok(docs.remove(id))
    }

    async fn update(&self, id: &str, patch: Document) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut docs = self.read_collection()?;
        merge_document(docs.entry(id.to_string()).or_default(), patch);
        self.write_collection(&docs)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut docs = self.read_collection()?;
        if docs.remove(id).is_some() {
            self.write_collection(&docs)?;
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<(String, Document)>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_collection()?.into_iter().collect())
    }
}
