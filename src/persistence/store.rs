//! Document store backends

use std::collections::BTreeMap;

use super::document::{Document, merge_objects};

/// A collection-of-documents database, in the shape of a hosted document
/// store: documents are JSON objects addressed by collection and ID.
pub trait DocumentStore {
    /// Insert a new document under a generated ID, returning the ID
    fn add(&mut self, collection: &str, doc: Document) -> crate::Result<String>;
    fn get(&self, collection: &str, id: &str) -> crate::Result<Option<Document>>;
    /// Create or merge into the document at `id`
    fn set_merge(&mut self, collection: &str, id: &str, doc: Document) -> crate::Result<()>;
    /// Every document in a collection, by ID
    fn list(&self, collection: &str) -> crate::Result<Vec<(String, Document)>>;
}

/// Whole database as plain data; shared by the in-memory, file and
/// LocalStorage backends
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Database {
    collections: BTreeMap<String, BTreeMap<String, Document>>,
    next_id: u64,
}

impl Database {
    fn add(&mut self, collection: &str, doc: Document) -> String {
        self.next_id += 1;
        let id = format!("{:08}", self.next_id);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        id
    }

    fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections.get(collection)?.get(id).cloned()
    }

    fn set_merge(&mut self, collection: &str, id: &str, doc: Document) {
        let docs = self.collections.entry(collection.to_string()).or_default();
        match docs.get_mut(id) {
            Some(existing) => merge_objects(existing, doc),
            None => {
                docs.insert(id.to_string(), doc);
            }
        }
    }

    fn list(&self, collection: &str) -> Vec<(String, Document)> {
        self.collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, d)| (id.clone(), d.clone())).collect())
            .unwrap_or_default()
    }

    /// Parse a stored database, starting over if it is unreadable
    pub fn parse_or_reset(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(db) => db,
            Err(e) => {
                log::warn!("Discarding unreadable score database: {e}");
                Self::default()
            }
        }
    }
}

/// Volatile store for tests and offline play
#[derive(Debug, Default)]
pub struct MemoryStore {
    db: Database,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn add(&mut self, collection: &str, doc: Document) -> crate::Result<String> {
        Ok(self.db.add(collection, doc))
    }

    fn get(&self, collection: &str, id: &str) -> crate::Result<Option<Document>> {
        Ok(self.db.get(collection, id))
    }

    fn set_merge(&mut self, collection: &str, id: &str, doc: Document) -> crate::Result<()> {
        self.db.set_merge(collection, id, doc);
        Ok(())
    }

    fn list(&self, collection: &str) -> crate::Result<Vec<(String, Document)>> {
        Ok(self.db.list(collection))
    }
}

/// Whole database in one JSON file, rewritten on every change
#[cfg(not(target_arch = "wasm32"))]
pub struct JsonFileStore {
    path: std::path::PathBuf,
    db: Database,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileStore {
    /// Open the file at `path`, starting empty if it doesn't exist yet
    pub fn open(path: impl Into<std::path::PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let db = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Database::default(),
            Err(e) => return Err(e.into()),
        };
        log::info!("Opened score store at {}", path.display());
        Ok(Self { path, db })
    }

    /// Apply `change` to a copy of the database and keep it only once it is
    /// on disk
    fn commit<T>(&mut self, change: impl FnOnce(&mut Database) -> T) -> crate::Result<T> {
        let mut next = self.db.clone();
        let out = change(&mut next);
        self.write(&next)?;
        self.db = next;
        Ok(out)
    }

    fn write(&self, db: &Database) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(db)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DocumentStore for JsonFileStore {
    fn add(&mut self, collection: &str, doc: Document) -> crate::Result<String> {
        self.commit(|db| db.add(collection, doc))
    }

    fn get(&self, collection: &str, id: &str) -> crate::Result<Option<Document>> {
        Ok(self.db.get(collection, id))
    }

    fn set_merge(&mut self, collection: &str, id: &str, doc: Document) -> crate::Result<()> {
        self.commit(|db| db.set_merge(collection, id, doc))
    }

    fn list(&self, collection: &str) -> crate::Result<Vec<(String, Document)>> {
        Ok(self.db.list(collection))
    }
}

/// Whole database under one LocalStorage key
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn load(&self) -> crate::Result<Database> {
        Ok(crate::platform::web::storage_get(&self.key)
            .map(|json| Database::parse_or_reset(&json))
            .unwrap_or_default())
    }

    fn save(&self, db: &Database) -> crate::Result<()> {
        let json = serde_json::to_string(db)?;
        crate::platform::web::storage_set(&self.key, &json)
    }
}

#[cfg(target_arch = "wasm32")]
impl DocumentStore for LocalStorageStore {
    fn add(&mut self, collection: &str, doc: Document) -> crate::Result<String> {
        let mut db = self.load()?;
        let id = db.add(collection, doc);
        self.save(&db)?;
        Ok(id)
    }

    fn get(&self, collection: &str, id: &str) -> crate::Result<Option<Document>> {
        Ok(self.load()?.get(collection, id))
    }

    fn set_merge(&mut self, collection: &str, id: &str, doc: Document) -> crate::Result<()> {
        let mut db = self.load()?;
        db.set_merge(collection, id, doc);
        self.save(&db)
    }

    fn list(&self, collection: &str) -> crate::Result<Vec<(String, Document)>> {
        Ok(self.load()?.list(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_memory_add_and_list() {
        let mut store = MemoryStore::new();
        let a = store.add("scores", doc(json!({"score": 5}))).unwrap();
        let b = store.add("scores", doc(json!({"score": 9}))).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list("scores").unwrap().len(), 2);
        assert!(store.list("missing").unwrap().is_empty());
        assert_eq!(store.get("scores", &b).unwrap().unwrap()["score"], 9);
    }

    #[test]
    fn test_set_merge_creates_then_merges() {
        let mut store = MemoryStore::new();
        store
            .set_merge("userProgress", "u1", doc(json!({"a": {"x": 1}})))
            .unwrap();
        store
            .set_merge("userProgress", "u1", doc(json!({"a": {"y": 2}})))
            .unwrap();
        let stored = store.get("userProgress", "u1").unwrap().unwrap();
        assert_eq!(stored["a"], json!({"x": 1, "y": 2}));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("vowel_drop_store_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.add("obstacle_game", doc(json!({"score": 40}))).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        let docs = store.list("obstacle_game").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].1["score"], 40);
        let _ = std::fs::remove_file(path);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = std::env::temp_dir().join(format!("vowel_drop_missing_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = JsonFileStore::open(dir.join("db.json")).unwrap();

        assert!(store.add("obstacle_game", doc(json!({"score": 5}))).is_err());
        assert!(store.list("obstacle_game").unwrap().is_empty());
        assert!(
            store
                .set_merge("userProgress", "u1", doc(json!({"a": 1})))
                .is_err()
        );
        assert_eq!(store.get("userProgress", "u1").unwrap(), None);
        assert!(!dir.exists());
    }

    #[test]
    fn test_corrupt_database_starts_over() {
        let db = Database::parse_or_reset("{\"collections\": [");
        assert_eq!(db, Database::default());

        let mut good = Database::default();
        good.add("scores", doc(json!({"score": 1})));
        let json = serde_json::to_string(&good).unwrap();
        assert_eq!(Database::parse_or_reset(&json), good);
    }
}
