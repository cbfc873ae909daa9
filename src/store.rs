//! Flat append-only JSON store for extracted records.
//!
//! The whole store is one file, `{ "nextId": n, "records": [...] }`.
//! Ids are never reused: deleting a record leaves a gap.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::result::ProductRecord;
use crate::url_utils::SourceUrl;

/// One stored record with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: u64,
    pub scraped_at: DateTime<Utc>,
    /// Lowercased host without `www.`.
    pub domain: Option<String>,
    #[serde(flatten)]
    pub record: ProductRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    next_id: u64,
    records: Vec<StoredRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// File-backed record store. Every operation reads the file fresh.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// A store at `path`. The file is created on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Assign the next id, stamp time and domain, and persist.
    pub fn append(&self, record: ProductRecord) -> Result<StoredRecord> {
        let mut file = self.load()?;
        let stored = StoredRecord {
            id: file.next_id,
            scraped_at: Utc::now(),
            domain: SourceUrl::new(&record.source_url).host().map(str::to_string),
            record,
        };
        file.next_id += 1;
        file.records.push(stored.clone());
        self.save(&file)?;

        tracing::debug!(id = stored.id, path = %self.path.display(), "record stored");
        Ok(stored)
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.load()?.records)
    }

    pub fn get(&self, id: u64) -> Result<Option<StoredRecord>> {
        Ok(self.load()?.records.into_iter().find(|r| r.id == id))
    }

    /// Remove a record. Returns whether it existed. Other ids are untouched.
    pub fn delete(&self, id: u64) -> Result<bool> {
        let mut file = self.load()?;
        let before = file.records.len();
        file.records.retain(|r| r.id != id);
        if file.records.len() == before {
            return Ok(false);
        }
        self.save(&file)?;
        Ok(true)
    }

    fn load(&self) -> Result<StoreFile> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreFile::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a sibling temp file, then rename over the store.
    fn save(&self, file: &StoreFile) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(file)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ExtractionTrace, LifeStage, PetType};

    fn record(url: &str) -> ProductRecord {
        ProductRecord {
            source_url: url.to_string(),
            brand: "Acana".to_string(),
            name: Some("Wild Prairie".to_string()),
            size: None,
            image_url: "https://cdn.example.com/a.jpg".to_string(),
            pet_type: PetType::Dog,
            texture: "dry".to_string(),
            life_stage: LifeStage::Adult,
            ingredients: Some(vec!["Chicken".to_string(), "Turkey".to_string()]),
            ingredients_note: None,
            guaranteed_analysis: None,
            caloric_info: None,
            extraction_trace: ExtractionTrace::default(),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::open(dir.path().join("records.json"));
        assert!(store.list().expect("store io").is_empty());
        assert!(!store.delete(1).expect("store io"));
    }

    #[test]
    fn append_assigns_ids_and_domain() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::open(dir.path().join("records.json"));

        let first = store.append(record("https://www.chewy.com/acana/dp/1")).expect("store io");
        let second = store.append(record("https://petco.com/p/2")).expect("store io");

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.domain.as_deref(), Some("chewy.com"));
        assert_eq!(store.list().expect("store io").len(), 2);
        let fetched = store.get(2).expect("store io");
        assert_eq!(fetched.map(|r| r.record.source_url).as_deref(), Some("https://petco.com/p/2"));
    }

    #[test]
    fn delete_leaves_a_gap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonStore::open(dir.path().join("nested/records.json"));
        for n in 0..3 {
            store.append(record(&format!("https://example.com/{n}"))).expect("store io");
        }

        assert!(store.delete(2).expect("store io"));
        let ids: Vec<u64> = store.list().expect("store io").iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let next = store.append(record("https://example.com/4")).expect("store io");
        assert_eq!(next.id, 4);
    }

    #[test]
    fn file_layout_is_flat() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.json");
        let store = JsonStore::open(&path);
        store.append(record("https://example.com/1")).expect("store io");

        let content = fs::read_to_string(&path).expect("store file");
        let raw: serde_json::Value = serde_json::from_str(&content).expect("store json");
        assert_eq!(raw["nextId"], 2);
        assert_eq!(raw["records"][0]["id"], 1);
        assert_eq!(raw["records"][0]["brand"], "Acana");
        assert!(raw["records"][0]["scrapedAt"].is_string());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
