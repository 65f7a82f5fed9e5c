//! # Template Store
//!
//! Saved label designs, addressed by id.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`MemoryStore`] | in-process map, for tests and embedding |
//! | [`DirStore`] | one `<id>.json` file per template in a directory |
//!
//! Ids are random UUIDs. The stored JSON is kept verbatim; it is only
//! parsed when a template is loaded for rendering.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EtiquetaError;
use crate::template::Template;

/// One saved template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub id: String,
    pub name: String,
    pub template_json: String,
}

impl StoredTemplate {
    /// Parse the stored JSON.
    pub fn template(&self) -> Result<Template, EtiquetaError> {
        let mut template = Template::from_json(&self.template_json)?;
        if template.name.is_none() && !self.name.is_empty() {
            template.name = Some(self.name.clone());
        }
        Ok(template)
    }
}

pub trait TemplateStore {
    /// Look up a template by id.
    fn load(&self, id: &str) -> Result<StoredTemplate, EtiquetaError>;

    /// Save a new template and return its id.
    fn save(&mut self, name: &str, json: &str) -> Result<String, EtiquetaError>;

    /// Every saved template, ordered by name then id.
    fn list_all(&self) -> Result<Vec<StoredTemplate>, EtiquetaError>;
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn not_found(id: &str) -> EtiquetaError {
    EtiquetaError::Store(format!("Template with id {} not found", id))
}

fn sort_entries(entries: &mut [StoredTemplate]) {
    entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, StoredTemplate>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryStore {
    fn load(&self, id: &str) -> Result<StoredTemplate, EtiquetaError> {
        self.entries.get(id).cloned().ok_or_else(|| not_found(id))
    }

    fn save(&mut self, name: &str, json: &str) -> Result<String, EtiquetaError> {
        let id = new_id();
        self.entries.insert(
            id.clone(),
            StoredTemplate {
                id: id.clone(),
                name: name.to_string(),
                template_json: json.to_string(),
            },
        );
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<StoredTemplate>, EtiquetaError> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        sort_entries(&mut entries);
        Ok(entries)
    }
}

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, EtiquetaError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, id: &str) -> Result<PathBuf, EtiquetaError> {
        // ids become file names; refuse anything that could leave the directory
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EtiquetaError::Store(format!("Invalid template id: {:?}", id)));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn read_entry(path: &Path) -> Result<StoredTemplate, EtiquetaError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            EtiquetaError::Store(format!("Unreadable entry {}: {}", path.display(), e))
        })
    }
}

impl TemplateStore for DirStore {
    fn load(&self, id: &str) -> Result<StoredTemplate, EtiquetaError> {
        let path = self.entry_path(id)?;
        if !path.is_file() {
            return Err(not_found(id));
        }
        Self::read_entry(&path)
    }

    fn save(&mut self, name: &str, json: &str) -> Result<String, EtiquetaError> {
        let entry = StoredTemplate {
            id: new_id(),
            name: name.to_string(),
            template_json: json.to_string(),
        };
        let text = serde_json::to_string_pretty(&entry)
            .map_err(|e| EtiquetaError::Store(e.to_string()))?;
        fs::write(self.entry_path(&entry.id)?, text)?;
        log::debug!("saved template '{}' as {}", entry.name, entry.id);
        Ok(entry.id)
    }

    fn list_all(&self) -> Result<Vec<StoredTemplate>, EtiquetaError> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_entry(&path) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
        sort_entries(&mut entries);
        Ok(entries)
    }
}
