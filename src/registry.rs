//! Landmark registry with durable JSON persistence
//!
//! The registry owns the mapping of landmark name to known coordinate. The
//! in-memory map is authoritative at all times; the backing file is a
//! convenience so landmarks survive a restart. Load and save failures are
//! logged and the registry keeps operating.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::Point;

/// Default location of the persisted landmark store
pub const DEFAULT_STORE_PATH: &str = "landmark_positions.json";

/// Durable mapping of landmark name to known coordinate
#[derive(Debug, Clone)]
pub struct LandmarkRegistry {
    path: PathBuf,
    landmarks: HashMap<String, Point>,
}

impl LandmarkRegistry {
    /// Open the registry backed by the store at `path`.
    ///
    /// A missing or unparsable store file starts the registry empty with a
    /// warning; landmarks then have to be re-registered.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let landmarks = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, Point>>(&content) {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    tracing::warn!(
                        "Landmark store '{}' is malformed, starting empty: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(
                    "Failed to read landmark store '{}', starting empty: {}",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self { path, landmarks }
    }

    /// Open the registry at [`DEFAULT_STORE_PATH`].
    pub fn open_default() -> Self {
        Self::load(DEFAULT_STORE_PATH)
    }

    /// Insert or overwrite a landmark's position and persist the full map.
    ///
    /// A failed write is logged, not returned: the in-memory entry is already
    /// applied and the next successful upsert persists it.
    pub fn upsert(&mut self, name: &str, position: Point) {
        self.landmarks.insert(name.to_string(), position);
        if let Err(e) = self.save() {
            tracing::warn!(
                "Failed to persist landmark store '{}': {}",
                self.path.display(),
                e
            );
        }
    }

    /// Look up a landmark's registered position.
    pub fn get(&self, name: &str) -> Option<Point> {
        self.landmarks.get(name).copied()
    }

    /// Snapshot of all registered landmarks.
    pub fn all(&self) -> &HashMap<String, Point> {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Write the full map atomically: serialize to a sibling temp file, then
    /// rename over the store so readers never observe a partial write.
    fn save(&self) -> io::Result<()> {
        let content = serde_json::to_string_pretty(&self.landmarks)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
    }
}
