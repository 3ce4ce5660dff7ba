use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::model::task::Task;
use crate::parse::{ParseError, parse_task, serialize_task};

/// Extension of task files
pub const TASK_EXT: &str = "md";

/// Error type for task store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not delete {path}: {source}")]
    Delete {
        path: PathBuf,
        source: io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ParseError,
    },
    #[error("task title is empty")]
    EmptyTitle,
    #[error("task title must be a single line")]
    MultilineTitle,
}

/// Result of scanning the tasks directory
#[derive(Debug, Default)]
pub struct Listing {
    pub tasks: Vec<Task>,
    /// Files that could not be read or decoded; they are skipped
    pub failures: Vec<StoreError>,
}

impl Listing {
    /// Human-readable startup warnings: unreadable files and tasks whose
    /// status matches none of `columns`.
    pub fn warnings(&self, columns: &[String]) -> Vec<String> {
        let mut warnings: Vec<String> = self.failures.iter().map(|e| e.to_string()).collect();
        for task in &self.tasks {
            if !columns.contains(&task.status) {
                warnings.push(format!(
                    "task {} has unknown status \"{}\"",
                    task.id, task.status
                ));
            }
        }
        warnings
    }
}

/// Filesystem-backed task collection: one file per task in a flat directory
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TaskStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing the task with the given id
    pub fn task_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, TASK_EXT))
    }

    /// Load every task file in the directory (non-recursive).
    ///
    /// Only an unreadable directory is an error; individual bad files are
    /// collected in `failures` and the scan continues. Files are visited in
    /// file name order.
    pub fn list(&self) -> Result<Listing, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Read {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut listing = Listing::default();
        let paths = self.task_paths(entries.map(|e| e.map(|entry| entry.path())), &mut listing);
        for path in paths {
            match Self::load(&path) {
                Ok(task) => listing.tasks.push(task),
                Err(e) => {
                    warn!("skipping task file: {}", e);
                    listing.failures.push(e);
                }
            }
        }
        debug!(
            "listed {} tasks ({} failures) in {}",
            listing.tasks.len(),
            listing.failures.len(),
            self.dir.display()
        );
        Ok(listing)
    }

    /// Task files among the directory entries, sorted. An entry that cannot
    /// be read is recorded as a failure and skipped.
    fn task_paths(
        &self,
        entries: impl Iterator<Item = io::Result<PathBuf>>,
        listing: &mut Listing,
    ) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("skipping unreadable entry in {}: {}", self.dir.display(), e);
                    listing.failures.push(StoreError::Read {
                        path: self.dir.clone(),
                        source: e,
                    });
                    continue;
                }
            };
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(TASK_EXT) {
                paths.push(path);
            }
        }
        paths.sort();
        paths
    }

    /// Read and decode one task file; its id is the file stem
    pub fn load(path: &Path) -> Result<Task, StoreError> {
        let text = fs::read_to_string(path).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let task = parse_task(&text).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        Ok(task.with_location(id, path.to_path_buf()))
    }

    /// Create and persist a new task with a fresh identity
    pub fn create(&self, title: &str, status: &str) -> Result<Task, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if title.contains(['\n', '\r']) {
            return Err(StoreError::MultilineTitle);
        }
        let id = self.allocate_id(title, chrono::Utc::now().timestamp());
        let path = self.task_path(&id);
        let task = Task::new(id.clone(), title, status).with_location(id, path);
        self.save(&task)?;
        info!("created task {} in {}", task.id, task.status);
        Ok(task)
    }

    /// `<timestamp>-<slug>`, suffixed with `-2`, `-3`, ... if already taken
    pub fn allocate_id(&self, title: &str, timestamp: i64) -> String {
        let slug = slugify(title);
        let base = if slug.is_empty() {
            timestamp.to_string()
        } else {
            format!("{}-{}", timestamp, slug)
        };

        let mut id = base.clone();
        let mut n = 2;
        while self.task_path(&id).exists() {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        id
    }

    /// Re-encode the task and overwrite its file
    pub fn save(&self, task: &Task) -> Result<(), StoreError> {
        let content = serialize_task(task);
        atomic_write(&task.path, content.as_bytes()).map_err(|e| StoreError::Write {
            path: task.path.clone(),
            source: e,
        })?;
        debug!("saved task {}", task.id);
        Ok(())
    }

    /// Remove the task's file
    pub fn delete(&self, task: &Task) -> Result<(), StoreError> {
        fs::remove_file(&task.path).map_err(|e| StoreError::Delete {
            path: task.path.clone(),
            source: e,
        })?;
        info!("deleted task {}", task.id);
        Ok(())
    }
}

/// Write a file atomically: temp file in the same directory, then rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Lowercase, spaces to hyphens, drop everything but `[a-z0-9-]`, collapse
/// hyphen runs, trim hyphens at the ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        let c = if c == ' ' { '-' } else { c };
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            continue;
        }
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}
