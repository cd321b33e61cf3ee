// Schema repository versioning - a directory tree of
// <schema>/<version>/schema.yaml plus a JSON manifest of what exists.
// The build pipeline never depends on this; it is an upstream producer of
// schema definition files.

use crate::error::{GranaryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed name of the manifest emitted by `build`.
pub const MANIFEST_NAME: &str = "manifest.json";

/// Name of the schema definition file inside each version directory.
pub const SCHEMA_FILE: &str = "schema.yaml";

/// A group of versioned schemas rooted at one directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct Repository {
    #[serde(skip)]
    root: PathBuf,
    pub namespace: String,
    /// Output directory name inside the root, excluded from schema discovery.
    pub output: String,
    pub schemas: Vec<SchemaEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionEntry {
    pub name: String,
    /// The schema definition text for this version.
    pub definition: String,
}

impl Repository {
    /// Create a new repository root on disk.
    pub fn create(root: &Path, namespace: &str, output: &str) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Repository {
            root: root.to_path_buf(),
            namespace: namespace.to_string(),
            output: output.to_string(),
            schemas: Vec::new(),
        })
    }

    /// Open an existing repository root and discover its schemas and
    /// versions.
    pub fn open(root: &Path, namespace: &str, output: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(GranaryError::Config(format!(
                "repository root does not exist: {}",
                root.display()
            )));
        }
        let mut repo = Repository {
            root: root.to_path_buf(),
            namespace: namespace.to_string(),
            output: output.to_string(),
            schemas: Vec::new(),
        };
        repo.load()?;
        Ok(repo)
    }

    /// Discover `<schema>/<version>/schema.yaml` under the root. Both levels
    /// are sorted so the manifest is stable.
    fn load(&mut self) -> Result<()> {
        self.schemas.clear();

        let mut schema_dirs = sorted_subdirs(&self.root)?;
        schema_dirs.retain(|dir| dir_name(dir) != self.output);

        for schema_dir in schema_dirs {
            let mut entry = SchemaEntry {
                name: dir_name(&schema_dir),
                versions: Vec::new(),
            };

            for version_dir in sorted_subdirs(&schema_dir)? {
                let definition_path = version_dir.join(SCHEMA_FILE);
                let definition = if definition_path.is_file() {
                    std::fs::read_to_string(&definition_path)?
                } else {
                    String::new()
                };
                entry.versions.push(VersionEntry {
                    name: dir_name(&version_dir),
                    definition,
                });
            }

            self.schemas.push(entry);
        }

        Ok(())
    }

    /// Create a new schema directory with its first version, scaffolded with
    /// a starter definition.
    pub fn add_schema(&mut self, name: &str) -> Result<()> {
        let version_path = self.root.join(name).join("v1");
        std::fs::create_dir_all(&version_path)?;

        let starter = format!(
            "table: {name}\nfields:\n  title: {{ type: string, required: true }}\n"
        );
        std::fs::write(version_path.join(SCHEMA_FILE), starter)?;
        log::debug!("scaffolded schema '{name}' at {}", version_path.display());

        self.load()
    }

    /// Create the next version of a schema by copying the latest one.
    pub fn add_version(&mut self, schema: &str) -> Result<()> {
        let entry = self
            .schemas
            .iter()
            .find(|s| s.name == schema)
            .ok_or_else(|| GranaryError::Other(format!("schema {schema} not found")))?;

        let versions = entry.versions.len();
        let prev = self.root.join(schema).join(format!("v{versions}"));
        let next = self.root.join(schema).join(format!("v{}", versions + 1));
        log::debug!("copying {} to {}", prev.display(), next.display());

        copy_dir(&prev, &next)?;
        self.load()
    }

    /// Serialize the repository into a manifest inside the output directory.
    /// Returns the manifest path.
    pub fn build(&self) -> Result<PathBuf> {
        let build_dir = self.root.join(&self.output);
        std::fs::create_dir_all(&build_dir)?;

        let path = build_dir.join(MANIFEST_NAME);
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(&path, bytes)?;
        log::debug!("manifest written to {}", path.display());
        Ok(path)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
