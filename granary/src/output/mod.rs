use crate::database::Database;
use crate::error::Result;
use std::path::PathBuf;

/// Fixed name of the build artifact.
pub const ARTIFACT_NAME: &str = "data.json";

/// Serialize the aggregate dataset to bytes. Only validated record data goes
/// out, keyed by table then slug; no schema information is embedded.
pub fn serialize(aggregate: &serde_json::Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(aggregate)?)
}

/// Write the build artifact into the configured build directory, creating it
/// if absent. Returns the artifact path. Any failure here is fatal for the
/// build.
pub fn write_artifact(db: &Database) -> Result<PathBuf> {
    let aggregate = db.output()?;
    let bytes = serialize(&aggregate)?;

    let build_dir = &db.config().build_dir;
    std::fs::create_dir_all(build_dir)?;
    let path = build_dir.join(ARTIFACT_NAME);
    std::fs::write(&path, bytes)?;
    log::debug!("wrote artifact {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_write_artifact() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            schema_dir: tmp.path().join("schemas"),
            data_dir: tmp.path().join("data"),
            build_dir: tmp.path().join("_build"),
        };
        let mut db = Database::open(config);
        db.register(
            "table: notes\nfields:\n  title: { type: string, required: true }\n",
        )
        .unwrap();
        db.insert(
            "notes",
            "one",
            serde_yaml::from_str("title: One").unwrap(),
        )
        .unwrap();

        let path = write_artifact(&db).unwrap();
        assert!(path.ends_with(ARTIFACT_NAME));

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written["notes"]["one"]["title"], "One");
    }

    #[test]
    fn test_serialize_matches_output() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            schema_dir: tmp.path().join("schemas"),
            data_dir: tmp.path().join("data"),
            build_dir: tmp.path().join("_build"),
        };
        let mut db = Database::open(config);
        db.register("table: notes\n").unwrap();

        let path = write_artifact(&db).unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(bytes, serialize(&db.output().unwrap()).unwrap());
    }
}
