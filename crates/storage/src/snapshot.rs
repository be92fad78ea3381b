//! Snapshot Store Implementation

use alerting::{AlertObservation, Annotations, SnapshotResult, SnapshotWriter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use crate::StorageError;

/// Snapshot location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory holding snapshot files
    pub directory: PathBuf,
    /// Prefix joined to the sanitized alert name with `_`
    pub file_prefix: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/dev/shm"),
            file_prefix: "prometheus-alertmanager-http-server".to_string(),
        }
    }
}

/// On-disk layout of a snapshot, shaped like the Alertmanager alert it came from
#[derive(Serialize)]
struct SnapshotDocument<'a> {
    labels: SnapshotLabels<'a>,
    annotations: &'a Annotations,
    status: &'a str,
    #[serde(rename = "generatorURL")]
    generator_url: &'a str,
}

#[derive(Serialize)]
struct SnapshotLabels<'a> {
    alertname: &'a str,
}

impl<'a> From<&'a AlertObservation> for SnapshotDocument<'a> {
    fn from(obs: &'a AlertObservation) -> Self {
        Self {
            labels: SnapshotLabels {
                alertname: &obs.key,
            },
            annotations: &obs.annotations,
            status: &obs.status,
            generator_url: &obs.generator_url,
        }
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File-per-alert snapshot store
pub struct SnapshotStore {
    config: SnapshotConfig,
    /// Distinguishes temp files of concurrent writes
    write_seq: AtomicU64,
}

impl SnapshotStore {
    pub fn new(config: SnapshotConfig) -> Self {
        info!("Creating snapshot store in {}", config.directory.display());
        Self {
            config,
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    fn file_name_for(&self, name: &str) -> String {
        sanitize_name(&format!("{}_{}", self.config.file_prefix, sanitize_name(name)))
    }

    /// Snapshot file path for an alert name. Always inside the store directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.config.directory.join(self.file_name_for(name))
    }

    /// Temp file a write goes through before being renamed onto `path_for`
    fn temp_path_for(&self, name: &str, seq: u64) -> PathBuf {
        self.config
            .directory
            .join(format!(".{}.{}.tmp", self.file_name_for(name), seq))
    }

    /// Serialize `observation` and atomically replace the snapshot for `name`
    pub async fn save(
        &self,
        name: &str,
        observation: &AlertObservation,
    ) -> Result<PathBuf, StorageError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        SnapshotDocument::from(observation).serialize(&mut ser)?;

        let path = self.path_for(name);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self.temp_path_for(name, seq);

        tokio::fs::write(&tmp, &buf).await.map_err(|source| StorageError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io {
                path: path.display().to_string(),
                source,
            });
        }

        debug!(alert = name, path = %path.display(), "Snapshot written");
        Ok(path)
    }
}

#[async_trait]
impl SnapshotWriter for SnapshotStore {
    async fn write(&self, key: &str, observation: &AlertObservation) -> SnapshotResult {
        self.save(key, observation).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> SnapshotStore {
        SnapshotStore::new(SnapshotConfig {
            directory: dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Plug Washing Machine"), "Plug_Washing_Machine");
        assert_eq!(sanitize_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_name("a\\b:c"), "a_b_c");
        assert_eq!(sanitize_name("disk-usage_1.2"), "disk-usage_1.2");
    }

    #[test]
    fn test_path_stays_in_directory() {
        let store = store_in(Path::new("/dev/shm"));

        for name in ["..", "../../root", "/abs/path", "Plug Washing Machine"] {
            let path = store.path_for(name);
            assert_eq!(path.parent(), Some(Path::new("/dev/shm")));
        }
        assert_eq!(
            store.path_for("Plug Washing Machine"),
            Path::new("/dev/shm/prometheus-alertmanager-http-server_Plug_Washing_Machine")
        );
    }

    #[tokio::test]
    async fn test_save_writes_alertmanager_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let obs = AlertObservation::new("Disk Full", "firing")
            .with_annotations(Annotations {
                summary: "disk".into(),
                description: "root volume above 95%".into(),
            })
            .with_generator_url("http://prometheus:9090/graph");

        let path = store.save(&obs.key, &obs).await.unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(doc["labels"]["alertname"], "Disk Full");
        assert_eq!(doc["annotations"]["description"], "root volume above 95%");
        assert_eq!(doc["status"], "firing");
        assert_eq!(doc["generatorURL"], "http://prometheus:9090/graph");
        assert!(text.contains("\n    \"labels\""));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        store
            .write("Disk Full", &AlertObservation::new("Disk Full", "firing"))
            .await
            .unwrap();
        store
            .write("Disk Full", &AlertObservation::new("Disk Full", "resolved"))
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let text = std::fs::read_to_string(store.path_for("Disk Full")).unwrap();
        assert!(text.contains("resolved"));
    }

    #[test]
    fn test_temp_path_keeps_dotted_name() {
        let store = store_in(Path::new("/dev/shm"));

        let tmp = store.temp_path_for("node.disk", 7);
        assert_eq!(
            tmp,
            Path::new("/dev/shm/.prometheus-alertmanager-http-server_node.disk.7.tmp")
        );
        let file = tmp.file_name().unwrap().to_string_lossy();
        assert!(!file.starts_with("prometheus-alertmanager-http-server"));
    }

    #[tokio::test]
    async fn test_dotted_name_leaves_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let path = store
            .save("node.disk", &AlertObservation::new("node.disk", "firing"))
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries, vec![path.clone()]);
        assert_eq!(
            path.file_name().unwrap(),
            "prometheus-alertmanager-http-server_node.disk"
        );
    }

    #[tokio::test]
    async fn test_annotations_keep_alertmanager_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let obs = AlertObservation::new("Disk Full", "firing").with_annotations(Annotations {
            description: "root volume above 95%".into(),
            summary: "disk".into(),
        });

        let text = std::fs::read_to_string(store.save(&obs.key, &obs).await.unwrap()).unwrap();
        let description = text.find("\"description\"").unwrap();
        let summary = text.find("\"summary\"").unwrap();
        assert!(description < summary);
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir.path().join("missing"));

        let err = store
            .save("Disk Full", &AlertObservation::new("Disk Full", "firing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
