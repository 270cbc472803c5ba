use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::domain::store::Snapshot;
use crate::infra::seed::dto::SnapshotDto;
use crate::infra::seed::mapper::{dto_to_snapshot, snapshot_to_dto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    /// Format implied by the file extension (`.yaml`, `.yml` or `.json`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => bail!(
                "Unsupported snapshot file '{}': expected .yaml, .yml or .json",
                path.display()
            ),
        }
    }
}

/// Parse snapshot text. Only the shape and literals are checked here.
pub fn parse_snapshot(text: &str, format: SnapshotFormat) -> Result<Snapshot> {
    let dto: SnapshotDto = match format {
        SnapshotFormat::Yaml => serde_yaml::from_str(text).context("Invalid YAML snapshot")?,
        SnapshotFormat::Json => serde_json::from_str(text).context("Invalid JSON snapshot")?,
    };
    Ok(dto_to_snapshot(dto)?)
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let format = SnapshotFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = parse_snapshot(&text, format)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    debug!(
        path = %path.display(),
        events = snapshot.events.len(),
        users = snapshot.users.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

pub fn render_snapshot(snapshot: &Snapshot, format: SnapshotFormat) -> Result<String> {
    let dto = snapshot_to_dto(snapshot);
    match format {
        SnapshotFormat::Yaml => serde_yaml::to_string(&dto).context("Failed to serialize snapshot"),
        SnapshotFormat::Json => {
            serde_json::to_string_pretty(&dto).context("Failed to serialize snapshot")
        }
    }
}

pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let text = render_snapshot(snapshot, SnapshotFormat::from_path(path)?)?;
    fs::write(path, text).with_context(|| format!("Failed to write snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{ItemStatus, Role};

    const YAML: &str = r##"
users:
  - id: "4"
    name: Sarah Lee
events:
  - id: "2"
    title: Beach Trip
    description: Weekend getaway
    date: "2023-07-22"
    location: Malibu, CA
    createdBy: "1"
    categories:
      - { id: "1", name: Essentials, color: "#EF4444" }
    items:
      - { id: "1", name: Sunscreen, categoryId: "1", assignedTo: "1", status: packed }
      - { id: "2", name: Beach Towels, categoryId: "1", status: toPack, quantity: 4 }
    members:
      - { id: "1", name: John Doe, role: Owner }
"##;

    #[test]
    fn parses_camel_case_yaml() {
        let snapshot = parse_snapshot(YAML, SnapshotFormat::Yaml).unwrap();
        assert_eq!(snapshot.users.len(), 1);
        let event = &snapshot.events[0];
        assert_eq!(event.created_by.as_str(), "1");
        assert_eq!(event.members[0].role, Role::Owner);
        assert_eq!(event.items[1].status, ItemStatus::ToPack);
        assert_eq!(event.items[0].quantity, 1);
        assert_eq!(event.items[1].quantity, 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = r#"{ "events": [], "widgets": [] }"#;
        assert!(parse_snapshot(text, SnapshotFormat::Json).is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("seed.YML")).unwrap(),
            SnapshotFormat::Yaml
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a/b.json")).unwrap(),
            SnapshotFormat::Json
        );
        assert!(SnapshotFormat::from_path(Path::new("seed.toml")).is_err());
    }

    #[test]
    fn saved_json_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = parse_snapshot(YAML, SnapshotFormat::Yaml).unwrap();

        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);
    }
}
