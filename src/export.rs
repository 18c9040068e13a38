use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::system::snapshot::Snapshot;

pub const DEFAULT_FILE_NAME: &str = "results.json";

pub fn to_json(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json(json: &str) -> Result<Snapshot> {
    Ok(serde_json::from_str(json)?)
}

pub fn export_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(snapshot)?)?;
    Ok(())
}

pub fn import_snapshot(path: &Path) -> Result<Snapshot> {
    from_json(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::system::snapshot::{Bandwidth, ResourceUsage, SnapshotParts, SystemInfo};

    fn sample() -> Snapshot {
        Snapshot::from_parts(SnapshotParts {
            resources: ResourceUsage {
                cpu_percent: 12.5,
                memory_percent: 61.25,
                disk_percent: 80.0,
            },
            target: Some("example.com".to_string()),
            response_time_ms: Some(42.125),
            updates_available: true,
            bandwidth: Some(Bandwidth {
                download_mbps: 93.5,
                upload_mbps: f64::NAN,
            }),
            system: SystemInfo {
                os: "Debian GNU/Linux".to_string(),
                machine: "x86_64".to_string(),
                uptime_secs: 7200,
                ..SystemInfo::default()
            },
            taken_at_unix_s: 1_760_000_000,
            ..SnapshotParts::default()
        })
    }

    #[test]
    fn absent_values_serialize_as_null() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["upload_mbps"].is_null());
        assert_eq!(value["download_mbps"], 93.5);
        assert_eq!(value["system"]["uptime_secs"], 7200);
    }

    #[test]
    fn file_round_trip_is_field_for_field_equal() {
        let dir = std::env::temp_dir()
            .join(format!("system_analyzer_export_{}", std::process::id()));
        let path = dir.join(DEFAULT_FILE_NAME);
        let snapshot = sample();

        export_snapshot(&snapshot, &path).unwrap();
        let restored = import_snapshot(&path).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.upload_mbps, None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(from_json("{\"cpu_percent\": "), Err(AnalyzerError::Json(_))));
    }
}
