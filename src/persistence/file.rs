use super::PersistenceResult;
use crate::attendance::AttendanceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct AttendanceSnapshot {
    exported_at: DateTime<Utc>,
    records: Vec<AttendanceRecord>,
}

pub fn save_records_to_json<P: AsRef<Path>>(
    records: &[AttendanceRecord],
    path: P,
) -> PersistenceResult<()> {
    super::validate_records(records)?;
    let snapshot = AttendanceSnapshot {
        exported_at: Utc::now(),
        records: records.to_vec(),
    };
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::info!(path = %path.as_ref().display(), records = records.len(), "saved records");
    Ok(())
}

pub fn load_records_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<AttendanceRecord>> {
    let file = File::open(path.as_ref())?;
    let snapshot: AttendanceSnapshot = serde_json::from_reader(file)?;
    super::validate_records(&snapshot.records)?;
    tracing::info!(
        path = %path.as_ref().display(),
        records = snapshot.records.len(),
        exported_at = %snapshot.exported_at,
        "loaded records"
    );
    Ok(snapshot.records)
}
