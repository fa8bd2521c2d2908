use std::path::Path;

use tracing::{debug, info};

use crate::error::{TrackerError, TrackerResult};
use crate::models::AttendanceRecord;

pub fn read_records(csv_path: &Path) -> TrackerResult<Vec<AttendanceRecord>> {
    let reader = csv::Reader::from_path(csv_path).map_err(|source| TrackerError::File {
        path: csv_path.to_path_buf(),
        source,
    })?;
    let records = read_from(reader)?;
    info!(path = %csv_path.display(), count = records.len(), "records loaded");
    Ok(records)
}

pub fn read_from<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> TrackerResult<Vec<AttendanceRecord>> {
    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<AttendanceRecord>().enumerate() {
        let record = result.map_err(|source| TrackerError::InvalidRow {
            row: line + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_records(csv_path: &Path, records: &[AttendanceRecord]) -> TrackerResult<()> {
    let mut writer = csv::Writer::from_path(csv_path).map_err(|source| TrackerError::File {
        path: csv_path.to_path_buf(),
        source,
    })?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(path = %csv_path.display(), count = records.len(), "records written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, ExcuseStatus, ExcuseType};

    #[test]
    fn reads_rows_with_optional_columns_blank() {
        let data = "\
student_id,course_id,date,status,excuse_type,excuse_status,notes,checked_in_at
st-1,cs-1,2026-01-05,absent,medical,verified,Clinic note,
st-2,cs-1,2026-01-05,late,none,unexcused,,09:14:00
";
        let records = read_from(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].excuse_type, ExcuseType::Medical);
        assert_eq!(records[0].excuse_status, ExcuseStatus::Verified);
        assert!(records[0].checked_in_at.is_none());
        assert_eq!(records[1].status, AttendanceStatus::Late);
        assert!(records[1].checked_in_at.is_some());
    }

    #[test]
    fn reports_bad_status_with_row_number() {
        let data = "\
student_id,course_id,date,status,excuse_type,excuse_status,notes,checked_in_at
st-1,cs-1,2026-01-05,sleeping,none,unexcused,,
";
        let err = read_from(csv::Reader::from_reader(data.as_bytes())).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidRow { row: 1, .. }));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn blank_excuse_cells_mean_no_excuse() {
        let data = "\
student_id,course_id,date,status,excuse_type,excuse_status,notes,checked_in_at
st-1,cs-1,2026-01-05,present,,,,
st-2,cs-1,2026-01-06,absent, , ,,
";
        let records = read_from(csv::Reader::from_reader(data.as_bytes())).unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.excuse_type, ExcuseType::None);
            assert_eq!(record.excuse_status, ExcuseStatus::Unexcused);
            assert!(record.notes.is_empty());
        }
        assert!(records[1].counts_as_absence());
    }

    #[test]
    fn missing_file_names_the_path() {
        let path = std::env::temp_dir().join(format!("missing-{}.csv", uuid::Uuid::new_v4()));
        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, TrackerError::File { .. }));
        assert!(err.to_string().contains("missing-"));
    }

    #[test]
    fn written_sample_reads_back() {
        let path =
            std::env::temp_dir().join(format!("attendance-{}.csv", uuid::Uuid::new_v4()));
        let records = crate::seed::sample_records();
        write_records(&path, &records).unwrap();
        let loaded = read_records(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, records);
    }
}
