//! Excuse verification workflow: `unexcused -> submitted -> {verified, rejected}`.
//!
//! A rejected excuse may be resubmitted. Every failed transition leaves the
//! record untouched.

use crate::error::{TrackerError, TrackerResult};
use crate::models::{AttendanceRecord, AttendanceStatus, ExcuseStatus, ExcuseType};

pub fn submit(
    record: &mut AttendanceRecord,
    excuse_type: ExcuseType,
    notes: &str,
) -> TrackerResult<()> {
    if record.status != AttendanceStatus::Absent {
        return Err(TrackerError::NotAnAbsence);
    }
    if excuse_type == ExcuseType::None {
        return Err(TrackerError::MissingExcuseType);
    }
    match record.excuse_status {
        ExcuseStatus::Unexcused | ExcuseStatus::Rejected => {
            record.excuse_type = excuse_type;
            record.notes = notes.trim().to_string();
            record.excuse_status = ExcuseStatus::Submitted;
            Ok(())
        }
        from => Err(TrackerError::InvalidExcuseTransition {
            action: "submit",
            from,
        }),
    }
}

pub fn verify(record: &mut AttendanceRecord) -> TrackerResult<()> {
    decide(record, ExcuseStatus::Verified, "verify")
}

pub fn reject(record: &mut AttendanceRecord) -> TrackerResult<()> {
    decide(record, ExcuseStatus::Rejected, "reject")
}

fn decide(
    record: &mut AttendanceRecord,
    outcome: ExcuseStatus,
    action: &'static str,
) -> TrackerResult<()> {
    if record.excuse_status != ExcuseStatus::Submitted {
        return Err(TrackerError::InvalidExcuseTransition {
            action,
            from: record.excuse_status,
        });
    }
    record.excuse_status = outcome;
    Ok(())
}

/// Clears any excuse, used when a record stops being an absence.
pub fn clear(record: &mut AttendanceRecord) {
    record.excuse_type = ExcuseType::None;
    record.excuse_status = ExcuseStatus::Unexcused;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn absence() -> AttendanceRecord {
        AttendanceRecord::new(
            "s-1",
            "c-1",
            NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            AttendanceStatus::Absent,
        )
    }

    #[test]
    fn verified_excuse_stops_counting() {
        let mut record = absence();
        assert!(record.counts_as_absence());

        submit(&mut record, ExcuseType::Medical, " doctor's note ").unwrap();
        assert_eq!(record.excuse_status, ExcuseStatus::Submitted);
        assert_eq!(record.notes, "doctor's note");
        assert!(record.counts_as_absence());

        verify(&mut record).unwrap();
        assert!(record.excuse_verified());
        assert!(!record.counts_as_absence());
    }

    #[test]
    fn rejected_excuse_keeps_counting_and_can_be_resubmitted() {
        let mut record = absence();
        submit(&mut record, ExcuseType::Family, "wedding").unwrap();
        reject(&mut record).unwrap();
        assert!(record.counts_as_absence());

        submit(&mut record, ExcuseType::Other, "new evidence").unwrap();
        assert_eq!(record.excuse_status, ExcuseStatus::Submitted);
    }

    #[test]
    fn cannot_decide_without_submission() {
        let mut record = absence();
        let err = verify(&mut record).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidExcuseTransition {
                action: "verify",
                from: ExcuseStatus::Unexcused
            }
        ));
        assert_eq!(record.excuse_status, ExcuseStatus::Unexcused);
    }

    #[test]
    fn cannot_resubmit_verified_excuse() {
        let mut record = absence();
        submit(&mut record, ExcuseType::Academic, "competition").unwrap();
        verify(&mut record).unwrap();
        assert!(submit(&mut record, ExcuseType::Medical, "again").is_err());
        assert_eq!(record.excuse_type, ExcuseType::Academic);
    }

    #[test]
    fn rejects_excuse_on_present_record() {
        let mut record = absence();
        record.status = AttendanceStatus::Present;
        assert!(matches!(
            submit(&mut record, ExcuseType::Medical, "note"),
            Err(TrackerError::NotAnAbsence)
        ));
    }

    #[test]
    fn requires_excuse_type() {
        let mut record = absence();
        assert!(matches!(
            submit(&mut record, ExcuseType::None, "note"),
            Err(TrackerError::MissingExcuseType)
        ));
    }
}
