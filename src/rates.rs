use std::collections::BTreeMap;

use crate::config::DeprivationSettings;
use crate::models::{AttendanceRecord, Student, StudentStanding};

/// Percentage of recorded sessions attended (present or late), rounded to the nearest integer.
/// An empty record set yields 0.
pub fn attendance_rate(records: &[&AttendanceRecord]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let attended = records.iter().filter(|r| r.status.is_attended()).count();
    ((attended as f64 / records.len() as f64) * 100.0).round() as u32
}

pub fn counted_absences(records: &[&AttendanceRecord]) -> usize {
    records.iter().filter(|r| r.counts_as_absence()).count()
}

/// Absences without a verified excuse over the configured session count.
pub fn absence_percentage(counted_absences: usize, total_sessions: u32) -> f64 {
    if total_sessions == 0 {
        return 0.0;
    }
    counted_absences as f64 / total_sessions as f64 * 100.0
}

pub fn is_deprived(absence_percentage: f64, threshold_percentage: f64) -> bool {
    absence_percentage > threshold_percentage
}

pub fn standing(
    student: &Student,
    course_id: &str,
    records: &[&AttendanceRecord],
    settings: &DeprivationSettings,
) -> StudentStanding {
    let absences = counted_absences(records);
    let percentage = absence_percentage(absences, settings.total_sessions);

    StudentStanding {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        course_id: course_id.to_string(),
        recorded_sessions: records.len(),
        attended_sessions: records.iter().filter(|r| r.status.is_attended()).count(),
        counted_absences: absences,
        attendance_rate: attendance_rate(records),
        absence_percentage: percentage,
        is_deprived: is_deprived(percentage, settings.threshold_percentage),
    }
}

/// Standings for every (student, course) pair that has records, ordered by
/// absence percentage descending, then by student id.
pub fn standings(
    students: &[Student],
    records: &[AttendanceRecord],
    course_id: Option<&str>,
    settings: &DeprivationSettings,
) -> Vec<StudentStanding> {
    let mut grouped: BTreeMap<(&str, &str), Vec<&AttendanceRecord>> = BTreeMap::new();

    for record in records {
        if course_id.is_some_and(|c| c != record.course_id) {
            continue;
        }
        grouped
            .entry((record.student_id.as_str(), record.course_id.as_str()))
            .or_default()
            .push(record);
    }

    let mut values: Vec<StudentStanding> = grouped
        .into_iter()
        .map(|((student_id, course), rows)| {
            let student = students
                .iter()
                .find(|s| s.id == student_id)
                .cloned()
                .unwrap_or_else(|| Student {
                    id: student_id.to_string(),
                    name: student_id.to_string(),
                    email: String::new(),
                });
            standing(&student, course, &rows, settings)
        })
        .collect();

    values.sort_by(|a, b| {
        b.absence_percentage
            .partial_cmp(&a.absence_percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, ExcuseStatus};
    use chrono::{Duration, NaiveDate};

    fn sample_records(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                AttendanceRecord::new("s-1", "c-1", start + Duration::days(i as i64), *status)
            })
            .collect()
    }

    fn student() -> Student {
        Student {
            id: "s-1".to_string(),
            name: "Avery Lee".to_string(),
            email: "avery@example.com".to_string(),
        }
    }

    #[test]
    fn late_counts_as_attended() {
        use AttendanceStatus::*;
        let records = sample_records(&[Present, Late, Absent]);
        let refs: Vec<&AttendanceRecord> = records.iter().collect();
        assert_eq!(attendance_rate(&refs), 67);
    }

    #[test]
    fn empty_records_yield_zero_rate() {
        assert_eq!(attendance_rate(&[]), 0);
    }

    #[test]
    fn rate_stays_within_bounds() {
        use AttendanceStatus::*;
        for statuses in [vec![Present; 4], vec![Absent; 4], vec![Late, Absent]] {
            let records = sample_records(&statuses);
            let refs: Vec<&AttendanceRecord> = records.iter().collect();
            assert!(attendance_rate(&refs) <= 100);
        }
    }

    #[test]
    fn zero_sessions_never_deprive() {
        assert_eq!(absence_percentage(5, 0), 0.0);
    }

    #[test]
    fn verified_excuse_crosses_back_under_threshold() {
        let settings = DeprivationSettings {
            threshold_percentage: 15.0,
            total_sessions: 30,
            ..DeprivationSettings::default()
        };
        let mut records = sample_records(&[AttendanceStatus::Absent; 5]);

        let refs: Vec<&AttendanceRecord> = records.iter().collect();
        let before = standing(&student(), "c-1", &refs, &settings);
        assert!((before.absence_percentage - 16.666).abs() < 0.01);
        assert!(before.is_deprived);

        records[0].excuse_status = ExcuseStatus::Verified;
        let refs: Vec<&AttendanceRecord> = records.iter().collect();
        let after = standing(&student(), "c-1", &refs, &settings);
        assert_eq!(after.counted_absences, 4);
        assert!((after.absence_percentage - 13.333).abs() < 0.01);
        assert!(!after.is_deprived);
    }

    #[test]
    fn threshold_is_strictly_exceeded() {
        assert!(!is_deprived(15.0, 15.0));
        assert!(is_deprived(15.01, 15.0));
    }

    #[test]
    fn standings_group_by_student_and_sort_by_absence() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let records = vec![
            AttendanceRecord::new("s-1", "c-1", date, AttendanceStatus::Present),
            AttendanceRecord::new("s-2", "c-1", date, AttendanceStatus::Absent),
            AttendanceRecord::new("s-2", "c-2", date, AttendanceStatus::Absent),
        ];
        let settings = DeprivationSettings::default();
        let result = standings(&[student()], &records, Some("c-1"), &settings);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].student_id, "s-2");
        assert_eq!(result[0].student_name, "s-2");
        assert_eq!(result[1].student_name, "Avery Lee");
        assert_eq!(result[1].attendance_rate, 100);
    }
}
