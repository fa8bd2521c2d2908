use std::fmt::Write;

use crate::config::DeprivationSettings;
use crate::models::{AttendanceStatus, ExcuseStatus};
use crate::store::{AttendanceStore, RecordFilter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSummary {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub excused: usize,
}

pub fn summarize_statuses(store: &AttendanceStore, course_id: &str) -> StatusSummary {
    let filter = RecordFilter {
        course_id: Some(course_id),
        ..RecordFilter::default()
    };
    let mut summary = StatusSummary::default();

    for record in store.filtered(&filter) {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::Absent if record.excuse_status == ExcuseStatus::Verified => {
                summary.excused += 1
            }
            AttendanceStatus::Absent => summary.absent += 1,
        }
    }

    summary
}

pub fn build_report(
    store: &AttendanceStore,
    course_id: &str,
    settings: &DeprivationSettings,
) -> String {
    let standings = store.standings(Some(course_id), settings);
    let summary = summarize_statuses(store, course_id);
    let pending = store.pending_excuses(Some(course_id));

    let mut output = String::new();
    let course_label = store
        .course(course_id)
        .map(|c| format!("{} {}", c.code, c.title))
        .unwrap_or_else(|| course_id.to_string());

    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} (threshold {:.1}% of {} sessions)",
        course_label, settings.threshold_percentage, settings.total_sessions
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Session Mix");
    let _ = writeln!(
        output,
        "- present: {}\n- late: {}\n- absent: {}\n- excused: {}",
        summary.present, summary.late, summary.absent, summary.excused
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Student Standings");

    if standings.is_empty() {
        let _ = writeln!(output, "No attendance recorded for this course.");
    } else {
        for standing in standings.iter() {
            let _ = writeln!(
                output,
                "- {} ({}) attendance {}%, absence {:.1}% across {} sessions{}",
                standing.student_name,
                standing.student_id,
                standing.attendance_rate,
                standing.absence_percentage,
                standing.recorded_sessions,
                if standing.is_deprived { " [DEPRIVED]" } else { "" }
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pending Excuses");

    if pending.is_empty() {
        let _ = writeln!(output, "No excuses awaiting verification.");
    } else {
        for record in pending.iter() {
            let _ = writeln!(
                output,
                "- {} on {} ({:?}): {}",
                record.student_id, record.date, record.excuse_type, record.notes
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn summary_separates_excused_absences() {
        let store = seed::sample_store();
        let summary = summarize_statuses(&store, "cs-101");
        assert_eq!(summary.excused, 1);
        assert_eq!(
            summary.present + summary.late + summary.absent + summary.excused,
            40
        );
    }

    #[test]
    fn report_flags_deprived_students_first() {
        let store = seed::sample_store();
        let report = build_report(&store, "cs-101", &DeprivationSettings::default());
        assert!(report.starts_with("# Attendance Report"));
        assert!(report.contains("CS101 Introduction to Programming"));

        let standings = report
            .lines()
            .skip_while(|l| *l != "## Student Standings")
            .nth(1)
            .unwrap();
        assert!(standings.starts_with("- Noah Kim"));
        assert!(standings.ends_with("[DEPRIVED]"));
        assert!(report.contains("Family emergency"));
    }

    #[test]
    fn unknown_course_reports_empty_sections() {
        let store = seed::sample_store();
        let report = build_report(&store, "cs-999", &DeprivationSettings::default());
        assert!(report.contains("No attendance recorded for this course."));
        assert!(report.contains("No excuses awaiting verification."));
    }
}
