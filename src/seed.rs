use chrono::{Duration, NaiveDate};

use crate::models::{
    AttendanceRecord, AttendanceStatus, Course, CourseStatus, ExcuseStatus, ExcuseType, Student,
};
use crate::store::AttendanceStore;

const TERM_START: (i32, u32, u32) = (2026, 1, 5);

/// One letter per session: P present, L late, A absent.
const PATTERNS: [(&str, &str, &str); 7] = [
    ("st-100", "cs-101", "PPPLPPPPAP"),
    ("st-101", "cs-101", "PAPPLAPPPA"),
    ("st-102", "cs-101", "PPPPPPPPPL"),
    ("st-103", "cs-101", "AAAAAPAAAA"),
    ("st-100", "cs-201", "PPAPPPPPPP"),
    ("st-101", "cs-201", "LLPPPAPPPP"),
    ("st-102", "cs-201", "PPPPPPPPPP"),
];

pub fn sample_students() -> Vec<Student> {
    [
        ("st-100", "Avery Lee", "avery.lee@example.edu"),
        ("st-101", "Jules Moreno", "jules.moreno@example.edu"),
        ("st-102", "Kiara Patel", "kiara.patel@example.edu"),
        ("st-103", "Noah Kim", "noah.kim@example.edu"),
    ]
    .into_iter()
    .map(|(id, name, email)| Student {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
    })
    .collect()
}

pub fn sample_courses() -> Vec<Course> {
    vec![
        Course {
            id: "cs-101".to_string(),
            title: "Introduction to Programming".to_string(),
            code: "CS101".to_string(),
            instructor: "Dr. Sara Haddad".to_string(),
            schedule: "Sun/Tue 09:00".to_string(),
            room: "B-204".to_string(),
            status: CourseStatus::Active,
        },
        Course {
            id: "cs-201".to_string(),
            title: "Data Structures".to_string(),
            code: "CS201".to_string(),
            instructor: "Dr. Omar Nasser".to_string(),
            schedule: "Mon/Wed 11:00".to_string(),
            room: "C-110".to_string(),
            status: CourseStatus::Active,
        },
    ]
}

pub fn sample_records() -> Vec<AttendanceRecord> {
    let (y, m, d) = TERM_START;
    let start = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let mut records = Vec::new();

    for (student_id, course_id, pattern) in PATTERNS {
        for (session, mark) in pattern.chars().enumerate() {
            let status = match mark {
                'P' => AttendanceStatus::Present,
                'L' => AttendanceStatus::Late,
                _ => AttendanceStatus::Absent,
            };
            let date = start + Duration::days(session as i64);
            records.push(AttendanceRecord::new(student_id, course_id, date, status));
        }
    }

    // A verified medical excuse and a pending family one.
    if let Some(record) = records
        .iter_mut()
        .find(|r| r.student_id == "st-101" && r.course_id == "cs-101" && r.counts_as_absence())
    {
        record.excuse_type = ExcuseType::Medical;
        record.excuse_status = ExcuseStatus::Verified;
        record.notes = "Clinic report attached".to_string();
    }
    if let Some(record) = records
        .iter_mut()
        .find(|r| r.student_id == "st-103" && r.counts_as_absence())
    {
        record.excuse_type = ExcuseType::Family;
        record.excuse_status = ExcuseStatus::Submitted;
        record.notes = "Family emergency".to_string();
    }

    records
}

pub fn sample_store() -> AttendanceStore {
    AttendanceStore::with_rosters(sample_students(), sample_courses(), sample_records())
}
