//! In-memory roster and attendance record store.
//!
//! Records are kept in insertion order and are never deleted. Deleting a
//! course leaves its attendance records in place.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::config::{CheckInSettings, DeprivationSettings};
use crate::error::{TrackerError, TrackerResult};
use crate::excuse;
use crate::models::{
    AttendanceRecord, AttendanceStatus, Course, CourseStatus, ExcuseStatus, ExcuseType, Student,
    StudentStanding,
};
use crate::rates;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct AttendanceStore {
    students: Vec<Student>,
    courses: Vec<Course>,
    records: Vec<AttendanceRecord>,
}

/// Optional filters for listing records; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter<'a> {
    pub course_id: Option<&'a str>,
    pub student_id: Option<&'a str>,
    pub status: Option<AttendanceStatus>,
}

impl RecordFilter<'_> {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.course_id.map_or(true, |c| record.course_id == c)
            && self.student_id.map_or(true, |s| record.student_id == s)
            && self.status.map_or(true, |s| record.status == s)
    }
}

impl AttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from imported records, registering placeholder roster
    /// entries for any student or course the records mention.
    pub fn from_records(records: Vec<AttendanceRecord>) -> Self {
        Self::with_rosters(Vec::new(), Vec::new(), records)
    }

    pub fn with_rosters(
        students: Vec<Student>,
        courses: Vec<Course>,
        records: Vec<AttendanceRecord>,
    ) -> Self {
        let mut store = Self {
            students,
            courses,
            records: Vec::new(),
        };
        for record in &records {
            if store.student(&record.student_id).is_none() {
                store.students.push(Student {
                    id: record.student_id.clone(),
                    name: record.student_id.clone(),
                    email: String::new(),
                });
            }
            if store.course(&record.course_id).is_none() {
                store.courses.push(Course {
                    id: record.course_id.clone(),
                    title: record.course_id.clone(),
                    code: record.course_id.clone(),
                    instructor: String::new(),
                    schedule: String::new(),
                    room: String::new(),
                    status: CourseStatus::Active,
                });
            }
        }
        store.records = records;
        store
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn add_student(&mut self, student: Student) -> TrackerResult<()> {
        require("student id", &student.id)?;
        require("student name", &student.name)?;
        if self.student(&student.id).is_some() {
            return Err(TrackerError::Duplicate {
                kind: "student",
                id: student.id,
            });
        }
        info!(student_id = %student.id, "student added");
        self.students.push(student);
        Ok(())
    }

    pub fn add_course(&mut self, course: Course) -> TrackerResult<()> {
        require("course id", &course.id)?;
        require("course title", &course.title)?;
        require("course code", &course.code)?;
        if self.course(&course.id).is_some() {
            return Err(TrackerError::Duplicate {
                kind: "course",
                id: course.id,
            });
        }
        info!(course_id = %course.id, code = %course.code, "course added");
        self.courses.push(course);
        Ok(())
    }

    pub fn set_course_status(
        &mut self,
        course_id: &str,
        status: CourseStatus,
    ) -> TrackerResult<()> {
        let course = self
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| TrackerError::UnknownCourse(course_id.to_string()))?;
        course.status = status;
        info!(course_id, ?status, "course status changed");
        Ok(())
    }

    pub fn delete_course(&mut self, course_id: &str) -> TrackerResult<Course> {
        let index = self
            .courses
            .iter()
            .position(|c| c.id == course_id)
            .ok_or_else(|| TrackerError::UnknownCourse(course_id.to_string()))?;
        info!(course_id, "course deleted");
        Ok(self.courses.remove(index))
    }

    /// Marks a session. Re-marking the same (student, course, date) overwrites
    /// the status and drops any excuse once the record is no longer an absence.
    pub fn mark(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> TrackerResult<&AttendanceRecord> {
        self.ensure_known(student_id, course_id)?;

        let index = match self.position(student_id, course_id, date) {
            Some(index) => {
                let record = &mut self.records[index];
                record.status = status;
                record.checked_in_at = None;
                if status != AttendanceStatus::Absent {
                    excuse::clear(record);
                }
                debug!(
                    student_id,
                    course_id,
                    %date,
                    status = status.as_str(),
                    "attendance updated"
                );
                index
            }
            None => {
                self.records
                    .push(AttendanceRecord::new(student_id, course_id, date, status));
                debug!(student_id, course_id, %date, status = status.as_str(), "attendance marked");
                self.records.len() - 1
            }
        };
        Ok(&self.records[index])
    }

    /// Simulated face-recognition check-in: present up to the grace period after
    /// the session starts, late afterwards.
    pub fn check_in(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        arrived_at: NaiveTime,
        settings: &CheckInSettings,
    ) -> TrackerResult<&AttendanceRecord> {
        let status = if settings.is_late(arrived_at) {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };
        self.mark(student_id, course_id, date, status)?;
        let index = self
            .position(student_id, course_id, date)
            .ok_or_else(|| not_found(student_id, course_id, date))?;
        let record = &mut self.records[index];
        record.checked_in_at = Some(arrived_at);
        info!(student_id, course_id, %arrived_at, status = status.as_str(), "checked in");
        Ok(&*record)
    }

    pub fn submit_excuse(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        excuse_type: ExcuseType,
        notes: &str,
    ) -> TrackerResult<()> {
        let record = self.record_mut(student_id, course_id, date)?;
        excuse::submit(record, excuse_type, notes)?;
        info!(student_id, course_id, %date, ?excuse_type, "excuse submitted");
        Ok(())
    }

    pub fn verify_excuse(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
    ) -> TrackerResult<()> {
        excuse::verify(self.record_mut(student_id, course_id, date)?)?;
        info!(student_id, course_id, %date, "excuse verified");
        Ok(())
    }

    pub fn reject_excuse(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
    ) -> TrackerResult<()> {
        excuse::reject(self.record_mut(student_id, course_id, date)?)?;
        info!(student_id, course_id, %date, "excuse rejected");
        Ok(())
    }

    pub fn records_for(&self, student_id: &str, course_id: &str) -> Vec<&AttendanceRecord> {
        self.filtered(&RecordFilter {
            course_id: Some(course_id),
            student_id: Some(student_id),
            status: None,
        })
    }

    pub fn filtered(&self, filter: &RecordFilter<'_>) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn pending_excuses(&self, course_id: Option<&str>) -> Vec<&AttendanceRecord> {
        self.records
            .iter()
            .filter(|r| r.excuse_status == ExcuseStatus::Submitted)
            .filter(|r| course_id.map_or(true, |c| r.course_id == c))
            .collect()
    }

    pub fn standing(
        &self,
        student_id: &str,
        course_id: &str,
        settings: &DeprivationSettings,
    ) -> TrackerResult<StudentStanding> {
        self.ensure_known(student_id, course_id)?;
        let student = self
            .student(student_id)
            .ok_or_else(|| TrackerError::UnknownStudent(student_id.to_string()))?;
        let records = self.records_for(student_id, course_id);
        Ok(rates::standing(student, course_id, &records, settings))
    }

    pub fn standings(
        &self,
        course_id: Option<&str>,
        settings: &DeprivationSettings,
    ) -> Vec<StudentStanding> {
        rates::standings(&self.students, &self.records, course_id, settings)
    }

    fn ensure_known(&self, student_id: &str, course_id: &str) -> TrackerResult<()> {
        if self.student(student_id).is_none() {
            return Err(TrackerError::UnknownStudent(student_id.to_string()));
        }
        if self.course(course_id).is_none() {
            return Err(TrackerError::UnknownCourse(course_id.to_string()));
        }
        Ok(())
    }

    fn position(&self, student_id: &str, course_id: &str, date: NaiveDate) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.student_id == student_id && r.course_id == course_id && r.date == date)
    }

    fn record_mut(
        &mut self,
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
    ) -> TrackerResult<&mut AttendanceRecord> {
        let index = self
            .position(student_id, course_id, date)
            .ok_or_else(|| not_found(student_id, course_id, date))?;
        Ok(&mut self.records[index])
    }
}

/// Sign-up form checks: required fields and matching password confirmation.
pub fn validate_account(
    name: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> TrackerResult<()> {
    require("name", name)?;
    require("email", email)?;
    if !email.contains('@') {
        return Err(TrackerError::MissingField("valid email"));
    }
    require("password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(TrackerError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if password != confirmation {
        return Err(TrackerError::PasswordMismatch);
    }
    Ok(())
}

fn require(field: &'static str, value: &str) -> TrackerResult<()> {
    if value.trim().is_empty() {
        return Err(TrackerError::MissingField(field));
    }
    Ok(())
}

fn not_found(student_id: &str, course_id: &str, date: NaiveDate) -> TrackerError {
    TrackerError::RecordNotFound {
        student_id: student_id.to_string(),
        course_id: course_id.to_string(),
        date,
    }
}
