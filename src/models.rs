use chrono::{NaiveDate, NaiveTime};
use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, Error as _, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    /// Late arrivals count as attended.
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcuseType {
    Medical,
    Family,
    Academic,
    Other,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcuseStatus {
    #[default]
    Unexcused,
    Submitted,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub course_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub excuse_type: ExcuseType,
    #[serde(default, deserialize_with = "blank_as_default")]
    pub excuse_status: ExcuseStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub checked_in_at: Option<NaiveTime>,
}

/// Spreadsheets leave "no excuse" cells empty; read those as the default variant.
fn blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = String::deserialize(deserializer)?;
    let value = raw.trim();
    if value.is_empty() {
        return Ok(T::default());
    }
    let inner: StrDeserializer<'_, serde::de::value::Error> = value.into_deserializer();
    T::deserialize(inner).map_err(D::Error::custom)
}

impl AttendanceRecord {
    pub fn new(
        student_id: &str,
        course_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            student_id: student_id.to_string(),
            course_id: course_id.to_string(),
            date,
            status,
            excuse_type: ExcuseType::None,
            excuse_status: ExcuseStatus::Unexcused,
            notes: String::new(),
            checked_in_at: None,
        }
    }

    pub fn excuse_verified(&self) -> bool {
        self.excuse_status == ExcuseStatus::Verified
    }

    /// An absence counts against the deprivation threshold unless its excuse was verified.
    pub fn counts_as_absence(&self) -> bool {
        self.status == AttendanceStatus::Absent && !self.excuse_verified()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[default]
    Active,
    Pending,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub code: String,
    pub instructor: String,
    pub schedule: String,
    pub room: String,
    pub status: CourseStatus,
}

/// Derived view of a student in one course. Always computed from records, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStanding {
    pub student_id: String,
    pub student_name: String,
    pub course_id: String,
    pub recorded_sessions: usize,
    pub attended_sessions: usize,
    pub counted_absences: usize,
    pub attendance_rate: u32,
    pub absence_percentage: f64,
    pub is_deprived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub recipient: Recipient,
    pub student_id: String,
    pub course_id: String,
    pub message: String,
}
