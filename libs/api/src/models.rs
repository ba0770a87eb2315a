use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Logged-in user as returned by `GET /user`.
///
/// Fields the client does not model are kept in `extra` so the profile can be
/// printed back in full.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub name: Option<String>,
    pub fullname: Option<String>,
    pub user: Option<i64>,
    pub person: Option<i64>,
    pub student: Option<i64>,
    pub student_group_id: Option<i64>,
    pub role_code: Option<String>,
    pub school: Option<School>,
    #[serde(rename = "type")]
    pub user_type: Option<String>,
    pub authorized_roles: Vec<String>,
    pub login_method: Option<String>,
    pub session_timeout_in_seconds: Option<u64>,
    pub users: Vec<UserRole>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.fullname
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

/// One of the roles a user may switch to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRole {
    pub id: Option<i64>,
    pub school_code: Option<String>,
    pub role: Option<String>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    pub student_name: Option<String>,
    pub student_group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct School {
    pub id: Option<i64>,
    pub ehis_school: Option<String>,
    pub timetable_type: Option<String>,
    pub basic: bool,
    pub secondary: bool,
    pub vocational: bool,
    pub higher: bool,
    pub doctoral: bool,
}

/// Attributes of the person a timetable link was issued for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAttribute {
    pub id: Option<i64>,
    pub school_code: Option<String>,
    pub role: Option<String>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    pub student_name: Option<String>,
    pub student_group: Option<String>,
    #[serde(rename = "default")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timetable {
    pub study_periods: Option<String>,
    pub timetable_events: Vec<TimetableEvent>,
    pub school: Option<TimetableSchool>,
    pub is_higher: bool,
    pub is_vocational: bool,
    pub general_timetable_curriculum: Option<GeneralTimetableCurriculum>,
}

impl Timetable {
    /// Events grouped by calendar day, each day ordered by start time.
    ///
    /// Events whose date cannot be read are left out.
    pub fn events_by_day(&self) -> BTreeMap<NaiveDate, Vec<&TimetableEvent>> {
        let mut days: BTreeMap<NaiveDate, Vec<&TimetableEvent>> = BTreeMap::new();
        for event in &self.timetable_events {
            if let Some(day) = event.day() {
                days.entry(day).or_default().push(event);
            }
        }
        for events in days.values_mut() {
            events.sort_by(|a, b| a.time_start.cmp(&b.time_start));
        }
        days
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableEvent {
    pub id: Option<i64>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
    /// ISO timestamp of the day, e.g. `2026-10-12T00:00:00Z`
    pub date: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub has_started: bool,
    pub is_ongoing: bool,
    pub is_exam: bool,
    pub single_event: bool,
    pub capacity_type: Option<String>,
    pub add_info: Option<Value>,
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    pub student_groups: Vec<StudentGroup>,
}

impl TimetableEvent {
    pub fn day(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?;
        NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Estonian name, falling back to English.
    pub fn name(&self) -> &str {
        self.name_et
            .as_deref()
            .or(self.name_en.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Teacher {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub id: Option<i64>,
    pub room_code: Option<String>,
    pub building_code: Option<String>,
}

impl Room {
    /// `building-room`, or whichever of the two is known.
    pub fn label(&self) -> String {
        match (self.building_code.as_deref(), self.room_code.as_deref()) {
            (Some(building), Some(room)) => format!("{building}-{room}"),
            (Some(code), None) | (None, Some(code)) => code.to_string(),
            (None, None) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentGroup {
    pub id: Option<i64>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimetableSchool {
    pub id: Option<i64>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralTimetableCurriculum {
    pub student_group_code: Option<String>,
    pub curriculum_code: Option<String>,
    pub name_et: Option<String>,
    pub name_en: Option<String>,
}
