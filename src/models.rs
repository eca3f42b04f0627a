use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Record shapes for the eight synchronized collections.
///
/// Wire names are camelCase to match the document bodies the store holds.
/// Identifiers are assigned by the store; an empty `id` means "not yet
/// created" and is never serialized into a body.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub class_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkTarget {
    All,
    Student,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeworkStatus {
    Pending,
    Submitted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Homework {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub target: HomeworkTarget,
    /// Student or class id, per `target`. Unused when `target` is `all`.
    #[serde(default)]
    pub target_specific: String,
    #[serde(default)]
    pub file_url: String,
    pub status: HomeworkStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// One attendance document per class; `id` is the class id. Days map an ISO
/// date to the full per-student record for that date, which is overwritten
/// wholesale on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub days: BTreeMap<String, BTreeMap<String, AttendanceStatus>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionalMark {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub student_id: String,
    pub class_id: String,
    pub subject: String,
    pub exam_type: String,
    pub marks: i64,
    pub max_marks: i64,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPrefs {
    pub homework: bool,
    pub students: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        NotificationPrefs {
            homework: true,
            students: true,
        }
    }
}

/// Singleton per authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub email: String,
    pub name: String,
    pub bio: String,
    pub phone: String,
    pub address: String,
    pub subjects: Vec<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub notifications: NotificationPrefs,
    pub theme: String,
}

impl Default for Profile {
    fn default() -> Self {
        Profile {
            email: String::new(),
            name: String::new(),
            bio: String::new(),
            phone: String::new(),
            address: String::new(),
            subjects: Vec::new(),
            photo_url: String::new(),
            role: "teacher".to_string(),
            permissions: default_permissions(),
            notifications: NotificationPrefs::default(),
            theme: "light".to_string(),
        }
    }
}

impl Profile {
    /// Profile written on first login/registration.
    pub fn initial(email: &str) -> Profile {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Profile {
            email: email.to_string(),
            name,
            ..Profile::default()
        }
    }
}

pub fn default_permissions() -> Vec<String> {
    [
        "view_dashboard",
        "manage_students",
        "assign_homework",
        "record_attendance",
        "assign_marks",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Delegated role grant for another identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Append-only activity-trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub action: String,
    pub timestamp: String,
}
