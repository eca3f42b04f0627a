//! In-memory mirror of the remote collections for the authenticated
//! identity. Mirrors are replaced wholesale by sync pushes and exposed
//! read-only to renderers; nothing outside the sync engine mutates them.

use std::collections::HashMap;

use crate::analytics::{self, AnalyticsSnapshot};
use crate::models::{
    Activity, AttendanceSheet, Authority, Class, Homework, Profile, SessionalMark, Student,
};

/// The synchronized collection paths under `owners/{ownerId}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Classes,
    Students,
    Homework,
    Attendance,
    SessionalMarks,
    Profile,
    Activities,
    Authorities,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Classes,
        Collection::Students,
        Collection::Homework,
        Collection::Attendance,
        Collection::SessionalMarks,
        Collection::Profile,
        Collection::Activities,
        Collection::Authorities,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Collection::Classes => "classes",
            Collection::Students => "students",
            Collection::Homework => "homework",
            Collection::Attendance => "attendance",
            Collection::SessionalMarks => "sessionalMarks",
            Collection::Profile => "profile",
            Collection::Activities => "activities",
            Collection::Authorities => "authorities",
        }
    }

    pub fn from_path(path: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.path() == path)
    }
}

/// Current authenticated identity. The token is refreshed before every
/// write rather than cached across operations.
#[derive(Debug, Clone)]
pub struct Identity {
    pub owner_id: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Default)]
pub struct SessionState {
    classes: Vec<Class>,
    students: Vec<Student>,
    homework: Vec<Homework>,
    attendance: Vec<AttendanceSheet>,
    sessional_marks: Vec<SessionalMark>,
    profile: Option<Profile>,
    activities: Vec<Activity>,
    authorities: Vec<Authority>,
    revisions: HashMap<&'static str, u64>,
    analytics: Option<AnalyticsSnapshot>,
}

impl SessionState {
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }
    pub fn students(&self) -> &[Student] {
        &self.students
    }
    pub fn homework(&self) -> &[Homework] {
        &self.homework
    }
    pub fn attendance(&self) -> &[AttendanceSheet] {
        &self.attendance
    }
    pub fn sessional_marks(&self) -> &[SessionalMark] {
        &self.sessional_marks
    }
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }
    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }

    pub fn class_name(&self, class_id: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| c.name.as_str())
    }

    pub fn student_name(&self, student_id: &str) -> Option<&str> {
        self.students
            .iter()
            .find(|s| s.id == student_id)
            .map(|s| s.name.as_str())
    }

    /// How many times a collection's mirror has been replaced this session.
    pub fn revision(&self, collection: Collection) -> u64 {
        self.revisions.get(collection.path()).copied().unwrap_or(0)
    }

    /// Cached chart models; rebuilt from scratch after any homework,
    /// student, or mark push invalidated them.
    pub fn analytics_snapshot(&mut self) -> &AnalyticsSnapshot {
        if self.analytics.is_none() {
            self.analytics = Some(analytics::recompute(
                &self.homework,
                &self.students,
                &self.sessional_marks,
            ));
        }
        self.analytics.as_ref().expect("snapshot just computed")
    }

    /// Replaces one mirror from a full-collection push. Records that fail to
    /// deserialize are skipped with a warning; one bad document must not
    /// blank the rest of the collection.
    pub(crate) fn apply_push(&mut self, collection: Collection, records: Vec<serde_json::Value>) {
        match collection {
            Collection::Classes => self.classes = parse_records(collection, records),
            Collection::Students => self.students = parse_records(collection, records),
            Collection::Homework => self.homework = parse_records(collection, records),
            Collection::Attendance => self.attendance = parse_records(collection, records),
            Collection::SessionalMarks => self.sessional_marks = parse_records(collection, records),
            Collection::Profile => {
                self.profile = parse_records::<Profile>(collection, records).into_iter().next()
            }
            Collection::Activities => self.activities = parse_records(collection, records),
            Collection::Authorities => self.authorities = parse_records(collection, records),
        }
        *self.revisions.entry(collection.path()).or_insert(0) += 1;
        if matches!(
            collection,
            Collection::Homework | Collection::Students | Collection::SessionalMarks
        ) {
            self.analytics = None;
        }
    }
}

fn parse_records<T: serde::de::DeserializeOwned>(
    collection: Collection,
    records: Vec<serde_json::Value>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|raw| match serde_json::from_value(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping malformed {} record: {}", collection.path(), e);
                None
            }
        })
        .collect()
}
