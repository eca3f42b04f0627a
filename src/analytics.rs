//! Chart models recomputed whenever homework, students, or sessional marks
//! change. Pure over its three inputs; the previous snapshot is discarded
//! before a rebuild so stale series never leak into a redraw.

use serde::Serialize;

use crate::models::{Homework, HomeworkStatus, HomeworkTarget, SessionalMark, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkCompletion {
    pub pending: usize,
    pub submitted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSlice {
    pub student: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub homework_completion: HomeworkCompletion,
    pub student_workload: Vec<WorkloadSlice>,
    pub average_marks: Vec<SubjectAverage>,
}

/// Whether a homework item counts toward a student's workload.
pub fn applies_to(hw: &Homework, student: &Student) -> bool {
    match hw.target {
        HomeworkTarget::All => true,
        HomeworkTarget::Student => hw.target_specific == student.id,
        HomeworkTarget::Class => hw.target_specific == student.class_id,
    }
}

pub fn recompute(
    homework: &[Homework],
    students: &[Student],
    marks: &[SessionalMark],
) -> AnalyticsSnapshot {
    let pending = homework
        .iter()
        .filter(|h| h.status == HomeworkStatus::Pending)
        .count();
    let submitted = homework
        .iter()
        .filter(|h| h.status == HomeworkStatus::Submitted)
        .count();

    let student_workload = students
        .iter()
        .map(|s| WorkloadSlice {
            student: s.name.clone(),
            count: homework.iter().filter(|h| applies_to(h, s)).count(),
        })
        .collect();

    // Subjects appear in first-seen order. A subject with no recorded marks
    // never appears, so there is no divide-by-zero row.
    let mut by_subject: Vec<(String, f64, usize)> = Vec::new();
    for m in marks {
        if m.max_marks <= 0 {
            continue;
        }
        let percent = m.marks as f64 / m.max_marks as f64 * 100.0;
        match by_subject.iter_mut().find(|(s, _, _)| *s == m.subject) {
            Some((_, total, count)) => {
                *total += percent;
                *count += 1;
            }
            None => by_subject.push((m.subject.clone(), percent, 1)),
        }
    }
    let average_marks = by_subject
        .into_iter()
        .map(|(subject, total, count)| SubjectAverage {
            subject,
            average_percent: total / count as f64,
        })
        .collect();

    AnalyticsSnapshot {
        homework_completion: HomeworkCompletion { pending, submitted },
        student_workload,
        average_marks,
    }
}

/// Dashboard header numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSummary {
    pub total_students: usize,
    pub pending_homework: usize,
    pub submitted_homework: usize,
    pub next_due_date: String,
}

pub fn home_summary(students: &[Student], homework: &[Homework]) -> HomeSummary {
    let pending: Vec<&Homework> = homework
        .iter()
        .filter(|h| h.status == HomeworkStatus::Pending)
        .collect();
    let next_due_date = pending
        .iter()
        .map(|h| h.due_date.as_str())
        .min()
        .unwrap_or("N/A")
        .to_string();
    HomeSummary {
        total_students: students.len(),
        pending_homework: pending.len(),
        submitted_homework: homework.len() - pending.len(),
        next_due_date,
    }
}
