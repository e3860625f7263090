//! # 반복 수업 오버라이드 명령
//!
//! 반복 시리즈에 대한 사용자 명령 세 가지를 처리합니다.
//!
//! | 명령 | 함수 | 쓰기 대상 |
//! |------|------|-----------|
//! | 이 날짜만 개별 수업으로 전환 | `convert_to_single` | `lessons` 한 행 (INSERT 또는 UPDATE) |
//! | 이 날짜만 휴강 | `cancel_occurrence` | `lessons` 한 행 (INSERT 또는 UPDATE) |
//! | 시리즈 전체 수정/삭제 | `edit_series`, `delete_series` | `recurring_lessons` 한 행 |
//!
//! ## (규칙, 날짜) 하나의 상태 변화
//! ```text
//! 오버라이드 없음 ──convert──▶ Active ──convert(수정)──▶ Active
//!        │                       │
//!        └────────cancel─────────┴──────cancel──────▶ Cancelled (되돌리기 없음)
//! ```
//!
//! 시리즈를 수정하거나 삭제해도 이미 만들어진 오버라이드 행은 그대로 남습니다.
//! 확인 후 삽입(check-then-insert) 방식이라 동시에 같은 날짜를 전환하면
//! 마지막 쓰기가 이기며, 한 시리즈를 한 사람이 관리하는 사용 방식에서는 허용합니다.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, ScheduleError};
use crate::models::*;
use crate::services::dates::format_date_key;
use crate::services::projection::{check_schedule, is_occurrence};

/// (규칙, 날짜) 하나에 대해 저장된 오버라이드의 의미
///
/// 출석 관리용 `LessonStatus`를 그대로 쓰지 않고, 투영에 필요한 두 경우로만 나눕니다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Override<'a> {
    /// 수정된 내용으로 수업이 열림
    Active(&'a Lesson),
    /// 이 날짜는 휴강
    Cancelled(&'a Lesson),
}

impl<'a> Override<'a> {
    pub fn of(lesson: &'a Lesson) -> Self {
        match lesson.status {
            LessonStatus::Cancelled => Override::Cancelled(lesson),
            LessonStatus::Scheduled | LessonStatus::Completed => Override::Active(lesson),
        }
    }

    pub fn lesson(self) -> &'a Lesson {
        match self {
            Override::Active(lesson) | Override::Cancelled(lesson) => lesson,
        }
    }

    /// 같은 키에 행이 여러 개 있을 때 하나로 합칩니다.
    /// 열리는 수업은 캘린더에 그대로 나오므로 휴강보다 우선합니다.
    /// 같은 종류끼리는 ID가 작은 행이 대표가 됩니다.
    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Override::Cancelled(_), active @ Override::Active(_)) => active,
            (active @ Override::Active(_), Override::Cancelled(_)) => active,
            (kept, other) if other.lesson().id < kept.lesson().id => other,
            (kept, _) => kept,
        }
    }

    /// 여러 행을 하나의 오버라이드로 합칩니다. 행이 없으면 None
    pub fn resolve(lessons: &'a [Lesson]) -> Option<Self> {
        lessons.iter().map(Override::of).reduce(Override::merge)
    }
}

/// `(규칙 ID, 날짜)` → 오버라이드 조회표
///
/// 규칙 ID로 먼저 나누고 그 안에서 날짜로 찾습니다.
#[derive(Debug, Default)]
pub struct OverrideIndex<'a> {
    by_rule: HashMap<&'a str, HashMap<NaiveDate, Override<'a>>>,
}

impl<'a> OverrideIndex<'a> {
    /// `source_recurring_id`가 있는 행만 모읍니다.
    pub fn build(lessons: &'a [Lesson]) -> Self {
        let mut by_rule: HashMap<&'a str, HashMap<NaiveDate, Override<'a>>> = HashMap::new();
        for lesson in lessons {
            let Some(rule_id) = lesson.source_recurring_id.as_deref() else {
                continue;
            };
            let incoming = Override::of(lesson);
            by_rule
                .entry(rule_id)
                .or_default()
                .entry(lesson.lesson_date)
                .and_modify(|existing| *existing = existing.merge(incoming))
                .or_insert(incoming);
        }
        Self { by_rule }
    }

    pub fn get(&self, rule_id: &str, date: NaiveDate) -> Option<&Override<'a>> {
        self.by_rule.get(rule_id)?.get(&date)
    }

    /// `lesson`이 자기 `(규칙, 날짜)`를 대표하는 열린 오버라이드인지 확인합니다.
    ///
    /// 같은 키에 열린 행이 여럿 있어도 이 함수가 true인 행은 하나뿐입니다.
    pub fn represents(&self, lesson: &Lesson) -> bool {
        let Some(rule_id) = lesson.source_recurring_id.as_deref() else {
            return false;
        };
        matches!(
            self.get(rule_id, lesson.lesson_date),
            Some(Override::Active(winner)) if std::ptr::eq(*winner, lesson)
        )
    }
}

async fn load_rule(pool: &SqlitePool, rule_id: &str) -> Result<RecurringLesson, AppError> {
    db::get_recurring_lesson(pool, rule_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// 날짜별 명령을 받을 수 있는 `(규칙, 날짜)`인지 확인합니다.
///
/// 중단된 시리즈는 캘린더에 나오지 않으므로, 그 날짜를 전환/휴강하면
/// 숨겨진 시리즈의 수업 하나만 갑자기 나타나게 됩니다. 그래서 `Conflict`로 거부합니다.
fn ensure_occurrence(rule: &RecurringLesson, date: NaiveDate) -> Result<(), AppError> {
    if !rule.is_active {
        return Err(AppError::Conflict(format!(
            "recurring lesson {} is inactive; reactivate it before changing {}",
            rule.id,
            format_date_key(date)
        )));
    }
    if !is_occurrence(rule, date)? {
        return Err(ScheduleError::NotAnOccurrence {
            rule_id: rule.id.clone(),
            date,
        }
        .into());
    }
    Ok(())
}

/// 반복 규칙 값으로 오버라이드 행을 새로 만듭니다.
fn materialize(rule: &RecurringLesson, date: NaiveDate, status: LessonStatus) -> NewLesson {
    NewLesson {
        subject: rule.subject.clone(),
        lesson_type: rule.lesson_type,
        lesson_date: date,
        start_time: rule.start_time,
        end_time: rule.end_time,
        status,
        notes: rule.notes.clone(),
        student_id: rule.student_id.clone(),
        instructor_id: rule.instructor_id.clone(),
        created_by: rule.created_by.clone(),
        source_recurring_id: Some(rule.id.clone()),
    }
}

/// 날짜별 편집이 바꿀 수 있는 필드들
///
/// 새로 넣을 행(`NewLesson`)과 이미 있는 행(`Lesson`)이 같은 병합 로직을 쓰도록
/// 두 타입 모두 이 묶음으로 빌려줍니다.
struct EditableFields<'a> {
    subject: &'a mut String,
    lesson_type: &'a mut LessonType,
    start_time: &'a mut NaiveTime,
    end_time: &'a mut NaiveTime,
    notes: &'a mut Option<String>,
    instructor_id: &'a mut Option<String>,
}

impl<'a> From<&'a mut NewLesson> for EditableFields<'a> {
    fn from(new: &'a mut NewLesson) -> Self {
        Self {
            subject: &mut new.subject,
            lesson_type: &mut new.lesson_type,
            start_time: &mut new.start_time,
            end_time: &mut new.end_time,
            notes: &mut new.notes,
            instructor_id: &mut new.instructor_id,
        }
    }
}

impl<'a> From<&'a mut Lesson> for EditableFields<'a> {
    fn from(lesson: &'a mut Lesson) -> Self {
        Self {
            subject: &mut lesson.subject,
            lesson_type: &mut lesson.lesson_type,
            start_time: &mut lesson.start_time,
            end_time: &mut lesson.end_time,
            notes: &mut lesson.notes,
            instructor_id: &mut lesson.instructor_id,
        }
    }
}

/// `edits`에 있는 필드만 덮어쓰고, 결과의 시각 순서를 검증합니다.
fn apply_edits<'a>(
    target: impl Into<EditableFields<'a>>,
    edits: &OccurrenceEdits,
) -> Result<(), ScheduleError> {
    let target = target.into();
    if let Some(subject) = &edits.subject {
        *target.subject = subject.clone();
    }
    if let Some(lesson_type) = edits.lesson_type {
        *target.lesson_type = lesson_type;
    }
    if let Some(start_time) = edits.start_time {
        *target.start_time = start_time;
    }
    if let Some(end_time) = edits.end_time {
        *target.end_time = end_time;
    }
    if let Some(notes) = &edits.notes {
        *target.notes = notes.clone();
    }
    if let Some(instructor_id) = &edits.instructor_id {
        *target.instructor_id = instructor_id.clone();
    }

    if *target.end_time <= *target.start_time {
        return Err(ScheduleError::InvertedTimeRange {
            start: *target.start_time,
            end: *target.end_time,
        });
    }
    Ok(())
}

/// 반복 수업의 한 날짜를 편집 가능한 개별 수업으로 전환합니다.
///
/// - 오버라이드가 없으면: 규칙 값을 복사하고 `edits`를 적용한 새 행을 넣습니다.
/// - 이미 열리는 오버라이드가 있으면: 그 행에 `edits`를 적용합니다.
/// - 이미 휴강 처리된 날짜면: `Conflict`
pub async fn convert_to_single(
    pool: &SqlitePool,
    rule_id: &str,
    date: NaiveDate,
    edits: &OccurrenceEdits,
) -> Result<Lesson, AppError> {
    let rule = load_rule(pool, rule_id).await?;
    ensure_occurrence(&rule, date)?;

    let existing = db::find_overrides(pool, rule_id, date).await?;
    match Override::resolve(&existing) {
        Some(Override::Cancelled(_)) => Err(AppError::Conflict(format!(
            "{} is already cancelled for recurring lesson {rule_id}",
            format_date_key(date)
        ))),
        Some(Override::Active(current)) => {
            let mut updated = current.clone();
            apply_edits(&mut updated, edits)?;

            tracing::info!("Updating override {} of {} on {}", updated.id, rule_id, date);
            db::update_lesson(pool, &updated)
                .await?
                .ok_or(AppError::NotFound)
        }
        None => {
            let mut new = materialize(&rule, date, LessonStatus::Scheduled);
            apply_edits(&mut new, edits)?;

            let lesson = db::create_lesson(pool, &new).await?;
            tracing::info!("Converted {} on {} into lesson {}", rule_id, date, lesson.id);
            Ok(lesson)
        }
    }
}

/// 반복 수업의 한 날짜만 휴강 처리합니다.
///
/// 오버라이드가 없으면 휴강 상태의 행을 새로 만들고,
/// 있으면 같은 키의 행들을 휴강 상태로 바꿉니다. 이미 휴강이면 그대로 돌려줍니다.
pub async fn cancel_occurrence(
    pool: &SqlitePool,
    rule_id: &str,
    date: NaiveDate,
) -> Result<Lesson, AppError> {
    let rule = load_rule(pool, rule_id).await?;
    ensure_occurrence(&rule, date)?;

    let existing = db::find_overrides(pool, rule_id, date).await?;
    match Override::resolve(&existing) {
        None => {
            let lesson = db::create_lesson(pool, &materialize(&rule, date, LessonStatus::Cancelled)).await?;
            tracing::info!("Cancelled {} on {} (lesson {})", rule_id, date, lesson.id);
            Ok(lesson)
        }
        Some(Override::Cancelled(lesson)) => Ok(lesson.clone()),
        Some(Override::Active(lesson)) => {
            let cancelled = db::cancel_overrides(pool, rule_id, date).await?;
            tracing::info!("Cancelled {} override row(s) of {} on {}", cancelled, rule_id, date);
            db::get_lesson(pool, &lesson.id)
                .await?
                .ok_or(AppError::NotFound)
        }
    }
}

/// 시리즈 전체를 수정합니다.
///
/// 수정 결과가 검증을 통과해야 저장됩니다. 오버라이드 행은 건드리지 않습니다.
pub async fn edit_series(
    pool: &SqlitePool,
    rule_id: &str,
    req: &UpdateRecurringLessonRequest,
) -> Result<RecurringLesson, AppError> {
    let mut rule = load_rule(pool, rule_id).await?;

    if let Some(subject) = &req.subject {
        rule.subject = subject.clone();
    }
    if let Some(lesson_type) = req.lesson_type {
        rule.lesson_type = lesson_type;
    }
    if let Some(weekday) = req.weekday {
        rule.weekday = weekday;
    }
    if let Some(start_time) = req.start_time {
        rule.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        rule.end_time = end_time;
    }
    if let Some(valid_from) = req.valid_from {
        rule.valid_from = valid_from;
    }
    if let Some(valid_until) = req.valid_until {
        rule.valid_until = valid_until;
    }
    if let Some(is_active) = req.is_active {
        rule.is_active = is_active;
    }
    if let Some(notes) = &req.notes {
        rule.notes = notes.clone();
    }
    if let Some(instructor_id) = &req.instructor_id {
        rule.instructor_id = instructor_id.clone();
    }

    check_schedule(
        rule.weekday,
        rule.start_time,
        rule.end_time,
        rule.valid_from,
        rule.valid_until,
    )?;

    tracing::info!("Editing recurring lesson series {}", rule_id);
    db::update_recurring_lesson(pool, &rule)
        .await?
        .ok_or(AppError::NotFound)
}

/// 시리즈를 삭제합니다. 이미 만들어진 개별 수업 행은 남습니다.
pub async fn delete_series(pool: &SqlitePool, rule_id: &str) -> Result<(), AppError> {
    let deleted = db::delete_recurring_lesson(pool, rule_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    tracing::info!("Deleted recurring lesson series {}", rule_id);
    Ok(())
}
