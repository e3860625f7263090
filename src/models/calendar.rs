//! # 캘린더 투영(projection) 모델
//!
//! 캘린더 화면에 그릴 수업 항목들입니다. DB에 저장되지 않고
//! 조회할 때마다 `services::projection::project`가 새로 만듭니다.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Lesson, RecurringLesson};

/// 캘린더 항목의 식별자
///
/// 반복 수업에서 계산된 항목은 DB 행이 없으므로 `(규칙 ID, 날짜)` 쌍이 곧 식별자입니다.
/// 문자열을 이어 붙이지 않고 복합 키로 두어, ID에 구분자가 들어 있어도 충돌하지 않습니다.
/// 같은 구간을 여러 번 조회해도 같은 값이 나오므로 프론트엔드가 키로 쓸 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccurrenceId {
    /// `lessons` 테이블의 행
    Lesson { lesson_id: String },
    /// 반복 규칙에서 계산된 날짜
    RecurringInstance { rule_id: String, date: NaiveDate },
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceId::Lesson { lesson_id } => write!(f, "lesson {lesson_id}"),
            OccurrenceId::RecurringInstance { rule_id, date } => {
                write!(f, "recurring {rule_id} on {date}")
            }
        }
    }
}

/// 항목이 어디서 왔는지
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Single,
    RecurringInstance,
}

/// 항목의 원본 레코드
///
/// 사용자가 항목을 클릭했을 때 수정/휴강 명령에 필요한 정보
/// (`source_recurring_id` 유무, 수업 날짜)를 그대로 담고 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OccurrenceResource {
    Lesson(Lesson),
    Recurring {
        rule: RecurringLesson,
        lesson_date: NaiveDate,
    },
}

impl OccurrenceResource {
    pub fn lesson_date(&self) -> NaiveDate {
        match self {
            OccurrenceResource::Lesson(lesson) => lesson.lesson_date,
            OccurrenceResource::Recurring { lesson_date, .. } => *lesson_date,
        }
    }

    pub fn instructor_id(&self) -> Option<&str> {
        match self {
            OccurrenceResource::Lesson(lesson) => lesson.instructor_id.as_deref(),
            OccurrenceResource::Recurring { rule, .. } => rule.instructor_id.as_deref(),
        }
    }
}

/// 캘린더에 그릴 수업 한 건
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedOccurrence {
    pub id: OccurrenceId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub source_kind: SourceKind,
    pub resource: OccurrenceResource,
}

/// 캘린더 보기 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarView {
    Day,
    Week,
    Month,
}

/// `GET /api/v1/calendar`의 쿼리 파라미터
///
/// 구간은 `start`/`end`로 직접 주거나, `view`와 기준 `date`로 줍니다.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub view: Option<CalendarView>,
    pub date: Option<NaiveDate>,
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
}
