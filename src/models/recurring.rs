//! # 반복 수업 규칙 모델 정의
//!
//! 매주 같은 요일, 같은 시간에 열리는 수업 시리즈를 나타냅니다.
//! 규칙 자체는 날짜별 행을 만들지 않습니다. 캘린더를 조회할 때마다
//! `services::projection`이 조회 구간 안의 수업일을 계산해 펼칩니다.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::lesson::{double_option, LessonType};

/// 반복 수업 규칙 엔티티 — DB의 `recurring_lessons` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecurringLesson {
    pub id: String,
    pub subject: String,
    pub lesson_type: LessonType,
    /// 0 = 일요일 ... 6 = 토요일
    /// DB에 이미 저장된 잘못된 값도 읽을 수 있도록 정수 그대로 둡니다.
    pub weekday: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// 유효 기간 시작일 (포함)
    pub valid_from: NaiveDate,
    /// 유효 기간 종료일 (포함). None이면 종료일 없이 계속됩니다.
    pub valid_until: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub student_id: String,
    pub instructor_id: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// 반복 규칙 생성 요청 — `POST /api/v1/recurring-lessons`의 요청 본문
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecurringLessonRequest {
    pub subject: String,
    pub lesson_type: LessonType,
    pub weekday: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub student_id: String,
    pub instructor_id: Option<String>,
    pub created_by: String,
}

/// 시리즈 전체 수정 요청 — `PATCH /api/v1/recurring-lessons/{id}`의 요청 본문
///
/// 여기서 바꾼 값은 앞으로의 모든 투영 결과에 반영되지만,
/// 이미 만들어진 개별 수업(오버라이드) 행은 건드리지 않습니다.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecurringLessonRequest {
    pub subject: Option<String>,
    pub lesson_type: Option<LessonType>,
    pub weekday: Option<i64>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub valid_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub valid_until: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instructor_id: Option<Option<String>>,
}

/// 반복 규칙 목록 조회 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct RecurringLessonListQuery {
    #[serde(default)]
    pub active_only: bool,
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
}

/// 특정 날짜를 개별 수업으로 전환할 때 함께 바꿀 값
///
/// `POST /api/v1/recurring-lessons/{id}/occurrences/{date}/convert`의 요청 본문입니다.
/// 비어 있으면 규칙의 값이 그대로 복사됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccurrenceEdits {
    pub subject: Option<String>,
    pub lesson_type: Option<LessonType>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instructor_id: Option<Option<String>>,
}

