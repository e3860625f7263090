//! # 개별 수업 모델 정의
//!
//! 날짜가 정해진 수업 한 건을 나타내는 구조체들입니다.
//! 개별 수업은 두 가지 방식으로 생깁니다:
//! 1. 관리자/강사가 단발 수업으로 직접 만든 경우 (`source_recurring_id = None`)
//! 2. 반복 수업의 특정 날짜를 수정하거나 휴강 처리해서 만들어진 경우
//!    (`source_recurring_id = Some(규칙 ID)`, 이런 행을 "오버라이드"라고 부릅니다)

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 수업 방식
///
/// DB와 JSON 모두 snake_case 문자열(`video`, `face_to_face`)로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LessonType {
    /// 화상 수업
    Video,
    /// 대면 수업
    FaceToFace,
}

/// 수업 진행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// 개별 수업 엔티티 — DB의 `lessons` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    /// 수업 고유 식별자 (UUIDv7)
    pub id: String,
    pub subject: String,
    pub lesson_type: LessonType,
    /// 수업 날짜. DB에는 `YYYY-MM-DD` 문자열로 저장되며,
    /// 반복 규칙에서 계산한 날짜와 이 값으로 오버라이드를 매칭합니다.
    pub lesson_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: LessonStatus,
    pub notes: Option<String>,
    pub student_id: String,
    pub instructor_id: Option<String>,
    pub created_by: String,
    /// 이 수업이 덮어쓰는 반복 규칙의 ID. 단발 수업이면 None
    pub source_recurring_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Lesson {
    /// 반복 규칙의 특정 날짜를 덮어쓰는 행인지 여부
    pub fn is_override(&self) -> bool {
        self.source_recurring_id.is_some()
    }
}

/// DB에 새 수업 행을 넣을 때 쓰는 값 묶음
///
/// 라우트의 생성 요청과 오버라이드 명령이 모두 이 구조체를 거쳐 `db::create_lesson`을 호출합니다.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub subject: String,
    pub lesson_type: LessonType,
    pub lesson_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: LessonStatus,
    pub notes: Option<String>,
    pub student_id: String,
    pub instructor_id: Option<String>,
    pub created_by: String,
    pub source_recurring_id: Option<String>,
}

/// 단발 수업 생성 요청 — `POST /api/v1/lessons`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub subject: String,
    pub lesson_type: LessonType,
    pub lesson_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub student_id: String,
    pub instructor_id: Option<String>,
    pub created_by: String,
}

impl From<CreateLessonRequest> for NewLesson {
    fn from(req: CreateLessonRequest) -> Self {
        Self {
            subject: req.subject,
            lesson_type: req.lesson_type,
            lesson_date: req.lesson_date,
            start_time: req.start_time,
            end_time: req.end_time,
            status: LessonStatus::Scheduled,
            notes: req.notes,
            student_id: req.student_id,
            instructor_id: req.instructor_id,
            created_by: req.created_by,
            source_recurring_id: None,
        }
    }
}

/// 수업 수정 요청 — `PATCH /api/v1/lessons/{id}`의 요청 본문
///
/// PATCH이므로 모든 필드가 Option입니다. 빠진 필드는 그대로 유지됩니다.
/// `notes`와 `instructor_id`는 `Option<Option<_>>`:
/// None = 필드 누락 (변경 안 함), Some(None) = null (비우기), Some(Some(v)) = 값 지정
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLessonRequest {
    pub subject: Option<String>,
    pub lesson_type: Option<LessonType>,
    pub lesson_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<LessonStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instructor_id: Option<Option<String>>,
}

/// 수업 목록 조회 쿼리 — `GET /api/v1/lessons?start=...&end=...`
#[derive(Debug, Deserialize)]
pub struct LessonListQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub student_id: Option<String>,
    pub instructor_id: Option<String>,
}

/// JSON에서 "필드 없음"과 "null"을 구분하기 위한 역직렬화 도우미
///
/// `#[serde(default)]`와 함께 쓰면 필드가 없을 때는 None,
/// `null`이면 Some(None), 값이 있으면 Some(Some(v))가 됩니다.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
