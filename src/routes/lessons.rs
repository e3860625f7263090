//! # 개별 수업(Lesson) 라우트 핸들러
//!
//! 단발 수업의 생성/조회/수정/삭제를 처리합니다.
//! 오버라이드 행도 같은 엔드포인트로 조회하고 직접 수정할 수 있습니다.
//!
//! ## 엔드포인트
//! - `GET    /api/v1/lessons?start=&end=` → 구간 안의 수업 목록 (휴강 포함)
//! - `POST   /api/v1/lessons`             → 단발 수업 생성
//! - `GET    /api/v1/lessons/{id}`        → 단일 수업 조회
//! - `PATCH  /api/v1/lessons/{id}`        → 수업 수정 (상태 변경 포함)
//! - `DELETE /api/v1/lessons/{id}`        → 수업 삭제

use crate::{
    db,
    error::{AppError, ScheduleError},
    models::*,
    services::DateRange,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 연결 풀은 main에서 한 번 만들어 여기에 넣고, 전역 변수로 두지 않습니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
}

/// `GET /lessons` — 구간 안의 수업 목록
///
/// 응답: `{ "lessons": [...] }`
pub async fn list_lessons(
    State(state): State<AppState>,
    Query(query): Query<LessonListQuery>,
) -> Result<Json<Value>, AppError> {
    let range = DateRange::new(query.start, query.end)?;
    let lessons = db::list_lessons(
        &state.pool,
        range.start(),
        range.end(),
        query.student_id.as_deref(),
        query.instructor_id.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "lessons": lessons })))
}

/// `POST /lessons` — 반복 규칙과 무관한 단발 수업을 만듭니다.
pub async fn create_lesson(
    State(state): State<AppState>,
    Json(req): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    if req.subject.trim().is_empty() {
        return Err(AppError::BadRequest("subject must not be empty".to_string()));
    }
    if req.end_time <= req.start_time {
        return Err(ScheduleError::InvertedTimeRange {
            start: req.start_time,
            end: req.end_time,
        }
        .into());
    }

    let lesson = db::create_lesson(&state.pool, &NewLesson::from(req)).await?;
    tracing::debug!("Created lesson {} on {}", lesson.id, lesson.lesson_date);
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// `GET /lessons/{id}`
pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = db::get_lesson(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(lesson))
}

/// `PATCH /lessons/{id}` — 수업을 직접 수정합니다.
///
/// 오버라이드 행의 날짜는 바꿀 수 없습니다.
/// 날짜가 `(규칙, 날짜)` 매칭 키라서, 바꾸면 원래 날짜에 반복 수업이 다시 나타나기 때문입니다.
pub async fn update_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateLessonRequest>,
) -> Result<Json<Lesson>, AppError> {
    let mut lesson = db::get_lesson(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(lesson_date) = req.lesson_date {
        if lesson.is_override() && lesson_date != lesson.lesson_date {
            return Err(AppError::BadRequest(
                "the date of a recurring lesson override cannot be changed".to_string(),
            ));
        }
        lesson.lesson_date = lesson_date;
    }
    if let Some(subject) = req.subject {
        lesson.subject = subject;
    }
    if let Some(lesson_type) = req.lesson_type {
        lesson.lesson_type = lesson_type;
    }
    if let Some(start_time) = req.start_time {
        lesson.start_time = start_time;
    }
    if let Some(end_time) = req.end_time {
        lesson.end_time = end_time;
    }
    if let Some(status) = req.status {
        lesson.status = status;
    }
    if let Some(notes) = req.notes {
        lesson.notes = notes;
    }
    if let Some(instructor_id) = req.instructor_id {
        lesson.instructor_id = instructor_id;
    }

    if lesson.end_time <= lesson.start_time {
        return Err(ScheduleError::InvertedTimeRange {
            start: lesson.start_time,
            end: lesson.end_time,
        }
        .into());
    }

    let lesson = db::update_lesson(&state.pool, &lesson)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(lesson))
}

/// `DELETE /lessons/{id}` → `204 No Content`
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = db::delete_lesson(&state.pool, &id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
