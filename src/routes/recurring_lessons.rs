//! # 반복 수업 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/recurring-lessons | `list_recurring_lessons` | 규칙 목록 |
//! | POST | /api/v1/recurring-lessons | `create_recurring_lesson` | 새 시리즈 생성 |
//! | GET | /api/v1/recurring-lessons/{id} | `get_recurring_lesson` | 규칙 조회 |
//! | PATCH | /api/v1/recurring-lessons/{id} | `update_recurring_lesson` | 시리즈 전체 수정 |
//! | DELETE | /api/v1/recurring-lessons/{id} | `delete_recurring_lesson` | 시리즈 삭제 |
//! | POST | /api/v1/recurring-lessons/{id}/occurrences/{date}/convert | `convert_occurrence` | 이 날짜만 개별 수업으로 |
//! | POST | /api/v1/recurring-lessons/{id}/occurrences/{date}/cancel | `cancel_occurrence` | 이 날짜만 휴강 |
//!
//! `{date}`는 `YYYY-MM-DD` 형식이어야 합니다.
//! 중단된(`is_active = false`) 시리즈에 대한 전환/휴강은 409를 돌려줍니다.

use crate::{
    db,
    error::AppError,
    models::*,
    routes::lessons::AppState,
    services::{dates::parse_date_key, overrides, projection::check_schedule},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /recurring-lessons` → `{ "recurring_lessons": [...] }`
pub async fn list_recurring_lessons(
    State(state): State<AppState>,
    Query(query): Query<RecurringLessonListQuery>,
) -> Result<Json<Value>, AppError> {
    let rules = db::list_recurring_lessons(&state.pool, &query).await?;
    Ok(Json(json!({ "recurring_lessons": rules })))
}

/// `POST /recurring-lessons` — 새 주간 반복 시리즈를 만듭니다.
///
/// 요일 범위, 시각 순서, 유효 기간을 여기서 검증합니다.
/// 잘못된 규칙은 저장 단계에서 막아야 투영 중에 건너뛰는 일이 없습니다.
pub async fn create_recurring_lesson(
    State(state): State<AppState>,
    Json(req): Json<CreateRecurringLessonRequest>,
) -> Result<(StatusCode, Json<RecurringLesson>), AppError> {
    if req.subject.trim().is_empty() {
        return Err(AppError::BadRequest("subject must not be empty".to_string()));
    }
    check_schedule(
        req.weekday,
        req.start_time,
        req.end_time,
        req.valid_from,
        req.valid_until,
    )?;

    let rule = db::create_recurring_lesson(&state.pool, &req).await?;
    tracing::info!("Created recurring lesson {} (weekday {})", rule.id, rule.weekday);
    Ok((StatusCode::CREATED, Json(rule)))
}

/// `GET /recurring-lessons/{id}`
pub async fn get_recurring_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecurringLesson>, AppError> {
    let rule = db::get_recurring_lesson(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(rule))
}

/// `PATCH /recurring-lessons/{id}` — 시리즈 전체를 수정합니다.
///
/// `{ "is_active": false }`를 보내면 시리즈를 삭제하지 않고 중단합니다.
pub async fn update_recurring_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRecurringLessonRequest>,
) -> Result<Json<RecurringLesson>, AppError> {
    let rule = overrides::edit_series(&state.pool, &id, &req).await?;
    Ok(Json(rule))
}

/// `DELETE /recurring-lessons/{id}` → `204 No Content`
pub async fn delete_recurring_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    overrides::delete_series(&state.pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /recurring-lessons/{id}/occurrences/{date}/convert`
///
/// 본문은 선택입니다. 보내지 않으면 규칙 값 그대로 개별 수업이 만들어집니다.
/// 예: `{ "subject": "보강: 수학", "start_time": "18:00:00" }`
pub async fn convert_occurrence(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
    edits: Option<Json<OccurrenceEdits>>,
) -> Result<Json<Lesson>, AppError> {
    let date = parse_date_key(&date)?;
    let edits = edits.map(|Json(edits)| edits).unwrap_or_default();
    let lesson = overrides::convert_to_single(&state.pool, &id, date, &edits).await?;
    Ok(Json(lesson))
}

/// `POST /recurring-lessons/{id}/occurrences/{date}/cancel`
pub async fn cancel_occurrence(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<Lesson>, AppError> {
    let date = parse_date_key(&date)?;
    let lesson = overrides::cancel_occurrence(&state.pool, &id, date).await?;
    Ok(Json(lesson))
}
