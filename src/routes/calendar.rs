//! # 캘린더 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/calendar?start=2024-03-01&end=2024-03-31`
//! - `GET /api/v1/calendar?view=month&date=2024-03-15`
//!
//! 선택 파라미터 `student_id`, `instructor_id`로 한 사람의 수업만 볼 수 있습니다.
//!
//! 핸들러는 두 저장소를 읽은 뒤 `services::projection::project`에 넘기기만 합니다.
//! 수업을 추가/수정/휴강한 뒤에는 프론트엔드가 이 엔드포인트를 다시 호출해 화면을 갱신합니다.

use crate::{
    db,
    error::AppError,
    models::*,
    routes::lessons::AppState,
    services::{projection, DateRange},
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

/// 쿼리 파라미터를 조회 구간으로 바꿉니다.
///
/// - `start`와 `end`가 모두 있으면 그대로 사용
/// - 아니면 `view`(day/week/month)와 기준 `date`로 계산 (`date`가 없으면 오늘)
/// - 달력 끝에 걸려 구간을 만들 수 없는 날짜는 검증 에러(400)
pub fn resolve_range(query: &CalendarQuery) -> Result<DateRange, AppError> {
    match (query.start, query.end, query.view) {
        (Some(start), Some(end), _) => Ok(DateRange::new(start, end)?),
        (None, None, Some(view)) => {
            let date = query
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let range = match view {
                CalendarView::Day => DateRange::day(date),
                CalendarView::Week => DateRange::week(date)?,
                CalendarView::Month => DateRange::month(date)?,
            };
            Ok(range)
        }
        _ => Err(AppError::BadRequest(
            "either both start and end, or view, is required".to_string(),
        )),
    }
}

/// `GET /calendar` → `{ "range": { "start", "end" }, "occurrences": [...] }`
///
/// 학생 필터는 SQL에서 바로 겁니다. 오버라이드는 학생을 바꿀 수 없으므로 안전합니다.
/// 강사 필터는 투영이 끝난 뒤에 겁니다. 오버라이드에서 강사를 바꿨을 수 있어서,
/// 미리 걸러 버리면 원래 강사의 반복 수업이 그 날짜에 다시 나타나기 때문입니다.
pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let range = resolve_range(&query)?;
    let student_id = query.student_id.as_deref();

    let rules = db::list_active_recurring_lessons(&state.pool, student_id).await?;
    let lessons = db::list_lessons(&state.pool, range.start(), range.end(), student_id, None).await?;

    let mut occurrences = projection::project(&rules, &lessons, range);
    if let Some(instructor_id) = query.instructor_id.as_deref() {
        occurrences.retain(|o| o.resource.instructor_id() == Some(instructor_id));
    }

    tracing::debug!(
        "Projected {} occurrence(s) for {}..{} from {} rule(s) and {} lesson(s)",
        occurrences.len(),
        range.start(),
        range.end(),
        rules.len(),
        lessons.len()
    );

    Ok(Json(json!({
        "range": range,
        "occurrences": occurrences,
    })))
}
