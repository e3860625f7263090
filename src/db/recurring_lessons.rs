//! # 반복 수업 규칙 데이터베이스 쿼리 모듈
//!
//! `recurring_lessons` 테이블의 생성, 조회, 수정, 삭제를 담당합니다.
//! 값 검증은 호출하는 쪽(`services::projection::check_schedule`)에서 끝낸 뒤 들어옵니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

const COLUMNS: &str = r#"
    id, subject, lesson_type, weekday, start_time, end_time,
    valid_from, valid_until, is_active, notes,
    student_id, instructor_id, created_by, created_at, updated_at
"#;

/// 새 반복 규칙을 저장하고 저장된 행을 반환합니다.
///
/// 새 규칙은 항상 활성 상태(`is_active = 1`)로 시작합니다.
pub async fn create_recurring_lesson(
    pool: &SqlitePool,
    req: &CreateRecurringLessonRequest,
) -> Result<RecurringLesson, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO recurring_lessons
            (id, subject, lesson_type, weekday, start_time, end_time,
             valid_from, valid_until, is_active, notes,
             student_id, instructor_id, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.subject)
    .bind(req.lesson_type)
    .bind(req.weekday)
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(req.valid_from)
    .bind(req.valid_until) // None이면 SQL NULL (종료일 없음)
    .bind(&req.notes)
    .bind(&req.student_id)
    .bind(&req.instructor_id)
    .bind(&req.created_by)
    .execute(pool)
    .await?;

    get_recurring_lesson(pool, &id)
        .await?
        .ok_or(AppError::Internal(
            "Failed to retrieve created recurring lesson".to_string(),
        ))
}

pub async fn get_recurring_lesson(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<RecurringLesson>, AppError> {
    let rule = sqlx::query_as::<_, RecurringLesson>(&format!(
        "SELECT {COLUMNS} FROM recurring_lessons WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(rule)
}

/// 반복 규칙 목록을 요일, 시작 시각 순으로 조회합니다.
///
/// 필터는 `(? IS NULL OR 컬럼 = ?)` 형태라서 값이 None이면 조건이 사라집니다.
/// 같은 값을 두 번 바인딩하는 이유가 이것입니다.
pub async fn list_recurring_lessons(
    pool: &SqlitePool,
    query: &RecurringLessonListQuery,
) -> Result<Vec<RecurringLesson>, AppError> {
    let rules = sqlx::query_as::<_, RecurringLesson>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM recurring_lessons
        WHERE (? = 0 OR is_active = 1)
          AND (? IS NULL OR student_id = ?)
          AND (? IS NULL OR instructor_id = ?)
        ORDER BY weekday, start_time, id
        "#
    ))
    .bind(query.active_only)
    .bind(&query.student_id)
    .bind(&query.student_id)
    .bind(&query.instructor_id)
    .bind(&query.instructor_id)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// 캘린더 투영에 넘길 활성 규칙만 조회합니다.
pub async fn list_active_recurring_lessons(
    pool: &SqlitePool,
    student_id: Option<&str>,
) -> Result<Vec<RecurringLesson>, AppError> {
    let query = RecurringLessonListQuery {
        active_only: true,
        student_id: student_id.map(str::to_string),
        instructor_id: None,
    };
    list_recurring_lessons(pool, &query).await
}

/// 규칙 행 전체를 주어진 값으로 덮어씁니다.
///
/// PATCH 병합은 `services::overrides::edit_series`가 먼저 끝내고,
/// 여기서는 병합된 결과를 한 번의 UPDATE로 저장합니다.
///
/// ## 반환값
/// - `Ok(Some(RecurringLesson))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 규칙이 없음
pub async fn update_recurring_lesson(
    pool: &SqlitePool,
    rule: &RecurringLesson,
) -> Result<Option<RecurringLesson>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE recurring_lessons
        SET subject = ?, lesson_type = ?, weekday = ?, start_time = ?, end_time = ?,
            valid_from = ?, valid_until = ?, is_active = ?, notes = ?, instructor_id = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&rule.subject)
    .bind(rule.lesson_type)
    .bind(rule.weekday)
    .bind(rule.start_time)
    .bind(rule.end_time)
    .bind(rule.valid_from)
    .bind(rule.valid_until)
    .bind(rule.is_active)
    .bind(&rule.notes)
    .bind(&rule.instructor_id)
    .bind(&rule.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_recurring_lesson(pool, &rule.id).await
}

/// 규칙을 삭제합니다.
///
/// `lessons.source_recurring_id`에는 외래키가 없으므로 오버라이드 행은 그대로 남습니다.
pub async fn delete_recurring_lesson(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM recurring_lessons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
