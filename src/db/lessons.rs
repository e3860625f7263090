//! # 개별 수업 데이터베이스 쿼리 모듈
//!
//! `lessons` 테이블 쿼리 함수들입니다.
//! 단발 수업과 반복 수업 오버라이드가 같은 테이블에 들어 있고,
//! `source_recurring_id` 유무로 구분합니다.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::*;

const COLUMNS: &str = r#"
    id, subject, lesson_type, lesson_date, start_time, end_time, status, notes,
    student_id, instructor_id, created_by, source_recurring_id, created_at, updated_at
"#;

pub async fn create_lesson(pool: &SqlitePool, new: &NewLesson) -> Result<Lesson, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO lessons
            (id, subject, lesson_type, lesson_date, start_time, end_time, status, notes,
             student_id, instructor_id, created_by, source_recurring_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&new.subject)
    .bind(new.lesson_type)
    .bind(new.lesson_date) // NaiveDate → 'YYYY-MM-DD'
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.status)
    .bind(&new.notes)
    .bind(&new.student_id)
    .bind(&new.instructor_id)
    .bind(&new.created_by)
    .bind(&new.source_recurring_id)
    .execute(pool)
    .await?;

    get_lesson(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created lesson".to_string()))
}

pub async fn get_lesson(pool: &SqlitePool, id: &str) -> Result<Option<Lesson>, AppError> {
    let lesson = sqlx::query_as::<_, Lesson>(&format!("SELECT {COLUMNS} FROM lessons WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(lesson)
}

/// `[start, end]` 구간(양 끝 포함)의 수업을 날짜, 시작 시각 순으로 조회합니다.
///
/// 휴강 행도 함께 돌려줍니다. 투영은 휴강 오버라이드를 보고
/// 반복 수업을 숨겨야 하기 때문입니다.
pub async fn list_lessons(
    pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
    student_id: Option<&str>,
    instructor_id: Option<&str>,
) -> Result<Vec<Lesson>, AppError> {
    let lessons = sqlx::query_as::<_, Lesson>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM lessons
        WHERE lesson_date BETWEEN ? AND ?
          AND (? IS NULL OR student_id = ?)
          AND (? IS NULL OR instructor_id = ?)
        ORDER BY lesson_date, start_time, id
        "#
    ))
    .bind(start)
    .bind(end)
    .bind(student_id)
    .bind(student_id)
    .bind(instructor_id)
    .bind(instructor_id)
    .fetch_all(pool)
    .await?;

    Ok(lessons)
}

/// 반복 규칙의 특정 날짜를 덮어쓰는 행들을 조회합니다.
///
/// 정상이라면 0개 또는 1개지만, 여러 개가 있어도 모두 돌려줍니다.
pub async fn find_overrides(
    pool: &SqlitePool,
    rule_id: &str,
    date: NaiveDate,
) -> Result<Vec<Lesson>, AppError> {
    let lessons = sqlx::query_as::<_, Lesson>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM lessons
        WHERE source_recurring_id = ? AND lesson_date = ?
        ORDER BY created_at, id
        "#
    ))
    .bind(rule_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(lessons)
}

/// 수업 행 전체를 주어진 값으로 덮어씁니다.
///
/// `student_id`, `created_by`, `source_recurring_id`는 생성 후 바뀌지 않으므로 쓰지 않습니다.
pub async fn update_lesson(pool: &SqlitePool, lesson: &Lesson) -> Result<Option<Lesson>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE lessons
        SET subject = ?, lesson_type = ?, lesson_date = ?, start_time = ?, end_time = ?,
            status = ?, notes = ?, instructor_id = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&lesson.subject)
    .bind(lesson.lesson_type)
    .bind(lesson.lesson_date)
    .bind(lesson.start_time)
    .bind(lesson.end_time)
    .bind(lesson.status)
    .bind(&lesson.notes)
    .bind(&lesson.instructor_id)
    .bind(&lesson.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_lesson(pool, &lesson.id).await
}

/// `(규칙, 날짜)`의 오버라이드 행 중 아직 휴강이 아닌 것을 모두 휴강으로 바꿉니다.
///
/// 바뀐 행 수를 반환합니다.
pub async fn cancel_overrides(
    pool: &SqlitePool,
    rule_id: &str,
    date: NaiveDate,
) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE lessons
        SET status = 'cancelled',
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE source_recurring_id = ? AND lesson_date = ? AND status != 'cancelled'
        "#,
    )
    .bind(rule_id)
    .bind(date)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_lesson(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
