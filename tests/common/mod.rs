//! 통합 테스트 공용 도우미
//!
//! 테스트마다 인메모리 SQLite에 마이그레이션을 적용한 새 풀을 만듭니다.
//! `sqlite::memory:`는 연결마다 별도 DB이므로 연결 수를 1로 고정합니다.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use jukubase::models::{CreateRecurringLessonRequest, LessonType, RecurringLesson};
use jukubase::{build_router, db, AppState};

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

pub fn build_test_app(pool: SqlitePool) -> Router {
    build_router(AppState { pool })
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 2024-01-01부터 종료일 없이 매주 금요일 17:00-18:00에 열리는 수학 수업
pub fn friday_math() -> CreateRecurringLessonRequest {
    CreateRecurringLessonRequest {
        subject: "Math".to_string(),
        lesson_type: LessonType::FaceToFace,
        weekday: 5,
        start_time: time(17, 0),
        end_time: time(18, 0),
        valid_from: date(2024, 1, 1),
        valid_until: None,
        notes: None,
        student_id: "student-1".to_string(),
        instructor_id: Some("instructor-1".to_string()),
        created_by: "admin".to_string(),
    }
}

pub async fn seed_rule(pool: &SqlitePool, req: &CreateRecurringLessonRequest) -> RecurringLesson {
    db::create_recurring_lesson(pool, req).await.unwrap()
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
