//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `ScheduleError`: 수업 일정 계산에서 생기는 검증 에러 (요일 범위, 날짜 구간 등)
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use thiserror::Error;

/// 일정 계산 단계의 검증 에러
///
/// 날짜 계산(`services::dates`)과 규칙 검증에서 반환됩니다.
/// 라우트에서는 `AppError::Validation`으로 감싸져 400 응답이 됩니다.
/// 투영(projection) 중에는 이 에러를 던지지 않고 로그만 남긴 뒤 해당 행을 건너뜁니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// 요일 값이 0(일요일)~6(토요일) 범위를 벗어남
    #[error("weekday must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidWeekday(i64),

    /// 반복 규칙의 유효 기간이 뒤집힘 (valid_until < valid_from)
    #[error("valid_until {until} is before valid_from {from}")]
    InvertedWindow { from: NaiveDate, until: NaiveDate },

    /// 종료 시각이 시작 시각보다 늦지 않음
    #[error("end_time {end} must be after start_time {start}")]
    InvertedTimeRange { start: NaiveTime, end: NaiveTime },

    /// 조회 구간의 시작일이 종료일보다 늦음
    #[error("range start {start} is after range end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    /// 계산 결과가 chrono가 표현할 수 있는 날짜 범위를 벗어남
    /// 예: 최대 날짜 근처의 주간/월간 보기
    #[error("date {0} is too close to the calendar limit")]
    OutOfCalendar(NaiveDate),

    /// `YYYY-MM-DD` 형식이 아닌 날짜 문자열
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDateKey(String),

    /// 해당 날짜가 반복 규칙의 수업일이 아님 (요일 불일치 또는 유효 기간 밖)
    #[error("{date} is not an occurrence of recurring lesson {rule_id}")]
    NotAnOccurrence { rule_id: String, date: NaiveDate },
}

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 일정 검증 실패 (HTTP 400)
    /// #[from] 덕분에 `ScheduleError`에 `?`를 쓰면 자동으로 이 variant가 됩니다.
    #[error("Validation error: {0}")]
    Validation(#[from] ScheduleError),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 리소스 충돌 (HTTP 409)
    /// 예: 이미 휴강 처리된 날짜를 개별 수업으로 전환하려는 경우
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Validation(ref e) => {
                (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
