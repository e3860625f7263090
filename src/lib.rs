//! # jukubase 라이브러리 루트
//!
//! 학원의 수업 일정(단발 수업, 주간 반복 수업, 날짜별 변경/휴강)을 관리하는 백엔드입니다.
//! main.rs와 통합 테스트(tests/)가 같은 라우터를 쓰도록 모듈과 라우터 조립 함수를 공개합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use routes::lessons::AppState;

/// `/api/v1` 아래에 붙일 API 라우트
///
/// axum 0.8부터 경로 파라미터는 `{id}` 문법을 씁니다.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        // 개별 수업 CRUD
        .route("/lessons", get(routes::list_lessons).post(routes::create_lesson))
        .route(
            "/lessons/{id}",
            get(routes::get_lesson)
                .patch(routes::update_lesson)
                .delete(routes::delete_lesson),
        )
        // 반복 시리즈 CRUD
        .route(
            "/recurring-lessons",
            get(routes::list_recurring_lessons).post(routes::create_recurring_lesson),
        )
        .route(
            "/recurring-lessons/{id}",
            get(routes::get_recurring_lesson)
                .patch(routes::update_recurring_lesson)
                .delete(routes::delete_recurring_lesson),
        )
        // 날짜 하나만 바꾸는 명령
        .route(
            "/recurring-lessons/{id}/occurrences/{date}/convert",
            post(routes::convert_occurrence),
        )
        .route(
            "/recurring-lessons/{id}/occurrences/{date}/cancel",
            post(routes::cancel_occurrence),
        )
        // 캘린더 투영
        .route("/calendar", get(routes::get_calendar))
        .with_state(state)
}

/// API 라우트를 `/api/v1`에 붙이고 CORS, 요청 로깅 미들웨어를 씌웁니다.
///
/// 프론트엔드 정적 파일 서빙은 main에서 `fallback_service`로 덧붙입니다.
pub fn build_router(state: AppState) -> Router {
    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
