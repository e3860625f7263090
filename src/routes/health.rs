//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "db_healthy": true }`

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::routes::lessons::AppState;

/// `GET /health` — 서버와 데이터베이스 연결 상태를 확인합니다.
///
/// DB 확인이 실패해도 200을 반환하고 `db_healthy: false`로만 알립니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_healthy = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check could not reach the database");
    }

    Json(json!({
        "status": "ok",
        "db_healthy": db_healthy,
    }))
}
