//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `calendar`: 캘린더 투영 조회
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `lessons`: 개별 수업 CRUD, 그리고 공유 상태 `AppState`
//! - `recurring_lessons`: 반복 시리즈 CRUD와 날짜별 전환/휴강

pub mod calendar;
pub mod health;
pub mod lessons;
pub mod recurring_lessons;

// `routes::get_calendar`처럼 바로 접근할 수 있게 재공개합니다.
pub use calendar::*;
pub use health::*;
pub use lessons::*;
pub use recurring_lessons::*;
