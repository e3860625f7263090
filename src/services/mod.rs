//! # 비즈니스 로직 모듈
//!
//! - `dates`: 요일 계산, 날짜 키, 조회 구간
//! - `projection`: 반복 규칙 + 개별 수업 → 캘린더 항목 (I/O 없는 순수 계산)
//! - `overrides`: 반복 시리즈에 대한 전환/휴강/수정/삭제 명령

pub mod dates;
pub mod overrides;
pub mod projection;

pub use dates::DateRange;
