//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `lesson`: 개별 수업(단발 수업과 오버라이드)
//! - `recurring`: 주간 반복 수업 규칙
//! - `calendar`: 캘린더 화면용 투영 결과
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Lesson`처럼 짧게 접근합니다.

pub mod calendar;
pub mod lesson;
pub mod recurring;

pub use calendar::*;
pub use lesson::*;
pub use recurring::*;
