//! # 날짜 계산 유틸리티
//!
//! 타임존 없는 달력 날짜(`NaiveDate`)만 다루는 순수 함수들입니다.
//!
//! - 요일 번호(0 = 일요일 ... 6 = 토요일) ↔ `chrono::Weekday` 변환
//! - 기준일 이후/이전의 특정 요일 찾기
//! - `YYYY-MM-DD` 날짜 키 포맷/파싱
//! - 캘린더 보기(일/주/월)에 맞는 조회 구간 계산
//!
//! 날짜 키 문자열은 반복 규칙에서 계산한 날짜와 `lessons.lesson_date`를
//! 맞춰 보는 기준이므로, 항상 0으로 채운 `YYYY-MM-DD` 형식이어야 합니다.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::ScheduleError;

/// 요일 번호를 `Weekday`로 바꿉니다. 0 = 일요일, 6 = 토요일.
///
/// 범위를 벗어난 값은 7로 나눈 나머지로 감싸지 않고 바로 에러를 반환합니다.
pub fn weekday_from_index(index: i64) -> Result<Weekday, ScheduleError> {
    let weekday = match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        other => return Err(ScheduleError::InvalidWeekday(other)),
    };
    Ok(weekday)
}

/// `Weekday`를 요일 번호(0 = 일요일)로 바꿉니다.
pub fn weekday_index(weekday: Weekday) -> i64 {
    i64::from(weekday.num_days_from_sunday())
}

/// `base` 이후(당일 포함) 처음으로 `weekday`에 해당하는 날짜
///
/// 결과는 항상 `[base, base + 6일]` 안에 있습니다.
/// 그 날짜가 chrono의 최대 날짜를 넘으면 `OutOfCalendar`를 반환합니다.
pub fn next_occurrence_of(weekday: Weekday, base: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    let target = weekday.num_days_from_sunday();
    let current = base.weekday().num_days_from_sunday();
    let ahead = (target + 7 - current) % 7;
    base.checked_add_days(Days::new(u64::from(ahead)))
        .ok_or(ScheduleError::OutOfCalendar(base))
}

/// `base` 이전(당일 포함) 마지막으로 `weekday`에 해당하는 날짜
///
/// 결과는 항상 `[base - 6일, base]` 안에 있습니다.
pub fn previous_occurrence_of(
    weekday: Weekday,
    base: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    let target = weekday.num_days_from_sunday();
    let current = base.weekday().num_days_from_sunday();
    let behind = (current + 7 - target) % 7;
    base.checked_sub_days(Days::new(u64::from(behind)))
        .ok_or(ScheduleError::OutOfCalendar(base))
}

/// 날짜를 `YYYY-MM-DD` 키로 포맷합니다.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD` 키를 날짜로 파싱합니다.
///
/// `2024-6-1`처럼 0이 빠진 값은 `format_date_key` 결과와 맞지 않으므로 거부합니다.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, ScheduleError> {
    let invalid = || ScheduleError::InvalidDateKey(key.to_string());
    if key.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| invalid())
}

/// 양 끝을 포함하는 날짜 구간 `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// `start > end`이면 에러를 반환합니다.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScheduleError> {
        if start > end {
            return Err(ScheduleError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// 하루짜리 구간
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// `date`가 들어 있는 주 (일요일 시작, 토요일 끝)
    ///
    /// 달력의 양 끝(chrono `NaiveDate::MIN`/`MAX`)에 걸리는 주는 `OutOfCalendar`입니다.
    pub fn week(date: NaiveDate) -> Result<Self, ScheduleError> {
        let start = previous_occurrence_of(Weekday::Sun, date)?;
        let end = start
            .checked_add_days(Days::new(6))
            .ok_or(ScheduleError::OutOfCalendar(date))?;
        Ok(Self { start, end })
    }

    /// 월간 보기 구간: 1일이 속한 주의 일요일부터 말일이 속한 주의 토요일까지
    pub fn month(date: NaiveDate) -> Result<Self, ScheduleError> {
        let out_of_calendar = || ScheduleError::OutOfCalendar(date);
        let first = date.with_day(1).ok_or_else(out_of_calendar)?;
        // 다음 달 1일의 전날 = 이번 달 말일
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next_month| next_month.pred_opt())
            .ok_or_else(out_of_calendar)?;
        Ok(Self {
            start: previous_occurrence_of(Weekday::Sun, first)?,
            end: next_occurrence_of(Weekday::Sat, last)?,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// 두 구간의 겹치는 부분. 겹치지 않으면 None
    pub fn intersect(&self, start: NaiveDate, end: Option<NaiveDate>) -> Option<Self> {
        let start = start.max(self.start);
        let end = end.map_or(self.end, |end| end.min(self.end));
        (start <= end).then_some(Self { start, end })
    }
}
