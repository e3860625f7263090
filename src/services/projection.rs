//! # 캘린더 투영(Occurrence Projection)
//!
//! 반복 규칙 목록과 개별 수업 목록, 조회 구간을 받아
//! 캘린더에 그릴 수업 항목 전체를 계산합니다.
//!
//! ## 처리 순서
//! 1. 구간 안에 있고 휴강이 아닌 개별 수업을 항목으로 만듭니다.
//!    단발 수업은 그대로 나오고, 오버라이드는 `(규칙, 날짜)`마다 하나만 나옵니다.
//!    (동시 전환으로 같은 키에 행이 여러 개 생겨도 캘린더에는 한 번만 표시)
//! 2. 반복 규칙마다 `max(valid_from, 구간 시작)` ~ `min(valid_until, 구간 끝)` 사이의
//!    해당 요일을 7일 간격으로 나열합니다.
//! 3. 각 날짜에 오버라이드가 있으면 규칙에서 항목을 만들지 않습니다.
//!    - 휴강 오버라이드: 그 날짜는 아예 표시되지 않음
//!    - 일반 오버라이드: 1단계에서 이미 수정된 내용으로 표시됨
//! 4. 시작 시각, 식별자 순으로 정렬합니다.
//!
//! 입력은 호출자가 미리 읽어 온 스냅샷이며, 이 모듈은 I/O를 하지 않습니다.
//! 잘못 저장된 규칙 하나 때문에 캘린더 전체가 비지 않도록,
//! 규칙 검증에 실패하면 경고 로그를 남기고 그 규칙만 건너뜁니다.

use std::iter;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::ScheduleError;
use crate::models::*;
use crate::services::dates::{next_occurrence_of, weekday_from_index, weekday_index, DateRange};
use crate::services::overrides::{Override, OverrideIndex};

/// 반복 규칙의 일정 값들을 검증하고 요일을 돌려줍니다.
///
/// 규칙 생성/수정 시에는 이 에러가 그대로 400 응답이 되고,
/// 투영 중에는 경고 후 건너뛰는 데 쓰입니다.
pub fn check_schedule(
    weekday: i64,
    start_time: NaiveTime,
    end_time: NaiveTime,
    valid_from: NaiveDate,
    valid_until: Option<NaiveDate>,
) -> Result<Weekday, ScheduleError> {
    let weekday = weekday_from_index(weekday)?;
    if end_time <= start_time {
        return Err(ScheduleError::InvertedTimeRange {
            start: start_time,
            end: end_time,
        });
    }
    if let Some(until) = valid_until {
        if until < valid_from {
            return Err(ScheduleError::InvertedWindow {
                from: valid_from,
                until,
            });
        }
    }
    Ok(weekday)
}

/// 저장된 규칙 행 전체를 검증합니다.
pub fn validate_rule(rule: &RecurringLesson) -> Result<Weekday, ScheduleError> {
    check_schedule(
        rule.weekday,
        rule.start_time,
        rule.end_time,
        rule.valid_from,
        rule.valid_until,
    )
}

/// 규칙이 `range` 안에서 만들어 내는 수업 날짜들 (오름차순)
pub fn occurrence_dates(
    rule: &RecurringLesson,
    range: DateRange,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    let weekday = validate_rule(rule)?;
    let Some(window) = range.intersect(rule.valid_from, rule.valid_until) else {
        return Ok(Vec::new());
    };

    // 첫 수업일이 달력 끝을 넘으면 구간 안에 수업일이 없는 것입니다.
    let first = next_occurrence_of(weekday, window.start()).ok();
    let dates = iter::successors(first, |date| date.checked_add_days(Days::new(7)))
        .take_while(|date| *date <= window.end())
        .collect();
    Ok(dates)
}

/// `date`가 규칙의 수업일인지 확인합니다. (요일 일치 + 유효 기간 안)
pub fn is_occurrence(rule: &RecurringLesson, date: NaiveDate) -> Result<bool, ScheduleError> {
    validate_rule(rule)?;
    let in_window = date >= rule.valid_from && rule.valid_until.map_or(true, |until| date <= until);
    Ok(in_window && weekday_index(date.weekday()) == rule.weekday)
}

/// 조회 구간의 캘린더 항목 전체를 계산합니다.
///
/// `rules`는 호출자가 `is_active = true`로 걸러서 넘겨야 합니다.
/// 같은 입력으로 여러 번 호출하면 항상 같은 결과(같은 ID, 같은 순서)를 돌려줍니다.
pub fn project(
    rules: &[RecurringLesson],
    lessons: &[Lesson],
    range: DateRange,
) -> Vec<ProjectedOccurrence> {
    let overrides = OverrideIndex::build(lessons);

    // 단발 수업은 휴강이 아니면 그대로, 오버라이드는 (규칙, 날짜)마다 대표 행 하나만
    let mut occurrences: Vec<ProjectedOccurrence> = lessons
        .iter()
        .filter(|lesson| range.contains(lesson.lesson_date))
        .filter(|lesson| {
            if lesson.is_override() {
                overrides.represents(lesson)
            } else {
                lesson.status != LessonStatus::Cancelled
            }
        })
        .map(single_occurrence)
        .collect();

    for rule in rules {
        let dates = match occurrence_dates(rule, range) {
            Ok(dates) => dates,
            Err(e) => {
                tracing::warn!("Skipping malformed recurring lesson {}: {}", rule.id, e);
                continue;
            }
        };

        for date in dates {
            match overrides.get(&rule.id, date) {
                // 휴강: 표시하지 않음
                Some(Override::Cancelled(_)) => {}
                // 수정된 개별 수업이 이미 들어가 있음
                Some(Override::Active(_)) => {}
                None => occurrences.push(recurring_occurrence(rule, date)),
            }
        }
    }

    occurrences.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    occurrences
}

fn single_occurrence(lesson: &Lesson) -> ProjectedOccurrence {
    ProjectedOccurrence {
        id: OccurrenceId::Lesson {
            lesson_id: lesson.id.clone(),
        },
        title: lesson.subject.clone(),
        start: NaiveDateTime::new(lesson.lesson_date, lesson.start_time),
        end: NaiveDateTime::new(lesson.lesson_date, lesson.end_time),
        source_kind: SourceKind::Single,
        resource: OccurrenceResource::Lesson(lesson.clone()),
    }
}

fn recurring_occurrence(rule: &RecurringLesson, date: NaiveDate) -> ProjectedOccurrence {
    ProjectedOccurrence {
        id: OccurrenceId::RecurringInstance {
            rule_id: rule.id.clone(),
            date,
        },
        title: rule.subject.clone(),
        start: NaiveDateTime::new(date, rule.start_time),
        end: NaiveDateTime::new(date, rule.end_time),
        source_kind: SourceKind::RecurringInstance,
        resource: OccurrenceResource::Recurring {
            rule: rule.clone(),
            lesson_date: date,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dates::parse_date_key;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn date(key: &str) -> NaiveDate {
        parse_date_key(key).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    fn rule(id: &str, weekday: i64, from: &str, until: Option<&str>) -> RecurringLesson {
        RecurringLesson {
            id: id.to_string(),
            subject: "Math".to_string(),
            lesson_type: LessonType::FaceToFace,
            weekday,
            start_time: time(17, 0),
            end_time: time(18, 30),
            valid_from: date(from),
            valid_until: until.map(date),
            is_active: true,
            notes: None,
            student_id: "student-1".to_string(),
            instructor_id: Some("instructor-1".to_string()),
            created_by: "admin".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn lesson(id: &str, on: &str, status: LessonStatus, source: Option<&str>) -> Lesson {
        Lesson {
            id: id.to_string(),
            subject: "English".to_string(),
            lesson_type: LessonType::Video,
            lesson_date: date(on),
            start_time: time(10, 0),
            end_time: time(11, 0),
            status,
            notes: None,
            student_id: "student-1".to_string(),
            instructor_id: None,
            created_by: "admin".to_string(),
            source_recurring_id: source.map(str::to_string),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn dates_of(occurrences: &[ProjectedOccurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(|o| o.start.date()).collect()
    }

    #[test]
    fn validity_window_clamps_expansion() {
        // 월요일(1), 1/1 ~ 1/15
        let rules = [rule("r1", 1, "2024-01-01", Some("2024-01-15"))];
        let out = project(&rules, &[], range("2024-01-01", "2024-01-31"));
        assert_eq!(
            dates_of(&out),
            vec![date("2024-01-01"), date("2024-01-08"), date("2024-01-15")]
        );
    }

    #[test]
    fn unbounded_series_fills_the_range() {
        // 금요일(5), 종료일 없음
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let out = project(&rules, &[], range("2024-03-01", "2024-03-31"));
        assert_eq!(
            dates_of(&out),
            vec![
                date("2024-03-01"),
                date("2024-03-08"),
                date("2024-03-15"),
                date("2024-03-22"),
                date("2024-03-29"),
            ]
        );
        assert!(out.iter().all(|o| o.source_kind == SourceKind::RecurringInstance));
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let rules = [rule("r1", 5, "2024-01-01", None)];
        // 3/1과 3/29 모두 금요일
        let out = project(&rules, &[], range("2024-03-01", "2024-03-29"));
        assert_eq!(dates_of(&out).first(), Some(&date("2024-03-01")));
        assert_eq!(dates_of(&out).last(), Some(&date("2024-03-29")));

        let narrowed = project(&rules, &[], range("2024-03-02", "2024-03-28"));
        assert!(!dates_of(&narrowed).contains(&date("2024-03-01")));
        assert!(!dates_of(&narrowed).contains(&date("2024-03-29")));
    }

    #[test]
    fn single_lessons_respect_range_boundaries() {
        let lessons = [
            lesson("a", "2024-02-29", LessonStatus::Scheduled, None),
            lesson("b", "2024-03-01", LessonStatus::Scheduled, None),
            lesson("c", "2024-03-31", LessonStatus::Completed, None),
            lesson("d", "2024-04-01", LessonStatus::Scheduled, None),
        ];
        let out = project(&[], &lessons, range("2024-03-01", "2024-03-31"));
        assert_eq!(dates_of(&out), vec![date("2024-03-01"), date("2024-03-31")]);
    }

    #[test]
    fn edited_occurrence_replaces_recurring_instance() {
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let mut edited = lesson("o1", "2024-03-15", LessonStatus::Scheduled, Some("r1"));
        edited.subject = "Physics".to_string();

        let out = project(&rules, &[edited], range("2024-03-01", "2024-03-31"));
        assert_eq!(out.len(), 5);

        let on_15th: Vec<_> = out.iter().filter(|o| o.start.date() == date("2024-03-15")).collect();
        assert_eq!(on_15th.len(), 1);
        assert_eq!(on_15th[0].title, "Physics");
        assert_eq!(on_15th[0].source_kind, SourceKind::Single);
    }

    #[test]
    fn cancelled_occurrence_is_suppressed() {
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let cancelled = lesson("o2", "2024-03-22", LessonStatus::Cancelled, Some("r1"));

        let out = project(&rules, &[cancelled], range("2024-03-01", "2024-03-31"));
        assert_eq!(out.len(), 4);
        assert!(!dates_of(&out).contains(&date("2024-03-22")));
    }

    #[test]
    fn duplicate_overrides_for_one_date_never_double_emit() {
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let lessons = [
            lesson("o1", "2024-03-08", LessonStatus::Cancelled, Some("r1")),
            lesson("o2", "2024-03-08", LessonStatus::Cancelled, Some("r1")),
        ];
        let out = project(&rules, &lessons, range("2024-03-08", "2024-03-08"));
        assert!(out.is_empty());
    }

    #[test]
    fn duplicate_active_overrides_show_once() {
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let mut later = lesson("o2", "2024-03-15", LessonStatus::Scheduled, Some("r1"));
        later.subject = "Physics".to_string();
        let earlier = lesson("o1", "2024-03-15", LessonStatus::Scheduled, Some("r1"));

        let out = project(&rules, &[later, earlier], range("2024-03-15", "2024-03-15"));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].id,
            OccurrenceId::Lesson {
                lesson_id: "o1".to_string()
            }
        );
    }

    #[test]
    fn active_duplicate_beats_cancelled_one() {
        let rules = [rule("r1", 5, "2024-03-01", None)];
        let lessons = [
            lesson("o1", "2024-03-15", LessonStatus::Cancelled, Some("r1")),
            lesson("o2", "2024-03-15", LessonStatus::Scheduled, Some("r1")),
        ];
        let out = project(&rules, &lessons, range("2024-03-15", "2024-03-15"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_kind, SourceKind::Single);
    }

    #[test]
    fn override_of_deleted_series_still_shows() {
        let orphan = lesson("o1", "2024-03-15", LessonStatus::Scheduled, Some("gone"));
        let out = project(&[], &[orphan], range("2024-03-01", "2024-03-31"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_kind, SourceKind::Single);
    }

    #[test]
    fn override_only_applies_to_its_own_rule() {
        let rules = [
            rule("r1", 5, "2024-03-01", None),
            rule("r2", 5, "2024-03-01", None),
        ];
        let cancelled = lesson("o1", "2024-03-08", LessonStatus::Cancelled, Some("r1"));
        let out = project(&rules, &[cancelled], range("2024-03-08", "2024-03-08"));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].id,
            OccurrenceId::RecurringInstance {
                rule_id: "r2".to_string(),
                date: date("2024-03-08"),
            }
        );
    }

    #[test]
    fn malformed_rules_are_skipped_not_fatal() {
        let inverted = rule("bad", 1, "2024-02-01", Some("2024-01-01"));
        let bad_weekday = rule("worse", 9, "2024-01-01", None);
        let good = rule("good", 1, "2024-01-01", None);
        let out = project(&[inverted, bad_weekday, good], &[], range("2024-01-01", "2024-01-31"));
        assert_eq!(out.len(), 5);
        assert!(out.iter().all(|o| matches!(
            &o.id,
            OccurrenceId::RecurringInstance { rule_id, .. } if rule_id == "good"
        )));
    }

    #[test]
    fn rule_outside_range_yields_nothing() {
        let rules = [rule("r1", 1, "2024-05-01", None)];
        assert!(project(&rules, &[], range("2024-01-01", "2024-01-31")).is_empty());
    }

    #[test]
    fn output_is_sorted_by_start() {
        let rules = [rule("r1", 3, "2024-06-01", None)];
        let lessons = [lesson("a", "2024-06-12", LessonStatus::Scheduled, None)];
        let out = project(&rules, &lessons, range("2024-06-09", "2024-06-15"));
        // 10:00 단발 수업이 17:00 반복 수업보다 먼저
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source_kind, SourceKind::Single);
        assert!(out[0].start < out[1].start);
    }

    #[test]
    fn is_occurrence_checks_weekday_and_window() {
        let r = rule("r1", 5, "2024-03-01", Some("2024-03-29"));
        assert!(is_occurrence(&r, date("2024-03-15")).unwrap());
        assert!(!is_occurrence(&r, date("2024-03-14")).unwrap());
        assert!(!is_occurrence(&r, date("2024-04-05")).unwrap());
        assert!(!is_occurrence(&r, date("2024-02-23")).unwrap());
    }

    #[test]
    fn check_schedule_rejects_inverted_times() {
        let err = check_schedule(1, time(10, 0), time(9, 0), date("2024-01-01"), None).unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedTimeRange { .. }));
    }

    // ── 속성 기반 테스트 ──

    fn base() -> NaiveDate {
        date("2024-01-01")
    }

    fn arb_rule() -> impl Strategy<Value = RecurringLesson> {
        (0u8..4, 0i64..7, 0u64..60, proptest::option::of(0u64..90)).prop_map(
            |(id, weekday, from, len)| {
                let mut r = rule(&format!("r{id}"), weekday, "2024-01-01", None);
                r.valid_from = base() + Days::new(from);
                r.valid_until = len.map(|len| r.valid_from + Days::new(len));
                r
            },
        )
    }

    fn arb_lesson() -> impl Strategy<Value = Lesson> {
        (
            0u16..1000,
            0u64..90,
            prop_oneof![
                Just(LessonStatus::Scheduled),
                Just(LessonStatus::Completed),
                Just(LessonStatus::Cancelled),
            ],
            proptest::option::of(0u8..4),
        )
            .prop_map(|(id, offset, status, source)| {
                let mut l = lesson(&format!("l{id}"), "2024-01-01", status, None);
                l.lesson_date = base() + Days::new(offset);
                l.source_recurring_id = source.map(|s| format!("r{s}"));
                l
            })
    }

    fn arb_range() -> impl Strategy<Value = DateRange> {
        (0u64..60, 0u64..40).prop_map(|(start, len)| {
            let start = base() + Days::new(start);
            DateRange::new(start, start + Days::new(len)).unwrap()
        })
    }

    proptest! {
        #[test]
        fn projection_is_idempotent(
            rules in proptest::collection::vec(arb_rule(), 0..4),
            lessons in proptest::collection::vec(arb_lesson(), 0..20),
            range in arb_range(),
        ) {
            prop_assert_eq!(project(&rules, &lessons, range), project(&rules, &lessons, range));
        }

        #[test]
        fn overridden_dates_never_come_from_the_rule(
            mut rules in proptest::collection::vec(arb_rule(), 0..4),
            lessons in proptest::collection::vec(arb_lesson(), 0..20),
            range in arb_range(),
        ) {
            // 저장소에서 규칙 ID는 유일합니다.
            let mut seen_rules = HashSet::new();
            rules.retain(|r| seen_rules.insert(r.id.clone()));

            let out = project(&rules, &lessons, range);
            let mut seen_keys = HashSet::new();
            for occurrence in &out {
                prop_assert!(range.contains(occurrence.start.date()));
                if let OccurrenceId::RecurringInstance { rule_id, date } = &occurrence.id {
                    let overridden = lessons.iter().any(|l| {
                        l.source_recurring_id.as_deref() == Some(rule_id.as_str())
                            && l.lesson_date == *date
                    });
                    prop_assert!(!overridden);
                }

                // (규칙, 날짜)마다 항목은 최대 하나
                let key = match &occurrence.resource {
                    OccurrenceResource::Recurring { rule, lesson_date } => {
                        Some((rule.id.clone(), *lesson_date))
                    }
                    OccurrenceResource::Lesson(lesson) => lesson
                        .source_recurring_id
                        .clone()
                        .map(|rule_id| (rule_id, lesson.lesson_date)),
                };
                if let Some(key) = key {
                    prop_assert!(seen_keys.insert(key));
                }
            }
        }

        #[test]
        fn cancelled_lessons_never_appear(
            rules in proptest::collection::vec(arb_rule(), 0..4),
            lessons in proptest::collection::vec(arb_lesson(), 0..20),
            range in arb_range(),
        ) {
            let out = project(&rules, &lessons, range);
            for occurrence in &out {
                if let OccurrenceResource::Lesson(lesson) = &occurrence.resource {
                    prop_assert_ne!(lesson.status, LessonStatus::Cancelled);
                }
            }
        }
    }
}
