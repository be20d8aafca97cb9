//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  attendance::{AttendanceMonth, AttendanceRecord, ClassSheet, RollupCounts, SheetMark},
  calendar::{AcademicYear, parse_timestamp},
  feedback::{ANONYMOUS, NewFeedback, QUESTION_COUNT},
  leave::{LeaveDuration, LeaveType, NewLeaveRequest},
  schedule::{FeedbackWindow, is_feedback_open},
  store::PortalStore,
  year_level::YearLevel,
};
use chrono::NaiveDate;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

fn aug() -> AttendanceMonth { AttendanceMonth::new(2025, 8).unwrap() }

fn sheet(faculty_id: i64, subject_id: i64, date: &str, marks: &[(i64, bool)]) -> ClassSheet {
  ClassSheet {
    faculty_id,
    subject_id,
    date: d(date),
    marks: marks
      .iter()
      .map(|&(student_id, present)| SheetMark { student_id, present })
      .collect(),
  }
}

async fn record_day(
  s: &SqliteStore,
  faculty_id: i64,
  subject_id: i64,
  date: &str,
  marks: &[(i64, bool)],
) {
  s.record_class_day(sheet(faculty_id, subject_id, date, marks)).await.unwrap();
}

// ─── Daily attendance ────────────────────────────────────────────────────────

#[tokio::test]
async fn daily_marks_are_scoped_to_class_and_month() {
  let s = store().await;
  let mark = |student_id, subject_id, date: &str, present| AttendanceRecord {
    student_id,
    faculty_id: 1,
    subject_id,
    date: d(date),
    present,
  };

  s.mark_attendance(mark(2, 10, "2025-08-02", true)).await.unwrap();
  s.mark_attendance(mark(1, 10, "2025-08-02", false)).await.unwrap();
  s.mark_attendance(mark(1, 10, "2025-08-01", true)).await.unwrap();
  s.mark_attendance(mark(1, 11, "2025-08-01", true)).await.unwrap();
  s.mark_attendance(mark(1, 10, "2025-09-01", true)).await.unwrap();
  s.mark_attendance(mark(1, 10, "2025-07-31", true)).await.unwrap();

  let marks = s.daily_marks(1, 10, aug()).await.unwrap();
  let seen: Vec<_> = marks.iter().map(|m| (m.date, m.student_id, m.present)).collect();
  assert_eq!(
    seen,
    vec![
      (d("2025-08-01"), 1, true),
      (d("2025-08-02"), 1, false),
      (d("2025-08-02"), 2, true),
    ]
  );
}

#[tokio::test]
async fn re_marking_a_day_overwrites_it() {
  let s = store().await;
  let record = AttendanceRecord {
    student_id: 5,
    faculty_id: 1,
    subject_id: 10,
    date:       d("2025-08-04"),
    present:    false,
  };
  s.mark_attendance(record.clone()).await.unwrap();
  s.mark_attendance(AttendanceRecord { present: true, ..record }).await.unwrap();

  let marks = s.daily_marks(1, 10, aug()).await.unwrap();
  assert_eq!(marks.len(), 1);
  assert!(marks[0].present);
}

// ─── Monthly rollup ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rollup_of_two_students_over_two_days() {
  let s = store().await;
  record_day(&s, 1, 10, "2025-08-01", &[(1, true)]).await;
  record_day(&s, 1, 10, "2025-08-02", &[(1, false), (2, true)]).await;

  let rows = s.monthly_attendance(1, 10, aug()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!((rows[0].student_id, rows[0].counts()), (1, RollupCounts { attended: 1, total: 2 }));
  assert_eq!((rows[1].student_id, rows[1].counts()), (2, RollupCounts { attended: 1, total: 2 }));
  assert!(rows.iter().all(|r| r.academic_year == "2025-2026"));
}

#[tokio::test]
async fn saving_a_rollup_twice_keeps_one_row_per_key() {
  let s = store().await;
  record_day(&s, 1, 10, "2025-08-01", &[(1, true), (2, false)]).await;

  let first = s.refresh_monthly_rollup(1, 10, aug()).await.unwrap();
  let second = s.refresh_monthly_rollup(1, 10, aug()).await.unwrap();
  assert_eq!(first, second);

  let rows = s.monthly_attendance(1, 10, aug()).await.unwrap();
  assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn rollup_counts_are_refreshed_in_place() {
  let s = store().await;
  record_day(&s, 1, 10, "2025-08-01", &[(1, false)]).await;
  record_day(&s, 1, 10, "2025-08-01", &[(1, true)]).await;
  record_day(&s, 1, 10, "2025-08-08", &[(1, true)]).await;

  let rows = s.monthly_attendance(1, 10, aug()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].counts(), RollupCounts { attended: 2, total: 2 });
}

#[tokio::test]
async fn recording_returns_the_refreshed_rows() {
  let s = store().await;
  record_day(&s, 1, 10, "2025-08-01", &[(1, true), (2, true)]).await;
  let rows = s
    .record_class_day(sheet(1, 10, "2025-08-05", &[(1, true), (2, false)]))
    .await
    .unwrap();

  let counts: Vec<_> = rows.iter().map(|r| (r.student_id, r.counts())).collect();
  assert_eq!(
    counts,
    vec![
      (1, RollupCounts { attended: 2, total: 2 }),
      (2, RollupCounts { attended: 1, total: 2 }),
    ]
  );
  assert_eq!(s.monthly_attendance(1, 10, aug()).await.unwrap(), rows);
}

#[tokio::test]
async fn refresh_picks_up_individually_marked_days() {
  let s = store().await;
  s.mark_attendance(AttendanceRecord {
    student_id: 4,
    faculty_id: 1,
    subject_id: 10,
    date:       d("2025-08-12"),
    present:    true,
  })
  .await
  .unwrap();
  assert!(s.monthly_attendance(1, 10, aug()).await.unwrap().is_empty());

  let rows = s.refresh_monthly_rollup(1, 10, aug()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].counts(), RollupCounts { attended: 1, total: 1 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sheets_for_one_class_all_count() {
  let s = store().await;
  let tasks: Vec<_> = (1..=20u32)
    .map(|day| {
      let s = s.clone();
      tokio::spawn(async move {
        let date = format!("2025-08-{day:02}");
        s.record_class_day(sheet(1, 10, &date, &[(1, true), (2, day % 2 == 0)])).await
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let rows = s.monthly_attendance(1, 10, aug()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].counts(), RollupCounts { attended: 20, total: 20 });
  assert_eq!(rows[1].counts(), RollupCounts { attended: 10, total: 20 });
}

#[tokio::test]
async fn sheet_outside_the_calendar_range_is_rejected() {
  let s = store().await;
  let mut bad = sheet(1, 10, "2025-08-01", &[(1, true)]);
  bad.date = NaiveDate::MAX;
  assert!(matches!(s.record_class_day(bad).await, Err(Error::Core(_))));
  assert!(s.daily_marks(1, 10, aug()).await.unwrap().is_empty());
}

#[tokio::test]
async fn student_totals_span_subjects_and_filter_by_year() {
  let s = store().await;
  // 2024-2025: one class attended of two.
  record_day(&s, 1, 10, "2025-03-03", &[(7, true)]).await;
  record_day(&s, 1, 10, "2025-03-04", &[(7, false)]).await;
  // 2025-2026: two subjects.
  record_day(&s, 1, 10, "2025-08-01", &[(7, true)]).await;
  record_day(&s, 2, 20, "2025-08-01", &[(7, true)]).await;

  let all = s.student_attendance_totals(7, None).await.unwrap();
  assert_eq!(all, RollupCounts { attended: 3, total: 4 });

  let current = s.student_attendance_totals(7, Some("2025-2026")).await.unwrap();
  assert_eq!(current, RollupCounts { attended: 2, total: 2 });

  let nobody = s.student_attendance_totals(99, None).await.unwrap();
  assert_eq!(nobody, RollupCounts::default());
}

// ─── Feedback schedule ───────────────────────────────────────────────────────

#[tokio::test]
async fn no_schedule_means_closed() {
  let s = store().await;
  let window = s.current_feedback_window().await.unwrap();
  assert!(window.is_none());
  let now = parse_timestamp("2025-01-01T12:00:00+05:30").unwrap();
  assert!(!is_feedback_open(window.as_ref(), &now));
}

#[tokio::test]
async fn latest_schedule_wins() {
  let s = store().await;
  let older = FeedbackWindow::parse("2024-12-01T09:00:00", "2024-12-02T17:00:00").unwrap();
  let newer =
    FeedbackWindow::parse("2025-01-01T09:00:00+05:30", "2025-01-01T17:00:00+05:30").unwrap();
  s.schedule_feedback(older).await.unwrap();
  s.schedule_feedback(newer.clone()).await.unwrap();

  let current = s.current_feedback_window().await.unwrap().unwrap();
  assert_eq!(current, newer);

  let noon = parse_timestamp("2025-01-01T06:30:00Z").unwrap();
  let evening = parse_timestamp("2025-01-01T18:00:00+05:30").unwrap();
  assert!(is_feedback_open(Some(&current), &noon));
  assert!(!is_feedback_open(Some(&current), &evening));
}

// ─── Feedback submissions ────────────────────────────────────────────────────

fn feedback(faculty_id: i64, overall_rating: u8, submitted_at: &str) -> NewFeedback {
  NewFeedback {
    student_name: None,
    faculty_id,
    subject_id: Some(10),
    year_level: Some(YearLevel::FinalYear),
    ratings: [8; QUESTION_COUNT],
    overall_rating,
    comments: Some("Clear explanations".into()),
    submitted_at: parse_timestamp(submitted_at).unwrap(),
  }
}

#[tokio::test]
async fn submitted_feedback_round_trips() {
  let s = store().await;
  let mut input = feedback(3, 9, "2025-01-10T11:00:00");
  input.ratings[0] = 1;
  input.ratings[9] = 10;
  let stored = s.submit_feedback(input).await.unwrap();
  assert!(stored.id > 0);
  assert_eq!(stored.student_name, ANONYMOUS);
  assert_eq!(stored.year_level, Some(YearLevel::FinalYear));

  let listed = s.feedback_entries(Some(3)).await.unwrap();
  assert_eq!(listed, vec![stored]);
  assert_eq!(listed[0].ratings[0], 1);
  assert_eq!(listed[0].ratings[9], 10);
  assert!(s.feedback_entries(Some(4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn feedback_is_listed_newest_first() {
  let s = store().await;
  let a = s.submit_feedback(feedback(3, 7, "2025-01-10T11:00:00")).await.unwrap();
  let b = s.submit_feedback(feedback(4, 6, "2025-01-12T11:00:00")).await.unwrap();
  let c = s.submit_feedback(feedback(3, 8, "2025-01-11T11:00:00")).await.unwrap();

  let ids: Vec<_> = s.feedback_entries(None).await.unwrap().iter().map(|e| e.id).collect();
  assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn stats_average_the_overall_rating() {
  let s = store().await;
  let empty = s.faculty_feedback_stats(3).await.unwrap();
  assert_eq!((empty.count, empty.average_rating), (0, None));

  for overall in [6, 9, 9] {
    s.submit_feedback(feedback(3, overall, "2025-01-10T11:00:00")).await.unwrap();
  }
  s.submit_feedback(feedback(4, 1, "2025-01-10T11:00:00")).await.unwrap();

  let stats = s.faculty_feedback_stats(3).await.unwrap();
  assert_eq!(stats.faculty_id, 3);
  assert_eq!(stats.count, 3);
  assert_eq!(stats.average_rating, Some(8.0));
}

#[tokio::test]
async fn out_of_scale_feedback_is_rejected() {
  let s = store().await;
  let mut input = feedback(3, 9, "2025-01-10T11:00:00");
  input.ratings[4] = 0;
  assert!(matches!(s.submit_feedback(input).await, Err(Error::Core(_))));
  assert!(matches!(
    s.submit_feedback(feedback(3, 11, "2025-01-10T11:00:00")).await,
    Err(Error::Core(_))
  ));
  assert_eq!(s.faculty_feedback_stats(3).await.unwrap().count, 0);
}

// ─── Leave ───────────────────────────────────────────────────────────────────

fn leave(
  faculty_id: i64,
  leave_type: LeaveType,
  duration: LeaveDuration,
  requested_at: &str,
) -> NewLeaveRequest {
  NewLeaveRequest {
    faculty_id,
    leave_type,
    start_date: d("2025-08-11"),
    end_date: d("2025-08-11"),
    duration,
    alt_faculty: Some("Prof. Rao".into()),
    requested_at: parse_timestamp(requested_at).unwrap(),
  }
}

#[tokio::test]
async fn submitted_leave_round_trips() {
  let s = store().await;
  let stored = s
    .submit_leave(leave(3, LeaveType::Sick, LeaveDuration::HalfDay, "2025-08-10T09:15:00"))
    .await
    .unwrap();
  assert!(stored.id > 0);
  assert!(stored.is_half_day);
  assert_eq!(stored.days_count, 0.5);

  let history = s.leave_requests(Some(3)).await.unwrap();
  assert_eq!(history, vec![stored]);
  assert!(s.leave_requests(Some(4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_newest_first() {
  let s = store().await;
  let a = s
    .submit_leave(leave(3, LeaveType::Casual, LeaveDuration::FullDay, "2025-08-01T10:00:00"))
    .await
    .unwrap();
  let b = s
    .submit_leave(leave(4, LeaveType::Duty, LeaveDuration::TwoDays, "2025-09-01T10:00:00"))
    .await
    .unwrap();
  let c = s
    .submit_leave(leave(3, LeaveType::Casual, LeaveDuration::FullDay, "2025-08-15T10:00:00"))
    .await
    .unwrap();

  let ids: Vec<_> = s.leave_requests(None).await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn reversed_leave_range_is_rejected() {
  let s = store().await;
  let mut input = leave(3, LeaveType::Casual, LeaveDuration::FullDay, "2025-08-01T10:00:00");
  input.end_date = d("2025-08-10");
  assert!(matches!(s.submit_leave(input).await, Err(Error::Core(_))));
  assert!(s.leave_requests(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn usage_counts_only_the_academic_year() {
  let s = store().await;
  for (ty, dur, at) in [
    (LeaveType::Casual, LeaveDuration::FullDay, "2025-06-30T23:59:59+05:30"),
    (LeaveType::Casual, LeaveDuration::TwoDays, "2025-07-01T00:00:00+05:30"),
    (LeaveType::Casual, LeaveDuration::HalfDay, "2026-06-30T23:59:59+05:30"),
    (LeaveType::Sick, LeaveDuration::ThreeDays, "2026-07-01T00:00:00+05:30"),
    // 19:00 UTC on June 30 is already July 1 on campus.
    (LeaveType::Sick, LeaveDuration::FullDay, "2025-06-30T19:00:00Z"),
  ] {
    s.submit_leave(leave(3, ty, dur, at)).await.unwrap();
  }
  s.submit_leave(leave(4, LeaveType::Casual, LeaveDuration::FullDay, "2025-08-01T10:00:00"))
    .await
    .unwrap();

  let usage = s.leave_usage(3, &AcademicYear::starting(2025).unwrap()).await.unwrap();
  assert_eq!(usage.get(&LeaveType::Casual), Some(&2.5));
  assert_eq!(usage.get(&LeaveType::Sick), Some(&1.0));
  assert_eq!(usage.len(), 2);

  let previous = s.leave_usage(3, &AcademicYear::starting(2024).unwrap()).await.unwrap();
  assert_eq!(previous.get(&LeaveType::Casual), Some(&1.0));
}
