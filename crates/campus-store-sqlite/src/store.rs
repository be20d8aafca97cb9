//! [`SqliteStore`], the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;

use campus_core::{
  attendance::{
    AttendanceMonth, AttendanceRecord, ClassSheet, DailyMark, FacultyId, MonthlyAttendance,
    RollupCounts, StudentId, SubjectId, rollup_rows,
  },
  calendar::{AcademicYear, normalize, now_in_campus_tz},
  feedback::{FacultyFeedbackStats, FeedbackEntry, NewFeedback, QUESTION_COUNT},
  leave::{LeaveRequest, LeaveType, LeaveUsage, NewLeaveRequest},
  schedule::FeedbackWindow,
  store::PortalStore,
};

use crate::{
  Error, Result,
  encode::{RawFeedback, RawLeave, RawMonthly, RawWindow, decode_count, encode_date, encode_ts},
  schema::SCHEMA,
};

const LEAVE_COLUMNS: &str = "id, faculty_id, leave_type, start_date, end_date, is_half_day,
                             days_count, alt_faculty, created_at";

fn raw_leave(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLeave> {
  Ok(RawLeave {
    id:          row.get(0)?,
    faculty_id:  row.get(1)?,
    leave_type:  row.get(2)?,
    start_date:  row.get(3)?,
    end_date:    row.get(4)?,
    is_half_day: row.get(5)?,
    days_count:  row.get(6)?,
    alt_faculty: row.get(7)?,
    created_at:  row.get(8)?,
  })
}

const FEEDBACK_COLUMNS: &str = "id, student_name, faculty_id, subject_id, year_level,
                                q1, q2, q3, q4, q5, q6, q7, q8, q9, q10,
                                overall_rating, comments, created_at";

fn raw_feedback(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFeedback> {
  let mut ratings = [0u8; QUESTION_COUNT];
  for (i, slot) in ratings.iter_mut().enumerate() {
    *slot = row.get(5 + i)?;
  }
  Ok(RawFeedback {
    id:             row.get(0)?,
    student_name:   row.get(1)?,
    faculty_id:     row.get(2)?,
    subject_id:     row.get(3)?,
    year_level:     row.get(4)?,
    ratings,
    overall_rating: row.get(15)?,
    comments:       row.get(16)?,
    created_at:     row.get(17)?,
  })
}

// ─── Attendance statements ───────────────────────────────────────────────────
//
// Shared by the single-statement trait methods and the transactional rollup
// paths, so both run the same SQL.

fn upsert_mark(
  conn: &rusqlite::Connection,
  record: &AttendanceRecord,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO daily_attendance
       (student_id, faculty_id, subject_id, date, present, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT (student_id, faculty_id, subject_id, date)
     DO UPDATE SET present = excluded.present, updated_at = excluded.updated_at",
    rusqlite::params![
      record.student_id,
      record.faculty_id,
      record.subject_id,
      encode_date(record.date),
      record.present,
      now,
    ],
  )?;
  Ok(())
}

fn select_marks(
  conn: &rusqlite::Connection,
  faculty_id: FacultyId,
  subject_id: SubjectId,
  month: AttendanceMonth,
) -> rusqlite::Result<Vec<DailyMark>> {
  let mut stmt = conn.prepare(
    "SELECT student_id, present, date FROM daily_attendance
     WHERE faculty_id = ?1 AND subject_id = ?2 AND date >= ?3 AND date < ?4
     ORDER BY date, student_id",
  )?;
  let from = encode_date(month.first_day());
  let until = encode_date(month.next_first_day());
  stmt
    .query_map(rusqlite::params![faculty_id, subject_id, from, until], |row| {
      Ok(DailyMark {
        student_id: row.get(0)?,
        present:    row.get(1)?,
        date:       row.get::<_, NaiveDate>(2)?,
      })
    })?
    .collect()
}

fn upsert_monthly(
  conn: &rusqlite::Connection,
  row: &MonthlyAttendance,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO monthly_attendance
       (student_id, faculty_id, subject_id, year, month, academic_year,
        classes_attended, total_classes, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
     ON CONFLICT (student_id, faculty_id, subject_id, month, academic_year)
     DO UPDATE SET
       year             = excluded.year,
       classes_attended = excluded.classes_attended,
       total_classes    = excluded.total_classes,
       updated_at       = excluded.updated_at",
    rusqlite::params![
      row.student_id,
      row.faculty_id,
      row.subject_id,
      row.month.year(),
      row.month.month(),
      row.academic_year,
      row.classes_attended,
      row.total_classes,
      now,
    ],
  )?;
  Ok(())
}

/// Read the month's marks, roll them up, and upsert the rows. Callers run this
/// inside a transaction.
fn reroll_month(
  conn: &rusqlite::Connection,
  faculty_id: FacultyId,
  subject_id: SubjectId,
  month: AttendanceMonth,
  now: &str,
) -> rusqlite::Result<Vec<MonthlyAttendance>> {
  let marks = select_marks(conn, faculty_id, subject_id, month)?;
  let rows = rollup_rows(faculty_id, subject_id, month, &marks);
  for row in &rows {
    upsert_monthly(conn, row, now)?;
  }
  Ok(rows)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn mark_attendance(&self, record: AttendanceRecord) -> Result<()> {
    let now_str = encode_ts(&now_in_campus_tz());
    let (student_id, subject_id, date, present) =
      (record.student_id, record.subject_id, record.date, record.present);

    self
      .conn
      .call(move |conn| {
        upsert_mark(conn, &record, &now_str)?;
        Ok(())
      })
      .await?;

    tracing::debug!(student_id, subject_id, %date, present, "attendance marked");
    Ok(())
  }

  async fn daily_marks(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> Result<Vec<DailyMark>> {
    let marks = self
      .conn
      .call(move |conn| Ok(select_marks(conn, faculty_id, subject_id, month)?))
      .await?;
    Ok(marks)
  }

  async fn save_monthly_attendance(&self, row: MonthlyAttendance) -> Result<()> {
    let now_str = encode_ts(&now_in_campus_tz());

    self
      .conn
      .call(move |conn| {
        upsert_monthly(conn, &row, &now_str)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn refresh_monthly_rollup(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> Result<Vec<MonthlyAttendance>> {
    let now_str = encode_ts(&now_in_campus_tz());

    let rows = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = reroll_month(&tx, faculty_id, subject_id, month, &now_str)?;
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(
      faculty_id,
      subject_id,
      %month,
      students = rows.len(),
      "monthly rollup refreshed"
    );
    Ok(rows)
  }

  async fn record_class_day(&self, sheet: ClassSheet) -> Result<Vec<MonthlyAttendance>> {
    let month = sheet.month()?;
    let now_str = encode_ts(&now_in_campus_tz());
    let (faculty_id, subject_id, date, marks) =
      (sheet.faculty_id, sheet.subject_id, sheet.date, sheet.marks.len());

    let rows = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for record in sheet.records() {
          upsert_mark(&tx, &record, &now_str)?;
        }
        let rows = reroll_month(&tx, sheet.faculty_id, sheet.subject_id, month, &now_str)?;
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(
      faculty_id,
      subject_id,
      %date,
      marks,
      students = rows.len(),
      "class day recorded"
    );
    Ok(rows)
  }

  async fn monthly_attendance(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> Result<Vec<MonthlyAttendance>> {
    let label = month.academic_year().label();
    let month_num = month.month();

    let raws: Vec<RawMonthly> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT student_id, faculty_id, subject_id, year, month, academic_year,
                  classes_attended, total_classes
           FROM monthly_attendance
           WHERE faculty_id = ?1 AND subject_id = ?2 AND month = ?3 AND academic_year = ?4
           ORDER BY student_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![faculty_id, subject_id, month_num, label], |row| {
            Ok(RawMonthly {
              student_id:       row.get(0)?,
              faculty_id:       row.get(1)?,
              subject_id:       row.get(2)?,
              year:             row.get(3)?,
              month:            row.get(4)?,
              academic_year:    row.get(5)?,
              classes_attended: row.get(6)?,
              total_classes:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMonthly::into_monthly).collect()
  }

  async fn student_attendance_totals(
    &self,
    student_id: StudentId,
    academic_year: Option<&str>,
  ) -> Result<RollupCounts> {
    let label = academic_year.map(str::to_owned);

    let (attended, total) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COALESCE(SUM(classes_attended), 0), COALESCE(SUM(total_classes), 0)
           FROM monthly_attendance
           WHERE student_id = ?1 AND (?2 IS NULL OR academic_year = ?2)",
          rusqlite::params![student_id, label],
          |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)),
        )?)
      })
      .await?;

    Ok(RollupCounts {
      attended: decode_count("classes_attended", attended)?,
      total:    decode_count("total_classes", total)?,
    })
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn schedule_feedback(&self, window: FeedbackWindow) -> Result<()> {
    let start_str = encode_ts(&window.start);
    let end_str = encode_ts(&window.end);
    let now_str = encode_ts(&now_in_campus_tz());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback_schedule (start_date, end_date, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![start_str, end_str, now_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(start = %window.start, end = %window.end, "feedback window scheduled");
    Ok(())
  }

  async fn current_feedback_window(&self) -> Result<Option<FeedbackWindow>> {
    let raw: Option<RawWindow> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT start_date, end_date FROM feedback_schedule ORDER BY id DESC LIMIT 1",
              [],
              |row| Ok(RawWindow { start_date: row.get(0)?, end_date: row.get(1)? }),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWindow::into_window).transpose()
  }

  async fn submit_feedback(&self, input: NewFeedback) -> Result<FeedbackEntry> {
    input.validate()?;

    let mut entry = FeedbackEntry {
      id:             0,
      student_name:   input.display_name().to_owned(),
      faculty_id:     input.faculty_id,
      subject_id:     input.subject_id,
      year_level:     input.year_level,
      ratings:        input.ratings,
      overall_rating: input.overall_rating,
      comments:       input.comments.filter(|c| !c.trim().is_empty()),
      created_at:     normalize(&input.submitted_at),
    };

    let student_name = entry.student_name.clone();
    let faculty_id = entry.faculty_id;
    let subject_id = entry.subject_id;
    let year_level = entry.year_level.map(|y| y.to_string());
    let q = entry.ratings;
    let overall = entry.overall_rating;
    let comments = entry.comments.clone();
    let created_str = encode_ts(&entry.created_at);

    entry.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback
             (student_name, faculty_id, subject_id, year_level,
              q1, q2, q3, q4, q5, q6, q7, q8, q9, q10,
              overall_rating, comments, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            student_name,
            faculty_id,
            subject_id,
            year_level,
            q[0],
            q[1],
            q[2],
            q[3],
            q[4],
            q[5],
            q[6],
            q[7],
            q[8],
            q[9],
            overall,
            comments,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id = entry.id, faculty_id, overall, "feedback stored");
    Ok(entry)
  }

  async fn feedback_entries(&self, faculty_id: Option<FacultyId>) -> Result<Vec<FeedbackEntry>> {
    let raws: Vec<RawFeedback> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {FEEDBACK_COLUMNS} FROM feedback
           WHERE ?1 IS NULL OR faculty_id = ?1
           ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![faculty_id], raw_feedback)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedback::into_entry).collect()
  }

  async fn faculty_feedback_stats(&self, faculty_id: FacultyId) -> Result<FacultyFeedbackStats> {
    let (count, average_rating) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), AVG(overall_rating) FROM feedback WHERE faculty_id = ?1",
          rusqlite::params![faculty_id],
          |r| Ok((r.get::<_, i64>(0)?, r.get::<_, Option<f64>>(1)?)),
        )?)
      })
      .await?;

    Ok(FacultyFeedbackStats {
      faculty_id,
      count: decode_count("count", count)?,
      average_rating,
    })
  }

  // ── Leave ─────────────────────────────────────────────────────────────────

  async fn submit_leave(&self, input: NewLeaveRequest) -> Result<LeaveRequest> {
    input.validate()?;

    let mut request = LeaveRequest {
      id:          0,
      faculty_id:  input.faculty_id,
      leave_type:  input.leave_type,
      start_date:  input.start_date,
      end_date:    input.end_date,
      is_half_day: input.duration.is_half_day(),
      days_count:  input.duration.days(),
      alt_faculty: input.alt_faculty,
      created_at:  normalize(&input.requested_at),
    };

    let faculty_id = request.faculty_id;
    let type_str = request.leave_type.as_ref().to_owned();
    let start_str = encode_date(request.start_date);
    let end_str = encode_date(request.end_date);
    let is_half_day = request.is_half_day;
    let days_count = request.days_count;
    let alt_faculty = request.alt_faculty.clone();
    let created_str = encode_ts(&request.created_at);

    request.id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO faculty_leaves
             (faculty_id, leave_type, start_date, end_date, is_half_day,
              days_count, alt_faculty, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            faculty_id,
            type_str,
            start_str,
            end_str,
            is_half_day,
            days_count,
            alt_faculty,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(
      id = request.id,
      faculty_id,
      leave_type = %request.leave_type,
      days = request.days_count,
      "leave request stored"
    );
    Ok(request)
  }

  async fn leave_requests(&self, faculty_id: Option<FacultyId>) -> Result<Vec<LeaveRequest>> {
    let raws: Vec<RawLeave> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {LEAVE_COLUMNS} FROM faculty_leaves
           WHERE ?1 IS NULL OR faculty_id = ?1
           ORDER BY created_at DESC, id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![faculty_id], raw_leave)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLeave::into_request).collect()
  }

  async fn leave_usage(&self, faculty_id: FacultyId, year: &AcademicYear) -> Result<LeaveUsage> {
    let from = encode_ts(&year.start);
    let until = encode_ts(&year.next_start());

    let sums: Vec<(String, f64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT leave_type, SUM(days_count) FROM faculty_leaves
           WHERE faculty_id = ?1 AND created_at >= ?2 AND created_at < ?3
           GROUP BY leave_type",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![faculty_id, from, until], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, f64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    sums
      .into_iter()
      .map(|(code, days)| -> Result<_> { Ok((LeaveType::from_code(&code)?, days)) })
      .collect()
  }
}
