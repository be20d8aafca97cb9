//! SQL schema for the campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One mark per student per class per day. Re-marking overwrites.
CREATE TABLE IF NOT EXISTS daily_attendance (
    student_id  INTEGER NOT NULL,
    faculty_id  INTEGER NOT NULL,
    subject_id  INTEGER NOT NULL,
    date        TEXT    NOT NULL,   -- YYYY-MM-DD
    present     INTEGER NOT NULL,   -- 0 | 1
    updated_at  TEXT    NOT NULL,
    UNIQUE (student_id, faculty_id, subject_id, date)
);

-- Derived from daily_attendance; rewritten on every daily save.
CREATE TABLE IF NOT EXISTS monthly_attendance (
    student_id        INTEGER NOT NULL,
    faculty_id        INTEGER NOT NULL,
    subject_id        INTEGER NOT NULL,
    year              INTEGER NOT NULL,
    month             INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    academic_year     TEXT    NOT NULL,   -- e.g. '2025-2026'
    classes_attended  INTEGER NOT NULL,
    total_classes     INTEGER NOT NULL,
    updated_at        TEXT    NOT NULL,
    UNIQUE (student_id, faculty_id, subject_id, month, academic_year)
);

-- Append-only; the highest id is the current schedule.
CREATE TABLE IF NOT EXISTS feedback_schedule (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- Anonymous by default; student_name is 'Anonymous' when left blank.
CREATE TABLE IF NOT EXISTS feedback (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    student_name    TEXT    NOT NULL,
    faculty_id      INTEGER NOT NULL,
    subject_id      INTEGER,
    year_level      TEXT,               -- 'FY' | 'SY' | 'TY' | 'Final Year'
    q1              INTEGER NOT NULL CHECK (q1 BETWEEN 1 AND 10),
    q2              INTEGER NOT NULL CHECK (q2 BETWEEN 1 AND 10),
    q3              INTEGER NOT NULL CHECK (q3 BETWEEN 1 AND 10),
    q4              INTEGER NOT NULL CHECK (q4 BETWEEN 1 AND 10),
    q5              INTEGER NOT NULL CHECK (q5 BETWEEN 1 AND 10),
    q6              INTEGER NOT NULL CHECK (q6 BETWEEN 1 AND 10),
    q7              INTEGER NOT NULL CHECK (q7 BETWEEN 1 AND 10),
    q8              INTEGER NOT NULL CHECK (q8 BETWEEN 1 AND 10),
    q9              INTEGER NOT NULL CHECK (q9 BETWEEN 1 AND 10),
    q10             INTEGER NOT NULL CHECK (q10 BETWEEN 1 AND 10),
    overall_rating  INTEGER NOT NULL CHECK (overall_rating BETWEEN 1 AND 10),
    comments        TEXT,
    created_at      TEXT    NOT NULL    -- campus-zone RFC 3339, fixed width
);

CREATE TABLE IF NOT EXISTS faculty_leaves (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    faculty_id   INTEGER NOT NULL,
    leave_type   TEXT    NOT NULL,   -- 'CL' | 'SL' | 'CO' | 'DL'
    start_date   TEXT    NOT NULL,
    end_date     TEXT    NOT NULL,
    is_half_day  INTEGER NOT NULL DEFAULT 0,
    days_count   REAL    NOT NULL,
    alt_faculty  TEXT,
    created_at   TEXT    NOT NULL   -- campus-zone RFC 3339, fixed width
);

CREATE INDEX IF NOT EXISTS daily_class_idx     ON daily_attendance(faculty_id, subject_id, date);
CREATE INDEX IF NOT EXISTS monthly_student_idx ON monthly_attendance(student_id);
CREATE INDEX IF NOT EXISTS leaves_faculty_idx  ON faculty_leaves(faculty_id, created_at);
CREATE INDEX IF NOT EXISTS feedback_faculty_idx ON feedback(faculty_id, created_at);

PRAGMA user_version = 1;
";
