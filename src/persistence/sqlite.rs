use super::{AttendanceStore, PersistenceError, PersistenceResult};
use crate::attendance::{AttendanceDraft, AttendanceRecord, AttendanceStatus};
use crate::record_validation;
use crate::schedule::{DayName, Session};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Row, ToSql, params};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, date, session, day_name, subject, teacher, pj, \
     status, note, photo_path, photo_url, created_at, updated_at";

const NEWEST_FIRST: &str =
    "ORDER BY date DESC, CASE session WHEN 'evening' THEN 0 ELSE 1 END, created_at DESC";

pub struct SqliteAttendanceStore {
    connection: Mutex<Connection>,
}

impl SqliteAttendanceStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::with_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS attendances (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                session TEXT NOT NULL CHECK (session IN ('morning', 'evening')),
                day_name TEXT NOT NULL,
                subject TEXT NOT NULL,
                teacher TEXT NOT NULL,
                pj TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('Hadir', 'Izin', 'Sakit', 'Alpa')),
                note TEXT,
                photo_path TEXT,
                photo_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, date, session)
            );
            CREATE INDEX IF NOT EXISTS attendances_user_date
                ON attendances (user_id, date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn insert_record(conn: &Connection, record: &AttendanceRecord) -> PersistenceResult<()> {
        let result = conn.execute(
            "INSERT INTO attendances (id, user_id, date, session, day_name, subject, teacher, pj, \
             status, note, photo_path, photo_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                record.id,
                record.user_id,
                record.date,
                record.session.as_str(),
                record.day_name.as_str(),
                record.subject,
                record.teacher,
                record.responsible_person,
                record.status.as_str(),
                record.note,
                record.photo_path,
                record.photo_url,
                record.created_at,
                record.updated_at,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) => Err(classify_insert_error(err, record)),
        }
    }

    fn query(
        &self,
        filter_sql: &str,
        params: &[&dyn ToSql],
    ) -> PersistenceResult<Vec<AttendanceRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {SELECT_COLUMNS} FROM attendances {filter_sql}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, RawRow::read)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

fn classify_insert_error(err: rusqlite::Error, record: &AttendanceRecord) -> PersistenceError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                tracing::warn!(
                    user_id = %record.user_id,
                    date = %record.date,
                    session = %record.session,
                    "rejected duplicate attendance"
                );
                return PersistenceError::Duplicate {
                    user_id: record.user_id.clone(),
                    date: record.date,
                    session: record.session,
                };
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return PersistenceError::InvalidData(format!(
                    "record id {} already exists",
                    record.id
                ));
            }
            _ => {}
        }
    }
    PersistenceError::Sqlite(err)
}

/// Column values as stored; enum labels are parsed outside the rusqlite
/// closure so their errors stay ours.
struct RawRow {
    id: String,
    user_id: String,
    date: NaiveDate,
    session: String,
    day_name: String,
    subject: String,
    teacher: String,
    pj: String,
    status: String,
    note: Option<String>,
    photo_path: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: row.get(2)?,
            session: row.get(3)?,
            day_name: row.get(4)?,
            subject: row.get(5)?,
            teacher: row.get(6)?,
            pj: row.get(7)?,
            status: row.get(8)?,
            note: row.get(9)?,
            photo_path: row.get(10)?,
            photo_url: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_record(self) -> PersistenceResult<AttendanceRecord> {
        let invalid = |err: crate::Error| {
            PersistenceError::InvalidData(format!("record {}: {err}", self.id))
        };
        let session = self.session.parse::<Session>().map_err(invalid)?;
        let day_name = self.day_name.parse::<DayName>().map_err(invalid)?;
        let status = self.status.parse::<AttendanceStatus>().map_err(invalid)?;
        Ok(AttendanceRecord {
            session,
            day_name,
            status,
            id: self.id,
            user_id: self.user_id,
            date: self.date,
            subject: self.subject,
            teacher: self.teacher,
            responsible_person: self.pj,
            note: self.note,
            photo_path: self.photo_path,
            photo_url: self.photo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AttendanceStore for SqliteAttendanceStore {
    fn insert_at(
        &self,
        draft: AttendanceDraft,
        now: DateTime<Utc>,
    ) -> PersistenceResult<AttendanceRecord> {
        record_validation::validate_draft(&draft)?;
        let record = AttendanceRecord::from_draft(Uuid::new_v4().to_string(), draft, now);
        let conn = self.lock()?;
        Self::insert_record(&conn, &record)?;
        tracing::info!(
            user_id = %record.user_id,
            date = %record.date,
            session = %record.session,
            status = %record.status,
            "stored attendance"
        );
        Ok(record)
    }

    fn import_records(&self, records: &[AttendanceRecord]) -> PersistenceResult<usize> {
        super::validate_records(records)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for record in records {
            Self::insert_record(&tx, record)?;
        }
        tx.commit()?;
        tracing::info!(records = records.len(), "imported attendance records");
        Ok(records.len())
    }

    fn records_for_user(&self, user_id: &str) -> PersistenceResult<Vec<AttendanceRecord>> {
        self.query(&format!("WHERE user_id = ?1 {NEWEST_FIRST}"), params![user_id])
    }

    fn records_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PersistenceResult<Vec<AttendanceRecord>> {
        self.query(
            &format!("WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 {NEWEST_FIRST}"),
            params![user_id, start, end],
        )
    }

    fn recent_records(
        &self,
        user_id: &str,
        limit: usize,
    ) -> PersistenceResult<Vec<AttendanceRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query(
            &format!("WHERE user_id = ?1 {NEWEST_FIRST} LIMIT ?2"),
            params![user_id, limit],
        )
    }
}
