use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::traits::{
    Gender, NewPatient, Patient, PatientId, PatientPatch, PatientSummary, Storage, StorageRead,
    StorageTx, StorageWrite,
};
use crate::navigator::PatientIndex;

const DB_SCHEMA_VERSION: i64 = 1;

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

pub struct SqliteTx {
    conn: Connection,
}

impl StorageTx for SqliteTx {
    fn commit(self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }
}

const PATIENT_COLUMNS: &str = r#"
    p.id, p.first_name, p.last_name, p.ssn, p.contacted, p.created, p.updated, g.id, g.name
    FROM patients p
    LEFT JOIN genders g ON g.id = p.gender_id
"#;

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    let gender_id: Option<i64> = row.get(7)?;
    let gender_name: Option<String> = row.get(8)?;
    let gender = match (gender_id, gender_name) {
        (Some(id), Some(name)) => Some(Gender { id, name }),
        _ => None,
    };
    Ok(Patient {
        id: PatientId::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        ssn: row.get(3)?,
        contacted: row.get(4)?,
        created: row.get(5)?,
        updated: row.get(6)?,
        gender,
    })
}

fn map_summary_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientSummary> {
    Ok(PatientSummary {
        id: PatientId::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        contacted: row.get(3)?,
        created: row.get(4)?,
        updated: row.get(5)?,
    })
}

fn db_load_patient(conn: &Connection, id: PatientId) -> rusqlite::Result<Option<Patient>> {
    conn.query_row(
        &format!("SELECT {} WHERE p.id = ?1", PATIENT_COLUMNS),
        params![id.get()],
        map_patient_row,
    )
    .optional()
}

fn db_list_patients(conn: &Connection, contacted: bool) -> rusqlite::Result<Vec<PatientSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, first_name, last_name, contacted, created, updated
        FROM patients
        WHERE contacted = ?1
        ORDER BY id ASC
        "#,
    )?;
    let rows = stmt
        .query_map(params![contacted], map_summary_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_count_patients(conn: &Connection, contacted: bool) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE contacted = ?1",
        params![contacted],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn db_load_gender(conn: &Connection, id: i64) -> rusqlite::Result<Option<Gender>> {
    conn.query_row(
        "SELECT id, name FROM genders WHERE id = ?1",
        params![id],
        |row| {
            Ok(Gender {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

fn db_list_genders(conn: &Connection) -> rusqlite::Result<Vec<Gender>> {
    let mut stmt = conn.prepare("SELECT id, name FROM genders ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Gender {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_locate_patient(
    conn: &Connection,
    id: PatientId,
    contacted: bool,
) -> rusqlite::Result<Option<PatientIndex>> {
    conn.query_row(
        r#"
        SELECT total, position, prev_id, next_id
        FROM (
            SELECT id,
                   COUNT(*) OVER () AS total,
                   ROW_NUMBER() OVER (ORDER BY id ASC) AS position,
                   LAG(id) OVER (ORDER BY id ASC) AS prev_id,
                   LEAD(id) OVER (ORDER BY id ASC) AS next_id
            FROM patients
            WHERE contacted = ?1
        )
        WHERE id = ?2
        "#,
        params![contacted, id.get()],
        |row| {
            let total: i64 = row.get(0)?;
            let position: i64 = row.get(1)?;
            let prev_id: Option<i64> = row.get(2)?;
            let next_id: Option<i64> = row.get(3)?;
            Ok(PatientIndex {
                total: total as usize,
                current_index: position as usize,
                prev_id: prev_id.map(PatientId::new),
                next_id: next_id.map(PatientId::new),
            })
        },
    )
    .optional()
}

fn db_insert_patient(
    conn: &Connection,
    patient: &NewPatient,
    now: DateTime<Utc>,
) -> rusqlite::Result<PatientId> {
    conn.execute(
        r#"
        INSERT INTO patients (first_name, last_name, ssn, contacted, gender_id, created, updated)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
        "#,
        params![
            patient.first_name,
            patient.last_name,
            patient.ssn,
            patient.contacted,
            patient.gender_id,
            now
        ],
    )?;
    Ok(PatientId::new(conn.last_insert_rowid()))
}

fn db_update_patient(
    conn: &Connection,
    id: PatientId,
    patch: &PatientPatch,
    now: DateTime<Utc>,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        r#"
        UPDATE patients
        SET first_name = COALESCE(?2, first_name),
            last_name = COALESCE(?3, last_name),
            ssn = CASE WHEN ?4 THEN ?5 ELSE ssn END,
            contacted = COALESCE(?6, contacted),
            gender_id = CASE WHEN ?7 THEN ?8 ELSE gender_id END,
            updated = ?9
        WHERE id = ?1
        "#,
        params![
            id.get(),
            patch.first_name,
            patch.last_name,
            patch.ssn.is_some(),
            patch.ssn.as_ref().and_then(|ssn| ssn.as_deref()),
            patch.contacted,
            patch.gender_id.is_some(),
            patch.gender_id.flatten(),
            now
        ],
    )?;
    Ok(rows > 0)
}

fn db_delete_all_patients(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM patients", [])
}

impl StorageRead for SqliteTx {
    fn load_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        Ok(db_load_patient(&self.conn, id)?)
    }

    fn list_patients(&self, contacted: bool) -> Result<Vec<PatientSummary>> {
        Ok(db_list_patients(&self.conn, contacted)?)
    }

    fn count_patients(&self, contacted: bool) -> Result<usize> {
        Ok(db_count_patients(&self.conn, contacted)?)
    }

    fn load_gender(&self, id: i64) -> Result<Option<Gender>> {
        Ok(db_load_gender(&self.conn, id)?)
    }

    fn list_genders(&self) -> Result<Vec<Gender>> {
        Ok(db_list_genders(&self.conn)?)
    }

    fn locate_patient(&self, id: PatientId, contacted: bool) -> Result<Option<PatientIndex>> {
        Ok(db_locate_patient(&self.conn, id, contacted)?)
    }
}

impl StorageWrite for SqliteTx {
    fn insert_patient(&self, patient: &NewPatient, now: DateTime<Utc>) -> Result<PatientId> {
        Ok(db_insert_patient(&self.conn, patient, now)?)
    }

    fn update_patient(
        &self,
        id: PatientId,
        patch: &PatientPatch,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(db_update_patient(&self.conn, id, patch, now)?)
    }

    fn delete_all_patients(&self) -> Result<usize> {
        Ok(db_delete_all_patients(&self.conn)?)
    }
}

impl Storage for SqliteStorage {
    type Tx = SqliteTx;

    fn begin_tx(&self) -> Result<Self::Tx> {
        let conn = self.open()?;
        Self::migrate(&conn)?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        Ok(SqliteTx { conn })
    }
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !std::path::Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.open()?;
        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            // AUTOINCREMENT keeps ids monotonic across delete-all.
            conn.execute_batch(
                r#"
            CREATE TABLE genders (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );
            INSERT INTO genders (id, name) VALUES (1, 'Female'), (2, 'Male'), (3, 'Other');
            CREATE TABLE patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                ssn TEXT,
                contacted INTEGER NOT NULL DEFAULT 0 CHECK (contacted IN (0, 1)),
                gender_id INTEGER REFERENCES genders(id),
                created TEXT NOT NULL,
                updated TEXT NOT NULL
            );
            CREATE INDEX patients_contacted_idx ON patients(contacted, id);
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl StorageRead for SqliteStorage {
    fn load_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        let row = self.with_conn(|conn| db_load_patient(conn, id))?;
        Ok(row)
    }

    fn list_patients(&self, contacted: bool) -> Result<Vec<PatientSummary>> {
        let rows = self.with_conn(|conn| db_list_patients(conn, contacted))?;
        Ok(rows)
    }

    fn count_patients(&self, contacted: bool) -> Result<usize> {
        let count = self.with_conn(|conn| db_count_patients(conn, contacted))?;
        Ok(count)
    }

    fn load_gender(&self, id: i64) -> Result<Option<Gender>> {
        let row = self.with_conn(|conn| db_load_gender(conn, id))?;
        Ok(row)
    }

    fn list_genders(&self) -> Result<Vec<Gender>> {
        let rows = self.with_conn(db_list_genders)?;
        Ok(rows)
    }

    fn locate_patient(&self, id: PatientId, contacted: bool) -> Result<Option<PatientIndex>> {
        let index = self.with_conn(|conn| db_locate_patient(conn, id, contacted))?;
        Ok(index)
    }
}
