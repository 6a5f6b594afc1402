use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::models::{
    FinalizedQuote, FollowUpNote, Hospital, Instrument, QuoteHeader, QuoteRecord, StaffUser,
    UserRole,
};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> SqlResult<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> SqlResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![
            (
                "001_create_catalog.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/001_create_catalog.sql"
                )),
            ),
            (
                "002_create_quotes.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/002_create_quotes.sql"
                )),
            ),
            (
                "003_create_users_and_settings.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/003_create_users_and_settings.sql"
                )),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    // --- hospitals ---

    pub fn upsert_hospital(&self, hospital: &Hospital) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO hospitals (
                id, name, address, city, contact_person, phone, email, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                hospital.id,
                hospital.name,
                hospital.address,
                hospital.city,
                hospital.contact_person,
                hospital.phone,
                hospital.email,
                hospital.created_at,
                hospital.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_hospital(&self, id: &str) -> SqlResult<Option<Hospital>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, address, city, contact_person, phone, email, created_at, updated_at
             FROM hospitals WHERE id = ?1",
        )?;
        stmt.query_row(params![id], row_to_hospital).optional()
    }

    pub fn list_hospitals(&self) -> SqlResult<Vec<Hospital>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, address, city, contact_person, phone, email, created_at, updated_at
             FROM hospitals ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], row_to_hospital)?;
        rows.collect()
    }

    pub fn delete_hospital(&self, id: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM hospitals WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Replaces the cached copy wholesale after a successful remote fetch.
    pub fn replace_hospitals(&mut self, hospitals: &[Hospital]) -> SqlResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM hospitals", [])?;
        for hospital in hospitals {
            tx.execute(
                "INSERT INTO hospitals (
                    id, name, address, city, contact_person, phone, email, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    hospital.id,
                    hospital.name,
                    hospital.address,
                    hospital.city,
                    hospital.contact_person,
                    hospital.phone,
                    hospital.email,
                    hospital.created_at,
                    hospital.updated_at
                ],
            )?;
        }
        tx.commit()
    }

    // --- instruments ---

    pub fn upsert_instrument(&self, instrument: &Instrument) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO instruments (
                id, name, catalog_code, hsn_code, gst_type, gst_percent, unit_price,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                instrument.id,
                instrument.name,
                instrument.catalog_code,
                instrument.hsn_code,
                instrument.gst_type,
                instrument.gst_percent,
                instrument.unit_price,
                instrument.created_at,
                instrument.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_instrument(&self, id: &str) -> SqlResult<Option<Instrument>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, catalog_code, hsn_code, gst_type, gst_percent, unit_price,
                    created_at, updated_at
             FROM instruments WHERE id = ?1",
        )?;
        stmt.query_row(params![id], row_to_instrument).optional()
    }

    pub fn list_instruments(&self) -> SqlResult<Vec<Instrument>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, catalog_code, hsn_code, gst_type, gst_percent, unit_price,
                    created_at, updated_at
             FROM instruments ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map([], row_to_instrument)?;
        rows.collect()
    }

    pub fn delete_instrument(&self, id: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM instruments WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn replace_instruments(&mut self, instruments: &[Instrument]) -> SqlResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM instruments", [])?;
        for instrument in instruments {
            tx.execute(
                "INSERT INTO instruments (
                    id, name, catalog_code, hsn_code, gst_type, gst_percent, unit_price,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    instrument.id,
                    instrument.name,
                    instrument.catalog_code,
                    instrument.hsn_code,
                    instrument.gst_type,
                    instrument.gst_percent,
                    instrument.unit_price,
                    instrument.created_at,
                    instrument.updated_at
                ],
            )?;
        }
        tx.commit()
    }

    // --- quote header (single working record) ---

    pub fn get_quote_header(&self) -> SqlResult<Option<QuoteHeader>> {
        let mut stmt = self
            .conn
            .prepare("SELECT doc FROM quote_header WHERE id = 1")?;
        let raw: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;
        match raw {
            Some(raw) => Ok(Some(doc_from_json(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_quote_header(&self, header: &QuoteHeader) -> SqlResult<()> {
        let doc = doc_to_json(header)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO quote_header (id, doc, updated_at)
             VALUES (1, ?1, datetime('now'))",
            params![doc],
        )?;
        Ok(())
    }

    // --- finalized quotes (append-only) ---

    pub fn append_finalized_quote(&self, quote: &FinalizedQuote, finalized_at: &str) -> SqlResult<()> {
        let doc = doc_to_json(quote)?;
        self.conn.execute(
            "INSERT INTO quotes (id, quote_no, revision, hospital_name, total_value, finalized_at, doc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                quote.id,
                quote.header.quote_no,
                quote.revision,
                quote.header.hospital_name,
                quote.summary.rounded_total,
                finalized_at,
                doc
            ],
        )?;
        Ok(())
    }

    pub fn max_revision(&self, quote_no: &str) -> SqlResult<u32> {
        let mut stmt = self
            .conn
            .prepare("SELECT COALESCE(MAX(revision), 0) FROM quotes WHERE quote_no = ?1")?;
        stmt.query_row(params![quote_no], |row| row.get(0))
    }

    pub fn list_quotes(&self) -> SqlResult<Vec<QuoteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quote_no, revision, hospital_name, total_value, finalized_at
             FROM quotes
             ORDER BY finalized_at DESC, quote_no, revision DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(QuoteRecord {
                id: row.get(0)?,
                quote_no: row.get(1)?,
                revision: row.get(2)?,
                hospital_name: row.get(3)?,
                total_value: row.get(4)?,
                finalized_at: row.get(5)?,
            })
        })?;
        rows.collect()
    }

    pub fn get_finalized_quote(&self, id: &str) -> SqlResult<Option<FinalizedQuote>> {
        let mut stmt = self.conn.prepare("SELECT doc FROM quotes WHERE id = ?1")?;
        let raw: Option<String> = stmt.query_row(params![id], |row| row.get(0)).optional()?;
        match raw {
            Some(raw) => Ok(Some(doc_from_json(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn known_quote_nos(&self) -> SqlResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT quote_no FROM quotes")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect()
    }

    pub fn count_quotes(&self) -> SqlResult<u32> {
        self.conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))
    }

    pub fn monthly_quoted_total(&self, year_month: &str) -> SqlResult<f64> {
        let mut stmt = self.conn.prepare(
            "SELECT SUM(total_value) FROM quotes WHERE substr(finalized_at, 1, 7) = ?1",
        )?;
        let total: Option<f64> = stmt.query_row(params![year_month], |row| row.get(0))?;
        Ok(total.unwrap_or(0.0))
    }

    pub fn recent_quotes(&self, limit: usize) -> SqlResult<Vec<QuoteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quote_no, revision, hospital_name, total_value, finalized_at
             FROM quotes
             ORDER BY finalized_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(QuoteRecord {
                id: row.get(0)?,
                quote_no: row.get(1)?,
                revision: row.get(2)?,
                hospital_name: row.get(3)?,
                total_value: row.get(4)?,
                finalized_at: row.get(5)?,
            })
        })?;
        rows.collect()
    }

    // --- follow-ups ---

    pub fn append_follow_up(&self, note: &FollowUpNote) -> SqlResult<()> {
        self.conn.execute(
            "INSERT INTO follow_ups (id, quote_id, status, note, date, time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                note.id,
                note.quote_id,
                note.status,
                note.note,
                note.date,
                note.time,
                note.created_at
            ],
        )?;
        Ok(())
    }

    pub fn list_follow_ups(&self, quote_id: &str) -> SqlResult<Vec<FollowUpNote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, quote_id, status, note, date, time, created_at
             FROM follow_ups WHERE quote_id = ?1
             ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![quote_id], |row| {
            Ok(FollowUpNote {
                id: row.get(0)?,
                quote_id: row.get(1)?,
                status: row.get(2)?,
                note: row.get(3)?,
                date: row.get(4)?,
                time: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    // --- staff users ---

    pub fn upsert_user(&self, user: &StaffUser) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (email, name, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.email,
                user.name,
                user.role.to_string(),
                user.created_at,
                user.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, email: &str) -> SqlResult<Option<StaffUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT email, name, role, created_at, updated_at FROM users WHERE email = ?1",
        )?;
        stmt.query_row(params![email], row_to_user).optional()
    }

    pub fn list_users(&self) -> SqlResult<Vec<StaffUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT email, name, role, created_at, updated_at FROM users ORDER BY email",
        )?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect()
    }

    pub fn delete_user(&self, email: &str) -> SqlResult<()> {
        self.conn
            .execute("DELETE FROM users WHERE email = ?1", params![email])?;
        Ok(())
    }

    pub fn count_hospitals(&self) -> SqlResult<u32> {
        self.conn
            .query_row("SELECT COUNT(*) FROM hospitals", [], |row| row.get(0))
    }

    pub fn count_instruments(&self) -> SqlResult<u32> {
        self.conn
            .query_row("SELECT COUNT(*) FROM instruments", [], |row| row.get(0))
    }

    // --- settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> SqlResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> SqlResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        stmt.query_row(params![key], |row| row.get(0)).optional()
    }
}

fn row_to_hospital(row: &rusqlite::Row<'_>) -> SqlResult<Hospital> {
    Ok(Hospital {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        contact_person: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_instrument(row: &rusqlite::Row<'_>) -> SqlResult<Instrument> {
    Ok(Instrument {
        id: row.get(0)?,
        name: row.get(1)?,
        catalog_code: row.get(2)?,
        hsn_code: row.get(3)?,
        gst_type: row.get(4)?,
        gst_percent: row.get(5)?,
        unit_price: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_user(row: &rusqlite::Row<'_>) -> SqlResult<StaffUser> {
    let raw_role: String = row.get(2)?;
    let role: UserRole = raw_role.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown role: {}", raw_role).into(),
        )
    })?;
    Ok(StaffUser {
        email: row.get(0)?,
        name: row.get(1)?,
        role,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn doc_to_json<T: Serialize>(doc: &T) -> SqlResult<String> {
    serde_json::to_string(doc).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn doc_from_json<T: DeserializeOwned>(raw: &str) -> SqlResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
