//! Attest Storage Layer
//!
//! Implements the [`FactStore`] trait on SQLite.
//!
//! # Architecture
//!
//! - `facts` holds one row per fingerprint (UNIQUE), so the merge-if-exists
//!   path is decided by the database, not by a generated id
//! - `fact_sources` accumulates provenance, idempotent per document/unit/page
//! - `claim_keys` carries maturity, recomputed inside the transaction that
//!   reads the supporting counts
//! - `units` keeps the literal text units for gap qualification
//!
//! # Examples
//!
//! ```no_run
//! use attest_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for fact operations
//! ```

#![warn(missing_docs)]

use attest_domain::traits::{FactQuery, FactStore, UpsertOutcome};
use attest_domain::{
    AssertionType, ClaimKey, ClaimKeyDraft, ContextFrame, Fact, FactId, Fingerprint, KeyStats,
    Maturity, MaturityPolicy, MaturityTransition, Position, PromotionStatus, RecordId,
    RhetoricalRole, SourceRef, TextUnit, TypedValue, ValueKind,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const FACT_COLUMNS: &str = "id, fingerprint, document_id, quote, assertion_type, role, page, paragraph, \
     value, context, status, reason, claim_key, confidence, created_at";

const KEY_COLUMNS: &str = "id, machine_key, question, domain, expected_kind, maturity, supporting_facts, \
     distinct_documents, contradiction, superseded_by, created_at, updated_at";

/// SQLite-based implementation of FactStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a mutex or
/// give each thread its own SqliteStore on the same database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use attest_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("attest.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Count stored facts by promotion status
    pub fn count_facts(&self, status: Option<PromotionStatus>) -> Result<usize, StoreError> {
        let count: i64 = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM facts WHERE status = ?1",
                params![status.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM facts", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    fn id_to_bytes(id: RecordId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_id(bytes: &[u8]) -> Result<RecordId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for id, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(RecordId::from_value(u128::from_be_bytes(arr)))
    }

    fn load_sources(conn: &Connection, fact_id: &[u8]) -> Result<Vec<SourceRef>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT document_id, unit_id, page, paragraph, recorded_at
             FROM fact_sources WHERE fact_id = ?1 ORDER BY rowid",
        )?;
        let sources = stmt
            .query_map(params![fact_id], |row| {
                Ok(SourceRef::new(
                    row.get(0)?,
                    row.get(1)?,
                    Position::new(row.get(2)?, row.get(3)?),
                    row.get::<_, i64>(4)? as u64,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    fn insert_sources(conn: &Connection, fact_id: &[u8], sources: &[SourceRef]) -> Result<usize, StoreError> {
        let mut added = 0;
        for source in sources {
            added += conn.execute(
                "INSERT OR IGNORE INTO fact_sources (fact_id, document_id, unit_id, page, paragraph, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    fact_id,
                    &source.document_id,
                    &source.unit_id,
                    source.position.page,
                    source.position.paragraph,
                    source.recorded_at as i64,
                ],
            )?;
        }
        Ok(added)
    }

    fn load_key(conn: &Connection, machine_key: &str) -> Result<Option<ClaimKey>, StoreError> {
        let sql = format!("SELECT {} FROM claim_keys WHERE machine_key = ?1", KEY_COLUMNS);
        let key = conn
            .query_row(&sql, params![machine_key], row_to_claim_key)
            .optional()?;
        Ok(key)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(StoreError::InvalidData(message)),
    )
}

fn json_column<T: serde::de::DeserializeOwned>(column: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Map a `facts` row; provenance is loaded separately
fn row_to_fact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Fact> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = SqliteStore::bytes_to_id(&id_bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
    })?;

    let assertion_type: String = row.get(4)?;
    let assertion_type = AssertionType::parse(&assertion_type)
        .ok_or_else(|| conversion_error(4, format!("Unknown assertion type: {}", assertion_type)))?;
    let role: String = row.get(5)?;
    let role = RhetoricalRole::parse(&role)
        .ok_or_else(|| conversion_error(5, format!("Unknown role: {}", role)))?;

    let value: Option<String> = row.get(8)?;
    let value: Option<TypedValue> = match value {
        Some(text) => Some(json_column(8, &text)?),
        None => None,
    };
    let context: String = row.get(9)?;
    let context: ContextFrame = json_column(9, &context)?;

    let status: String = row.get(10)?;
    let status = PromotionStatus::parse(&status)
        .ok_or_else(|| conversion_error(10, format!("Unknown promotion status: {}", status)))?;

    Ok(Fact {
        id,
        fingerprint: Fingerprint::from_digest(row.get::<_, String>(1)?),
        document_id: row.get(2)?,
        quote: row.get(3)?,
        assertion_type,
        role,
        position: Position::new(row.get(6)?, row.get(7)?),
        value,
        context,
        status,
        reason: row.get(11)?,
        claim_key: row.get(12)?,
        confidence: row.get(13)?,
        sources: Vec::new(),
        created_at: row.get::<_, i64>(14)? as u64,
    })
}

fn row_to_claim_key(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClaimKey> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = SqliteStore::bytes_to_id(&id_bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
    })?;

    let expected_kind: Option<String> = row.get(4)?;
    let expected_kind = match expected_kind {
        Some(kind) => Some(
            ValueKind::parse(&kind).ok_or_else(|| conversion_error(4, format!("Unknown value kind: {}", kind)))?,
        ),
        None => None,
    };
    let maturity: String = row.get(5)?;
    let maturity = Maturity::parse(&maturity)
        .ok_or_else(|| conversion_error(5, format!("Unknown maturity: {}", maturity)))?;

    Ok(ClaimKey {
        id,
        machine_key: row.get(1)?,
        question: row.get(2)?,
        domain: row.get(3)?,
        expected_kind,
        maturity,
        supporting_facts: row.get::<_, i64>(6)? as usize,
        distinct_documents: row.get::<_, i64>(7)? as usize,
        contradiction: row.get::<_, i64>(8)? != 0,
        superseded_by: row.get(9)?,
        created_at: row.get::<_, i64>(10)? as u64,
        updated_at: row.get::<_, i64>(11)? as u64,
    })
}

/// Linked-fact and distinct-document counts for one key
fn key_stats(conn: &Connection, machine_key: &str) -> Result<KeyStats, StoreError> {
    let linked: i64 = conn.query_row(
        "SELECT COUNT(*) FROM facts WHERE claim_key = ?1 AND status = 'linked'",
        params![machine_key],
        |row| row.get(0),
    )?;
    let documents: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT document_id) FROM (
             SELECT document_id FROM facts WHERE claim_key = ?1 AND status = 'linked'
             UNION
             SELECT s.document_id FROM fact_sources s JOIN facts f ON f.id = s.fact_id
             WHERE f.claim_key = ?1 AND f.status = 'linked'
         )",
        params![machine_key],
        |row| row.get(0),
    )?;
    Ok(KeyStats {
        linked_facts: linked as usize,
        distinct_documents: documents as usize,
    })
}

impl FactStore for SqliteStore {
    type Error = StoreError;

    fn put_unit(&mut self, unit: &TextUnit) -> Result<(), Self::Error> {
        let context = serde_json::to_string(&unit.context)?;
        self.conn.execute(
            "INSERT INTO units (document_id, unit_id, text, page, paragraph, context, theme)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(document_id, unit_id) DO UPDATE SET
             text = excluded.text, page = excluded.page, paragraph = excluded.paragraph,
             context = excluded.context, theme = excluded.theme",
            params![
                &unit.document_id,
                &unit.unit_id,
                &unit.text,
                unit.position.page,
                unit.position.paragraph,
                context,
                &unit.theme,
            ],
        )?;
        Ok(())
    }

    fn search_units(
        &self,
        terms: &[String],
        context: Option<&ContextFrame>,
        limit: usize,
    ) -> Result<Vec<TextUnit>, Self::Error> {
        let terms: Vec<&String> = terms.iter().filter(|t| !t.trim().is_empty()).collect();
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let clauses = vec!["text LIKE ?"; terms.len()].join(" OR ");
        let sql = format!(
            "SELECT document_id, unit_id, text, page, paragraph, context, theme
             FROM units WHERE {} ORDER BY document_id, page, paragraph",
            clauses
        );
        let patterns: Vec<String> = terms.iter().map(|t| format!("%{}%", t.trim())).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let units = stmt
            .query_map(params_from_iter(patterns.iter()), |row| {
                let context: String = row.get(5)?;
                Ok(TextUnit {
                    document_id: row.get(0)?,
                    unit_id: row.get(1)?,
                    text: row.get(2)?,
                    position: Position::new(row.get(3)?, row.get(4)?),
                    context: json_column(5, &context)?,
                    theme: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(units
            .into_iter()
            .filter(|u| context.map_or(true, |c| u.context.overlaps(c)))
            .take(limit)
            .collect())
    }

    fn upsert_fact(&mut self, fact: Fact) -> Result<UpsertOutcome, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(Vec<u8>, f64)> = tx
            .query_row(
                "SELECT id, confidence FROM facts WHERE fingerprint = ?1",
                params![fact.fingerprint.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let value = fact.value.as_ref().map(serde_json::to_string).transpose()?;

        let outcome = match existing {
            Some((id_bytes, stored_confidence)) => {
                let id = Self::bytes_to_id(&id_bytes)?;
                let upgraded = fact.confidence > stored_confidence;
                if upgraded {
                    tx.execute(
                        "UPDATE facts SET value = ?1, quote = ?2, confidence = ?3 WHERE id = ?4",
                        params![value, &fact.quote, fact.confidence, &id_bytes],
                    )?;
                }
                let added = Self::insert_sources(&tx, &id_bytes, &fact.sources)?;
                debug!(
                    "Merged fact {} ({} new sources, upgraded: {})",
                    fact.fingerprint, added, upgraded
                );
                UpsertOutcome::Merged { id, upgraded }
            }
            None => {
                let id_bytes = Self::id_to_bytes(fact.id);
                let context = serde_json::to_string(&fact.context)?;
                tx.execute(
                    "INSERT INTO facts (id, fingerprint, document_id, quote, assertion_type, role, page, paragraph,
                                        value, context, status, reason, claim_key, confidence, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    params![
                        &id_bytes,
                        fact.fingerprint.as_str(),
                        &fact.document_id,
                        &fact.quote,
                        fact.assertion_type.as_str(),
                        fact.role.as_str(),
                        fact.position.page,
                        fact.position.paragraph,
                        value,
                        context,
                        fact.status.as_str(),
                        &fact.reason,
                        &fact.claim_key,
                        fact.confidence,
                        fact.created_at as i64,
                    ],
                )?;
                Self::insert_sources(&tx, &id_bytes, &fact.sources)?;
                UpsertOutcome::Created(fact.id)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn get_fact(&self, id: FactId) -> Result<Option<Fact>, Self::Error> {
        let id_bytes = Self::id_to_bytes(id);
        let sql = format!("SELECT {} FROM facts WHERE id = ?1", FACT_COLUMNS);

        let fact = self
            .conn
            .query_row(&sql, params![&id_bytes], row_to_fact)
            .optional()?;

        match fact {
            Some(mut fact) => {
                fact.sources = Self::load_sources(&self.conn, &id_bytes)?;
                Ok(Some(fact))
            }
            None => Ok(None),
        }
    }

    fn query_facts(&self, query: &FactQuery) -> Result<Vec<Fact>, Self::Error> {
        let mut sql = format!("SELECT {} FROM facts WHERE 1=1", FACT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(claim_key) = &query.claim_key {
            sql.push_str(" AND claim_key = ?");
            params.push(Box::new(claim_key.clone()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(document_id) = &query.document_id {
            sql.push_str(" AND document_id = ?");
            params.push(Box::new(document_id.clone()));
        }

        sql.push_str(" ORDER BY created_at, rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let facts = stmt
            .query_map(&param_refs[..], row_to_fact)?
            .collect::<Result<Vec<_>, _>>()?;

        // Context overlap is not expressible over the JSON column
        let limit = query.limit.unwrap_or(usize::MAX);
        let mut selected = Vec::new();
        for mut fact in facts {
            if selected.len() >= limit {
                break;
            }
            if let Some(context) = &query.context {
                if !fact.context.overlaps(context) {
                    continue;
                }
            }
            fact.sources = Self::load_sources(&self.conn, &Self::id_to_bytes(fact.id))?;
            selected.push(fact);
        }

        Ok(selected)
    }

    fn ensure_claim_key(&mut self, draft: &ClaimKeyDraft) -> Result<ClaimKey, Self::Error> {
        let fresh = ClaimKey::from_draft(draft, now_secs());
        self.conn.execute(
            "INSERT OR IGNORE INTO claim_keys (id, machine_key, question, domain, expected_kind, maturity,
                                               created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                Self::id_to_bytes(fresh.id),
                &fresh.machine_key,
                &fresh.question,
                &fresh.domain,
                fresh.expected_kind.map(|k| k.as_str()),
                fresh.maturity.as_str(),
                fresh.created_at as i64,
                fresh.updated_at as i64,
            ],
        )?;

        Self::load_key(&self.conn, &draft.machine_key)?
            .ok_or_else(|| StoreError::NotFound(draft.machine_key.clone()))
    }

    fn get_claim_key(&self, machine_key: &str) -> Result<Option<ClaimKey>, Self::Error> {
        Self::load_key(&self.conn, machine_key)
    }

    fn find_claim_keys(&self, fragment: &str) -> Result<Vec<ClaimKey>, Self::Error> {
        let sql = format!(
            "SELECT {} FROM claim_keys WHERE machine_key LIKE ?1 ORDER BY machine_key",
            KEY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map(params![format!("%{}%", fragment.trim())], row_to_claim_key)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn recompute_claim_key(
        &mut self,
        machine_key: &str,
        policy: &MaturityPolicy,
    ) -> Result<Option<MaturityTransition>, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = match Self::load_key(&tx, machine_key)? {
            Some(key) => key.maturity,
            None => return Ok(None),
        };

        let stats = key_stats(&tx, machine_key)?;
        let next = policy.classify(stats, current);

        tx.execute(
            "UPDATE claim_keys SET maturity = ?1, supporting_facts = ?2, distinct_documents = ?3, updated_at = ?4
             WHERE machine_key = ?5",
            params![
                next.as_str(),
                stats.linked_facts as i64,
                stats.distinct_documents as i64,
                now_secs() as i64,
                machine_key,
            ],
        )?;
        tx.commit()?;

        Ok(Some(MaturityTransition {
            machine_key: machine_key.to_string(),
            from: current,
            to: next,
            stats,
        }))
    }

    fn deprecate_claim_key(
        &mut self,
        machine_key: &str,
        superseded_by: Option<&str>,
    ) -> Result<Option<ClaimKey>, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE claim_keys SET maturity = 'deprecated', superseded_by = ?1, updated_at = ?2
             WHERE machine_key = ?3",
            params![superseded_by, now_secs() as i64, machine_key],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::load_key(&self.conn, machine_key)
    }

    fn flag_contradiction(&mut self, machine_key: &str) -> Result<(), Self::Error> {
        let updated = self.conn.execute(
            "UPDATE claim_keys SET contradiction = 1 WHERE machine_key = ?1",
            params![machine_key],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(machine_key.to_string()));
        }
        Ok(())
    }
}
