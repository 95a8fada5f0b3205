use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, instrument};

use launchpad_core::{
    CoreError, CoreResult, FlightNumber, FlightNumberSequence, Launch, LaunchFilter, LaunchPatch,
    LaunchRepository, PlanetCatalog, SyncAttempt, SyncMarker, SyncStatusRepository, UpdateResult,
};

use crate::SqlConnection;

const LAUNCH_COLUMNS: &str =
    "flight_number, mission, rocket, launch_date, target, customers, upcoming, success";

const FLIGHT_NUMBER_SEQUENCE: &str = "flight_number";

fn db_error(action: &str, e: sqlx::Error) -> CoreError {
    CoreError::StateStoreError(format!("Failed to {}: {}", action, e))
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn column_error(column: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::SerializationError(format!("Error reading column '{}': {}", column, e))
}

fn flight_number_from(raw: i64) -> CoreResult<FlightNumber> {
    let value = u32::try_from(raw).map_err(|e| column_error("flight_number", e))?;
    FlightNumber::new(value)
}

fn launch_from_row(row: &SqliteRow) -> CoreResult<Launch> {
    let flight_number: i64 = row
        .try_get("flight_number")
        .map_err(|e| column_error("flight_number", e))?;
    let launch_date: String = row
        .try_get("launch_date")
        .map_err(|e| column_error("launch_date", e))?;
    let customers: String = row
        .try_get("customers")
        .map_err(|e| column_error("customers", e))?;

    Ok(Launch {
        flight_number: flight_number_from(flight_number)?,
        mission: row.try_get("mission").map_err(|e| column_error("mission", e))?,
        rocket: row.try_get("rocket").map_err(|e| column_error("rocket", e))?,
        launch_date: DateTime::parse_from_rfc3339(&launch_date)
            .map_err(|e| column_error("launch_date", e))?
            .with_timezone(&Utc),
        target: row.try_get("target").map_err(|e| column_error("target", e))?,
        customers: serde_json::from_str(&customers)?,
        upcoming: row.try_get("upcoming").map_err(|e| column_error("upcoming", e))?,
        success: row.try_get("success").map_err(|e| column_error("success", e))?,
    })
}

fn timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn push_conditions(builder: &mut QueryBuilder<'static, Sqlite>, filter: &LaunchFilter) {
    if let Some(flight_number) = filter.flight_number {
        builder
            .push(" AND flight_number = ")
            .push_bind(i64::from(flight_number.get()));
    }
    if let Some(mission) = &filter.mission {
        builder.push(" AND mission = ").push_bind(mission.clone());
    }
    if let Some(rocket) = &filter.rocket {
        builder.push(" AND rocket = ").push_bind(rocket.clone());
    }
    if let Some(target) = &filter.target {
        builder.push(" AND target = ").push_bind(target.clone());
    }
    if let Some(upcoming) = filter.upcoming {
        builder.push(" AND upcoming = ").push_bind(upcoming);
    }
    if let Some(success) = filter.success {
        builder.push(" AND success = ").push_bind(success);
    }
}

fn select_matching(filter: &LaunchFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM launches WHERE 1 = 1", LAUNCH_COLUMNS));
    push_conditions(&mut builder, filter);
    builder.push(" ORDER BY flight_number LIMIT 1");
    builder
}

/// Single UPDATE touching the lowest matching row, and only when a patched
/// value differs from the stored one. `None` when the patch is empty.
fn update_matching(
    filter: &LaunchFilter,
    patch: &LaunchPatch,
) -> Option<QueryBuilder<'static, Sqlite>> {
    let mut assignments: Vec<(&'static str, PatchValue)> = Vec::new();
    if let Some(upcoming) = patch.upcoming {
        assignments.push(("upcoming", PatchValue::Flag(upcoming)));
    }
    if let Some(success) = patch.success {
        assignments.push(("success", PatchValue::Flag(success)));
    }
    if let Some(target) = &patch.target {
        assignments.push(("target", PatchValue::Text(target.clone())));
    }
    if assignments.is_empty() {
        return None;
    }

    let mut builder: QueryBuilder<'static, Sqlite> = QueryBuilder::new("UPDATE launches SET ");
    for (column, value) in &assignments {
        builder.push(*column).push(" = ");
        value.bind(&mut builder);
        builder.push(", ");
    }
    builder
        .push("updated_at = ")
        .push_bind(timestamp(&Utc::now()));

    builder.push(" WHERE flight_number = (SELECT flight_number FROM launches WHERE 1 = 1");
    push_conditions(&mut builder, filter);
    builder.push(" ORDER BY flight_number LIMIT 1) AND (");

    for (index, (column, value)) in assignments.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        builder.push(*column).push(" IS NOT ");
        value.bind(&mut builder);
    }
    builder.push(")");

    Some(builder)
}

enum PatchValue {
    Flag(bool),
    Text(String),
}

impl PatchValue {
    fn bind(&self, builder: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            PatchValue::Flag(flag) => {
                builder.push_bind(*flag);
            }
            PatchValue::Text(text) => {
                builder.push_bind(text.clone());
            }
        }
    }
}

/// SQLite implementation of the LaunchRepository
#[derive(Clone)]
pub struct SqlLaunchRepository {
    conn: SqlConnection,
}

impl SqlLaunchRepository {
    /// Create a new SQLite launch repository
    pub fn new(conn: SqlConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl LaunchRepository for SqlLaunchRepository {
    #[instrument(skip(self, launch), fields(flight_number = %launch.flight_number))]
    async fn upsert(&self, launch: &Launch) -> CoreResult<()> {
        let customers = serde_json::to_string(&launch.customers)?;

        let query = "
            INSERT INTO launches
                (flight_number, mission, rocket, launch_date, target, customers, upcoming, success, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (flight_number) DO UPDATE SET
                mission = excluded.mission,
                rocket = excluded.rocket,
                launch_date = excluded.launch_date,
                target = excluded.target,
                customers = excluded.customers,
                upcoming = excluded.upcoming,
                success = excluded.success,
                updated_at = excluded.updated_at
        ";

        sqlx::query(query)
            .bind(i64::from(launch.flight_number.get()))
            .bind(&launch.mission)
            .bind(&launch.rocket)
            .bind(timestamp(&launch.launch_date))
            .bind(&launch.target)
            .bind(customers)
            .bind(launch.upcoming)
            .bind(launch.success)
            .bind(timestamp(&Utc::now()))
            .execute(self.conn.pool())
            .await
            .map_err(|e| db_error("upsert launch", e))?;

        debug!("Upserted launch");
        Ok(())
    }

    async fn find_one(&self, filter: &LaunchFilter) -> CoreResult<Option<Launch>> {
        let row = select_matching(filter)
            .build()
            .fetch_optional(self.conn.pool())
            .await
            .map_err(|e| db_error("query launches", e))?;

        row.as_ref().map(launch_from_row).transpose()
    }

    async fn list(&self, skip: usize, limit: Option<usize>) -> CoreResult<Vec<Launch>> {
        // LIMIT -1 is unbounded in SQLite
        let limit = limit.map_or(-1, to_i64);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM launches ORDER BY flight_number LIMIT ? OFFSET ?",
            LAUNCH_COLUMNS
        ))
        .bind(limit)
        .bind(to_i64(skip))
        .fetch_all(self.conn.pool())
        .await
        .map_err(|e| db_error("list launches", e))?;

        rows.iter().map(launch_from_row).collect()
    }

    #[instrument(skip(self, filter, patch))]
    async fn update_fields(
        &self,
        filter: &LaunchFilter,
        patch: &LaunchPatch,
    ) -> CoreResult<UpdateResult> {
        // Single statement: no read lock is held ahead of the write
        if let Some(mut update) = update_matching(filter, patch) {
            let changed = update
                .build()
                .execute(self.conn.pool())
                .await
                .map_err(|e| db_error("update launch", e))?
                .rows_affected();

            if changed > 0 {
                debug!("Updated launch fields");
                return Ok(UpdateResult {
                    matched: true,
                    modified: true,
                });
            }
        }

        let matched = self.find_one(filter).await?.is_some();
        Ok(UpdateResult {
            matched,
            modified: false,
        })
    }

    async fn latest_flight_number(&self) -> CoreResult<Option<FlightNumber>> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(flight_number) FROM launches")
            .fetch_one(self.conn.pool())
            .await
            .map_err(|e| db_error("read latest flight number", e))?;

        max.map(flight_number_from).transpose()
    }

    async fn count(&self) -> CoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM launches")
            .fetch_one(self.conn.pool())
            .await
            .map_err(|e| db_error("count launches", e))?;

        usize::try_from(count).map_err(|e| column_error("count", e))
    }
}

/// SQLite implementation of the FlightNumberSequence
#[derive(Clone)]
pub struct SqlFlightNumberSequence {
    conn: SqlConnection,
}

impl SqlFlightNumberSequence {
    /// Create a new SQLite flight number sequence
    pub fn new(conn: SqlConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl FlightNumberSequence for SqlFlightNumberSequence {
    async fn allocate(&self) -> CoreResult<FlightNumber> {
        // One statement, so SQLite serializes concurrent allocations
        let query = "
            INSERT INTO sequences (name, value)
            VALUES (?, COALESCE((SELECT MAX(flight_number) FROM launches), 0) + 1)
            ON CONFLICT (name) DO UPDATE SET
                value = MAX(sequences.value, COALESCE((SELECT MAX(flight_number) FROM launches), 0)) + 1
            RETURNING value
        ";

        let value: i64 = sqlx::query_scalar(query)
            .bind(FLIGHT_NUMBER_SEQUENCE)
            .fetch_one(self.conn.pool())
            .await
            .map_err(|e| db_error("allocate flight number", e))?;

        let allocated = flight_number_from(value)?;
        debug!(flight_number = %allocated, "Allocated flight number");
        Ok(allocated)
    }
}

/// SQLite implementation of the SyncStatusRepository
#[derive(Clone)]
pub struct SqlSyncStatusRepository {
    conn: SqlConnection,
}

impl SqlSyncStatusRepository {
    /// Create a new SQLite sync status repository
    pub fn new(conn: SqlConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SyncStatusRepository for SqlSyncStatusRepository {
    async fn marker(&self) -> CoreResult<Option<SyncMarker>> {
        let row = sqlx::query(
            "SELECT source, completed_at, stored, skipped FROM sync_markers WHERE id = 1",
        )
        .fetch_optional(self.conn.pool())
        .await
        .map_err(|e| db_error("read sync marker", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let completed_at: String = row
            .try_get("completed_at")
            .map_err(|e| column_error("completed_at", e))?;
        let stored: i64 = row.try_get("stored").map_err(|e| column_error("stored", e))?;
        let skipped: i64 = row.try_get("skipped").map_err(|e| column_error("skipped", e))?;

        Ok(Some(SyncMarker {
            source: row.try_get("source").map_err(|e| column_error("source", e))?,
            completed_at: DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| column_error("completed_at", e))?
                .with_timezone(&Utc),
            stored: usize::try_from(stored).map_err(|e| column_error("stored", e))?,
            skipped: usize::try_from(skipped).map_err(|e| column_error("skipped", e))?,
        }))
    }

    async fn record_marker(&self, marker: &SyncMarker) -> CoreResult<()> {
        let query = "
            INSERT INTO sync_markers (id, source, completed_at, stored, skipped)
            VALUES (1, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                source = excluded.source,
                completed_at = excluded.completed_at,
                stored = excluded.stored,
                skipped = excluded.skipped
        ";

        sqlx::query(query)
            .bind(&marker.source)
            .bind(timestamp(&marker.completed_at))
            .bind(to_i64(marker.stored))
            .bind(to_i64(marker.skipped))
            .execute(self.conn.pool())
            .await
            .map_err(|e| db_error("record sync marker", e))?;

        Ok(())
    }

    async fn attempt(&self) -> CoreResult<Option<SyncAttempt>> {
        let row = sqlx::query("SELECT source, started_at FROM sync_attempts WHERE id = 1")
            .fetch_optional(self.conn.pool())
            .await
            .map_err(|e| db_error("read sync attempt", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let started_at: String = row
            .try_get("started_at")
            .map_err(|e| column_error("started_at", e))?;

        Ok(Some(SyncAttempt {
            source: row.try_get("source").map_err(|e| column_error("source", e))?,
            started_at: DateTime::parse_from_rfc3339(&started_at)
                .map_err(|e| column_error("started_at", e))?
                .with_timezone(&Utc),
        }))
    }

    async fn record_attempt(&self, attempt: &SyncAttempt) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO sync_attempts (id, source, started_at) VALUES (1, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                source = excluded.source,
                started_at = excluded.started_at",
        )
        .bind(&attempt.source)
        .bind(timestamp(&attempt.started_at))
        .execute(self.conn.pool())
        .await
        .map_err(|e| db_error("record sync attempt", e))?;

        Ok(())
    }
}

/// SQLite planet catalog keyed by Kepler name
#[derive(Clone)]
pub struct SqlPlanetCatalog {
    conn: SqlConnection,
}

impl SqlPlanetCatalog {
    /// Create a new SQLite planet catalog
    pub fn new(conn: SqlConnection) -> Self {
        Self { conn }
    }

    /// Add a planet; existing names are left as they are
    pub async fn insert(&self, kepler_name: &str) -> CoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO planets (kepler_name) VALUES (?)")
            .bind(kepler_name)
            .execute(self.conn.pool())
            .await
            .map_err(|e| db_error("insert planet", e))?;
        Ok(())
    }
}

#[async_trait]
impl PlanetCatalog for SqlPlanetCatalog {
    async fn exists(&self, kepler_name: &str) -> CoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM planets WHERE kepler_name = ?")
                .bind(kepler_name)
                .fetch_optional(self.conn.pool())
                .await
                .map_err(|e| db_error("look up planet", e))?;

        Ok(found.is_some())
    }
}
