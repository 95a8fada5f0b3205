/// Generate SQL migrations for the SQLite state store
///
/// Each migration is idempotent and they are applied in order on every
/// connect when `run_migrations` is set.
pub fn generate_migrations() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "20240401000000_initial_schema",
            r#"
            -- Launch records, one row per flight number
            CREATE TABLE IF NOT EXISTS launches (
                flight_number INTEGER PRIMARY KEY,
                mission TEXT NOT NULL,
                rocket TEXT NOT NULL,
                launch_date TEXT NOT NULL,
                target TEXT,
                customers TEXT NOT NULL DEFAULT '[]',
                upcoming INTEGER NOT NULL,
                success INTEGER NOT NULL DEFAULT 1,
                updated_at TEXT NOT NULL
            );

            -- Named counters
            CREATE TABLE IF NOT EXISTS sequences (
                name TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            -- Single-row sync completion marker
            CREATE TABLE IF NOT EXISTS sync_markers (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                source TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                stored INTEGER NOT NULL,
                skipped INTEGER NOT NULL
            );

            -- Known planets
            CREATE TABLE IF NOT EXISTS planets (
                kepler_name TEXT PRIMARY KEY
            );
            "#,
        ),
        (
            "20240402000000_launch_indexes",
            r#"
            CREATE INDEX IF NOT EXISTS idx_launches_mission ON launches(mission);
            CREATE INDEX IF NOT EXISTS idx_launches_upcoming ON launches(upcoming);
            "#,
        ),
        (
            "20240403000000_sync_attempts",
            r#"
            -- Single-row record of the latest sync attempt
            CREATE TABLE IF NOT EXISTS sync_attempts (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                source TEXT NOT NULL,
                started_at TEXT NOT NULL
            );
            "#,
        ),
    ]
}
