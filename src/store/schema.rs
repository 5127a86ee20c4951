//! SQLite schema definition

/// SQL schema for the record store
pub const SCHEMA_SQL: &str = r#"
-- Chronicles: one static reference row per contributing site
CREATE TABLE IF NOT EXISTS chronicles (
    iso3166_1 TEXT NOT NULL,
    iso3166_2 TEXT NOT NULL,
    chronicler_name TEXT NOT NULL UNIQUE,
    chronicler_description TEXT NOT NULL,
    chronicler_url TEXT NOT NULL,
    chronicle_source TEXT NOT NULL
);

-- Incidents: one row per harvested record, keyed on the stable rg_id
CREATE TABLE IF NOT EXISTS incidents (
    rg_id TEXT PRIMARY KEY,
    chronicler_name TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    city TEXT,
    date TEXT NOT NULL,
    url TEXT,
    county TEXT,
    motives TEXT
);

-- Sources: references cited by an incident
CREATE TABLE IF NOT EXISTS sources (
    rg_id TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT,
    UNIQUE(rg_id, name, url)
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_incidents_chronicler ON incidents(chronicler_name);
CREATE INDEX IF NOT EXISTS idx_incidents_date ON incidents(date);
CREATE INDEX IF NOT EXISTS idx_sources_rg ON sources(rg_id);
"#;
