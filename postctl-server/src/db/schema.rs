//! Idempotent schema setup
//!
//! Creates the `status` enum and the `content`, `tag` and `content_tag`
//! tables when they are missing. Safe to run on every startup.

use sqlx::PgPool;

const CREATE_STATUS_ENUM: &str = r#"
    DO $$
    BEGIN
        IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'status') THEN
            CREATE TYPE status AS ENUM ('draft', 'publish');
        END IF;
    END
    $$;
"#;

const CREATE_CONTENT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS content (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        status status NOT NULL DEFAULT 'draft',
        publish_date TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_TAG_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tag (
        id SERIAL PRIMARY KEY,
        label TEXT UNIQUE NOT NULL
    )
"#;

const CREATE_CONTENT_TAG_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS content_tag (
        content_id INT NOT NULL,
        tag_id INT NOT NULL,
        PRIMARY KEY (content_id, tag_id),
        FOREIGN KEY (content_id) REFERENCES content (id) ON DELETE CASCADE,
        FOREIGN KEY (tag_id) REFERENCES tag (id) ON DELETE CASCADE
    )
"#;

/// Schema objects in creation order. Tables reference the enum and each
/// other, so the order matters.
const STEPS: &[(&str, &str)] = &[
    ("status enum", CREATE_STATUS_ENUM),
    ("content table", CREATE_CONTENT_TABLE),
    ("tag table", CREATE_TAG_TABLE),
    ("content_tag table", CREATE_CONTENT_TAG_TABLE),
];

/// Ensure every schema object exists
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring database schema...");

    for &(object, sql) in STEPS {
        sqlx::query(sql).execute(pool).await?;
        tracing::info!(object, "schema object ready");
    }

    Ok(())
}
