use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{normalize_labels, CheckIn, Mood, NewCheckIn};
use crate::score;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn upsert_journaler(
    conn: &mut PgConnection,
    email: &str,
    display_name: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO burnscale.journalers (id, email, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET display_name = EXCLUDED.display_name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(display_name)
    .fetch_one(conn)
    .await?
    .get("id");

    Ok(id)
}

/// Scores and stores a check-in. Returns `None` when a row with the same
/// source key already exists; the journaler row is left untouched then.
pub async fn insert_check_in(
    pool: &PgPool,
    entry: &NewCheckIn,
) -> anyhow::Result<Option<CheckIn>> {
    let mood: Mood = entry.mood.parse()?;
    let burnout_score = score::score_check_in(entry)?;
    let stress_triggers = normalize_labels(&entry.stress_triggers);
    let recovery_activities = normalize_labels(&entry.recovery_activities);
    let notes = entry
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let mut tx = pool.begin().await?;
    let journaler_id = upsert_journaler(&mut tx, &entry.email, &entry.display_name).await?;
    let source_key = entry
        .source_key
        .clone()
        .unwrap_or_else(|| format!("checkin-{}", Uuid::new_v4()));

    let inserted = sqlx::query(
        r#"
        INSERT INTO burnscale.checkins
        (id, journaler_id, created_at, mood, energy_level, meaningfulness,
         stress_triggers, recovery_activities, notes, burnout_score, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (source_key) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(journaler_id)
    .bind(entry.created_at)
    .bind(mood.label())
    .bind(entry.energy_level)
    .bind(entry.meaningfulness)
    .bind(&stress_triggers)
    .bind(&recovery_activities)
    .bind(&notes)
    .bind(burnout_score)
    .bind(&source_key)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = inserted else {
        tx.rollback().await?;
        debug!(%source_key, "check-in already stored, skipping");
        return Ok(None);
    };
    tx.commit().await?;

    Ok(Some(CheckIn {
        id: row.get("id"),
        journaler_email: entry.email.clone(),
        journaler_name: entry.display_name.clone(),
        created_at: entry.created_at,
        mood,
        energy_level: entry.energy_level,
        meaningfulness: entry.meaningfulness,
        stress_triggers,
        recovery_activities,
        notes,
        burnout_score,
    }))
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let journalers = [
        ("robin.hale@example.com", "Robin Hale"),
        ("dana.okafor@example.com", "Dana Okafor"),
    ];

    #[rustfmt::skip]
    let entries: [(&str, usize, i64, &str, i32, i32, &[&str], &[&str], &str); 8] = [
        ("seed-001", 0, 6, "Meh", 3, 3, &["Work"], &["Music"], "Long planning meeting"),
        ("seed-002", 0, 5, "Sad", 2, 2, &["Work", "Sleep"], &["Rest"], "Slept badly"),
        ("seed-003", 0, 4, "Angry", 1, 2, &["Work", "Sleep", "Finances"], &[], "Deadline moved up"),
        ("seed-004", 0, 3, "Meh", 3, 4, &["Social"], &["Exercise"], "Good run after work"),
        ("seed-005", 0, 1, "Happy", 4, 5, &[], &["Meditation", "Exercise"], "Shipped the release"),
        ("seed-006", 1, 5, "Happy", 5, 4, &[], &["Talking to someone"], ""),
        ("seed-007", 1, 3, "Sad", 2, 3, &["Health"], &["Rest"], "Caught a cold"),
        ("seed-008", 1, 0, "Meh", 3, 3, &["Health", "Work"], &["Music"], "Still recovering"),
    ];

    let now = Utc::now();
    let mut inserted = 0usize;

    for (source_key, who, days_ago, mood, energy, meaning, triggers, recovery, note) in entries {
        let (email, name) = journalers[who];
        let entry = NewCheckIn {
            email: email.to_string(),
            display_name: name.to_string(),
            created_at: now - Duration::days(days_ago),
            mood: mood.to_string(),
            energy_level: energy,
            meaningfulness: meaning,
            stress_triggers: triggers.iter().map(|t| t.to_string()).collect(),
            recovery_activities: recovery.iter().map(|r| r.to_string()).collect(),
            notes: Some(note.to_string()),
            source_key: Some(source_key.to_string()),
        };

        if insert_check_in(pool, &entry).await?.is_some() {
            inserted += 1;
        }
    }

    info!(inserted, "seed check-ins stored");
    Ok(inserted)
}

pub async fn fetch_check_ins(
    pool: &PgPool,
    since: DateTime<Utc>,
    email: Option<&str>,
) -> anyhow::Result<Vec<CheckIn>> {
    let mut query = String::from(
        "SELECT c.id, j.email, j.display_name, c.created_at, c.mood, \
         c.energy_level, c.meaningfulness, c.stress_triggers, \
         c.recovery_activities, c.notes, c.burnout_score \
         FROM burnscale.checkins c \
         JOIN burnscale.journalers j ON j.id = c.journaler_id \
         WHERE c.created_at >= $1",
    );

    if email.is_some() {
        query.push_str(" AND j.email = $2");
    }
    query.push_str(" ORDER BY c.created_at");

    let mut rows = sqlx::query(&query).bind(since);

    if let Some(value) = email {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut check_ins = Vec::with_capacity(records.len());

    for row in records {
        let mood: String = row.get("mood");
        check_ins.push(CheckIn {
            id: row.get("id"),
            journaler_email: row.get("email"),
            journaler_name: row.get("display_name"),
            created_at: row.get("created_at"),
            mood: mood.parse()?,
            energy_level: row.get("energy_level"),
            meaningfulness: row.get("meaningfulness"),
            stress_triggers: row.get("stress_triggers"),
            recovery_activities: row.get("recovery_activities"),
            notes: row.get("notes"),
            burnout_score: row.get("burnout_score"),
        });
    }

    debug!(count = check_ins.len(), %since, "fetched check-ins");
    Ok(check_ins)
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    email: String,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
    mood: String,
    energy_level: i32,
    meaningfulness: i32,
    stress_triggers: Option<String>,
    recovery_activities: Option<String>,
    notes: Option<String>,
    source_key: Option<String>,
}

fn split_list(value: Option<&str>) -> Vec<String> {
    normalize_labels(value.unwrap_or_default().split(';'))
}

impl CsvRow {
    fn into_check_in(self) -> NewCheckIn {
        let display_name = self
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.clone());

        NewCheckIn {
            stress_triggers: split_list(self.stress_triggers.as_deref()),
            recovery_activities: split_list(self.recovery_activities.as_deref()),
            email: self.email,
            display_name,
            created_at: self.created_at,
            mood: self.mood,
            energy_level: self.energy_level,
            meaningfulness: self.meaningfulness,
            notes: self.notes,
            source_key: self.source_key,
        }
    }
}

/// Reads and scores every row, failing on the first bad one with its line
/// number.
pub fn read_check_ins<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> anyhow::Result<Vec<NewCheckIn>> {
    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let entry = result
            .with_context(|| format!("row {line}: malformed check-in"))?
            .into_check_in();
        score::score_check_in(&entry)
            .with_context(|| format!("row {line}: cannot score check-in"))?;
        entries.push(entry);
    }

    Ok(entries)
}

pub fn read_csv(csv_path: &std::path::Path) -> anyhow::Result<Vec<NewCheckIn>> {
    let reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_check_ins(reader)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    // Validate every row before touching the database.
    let entries = read_csv(csv_path)?;

    let mut inserted = 0usize;
    for entry in &entries {
        if insert_check_in(pool, entry).await?.is_some() {
            inserted += 1;
        }
    }

    info!(inserted, rows = entries.len(), "csv import finished");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_columns_split_on_semicolons() {
        assert_eq!(
            split_list(Some("Work; Sleep;;work ")),
            vec!["Work".to_string(), "Sleep".to_string()]
        );
        assert!(split_list(None).is_empty());
    }

    const HEADER: &str = "email,display_name,created_at,mood,energy_level,meaningfulness,\
                          stress_triggers,recovery_activities,notes,source_key\n";
    const GOOD_ROW: &str =
        "robin@example.com,,2026-03-02T09:00:00Z,sad,2,3,Work;Sleep,Rest,Rough day,import-1\n";

    fn reader(rows: &[&str]) -> csv::Reader<std::io::Cursor<String>> {
        let data = format!("{HEADER}{}", rows.concat());
        csv::Reader::from_reader(std::io::Cursor::new(data))
    }

    fn sample_entry(display_name: &str, source_key: &str) -> NewCheckIn {
        NewCheckIn {
            email: "robin@example.com".to_string(),
            display_name: display_name.to_string(),
            created_at: Utc::now(),
            mood: "Meh".to_string(),
            energy_level: 3,
            meaningfulness: 3,
            stress_triggers: vec!["Work".to_string()],
            recovery_activities: Vec::new(),
            notes: None,
            source_key: Some(source_key.to_string()),
        }
    }

    #[test]
    fn csv_rows_become_check_ins() {
        let entries = read_check_ins(reader(&[GOOD_ROW])).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];

        assert_eq!(entry.display_name, "robin@example.com");
        assert_eq!(entry.stress_triggers, vec!["Work", "Sleep"]);
        assert_eq!(entry.recovery_activities, vec!["Rest"]);
        assert_eq!(entry.source_key.as_deref(), Some("import-1"));
        // 70 + 60 + 40 + 40
        assert_eq!(score::score_check_in(entry), Ok(53));
    }

    #[test]
    fn unknown_mood_aborts_with_row_number() {
        let bad = "dana@example.com,Dana,2026-03-03T09:00:00Z,Bored,3,3,,,,import-2\n";
        let err = read_check_ins(reader(&[GOOD_ROW, bad])).unwrap_err();
        assert_eq!(err.to_string(), "row 3: cannot score check-in");
    }

    #[test]
    fn out_of_range_energy_aborts_with_row_number() {
        let bad = "dana@example.com,Dana,2026-03-03T09:00:00Z,Meh,7,3,,,,import-2\n";
        let err = read_check_ins(reader(&[GOOD_ROW, bad])).unwrap_err();
        assert_eq!(err.to_string(), "row 3: cannot score check-in");
    }

    #[test]
    fn malformed_row_aborts_with_row_number() {
        let bad = "dana@example.com,Dana,yesterday,Meh,3,3,,,,import-2\n";
        let err = read_check_ins(reader(&[bad])).unwrap_err();
        assert_eq!(err.to_string(), "row 2: malformed check-in");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_csv(std::path::Path::new("/nonexistent/checkins.csv")).unwrap_err();
        assert!(err.to_string().starts_with("failed to open"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs a Postgres instance in DATABASE_URL"]
    async fn duplicate_source_key_keeps_journaler_name(pool: PgPool) -> anyhow::Result<()> {
        let first = insert_check_in(&pool, &sample_entry("Robin Hale", "dup-1")).await?;
        assert!(first.is_some());

        let again = insert_check_in(&pool, &sample_entry("Someone Else", "dup-1")).await?;
        assert!(again.is_none());

        let name: String =
            sqlx::query("SELECT display_name FROM burnscale.journalers WHERE email = $1")
                .bind("robin@example.com")
                .fetch_one(&pool)
                .await?
                .get("display_name");
        assert_eq!(name, "Robin Hale");
        Ok(())
    }
}
