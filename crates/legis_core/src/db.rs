use crate::schema::{ProcessRecord, StageStatus, TimelineNode};
use crate::timeline::ProcessOutcome;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    Ok(conn)
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS processes (
          term INTEGER NOT NULL,
          number TEXT NOT NULL,
          title TEXT NOT NULL,
          is_finished INTEGER NOT NULL,
          is_rejected INTEGER NOT NULL,
          current_stage TEXT,
          raw_json TEXT NOT NULL,
          timeline_json TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
          PRIMARY KEY (term, number)
        );

        CREATE INDEX IF NOT EXISTS idx_processes_open ON processes(is_finished, is_rejected);
        "#,
    )?;
    Ok(())
}

/// Stores a process with the timeline built from it, replacing any earlier copy.
pub fn upsert_process(
    conn: &Connection,
    process: &ProcessRecord,
    timeline: &[TimelineNode],
    outcome: ProcessOutcome,
) -> Result<()> {
    let raw_json = serde_json::to_string(process)?;
    let timeline_json = serde_json::to_string(timeline)?;
    let current_stage = timeline
        .iter()
        .find(|node| node.status == StageStatus::Current)
        .map(|node| node.name.as_str());

    conn.execute(
        r#"
        INSERT INTO processes (
          term, number, title, is_finished, is_rejected,
          current_stage, raw_json, timeline_json
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(term, number) DO UPDATE SET
          title=excluded.title,
          is_finished=excluded.is_finished,
          is_rejected=excluded.is_rejected,
          current_stage=excluded.current_stage,
          raw_json=excluded.raw_json,
          timeline_json=excluded.timeline_json,
          updated_at=strftime('%Y-%m-%dT%H:%M:%fZ','now')
        "#,
        params![
            process.term,
            process.number,
            process.title,
            outcome.is_finished,
            outcome.is_rejected,
            current_stage,
            raw_json,
            timeline_json
        ],
    )?;

    Ok(())
}

pub fn load_timeline(
    conn: &Connection,
    term: u32,
    number: &str,
) -> Result<Option<Vec<TimelineNode>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT timeline_json FROM processes WHERE term = ?1 AND number = ?2",
            params![term, number],
            |row| row.get(0),
        )
        .optional()?;
    raw.map(|json| {
        serde_json::from_str(&json)
            .with_context(|| format!("corrupt timeline for process {term}/{number}"))
    })
    .transpose()
}

/// Timelines of every process that is neither finished nor rejected.
pub fn in_progress_timelines(conn: &Connection) -> Result<Vec<Vec<TimelineNode>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT term, number, timeline_json
        FROM processes
        WHERE is_finished = 0 AND is_rejected = 0
        ORDER BY term, number
        "#,
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut timelines = Vec::new();
    for r in rows {
        let (term, number, json) = r?;
        let timeline: Vec<TimelineNode> = serde_json::from_str(&json)
            .with_context(|| format!("corrupt timeline for process {term}/{number}"))?;
        timelines.push(timeline);
    }
    Ok(timelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawStageEvent;
    use crate::timeline::TimelineBuilder;

    fn process(number: &str, last_stage: &str) -> ProcessRecord {
        ProcessRecord {
            number: number.to_string(),
            term: 10,
            title: format!("Projekt {number}"),
            stages: vec![
                RawStageEvent {
                    stage_number: 1,
                    stage_name: "Projekt wpłynął do Sejmu".to_string(),
                    date: Some("2024-01-10".to_string()),
                    ..Default::default()
                },
                RawStageEvent {
                    stage_number: 2,
                    stage_name: last_stage.to_string(),
                    date: Some("2024-02-10".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn store(conn: &Connection, process: &ProcessRecord) {
        let outcome = ProcessOutcome::of(process, crate::Vocabulary::polish());
        let timeline = TimelineBuilder::default().build_process(process);
        upsert_process(conn, process, &timeline, outcome).unwrap();
    }

    #[test]
    fn upsert_replaces_and_lists_open_processes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("legis.db");
        let conn = open(db_path.to_str().unwrap()).unwrap();

        store(&conn, &process("100", "I czytanie"));
        store(&conn, &process("200", "Ustawa ogłoszona w Dz.U."));
        assert_eq!(in_progress_timelines(&conn).unwrap().len(), 1);

        store(&conn, &process("100", "Ustawa ogłoszona w Dz.U."));
        assert!(in_progress_timelines(&conn).unwrap().is_empty());

        let stored = load_timeline(&conn, 10, "100").unwrap().unwrap();
        assert_eq!(stored.last().unwrap().name, "Ustawa ogłoszona w Dz.U.");
        assert_eq!(load_timeline(&conn, 10, "999").unwrap(), None);
    }
}
