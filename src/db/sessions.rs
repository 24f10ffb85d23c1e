//! Session history and per-topic statistics

use rusqlite::{Connection, Result, Row, params};

use super::{now_timestamp, parse_timestamp};
use crate::domain::{HistoryEntry, QuizResult, StudySession, TopicStatistics};

/// Append a completed session to the history
pub fn record_session_completion(conn: &Connection, result: &QuizResult) -> Result<StudySession> {
    let completed_at = now_timestamp();
    conn.execute(
        r#"
    INSERT INTO study_sessions (topic_id, duration, score, total_questions, completed_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
        params![
            result.topic_id,
            result.duration,
            result.score,
            result.total_questions,
            completed_at
        ],
    )?;

    Ok(StudySession {
        id: conn.last_insert_rowid(),
        topic_id: result.topic_id,
        duration: result.duration,
        score: result.score,
        total_questions: result.total_questions,
        completed_at: parse_timestamp(5, &completed_at)?,
    })
}

/// Sessions of every topic in a subject, newest first
pub fn get_study_history(conn: &Connection, subject_id: i64) -> Result<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT ss.id, ss.topic_id, ss.duration, ss.score, ss.total_questions, ss.completed_at,
           t.name AS topic_name, s.name AS subject_name
    FROM study_sessions ss
    JOIN topics t ON ss.topic_id = t.id
    JOIN subjects s ON t.subject_id = s.id
    WHERE s.id = ?1
    ORDER BY ss.completed_at DESC, ss.id DESC
    "#,
    )?;

    let history = stmt
        .query_map(params![subject_id], |row| {
            Ok(HistoryEntry {
                session: row_to_session(row)?,
                topic_name: row.get(6)?,
                subject_name: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(history)
}

/// Aggregate a topic's history.
///
/// Average performance is the mean of per-session ratios, not total score
/// over total questions: a 1/1 session and a 0/9 session average to 0.5.
pub fn get_topic_statistics(conn: &Connection, topic_id: i64) -> Result<TopicStatistics> {
    conn.query_row(
        r#"
    SELECT COUNT(*),
           MAX(completed_at),
           AVG(CAST(score AS REAL) / CAST(total_questions AS REAL))
    FROM study_sessions
    WHERE topic_id = ?1
    "#,
        params![topic_id],
        |row| {
            let last_studied: Option<String> = row.get(1)?;
            Ok(TopicStatistics {
                session_count: row.get(0)?,
                last_studied: last_studied
                    .map(|s| parse_timestamp(1, &s))
                    .transpose()?,
                avg_performance: row.get(2)?,
            })
        },
    )
}

fn row_to_session(row: &Row) -> Result<StudySession> {
    let completed_at: String = row.get(5)?;

    Ok(StudySession {
        id: row.get(0)?,
        topic_id: row.get(1)?,
        duration: row.get(2)?,
        score: row.get(3)?,
        total_questions: row.get(4)?,
        completed_at: parse_timestamp(5, &completed_at)?,
    })
}
