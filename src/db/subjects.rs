use rusqlite::{Connection, OptionalExtension, Result, Row, params};

use super::{now_timestamp, parse_timestamp};
use crate::domain::Subject;

pub fn create_subject(conn: &Connection, name: &str, description: Option<&str>) -> Result<Subject> {
  conn.execute(
    "INSERT INTO subjects (name, description, created_at) VALUES (?1, ?2, ?3)",
    params![name, description, now_timestamp()],
  )?;
  let id = conn.last_insert_rowid();
  get_subject(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn get_subject(conn: &Connection, id: i64) -> Result<Option<Subject>> {
  conn
    .query_row(
      "SELECT id, name, description, created_at FROM subjects WHERE id = ?1",
      params![id],
      row_to_subject,
    )
    .optional()
}

/// All subjects, newest first
pub fn get_all_subjects(conn: &Connection) -> Result<Vec<Subject>> {
  let mut stmt = conn.prepare(
    "SELECT id, name, description, created_at FROM subjects ORDER BY created_at DESC, id DESC",
  )?;

  let subjects = stmt
    .query_map([], row_to_subject)?
    .collect::<Result<Vec<_>>>()?;
  Ok(subjects)
}

fn row_to_subject(row: &Row) -> Result<Subject> {
  let created_at: String = row.get(3)?;
  Ok(Subject {
    id: row.get(0)?,
    name: row.get(1)?,
    description: row.get(2)?,
    created_at: parse_timestamp(3, &created_at)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::run_migrations;

  fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
  }

  #[test]
  fn test_create_and_get_subject() {
    let conn = conn();
    let subject = create_subject(&conn, "Matemáticas", Some("Discretas")).unwrap();
    assert!(subject.id > 0);
    assert_eq!(subject.name, "Matemáticas");

    let fetched = get_subject(&conn, subject.id).unwrap().unwrap();
    assert_eq!(fetched, subject);
  }

  #[test]
  fn test_get_missing_subject() {
    assert_eq!(get_subject(&conn(), 42).unwrap(), None);
  }

  #[test]
  fn test_subjects_newest_first() {
    let conn = conn();
    let first = create_subject(&conn, "Primera", None).unwrap();
    let second = create_subject(&conn, "Segunda", None).unwrap();

    let ids: Vec<i64> = get_all_subjects(&conn).unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
  }

  #[test]
  fn test_malformed_timestamp_fails_row() {
    let conn = conn();
    conn
      .execute(
        "INSERT INTO subjects (name, created_at) VALUES ('Rota', 'not a date')",
        [],
      )
      .unwrap();
    assert!(get_all_subjects(&conn).is_err());
  }
}
