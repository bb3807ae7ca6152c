use rusqlite::{params, Connection};

// ── Client storage ──
//
// One row per (session, key), mimicking the per-browser key-value storage
// the storefront used to keep booking state in. Values are opaque strings;
// JSON interpretation happens a layer up.

pub fn get_item(conn: &Connection, session_id: &str, key: &str) -> anyhow::Result<Option<String>> {
    let mut stmt =
        conn.prepare("SELECT value FROM client_storage WHERE session_id = ?1 AND key = ?2")?;

    match stmt.query_row(params![session_id, key], |row| row.get::<_, String>(0)) {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_item(
    conn: &Connection,
    session_id: &str,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO client_storage (session_id, key, value, updated_at)
         VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(session_id, key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        params![session_id, key, value],
    )?;
    Ok(())
}

pub fn remove_item(conn: &Connection, session_id: &str, key: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM client_storage WHERE session_id = ?1 AND key = ?2",
        params![session_id, key],
    )?;
    Ok(())
}
