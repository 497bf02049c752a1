// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewProject, Project, ProjectPatch};
use crate::utils::{check_amount, fmt_ts, opt_decimal_at};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PROJECT_STATUSES: [&str; 4] = ["planned", "in_progress", "completed", "cancelled"];

const PROJECT_COLUMNS: &str = "id, name, description, client_name, client_phone, client_email, project_type, status, total_amount, start_date, end_date, created_at, updated_at";

fn map_project(r: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        client_name: r.get(3)?,
        client_phone: r.get(4)?,
        client_email: r.get(5)?,
        project_type: r.get(6)?,
        status: r.get(7)?,
        total_amount: opt_decimal_at(r, 8)?,
        start_date: r.get(9)?,
        end_date: r.get(10)?,
        created_at: r.get(11)?,
        updated_at: r.get(12)?,
    })
}

fn check_status(status: &str) -> LedgerResult<()> {
    if !PROJECT_STATUSES.contains(&status) {
        return Err(LedgerError::validation(format!(
            "unknown project status '{}'",
            status
        )));
    }
    Ok(())
}

pub fn create(conn: &Connection, new: &NewProject) -> LedgerResult<Project> {
    if new.name.trim().is_empty() || new.client_name.trim().is_empty() {
        return Err(LedgerError::validation(
            "project name and client name are required",
        ));
    }
    let status = new.status.as_deref().unwrap_or("planned");
    check_status(status)?;
    let total_amount = new.total_amount.map(check_amount).transpose()?;
    conn.execute(
        "INSERT INTO projects(name, description, client_name, client_phone, client_email, project_type, status, total_amount, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            new.name.trim(),
            new.description,
            new.client_name.trim(),
            new.client_phone,
            new.client_email,
            new.project_type,
            status,
            total_amount.map(|d| d.to_string()),
            new.start_date.as_ref().map(fmt_ts),
            new.end_date.as_ref().map(fmt_ts),
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> LedgerResult<Project> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id=?1");
    conn.query_row(&sql, params![id], map_project)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("project", id))
}

pub fn update(conn: &Connection, id: i64, patch: &ProjectPatch) -> LedgerResult<Project> {
    let current = get(conn, id)?;
    let name = match patch.name.as_deref().map(str::trim) {
        Some("") => return Err(LedgerError::validation("project name must not be empty")),
        Some(n) => n.to_string(),
        None => current.name,
    };
    let client_name = match patch.client_name.as_deref().map(str::trim) {
        Some("") => return Err(LedgerError::validation("client name must not be empty")),
        Some(n) => n.to_string(),
        None => current.client_name,
    };
    let status = patch.status.clone().unwrap_or(current.status);
    check_status(&status)?;
    let total_amount = match patch.total_amount {
        Some(d) => Some(check_amount(d)?),
        None => current.total_amount,
    };
    conn.execute(
        "UPDATE projects SET name=?1, description=?2, client_name=?3, client_phone=?4, client_email=?5,
         project_type=?6, status=?7, total_amount=?8, start_date=?9, end_date=?10, updated_at=datetime('now')
         WHERE id=?11",
        params![
            name,
            patch.description.clone().or(current.description),
            client_name,
            patch.client_phone.clone().or(current.client_phone),
            patch.client_email.clone().or(current.client_email),
            patch.project_type.clone().unwrap_or(current.project_type),
            status,
            total_amount.map(|d| d.to_string()),
            patch.start_date.or(current.start_date).as_ref().map(fmt_ts),
            patch.end_date.or(current.end_date).as_ref().map(fmt_ts),
            id
        ],
    )?;
    info!("event=project_update module=projects status=ok id={}", id);
    get(conn, id)
}

pub fn list(conn: &Connection) -> LedgerResult<Vec<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_project)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn delete(conn: &Connection, id: i64) -> LedgerResult<()> {
    get(conn, id)?;
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE project_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if n > 0 {
        return Err(LedgerError::validation(format!(
            "project {} is referenced by {} transaction(s)",
            id, n
        )));
    }
    conn.execute("DELETE FROM projects WHERE id=?1", params![id])?;
    Ok(())
}
