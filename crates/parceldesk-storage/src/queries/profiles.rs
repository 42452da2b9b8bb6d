// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User profile operations.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::Profile;
use crate::queries::rows;

const PROFILE_COLUMNS: &str = "id, email, full_name, role, circuit, phone, created_at, updated_at";

/// Insert a profile.
pub async fn create_profile(db: &Database, profile: &Profile) -> Result<(), DeskError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO profiles (id, email, full_name, role, circuit, phone,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    profile.id,
                    profile.email,
                    profile.full_name,
                    profile.role.to_string(),
                    profile.circuit,
                    profile.phone,
                    profile.created_at,
                    profile.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a profile by id.
pub async fn get_profile(db: &Database, id: &str) -> Result<Option<Profile>, DeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let profile = stmt
                .query_row(params![id], rows::profile_from_row)
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(profile)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All profiles, ordered by display name.
pub async fn list_profiles(db: &Database) -> Result<Vec<Profile>, DeskError> {
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY full_name ASC");
            let mut stmt = conn.prepare(&sql)?;
            let mut profiles = Vec::new();
            let rows = stmt.query_map([], rows::profile_from_row)?;
            for row in rows {
                profiles.push(row?);
            }
            Ok(profiles)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
