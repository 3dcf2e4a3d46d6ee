#![forbid(unsafe_code)]

use super::*;
use ns_core::ids::OwnerId;
use ns_core::ordering::SortOrder;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Returns the owner's settings, falling back to defaults when the owner
    /// has never stored any.
    pub fn settings_get(&self, owner: &OwnerId) -> Result<OwnerSettingsRow, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT default_sort_order, max_concurrent_imports, updated_at_ms \
                 FROM settings WHERE owner=?1",
                params![owner.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((order, max_concurrent, updated_at_ms)) = row else {
            return Ok(OwnerSettingsRow::default());
        };

        Ok(OwnerSettingsRow {
            default_sort_order: SortOrder::parse(&order).unwrap_or(SortOrder::Ascending),
            max_concurrent_imports: clamp_concurrency(max_concurrent),
            updated_at_ms,
        })
    }

    pub fn settings_update(
        &mut self,
        owner: &OwnerId,
        request: SettingsUpdateRequest,
    ) -> Result<OwnerSettingsRow, StoreError> {
        let current = self.settings_get(owner)?;
        let merged = OwnerSettingsRow {
            default_sort_order: request
                .default_sort_order
                .unwrap_or(current.default_sort_order),
            max_concurrent_imports: request
                .max_concurrent_imports
                .map(|value| i64::from(value))
                .map(clamp_concurrency)
                .unwrap_or(current.max_concurrent_imports),
            updated_at_ms: now_ms(),
        };

        let tx = self.conn.transaction()?;
        ensure_owner_tx(&tx, owner, merged.updated_at_ms)?;
        tx.execute(
            r#"
            INSERT INTO settings(owner, default_sort_order, max_concurrent_imports, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(owner) DO UPDATE SET
              default_sort_order=excluded.default_sort_order,
              max_concurrent_imports=excluded.max_concurrent_imports,
              updated_at_ms=excluded.updated_at_ms
            "#,
            params![
                owner.as_str(),
                merged.default_sort_order.as_str(),
                i64::from(merged.max_concurrent_imports),
                merged.updated_at_ms,
            ],
        )?;
        tx.commit()?;
        Ok(merged)
    }
}

fn clamp_concurrency(value: i64) -> u32 {
    let clamped = value.clamp(
        i64::from(MIN_CONCURRENT_IMPORTS),
        i64::from(MAX_CONCURRENT_IMPORTS),
    );
    clamped as u32
}
