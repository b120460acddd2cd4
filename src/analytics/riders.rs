use super::percentage;
use crate::db::DatabaseManager;
use crate::error::Result;
use crate::storage::rows::{self, fetch_one};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiderShare {
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderStatistics {
    pub total_riders: i64,
    pub active_riders: RiderShare,
    pub inactive_riders: RiderShare,
    /// Riders created within the configured recent window.
    pub recent_registrations: i64,
}

impl RiderStatistics {
    pub fn from_counts(total: i64, active: i64, inactive: i64, recent: i64) -> Self {
        let share = |count: i64| RiderShare {
            count,
            percentage: percentage(count as f64, total as f64),
        };
        Self {
            total_riders: total,
            active_riders: share(active),
            inactive_riders: share(inactive),
            recent_registrations: recent,
        }
    }
}

pub async fn rider_statistics(db: &DatabaseManager, recent_days: u32) -> Result<RiderStatistics> {
    let stats = fetch_one(
        db.connection(),
        "SELECT COUNT(*), \
                COUNT(CASE WHEN is_active = 1 THEN 1 END), \
                COUNT(CASE WHEN is_active = 0 THEN 1 END), \
                COUNT(CASE WHEN julianday(created_at) >= julianday('now', ?1) THEN 1 END) \
         FROM justoo_riders",
        libsql::params![format!("-{recent_days} days")],
        |row| {
            Ok(RiderStatistics::from_counts(
                rows::int_or_zero(row, 0, "total")?,
                rows::int_or_zero(row, 1, "active")?,
                rows::int_or_zero(row, 2, "inactive")?,
                rows::int_or_zero(row, 3, "recent")?,
            ))
        },
    )
    .await?;

    Ok(stats.unwrap_or_else(|| RiderStatistics::from_counts(0, 0, 0, 0)))
}
