use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use upkeep_core::MachineStatus;
use upkeep_predict::format_date;

use crate::error::Result;
use crate::store::RecordStore;
use crate::types::InventoryItem;

/// Machine counts shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineStats {
    pub total: i64,
    pub healthy: i64,
    pub warning: i64,
    pub critical: i64,
    /// Machines not marked Healthy.
    pub in_alert: i64,
}

/// One row of the "upcoming maintenance" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingMaintenance {
    pub machine_id: String,
    pub name: String,
    /// `YYYY-MM-DD`.
    pub next_maintenance_date: String,
    /// Negative when the service is overdue.
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub machines: MachineStats,
    pub upcoming: Vec<UpcomingMaintenance>,
    pub low_stock: Vec<InventoryItem>,
    pub open_work_orders: i64,
}

impl RecordStore {
    pub fn machine_stats(&self) -> Result<MachineStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM machines GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stats = MachineStats::default();
        for (status, count) in rows {
            stats.total += count;
            match status.parse::<MachineStatus>() {
                Ok(MachineStatus::Healthy) => stats.healthy += count,
                Ok(MachineStatus::Warning) => stats.warning += count,
                Ok(MachineStatus::Critical) => stats.critical += count,
                Err(_) => warn!(status = %status, count, "machine rows with unknown status"),
            }
        }
        stats.in_alert = stats.total - stats.healthy;
        Ok(stats)
    }

    /// The `limit` machines due soonest as of `today`, overdue ones first.
    pub fn upcoming_maintenance(
        &self,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<UpcomingMaintenance>> {
        let mut upcoming = Vec::new();
        for machine in self.list_machines()? {
            let input = match machine.maintenance_input() {
                Ok(input) => input,
                Err(e) => {
                    warn!(machine_id = %machine.id, error = %e, "skipping machine with unparsable dates");
                    continue;
                }
            };
            let next = input.next_maintenance_date();
            upcoming.push(UpcomingMaintenance {
                machine_id: machine.id,
                name: machine.name,
                next_maintenance_date: format_date(next),
                days_until: (next - today).num_days(),
            });
        }
        upcoming.sort_by(|a, b| {
            a.days_until
                .cmp(&b.days_until)
                .then_with(|| a.name.cmp(&b.name))
        });
        upcoming.truncate(limit);
        debug!(count = upcoming.len(), "upcoming maintenance computed");
        Ok(upcoming)
    }

    /// Everything the dashboard screen shows in one pass.
    pub fn dashboard(&self, today: NaiveDate, upcoming_limit: usize) -> Result<DashboardSummary> {
        Ok(DashboardSummary {
            machines: self.machine_stats()?,
            upcoming: self.upcoming_maintenance(today, upcoming_limit)?,
            low_stock: self.low_stock()?,
            open_work_orders: self.open_work_order_count()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewInventoryItem, NewMachine};
    use rusqlite::{params, Connection};

    fn store() -> RecordStore {
        RecordStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn machine(store: &RecordStore, name: &str, installed: &str, freq: i64) -> String {
        store
            .add_machine(&NewMachine {
                name: name.into(),
                machine_type: "Type A".into(),
                location: "Hall".into(),
                installation_date: installed.into(),
                frequency_days: freq,
            })
            .unwrap()
            .id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stats_count_statuses() {
        let store = store();
        machine(&store, "A", "2023-01-01", 30);
        let b = machine(&store, "B", "2023-01-01", 30);
        let c = machine(&store, "C", "2023-01-01", 30);
        store.update_machine_status(&b, MachineStatus::Warning).unwrap();
        store.update_machine_status(&c, MachineStatus::Critical).unwrap();

        let stats = store.machine_stats().unwrap();
        assert_eq!(
            stats,
            MachineStats {
                total: 3,
                healthy: 1,
                warning: 1,
                critical: 1,
                in_alert: 2,
            }
        );
    }

    #[test]
    fn empty_store_has_zero_stats() {
        assert_eq!(store().machine_stats().unwrap(), MachineStats::default());
    }

    #[test]
    fn upcoming_is_sorted_and_limited() {
        let store = store();
        machine(&store, "Late", "2023-01-01", 90); // due 2023-04-01
        machine(&store, "Soon", "2023-01-01", 30); // due 2023-01-31
        let serviced = machine(&store, "Serviced", "2023-01-01", 30);
        store
            .log_maintenance(&serviced, "2023-02-01", "grease")
            .unwrap(); // due 2023-03-03

        let today = date(2023, 2, 10);
        let all = store.upcoming_maintenance(today, 10).unwrap();
        let names: Vec<_> = all.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Soon", "Serviced", "Late"]);
        assert_eq!(all[0].days_until, -10);
        assert_eq!(all[1].next_maintenance_date, "2023-03-03");

        assert_eq!(store.upcoming_maintenance(today, 1).unwrap().len(), 1);
    }

    #[test]
    fn unparsable_rows_are_skipped() {
        let store = store();
        machine(&store, "Good", "2023-01-01", 30);
        let bad = machine(&store, "Bad", "2023-01-01", 30);
        store
            .conn
            .execute(
                "UPDATE machines SET installation_date = 'garbage' WHERE id = ?1",
                params![bad],
            )
            .unwrap();

        let upcoming = store.upcoming_maintenance(date(2023, 1, 1), 5).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].name, "Good");
    }

    #[test]
    fn summary_collects_every_panel() {
        let store = store();
        machine(&store, "Press", "2023-01-01", 30);
        store
            .add_item(&NewInventoryItem {
                item_name: "Fuse".into(),
                quantity: 1,
                unit: "pcs".into(),
                reorder_level: 3,
            })
            .unwrap();

        let summary = store.dashboard(date(2023, 1, 15), 5).unwrap();
        assert_eq!(summary.machines.total, 1);
        assert_eq!(summary.upcoming.len(), 1);
        assert_eq!(summary.upcoming[0].days_until, 16);
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.open_work_orders, 0);
    }
}
