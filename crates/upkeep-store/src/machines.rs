use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, instrument};
use upkeep_core::types::new_record_id;
use upkeep_core::MachineStatus;
use upkeep_predict::format_date;

use crate::error::{Result, StoreError};
use crate::store::{now_rfc3339, require_date, require_text, stored_label, RecordStore};
use crate::types::{Machine, MachineUpdate, MaintenanceRecord, NewMachine};

/// Shortest accepted service interval, in days.
pub const MIN_FREQUENCY_DAYS: i64 = 1;
/// Longest accepted service interval, in days.
pub const MAX_FREQUENCY_DAYS: i64 = 365;

const MACHINE_COLUMNS: &str = "id, name, type, location, installation_date, maintenance_frequency,
     last_maintenance_date, status, created_at, updated_at";

fn row_to_machine(row: &rusqlite::Row<'_>) -> rusqlite::Result<Machine> {
    let id: String = row.get(0)?;
    let status = stored_label("machines", "status", &id, &row.get::<_, String>(7)?);
    Ok(Machine {
        id,
        name: row.get(1)?,
        machine_type: row.get(2)?,
        location: row.get(3)?,
        installation_date: row.get(4)?,
        frequency_days: row.get(5)?,
        last_maintenance_date: row.get(6)?,
        status,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MaintenanceRecord> {
    Ok(MaintenanceRecord {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        maintenance_date: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn check_frequency(frequency_days: i64) -> Result<i64> {
    if (MIN_FREQUENCY_DAYS..=MAX_FREQUENCY_DAYS).contains(&frequency_days) {
        Ok(frequency_days)
    } else {
        Err(StoreError::invalid(
            "frequency_days",
            format!(
                "{frequency_days} is outside {MIN_FREQUENCY_DAYS}..={MAX_FREQUENCY_DAYS}"
            ),
        ))
    }
}

impl RecordStore {
    /// Register a machine. New machines start `Healthy` and unserviced.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn add_machine(&self, new: &NewMachine) -> Result<Machine> {
        let installed = require_date("installation_date", &new.installation_date)?;
        let now = now_rfc3339();
        let machine = Machine {
            id: new_record_id(),
            name: require_text("name", &new.name)?,
            machine_type: require_text("machine_type", &new.machine_type)?,
            location: require_text("location", &new.location)?,
            installation_date: format_date(installed),
            frequency_days: check_frequency(new.frequency_days)?,
            last_maintenance_date: None,
            status: MachineStatus::Healthy,
            created_at: now.clone(),
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO machines
             (id, name, type, location, installation_date, maintenance_frequency,
              last_maintenance_date, status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,NULL,?7,?8,?8)",
            params![
                machine.id,
                machine.name,
                machine.machine_type,
                machine.location,
                machine.installation_date,
                machine.frequency_days,
                machine.status.as_str(),
                machine.created_at,
            ],
        )?;

        info!(machine_id = %machine.id, "machine added");
        Ok(machine)
    }

    /// All machines ordered by name.
    pub fn list_machines(&self) -> Result<Vec<Machine>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MACHINE_COLUMNS} FROM machines ORDER BY name COLLATE NOCASE, id"
        ))?;
        let machines = stmt
            .query_map([], row_to_machine)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = machines.len(), "machines listed");
        Ok(machines)
    }

    /// Load a machine by id. Returns None instead of an error when absent.
    pub fn get_machine(&self, id: &str) -> Result<Option<Machine>> {
        let machine = self
            .conn
            .query_row(
                &format!("SELECT {MACHINE_COLUMNS} FROM machines WHERE id = ?1"),
                [id],
                row_to_machine,
            )
            .optional()?;
        Ok(machine)
    }

    /// Like `get_machine` but a missing row is `NotFound`.
    pub fn require_machine(&self, id: &str) -> Result<Machine> {
        self.get_machine(id)?
            .ok_or_else(|| StoreError::not_found("machine", id))
    }

    /// Apply an edit. Fields left as `None` keep their stored value.
    ///
    /// Moving the installation date past an existing last-service date is
    /// rejected so the reference-date invariant keeps holding.
    #[instrument(skip(self, update))]
    pub fn update_machine(&self, id: &str, update: &MachineUpdate) -> Result<Machine> {
        let mut machine = self.require_machine(id)?;

        if let Some(name) = &update.name {
            machine.name = require_text("name", name)?;
        }
        if let Some(kind) = &update.machine_type {
            machine.machine_type = require_text("machine_type", kind)?;
        }
        if let Some(location) = &update.location {
            machine.location = require_text("location", location)?;
        }
        if let Some(date) = &update.installation_date {
            let installed = require_date("installation_date", date)?;
            if let Some(last) = &machine.last_maintenance_date {
                if require_date("last_maintenance_date", last)? < installed {
                    return Err(StoreError::invalid(
                        "installation_date",
                        format!("{date} is after the last maintenance on {last}"),
                    ));
                }
            }
            machine.installation_date = format_date(installed);
        }
        if let Some(freq) = update.frequency_days {
            machine.frequency_days = check_frequency(freq)?;
        }
        if let Some(status) = update.status {
            machine.status = status;
        }
        machine.updated_at = now_rfc3339();

        self.conn.execute(
            "UPDATE machines SET name=?2, type=?3, location=?4, installation_date=?5,
              maintenance_frequency=?6, status=?7, updated_at=?8
             WHERE id=?1",
            params![
                machine.id,
                machine.name,
                machine.machine_type,
                machine.location,
                machine.installation_date,
                machine.frequency_days,
                machine.status.as_str(),
                machine.updated_at,
            ],
        )?;
        info!(machine_id = %machine.id, "machine updated");
        Ok(machine)
    }

    /// Manually set a machine's health label.
    pub fn update_machine_status(&self, id: &str, status: MachineStatus) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE machines SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), now_rfc3339()],
        )?;
        if n == 0 {
            return Err(StoreError::not_found("machine", id));
        }
        info!(machine_id = %id, %status, "machine status changed");
        Ok(())
    }

    /// Record a service on `date` and advance the machine's last-service
    /// date. Both writes commit together.
    ///
    /// `date` may not precede the installation date. A back-dated entry is
    /// kept in the history but never moves `last_maintenance_date` backwards.
    #[instrument(skip(self, description))]
    pub fn log_maintenance(
        &self,
        machine_id: &str,
        date: &str,
        description: &str,
    ) -> Result<MaintenanceRecord> {
        let description = require_text("description", description)?;
        let serviced = require_date("maintenance_date", date)?;
        let machine = self.require_machine(machine_id)?;

        let installed = require_date("installation_date", &machine.installation_date)?;
        if serviced < installed {
            return Err(StoreError::invalid(
                "maintenance_date",
                format!(
                    "{} precedes installation on {}",
                    format_date(serviced),
                    machine.installation_date
                ),
            ));
        }

        let last = match machine.last_maintenance_date.as_deref() {
            Some(prev) => require_date("last_maintenance_date", prev)?.max(serviced),
            None => serviced,
        };

        let now = now_rfc3339();
        let record = MaintenanceRecord {
            id: new_record_id(),
            machine_id: machine.id.clone(),
            maintenance_date: format_date(serviced),
            description,
            created_at: now.clone(),
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO maintenance_history (id, machine_id, maintenance_date, description, created_at)
             VALUES (?1,?2,?3,?4,?5)",
            params![
                record.id,
                record.machine_id,
                record.maintenance_date,
                record.description,
                record.created_at
            ],
        )?;
        tx.execute(
            "UPDATE machines SET last_maintenance_date = ?2, updated_at = ?3 WHERE id = ?1",
            params![machine.id, format_date(last), now],
        )?;
        tx.commit()?;

        info!(
            machine_id = %machine.id,
            date = %record.maintenance_date,
            "maintenance logged"
        );
        Ok(record)
    }

    /// Service history of one machine, newest first.
    pub fn maintenance_history(&self, machine_id: &str) -> Result<Vec<MaintenanceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, machine_id, maintenance_date, description, created_at
             FROM maintenance_history
             WHERE machine_id = ?1
             ORDER BY maintenance_date DESC, created_at DESC",
        )?;
        let records = stmt
            .query_map([machine_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}
