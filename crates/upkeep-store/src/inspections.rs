use rusqlite::{params, OptionalExtension};
use tracing::info;
use upkeep_core::types::new_record_id;
use upkeep_predict::format_date;

use crate::error::Result;
use crate::store::{now_rfc3339, optional_text, require_date, require_text, RecordStore};
use crate::types::{Inspection, InspectionResult, NewInspection};

const INSPECTION_SELECT: &str = "SELECT i.id, i.machine_id, m.name, i.inspection_date, i.inspector,
            i.result, i.notes, i.created_at
     FROM inspections i
     LEFT JOIN machines m ON m.id = i.machine_id";

fn row_to_inspection(row: &rusqlite::Row<'_>) -> rusqlite::Result<Inspection> {
    use std::str::FromStr;
    let result = InspectionResult::from_str(&row.get::<_, String>(5)?).unwrap_or_default();
    Ok(Inspection {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        machine_name: row.get(2)?,
        inspection_date: row.get(3)?,
        inspector: row.get(4)?,
        result,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl RecordStore {
    /// Record an inspection of an existing machine.
    pub fn add_inspection(&self, new: &NewInspection) -> Result<Inspection> {
        let machine = self.require_machine(&new.machine_id)?;
        let date = require_date("inspection_date", &new.inspection_date)?;

        let inspection = Inspection {
            id: new_record_id(),
            machine_id: machine.id,
            machine_name: Some(machine.name),
            inspection_date: format_date(date),
            inspector: require_text("inspector", &new.inspector)?,
            result: new.result,
            notes: optional_text(new.notes.as_deref()),
            created_at: now_rfc3339(),
        };
        self.conn.execute(
            "INSERT INTO inspections (id, machine_id, inspection_date, inspector, result, notes, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                inspection.id,
                inspection.machine_id,
                inspection.inspection_date,
                inspection.inspector,
                inspection.result.as_str(),
                inspection.notes,
                inspection.created_at
            ],
        )?;
        info!(
            inspection_id = %inspection.id,
            machine_id = %inspection.machine_id,
            result = %inspection.result,
            "inspection recorded"
        );
        Ok(inspection)
    }

    /// Inspections newest first, optionally for a single machine.
    pub fn list_inspections(&self, machine_id: Option<&str>) -> Result<Vec<Inspection>> {
        let order = "ORDER BY i.inspection_date DESC, i.created_at DESC";
        let inspections = match machine_id {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{INSPECTION_SELECT} WHERE i.machine_id = ?1 {order}"))?;
                let rows = stmt
                    .query_map([id], row_to_inspection)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{INSPECTION_SELECT} {order}"))?;
                let rows = stmt
                    .query_map([], row_to_inspection)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(inspections)
    }

    pub fn get_inspection(&self, id: &str) -> Result<Option<Inspection>> {
        let inspection = self
            .conn
            .query_row(
                &format!("{INSPECTION_SELECT} WHERE i.id = ?1"),
                [id],
                row_to_inspection,
            )
            .optional()?;
        Ok(inspection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::types::NewMachine;
    use rusqlite::Connection;

    fn store_with_machine() -> (RecordStore, String) {
        let store = RecordStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let m = store
            .add_machine(&NewMachine {
                name: "Conveyor".into(),
                machine_type: "Type B".into(),
                location: "Dock".into(),
                installation_date: "2022-05-01".into(),
                frequency_days: 60,
            })
            .unwrap();
        (store, m.id)
    }

    fn inspection(machine_id: &str, date: &str, result: InspectionResult) -> NewInspection {
        NewInspection {
            machine_id: machine_id.into(),
            inspection_date: date.into(),
            inspector: "Sam".into(),
            result,
            notes: Some("belt tension ok".into()),
        }
    }

    #[test]
    fn inspection_carries_machine_name() {
        let (store, machine_id) = store_with_machine();
        let added = store
            .add_inspection(&inspection(&machine_id, "2023-04-02", InspectionResult::Pass))
            .unwrap();
        let loaded = store.get_inspection(&added.id).unwrap().unwrap();
        assert_eq!(loaded.machine_name.as_deref(), Some("Conveyor"));
        assert_eq!(loaded, added);
    }

    #[test]
    fn unknown_machine_is_rejected() {
        let (store, _) = store_with_machine();
        let err = store
            .add_inspection(&inspection("ghost", "2023-04-02", InspectionResult::Fail))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "machine", .. }));
    }

    #[test]
    fn list_filters_by_machine_newest_first() {
        let (store, machine_id) = store_with_machine();
        let other = store
            .add_machine(&NewMachine {
                name: "Boiler".into(),
                machine_type: "Type C".into(),
                location: "Basement".into(),
                installation_date: "2021-01-01".into(),
                frequency_days: 90,
            })
            .unwrap();

        store
            .add_inspection(&inspection(&machine_id, "2023-01-10", InspectionResult::Pass))
            .unwrap();
        store
            .add_inspection(&inspection(&machine_id, "2023-03-10", InspectionResult::NeedsAttention))
            .unwrap();
        store
            .add_inspection(&inspection(&other.id, "2023-02-10", InspectionResult::Fail))
            .unwrap();

        let all = store.list_inspections(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].inspection_date, "2023-03-10");

        let one = store.list_inspections(Some(&machine_id)).unwrap();
        let results: Vec<_> = one.iter().map(|i| i.result).collect();
        assert_eq!(
            results,
            vec![InspectionResult::NeedsAttention, InspectionResult::Pass]
        );
    }
}
