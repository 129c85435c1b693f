use rusqlite::params;
use tracing::info;
use upkeep_core::types::new_record_id;

use crate::error::{Result, StoreError};
use crate::store::{now_rfc3339, require_text, RecordStore};
use crate::types::{NewResource, Resource, ResourceKind, ResourceStatus, ResourceUpdate};

const RESOURCE_COLUMNS: &str = "id, name, type, status, location, created_at, updated_at";

fn row_to_resource(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resource> {
    use std::str::FromStr;
    Ok(Resource {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: ResourceKind::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        status: ResourceStatus::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        location: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl RecordStore {
    pub fn add_resource(&self, new: &NewResource) -> Result<Resource> {
        let now = now_rfc3339();
        let resource = Resource {
            id: new_record_id(),
            name: require_text("name", &new.name)?,
            kind: new.kind,
            status: new.status,
            location: require_text("location", &new.location)?,
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO resources (id, name, type, status, location, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?6)",
            params![
                resource.id,
                resource.name,
                resource.kind.as_str(),
                resource.status.as_str(),
                resource.location,
                resource.created_at
            ],
        )?;
        info!(resource_id = %resource.id, kind = %resource.kind, "resource added");
        Ok(resource)
    }

    /// All resources ordered by name.
    pub fn list_resources(&self) -> Result<Vec<Resource>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY name COLLATE NOCASE, id"
        ))?;
        let resources = stmt
            .query_map([], row_to_resource)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(resources)
    }

    /// Apply an edit. Fields left as `None` keep their stored value.
    pub fn update_resource(&self, id: &str, update: &ResourceUpdate) -> Result<Resource> {
        let mut resource = match self.conn.query_row(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1"),
            [id],
            row_to_resource,
        ) {
            Ok(r) => r,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StoreError::not_found("resource", id))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(name) = &update.name {
            resource.name = require_text("name", name)?;
        }
        if let Some(kind) = update.kind {
            resource.kind = kind;
        }
        if let Some(status) = update.status {
            resource.status = status;
        }
        if let Some(location) = &update.location {
            resource.location = require_text("location", location)?;
        }
        resource.updated_at = now_rfc3339();

        self.conn.execute(
            "UPDATE resources SET name=?2, type=?3, status=?4, location=?5, updated_at=?6
             WHERE id=?1",
            params![
                resource.id,
                resource.name,
                resource.kind.as_str(),
                resource.status.as_str(),
                resource.location,
                resource.updated_at
            ],
        )?;
        info!(resource_id = %resource.id, status = %resource.status, "resource updated");
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn store() -> RecordStore {
        RecordStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn add_list_update() {
        let store = store();
        let forklift = store
            .add_resource(&NewResource {
                name: "Forklift".into(),
                kind: ResourceKind::Vehicle,
                status: ResourceStatus::Available,
                location: "Yard".into(),
            })
            .unwrap();
        store
            .add_resource(&NewResource {
                name: "Drill".into(),
                kind: ResourceKind::Tool,
                status: ResourceStatus::InUse,
                location: "Workshop".into(),
            })
            .unwrap();

        let names: Vec<_> = store
            .list_resources()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Drill", "Forklift"]);

        let updated = store
            .update_resource(
                &forklift.id,
                &ResourceUpdate {
                    status: Some(ResourceStatus::OutOfService),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, ResourceStatus::OutOfService);
        assert_eq!(updated.kind, ResourceKind::Vehicle);
        assert_eq!(updated.location, "Yard");
    }

    #[test]
    fn update_missing_resource_is_not_found() {
        let store = store();
        let err = store
            .update_resource("nope", &ResourceUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "resource", .. }));
    }

    #[test]
    fn blank_name_is_rejected() {
        let store = store();
        let err = store
            .add_resource(&NewResource {
                name: " ".into(),
                kind: ResourceKind::Other,
                status: ResourceStatus::Available,
                location: "Yard".into(),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "name", .. }));
    }
}
