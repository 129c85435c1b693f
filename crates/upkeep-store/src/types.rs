use serde::{Deserialize, Serialize};
use std::fmt;
use upkeep_core::MachineStatus;
use upkeep_predict::MaintenanceInput;

/// Match `s` against the labels of `all`, ignoring case and treating `-`/`_`
/// as spaces, so `in-progress` finds `In Progress`.
fn parse_label<T: Copy>(all: &[T], label: fn(&T) -> &'static str, s: &str) -> Option<T> {
    let wanted = s.trim().replace(['-', '_'], " ").to_ascii_lowercase();
    all.iter()
        .copied()
        .find(|v| label(v).to_ascii_lowercase() == wanted)
}

macro_rules! display_via_label {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    parse_label(&Self::ALL, Self::as_str, s).ok_or_else(|| {
                        let allowed: Vec<_> = Self::ALL.iter().map(Self::as_str).collect();
                        format!("unknown value {:?} (expected one of: {})", s, allowed.join(", "))
                    })
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

/// A persisted machine record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// UUIDv7 string, primary key.
    pub id: String,
    pub name: String,
    pub machine_type: String,
    pub location: String,
    /// `YYYY-MM-DD`.
    pub installation_date: String,
    /// Nominal days between services (1–365).
    pub frequency_days: i64,
    /// `YYYY-MM-DD` of the most recent logged service, if any.
    pub last_maintenance_date: Option<String>,
    /// Set by users only; predictions never write here.
    pub status: MachineStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Machine {
    /// The scheduling/prediction view of this machine.
    pub fn maintenance_input(&self) -> upkeep_predict::Result<MaintenanceInput> {
        MaintenanceInput::parse(
            &self.installation_date,
            self.frequency_days,
            self.last_maintenance_date.as_deref(),
        )
    }
}

/// Fields supplied when registering a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMachine {
    pub name: String,
    pub machine_type: String,
    pub location: String,
    pub installation_date: String,
    pub frequency_days: i64,
}

/// Partial edit of a machine; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineUpdate {
    pub name: Option<String>,
    pub machine_type: Option<String>,
    pub location: Option<String>,
    pub installation_date: Option<String>,
    pub frequency_days: Option<i64>,
    pub status: Option<MachineStatus>,
}

/// One logged service on a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub machine_id: String,
    /// `YYYY-MM-DD`.
    pub maintenance_date: String,
    pub description: String,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD HH:MM:SS`.
    pub start_date: String,
    /// `YYYY-MM-DD HH:MM:SS`, never before `start_date`.
    pub end_date: String,
    pub description: Option<String>,
    /// Free text ("maintenance", "audit", ...).
    pub event_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub description: Option<String>,
    pub event_type: String,
}

// ---------------------------------------------------------------------------
// Inspections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InspectionResult {
    Pass,
    Fail,
    #[default]
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl InspectionResult {
    pub const ALL: [InspectionResult; 3] = [
        InspectionResult::Pass,
        InspectionResult::Fail,
        InspectionResult::NeedsAttention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionResult::Pass => "Pass",
            InspectionResult::Fail => "Fail",
            InspectionResult::NeedsAttention => "Needs Attention",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: String,
    pub machine_id: String,
    /// Joined from `machines`; None if the machine row is gone.
    pub machine_name: Option<String>,
    /// `YYYY-MM-DD`.
    pub inspection_date: String,
    pub inspector: String,
    pub result: InspectionResult,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInspection {
    pub machine_id: String,
    pub inspection_date: String,
    pub inspector: String,
    pub result: InspectionResult,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResourceKind {
    #[default]
    Equipment,
    Tool,
    Vehicle,
    Other,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Equipment,
        ResourceKind::Tool,
        ResourceKind::Vehicle,
        ResourceKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Equipment => "Equipment",
            ResourceKind::Tool => "Tool",
            ResourceKind::Vehicle => "Vehicle",
            ResourceKind::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResourceStatus {
    #[default]
    Available,
    #[serde(rename = "In Use")]
    InUse,
    Maintenance,
    #[serde(rename = "Out of Service")]
    OutOfService,
}

impl ResourceStatus {
    pub const ALL: [ResourceStatus; 4] = [
        ResourceStatus::Available,
        ResourceStatus::InUse,
        ResourceStatus::Maintenance,
        ResourceStatus::OutOfService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "Available",
            ResourceStatus::InUse => "In Use",
            ResourceStatus::Maintenance => "Maintenance",
            ResourceStatus::OutOfService => "Out of Service",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub kind: ResourceKind,
    pub status: ResourceStatus,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub kind: ResourceKind,
    pub status: ResourceStatus,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUpdate {
    pub name: Option<String>,
    pub kind: Option<ResourceKind>,
    pub status: Option<ResourceStatus>,
    pub location: Option<String>,
}

// ---------------------------------------------------------------------------
// Work orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WorkOrderStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 4] = [
        WorkOrderStatus::Open,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::Completed,
        WorkOrderStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "Open",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::OnHold => "On Hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkOrderStatus,
    pub priority: Priority,
    /// User id of the assignee; None means unassigned.
    pub assigned_to: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkOrder {
    pub title: String,
    pub description: Option<String>,
    pub status: WorkOrderStatus,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
}

/// Partial edit of a work order. The nested options on `assigned_to` and
/// `due_date` distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<Option<String>>,
    pub due_date: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub item_name: String,
    pub quantity: i64,
    /// Unit of measure ("pcs", "litres", ...).
    pub unit: String,
    /// Stock at or below this level needs reordering.
    pub reorder_level: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl InventoryItem {
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub item_name: String,
    pub quantity: i64,
    pub unit: String,
    pub reorder_level: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub reorder_level: Option<i64>,
}

display_via_label!(
    InspectionResult,
    ResourceKind,
    ResourceStatus,
    WorkOrderStatus,
    Priority,
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_parse_loosely() {
        assert_eq!(
            WorkOrderStatus::from_str("in-progress").unwrap(),
            WorkOrderStatus::InProgress
        );
        assert_eq!(
            ResourceStatus::from_str("OUT_OF_SERVICE").unwrap(),
            ResourceStatus::OutOfService
        );
        assert_eq!(
            InspectionResult::from_str("Needs Attention").unwrap(),
            InspectionResult::NeedsAttention
        );
        assert_eq!(Priority::from_str(" high ").unwrap(), Priority::High);
    }

    #[test]
    fn unknown_label_lists_choices() {
        let err = Priority::from_str("urgent").unwrap_err();
        assert!(err.contains("Low, Medium, High, Critical"), "{err}");
    }

    #[test]
    fn display_matches_stored_label() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(WorkOrderStatus::OnHold.to_string(), "On Hold");
    }

    #[test]
    fn reorder_threshold_is_inclusive() {
        let mut item = InventoryItem {
            id: "i".into(),
            item_name: "Bearing".into(),
            quantity: 4,
            unit: "pcs".into(),
            reorder_level: 4,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert!(item.needs_reorder());
        item.quantity = 5;
        assert!(!item.needs_reorder());
    }
}
