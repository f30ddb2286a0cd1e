use serde::{Deserialize, Serialize};

/// Staff roles, from data entry up to administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    AssetManager,
    Principal,
    Storekeeper,
    DataEntry,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::AssetManager => "asset_manager",
            Role::Principal => "principal",
            Role::Storekeeper => "storekeeper",
            Role::DataEntry => "data_entry",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "asset_manager" => Some(Role::AssetManager),
            "principal" => Some(Role::Principal),
            "storekeeper" => Some(Role::Storekeeper),
            "data_entry" => Some(Role::DataEntry),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// Functional areas a user may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessArea {
    Asset,
    Faculty,
}

impl AccessArea {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asset" => Some(AccessArea::Asset),
            "faculty" => Some(AccessArea::Faculty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadAssets,
    SubmitPurchase,
    RequestMovement,
    AcknowledgeIssue,
    ApproveAssets,
    CompleteService,
    ReadFaculty,
    EditFaculty,
    ApproveFaculty,
    ManageUsers,
}

const APPROVERS: &[Role] = &[Role::Admin, Role::AssetManager, Role::Principal];
const ALL_ROLES: &[Role] = &[
    Role::Admin,
    Role::AssetManager,
    Role::Principal,
    Role::Storekeeper,
    Role::DataEntry,
    Role::Viewer,
];

impl Permission {
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Permission::ReadAssets | Permission::AcknowledgeIssue | Permission::ReadFaculty => ALL_ROLES,
            Permission::SubmitPurchase | Permission::RequestMovement => {
                &[Role::Admin, Role::Storekeeper, Role::DataEntry]
            }
            Permission::ApproveAssets => APPROVERS,
            Permission::CompleteService => &[Role::Admin, Role::AssetManager, Role::Storekeeper],
            Permission::EditFaculty => &[Role::Admin, Role::DataEntry],
            Permission::ApproveFaculty => &[Role::Admin, Role::Principal],
            Permission::ManageUsers => &[Role::Admin],
        }
    }

    pub fn area(&self) -> Option<AccessArea> {
        match self {
            Permission::ReadAssets
            | Permission::SubmitPurchase
            | Permission::RequestMovement
            | Permission::AcknowledgeIssue
            | Permission::ApproveAssets
            | Permission::CompleteService => Some(AccessArea::Asset),
            Permission::ReadFaculty | Permission::EditFaculty | Permission::ApproveFaculty => {
                Some(AccessArea::Faculty)
            }
            Permission::ManageUsers => None,
        }
    }
}

/// Admins hold every area; everyone else needs the role and the area grant.
pub fn permits(role: Role, access: &[AccessArea], permission: Permission) -> bool {
    if !permission.roles().contains(&role) {
        return false;
    }
    if role == Role::Admin {
        return true;
    }
    match permission.area() {
        Some(area) => access.contains(&area),
        None => true,
    }
}
