use std::fmt;

use crate::OperationName;

/// Cache key (and event name) of one logical data domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainKey {
    ImageData,
    ImageSettings,
    PasswordSettings,
    CategoryData,
    TaskData,
    UserData,
    PermissionSettings,
    LogData,
    ServerData,
}

impl DomainKey {
    pub fn as_str(self) -> &'static str {
        match self {
            DomainKey::ImageData => "image_data",
            DomainKey::ImageSettings => "image_settings",
            DomainKey::PasswordSettings => "password_settings",
            DomainKey::CategoryData => "category_data",
            DomainKey::TaskData => "task_data",
            DomainKey::UserData => "user_data",
            DomainKey::PermissionSettings => "permission_settings",
            DomainKey::LogData => "log_data",
            DomainKey::ServerData => "server_data",
        }
    }

    /// Matches a response's top-level key against the domain table.
    pub fn from_response_key(key: &str) -> Option<Self> {
        DOMAINS
            .iter()
            .map(|entry| entry.key)
            .find(|domain| domain.as_str() == key)
    }

    pub fn entry(self) -> &'static DomainEntry {
        // Variant order mirrors the row order of DOMAINS.
        &DOMAINS[self as usize]
    }
}

impl AsRef<str> for DomainKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DomainEntry {
    pub key: DomainKey,
    pub description: &'static str,
    pub triggering_names: &'static [OperationName],
}

impl DomainEntry {
    pub fn is_triggered_by(&self, operation: OperationName) -> bool {
        self.triggering_names.contains(&operation)
    }
}

/// Static binding of operations to the domains they refresh. Order matters:
/// the first row naming an operation owns its pending-status entry.
pub static DOMAINS: [DomainEntry; 9] = [
    DomainEntry {
        key: DomainKey::ImageData,
        description: "API image data",
        triggering_names: &[
            OperationName::ImageData,
            OperationName::ImageEdit,
            OperationName::ImageDelete,
        ],
    },
    DomainEntry {
        key: DomainKey::ImageSettings,
        description: "API image settings",
        triggering_names: &[
            OperationName::ImageDisplay,
            OperationName::SettingsGetImage,
            OperationName::SettingsSetImage,
        ],
    },
    DomainEntry {
        key: DomainKey::PasswordSettings,
        description: "API password settings",
        triggering_names: &[
            OperationName::SettingsGetPassword,
            OperationName::SettingsSetPassword,
        ],
    },
    DomainEntry {
        key: DomainKey::CategoryData,
        description: "API category data",
        triggering_names: &[
            OperationName::SettingsGetCategory,
            OperationName::SettingsSetCategory,
        ],
    },
    DomainEntry {
        key: DomainKey::TaskData,
        description: "API task settings",
        triggering_names: &[
            OperationName::MaintenanceGetTask,
            OperationName::MaintenanceSetTask,
        ],
    },
    DomainEntry {
        key: DomainKey::UserData,
        description: "API user data",
        triggering_names: &[
            OperationName::SettingsGetUser,
            OperationName::SettingsSetUser,
            OperationName::SettingsDeleteUser,
        ],
    },
    DomainEntry {
        key: DomainKey::PermissionSettings,
        description: "API permission settings",
        triggering_names: &[OperationName::SettingsGetPermission],
    },
    DomainEntry {
        key: DomainKey::LogData,
        description: "API log data",
        triggering_names: &[OperationName::MaintenanceGetLogs],
    },
    DomainEntry {
        key: DomainKey::ServerData,
        description: "API server data",
        triggering_names: &[OperationName::MaintenanceGetInfo],
    },
];

/// First domain whose triggering set contains `operation`.
pub fn domain_for(operation: OperationName) -> Option<&'static DomainEntry> {
    DOMAINS.iter().find(|entry| entry.is_triggered_by(operation))
}
