use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

pub const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");
pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json; charset=UTF-8");

/// Fixed endpoint for chunk uploads. Not part of the operation table.
pub const UPLOAD_PATH: &str = "/api/images/upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every logical operation the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationName {
    ImageData,
    ImageDisplay,
    ImageEdit,
    ImageDelete,
    SettingsGetImage,
    SettingsSetImage,
    SettingsGetPassword,
    SettingsSetPassword,
    SettingsGetCategory,
    SettingsSetCategory,
    MaintenanceGetTask,
    MaintenanceSetTask,
    SettingsGetUser,
    SettingsSetUser,
    SettingsDeleteUser,
    SettingsGetPermission,
    MaintenanceGetLogs,
    MaintenanceGetInfo,
}

impl OperationName {
    pub const ALL: [OperationName; 18] = [
        OperationName::ImageData,
        OperationName::ImageDisplay,
        OperationName::ImageEdit,
        OperationName::ImageDelete,
        OperationName::SettingsGetImage,
        OperationName::SettingsSetImage,
        OperationName::SettingsGetPassword,
        OperationName::SettingsSetPassword,
        OperationName::SettingsGetCategory,
        OperationName::SettingsSetCategory,
        OperationName::MaintenanceGetTask,
        OperationName::MaintenanceSetTask,
        OperationName::SettingsGetUser,
        OperationName::SettingsSetUser,
        OperationName::SettingsDeleteUser,
        OperationName::SettingsGetPermission,
        OperationName::MaintenanceGetLogs,
        OperationName::MaintenanceGetInfo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationName::ImageData => "image_data",
            OperationName::ImageDisplay => "image_display",
            OperationName::ImageEdit => "image_edit",
            OperationName::ImageDelete => "image_delete",
            OperationName::SettingsGetImage => "settings_get_image",
            OperationName::SettingsSetImage => "settings_set_image",
            OperationName::SettingsGetPassword => "settings_get_password",
            OperationName::SettingsSetPassword => "settings_set_password",
            OperationName::SettingsGetCategory => "settings_get_category",
            OperationName::SettingsSetCategory => "settings_set_category",
            OperationName::MaintenanceGetTask => "maintenance_get_task",
            OperationName::MaintenanceSetTask => "maintenance_set_task",
            OperationName::SettingsGetUser => "settings_get_user",
            OperationName::SettingsSetUser => "settings_set_user",
            OperationName::SettingsDeleteUser => "settings_delete_user",
            OperationName::SettingsGetPermission => "settings_get_permission",
            OperationName::MaintenanceGetLogs => "maintenance_get_logs",
            OperationName::MaintenanceGetInfo => "maintenance_get_info",
        }
    }

    /// Method and path template for this operation.
    pub fn route(self) -> (Method, &'static str) {
        match self {
            OperationName::ImageData => (Method::Get, "/api/images/all"),
            OperationName::ImageDisplay => (Method::Post, "/api/images/display"),
            OperationName::ImageEdit => (Method::Post, "/api/images/edit"),
            OperationName::ImageDelete => (Method::Delete, "/api/images/delete"),
            OperationName::SettingsGetImage => (Method::Get, "/api/settings/image"),
            OperationName::SettingsSetImage => (Method::Post, "/api/settings/image"),
            OperationName::SettingsGetPassword => (Method::Get, "/api/settings/password"),
            OperationName::SettingsSetPassword => (Method::Post, "/api/settings/password"),
            OperationName::SettingsGetCategory => (Method::Get, "/api/settings/category"),
            OperationName::SettingsSetCategory => (Method::Post, "/api/settings/category"),
            OperationName::MaintenanceGetTask => (Method::Get, "/api/maintenance/task"),
            OperationName::MaintenanceSetTask => (Method::Post, "/api/maintenance/task"),
            OperationName::SettingsGetUser => (Method::Get, "/api/settings/user"),
            OperationName::SettingsSetUser => (Method::Post, "/api/settings/user"),
            OperationName::SettingsDeleteUser => (Method::Delete, "/api/settings/user"),
            OperationName::SettingsGetPermission => (Method::Get, "/api/settings/permission"),
            OperationName::MaintenanceGetLogs => (Method::Get, "/api/maintenance/logs"),
            OperationName::MaintenanceGetInfo => (Method::Get, "/api/maintenance/info"),
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation {0:?}")]
pub struct UnknownOperation(pub String);

impl FromStr for OperationName {
    type Err = UnknownOperation;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        OperationName::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| UnknownOperation(name.to_string()))
    }
}

/// Wire-level request for one operation. Built per call, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub name: OperationName,
    pub method: Method,
    pub path: &'static str,
    pub body: Option<Value>,
    pub headers: BTreeMap<&'static str, &'static str>,
}

impl OperationDescriptor {
    /// GET requests drop the payload; everything else sends it as JSON
    /// (`null` when absent).
    pub fn new(name: OperationName, payload: Option<Value>) -> Self {
        let (method, path) = name.route();
        let mut headers = BTreeMap::from([ACCEPT_JSON]);
        let body = match method {
            Method::Get => None,
            Method::Post | Method::Delete => {
                headers.insert(CONTENT_TYPE_JSON.0, CONTENT_TYPE_JSON.1);
                Some(payload.unwrap_or(Value::Null))
            }
        };
        Self {
            name,
            method,
            path,
            body,
            headers,
        }
    }
}

/// Looks up `name` in the operation table. Unknown names yield `None`.
pub fn describe(name: &str, payload: Option<Value>) -> Option<OperationDescriptor> {
    name.parse::<OperationName>()
        .ok()
        .map(|op| OperationDescriptor::new(op, payload))
}
