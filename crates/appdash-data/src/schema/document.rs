//! Typed view of a validated inventory document

use serde::{Deserialize, Serialize};

/// One instance report, as uploaded
///
/// Produced only by the validator, so `instance_id` and `instance_name` are
/// non-blank and `applications` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDocument {
    pub instance_id: String,
    pub instance_name: String,
    pub script_version: Option<String>,
    pub applications: Vec<ApplicationEntry>,
}

/// One application inside an instance report
///
/// Optional attributes stay `None` until extraction resolves their defaults.
/// Port and pid elements are kept as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationEntry {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    pub status: Option<String>,
    pub image: Option<String>,
    pub ports: Vec<String>,
    pub pids: Vec<String>,
    pub process_name: Option<String>,
    pub container_id: Option<String>,
}

impl ApplicationEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = Some(app_type.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_ports<I: IntoIterator<Item = u32>>(mut self, ports: I) -> Self {
        self.ports = ports.into_iter().map(|p| p.to_string()).collect();
        self
    }
}
