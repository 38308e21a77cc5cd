//! Flattening of validated documents into records

use appdash_core::records::{ApplicationRecord, UNKNOWN};

use crate::schema::{ApplicationEntry, InstanceDocument};

impl ApplicationEntry {
    pub fn resolve_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn resolve_type(&self) -> String {
        self.app_type.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn resolve_status(&self) -> String {
        self.status.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn resolve_image(&self) -> String {
        self.image.clone().unwrap_or_default()
    }

    pub fn resolve_process_name(&self) -> String {
        self.process_name.clone().unwrap_or_default()
    }

    pub fn resolve_container_id(&self) -> String {
        self.container_id.clone().unwrap_or_default()
    }

    pub fn resolve_ports(&self) -> String {
        join_list(&self.ports)
    }

    pub fn resolve_pids(&self) -> String {
        join_list(&self.pids)
    }
}

impl InstanceDocument {
    pub fn resolve_script_version(&self) -> String {
        self.script_version.clone().unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// `[80, 443]` renders as `"80, 443"`, an empty list as `""`
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// One record per application, in document order
pub fn extract(document: &InstanceDocument) -> Vec<ApplicationRecord> {
    let script_version = document.resolve_script_version();

    document
        .applications
        .iter()
        .map(|entry| ApplicationRecord {
            instance_id: document.instance_id.clone(),
            instance_name: document.instance_name.clone(),
            script_version: script_version.clone(),
            app_name: entry.resolve_name(),
            app_type: entry.resolve_type(),
            app_status: entry.resolve_status(),
            app_image: entry.resolve_image(),
            ports: entry.resolve_ports(),
            pids: entry.resolve_pids(),
            process_name: entry.resolve_process_name(),
            container_id: entry.resolve_container_id(),
        })
        .collect()
}
