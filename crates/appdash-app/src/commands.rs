//! One-shot subcommands

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use appdash_core::events::SessionEvent;
use appdash_core::navigation::{resolve, NavigationCommand, View};
use appdash_core::state::AppState;
use appdash_data::{ingest_batch, IngestReport, UploadBatch};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use appdash_views::export::{database_file_name, export_to_path, filtered_file_name, ExportFormat};
use appdash_views::pages::{build_page, PageRequest};
use appdash_views::plots::heatmap::{port_heatmap, ports_by_type};
use appdash_views::stats::{port_usages, top_ports};
use appdash_views::TableQuery;
use clap::Args;

use crate::config::DashboardConfig;
use crate::render::{render_errors, render_heatmap, render_page};

/// Exactly one filter selection
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct FilterArgs {
    /// Application type, e.g. docker
    #[arg(long = "type")]
    pub app_type: Option<String>,

    /// Instance name
    #[arg(long)]
    pub instance: Option<String>,

    /// Application status, e.g. running
    #[arg(long)]
    pub status: Option<String>,
}

impl FilterArgs {
    pub fn command(&self) -> Option<NavigationCommand> {
        if let Some(value) = &self.app_type {
            Some(NavigationCommand::SelectAppType(value.clone()))
        } else if let Some(value) = &self.instance {
            Some(NavigationCommand::SelectInstance(value.clone()))
        } else {
            self.status.clone().map(NavigationCommand::SelectAppStatus)
        }
    }
}

/// A session event and when it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub at: DateTime<Utc>,
    pub event: SessionEvent,
}

/// Session state plus the configuration it was started with
pub struct Session {
    pub state: AppState,
    pub config: DashboardConfig,
    pub request: PageRequest,
    history: Arc<Mutex<Vec<Activity>>>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        let state = AppState::new();
        let history = Arc::new(Mutex::new(Vec::new()));

        let sink = history.clone();
        state.event_bus().subscribe(move |event: &SessionEvent| {
            tracing::debug!("Session activity: {}", event);
            sink.lock().push(Activity {
                at: Utc::now(),
                event: event.clone(),
            });
        });

        Self {
            state,
            config,
            request: PageRequest::default(),
            history,
        }
    }

    /// Everything that happened in this session, oldest first
    pub fn history(&self) -> Vec<Activity> {
        self.history.lock().clone()
    }

    /// Upload a batch, printing the outcome and any per-file errors
    ///
    /// Unreadable paths are reported with the other file errors.
    pub fn load(&mut self, paths: &[PathBuf], out: &mut dyn Write) -> Result<IngestReport> {
        let batch = UploadBatch::collect(paths, &self.config.ingest);
        let result = ingest_batch(&mut self.state, batch, &self.config.ingest);

        if !self.state.errors().is_empty() {
            render_errors(out, self.state.errors())?;
        }
        let report = result?;
        writeln!(
            out,
            "Loaded {} applications from {} of {} file(s) in {:.2}s at {}",
            report.record_count,
            report.accepted_files,
            report.file_count,
            report.elapsed.as_secs_f64(),
            report.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        Ok(report)
    }

    /// Apply a navigation command and print any warning it raised
    pub fn dispatch(&mut self, command: NavigationCommand, out: &mut dyn Write) -> Result<()> {
        if let Some(warning) = self.state.dispatch(command) {
            writeln!(out, "Warning: {}", warning)?;
        }
        Ok(())
    }

    pub fn show(&self, out: &mut dyn Write) -> Result<()> {
        let page = build_page(&self.state, &self.request, &self.config.view);
        render_page(out, &page, &self.config.view)
    }

    /// Export the records of the current view into `dir`
    ///
    /// The filtered view exports its filtered records; every other view
    /// exports the data table rows.
    pub fn export(&self, format: ExportFormat, dir: &Path, out: &mut dyn Write) -> Result<PathBuf> {
        let (records, name) = match self.state.context().current_view {
            View::FilteredView => {
                let filter = self
                    .state
                    .navigation()
                    .active_filter()
                    .filter(|f| f.is_available(self.state.dataset()));
                (
                    resolve(self.state.dataset(), filter),
                    filtered_file_name(filter, format),
                )
            }
            _ => (self.request.query.apply(self.state.dataset()), database_file_name(format)),
        };

        let path = dir.join(name);
        let bytes = export_to_path(&records, format, &self.config.view, &path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        writeln!(out, "Wrote {} records ({} bytes) to {}", records.len(), bytes, path.display())?;
        Ok(path)
    }
}

pub fn summary(session: &mut Session, files: &[PathBuf], out: &mut dyn Write) -> Result<()> {
    session.load(files, out)?;
    session.show(out)
}

pub fn instances(session: &mut Session, files: &[PathBuf], instance: Option<String>, out: &mut dyn Write) -> Result<()> {
    session.load(files, out)?;
    session.request.instance = instance;
    session.dispatch(NavigationCommand::navigate(View::InstanceDetails), out)?;
    session.show(out)
}

pub fn filter(session: &mut Session, files: &[PathBuf], args: &FilterArgs, out: &mut dyn Write) -> Result<()> {
    session.load(files, out)?;
    if let Some(command) = args.command() {
        session.dispatch(command, out)?;
    }
    session.show(out)
}

pub fn table(session: &mut Session, files: &[PathBuf], query: TableQuery, out: &mut dyn Write) -> Result<()> {
    session.load(files, out)?;
    session.request.query = query;
    session.dispatch(NavigationCommand::navigate(View::DataTable), out)?;
    session.show(out)
}

pub fn ports(session: &mut Session, files: &[PathBuf], top: Option<usize>, out: &mut dyn Write) -> Result<()> {
    session.load(files, out)?;
    let dataset = session.state.dataset();
    let limit = top.unwrap_or(session.config.view.top_ports);

    let usages = port_usages(dataset);
    if usages.is_empty() {
        writeln!(out, "No port information in the loaded data.")?;
        return Ok(());
    }

    writeln!(out, "Top {} ports:", limit)?;
    for (port, count) in top_ports(&usages, limit) {
        writeln!(out, "  {:>6}  {}", port, count)?;
    }
    if let Some(heatmap) = port_heatmap(dataset, limit) {
        writeln!(out)?;
        writeln!(out, "Port Usage by Instance")?;
        render_heatmap(out, &heatmap)?;
    }
    writeln!(out)?;
    writeln!(out, "Ports by App Type")?;
    for entry in ports_by_type(dataset) {
        writeln!(out, "  {:<16} {:>6}  {}", entry.app_type, entry.port, entry.count)?;
    }
    Ok(())
}

pub fn export(
    session: &mut Session,
    files: &[PathBuf],
    format: ExportFormat,
    filter: Option<&FilterArgs>,
    dir: &Path,
    out: &mut dyn Write,
) -> Result<PathBuf> {
    session.load(files, out)?;
    match filter.and_then(FilterArgs::command) {
        Some(command) => session.dispatch(command, out)?,
        None => session.dispatch(NavigationCommand::navigate(View::DataTable), out)?,
    }
    session.export(format, dir, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdash_data::DataError;

    const HOST_A: &str = r#"{"instance_id": "i-1", "instance_name": "host-a", "applications": [
        {"name": "nginx", "type": "docker", "status": "running", "ports": [80, 443]},
        {"name": "redis", "type": "docker", "status": "stopped", "ports": [6379]}]}"#;
    const HOST_B: &str = r#"{"instance_id": "i-2", "instance_name": "host-b", "applications": [
        {"name": "sshd", "type": "service", "status": "running", "ports": [22]}]}"#;

    fn fixture() -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::fs::write(&a, HOST_A).unwrap();
        std::fs::write(&b, HOST_B).unwrap();
        (dir, vec![a, b])
    }

    fn run<F>(f: F) -> String
    where
        F: FnOnce(&mut Session, &mut Vec<u8>) -> Result<()>,
    {
        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();
        f(&mut session, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary() {
        let (_dir, files) = fixture();
        let text = run(|s, out| summary(s, &files, out));
        assert!(text.contains("Loaded 3 applications from 2 of 2 file(s)"));
        assert!(text.contains("Total Instances:      2"));
        assert!(text.contains("Busiest Instance:     host-a"));
    }

    #[test]
    fn test_filter_by_type() {
        let (_dir, files) = fixture();
        let args = FilterArgs {
            app_type: Some("docker".into()),
            instance: None,
            status: None,
        };
        let text = run(|s, out| filter(s, &files, &args, out));
        assert!(text.contains("Filtered by type: docker"));
        assert!(text.contains("Applications: 2  Instances: 1  App Types: 1"));
        assert!(!text.contains("sshd"));
    }

    #[test]
    fn test_table_search() {
        let (_dir, files) = fixture();
        let text = run(|s, out| table(s, &files, TableQuery::new().with_search("SSH"), out));
        assert!(text.contains("Showing 1 of 3 applications"));
    }

    #[test]
    fn test_ports() {
        let (_dir, files) = fixture();
        let text = run(|s, out| ports(s, &files, Some(2), out));
        assert!(text.contains("Top 2 ports:"));
        assert!(text.contains("Ports by App Type"));
    }

    #[test]
    fn test_export_filtered_and_database() {
        let (dir, files) = fixture();
        let args = FilterArgs {
            app_type: None,
            instance: Some("host-b".into()),
            status: None,
        };

        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();
        let path = export(&mut session, &files, ExportFormat::Csv, Some(&args), dir.path(), &mut out).unwrap();
        assert!(path.ends_with("filtered_applications_host-b.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let mut session = Session::new(DashboardConfig::default());
        let path = export(&mut session, &files, ExportFormat::Json, None, dir.path(), &mut out).unwrap();
        assert!(path.ends_with("application_database.json"));
        let imported = appdash_data::sources::import_json(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(imported.len(), 3);
    }

    #[test]
    fn test_all_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();

        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();
        let err = summary(&mut session, &[bad], &mut out).unwrap_err();
        assert!(matches!(err.downcast_ref::<DataError>(), Some(DataError::BatchEmptyResult { files: 1 })));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error processing bad.json: Invalid JSON format at line 1"));
    }

    #[test]
    fn test_unreadable_path_is_reported_with_file_errors() {
        let (dir, mut files) = fixture();
        files.push(dir.path().join("missing.json"));

        let text = run(|s, out| summary(s, &files, out));
        assert!(text.contains("Error processing missing.json: Could not read file"));
        assert!(text.contains("Loaded 3 applications from 2 of 3 file(s)"));
    }

    #[test]
    fn test_history_records_session_events() {
        let (_dir, files) = fixture();
        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();

        session.load(&files, &mut out).unwrap();
        session
            .dispatch(NavigationCommand::SelectAppType("docker".into()), &mut out)
            .unwrap();
        session.dispatch(NavigationCommand::ClearFilter, &mut out).unwrap();

        let events: Vec<_> = session.history().into_iter().map(|activity| activity.event).collect();
        assert_eq!(
            events,
            vec![
                SessionEvent::DatasetReplaced {
                    record_count: 3,
                    failed_files: 0,
                },
                SessionEvent::NavigationChanged {
                    view: View::FilteredView,
                    filter: Some(appdash_core::navigation::Filter::app_type("docker")),
                },
                SessionEvent::NavigationChanged {
                    view: View::FilteredView,
                    filter: None,
                },
            ]
        );
    }
}
