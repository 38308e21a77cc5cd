//! Plain-text rendering of page models

use std::io::Write;

use anyhow::Result;
use appdash_core::navigation::View;
use appdash_core::records::{ApplicationRecord, ProcessingError, RecordField};
use appdash_views::pages::{DataTablePage, FilteredPage, InstanceDetailsPage, OverviewPage, Page};
use appdash_views::plots::{BarSeries, Heatmap};
use appdash_views::tables::{render_table, FILTERED_COLUMNS, INSTANCE_COLUMNS};
use appdash_views::ViewSettings;

pub const SAMPLE_DOCUMENT: &str = r#"{
  "instance_id": "i-1234567890abcdef0",
  "instance_name": "web-server-01",
  "script_version": "1.0.0",
  "applications": [
    {
      "name": "nginx",
      "type": "docker",
      "status": "running",
      "image": "nginx:latest",
      "ports": [80, 443],
      "pids": [1234, 5678],
      "process_name": "nginx",
      "container_id": "abc123def456"
    }
  ]
}"#;

pub fn render_page(out: &mut dyn Write, page: &Page, settings: &ViewSettings) -> Result<()> {
    match page {
        Page::Welcome => {
            writeln!(out, "No data loaded. Upload one or more instance reports to begin.")?;
            writeln!(out, "Run `appdash sample` to see the expected JSON format.")?;
        }
        Page::Overview(page) => render_overview(out, page)?,
        Page::InstanceDetails(page) => render_instance_details(out, page, settings)?,
        Page::FilteredView(page) => render_filtered(out, page, settings)?,
        Page::DataTable(page) => render_data_table(out, page, settings)?,
    }
    Ok(())
}

fn heading(out: &mut dyn Write, view: View) -> Result<()> {
    writeln!(out, "== {} ==", view.title())?;
    Ok(())
}

fn render_overview(out: &mut dyn Write, page: &OverviewPage) -> Result<()> {
    heading(out, View::Overview)?;
    let m = &page.metrics;
    writeln!(out, "Total Instances:      {}", m.total_instances)?;
    writeln!(out, "Total Applications:   {}", m.total_applications)?;
    writeln!(out, "Unique App Types:     {}", m.unique_app_types)?;
    writeln!(out, "Avg Apps/Instance:    {:.1}", m.avg_apps_per_instance)?;
    if let Some(app_type) = &m.most_used_app_type {
        writeln!(out, "Most Used Type:       {}", app_type)?;
    }
    if let Some(instance) = &m.busiest_instance {
        writeln!(out, "Busiest Instance:     {}", instance)?;
    }

    writeln!(out)?;
    render_series(out, &page.charts.app_types)?;
    if let Some(statuses) = &page.charts.statuses {
        render_series(out, statuses)?;
    }
    render_series(out, &page.charts.apps_per_instance)?;
    if let Some(heatmap) = &page.charts.port_heatmap {
        writeln!(out, "Port Usage by Instance")?;
        render_heatmap(out, heatmap)?;
        writeln!(out)?;
    }

    writeln!(out, "Quick actions:")?;
    for (idx, action) in page.quick_actions.iter().enumerate() {
        writeln!(out, "  [{}] {}", idx + 1, action.label)?;
    }
    Ok(())
}

fn render_series(out: &mut dyn Write, series: &BarSeries) -> Result<()> {
    writeln!(out, "{}", series.title())?;
    let width = series.bars.iter().map(|bar| bar.label.len()).max().unwrap_or(0);
    for (idx, bar) in series.bars.iter().enumerate() {
        let share = series.share(idx).unwrap_or(0.0);
        writeln!(out, "  {:<width$}  {:>5}  ({:.1}%)", bar.label, bar.value, share, width = width)?;
    }
    writeln!(out)?;
    Ok(())
}

pub(crate) fn render_heatmap(out: &mut dyn Write, heatmap: &Heatmap) -> Result<()> {
    let label_width = heatmap.rows.iter().map(String::len).max().unwrap_or(0);
    let cell_width = heatmap.columns.iter().map(String::len).max().unwrap_or(0).max(3);

    write!(out, "  {:<w$}", "", w = label_width)?;
    for column in &heatmap.columns {
        write!(out, " {:>w$}", column, w = cell_width)?;
    }
    writeln!(out)?;
    for (row, cells) in heatmap.rows.iter().zip(&heatmap.cells) {
        write!(out, "  {:<w$}", row, w = label_width)?;
        for cell in cells {
            write!(out, " {:>w$}", cell, w = cell_width)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn render_instance_details(out: &mut dyn Write, page: &InstanceDetailsPage, settings: &ViewSettings) -> Result<()> {
    heading(out, View::InstanceDetails)?;
    writeln!(out, "{:<24} {:<24} {:>10} {:>10}", "Instance", "Instance ID", "Total Apps", "App Types")?;
    for summary in &page.instances {
        writeln!(
            out,
            "{:<24} {:<24} {:>10} {:>10}",
            summary.instance_name, summary.instance_id, summary.total_apps, summary.app_types
        )?;
    }

    if let Some(detail) = &page.selected {
        writeln!(out)?;
        writeln!(out, "Instance: {} ({})", detail.instance_name, detail.instance_id)?;
        writeln!(
            out,
            "Applications: {}  Running: {}  App Types: {}",
            detail.total_apps, detail.running_apps, detail.app_types
        )?;
        if !detail.top_ports.is_empty() {
            let ports: Vec<_> = detail
                .top_ports
                .iter()
                .map(|(port, count)| format!("{} ({})", port, count))
                .collect();
            writeln!(out, "Top ports: {}", ports.join(", "))?;
        }
        render_records(out, &detail.records, &INSTANCE_COLUMNS, settings)?;
    }

    if !page.type_matrix.is_empty() {
        writeln!(out)?;
        writeln!(out, "App Types per Instance")?;
        render_heatmap(out, &page.type_matrix)?;
    }
    Ok(())
}

fn render_filtered(out: &mut dyn Write, page: &FilteredPage, settings: &ViewSettings) -> Result<()> {
    heading(out, View::FilteredView)?;
    if let Some(warning) = &page.warning {
        writeln!(out, "Warning: {}", warning)?;
    }
    writeln!(out, "{}", page.heading())?;
    writeln!(
        out,
        "Applications: {}  Instances: {}  App Types: {}",
        page.summary.applications, page.summary.instances, page.summary.app_types
    )?;
    if page.records.is_empty() {
        writeln!(out, "No applications match the current filter.")?;
        return Ok(());
    }
    render_records(out, &page.records, &FILTERED_COLUMNS, settings)
}

fn render_data_table(out: &mut dyn Write, page: &DataTablePage, settings: &ViewSettings) -> Result<()> {
    heading(out, View::DataTable)?;
    writeln!(out, "{}", page.caption())?;
    writeln!(
        out,
        "Instances: {}  App Types: {}  Running: {}",
        page.summary.instances, page.summary.app_types, page.running
    )?;
    render_records(out, &page.records, &RecordField::ALL, settings)
}

fn render_records(
    out: &mut dyn Write,
    records: &[ApplicationRecord],
    columns: &[RecordField],
    settings: &ViewSettings,
) -> Result<()> {
    let rows: Vec<&ApplicationRecord> = records.iter().collect();
    writeln!(out, "{}", render_table(&rows, columns, settings.max_rows_displayed)?)?;
    Ok(())
}

/// Error log with one line per rejected file
pub fn render_errors(out: &mut dyn Write, errors: &[ProcessingError]) -> Result<()> {
    if errors.is_empty() {
        writeln!(out, "No processing errors.")?;
        return Ok(());
    }
    writeln!(out, "{} file(s) could not be processed:", errors.len())?;
    for error in errors {
        writeln!(out, "  {}", error)?;
    }
    Ok(())
}
