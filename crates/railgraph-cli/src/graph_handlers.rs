//! Handler functions for graph CLI commands.
//!
//! These functions implement the logic behind `graph validate`,
//! `graph stats` and `graph projection`.

use railgraph::manager::ProjectionManager;
use railgraph::persistence::{GraphSnapshot, load_snapshot};
use railgraph::projection::{GraphSchema, ProjectionSpec};
use railgraph::stats::compute_stats;
use railgraph::store::GraphStore;
use railgraph::validation::{ValidationIssue, validate_snapshot};
use railgraph_core::traits::ConfigProvider;
use railgraph_core::{Error, Result};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Handlers
// ============================================================================

/// Validate snapshot integrity.
pub async fn handle_validate<C: ConfigProvider>(config: &C, schema: &GraphSchema) -> Result<()> {
    let snapshot = load_snapshot_or_error(&config.snapshot_path()?)?;
    let result = validate_snapshot(&snapshot, schema);

    if result.valid {
        println!("Snapshot is valid.");
    } else {
        println!("Snapshot has validation issues:");
    }

    for error in &result.errors {
        print_issue("ERROR", error);
    }
    for warning in &result.warnings {
        print_issue("WARN ", warning);
    }
    for info in &result.info {
        println!("  INFO  [{}]: {}", info.code, info.message);
    }

    println!(
        "\nSummary: {} error(s), {} warning(s)",
        result.errors.len(),
        result.warnings.len()
    );

    if result.valid {
        Ok(())
    } else {
        Err(Error::operation(format!(
            "Snapshot validation failed with {} error(s)",
            result.errors.len()
        )))
    }
}

/// Show network statistics.
pub async fn handle_stats<C: ConfigProvider>(config: &C, schema: &GraphSchema) -> Result<()> {
    let snapshot = load_snapshot_or_error(&config.snapshot_path()?)?;
    let stats = compute_stats(&snapshot, schema);

    println!("Network Statistics");
    println!("==================");
    println!("Points:           {}", stats.point_count);
    println!("  Orphans:        {}", stats.orphan_count);
    println!("Sections:         {}", stats.section_count);
    println!("  Routable:       {}", stats.routable_section_count);
    println!("Components:       {}", stats.component_count);
    println!("  Largest:        {}", stats.largest_component);
    println!("Avg degree:       {:.2}", stats.avg_degree);
    if let Some(ref id) = stats.busiest_point {
        println!("Busiest point:    {id} (degree: {})", stats.max_degree);
    }
    println!("Total length:     {:.2}", stats.total_length);
    if let (Some(min), Some(max)) = (stats.min_section_length, stats.max_section_length) {
        println!("Section length:   {min:.2} .. {max:.2}");
    }

    if !stats.country_distribution.is_empty() {
        println!("\nCountries:");
        let mut countries: Vec<_> = stats.country_distribution.iter().collect();
        countries.sort_by(|a, b| b.1.cmp(a.1));
        for (country, count) in countries {
            println!("  {country}: {count}");
        }
    }

    if !stats.relationship_distribution.is_empty() {
        println!("\nRelationships:");
        for (rel, count) in &stats.relationship_distribution {
            println!("  {rel}: {count}");
        }
    }

    Ok(())
}

/// Ensure the projection exists on `store` and report its size.
///
/// With `drop`, the projection is removed again afterwards.
pub async fn handle_projection(
    store: Arc<dyn GraphStore>,
    spec: ProjectionSpec,
    drop: bool,
) -> Result<()> {
    let manager = ProjectionManager::new(Arc::clone(&store), spec);
    let status = manager.ensure().await?;

    let info = store
        .projection_info(manager.name())
        .await?
        .ok_or_else(|| Error::projection(format!("projection '{}' vanished", manager.name())))?;

    println!("Projection '{}' ({status:?})", info.name);
    println!("  Points:   {}", info.node_count);
    println!("  Sections: {}", info.relationship_count);

    if drop {
        manager.invalidate().await?;
        println!("Projection '{}' dropped.", info.name);
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn print_issue(level: &str, issue: &ValidationIssue) {
    println!("  {level} [{}]: {}", issue.code, issue.message);
    for point in &issue.points {
        println!("    - {point}");
    }
    for section in &issue.sections {
        println!("    - {section}");
    }
}

/// Load the snapshot, returning a helpful error message when it is missing.
pub(crate) fn load_snapshot_or_error(path: &Path) -> Result<GraphSnapshot> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    load_snapshot(path)
}

// ============================================================================
// Tests
// ============================================================================
