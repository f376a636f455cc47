//! Rendering of routes and listings as table, JSON or CSV.
//!
//! Renderers return the full text so handlers decide where it goes and
//! tests can inspect it.

use crate::cli::OutputFormat;
use railgraph::facade::{PathQueryResult, PathQueryStatus};
use railgraph::types::OperationPoint;
use railgraph_core::{Error, Result};
use serde::Serialize;

/// Separator between stops in flat route strings.
pub const ROUTE_SEPARATOR: &str = " -> ";

// ============================================================================
// Row types
// ============================================================================

/// One ranked route, flattened for CSV and table output.
#[derive(Debug, Serialize)]
struct RouteRow {
    rank: usize,
    stops: usize,
    total_distance: f64,
    route: String,
}

#[derive(Debug, Serialize)]
struct PointRow<'a> {
    id: &'a str,
    label: &'a str,
    country: &'a str,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CountryRow<'a> {
    country: &'a str,
}

fn route_rows(result: &PathQueryResult) -> Vec<RouteRow> {
    result
        .records()
        .into_iter()
        .enumerate()
        .map(|(i, record)| RouteRow {
            rank: i + 1,
            stops: record.stops,
            total_distance: record.total_distance,
            route: record.route_string(ROUTE_SEPARATOR),
        })
        .collect()
}

// ============================================================================
// Renderers
// ============================================================================

/// Render a query result.
///
/// JSON carries the status and full paths; table and CSV carry one row per
/// route. A table for an empty result explains why it is empty.
pub fn render_routes(
    result: &PathQueryResult,
    source: &str,
    target: &str,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(result),
        OutputFormat::Csv => to_csv(&route_rows(result)),
        OutputFormat::Table => {
            if !result.is_found() {
                return Ok(match result.status {
                    PathQueryStatus::UnknownEndpoint => {
                        format!("Unknown operation point in '{source}' -> '{target}'.\n")
                    }
                    _ => format!("No route found from '{source}' to '{target}'.\n"),
                });
            }
            let rows: Vec<Vec<String>> = route_rows(result)
                .into_iter()
                .map(|r| {
                    vec![
                        r.rank.to_string(),
                        r.stops.to_string(),
                        format!("{:.2}", r.total_distance),
                        r.route,
                    ]
                })
                .collect();
            Ok(table(&["#", "STOPS", "DISTANCE", "ROUTE"], &rows))
        }
    }
}

/// Render a point listing.
pub fn render_points(points: &[OperationPoint], format: OutputFormat) -> Result<String> {
    let rows: Vec<PointRow<'_>> = points
        .iter()
        .map(|p| PointRow {
            id: &p.id,
            label: &p.label,
            country: &p.country,
            lat: p.lat,
            lon: p.lon,
        })
        .collect();

    match format {
        OutputFormat::Json => to_json(points),
        OutputFormat::Csv => to_csv(&rows),
        OutputFormat::Table => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.label.to_string(),
                        r.country.to_string(),
                        coordinate(r.lat),
                        coordinate(r.lon),
                    ]
                })
                .collect();
            Ok(table(&["ID", "NAME", "COUNTRY", "LAT", "LON"], &cells))
        }
    }
}

/// Render a country listing.
pub fn render_countries(countries: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(countries),
        OutputFormat::Csv => to_csv(
            &countries
                .iter()
                .map(|c| CountryRow { country: c })
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Table => {
            let mut out = String::new();
            for country in countries {
                out.push_str(country);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.5}")).unwrap_or_else(|| "-".to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::serialization(format!("JSON output: {e}")))?;
    json.push('\n');
    Ok(json)
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| Error::serialization(format!("CSV output: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::serialization(format!("CSV output: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::serialization(format!("CSV output: {e}")))
}

/// Left-aligned columns separated by two spaces; the last column is not padded.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &widths, headers);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&mut out, &widths, &cells);
    }
    out
}

fn push_line(out: &mut String, widths: &[usize], cells: &[&str]) {
    for (i, cell) in cells.iter().enumerate() {
        out.push_str(cell);
        if i + 1 < cells.len() {
            let pad = widths.get(i).copied().unwrap_or(0).saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad + 2));
        }
    }
    out.push('\n');
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use railgraph::facade::{PathQueryConfig, PathQueryFacade};
    use railgraph::projection::ProjectionSpec;
    use railgraph::store::MemoryGraphStore;
    use railgraph::testing::diamond_snapshot;
    use std::sync::Arc;

    async fn diamond_routes(target: &str) -> PathQueryResult {
        let facade = PathQueryFacade::new(
            Arc::new(MemoryGraphStore::new(diamond_snapshot())),
            ProjectionSpec::default(),
            PathQueryConfig::default(),
        );
        facade.top_paths("A", target, 3).await.unwrap()
    }

    #[tokio::test]
    async fn test_render_routes_table() {
        let result = diamond_routes("D").await;
        let out = render_routes(&result, "A", "D", OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#  STOPS  DISTANCE  ROUTE"));
        assert!(lines[1].contains("23.00"));
        assert!(lines[1].ends_with("A -> B -> C -> D"));
        assert!(lines[2].ends_with("A -> D"));
    }

    #[tokio::test]
    async fn test_render_routes_csv() {
        let result = diamond_routes("D").await;
        let out = render_routes(&result, "A", "D", OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "rank,stops,total_distance,route");
        assert_eq!(lines[1], "1,4,23.0,A -> B -> C -> D");
        assert_eq!(lines[2], "2,2,30.0,A -> D");
    }

    #[tokio::test]
    async fn test_render_routes_json() {
        let result = diamond_routes("D").await;
        let out = render_routes(&result, "A", "D", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "found");
        assert_eq!(value["paths"].as_array().unwrap().len(), 2);
        assert_eq!(value["paths"][0]["total_distance"], 23.0);
    }

    #[tokio::test]
    async fn test_render_unknown_endpoint() {
        let result = diamond_routes("Atlantis").await;
        let out = render_routes(&result, "A", "Atlantis", OutputFormat::Table).unwrap();
        assert!(out.contains("Unknown operation point"));

        let csv = render_routes(&result, "A", "Atlantis", OutputFormat::Csv).unwrap();
        assert!(csv.is_empty());

        let json = render_routes(&result, "A", "Atlantis", OutputFormat::Json).unwrap();
        assert!(json.contains("unknown_endpoint"));
    }

    #[test]
    fn test_render_points() {
        let points = vec![
            OperationPoint::new("BE2")
                .with_label("Brugge")
                .with_country("Belgium")
                .with_coordinates(51.2, 3.22),
            OperationPoint::new("X"),
        ];

        let table_out = render_points(&points, OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table_out.lines().collect();
        assert!(lines[0].starts_with("ID "));
        assert!(lines[1].contains("Brugge"));
        assert!(lines[1].ends_with("3.22000"));
        assert!(lines[2].ends_with("-"));

        let csv_out = render_points(&points, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv_out.lines().collect();
        assert_eq!(lines[0], "id,label,country,lat,lon");
        assert_eq!(lines[1], "BE2,Brugge,Belgium,51.2,3.22");
        assert_eq!(lines[2], "X,X,Unknown,,");
    }

    #[test]
    fn test_render_countries() {
        let countries = vec!["Belgium".to_string(), "France".to_string()];
        assert_eq!(
            render_countries(&countries, OutputFormat::Table).unwrap(),
            "Belgium\nFrance\n"
        );
        assert_eq!(
            render_countries(&countries, OutputFormat::Csv).unwrap(),
            "country\nBelgium\nFrance\n"
        );
        let json: Vec<String> =
            serde_json::from_str(&render_countries(&countries, OutputFormat::Json).unwrap())
                .unwrap();
        assert_eq!(json, countries);
    }

    #[test]
    fn test_table_alignment() {
        let out = table(
            &["A", "B"],
            &[vec!["long-cell".into(), "x".into()], vec!["s".into(), "y".into()]],
        );
        assert_eq!(out, "A          B\nlong-cell  x\ns          y\n");
    }
}
