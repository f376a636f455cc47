//! Point and country listings.

use crate::projection::GraphSchema;
use crate::store::GraphStore;
use crate::types::OperationPoint;
use railgraph_core::Result;
use std::sync::Arc;

/// Read-only listings over the store's routable points.
///
/// Only points of the schema's node label are listed, so every listed id is
/// a valid route endpoint.
#[derive(Clone)]
pub struct PointCatalog {
    store: Arc<dyn GraphStore>,
    schema: GraphSchema,
}

impl PointCatalog {
    /// Create a catalogue over `store` with the default schema.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            schema: GraphSchema::default(),
        }
    }

    /// List points of `schema.node_label` only.
    pub fn with_schema(mut self, schema: GraphSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Points ordered by label, optionally restricted to one country.
    ///
    /// Country matching ignores ASCII case.
    pub async fn points(&self, country: Option<&str>) -> Result<Vec<OperationPoint>> {
        let points = self.store.points(&self.schema).await?;
        Ok(match country {
            Some(country) => points
                .into_iter()
                .filter(|p| p.country.eq_ignore_ascii_case(country))
                .collect(),
            None => points,
        })
    }

    /// Points that carry both coordinates, ordered by label.
    pub async fn mappable_points(&self, country: Option<&str>) -> Result<Vec<OperationPoint>> {
        Ok(self
            .points(country)
            .await?
            .into_iter()
            .filter(OperationPoint::has_coordinates)
            .collect())
    }

    /// Distinct countries, sorted.
    pub async fn countries(&self) -> Result<Vec<String>> {
        self.store.countries(&self.schema).await
    }
}
