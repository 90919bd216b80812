pub mod jupiter;
pub mod types;

use async_trait::async_trait;

use crate::errors::AggregatorError;
pub use jupiter::JupiterClient;
pub use types::{Cluster, Route, RouteParams, SwapResult};

/// Client seam over the swap aggregator
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Quote candidate routes for the given parameters, best route first
    async fn compute_routes(&self, params: &RouteParams) -> Result<Vec<Route>, AggregatorError>;

    /// Sign and submit the chosen route through the swap endpoint
    async fn execute_swap(&self, route: &Route) -> Result<SwapResult, AggregatorError>;
}
