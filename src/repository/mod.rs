//! Persistence port for the food security records the pipeline reads and writes.
//!
//! - **FoodSecurityRepository**: async trait every pipeline stage talks to
//! - **MemoryRepository**: in-process store, used by tests and dry runs
//! - **PgRepository**: Postgres implementation over sqlx

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::{
    DistributionCenter, DistributionPlan, FoodInventory, NewDistributionPlan, NewRouteDisruption,
    NewShortageAlert, NewTransportRoute, OperationalStatus, Region, RouteDisruption, ShortageAlert,
    TransportRoute,
};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

/// Every list operation returns rows ordered by id so that pipeline runs are
/// reproducible.
#[async_trait]
pub trait FoodSecurityRepository: Send + Sync {
    async fn list_active_regions(&self) -> RepoResult<Vec<Region>>;

    async fn get_region(&self, id: i64) -> RepoResult<Option<Region>>;

    async fn get_regions(&self, ids: &[i64]) -> RepoResult<Vec<Region>>;

    /// Active, operational routes with either endpoint region in `region_ids`.
    async fn list_operational_routes_touching(
        &self,
        region_ids: &[i64],
    ) -> RepoResult<Vec<TransportRoute>>;

    /// Active routes currently in any of `statuses`.
    async fn list_routes_with_status(
        &self,
        statuses: &[OperationalStatus],
    ) -> RepoResult<Vec<TransportRoute>>;

    async fn update_route_status(&self, route_id: i64, status: OperationalStatus) -> RepoResult<()>;

    /// Active, operational route running between exactly these two centers.
    async fn find_operational_route_between_centers(
        &self,
        origin_center_id: i64,
        destination_center_id: i64,
    ) -> RepoResult<Option<TransportRoute>>;

    async fn create_route(&self, route: NewTransportRoute) -> RepoResult<TransportRoute>;

    async fn has_active_disruption(&self, route_id: i64) -> RepoResult<bool>;

    async fn create_disruption(&self, disruption: NewRouteDisruption) -> RepoResult<RouteDisruption>;

    /// Most recently recorded inventory row for the region.
    async fn latest_inventory(&self, region_id: i64) -> RepoResult<Option<FoodInventory>>;

    async fn has_active_alert(&self, region_id: i64) -> RepoResult<bool>;

    async fn create_alert(&self, alert: NewShortageAlert) -> RepoResult<ShortageAlert>;

    /// Active, operational centers whose region is not in `excluded_region_ids`.
    async fn list_available_centers_outside(
        &self,
        excluded_region_ids: &[i64],
    ) -> RepoResult<Vec<DistributionCenter>>;

    async fn count_active_centers_in_region(&self, region_id: i64) -> RepoResult<i64>;

    async fn create_plan(&self, plan: NewDistributionPlan) -> RepoResult<DistributionPlan>;

    /// Store name for logging
    fn name(&self) -> &str;
}
