use async_trait::async_trait;
use parking_lot::RwLock;

use super::{FoodSecurityRepository, RepoResult};
use crate::error::RepositoryError;
use crate::models::{
    AlertStatus, DistributionCenter, DistributionPlan, FoodInventory, NewDistributionPlan,
    NewRouteDisruption, NewShortageAlert, NewTransportRoute, OperationalStatus, PlanStatus, Region,
    RouteDisruption, ShortageAlert, TransportRoute,
};

#[derive(Debug, Default)]
struct Tables {
    regions: Vec<Region>,
    routes: Vec<TransportRoute>,
    disruptions: Vec<RouteDisruption>,
    centers: Vec<DistributionCenter>,
    inventories: Vec<FoodInventory>,
    alerts: Vec<ShortageAlert>,
    plans: Vec<DistributionPlan>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Keeps generated ids clear of ids supplied by seeded rows.
    fn observe_id(&mut self, id: i64) {
        self.next_id = self.next_id.max(id);
    }
}

/// In-memory repository. Rows are kept in insertion order, and seeded rows keep
/// the ids they were given.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_region(&self, region: Region) {
        let mut t = self.tables.write();
        t.observe_id(region.id);
        t.regions.push(region);
    }

    pub fn insert_route(&self, route: TransportRoute) {
        let mut t = self.tables.write();
        t.observe_id(route.id);
        t.routes.push(route);
    }

    pub fn insert_center(&self, center: DistributionCenter) {
        let mut t = self.tables.write();
        t.observe_id(center.id);
        t.centers.push(center);
    }

    pub fn insert_inventory(&self, inventory: FoodInventory) {
        let mut t = self.tables.write();
        t.observe_id(inventory.id);
        t.inventories.push(inventory);
    }

    pub fn insert_alert(&self, alert: ShortageAlert) {
        let mut t = self.tables.write();
        t.observe_id(alert.id);
        t.alerts.push(alert);
    }

    pub fn routes(&self) -> Vec<TransportRoute> {
        self.tables.read().routes.clone()
    }

    pub fn route(&self, id: i64) -> Option<TransportRoute> {
        self.tables.read().routes.iter().find(|r| r.id == id).cloned()
    }

    pub fn disruptions(&self) -> Vec<RouteDisruption> {
        self.tables.read().disruptions.clone()
    }

    pub fn alerts(&self) -> Vec<ShortageAlert> {
        self.tables.read().alerts.clone()
    }

    pub fn plans(&self) -> Vec<DistributionPlan> {
        self.tables.read().plans.clone()
    }
}

#[async_trait]
impl FoodSecurityRepository for MemoryRepository {
    async fn list_active_regions(&self) -> RepoResult<Vec<Region>> {
        let t = self.tables.read();
        Ok(sorted_by_id(t.regions.iter().filter(|r| r.is_active).cloned().collect(), |r| r.id))
    }

    async fn get_region(&self, id: i64) -> RepoResult<Option<Region>> {
        Ok(self.tables.read().regions.iter().find(|r| r.id == id).cloned())
    }

    async fn get_regions(&self, ids: &[i64]) -> RepoResult<Vec<Region>> {
        let t = self.tables.read();
        Ok(sorted_by_id(
            t.regions.iter().filter(|r| ids.contains(&r.id)).cloned().collect(),
            |r| r.id,
        ))
    }

    async fn list_operational_routes_touching(
        &self,
        region_ids: &[i64],
    ) -> RepoResult<Vec<TransportRoute>> {
        let t = self.tables.read();
        let routes = t
            .routes
            .iter()
            .filter(|r| r.is_active && r.operational_status == OperationalStatus::Operational)
            .filter(|r| region_ids.iter().any(|id| r.touches_region(*id)))
            .cloned()
            .collect();
        Ok(sorted_by_id(routes, |r| r.id))
    }

    async fn list_routes_with_status(
        &self,
        statuses: &[OperationalStatus],
    ) -> RepoResult<Vec<TransportRoute>> {
        let t = self.tables.read();
        let routes = t
            .routes
            .iter()
            .filter(|r| r.is_active && statuses.contains(&r.operational_status))
            .cloned()
            .collect();
        Ok(sorted_by_id(routes, |r| r.id))
    }

    async fn update_route_status(&self, route_id: i64, status: OperationalStatus) -> RepoResult<()> {
        let mut t = self.tables.write();
        let route = t
            .routes
            .iter_mut()
            .find(|r| r.id == route_id)
            .ok_or(RepositoryError::NotFound {
                entity: "route",
                id: route_id,
            })?;
        route.operational_status = status;
        Ok(())
    }

    async fn find_operational_route_between_centers(
        &self,
        origin_center_id: i64,
        destination_center_id: i64,
    ) -> RepoResult<Option<TransportRoute>> {
        let t = self.tables.read();
        Ok(t
            .routes
            .iter()
            .find(|r| {
                r.is_active
                    && r.operational_status == OperationalStatus::Operational
                    && r.origin_center_id == Some(origin_center_id)
                    && r.destination_center_id == Some(destination_center_id)
            })
            .cloned())
    }

    async fn create_route(&self, route: NewTransportRoute) -> RepoResult<TransportRoute> {
        let mut t = self.tables.write();
        let created = TransportRoute {
            id: t.allocate_id(),
            route_code: route.route_code,
            name: route.name,
            origin_region_id: route.origin_region_id,
            destination_region_id: route.destination_region_id,
            origin_center_id: route.origin_center_id,
            destination_center_id: route.destination_center_id,
            distance_km: route.distance_km,
            estimated_time_hours: route.estimated_time_hours,
            path_polyline: route.path_polyline,
            operational_status: route.operational_status,
            is_active: true,
        };
        t.routes.push(created.clone());
        Ok(created)
    }

    async fn has_active_disruption(&self, route_id: i64) -> RepoResult<bool> {
        let t = self.tables.read();
        Ok(t.disruptions.iter().any(|d| d.route_id == route_id && d.is_active))
    }

    async fn create_disruption(&self, disruption: NewRouteDisruption) -> RepoResult<RouteDisruption> {
        let mut t = self.tables.write();
        let created = RouteDisruption {
            id: t.allocate_id(),
            route_id: disruption.route_id,
            region_id: disruption.region_id,
            disruption_type: disruption.disruption_type,
            severity: disruption.severity,
            title: disruption.title,
            description: disruption.description,
            capacity_reduction_percentage: disruption.capacity_reduction_percentage,
            is_active: true,
        };
        t.disruptions.push(created.clone());
        Ok(created)
    }

    async fn latest_inventory(&self, region_id: i64) -> RepoResult<Option<FoodInventory>> {
        let t = self.tables.read();
        // max_by_key returns the last maximum, so equal timestamps resolve to the
        // row inserted last
        Ok(t
            .inventories
            .iter()
            .filter(|i| i.region_id == region_id)
            .max_by_key(|i| i.recorded_at)
            .cloned())
    }

    async fn has_active_alert(&self, region_id: i64) -> RepoResult<bool> {
        let t = self.tables.read();
        Ok(t
            .alerts
            .iter()
            .any(|a| a.region_id == region_id && a.is_active && a.status == AlertStatus::Active))
    }

    async fn create_alert(&self, alert: NewShortageAlert) -> RepoResult<ShortageAlert> {
        let mut t = self.tables.write();
        let created = ShortageAlert {
            id: t.allocate_id(),
            region_id: alert.region_id,
            alert_code: alert.alert_code,
            alert_type: alert.alert_type,
            alert_level: alert.alert_level,
            status: AlertStatus::Active,
            title: alert.title,
            description: alert.description,
            population_affected: alert.population_affected,
            days_until_shortage: alert.days_until_shortage,
            current_days_supply: alert.current_days_supply,
            confidence_score: alert.confidence_score,
            model_name: alert.model_name,
            recommended_actions: alert.recommended_actions,
            is_active: true,
        };
        t.alerts.push(created.clone());
        Ok(created)
    }

    async fn list_available_centers_outside(
        &self,
        excluded_region_ids: &[i64],
    ) -> RepoResult<Vec<DistributionCenter>> {
        let t = self.tables.read();
        let centers = t
            .centers
            .iter()
            .filter(|c| c.is_available() && !excluded_region_ids.contains(&c.region_id))
            .cloned()
            .collect();
        Ok(sorted_by_id(centers, |c| c.id))
    }

    async fn count_active_centers_in_region(&self, region_id: i64) -> RepoResult<i64> {
        let t = self.tables.read();
        Ok(t
            .centers
            .iter()
            .filter(|c| c.region_id == region_id && c.is_active)
            .count() as i64)
    }

    async fn create_plan(&self, plan: NewDistributionPlan) -> RepoResult<DistributionPlan> {
        let mut t = self.tables.write();
        let created = DistributionPlan {
            id: t.allocate_id(),
            plan_code: plan.plan_code,
            plan_name: plan.plan_name,
            region_id: plan.region_id,
            trigger_reason: plan.trigger_reason,
            status: PlanStatus::Draft,
            population_covered: plan.population_covered,
            total_food_tonnes: plan.total_food_tonnes,
            duration_days: plan.duration_days,
            distribution_centers_count: plan.distribution_centers_count,
            food_allocation: plan.food_allocation,
            priority_weights: plan.priority_weights,
        };
        t.plans.push(created.clone());
        Ok(created)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

fn sorted_by_id<T>(mut rows: Vec<T>, id: impl Fn(&T) -> i64) -> Vec<T> {
    rows.sort_by_key(|row| id(row));
    rows
}
