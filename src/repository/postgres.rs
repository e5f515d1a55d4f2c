use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::str::FromStr;

use super::{FoodSecurityRepository, RepoResult};
use crate::error::RepositoryError;
use crate::models::{
    AlertStatus, DistributionCenter, DistributionPlan, FoodInventory, NewDistributionPlan,
    NewRouteDisruption, NewShortageAlert, NewTransportRoute, OperationalStatus, PlanStatus, Region,
    RouteDisruption, ShortageAlert, TransportRoute,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS regions (
        id BIGSERIAL PRIMARY KEY,
        region_code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        latitude DOUBLE PRECISION NOT NULL CHECK (latitude BETWEEN -90 AND 90),
        longitude DOUBLE PRECISION NOT NULL CHECK (longitude BETWEEN -180 AND 180),
        population BIGINT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )",
    "CREATE TABLE IF NOT EXISTS distribution_centers (
        id BIGSERIAL PRIMARY KEY,
        center_code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        region_id BIGINT NOT NULL REFERENCES regions(id),
        latitude DOUBLE PRECISION NOT NULL,
        longitude DOUBLE PRECISION NOT NULL,
        operational_status TEXT NOT NULL DEFAULT 'operational',
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )",
    "CREATE TABLE IF NOT EXISTS transport_routes (
        id BIGSERIAL PRIMARY KEY,
        route_code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        origin_region_id BIGINT REFERENCES regions(id),
        destination_region_id BIGINT REFERENCES regions(id),
        origin_center_id BIGINT REFERENCES distribution_centers(id),
        destination_center_id BIGINT REFERENCES distribution_centers(id),
        distance_km DOUBLE PRECISION,
        estimated_time_hours DOUBLE PRECISION,
        path_polyline TEXT,
        operational_status TEXT NOT NULL DEFAULT 'operational',
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )",
    "CREATE TABLE IF NOT EXISTS route_disruptions (
        id BIGSERIAL PRIMARY KEY,
        route_id BIGINT NOT NULL REFERENCES transport_routes(id),
        region_id BIGINT REFERENCES regions(id),
        disruption_type TEXT NOT NULL,
        severity TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        capacity_reduction_percentage DOUBLE PRECISION NOT NULL,
        started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )",
    "CREATE TABLE IF NOT EXISTS food_inventories (
        id BIGSERIAL PRIMARY KEY,
        region_id BIGINT NOT NULL REFERENCES regions(id),
        category_id BIGINT NOT NULL,
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        quantity_tonnes DOUBLE PRECISION NOT NULL,
        consumption_rate_tonnes_per_day DOUBLE PRECISION,
        days_of_supply DOUBLE PRECISION
    )",
    "CREATE TABLE IF NOT EXISTS shortage_alerts (
        id BIGSERIAL PRIMARY KEY,
        region_id BIGINT NOT NULL REFERENCES regions(id),
        alert_code TEXT NOT NULL UNIQUE,
        alert_type TEXT NOT NULL,
        alert_level TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        population_affected BIGINT,
        days_until_shortage BIGINT,
        current_days_supply DOUBLE PRECISION,
        confidence_score DOUBLE PRECISION NOT NULL,
        model_name TEXT NOT NULL,
        recommended_actions JSONB NOT NULL DEFAULT '[]',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )",
    "CREATE TABLE IF NOT EXISTS distribution_plans (
        id BIGSERIAL PRIMARY KEY,
        plan_code TEXT NOT NULL,
        plan_name TEXT NOT NULL,
        region_id BIGINT NOT NULL REFERENCES regions(id),
        trigger_reason TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft',
        population_covered BIGINT NOT NULL,
        total_food_tonnes DOUBLE PRECISION NOT NULL,
        duration_days INTEGER NOT NULL,
        distribution_centers_count BIGINT NOT NULL,
        food_allocation JSONB NOT NULL,
        priority_weights JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_food_inventories_region_recorded
        ON food_inventories (region_id, recorded_at DESC)",
];

const ROUTE_COLUMNS: &str = "id, route_code, name, origin_region_id, destination_region_id, \
     origin_center_id, destination_center_id, distance_km, estimated_time_hours, path_polyline, \
     operational_status, is_active";

const REGION_COLUMNS: &str = "id, region_code, name, latitude, longitude, population, is_active";

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables the pipeline touches when they do not exist yet.
    pub async fn ensure_schema(&self) -> RepoResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FoodSecurityRepository for PgRepository {
    async fn list_active_regions(&self) -> RepoResult<Vec<Region>> {
        let sql = format!("SELECT {} FROM regions WHERE is_active ORDER BY id", REGION_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(region_from_row).collect()
    }

    async fn get_region(&self, id: i64) -> RepoResult<Option<Region>> {
        let sql = format!("SELECT {} FROM regions WHERE id = $1", REGION_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(region_from_row).transpose()
    }

    async fn get_regions(&self, ids: &[i64]) -> RepoResult<Vec<Region>> {
        let sql = format!("SELECT {} FROM regions WHERE id = ANY($1) ORDER BY id", REGION_COLUMNS);
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;
        rows.iter().map(region_from_row).collect()
    }

    async fn list_operational_routes_touching(
        &self,
        region_ids: &[i64],
    ) -> RepoResult<Vec<TransportRoute>> {
        let sql = format!(
            "SELECT {} FROM transport_routes
             WHERE is_active AND operational_status = 'operational'
               AND (origin_region_id = ANY($1) OR destination_region_id = ANY($1))
             ORDER BY id",
            ROUTE_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(region_ids).fetch_all(&self.pool).await?;
        rows.iter().map(route_from_row).collect()
    }

    async fn list_routes_with_status(
        &self,
        statuses: &[OperationalStatus],
    ) -> RepoResult<Vec<TransportRoute>> {
        let statuses: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let sql = format!(
            "SELECT {} FROM transport_routes
             WHERE is_active AND operational_status = ANY($1)
             ORDER BY id",
            ROUTE_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(statuses).fetch_all(&self.pool).await?;
        rows.iter().map(route_from_row).collect()
    }

    async fn update_route_status(&self, route_id: i64, status: OperationalStatus) -> RepoResult<()> {
        let result = sqlx::query("UPDATE transport_routes SET operational_status = $2 WHERE id = $1")
            .bind(route_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                entity: "route",
                id: route_id,
            });
        }
        Ok(())
    }

    async fn find_operational_route_between_centers(
        &self,
        origin_center_id: i64,
        destination_center_id: i64,
    ) -> RepoResult<Option<TransportRoute>> {
        let sql = format!(
            "SELECT {} FROM transport_routes
             WHERE origin_center_id = $1 AND destination_center_id = $2
               AND is_active AND operational_status = 'operational'
             ORDER BY id LIMIT 1",
            ROUTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(origin_center_id)
            .bind(destination_center_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(route_from_row).transpose()
    }

    async fn create_route(&self, route: NewTransportRoute) -> RepoResult<TransportRoute> {
        let sql = format!(
            "INSERT INTO transport_routes
                (route_code, name, origin_region_id, destination_region_id, origin_center_id,
                 destination_center_id, distance_km, estimated_time_hours, path_polyline,
                 operational_status, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
             RETURNING {}",
            ROUTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&route.route_code)
            .bind(&route.name)
            .bind(route.origin_region_id)
            .bind(route.destination_region_id)
            .bind(route.origin_center_id)
            .bind(route.destination_center_id)
            .bind(route.distance_km)
            .bind(route.estimated_time_hours)
            .bind(&route.path_polyline)
            .bind(route.operational_status.as_str())
            .fetch_one(&self.pool)
            .await?;
        route_from_row(&row)
    }

    async fn has_active_disruption(&self, route_id: i64) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM route_disruptions WHERE route_id = $1 AND is_active)",
        )
        .bind(route_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_disruption(&self, disruption: NewRouteDisruption) -> RepoResult<RouteDisruption> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO route_disruptions
                (route_id, region_id, disruption_type, severity, title, description,
                 capacity_reduction_percentage, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
             RETURNING id",
        )
        .bind(disruption.route_id)
        .bind(disruption.region_id)
        .bind(disruption.disruption_type.as_str())
        .bind(disruption.severity.as_str())
        .bind(&disruption.title)
        .bind(&disruption.description)
        .bind(disruption.capacity_reduction_percentage)
        .fetch_one(&self.pool)
        .await?;

        Ok(RouteDisruption {
            id,
            route_id: disruption.route_id,
            region_id: disruption.region_id,
            disruption_type: disruption.disruption_type,
            severity: disruption.severity,
            title: disruption.title,
            description: disruption.description,
            capacity_reduction_percentage: disruption.capacity_reduction_percentage,
            is_active: true,
        })
    }

    async fn latest_inventory(&self, region_id: i64) -> RepoResult<Option<FoodInventory>> {
        let row = sqlx::query(
            "SELECT id, region_id, category_id, recorded_at, quantity_tonnes,
                    consumption_rate_tonnes_per_day, days_of_supply
             FROM food_inventories
             WHERE region_id = $1
             ORDER BY recorded_at DESC, id DESC
             LIMIT 1",
        )
        .bind(region_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> RepoResult<FoodInventory> {
            Ok(FoodInventory {
                id: row.try_get("id")?,
                region_id: row.try_get("region_id")?,
                category_id: row.try_get("category_id")?,
                recorded_at: row.try_get("recorded_at")?,
                quantity_tonnes: row.try_get("quantity_tonnes")?,
                consumption_rate_tonnes_per_day: row.try_get("consumption_rate_tonnes_per_day")?,
                days_of_supply: row.try_get("days_of_supply")?,
            })
        })
        .transpose()
    }

    async fn has_active_alert(&self, region_id: i64) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shortage_alerts
                            WHERE region_id = $1 AND is_active AND status = 'active')",
        )
        .bind(region_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_alert(&self, alert: NewShortageAlert) -> RepoResult<ShortageAlert> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO shortage_alerts
                (region_id, alert_code, alert_type, alert_level, status, title, description,
                 population_affected, days_until_shortage, current_days_supply,
                 confidence_score, model_name, recommended_actions, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE)
             RETURNING id",
        )
        .bind(alert.region_id)
        .bind(&alert.alert_code)
        .bind(alert.alert_type.as_str())
        .bind(alert.alert_level.as_str())
        .bind(AlertStatus::Active.as_str())
        .bind(&alert.title)
        .bind(&alert.description)
        .bind(alert.population_affected)
        .bind(alert.days_until_shortage)
        .bind(alert.current_days_supply)
        .bind(alert.confidence_score)
        .bind(&alert.model_name)
        .bind(Json(&alert.recommended_actions))
        .fetch_one(&self.pool)
        .await?;

        Ok(ShortageAlert {
            id,
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
        })
    }

    async fn list_available_centers_outside(
        &self,
        excluded_region_ids: &[i64],
    ) -> RepoResult<Vec<DistributionCenter>> {
        let rows = sqlx::query(
            "SELECT id, center_code, name, region_id, latitude, longitude,
                    operational_status, is_active
             FROM distribution_centers
             WHERE is_active AND operational_status = 'operational'
               AND NOT (region_id = ANY($1))
             ORDER BY id",
        )
        .bind(excluded_region_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> RepoResult<DistributionCenter> {
                Ok(DistributionCenter {
                    id: row.try_get("id")?,
                    center_code: row.try_get("center_code")?,
                    name: row.try_get("name")?,
                    region_id: row.try_get("region_id")?,
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    operational_status: parse_column(row, "operational_status")?,
                    is_active: row.try_get("is_active")?,
                })
            })
            .collect()
    }

    async fn count_active_centers_in_region(&self, region_id: i64) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM distribution_centers WHERE region_id = $1 AND is_active",
        )
        .bind(region_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn create_plan(&self, plan: NewDistributionPlan) -> RepoResult<DistributionPlan> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO distribution_plans
                (plan_code, plan_name, region_id, trigger_reason, status, population_covered,
                 total_food_tonnes, duration_days, distribution_centers_count,
                 food_allocation, priority_weights)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(&plan.plan_code)
        .bind(&plan.plan_name)
        .bind(plan.region_id)
        .bind(&plan.trigger_reason)
        .bind(PlanStatus::Draft.as_str())
        .bind(plan.population_covered)
        .bind(plan.total_food_tonnes)
        .bind(plan.duration_days as i32)
        .bind(plan.distribution_centers_count)
        .bind(Json(&plan.food_allocation))
        .bind(Json(&plan.priority_weights))
        .fetch_one(&self.pool)
        .await?;

        Ok(DistributionPlan {
            id,
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
        })
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

fn parse_column<T>(row: &PgRow, column: &'static str) -> RepoResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|message| RepositoryError::InvalidValue { column, message })
}

fn region_from_row(row: &PgRow) -> RepoResult<Region> {
    Ok(Region {
        id: row.try_get("id")?,
        region_code: row.try_get("region_code")?,
        name: row.try_get("name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        population: row.try_get("population")?,
        is_active: row.try_get("is_active")?,
    })
}

fn route_from_row(row: &PgRow) -> RepoResult<TransportRoute> {
    Ok(TransportRoute {
        id: row.try_get("id")?,
        route_code: row.try_get("route_code")?,
        name: row.try_get("name")?,
        origin_region_id: row.try_get("origin_region_id")?,
        destination_region_id: row.try_get("destination_region_id")?,
        origin_center_id: row.try_get("origin_center_id")?,
        destination_center_id: row.try_get("destination_center_id")?,
        distance_km: row.try_get("distance_km")?,
        estimated_time_hours: row.try_get("estimated_time_hours")?,
        path_polyline: row.try_get("path_polyline")?,
        operational_status: parse_column(row, "operational_status")?,
        is_active: row.try_get("is_active")?,
    })
}
