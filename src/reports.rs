//! Dashboard statistics and the reports view.

use crate::entities::{DeliveryStatus, Role, TaskStatus};
use crate::error::AppError;
use crate::managers::Actor;
use crate::policy::{self, EntityKind, View};
use crate::store::{select_as, Filter, Query, RowStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminOverview {
    pub users: u64,
    pub families: u64,
    pub assistance_types: u64,
    pub regions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub new: u64,
    pub in_progress: u64,
    pub completed: u64,
    /// Stored statuses outside the known three.
    pub other: u64,
}

impl TaskCounts {
    fn tally(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut counts, status| {
            match status {
                TaskStatus::New => counts.new += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Other => counts.other += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounts {
    pub total: u64,
    pub not_delivered: u64,
    pub in_transit: u64,
    pub delivered: u64,
    pub other: u64,
}

impl DeliveryCounts {
    fn tally(statuses: impl IntoIterator<Item = DeliveryStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut counts, status| {
            counts.total += 1;
            match status {
                DeliveryStatus::NotDelivered => counts.not_delivered += 1,
                DeliveryStatus::InTransit => counts.in_transit += 1,
                DeliveryStatus::Delivered => counts.delivered += 1,
                DeliveryStatus::Other => counts.other += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManagerOverview {
    pub families: u64,
    pub assistance_types: u64,
    pub tasks: TaskCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeOverview {
    pub tasks: TaskCounts,
    pub deliveries: u64,
}

/// Home-screen statistics, shaped by the caller's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Overview {
    Admin(AdminOverview),
    Manager(ManagerOverview),
    Employee(EmployeeOverview),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub users: u64,
    pub families: u64,
    pub assistance_types: u64,
    pub deliveries: DeliveryCounts,
    pub inventory_quantity: i64,
}

#[derive(Deserialize)]
struct StatusOnly<S> {
    status: S,
}

#[derive(Deserialize)]
struct QuantityOnly {
    quantity: i64,
}

#[derive(Clone)]
pub struct Reports {
    store: Arc<dyn RowStore>,
}

impl Reports {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    async fn count(&self, actor: &Actor, entity: EntityKind) -> Result<u64, AppError> {
        Ok(self
            .store
            .count(&actor.access_token, entity.table(), &[])
            .await?)
    }

    async fn statuses<S: DeserializeOwned>(
        &self,
        actor: &Actor,
        entity: EntityKind,
        filters: Vec<Filter>,
    ) -> Result<Vec<S>, AppError> {
        let query = filters
            .into_iter()
            .fold(Query::table(entity.table()).columns(["status"]), Query::filter);
        let rows: Vec<StatusOnly<S>> =
            select_as(self.store.as_ref(), &actor.access_token, &query).await?;
        Ok(rows.into_iter().map(|row| row.status).collect())
    }

    pub async fn overview(&self, actor: &Actor) -> Result<Overview, AppError> {
        match actor.role() {
            Role::Admin => {
                let (users, families, assistance_types, regions) = futures::try_join!(
                    self.count(actor, EntityKind::Users),
                    self.count(actor, EntityKind::Families),
                    self.count(actor, EntityKind::AssistanceTypes),
                    self.count(actor, EntityKind::Regions),
                )?;
                let overview = AdminOverview {
                    users,
                    families,
                    assistance_types,
                    regions,
                };
                crate::metrics::record_totals(&[
                    (EntityKind::Users, users),
                    (EntityKind::Families, families),
                    (EntityKind::AssistanceTypes, assistance_types),
                    (EntityKind::Regions, regions),
                ]);
                Ok(Overview::Admin(overview))
            }
            Role::Manager => {
                let (families, assistance_types, tasks) = futures::try_join!(
                    self.count(actor, EntityKind::Families),
                    self.count(actor, EntityKind::AssistanceTypes),
                    self.statuses::<TaskStatus>(actor, EntityKind::Tasks, Vec::new()),
                )?;
                Ok(Overview::Manager(ManagerOverview {
                    families,
                    assistance_types,
                    tasks: TaskCounts::tally(tasks),
                }))
            }
            Role::Employee => {
                let me = actor.id().to_string();
                let (tasks, deliveries) = futures::try_join!(
                    self.statuses::<TaskStatus>(
                        actor,
                        EntityKind::Tasks,
                        vec![Filter::eq("assigned_to", me.clone())],
                    ),
                    async {
                        Ok::<_, AppError>(
                            self.store
                                .count(
                                    &actor.access_token,
                                    EntityKind::Deliveries.table(),
                                    &[Filter::eq("employee_id", me.clone())],
                                )
                                .await?,
                        )
                    },
                )?;
                Ok(Overview::Employee(EmployeeOverview {
                    tasks: TaskCounts::tally(tasks),
                    deliveries,
                }))
            }
        }
    }

    pub async fn report(&self, actor: &Actor) -> Result<Report, AppError> {
        policy::authorize_view(actor.role(), View::Reports)?;

        let inventory_query = Query::table(EntityKind::Inventory.table()).columns(["quantity"]);
        let (users, families, assistance_types, deliveries, quantities) = futures::try_join!(
            self.count(actor, EntityKind::Users),
            self.count(actor, EntityKind::Families),
            self.count(actor, EntityKind::AssistanceTypes),
            self.statuses::<DeliveryStatus>(actor, EntityKind::Deliveries, Vec::new()),
            async {
                let rows: Vec<QuantityOnly> =
                    select_as(self.store.as_ref(), &actor.access_token, &inventory_query).await?;
                Ok::<_, AppError>(rows)
            },
        )?;

        Ok(Report {
            users,
            families,
            assistance_types,
            deliveries: DeliveryCounts::tally(deliveries),
            inventory_quantity: quantities.iter().map(|row| row.quantity).sum(),
        })
    }
}
