use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use super::{organization_entity, plan_entity};
use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{RecordWithId, ViewFieldSelector};
use crate::routes::billing::billing_routes::SubscriptionView;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    /// subscriber organization
    pub organization: Thing,
    pub plan: Thing,
    pub ends_at: Datetime,
    pub auto_renew: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<String>,
}

pub struct SubscriptionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "subscription";
const ORG_TABLE: &str = organization_entity::TABLE_NAME;
const PLAN_TABLE: &str = plan_entity::TABLE_NAME;

impl<'a> SubscriptionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS organization ON TABLE {TABLE_NAME} TYPE record<{ORG_TABLE}>;
    DEFINE FIELD IF NOT EXISTS plan ON TABLE {TABLE_NAME} TYPE record<{PLAN_TABLE}>;
    DEFINE FIELD IF NOT EXISTS ends_at ON TABLE {TABLE_NAME} TYPE datetime;
    DEFINE FIELD IF NOT EXISTS auto_renew ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS subscription_org_idx ON TABLE {TABLE_NAME} COLUMNS organization;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate subscription");

        Ok(())
    }

    /// Active subscriptions of `organization` whose plan is owned by `provider`,
    /// exactly as stored.
    pub async fn active_with_provider(
        &self,
        organization: &Thing,
        provider: &Thing,
    ) -> CtxResult<Vec<SubscriptionView>> {
        let fields = SubscriptionView::get_select_query_fields();
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} \
             WHERE organization=$organization AND plan.organization=$provider \
             AND ends_at > time::now();"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("organization", organization.clone()))
            .bind(("provider", provider.clone()))
            .await?;
        let res = res.take::<Vec<SubscriptionView>>(0)?;
        Ok(res)
    }

    /// All non-expired subscriptions of the organization.
    pub async fn active_for_organization(
        &self,
        organization: &Thing,
    ) -> CtxResult<Vec<SubscriptionView>> {
        let fields = SubscriptionView::get_select_query_fields();
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} \
             WHERE organization=$organization AND ends_at > time::now();"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("organization", organization.clone()))
            .await?;
        let res = res.take::<Vec<SubscriptionView>>(0)?;
        Ok(res)
    }

    pub async fn create(&self, record: Subscription) -> CtxResult<Thing> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id)
            .map_err(CtxError::from(self.ctx))
    }
}
