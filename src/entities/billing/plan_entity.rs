use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::Thing;

use super::organization_entity;
use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{
    get_entity_view, with_not_found_err, IdentIdName, RecordWithId, ViewFieldSelector,
};

#[derive(Clone, Debug, Display, Serialize, Deserialize, PartialEq, Eq)]
pub enum CurrencySymbol {
    USD,
    EUR,
}

#[derive(Clone, Debug, Display, Serialize, Deserialize, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Month,
    Year,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub slug: String,
    pub title: String,
    /// provider organization owning this plan
    pub organization: Thing,
    pub period: PeriodUnit,
    pub period_amount: i64,
    pub currency: CurrencySymbol,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDetailView {
    pub id: Thing,
    pub slug: String,
    pub title: String,
    pub organization: organization_entity::OrganizationRefView,
    pub period: PeriodUnit,
    pub period_amount: i64,
    pub currency: CurrencySymbol,
}

impl ViewFieldSelector for PlanDetailView {
    fn get_select_query_fields() -> String {
        "id, slug, title, organization.{id, slug}, period, period_amount, currency".to_string()
    }
}

pub struct PlanDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "plan";
const ORG_TABLE: &str = organization_entity::TABLE_NAME;

impl<'a> PlanDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let curr_usd = CurrencySymbol::USD.to_string();
        let curr_eur = CurrencySymbol::EUR.to_string();
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS slug ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value);
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS organization ON TABLE {TABLE_NAME} TYPE record<{ORG_TABLE}>;
    DEFINE FIELD IF NOT EXISTS period ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['month','year'];
    DEFINE FIELD IF NOT EXISTS period_amount ON TABLE {TABLE_NAME} TYPE number;
    DEFINE FIELD IF NOT EXISTS currency ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['{curr_usd}','{curr_eur}'];
    DEFINE FIELD IF NOT EXISTS is_active ON TABLE {TABLE_NAME} TYPE bool DEFAULT true;
    DEFINE INDEX IF NOT EXISTS plan_org_slug_idx ON TABLE {TABLE_NAME} COLUMNS organization, slug UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate plan");

        Ok(())
    }

    /// Plan lookup scoped to its provider, used by the plan app page.
    pub async fn get_view_by_provider_slug<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        provider: &Thing,
        slug: &str,
    ) -> CtxResult<T> {
        let ident = IdentIdName::ColumnIdentAnd(vec![
            IdentIdName::ColumnIdent {
                column: "organization".to_string(),
                val: provider.to_raw(),
                rec: true,
            },
            IdentIdName::ColumnIdent {
                column: "slug".to_string(),
                val: slug.to_string(),
                rec: false,
            },
        ]);
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn create(&self, record: Plan) -> CtxResult<Thing> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id)
            .map_err(CtxError::from(self.ctx))
    }
}
