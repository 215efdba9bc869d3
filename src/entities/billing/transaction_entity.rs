use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::{organization_entity, plan_entity::CurrencySymbol, subscription_entity};
use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{
    get_entity_view, with_not_found_err, IdentIdName, Pagination, QryOrder, RecordWithId,
    ViewFieldSelector,
};
use crate::routes::billing::billing_routes::TransactionView;

/// Ledger entry with a human readable description. The description is
/// produced by the recording side (utils::humanize) and re-parsed by the
/// describe template filter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub orig_organization: Thing,
    pub dest_organization: Thing,
    pub descr: String,
    /// subscription this entry was recorded for, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Thing>,
    /// processor charge identifier, when the entry settles a card charge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<String>,
    pub amount: i64,
    pub currency: CurrencySymbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<String>,
}

pub struct TransactionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "billing_transaction";
const ORG_TABLE: &str = organization_entity::TABLE_NAME;
const SUBSCRIPTION_TABLE: &str = subscription_entity::TABLE_NAME;

impl<'a> TransactionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let curr_usd = CurrencySymbol::USD.to_string();
        let curr_eur = CurrencySymbol::EUR.to_string();
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS orig_organization ON TABLE {TABLE_NAME} TYPE record<{ORG_TABLE}>;
    DEFINE FIELD IF NOT EXISTS dest_organization ON TABLE {TABLE_NAME} TYPE record<{ORG_TABLE}>;
    DEFINE FIELD IF NOT EXISTS descr ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS event_id ON TABLE {TABLE_NAME} TYPE option<record<{SUBSCRIPTION_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS charge ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS amount ON TABLE {TABLE_NAME} TYPE number;
    DEFINE FIELD IF NOT EXISTS currency ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['{curr_usd}','{curr_eur}'];
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS tx_dest_org_idx ON TABLE {TABLE_NAME} FIELDS dest_organization;
    DEFINE INDEX IF NOT EXISTS tx_charge_idx ON TABLE {TABLE_NAME} FIELDS charge;
    DEFINE INDEX IF NOT EXISTS tx_r_created_idx ON TABLE {TABLE_NAME} FIELDS r_created;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate billing_transaction");

        Ok(())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    /// Ledger entries where the organization is either side, newest first.
    pub async fn list_for_organization(
        &self,
        organization: &Thing,
        pagination: Option<Pagination>,
    ) -> CtxResult<Vec<TransactionView>> {
        let fields = TransactionView::get_select_query_fields();
        let (order_by, order_dir, count, start) = match pagination {
            Some(p) => (
                p.order_by.unwrap_or("r_created".to_string()),
                p.order_dir.unwrap_or(QryOrder::DESC),
                if p.count <= 0 { 20 } else { p.count },
                p.start.max(0),
            ),
            None => ("r_created".to_string(), QryOrder::DESC, 20, 0),
        };
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} \
             WHERE orig_organization=$organization OR dest_organization=$organization \
             ORDER BY {order_by} {order_dir} \
             LIMIT BY type::int($_limit_val) START AT type::int($_start_val);"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("organization", organization.clone()))
            .bind(("_limit_val", count.to_string()))
            .bind(("_start_val", start.to_string()))
            .await?;
        let res = res.take::<Vec<TransactionView>>(0)?;
        Ok(res)
    }

    /// Entries settling the given processor charge for the subscriber.
    pub async fn list_by_charge(
        &self,
        organization: &Thing,
        charge: &str,
    ) -> CtxResult<Vec<TransactionView>> {
        let fields = TransactionView::get_select_query_fields();
        let qry = format!(
            "SELECT {fields} FROM {TABLE_NAME} \
             WHERE dest_organization=$organization AND charge=$charge;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("organization", organization.clone()))
            .bind(("charge", charge.to_string()))
            .await?;
        let res = res.take::<Vec<TransactionView>>(0)?;
        Ok(res)
    }

    pub async fn create(&self, record: Transaction) -> CtxResult<Thing> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id)
            .map_err(CtxError::from(self.ctx))
    }
}
