use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{
    get_entity_view, with_not_found_err, IdentIdName, RecordWithId, ViewFieldSelector,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub slug: String,
    pub full_name: String,
    /// users allowed to manage billing for this organization
    pub managers: Vec<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrganizationRefView {
    pub id: Thing,
    pub slug: String,
}

impl ViewFieldSelector for OrganizationRefView {
    fn get_select_query_fields() -> String {
        "id, slug".to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrganizationManagersView {
    pub id: Thing,
    pub slug: String,
    pub managers: Vec<Thing>,
}

impl ViewFieldSelector for OrganizationManagersView {
    fn get_select_query_fields() -> String {
        "id, slug, managers".to_string()
    }
}

pub struct OrganizationDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "organization";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;

impl<'a> OrganizationDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS slug ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value);
    DEFINE FIELD IF NOT EXISTS full_name ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS managers ON TABLE {TABLE_NAME} TYPE set<record<{USER_TABLE}>> DEFAULT [];
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS organization_slug_idx ON TABLE {TABLE_NAME} COLUMNS slug UNIQUE;
");
        let mutation = self.db.query(sql).await?;
        mutation.check().expect("should mutate organization");

        Ok(())
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident).await?;
        with_not_found_err(opt, self.ctx, ident.to_string().as_str())
    }

    pub async fn create(&self, record: Organization) -> CtxResult<Thing> {
        self.db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id)
            .map_err(CtxError::from(self.ctx))
    }

    pub fn slug_ident(slug: &str) -> IdentIdName {
        IdentIdName::ColumnIdent {
            column: "slug".to_string(),
            val: slug.to_string(),
            rec: false,
        }
    }
}
