use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::AppError::EntityFailIdNotFound;
use crate::middleware::error::{AppError, CtxError, CtxResult};
use crate::middleware::utils::db_utils::{
    exists_entity, get_entity_view, with_not_found_err, IdentIdName, RecordWithId,
    ViewFieldSelector,
};
use crate::middleware::utils::string_utils::get_string_thing;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub is_admin: bool,
}

impl LocalUser {
    pub fn default(username: String) -> Self {
        LocalUser {
            id: None,
            username,
            full_name: None,
            is_admin: false,
        }
    }
}

/// Minimal user projection the permission checks work on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: Thing,
    pub is_admin: bool,
}

impl ViewFieldSelector for UserView {
    fn get_select_query_fields() -> String {
        "id, is_admin".to_string()
    }
}

pub struct LocalUserDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

pub const TABLE_NAME: &str = "local_user";

impl<'a> LocalUserDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS username ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value);
    DEFINE FIELD IF NOT EXISTS full_name ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS is_admin ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE INDEX IF NOT EXISTS local_user_username_idx ON TABLE {TABLE_NAME} COLUMNS username UNIQUE;
");
        let local_user_mutation = self.db.query(sql).await?;
        local_user_mutation
            .check()
            .expect("should mutate local_user");

        Ok(())
    }

    pub async fn get_ctx_user_thing(&self) -> CtxResult<Thing> {
        let created_by = self.ctx.user_id()?;
        let user_id = get_string_thing(created_by.clone())?;
        let existing_id = self.exists(IdentIdName::Id(user_id.clone())).await?;
        match existing_id {
            None => Err(self
                .ctx
                .to_ctx_error(EntityFailIdNotFound { ident: created_by })),
            Some(_uid) => Ok(user_id),
        }
    }

    pub async fn get_ctx_user_view(&self) -> CtxResult<UserView> {
        let user_id = self.get_ctx_user_thing().await?;
        self.get_view::<UserView>(IdentIdName::Id(user_id)).await
    }

    pub async fn exists(&self, ident: IdentIdName) -> CtxResult<Option<String>> {
        exists_entity(self.db, TABLE_NAME.to_string(), &ident)
            .await
            .map(|r| r.map(|o| o.to_raw()))
    }

    pub async fn get_view<T: for<'b> Deserialize<'b> + ViewFieldSelector>(
        &self,
        ident_id_name: IdentIdName,
    ) -> CtxResult<T> {
        let opt = get_entity_view::<T>(self.db, TABLE_NAME.to_string(), &ident_id_name).await?;
        with_not_found_err(opt, self.ctx, ident_id_name.to_string().as_str())
    }

    pub async fn create(&self, ct_input: LocalUser) -> CtxResult<Thing> {
        self.db
            .create(TABLE_NAME)
            .content(ct_input)
            .await
            .map(|v: Option<RecordWithId>| v.unwrap().id)
            .map_err(CtxError::from(self.ctx))
    }
}
