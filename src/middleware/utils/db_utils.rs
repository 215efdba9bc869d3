use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use surrealdb::engine::any::Any as SurDb;
use surrealdb::method::Query;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, AppResult, CtxError, CtxResult};

#[derive(Serialize, Deserialize, Debug)]
pub struct RecordWithId {
    pub id: Thing,
}

pub enum IdentIdName {
    Id(Thing),
    ColumnIdent {
        column: String,
        val: String,
        rec: bool,
    },
    ColumnIdentAnd(Vec<IdentIdName>),
}

impl IdentIdName {
    pub fn get_bindings_map(&self) -> HashMap<String, String> {
        let mut bindings: HashMap<String, String> = HashMap::new();
        match self {
            IdentIdName::Id(id) => {
                bindings.insert("id".to_string(), id.to_raw());
                bindings
            }
            IdentIdName::ColumnIdent { val, column, .. } => {
                bindings.insert(column.clone(), val.clone());
                bindings
            }
            IdentIdName::ColumnIdentAnd(and_filters) => {
                and_filters.iter().fold(bindings, |mut acc, iin| {
                    acc.extend(iin.get_bindings_map());
                    acc
                })
            }
        }
    }
}

impl Display for IdentIdName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentIdName::Id(_) => f.write_str("<record>$id"),
            IdentIdName::ColumnIdent { column, rec, .. } => {
                let prefix = if *rec { "<record>" } else { "" };
                f.write_str(format!("{column}={prefix}${column}").as_str())
            }
            IdentIdName::ColumnIdentAnd(and_filters) => f.write_str(
                and_filters
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(" AND ")
                    .as_str(),
            ),
        }
    }
}

#[derive(Debug)]
pub struct QryBindingsVal<T: Serialize + 'static + Clone>(String, HashMap<String, T>);

impl<T: Serialize + 'static + Clone> QryBindingsVal<T> {
    pub fn new(qry: String, bindings: HashMap<String, T>) -> Self {
        QryBindingsVal(qry, bindings)
    }
    pub fn into_query(self, db: &Db) -> Query<SurDb> {
        self.1
            .into_iter()
            .fold(db.query(self.0), |qry, n_val| qry.bind(n_val))
    }
}

pub struct Pagination {
    pub order_by: Option<String>,
    pub order_dir: Option<QryOrder>,
    pub count: i8,
    pub start: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum QryOrder {
    DESC,
    ASC,
}

impl fmt::Display for QryOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QryOrder::DESC => write!(f, "DESC"),
            QryOrder::ASC => write!(f, "ASC"),
        }
    }
}

pub trait ViewFieldSelector {
    // select query fields to fill the View object
    fn get_select_query_fields() -> String;
}

pub fn get_entity_query_str(
    ident: &IdentIdName,
    select_fields_or_id: Option<&str>,
    table_name: String,
) -> Result<QryBindingsVal<String>, AppError> {
    let mut q_bindings: HashMap<String, String> = HashMap::new();

    let query_string = match ident {
        IdentIdName::Id(id) => {
            if id.to_raw().len() < 3 {
                return Err(AppError::Generic {
                    description: "IdentIdName::Id() value too short".to_string(),
                });
            }
            let fields = select_fields_or_id.unwrap_or("*");
            q_bindings.insert("id".to_string(), id.to_raw());

            format!("SELECT {fields} FROM <record>$id;")
        }

        _ => {
            let fields = select_fields_or_id.unwrap_or("id");
            q_bindings.extend(ident.get_bindings_map());
            q_bindings.insert("_table".to_string(), table_name);
            format!(
                "SELECT {fields} FROM type::table($_table) WHERE {};",
                ident.to_string()
            )
        }
    };
    Ok(QryBindingsVal::new(query_string, q_bindings))
}

pub async fn get_entity_view<T: for<'a> Deserialize<'a> + ViewFieldSelector>(
    db: &Db,
    table_name: String,
    ident: &IdentIdName,
) -> CtxResult<Option<T>> {
    let query_string = get_entity_query_str(
        ident,
        Some(T::get_select_query_fields().as_str()),
        table_name,
    )?;
    get_query(db, query_string).await
}

pub async fn get_query<T: for<'a> Deserialize<'a>>(
    db: &Db,
    query_string: QryBindingsVal<String>,
) -> Result<Option<T>, CtxError> {
    let mut res = create_db_qry(db, query_string).await?;
    let res = res.take::<Option<T>>(0)?;
    Ok(res)
}

pub fn create_db_qry(
    db: &Db,
    query_string: QryBindingsVal<String>,
) -> Query<surrealdb::engine::any::Any> {
    query_string.into_query(db)
}

pub async fn exists_entity(
    db: &Db,
    table_name: String,
    ident: &IdentIdName,
) -> CtxResult<Option<Thing>> {
    match ident {
        IdentIdName::Id(id) => {
            record_exists(db, id).await?;
            Ok(Some(id.clone()))
        }
        _ => {
            let query_string = get_entity_query_str(ident, None, table_name)?;
            let mut res = create_db_qry(db, query_string).await?;
            let res = res.take::<Option<RecordWithId>>(0)?;
            Ok(res.map(|rec| rec.id))
        }
    }
}

pub async fn record_exists(db: &Db, record_id: &Thing) -> AppResult<()> {
    let qry = "RETURN record::exists(<record>$rec_id);";
    let mut res = db.query(qry).bind(("rec_id", record_id.to_raw())).await?;
    let res: Option<bool> = res.take(0)?;
    match res.unwrap_or(false) {
        true => Ok(()),
        false => Err(AppError::EntityFailIdNotFound {
            ident: record_id.to_raw(),
        }),
    }
}

pub fn with_not_found_err<T>(opt: Option<T>, ctx: &Ctx, ident: &str) -> CtxResult<T> {
    match opt {
        None => Err(ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: ident.to_string(),
        })),
        Some(res) => Ok(res),
    }
}
