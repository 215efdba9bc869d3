use std::sync::Arc;

use axum_test::{TestServer, TestServerConfig};
use chrono::{Duration, Utc};
use surrealdb::engine::any::connect;
use surrealdb::sql::{Datetime, Thing};
use uuid::Uuid;

use saas_server::config::AppConfig;
use saas_server::database::client::Database;
use saas_server::entities::billing::organization_entity::{Organization, OrganizationDbService};
use saas_server::entities::billing::plan_entity::{CurrencySymbol, PeriodUnit, Plan, PlanDbService};
use saas_server::entities::billing::subscription_entity::{Subscription, SubscriptionDbService};
use saas_server::entities::billing::transaction_entity::{Transaction, TransactionDbService};
use saas_server::entities::user_auth::local_user_entity::{LocalUser, LocalUserDbService};
use saas_server::middleware::ctx::Ctx;
use saas_server::middleware::mw_ctx::{create_ctx_state, CtxState, JWT_KEY};

async fn init_test_db() -> Database {
    let client = connect("mem://").await.unwrap();
    client
        .use_ns("namespace")
        .use_db("database")
        .await
        .unwrap();
    let db = Database { client };
    saas_server::init::run_migrations(&db)
        .await
        .expect("migrations run");
    db
}

#[allow(dead_code)]
pub async fn create_test_server() -> (TestServer, Arc<CtxState>) {
    let db = init_test_db().await;
    let config = AppConfig {
        db_namespace: "namespace".to_string(),
        db_database: "database".to_string(),
        db_password: None,
        db_username: None,
        db_url: "mem://".to_string(),
        jwt_secret: "test-secret".to_string(),
        is_development: true,
    };
    let ctx_state = create_ctx_state(db, &config);
    let routes_all = saas_server::init::main_router(&ctx_state);

    let server = TestServer::new_with_config(
        routes_all,
        TestServerConfig {
            transport: None,
            save_cookies: true,
            expect_success_by_default: false,
            restrict_requests_with_http_schema: false,
            default_content_type: None,
            default_scheme: None,
        },
    )
    .expect("Failed to create test server");

    (server, ctx_state)
}

#[allow(dead_code)]
pub fn system_ctx() -> Ctx {
    Ctx::new(Ok("test".to_string()), Uuid::new_v4(), false)
}

#[allow(dead_code)]
pub fn login_cookie(ctx_state: &CtxState, user: &Thing) -> String {
    let token = ctx_state
        .jwt
        .create_by_login(user.to_raw().as_str())
        .expect("login token");
    format!("{JWT_KEY}={token}")
}

#[allow(dead_code)]
pub async fn seed_user(ctx_state: &CtxState, username: &str, is_admin: bool) -> Thing {
    let ctx = system_ctx();
    LocalUserDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    }
    .create(LocalUser {
        id: None,
        username: username.to_string(),
        full_name: None,
        is_admin,
    })
    .await
    .expect("user created")
}

#[allow(dead_code)]
pub async fn seed_organization(ctx_state: &CtxState, slug: &str, managers: Vec<Thing>) -> Thing {
    let ctx = system_ctx();
    OrganizationDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    }
    .create(Organization {
        id: None,
        slug: slug.to_string(),
        full_name: slug.to_string(),
        managers,
        r_created: None,
    })
    .await
    .expect("organization created")
}

#[allow(dead_code)]
pub async fn seed_plan(ctx_state: &CtxState, organization: &Thing, slug: &str) -> Thing {
    let ctx = system_ctx();
    PlanDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    }
    .create(Plan {
        id: None,
        slug: slug.to_string(),
        title: slug.to_string(),
        organization: organization.clone(),
        period: PeriodUnit::Month,
        period_amount: 2900,
        currency: CurrencySymbol::USD,
        is_active: true,
    })
    .await
    .expect("plan created")
}

#[allow(dead_code)]
pub async fn seed_subscription(
    ctx_state: &CtxState,
    organization: &Thing,
    plan: &Thing,
    days_left: i64,
) -> Thing {
    let ctx = system_ctx();
    SubscriptionDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    }
    .create(Subscription {
        id: None,
        organization: organization.clone(),
        plan: plan.clone(),
        ends_at: Datetime::from(Utc::now() + Duration::days(days_left)),
        auto_renew: false,
        r_created: None,
    })
    .await
    .expect("subscription created")
}

#[allow(dead_code)]
pub async fn seed_transaction(
    ctx_state: &CtxState,
    orig: &Thing,
    dest: &Thing,
    descr: &str,
    event_id: Option<Thing>,
    charge: Option<String>,
) -> Thing {
    let ctx = system_ctx();
    TransactionDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    }
    .create(Transaction {
        id: None,
        orig_organization: orig.clone(),
        dest_organization: dest.clone(),
        descr: descr.to_string(),
        event_id,
        charge,
        amount: 2900,
        currency: CurrencySymbol::USD,
        r_created: None,
    })
    .await
    .expect("transaction created")
}
