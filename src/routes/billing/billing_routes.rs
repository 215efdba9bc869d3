use std::sync::Arc;

use askama_axum::Template;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

use crate::access::organization::valid_manager_for_organization;
use crate::entities::billing::organization_entity::{
    OrganizationDbService, OrganizationManagersView, OrganizationRefView,
};
use crate::entities::billing::plan_entity::{CurrencySymbol, PlanDbService, PlanDetailView};
use crate::entities::billing::subscription_entity::SubscriptionDbService;
use crate::entities::billing::transaction_entity::{Transaction, TransactionDbService};
use crate::entities::user_auth::local_user_entity::{LocalUserDbService, UserView};
use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, CtxResult};
use crate::middleware::mw_ctx::CtxState;
use crate::middleware::utils::db_utils::{IdentIdName, Pagination, QryOrder, ViewFieldSelector};
use crate::middleware::utils::extractor_utils::{HistoryParams, JsonOrFormValidated};
use crate::middleware::utils::string_utils::get_str_thing;
use crate::utils::askama_filter_util::filters;
use crate::utils::humanize::describe_refund;

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route(
            "/api/billing/:organization/history",
            get(get_transaction_history),
        )
        .route(
            "/api/billing/:organization/subscriptions",
            get(get_active_subscriptions),
        )
        .route("/billing/:organization/receipt/:charge", get(get_charge_receipt))
        .route("/:provider/app/:subscriber/:plan", get(get_plan_app))
        // describe links carry a trailing slash
        .route("/:provider/app/:subscriber/:plan/", get(get_plan_app))
        .route("/api/billing/refund", post(refund))
}

/// Location of the printable receipt for a processor charge, relative to
/// the subscriber that was charged.
pub fn charge_receipt_uri(subscriber_slug: &str, charge: &str) -> String {
    format!("/billing/{subscriber_slug}/receipt/{charge}")
}

/// Requesting user together with the organization whose pages are being
/// rendered, the inputs the manager checks in templates run on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestUserView {
    pub user: UserView,
    pub client: OrganizationManagersView,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionPlanView {
    pub id: Thing,
    pub slug: String,
    pub organization: OrganizationRefView,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub id: Thing,
    pub ends_at: String,
    pub organization: OrganizationRefView,
    pub plan: SubscriptionPlanView,
}

impl ViewFieldSelector for SubscriptionView {
    fn get_select_query_fields() -> String {
        "id, ends_at, organization.{id, slug}, plan.{id, slug, organization.{id, slug}}"
            .to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionEventPlanView {
    pub id: Thing,
    pub slug: String,
    pub organization: OrganizationManagersView,
}

/// Subscription a ledger entry was recorded for, loaded deep enough to
/// run the refund permission check without another query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscriptionEventView {
    pub id: Thing,
    pub plan: SubscriptionEventPlanView,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: Thing,
    pub orig_organization: OrganizationRefView,
    pub dest_organization: OrganizationRefView,
    pub descr: String,
    pub event_id: Option<SubscriptionEventView>,
    pub charge: Option<String>,
    pub amount: i64,
    pub currency: CurrencySymbol,
    pub r_created: String,
}

impl ViewFieldSelector for TransactionView {
    fn get_select_query_fields() -> String {
        "id, descr, amount, currency, charge, r_created, \
         orig_organization.{id, slug}, dest_organization.{id, slug}, \
         event_id.{id, plan.{id, slug, organization.{id, slug, managers}}}"
            .to_string()
    }
}

#[derive(Template, Serialize, Deserialize)]
#[template(path = "billing/transaction_history.html")]
pub struct TransactionHistoryView {
    pub request: RequestUserView,
    pub provider_org: Option<OrganizationManagersView>,
    pub subscriptions: Vec<SubscriptionView>,
    pub transactions: Vec<TransactionView>,
}

#[derive(Template, Serialize, Deserialize)]
#[template(path = "billing/charge_receipt.html")]
pub struct ChargeReceiptView {
    pub request: RequestUserView,
    pub charge: String,
    pub transactions: Vec<TransactionView>,
}

#[derive(Template, Serialize, Deserialize)]
#[template(path = "billing/plan_app.html")]
pub struct PlanAppView {
    pub provider: OrganizationManagersView,
    pub subscriber: OrganizationRefView,
    pub plan: PlanDetailView,
    pub subscriptions: Vec<SubscriptionView>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RefundInput {
    #[validate(length(min = 3, message = "Min 3 characters"))]
    pub transaction_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefundResponse {
    pub id: Thing,
    pub descr: String,
}

async fn get_transaction_history(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(organization): Path<String>,
    Query(params): Query<HistoryParams>,
) -> CtxResult<Html<String>> {
    let db = &ctx_state.db.client;
    let user = LocalUserDbService { db, ctx: &ctx }
        .get_ctx_user_view()
        .await?;
    let org_service = OrganizationDbService { db, ctx: &ctx };
    let client: OrganizationManagersView = org_service
        .get_view(OrganizationDbService::slug_ident(&organization))
        .await?;
    valid_manager_for_organization(&user, &client).map_err(|e| ctx.to_ctx_error(e))?;

    let provider_org = match &params.provider {
        Some(slug) => Some(
            org_service
                .get_view::<OrganizationManagersView>(OrganizationDbService::slug_ident(slug))
                .await?,
        ),
        None => None,
    };

    let subscriptions = SubscriptionDbService { db, ctx: &ctx }
        .active_for_organization(&client.id)
        .await?;
    let transactions = TransactionDbService { db, ctx: &ctx }
        .list_for_organization(
            &client.id,
            Some(Pagination {
                order_by: Some("r_created".to_string()),
                order_dir: Some(QryOrder::DESC),
                count: params.count.unwrap_or(20),
                start: params.start.unwrap_or(0),
            }),
        )
        .await?;

    ctx.to_htmx_or_json(TransactionHistoryView {
        request: RequestUserView { user, client },
        provider_org,
        subscriptions,
        transactions,
    })
}

async fn get_active_subscriptions(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(organization): Path<String>,
    Query(params): Query<HistoryParams>,
) -> CtxResult<Json<Vec<SubscriptionView>>> {
    let db = &ctx_state.db.client;
    let user = LocalUserDbService { db, ctx: &ctx }
        .get_ctx_user_view()
        .await?;
    let org_service = OrganizationDbService { db, ctx: &ctx };
    let client: OrganizationManagersView = org_service
        .get_view(OrganizationDbService::slug_ident(&organization))
        .await?;
    valid_manager_for_organization(&user, &client).map_err(|e| ctx.to_ctx_error(e))?;

    let provider_slug = params.provider.ok_or(ctx.to_ctx_error(AppError::Generic {
        description: "Missing provider query param".to_string(),
    }))?;
    let provider: OrganizationRefView = org_service
        .get_view(OrganizationDbService::slug_ident(&provider_slug))
        .await?;

    let subscriptions = SubscriptionDbService { db, ctx: &ctx }
        .active_with_provider(&client.id, &provider.id)
        .await?;
    Ok(Json(subscriptions))
}

async fn get_charge_receipt(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path((organization, charge)): Path<(String, String)>,
) -> CtxResult<ChargeReceiptView> {
    let db = &ctx_state.db.client;
    let user = LocalUserDbService { db, ctx: &ctx }
        .get_ctx_user_view()
        .await?;
    let client: OrganizationManagersView = OrganizationDbService { db, ctx: &ctx }
        .get_view(OrganizationDbService::slug_ident(&organization))
        .await?;
    valid_manager_for_organization(&user, &client).map_err(|e| ctx.to_ctx_error(e))?;

    let transactions = TransactionDbService { db, ctx: &ctx }
        .list_by_charge(&client.id, &charge)
        .await?;
    if transactions.is_empty() {
        return Err(ctx.to_ctx_error(AppError::EntityFailIdNotFound {
            ident: charge.clone(),
        }));
    }

    Ok(ChargeReceiptView {
        request: RequestUserView { user, client },
        charge,
        transactions,
    })
}

async fn get_plan_app(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path((provider, subscriber, plan)): Path<(String, String, String)>,
) -> CtxResult<PlanAppView> {
    let db = &ctx_state.db.client;
    LocalUserDbService { db, ctx: &ctx }
        .get_ctx_user_thing()
        .await?;
    let org_service = OrganizationDbService { db, ctx: &ctx };
    let provider: OrganizationManagersView = org_service
        .get_view(OrganizationDbService::slug_ident(&provider))
        .await?;
    let subscriber: OrganizationRefView = org_service
        .get_view(OrganizationDbService::slug_ident(&subscriber))
        .await?;
    let plan: PlanDetailView = PlanDbService { db, ctx: &ctx }
        .get_view_by_provider_slug(&provider.id, &plan)
        .await?;
    let subscriptions = SubscriptionDbService { db, ctx: &ctx }
        .active_with_provider(&subscriber.id, &provider.id)
        .await?;

    Ok(PlanAppView {
        provider,
        subscriber,
        plan,
        subscriptions,
    })
}

/// Records the reversing ledger entry for a subscription payment. Allowed
/// to managers of the organization providing the subscribed plan.
async fn refund(
    State(ctx_state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(input): JsonOrFormValidated<RefundInput>,
) -> CtxResult<Json<RefundResponse>> {
    let db = &ctx_state.db.client;
    let user = LocalUserDbService { db, ctx: &ctx }
        .get_ctx_user_view()
        .await?;

    let tx_thing = get_str_thing(&input.transaction_id)?;
    let tx_service = TransactionDbService { db, ctx: &ctx };
    let transaction: TransactionView = tx_service
        .get_view(IdentIdName::Id(tx_thing))
        .await?;

    let subscription = transaction
        .event_id
        .as_ref()
        .ok_or(ctx.to_ctx_error(AppError::Generic {
            description: "Transaction is not refundable".to_string(),
        }))?;
    valid_manager_for_organization(&user, &subscription.plan.organization)
        .map_err(|e| ctx.to_ctx_error(e))?;

    let descr = describe_refund(&transaction.descr);
    let refund_id = tx_service
        .create(Transaction {
            id: None,
            orig_organization: transaction.dest_organization.id.clone(),
            dest_organization: transaction.orig_organization.id.clone(),
            descr: descr.clone(),
            event_id: Some(subscription.id.clone()),
            charge: transaction.charge.clone(),
            amount: transaction.amount,
            currency: transaction.currency.clone(),
            r_created: None,
        })
        .await?;

    Ok(Json(RefundResponse {
        id: refund_id,
        descr,
    }))
}
