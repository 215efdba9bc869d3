use surrealdb::sql::Thing;

use saas_server::entities::billing::organization_entity::{
    OrganizationManagersView, OrganizationRefView,
};
use saas_server::entities::billing::plan_entity::CurrencySymbol;
use saas_server::entities::user_auth::local_user_entity::UserView;
use saas_server::routes::billing::billing_routes::{
    RequestUserView, SubscriptionEventPlanView, SubscriptionEventView, TransactionView,
};
use saas_server::utils::askama_filter_util::filters::{is_manager, refund_enable};

fn user(ident: &str, is_admin: bool) -> UserView {
    UserView {
        id: Thing::from(("local_user", ident)),
        is_admin,
    }
}

fn org(slug: &str, managers: Vec<Thing>) -> OrganizationManagersView {
    OrganizationManagersView {
        id: Thing::from(("organization", slug)),
        slug: slug.to_string(),
        managers,
    }
}

fn request_for(user: UserView, client: OrganizationManagersView) -> RequestUserView {
    RequestUserView { user, client }
}

fn subscription_transaction(provider_org: OrganizationManagersView) -> TransactionView {
    TransactionView {
        id: Thing::from(("billing_transaction", "tx1")),
        orig_organization: OrganizationRefView {
            id: provider_org.id.clone(),
            slug: provider_org.slug.clone(),
        },
        dest_organization: OrganizationRefView {
            id: Thing::from(("organization", "xia")),
            slug: "xia".to_string(),
        },
        descr: "Subscription to basic until 2026-09-01 (1 month)".to_string(),
        event_id: Some(SubscriptionEventView {
            id: Thing::from(("subscription", "sub1")),
            plan: SubscriptionEventPlanView {
                id: Thing::from(("plan", "basic")),
                slug: "basic".to_string(),
                organization: provider_org,
            },
        }),
        charge: None,
        amount: 2900,
        currency: CurrencySymbol::USD,
        r_created: "2026-08-01T00:00:00Z".to_string(),
    }
}

#[test]
fn is_manager_defaults_to_request_client() {
    let alice = user("alice", false);
    let request = request_for(alice.clone(), org("xia", vec![alice.id.clone()]));
    assert!(is_manager(&request, &None).unwrap());

    let request = request_for(user("mallory", false), org("xia", vec![alice.id]));
    assert!(!is_manager(&request, &None).unwrap());
}

#[test]
fn is_manager_checks_given_organization() {
    let alice = user("alice", false);
    let request = request_for(alice.clone(), org("xia", vec![alice.id.clone()]));
    assert!(!is_manager(&request, &Some(org("cowork", vec![]))).unwrap());
    assert!(is_manager(&request, &Some(org("cowork", vec![alice.id]))).unwrap());
}

#[test]
fn is_manager_accepts_platform_admin() {
    let root = user("root", true);
    let request = request_for(root, org("xia", vec![]));
    assert!(is_manager(&request, &Some(org("cowork", vec![]))).unwrap());
}

#[test]
fn refund_enable_requires_provider_manager() {
    let alice = user("alice", false);
    let tx = subscription_transaction(org("cowork", vec![alice.id.clone()]));
    assert!(refund_enable(&tx, &alice).unwrap());
    assert!(!refund_enable(&tx, &user("mallory", false)).unwrap());
    assert!(refund_enable(&tx, &user("root", true)).unwrap());
}

#[test]
fn refund_enable_is_false_without_subscription_event() {
    let alice = user("alice", false);
    let mut tx = subscription_transaction(org("cowork", vec![alice.id.clone()]));
    tx.event_id = None;
    assert!(!refund_enable(&tx, &alice).unwrap());
}
