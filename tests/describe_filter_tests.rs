use surrealdb::sql::Thing;

use saas_server::entities::billing::organization_entity::OrganizationRefView;
use saas_server::entities::billing::plan_entity::CurrencySymbol;
use saas_server::routes::billing::billing_routes::TransactionView;
use saas_server::utils::askama_filter_util::filters::describe;
use saas_server::utils::humanize::{describe_balance, describe_buy_periods};

fn org_ref(slug: &str) -> OrganizationRefView {
    OrganizationRefView {
        id: Thing::from(("organization", slug)),
        slug: slug.to_string(),
    }
}

fn transaction(provider: &str, subscriber: &str, descr: &str) -> TransactionView {
    TransactionView {
        id: Thing::from(("billing_transaction", "tx1")),
        orig_organization: org_ref(provider),
        dest_organization: org_ref(subscriber),
        descr: descr.to_string(),
        event_id: None,
        charge: None,
        amount: 2900,
        currency: CurrencySymbol::USD,
        r_created: "2026-08-01T00:00:00Z".to_string(),
    }
}

#[test]
fn buy_periods_description_links_to_plan_app() {
    let descr = describe_buy_periods("basic", "2026-09-01", "1 month");
    let tx = transaction("cowork", "xia", &descr);
    let html = describe(&tx).unwrap();
    assert_eq!(
        html,
        "Subscription to <a href=\"/cowork/app/xia/basic/\">basic</a> until 2026-09-01 (1 month)"
    );
}

#[test]
fn balance_description_links_to_plan_app() {
    let descr = describe_balance("premium");
    let tx = transaction("cowork", "xia", &descr);
    let html = describe(&tx).unwrap();
    assert_eq!(
        html,
        "Balance due for <a href=\"/cowork/app/xia/premium/\">premium</a>"
    );
}

#[test]
fn unlock_descriptions_link_to_plan_app() {
    let tx = transaction(
        "cowork",
        "xia",
        "Unlock open-space now. Don't worry later to activate.",
    );
    let html = describe(&tx).unwrap();
    assert!(html.contains("<a href=\"/cowork/app/xia/open-space/\">open-space</a>"));

    let tx = transaction(
        "cowork",
        "xia",
        "Access open-space Today. Pay $29.00 later to activate.",
    );
    let html = describe(&tx).unwrap();
    assert!(html.contains("<a href=\"/cowork/app/xia/open-space/\">open-space</a>"));
}

#[test]
fn plan_token_is_linked_at_every_occurrence() {
    let tx = transaction(
        "cowork",
        "xia",
        "Subscription to basic until 2026-09-01 (basic periods)",
    );
    let html = describe(&tx).unwrap();
    assert_eq!(
        html,
        "Subscription to <a href=\"/cowork/app/xia/basic/\">basic</a> until 2026-09-01 \
         (<a href=\"/cowork/app/xia/basic/\">basic</a> periods)"
    );
}

#[test]
fn charge_description_links_to_receipt() {
    let tx = transaction("cowork", "xia", "Charge ch_123 failed");
    let html = describe(&tx).unwrap();
    assert_eq!(
        html,
        "Charge <a href=\"/billing/xia/receipt/ch_123\">ch_123</a> failed"
    );
}

#[test]
fn charge_must_start_the_description() {
    let tx = transaction("cowork", "xia", "Refund of Charge ch_123");
    let html = describe(&tx).unwrap();
    assert_eq!(html, "Refund of Charge ch_123");
}

#[test]
fn unmatched_description_passes_through_verbatim() {
    let tx = transaction("cowork", "xia", "Manual adjustment after audit");
    let html = describe(&tx).unwrap();
    assert_eq!(html, "Manual adjustment after audit");
}

#[test]
fn description_markup_is_escaped() {
    let tx = transaction("cowork", "xia", "Manual <script>alert(1)</script>");
    let html = describe(&tx).unwrap();
    assert_eq!(html, "Manual &lt;script&gt;alert(1)&lt;/script&gt;");
}
