pub mod filters {
    use crate::access::organization::valid_manager_for_organization;
    use crate::entities::billing::organization_entity::OrganizationManagersView;
    use crate::entities::user_auth::local_user_entity::UserView;
    use crate::middleware::error::AppError;
    use crate::routes::billing::billing_routes::{
        charge_receipt_uri, RequestUserView, SubscriptionView, TransactionView,
    };
    use crate::utils::humanize::{
        BALANCE_MATCH, BUY_PERIODS_MATCH, CHARGE_MATCH, UNLOCK_LATER_MATCH, UNLOCK_NOW_MATCH,
    };

    pub fn display_some<T: std::fmt::Display>(value: &Option<T>) -> ::askama::Result<String> {
        Ok(match value {
            Some(value) => value.to_string(),
            None => String::new(),
        })
    }

    /// True when the requesting user manages the given organization, the
    /// request's client organization when none is given. Only a permission
    /// denial becomes false, other errors fail the render.
    pub fn is_manager(
        request: &RequestUserView,
        organization: &Option<OrganizationManagersView>,
    ) -> ::askama::Result<bool> {
        let organization = organization.as_ref().unwrap_or(&request.client);
        match valid_manager_for_organization(&request.user, organization) {
            Ok(()) => Ok(true),
            Err(AppError::AuthorizationFail { .. }) => Ok(false),
            Err(err) => Err(::askama::Error::Custom(Box::new(err))),
        }
    }

    /// Narrows a loaded active-subscription list to the plans owned by
    /// `provider`, the in-template side of
    /// `SubscriptionDbService::active_with_provider`.
    pub fn active_with_provider<'a>(
        subscriptions: &'a [SubscriptionView],
        provider: &OrganizationManagersView,
    ) -> ::askama::Result<Vec<&'a SubscriptionView>> {
        Ok(subscriptions
            .iter()
            .filter(|sub| sub.plan.organization.id == provider.id)
            .collect())
    }

    /// Re-inserts hyperlinks into a ledger description. Plan descriptions
    /// link to the plan app page of the subscriber, charge descriptions to
    /// the charge receipt. Unrecognized descriptions pass through verbatim.
    /// The caller renders the result with |safe; description text is
    /// escaped here before the anchor is spliced in.
    pub fn describe(transaction: &TransactionView) -> ::askama::Result<String> {
        let provider = &transaction.orig_organization.slug;
        let subscriber = &transaction.dest_organization.slug;
        let descr = transaction.descr.as_str();

        let plan_patterns = [
            &BUY_PERIODS_MATCH,
            &UNLOCK_NOW_MATCH,
            &UNLOCK_LATER_MATCH,
            &BALANCE_MATCH,
        ];
        for pattern in plan_patterns {
            if let Some(caps) = pattern.captures(descr) {
                let plan = &caps["plan"];
                let link = format!(
                    "<a href=\"/{provider}/app/{subscriber}/{plan}/\">{plan}</a>",
                    plan = escape_text(plan)
                );
                return Ok(escape_text(descr).replace(&escape_text(plan), &link));
            }
        }

        if let Some(caps) = CHARGE_MATCH.captures(descr) {
            let charge = &caps["charge"];
            let link = format!(
                "<a href=\"{}\">{}</a>",
                charge_receipt_uri(subscriber, charge),
                escape_text(charge)
            );
            return Ok(escape_text(descr).replace(&escape_text(charge), &link));
        }

        Ok(escape_text(descr))
    }

    /// True when `user` may trigger a refund for the transaction, i.e. the
    /// transaction resolves to a subscription and the user manages the
    /// organization owning its plan.
    pub fn refund_enable(
        transaction: &TransactionView,
        user: &UserView,
    ) -> ::askama::Result<bool> {
        let Some(subscription) = &transaction.event_id else {
            return Ok(false);
        };
        match valid_manager_for_organization(user, &subscription.plan.organization) {
            Ok(()) => Ok(true),
            Err(AppError::AuthorizationFail { .. }) => Ok(false),
            Err(err) => Err(::askama::Error::Custom(Box::new(err))),
        }
    }

    fn escape_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(c),
            }
        }
        out
    }
}
