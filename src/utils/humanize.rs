use once_cell::sync::Lazy;
use regex::Regex;

use crate::entities::billing::plan_entity::PeriodUnit;

// Description templates shared by the recording side and the describe
// filter. Placeholders use the %(name)s form so the same template can be
// filled with text or compiled into a match regex.
pub const DESCRIBE_BALANCE: &str = "Balance due for %(plan)s";
pub const DESCRIBE_BUY_PERIODS: &str =
    "Subscription to %(plan)s until %(ends_at)s (%(humanized_periods)s)";
pub const DESCRIBE_UNLOCK_NOW: &str = "Unlock %(plan)s now. Don't worry later to %(unlock_event)s.";
pub const DESCRIBE_UNLOCK_LATER: &str =
    "Access %(plan)s Today. Pay %(amount)s later to %(unlock_event)s.";
pub const DESCRIBE_REFUND: &str = "Refund of %(descr)s";

const PLAN_GROUP: &str = r"(?P<plan>\S+)";

// DESCRIBE_CHARGED_CARD variants are crafted to start with "Charge ...".
pub static CHARGE_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Charge (?P<charge>\S+)").expect("valid charge pattern"));

pub static BUY_PERIODS_MATCH: Lazy<Regex> =
    Lazy::new(|| match_regex(DESCRIBE_BUY_PERIODS, &[("plan", PLAN_GROUP)]));
pub static UNLOCK_NOW_MATCH: Lazy<Regex> =
    Lazy::new(|| match_regex(DESCRIBE_UNLOCK_NOW, &[("plan", PLAN_GROUP)]));
pub static UNLOCK_LATER_MATCH: Lazy<Regex> =
    Lazy::new(|| match_regex(DESCRIBE_UNLOCK_LATER, &[("plan", PLAN_GROUP)]));
pub static BALANCE_MATCH: Lazy<Regex> =
    Lazy::new(|| match_regex(DESCRIBE_BALANCE, &[("plan", PLAN_GROUP)]));

/// Compiles a description template into a regex anchored at the start.
/// Literal text is escaped, named placeholders become the given fragment
/// or a `.*` wildcard when not listed.
fn match_regex(template: &str, groups: &[(&str, &str)]) -> Regex {
    let mut pattern = String::from("^");
    let mut rest = template;
    while let Some(start) = rest.find("%(") {
        pattern.push_str(&regex::escape(&rest[..start]));
        let after = &rest[start + 2..];
        let end = after.find(")s").expect("unterminated template placeholder");
        let name = &after[..end];
        let fragment = groups
            .iter()
            .find(|g| g.0 == name)
            .map(|g| g.1)
            .unwrap_or(".*");
        pattern.push_str(fragment);
        rest = &after[end + 2..];
    }
    pattern.push_str(&regex::escape(rest));
    Regex::new(&pattern).expect("valid description pattern")
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (name, val)| {
        acc.replace(&format!("%({name})s"), val)
    })
}

pub fn humanized_periods(nb_periods: i64, period: &PeriodUnit) -> String {
    match nb_periods {
        1 => format!("1 {period}"),
        n => format!("{n} {period}s"),
    }
}

pub fn describe_buy_periods(plan_slug: &str, ends_at: &str, periods: &str) -> String {
    fill(
        DESCRIBE_BUY_PERIODS,
        &[
            ("plan", plan_slug),
            ("ends_at", ends_at),
            ("humanized_periods", periods),
        ],
    )
}

pub fn describe_balance(plan_slug: &str) -> String {
    fill(DESCRIBE_BALANCE, &[("plan", plan_slug)])
}

pub fn describe_refund(descr: &str) -> String {
    fill(DESCRIBE_REFUND, &[("descr", descr)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_periods_round_trips_through_its_regex() {
        let descr = describe_buy_periods("basic", "2026-09-01", "1 month");
        assert_eq!(
            descr,
            "Subscription to basic until 2026-09-01 (1 month)"
        );
        let caps = BUY_PERIODS_MATCH.captures(&descr).expect("should match");
        assert_eq!(&caps["plan"], "basic");
    }

    #[test]
    fn literal_text_is_escaped_in_match_regex() {
        // the trailing dot of the unlock templates must not act as a wildcard
        assert!(!UNLOCK_NOW_MATCH.is_match("Unlock basic now! Don't worry later to activateX"));
        assert!(UNLOCK_NOW_MATCH.is_match("Unlock basic now. Don't worry later to activate."));
    }

    #[test]
    fn balance_matches_only_from_start() {
        assert!(BALANCE_MATCH.is_match("Balance due for premium"));
        assert!(!BALANCE_MATCH.is_match("Monthly Balance due for premium"));
    }

    #[test]
    fn charge_pattern_extracts_processor_ident() {
        let caps = CHARGE_MATCH.captures("Charge ch_123 failed").unwrap();
        assert_eq!(&caps["charge"], "ch_123");
        assert!(CHARGE_MATCH.captures("Refund of Charge ch_123").is_none());
    }

    #[test]
    fn humanized_periods_pluralizes() {
        assert_eq!(humanized_periods(1, &PeriodUnit::Month), "1 month");
        assert_eq!(humanized_periods(3, &PeriodUnit::Month), "3 months");
        assert_eq!(humanized_periods(2, &PeriodUnit::Year), "2 years");
    }
}
