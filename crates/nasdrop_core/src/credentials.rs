use crate::rule::{find_domain_rule, DomainRule};

const SCHEME_SEPARATOR: &str = "://";

/// Embed `username:password@` right after the scheme separator when the rule carries both.
pub fn inject_credentials(url: &str, rule: Option<&DomainRule>) -> String {
    match rule.and_then(DomainRule::credentials) {
        Some((username, password)) => url.replacen(
            SCHEME_SEPARATOR,
            &format!("{SCHEME_SEPARATOR}{username}:{password}@"),
            1,
        ),
        None => url.to_string(),
    }
}

pub fn try_inject_credentials(url: &str, rules: &[DomainRule]) -> String {
    inject_credentials(url, find_domain_rule(url, rules))
}
