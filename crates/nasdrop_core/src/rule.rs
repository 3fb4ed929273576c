use serde::{Deserialize, Serialize};

/// Per-site settings: how to mirror the site's folders and which credentials to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRule {
    /// Case-insensitive substring identifying the site.
    pub url_match: String,
    /// Folder structure is mirrored from the URL path after this component.
    pub create_path_after_url_component: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DomainRule {
    pub fn new(url_match: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            url_match: url_match.into(),
            create_path_after_url_component: anchor.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Both credential fields, or `None` when either is missing or empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

/// First rule (in configured order) whose `url_match` occurs in `url`, ignoring case.
pub fn find_domain_rule<'a>(url: &str, rules: &'a [DomainRule]) -> Option<&'a DomainRule> {
    let haystack = url.to_lowercase();
    rules
        .iter()
        .find(|rule| haystack.contains(&rule.url_match.to_lowercase()))
}
