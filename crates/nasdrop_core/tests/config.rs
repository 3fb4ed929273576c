use nasdrop_core::{DomainRule, PlanConfig, SubmitMode, DEFAULT_BATCH_SIZE};
use pretty_assertions::assert_eq;

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: PlanConfig = ron::from_str(r#"(base_download_dir: "video")"#).unwrap();

    assert_eq!(config.base_download_dir, "video");
    assert!(config.domain_rules.is_empty());
    assert_eq!(config.submit_mode, SubmitMode::Batched);
    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
}

#[test]
fn rules_deserialize_with_optional_credentials() {
    let config: PlanConfig = ron::from_str(
        r#"(
            domain_rules: [
                (url_match: "files.example.com", create_path_after_url_component: "/pub/", username: Some("u"), password: Some("p")),
                (url_match: "mirror.org", create_path_after_url_component: "/iso/"),
            ],
            submit_mode: PerFile,
            batch_size: 0,
        )"#,
    )
    .unwrap();

    assert_eq!(
        config.domain_rules,
        vec![
            DomainRule::new("files.example.com", "/pub/").with_credentials("u", "p"),
            DomainRule::new("mirror.org", "/iso/"),
        ]
    );
    assert_eq!(config.submit_mode, SubmitMode::PerFile);
    assert_eq!(config.effective_batch_size(), 1);
}
