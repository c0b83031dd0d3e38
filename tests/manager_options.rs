use bunner_url_manager::{
    HttpMethod, NormalizerAction, Request, Resolution, RouteParams, RuleDeclaration, RuleError,
    ShadowedRule, UrlManager, UrlManagerError, UrlManagerOptions, UrlManagerOptionsError,
    UrlRuleOptions, params, pattern::PatternError,
};

#[test]
fn options_when_defaults_used_then_pretty_lenient_and_cached() {
    let options = UrlManagerOptions::default();

    assert!(options.enable_pretty_url);
    assert!(!options.enable_strict_parsing);
    assert!(options.enable_rule_cache);
    assert!(!options.detect_shadowed_rules);
    assert_eq!(options.route_param, "r");
    assert_eq!(options.suffix, None);
    assert_eq!(options.base_url, None);
    assert!(options.normalizer.is_none());
}

#[test]
fn options_when_route_param_empty_then_validation_fails() {
    let err = UrlManagerOptions::builder().route_param(" ").build();

    match err.expect_err("empty route param should fail") {
        UrlManagerOptionsError::EmptyRouteParam => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn options_when_host_info_lacks_scheme_then_validation_fails() {
    let err = UrlManagerOptions::builder().host_info("example.com").build();

    match err.expect_err("host without scheme should fail") {
        UrlManagerOptionsError::HostInfoWithoutScheme { value } => {
            assert_eq!(value, "example.com")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn options_when_base_url_has_trailing_slash_then_validation_fails() {
    let err = UrlManagerOptions::builder().base_url("/app/").build();

    match err.expect_err("trailing slash should fail") {
        UrlManagerOptionsError::BaseUrlTrailingSlash { value } => assert_eq!(value, "/app/"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn manager_when_options_invalid_then_new_returns_error() {
    let options = UrlManagerOptions {
        route_param: String::new(),
        ..UrlManagerOptions::default()
    };

    match UrlManager::new(options, Vec::new()).expect_err("invalid options should fail") {
        UrlManagerError::Options(UrlManagerOptionsError::EmptyRouteParam) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn manager_when_rule_pattern_invalid_then_new_returns_rule_error() {
    let err = UrlManager::new(
        UrlManagerOptions::default(),
        vec![RuleDeclaration::short("post/<id:[>", "post/view")],
    );

    match err.expect_err("invalid rule should fail") {
        UrlManagerError::Rule(RuleError::Pattern(PatternError::RegexConstraintInvalid {
            name,
            ..
        })) => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn from_json_when_config_is_complete_then_builds_every_rule_kind() {
    let json = r#"{
        "suffix": ".html",
        "enable_strict_parsing": true,
        "rules": [
            { "type": "short", "key": "posts", "route": "post/index" },
            {
                "type": "full",
                "pattern": "post/<id:\\d+>",
                "route": "post/view",
                "verbs": ["GET", "HEAD"]
            },
            {
                "type": "group",
                "prefix": "admin",
                "rules": [{ "type": "short", "key": "login", "route": "user/login" }]
            },
            {
                "type": "rest",
                "suffix": "",
                "controllers": [{ "controller": "user" }]
            }
        ]
    }"#;

    let manager = UrlManager::from_json(json).expect("config should load");

    assert_eq!(manager.rules().len(), 4);
    assert_eq!(manager.options().suffix.as_deref(), Some(".html"));
    assert!(manager.options().enable_strict_parsing);

    assert_eq!(
        manager.create_url("post/view", &params([("id", "2")])).url,
        "post/2.html"
    );
    assert_eq!(
        manager.create_url("admin/user/login", &RouteParams::new()).url,
        "admin/login.html"
    );
    assert_eq!(
        manager.create_url("user/view", &params([("id", "3")])).url,
        "users/3"
    );

    match manager.parse_request(&Request::new(HttpMethod::Head, "/post/2.html")) {
        Some(Resolution::Route(route)) => assert_eq!(route.route, "post/view"),
        other => panic!("unexpected resolution: {other:?}"),
    }
    assert!(
        manager
            .parse_request(&Request::new(HttpMethod::Post, "/post/2.html"))
            .is_none()
    );
}

#[test]
fn from_json_when_normalizer_configured_then_it_is_applied() {
    let json = r#"{
        "normalizer": { "action": "redirect_temporary" },
        "rules": [{ "type": "short", "key": "post/<id:\\d+>", "route": "post/view" }]
    }"#;

    let manager = UrlManager::from_json(json).expect("config should load");

    let normalizer = manager
        .options()
        .normalizer
        .as_ref()
        .expect("normalizer should be set");
    assert!(normalizer.collapse_slashes);
    assert!(matches!(normalizer.action, NormalizerAction::RedirectTemporary));

    match manager.parse_request(&Request::get("/post/1/")) {
        Some(Resolution::Redirect { url, .. }) => assert_eq!(url, "post/1"),
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn from_json_when_document_is_malformed_then_returns_config_error() {
    match UrlManager::from_json("{ \"rules\": [ { \"type\": \"unknown\" } ] }")
        .expect_err("unknown rule type should fail")
    {
        UrlManagerError::ConfigParse(_) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn shadow_detection_when_enabled_then_unreachable_rules_are_reported() {
    let options = UrlManagerOptions::builder()
        .detect_shadowed_rules(true)
        .build()
        .expect("options should validate");
    let manager = UrlManager::new(
        options,
        vec![
            RuleDeclaration::short("posts", "post/index"),
            RuleDeclaration::short("GET posts", "post/list"),
            RuleDeclaration::short("POST post/<id:\\d+>", "post/update"),
            RuleDeclaration::short("GET post/<id:\\d+>", "post/view"),
        ],
    )
    .expect("manager should build");

    assert_eq!(
        manager.shadowed_rules(),
        &[ShadowedRule {
            index: 1,
            shadowed_by: 0,
        }]
    );
}

#[test]
fn shadow_detection_when_suffix_or_mode_differs_then_nothing_is_reported() {
    let options = UrlManagerOptions::builder()
        .detect_shadowed_rules(true)
        .build()
        .expect("options should validate");
    let html = UrlRuleOptions::builder()
        .pattern("posts")
        .route("post/index")
        .suffix(".html")
        .build();
    let creation_only = UrlRuleOptions::builder()
        .pattern("posts")
        .route("post/feed")
        .mode(bunner_url_manager::RuleMode::CreationOnly)
        .build();
    let manager = UrlManager::new(
        options,
        vec![
            RuleDeclaration::Full(html),
            RuleDeclaration::Full(creation_only),
            RuleDeclaration::short("posts", "post/list"),
        ],
    )
    .expect("manager should build");

    assert!(manager.shadowed_rules().is_empty());
}

#[test]
fn shadow_detection_when_disabled_then_nothing_is_reported() {
    let manager = UrlManager::new(
        UrlManagerOptions::default(),
        vec![
            RuleDeclaration::short("posts", "post/index"),
            RuleDeclaration::short("posts", "post/list"),
        ],
    )
    .expect("manager should build");

    assert!(manager.shadowed_rules().is_empty());
}
