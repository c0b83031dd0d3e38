use bunner_url_manager::{
    NormalizerAction, ParsedRoute, RedirectStatus, Request, Resolution, RouteOutcome,
    RuleDeclaration, RuleNormalizer, UrlManager, UrlManagerOptions, UrlNormalizer, UrlRuleOptions,
    params,
};

fn manager(normalizer: UrlNormalizer, strict: bool) -> UrlManager {
    UrlManager::new(
        UrlManagerOptions::builder()
            .normalizer(normalizer)
            .enable_strict_parsing(strict)
            .build()
            .expect("options should validate"),
        vec![RuleDeclaration::short("post/<id:\\d+>", "post/view")],
    )
    .expect("manager should build")
}

#[test]
fn normalizer_when_path_has_extra_slashes_then_redirects_permanently() {
    let manager = manager(UrlNormalizer::default(), false);

    let resolution = manager.parse_request(&Request::get("/post//1/"));

    assert_eq!(
        resolution,
        Some(Resolution::Redirect {
            url: "post/1".to_string(),
            status: RedirectStatus::MovedPermanently,
        })
    );
}

#[test]
fn normalizer_when_path_is_canonical_then_route_is_returned() {
    let manager = manager(UrlNormalizer::default(), false);

    let resolution = manager.parse_request(&Request::get("/post/1"));

    assert_eq!(
        resolution,
        Some(Resolution::Route(ParsedRoute::new(
            "post/view",
            params([("id", "1")])
        )))
    );
}

#[test]
fn normalizer_when_action_is_temporary_then_redirect_uses_found() {
    let manager = manager(
        UrlNormalizer::with_action(NormalizerAction::RedirectTemporary),
        false,
    );

    match manager.parse_request(&Request::get("/post/1/")) {
        Some(Resolution::Redirect { url, status }) => {
            assert_eq!(url, "post/1");
            assert_eq!(status, RedirectStatus::Found);
            assert_eq!(status.code(), 302);
        }
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn normalizer_when_action_is_none_then_normalized_route_is_used() {
    let manager = manager(UrlNormalizer::with_action(NormalizerAction::None), false);

    match manager.parse_request(&Request::get("/post//7")) {
        Some(Resolution::Route(route)) => {
            assert_eq!(route.route, "post/view");
            assert_eq!(route.param("id"), Some("7"));
        }
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn normalizer_when_action_is_not_found_then_resolution_is_not_found() {
    let manager = manager(UrlNormalizer::with_action(NormalizerAction::NotFound), false);

    assert_eq!(
        manager.parse_request(&Request::get("/post/1/")),
        Some(Resolution::NotFound)
    );
}

#[test]
fn normalizer_when_action_is_custom_then_transform_decides() {
    let action = NormalizerAction::custom(|mut route, _| {
        route.params.insert("normalized".to_string(), "1".to_string());
        RouteOutcome::Matched(route)
    });
    let manager = manager(UrlNormalizer::with_action(action), false);

    match manager.parse_request(&Request::get("/post/3/")) {
        Some(Resolution::Route(route)) => {
            assert_eq!(route.params, params([("id", "3"), ("normalized", "1")]));
        }
        other => panic!("unexpected resolution: {other:?}"),
    }
    match manager.parse_request(&Request::get("/post/3")) {
        Some(Resolution::Route(route)) => assert_eq!(route.param("normalized"), None),
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn normalizer_when_no_rule_matches_then_fallback_route_is_normalized() {
    let manager = manager(UrlNormalizer::default(), false);

    assert_eq!(
        manager.parse_request(&Request::get("/site//about/")),
        Some(Resolution::Redirect {
            url: "site/about".to_string(),
            status: RedirectStatus::MovedPermanently,
        })
    );
    assert_eq!(
        manager.parse_request(&Request::get("/site/about")),
        Some(Resolution::Route(ParsedRoute::route_only("site/about")))
    );
}

#[test]
fn normalizer_when_rule_disables_it_then_raw_path_must_match() {
    let rule = UrlRuleOptions::builder()
        .pattern("post/<id:\\d+>")
        .route("post/view")
        .normalizer(RuleNormalizer::Disabled)
        .build();
    let manager = UrlManager::new(
        UrlManagerOptions::builder()
            .normalizer(UrlNormalizer::default())
            .enable_strict_parsing(true)
            .build()
            .expect("options should validate"),
        vec![RuleDeclaration::Full(rule)],
    )
    .expect("manager should build");

    assert!(manager.parse_request(&Request::get("/post//1/")).is_none());
    assert!(manager.parse_request(&Request::get("/post/1")).is_some());
}

#[test]
fn normalizer_when_rule_has_its_own_then_it_overrides_manager_setting() {
    let rule = UrlRuleOptions::builder()
        .pattern("post/<id:\\d+>")
        .route("post/view")
        .normalizer(RuleNormalizer::Own(UrlNormalizer::with_action(
            NormalizerAction::None,
        )))
        .build();
    let manager = UrlManager::new(
        UrlManagerOptions::builder()
            .enable_strict_parsing(true)
            .build()
            .expect("options should validate"),
        vec![RuleDeclaration::Full(rule)],
    )
    .expect("manager should build");

    match manager.parse_request(&Request::get("/post//1/")) {
        Some(Resolution::Route(route)) => assert_eq!(route.route, "post/view"),
        other => panic!("unexpected resolution: {other:?}"),
    }
}

#[test]
fn normalizer_when_suffix_ends_with_slash_then_trailing_slash_is_kept() {
    let normalizer = UrlNormalizer::default();

    let out = normalizer.normalize_path_info("post/1", "/");
    assert_eq!(out.path, "post/1/");
    assert!(out.changed);

    let out = normalizer.normalize_path_info("post/1/", "/");
    assert_eq!(out.path, "post/1/");
    assert!(!out.changed);
}
