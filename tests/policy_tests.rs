use serde_json::json;

use consent_gate::consent::{ConsentSnapshot, Purpose};
use consent_gate::policy::{reconcile, restricted_integrations, SdkOptions, ANALYTICS_INTEGRATIONS};
use consent_gate::session::ConsentSession;
use consent_gate::protocol::UserContext;
use consent_gate::Level;

#[test]
fn test_everything_granted_keeps_original_options() {
    let original = SdkOptions::default();
    let next = reconcile(&original, &ConsentSnapshot::uniform(true));
    assert_eq!(next, original);
}

#[test]
fn test_each_denied_category_restricts_its_own_settings() {
    let original = SdkOptions::default();

    let no_functional = reconcile(&original, &ConsentSnapshot::uniform(true).with(Purpose::Functional, false));
    assert!(!no_functional.auto_session_tracking);
    assert!(!no_functional.capture_unhandled_rejections);
    assert!(!no_functional.has_integration("GlobalHandlers"));
    assert!(no_functional.has_integration("BrowserTracing"));

    let no_analytics = reconcile(&original, &ConsentSnapshot::uniform(true).with(Purpose::Analytics, false));
    assert_eq!(no_analytics.traces_sample_rate, 0.0);
    assert_eq!(no_analytics.profiles_sample_rate, 0.0);
    for name in ANALYTICS_INTEGRATIONS {
        assert!(!no_analytics.has_integration(name));
    }
    assert!(no_analytics.auto_session_tracking);

    let no_marketing = reconcile(&original, &ConsentSnapshot::uniform(true).with(Purpose::Marketing, false));
    assert_eq!(no_marketing.replays_session_sample_rate, 0.0);
    assert_eq!(no_marketing.replays_on_error_sample_rate, 0.0);
    assert!(!no_marketing.has_integration("Replay"));

    let mut pii_on = original.clone();
    pii_on.send_default_pii = true;
    let no_preferences = reconcile(&pii_on, &ConsentSnapshot::uniform(true).with(Purpose::Preferences, false));
    assert!(!no_preferences.send_default_pii);
    assert!(!no_preferences.has_integration("Dedupe"));
}

#[test]
fn test_unknown_consent_counts_as_denied() {
    let next = reconcile(&SdkOptions::default(), &ConsentSnapshot::default());

    assert!(next.integrations.is_empty());
    assert_eq!(next.traces_sample_rate, 0.0);
    assert!(!next.auto_session_tracking);
}

#[test]
fn test_regrant_restores_integrations() {
    let original = SdkOptions::default();
    let mut session = ConsentSession::new(original.clone());
    assert_eq!(session.options(), &original, "Options apply unchanged before any decision");

    let denied = session.update_consent(ConsentSnapshot::uniform(true).with(Purpose::Analytics, false)).clone();
    assert!(!denied.has_integration("BrowserTracing"));

    let restored = session.update_consent(ConsentSnapshot::uniform(true));
    assert!(restored.has_integration("BrowserTracing"));
    assert_eq!(restored.traces_sample_rate, 1.0);
    assert_eq!(session.original_options(), &original);
}

#[test]
fn test_restricted_integrations_do_not_overlap() {
    let mut seen = Vec::new();
    for purpose in Purpose::ALL {
        for name in restricted_integrations(purpose) {
            assert!(!seen.contains(name), "{} listed twice", name);
            seen.push(*name);
        }
    }
    assert_eq!(seen.len(), SdkOptions::default().integrations.len());
}

#[test]
fn test_custom_event_breadcrumb_requires_functional_consent() {
    let mut session = ConsentSession::new(SdkOptions::default());
    assert!(session.custom_event_breadcrumb("signup", json!({})).is_none());

    session.update_consent(ConsentSnapshot::default().with(Purpose::Functional, true));
    let crumb = session
        .custom_event_breadcrumb("signup", json!({ "plan": "pro" }))
        .expect("breadcrumb with functional consent");

    assert_eq!(crumb.message, "Custom event: signup");
    assert_eq!(crumb.category, "custom");
    assert_eq!(crumb.level, Level::Info);
    assert_eq!(crumb.data, json!({ "plan": "pro" }));

    assert!(session.custom_event_breadcrumb("", json!(null)).is_none());
}

#[test]
fn test_page_tags() {
    let session = ConsentSession::new(SdkOptions::default());
    let tags = session.page_tags("https://shop.test/cart", "Cart");

    assert_eq!(tags.get("page.url").map(String::as_str), Some("https://shop.test/cart"));
    assert_eq!(tags.get("page.title").map(String::as_str), Some("Cart"));
    assert_eq!(tags.len(), 2);
}

#[test]
fn test_page_user_only_with_known_id() {
    let session = ConsentSession::new(SdkOptions::default());

    assert_eq!(session.page_user(Some("u-42")), Some(UserContext { id: "u-42".into() }));
    assert_eq!(session.page_user(Some("")), None);
    assert_eq!(session.page_user(None), None);
}
