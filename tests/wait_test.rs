//! Waits and interactions against scripted pages on paused time.

mod common;

use std::time::Duration;

use common::{prose, FakeSession, Frame};
use rs_harvest::interact::{dismiss_consent, expand_read_more, scroll_to_load, ScrollConfig};
use rs_harvest::wait::{
    detect_challenge, wait_for_stable_content, wait_through_challenge, ChallengeConfig,
    StabilityConfig,
};

fn page(chars: usize) -> String {
    format!("<html><body><p>{}</p></body></html>", prose(chars))
}

#[tokio::test(start_paused = true)]
async fn test_growing_content_is_ready_after_window() {
    let session = FakeSession::timeline(
        "https://s.example/a",
        vec![
            Frame::new(0, "A", "<html><body></body></html>"),
            Frame::new(300, "A", page(400)),
            Frame::new(600, "A", page(800)),
            Frame::new(900, "A", page(1200)),
        ],
    );
    let report = wait_for_stable_content(&session, StabilityConfig::default()).await;

    assert!(report.ready);
    assert!(!report.timed_out);
    assert_eq!(report.text_length, 1200);
    assert!((2400..=2700).contains(&report.waited_ms), "waited {}ms", report.waited_ms);
    assert!(report.stable_for_ms >= 1500);
}

#[tokio::test(start_paused = true)]
async fn test_short_stable_content_is_not_ready() {
    let session = FakeSession::new("https://s.example/a", "A", page(40));
    let config = StabilityConfig::new(Duration::from_secs(2), Duration::from_millis(500));
    let report = wait_for_stable_content(&session, config).await;

    assert!(!report.ready);
    assert!(report.timed_out);
    assert_eq!(report.text_length, 40);
    assert_eq!(report.waited_ms, 2000);
}

#[tokio::test(start_paused = true)]
async fn test_loading_indicator_holds_the_wait() {
    let spinner = format!(
        "<html><body><div class=\"spinner\"></div><p>{}</p></body></html>",
        prose(600)
    );
    let session = FakeSession::timeline(
        "https://s.example/a",
        vec![Frame::new(0, "A", spinner), Frame::new(3000, "A", page(600))],
    );
    let report = wait_for_stable_content(&session, StabilityConfig::default()).await;

    assert!(report.ready);
    assert!(report.waited_ms >= 4500, "waited {}ms", report.waited_ms);
}

#[tokio::test(start_paused = true)]
async fn test_challenge_unresolved_after_max_wait() {
    let session = FakeSession::new(
        "https://s.example/a",
        "Attention Required! | Cloudflare",
        "<html><body><p>Please wait.</p></body></html>",
    );
    assert!(detect_challenge(&session).await);

    let info = wait_through_challenge(&session, ChallengeConfig::default()).await;
    assert!(info.was_challenged);
    assert!(!info.resolved);
    assert_eq!(info.waited_ms, 20_000);
    assert_eq!(info.title, "Attention Required! | Cloudflare");
}

#[tokio::test(start_paused = true)]
async fn test_challenge_resolved_immediately() {
    let session = FakeSession::new("https://s.example/a", "Story", page(300));
    assert!(!detect_challenge(&session).await);
    let info = wait_through_challenge(&session, ChallengeConfig::default()).await;
    assert!(info.resolved);
    assert_eq!(info.waited_ms, 0);
    assert_eq!(info.title, "Story");
}

#[tokio::test(start_paused = true)]
async fn test_consent_click_stops_after_first_hit() {
    let session = FakeSession::new("https://s.example/a", "A", page(300))
        .clickable("button:has-text('I agree')", vec![Frame::new(0, "A", page(300))])
        .clickable("button#L2AGLb", vec![]);

    assert_eq!(dismiss_consent(&session).await, Some("button:has-text('I agree')"));
    assert_eq!(session.clicks(), vec!["button:has-text('I agree')".to_string()]);
    assert_eq!(expand_read_more(&session).await, None);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_stops_after_stale_rounds() {
    let session = FakeSession::new("https://s.example/a", "A", page(300));
    let report = scroll_to_load(&session, ScrollConfig::default()).await;

    assert_eq!(report.scrolls, 3);
    assert_eq!(session.scrolls(), 3);
    assert_eq!(report.text_length, 300);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_continues_while_text_grows() {
    let frames = (0..10u64)
        .map(|i| Frame::new(i * 800, "A", page(300 + (i as usize) * 200)))
        .collect();
    let session = FakeSession::timeline("https://s.example/a", frames);
    let report = scroll_to_load(&session, ScrollConfig::default()).await;

    assert!(report.scrolls > 3, "scrolled {} times", report.scrolls);
    assert!(report.text_length > 1000);
}
