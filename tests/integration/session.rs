//! Full sessions: hooks, transfers, report and notifications

use super::helpers::*;
use haul::i18n::Localizer;
use haul::models::{Direction, MachineProfile, Options};
use haul::notify::{HealthMonitor, MonitorKind, Notifier};
use haul::report::Severity;
use haul::session::Session;
use haul::transfer::{FaultInjector, LocalProvider};
use std::fs;
use tempfile::TempDir;

fn options(remote: &str, interactive: bool, simulate: bool) -> Options {
    Options::builder()
        .remote(remote)
        .direction(Direction::Upload)
        .interactive(interactive)
        .simulate(simulate)
        .languages(["en"])
        .build()
}

fn notifier_with_monitor(server: &HttpFixture, log: &std::path::Path) -> Notifier {
    let monitor = HealthMonitor::new(MonitorKind::Healthchecks, "hc-id").with_base_url(server.url());
    Notifier::new(&server.url(), "backups", Some("token".to_string()), vec![monitor])
        .and_then(|n| n.with_policies(fast_policy(2), fast_policy(2)))
        .expect("Failed to build notifier")
        .with_log_path(log)
}

#[test]
fn test_unattended_session_sends_heartbeats_around_the_report() {
    let server = HttpFixture::start(&[200]);
    let local = TempDir::new().expect("Failed to create temp dir");
    let remote = TempDir::new().expect("Failed to create temp dir");
    let log = local.path().join("haul.log");
    fs::write(&log, "log contents").unwrap();

    let data = local.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("file.txt"), "payload").unwrap();

    let mut profile = MachineProfile::new("host-a");
    profile.paths = vec![data.display().to_string()];
    profile.pre = vec!["export HAUL_IT_SESSION=1".to_string()];

    let session = Session::new(
        options(&remote.path().display().to_string(), false, false),
        profile,
        LocalProvider::default(),
        Localizer::embedded(),
    )
    .with_interpreter(quick_interpreter())
    .with_notifier(Some(notifier_with_monitor(&server, &log)));

    let summary = session.run();
    assert_eq!(summary.severity, Severity::Success, "{}", summary.report);
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.failures, 0);

    let requests = server.requests();
    let order: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(order, vec!["/hc-id/start", "/", "/hc-id"]);

    let notification = requests[1].json();
    assert_eq!(notification["title"], "HOST-A - BACKUPS");
    assert_eq!(
        notification["tags"],
        serde_json::json!([Severity::Success.tag(), "package", "host-a", "backups"])
    );
    assert_eq!(requests[1].header("authorization"), Some("Bearer token"));
    assert_eq!(requests[2].body, b"log contents");

    let target = session
        .dispatcher()
        .target()
        .locator_for(&data.display().to_string());
    assert_eq!(
        fs::read_to_string(std::path::Path::new(&target).join("file.txt")).unwrap(),
        "payload"
    );
}

#[test]
fn test_interactive_session_only_notifies() {
    let server = HttpFixture::start(&[200]);
    let local = TempDir::new().expect("Failed to create temp dir");
    let log = local.path().join("haul.log");

    let mut profile = MachineProfile::new("desk");
    profile.paths = vec![local.path().join("missing").display().to_string()];

    let session = Session::new(
        options(&local.path().display().to_string(), true, false),
        profile,
        LocalProvider::default(),
        Localizer::embedded(),
    )
    .with_interpreter(quick_interpreter())
    .with_notifier(Some(notifier_with_monitor(&server, &log)));

    let summary = session.run();
    assert_eq!(summary.failures, 1);
    assert_ne!(summary.severity, Severity::Success);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/");
    let notification = requests[0].json();
    assert_eq!(notification["tags"][0], summary.severity.tag());
    assert_eq!(notification["message"], summary.report.as_str());
}

#[test]
fn test_idle_profile_sends_nothing() {
    let server = HttpFixture::start(&[200]);
    let local = TempDir::new().expect("Failed to create temp dir");
    let log = local.path().join("haul.log");

    let session = Session::new(
        options(&local.path().display().to_string(), false, false),
        MachineProfile::new("idle"),
        LocalProvider::default(),
        Localizer::embedded(),
    )
    .with_notifier(Some(notifier_with_monitor(&server, &log)));

    let summary = session.run();
    assert!(summary.is_idle());
    assert!(server.requests().is_empty());
}

#[test]
fn test_simulated_session_leaves_remote_untouched() {
    let local = TempDir::new().expect("Failed to create temp dir");
    let remote = TempDir::new().expect("Failed to create temp dir");
    let data = local.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("file.txt"), "payload").unwrap();

    let mut profile = MachineProfile::new("sim");
    profile.paths = vec![data.display().to_string()];

    let session = Session::new(
        options(&remote.path().display().to_string(), true, true),
        profile,
        LocalProvider::default(),
        Localizer::embedded(),
    )
    .with_interpreter(quick_interpreter())
    .with_faults(FaultInjector::disabled());

    let summary = session.run();
    assert_eq!(summary.severity, Severity::Success, "{}", summary.report);

    let target = session
        .dispatcher()
        .target()
        .locator_for(&data.display().to_string());
    // The destination directory is prepared but nothing is copied
    assert!(std::path::Path::new(&target).is_dir());
    assert!(!std::path::Path::new(&target).join("file.txt").exists());
}
