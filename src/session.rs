//! One backup session: hooks, transfers, report, notifications.
//!
//! Phases run strictly in order: start heartbeat, pre-hooks, transfers,
//! post-hooks, classification, status notification, final heartbeat.
//! Nothing that fails inside a phase stops the session.

use std::time::{Duration, Instant};

use crate::hooks::Interpreter;
use crate::i18n::Localizer;
use crate::models::{MachineProfile, Options};
use crate::notify::{DeliveryError, Notifier, HEARTBEAT_DONE, HEARTBEAT_START};
use crate::report::{classify, Severity, StatusReport};
use crate::transfer::{Dispatcher, FaultInjector, RemoteTarget, TransferProvider};

/// Outcome of [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Localized report; empty when there was nothing to do
    pub report: String,
    pub severity: Severity,
    pub failures: usize,
    pub attempted: usize,
    pub elapsed: Duration,
}

impl SessionSummary {
    /// True when the profile had no path and no hook.
    pub fn is_idle(&self) -> bool {
        self.attempted == 0
    }

    fn idle(elapsed: Duration) -> Self {
        Self {
            report: String::new(),
            severity: Severity::Success,
            failures: 0,
            attempted: 0,
            elapsed,
        }
    }

    fn from_report(report: StatusReport, elapsed: Duration) -> Self {
        Self {
            report: report.body,
            severity: report.severity,
            failures: report.failures,
            attempted: report.attempted,
            elapsed,
        }
    }
}

pub struct Session<P: TransferProvider> {
    options: Options,
    profile: MachineProfile,
    dispatcher: Dispatcher<P>,
    interpreter: Interpreter,
    notifier: Option<Notifier>,
    localizer: Localizer,
}

impl<P: TransferProvider> Session<P> {
    pub fn new(options: Options, profile: MachineProfile, provider: P, localizer: Localizer) -> Self {
        let target = RemoteTarget::new(
            options.remote(),
            options.remote_root(),
            profile.hostname.as_str(),
        );
        Self {
            options,
            profile,
            dispatcher: Dispatcher::new(provider, target),
            interpreter: Interpreter::default(),
            notifier: None,
            localizer,
        }
    }

    pub fn with_notifier(mut self, notifier: Option<Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_faults(mut self, faults: FaultInjector) -> Self {
        self.dispatcher = self.dispatcher.with_faults(faults);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn profile(&self) -> &MachineProfile {
        &self.profile
    }

    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }

    pub fn run(&self) -> SessionSummary {
        let started = Instant::now();
        let profile = &self.profile;

        if profile.is_empty() {
            tracing::info!("Nothing to do for '{}'", profile.hostname);
            return SessionSummary::idle(started.elapsed());
        }

        tracing::info!(
            "Starting {} of {} path(s) for '{}' to '{}'{}",
            self.options.direction(),
            profile.paths.len(),
            profile.hostname,
            self.options.remote(),
            if self.options.simulate() { " (simulated)" } else { "" }
        );

        self.heartbeat(HEARTBEAT_START, false);

        tracing::info!("Running {} pre-transfer command(s)", profile.pre.len());
        let pre = self
            .interpreter
            .run_batch(&profile.pre, self.surface_output());

        let transfers = self.dispatcher.dispatch(
            &profile.paths,
            self.options.direction(),
            self.options.simulate(),
        );

        tracing::info!("Running {} post-transfer command(s)", profile.post.len());
        let post = self
            .interpreter
            .run_batch(&profile.post, self.surface_output());

        let report = classify(
            transfers,
            pre,
            post,
            &self.localizer,
            self.options.languages(),
        );
        tracing::info!("Session result: {} ({}%)", report.severity, report.fail_rate);

        self.notify(&report);
        self.heartbeat(HEARTBEAT_DONE, true);

        SessionSummary::from_report(report, started.elapsed())
    }

    /// Hook output is logged when the profile asks for it or in debug mode.
    fn surface_output(&self) -> bool {
        self.profile.surface_output || self.options.debug()
    }

    fn notify(&self, report: &StatusReport) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let hostname = &self.profile.hostname;
        let title = notifier.status_title(hostname);
        let tags = vec![
            report.severity.tag().to_string(),
            "package".to_string(),
            hostname.clone(),
            notifier.topic().to_string(),
        ];

        match notifier.send(&title, &report.body, &tags) {
            Ok(status) => tracing::info!("Notification sent: {status}"),
            Err(e) => tracing::error!("Notification failed: {e}"),
        }
    }

    /// Heartbeats are for unattended runs only.
    fn heartbeat(&self, endpoint: &str, attach_log: bool) {
        if self.options.interactive() {
            return;
        }
        let Some(notifier) = &self.notifier else {
            return;
        };
        match notifier.heartbeat(endpoint, attach_log) {
            Ok(status) if status.is_empty() => {}
            Ok(status) => tracing::info!("Heartbeat '{endpoint}': {status}"),
            Err(DeliveryError::Combined { errors, statuses }) => {
                if !statuses.is_empty() {
                    tracing::info!("Heartbeat '{endpoint}': {statuses}");
                }
                for e in errors {
                    tracing::error!("Heartbeat '{endpoint}' failed: {e}");
                }
            }
            Err(e) => tracing::error!("Heartbeat '{endpoint}' failed: {e}"),
        }
    }
}
