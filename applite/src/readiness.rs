//! Boot-readiness state machine.
//!
//! Detects boot completion by polling the serial console. The monitor is
//! tick-driven: an external scheduler calls [`BootMonitor::tick`] once per
//! cadence, and each tick performs exactly one bounded console read. The
//! timeout measures *silence* (consecutive ticks with no output at all),
//! not total boot duration, so a slow but chatty boot never trips it.
//!
//! State machine:
//! ```text
//! Booting ──(pattern match)──→ Ready            (terminal)
//! Booting ──(silence threshold)──→ Restarting ──→ Booting
//! ```

use crate::console::Console;
use crate::constants::CONSOLE_READ_TIMEOUT;
use crate::errors::{AppliteError, AppliteResult};
use crate::instance::InstanceControl;
use crate::profile::ComponentProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Boot progress of a provisioned instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    /// Waiting for the ready pattern on the console.
    Booting,

    /// Silence threshold hit; the instance is being stopped and relaunched
    /// (transient, resolves back to Booting within the same tick).
    Restarting,

    /// Ready pattern observed and post-boot actions completed (terminal).
    Ready,
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Booting => "booting",
            ReadinessState::Restarting => "restarting",
            ReadinessState::Ready => "ready",
        }
    }

    /// Whether the instance can be reported usable.
    pub fn is_ready(&self) -> bool {
        matches!(self, ReadinessState::Ready)
    }
}

impl std::fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Still waiting; call again on the next cadence.
    Booting,

    /// Silence threshold hit; the instance was stopped and relaunched.
    Restarted,

    /// Boot completed. `elapsed` counts from provisioning start.
    Ready { elapsed: chrono::Duration },
}

/// A post-boot action run synchronously between pattern match and the
/// `Ready` transition. Failure is fatal for the instance.
pub trait PostBootAction {
    fn run(&mut self) -> AppliteResult<()>;
}

/// Tick-driven console watcher for one provisioned appliance.
///
/// Owns the console transport exclusively for the duration of boot and
/// releases it exactly once, at the `Ready` transition. Never loops on its
/// own and never blocks beyond the single bounded read per tick.
pub struct BootMonitor {
    ready_pattern: Vec<u8>,
    silence_timeout_ticks: u32,
    read_timeout: Duration,
    restart_limit: Option<u32>,
    console: Option<Box<dyn Console>>,
    post_boot: Option<Box<dyn PostBootAction>>,
    state: ReadinessState,
    spin_count: u32,
    restarts: u32,
    started_at: DateTime<Utc>,
    elapsed: Option<chrono::Duration>,
}

impl BootMonitor {
    /// Create a monitor for a profile, taking ownership of its console.
    pub fn new(profile: &ComponentProfile, console: Box<dyn Console>) -> Self {
        Self {
            ready_pattern: profile.ready_pattern.clone(),
            silence_timeout_ticks: profile.silence_timeout_ticks,
            read_timeout: CONSOLE_READ_TIMEOUT,
            restart_limit: None,
            console: Some(console),
            post_boot: None,
            state: ReadinessState::Booting,
            spin_count: 0,
            restarts: 0,
            started_at: Utc::now(),
            elapsed: None,
        }
    }

    /// Run `action` after the ready pattern matches, before declaring ready.
    pub fn with_post_boot(mut self, action: Box<dyn PostBootAction>) -> Self {
        self.post_boot = Some(action);
        self
    }

    /// Bound the number of silence-triggered restarts. Unbounded by default.
    pub fn with_restart_limit(mut self, limit: u32) -> Self {
        self.restart_limit = Some(limit);
        self
    }

    /// Override the per-tick read bound (tests use a short one).
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Consecutive silent ticks since output was last observed.
    pub fn spin_count(&self) -> u32 {
        self.spin_count
    }

    /// Restarts performed so far.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Advance the machine by exactly one tick.
    ///
    /// Performs one bounded console read and classifies the result: ready
    /// pattern → post-boot action, console release, `Ready`; any output →
    /// silence broken, counter reset; nothing → counter incremented, with a
    /// stop/relaunch once the profile's silence threshold is reached.
    pub fn tick(&mut self, control: &mut dyn InstanceControl) -> AppliteResult<Tick> {
        if self.state.is_ready() {
            // Terminal; no further reads, report the recorded duration.
            let elapsed = self.elapsed.unwrap_or_else(chrono::Duration::zero);
            return Ok(Tick::Ready { elapsed });
        }

        let outcome = {
            let console = self
                .console
                .as_mut()
                .ok_or_else(|| AppliteError::Console("console already released".into()))?;
            console.expect(&[&self.ready_pattern], self.read_timeout)?
        };

        if outcome.matched.is_some() {
            return self.complete();
        }

        if outcome.saw_output() {
            // Output means the guest is alive even if not ready yet; the
            // timeout measures silence, not boot duration.
            tracing::trace!(bytes = outcome.output.len(), "console output observed");
            self.spin_count = 0;
            return Ok(Tick::Booting);
        }

        self.spin_count += 1;
        if self.spin_count >= self.silence_timeout_ticks {
            return self.restart(control);
        }
        Ok(Tick::Booting)
    }

    /// Pattern matched: acknowledge, run post-boot work, release the
    /// console, and record elapsed boot time.
    fn complete(&mut self) -> AppliteResult<Tick> {
        tracing::debug!("ready pattern detected");
        if let Some(console) = self.console.as_mut() {
            console.write_line("")?;
        }

        if let Some(action) = self.post_boot.as_mut() {
            action.run()?;
        }

        self.console = None;
        self.state = ReadinessState::Ready;
        let elapsed = Utc::now() - self.started_at;
        self.elapsed = Some(elapsed);
        tracing::info!(elapsed_ms = elapsed.num_milliseconds(), "startup complete");
        Ok(Tick::Ready { elapsed })
    }

    /// Silence threshold hit: a hung or crashed boot gets a full restart,
    /// not a renewed wait.
    fn restart(&mut self, control: &mut dyn InstanceControl) -> AppliteResult<Tick> {
        if let Some(limit) = self.restart_limit
            && self.restarts >= limit
        {
            return Err(AppliteError::ReadinessTimeout {
                restarts: self.restarts,
            });
        }

        tracing::debug!(
            silent_ticks = self.spin_count,
            restarts = self.restarts,
            "console silent too long, restarting instance"
        );
        self.state = ReadinessState::Restarting;
        control.stop()?;
        control.start()?;
        self.restarts += 1;
        self.spin_count = 0;
        self.state = ReadinessState::Booting;
        Ok(Tick::Restarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ExpectOutcome;
    use crate::instance::DiskRequest;
    use crate::profile::{ComponentKind, ComponentProfile};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Scripted console: each tick pops the next canned outcome.
    struct ScriptedConsole {
        script: Vec<ExpectOutcome>,
        cursor: usize,
        lines_written: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedConsole {
        fn new(script: Vec<ExpectOutcome>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let lines = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    script,
                    cursor: 0,
                    lines_written: Arc::clone(&lines),
                },
                lines,
            )
        }
    }

    impl Console for ScriptedConsole {
        fn expect(
            &mut self,
            _patterns: &[&[u8]],
            _timeout: Duration,
        ) -> AppliteResult<ExpectOutcome> {
            let outcome = self
                .script
                .get(self.cursor)
                .cloned()
                .unwrap_or_else(ExpectOutcome::silence);
            self.cursor += 1;
            Ok(outcome)
        }

        fn write_line(&mut self, text: &str) -> AppliteResult<()> {
            self.lines_written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingControl {
        stops: u32,
        starts: u32,
    }

    impl InstanceControl for RecordingControl {
        fn stop(&mut self) -> AppliteResult<()> {
            self.stops += 1;
            Ok(())
        }

        fn start(&mut self) -> AppliteResult<()> {
            self.starts += 1;
            Ok(())
        }

        fn add_disk(&mut self, _request: &DiskRequest) -> AppliteResult<()> {
            Ok(())
        }
    }

    struct FailingAction;

    impl PostBootAction for FailingAction {
        fn run(&mut self) -> AppliteResult<()> {
            Err(AppliteError::PostBoot("restore failed".into()))
        }
    }

    fn output(bytes: &[u8]) -> ExpectOutcome {
        ExpectOutcome {
            matched: None,
            output: bytes.to_vec(),
        }
    }

    fn matched() -> ExpectOutcome {
        ExpectOutcome {
            matched: Some(0),
            output: b"System Ready".to_vec(),
        }
    }

    fn test_profile(silence_ticks: u32) -> ComponentProfile {
        let mut profile = ComponentProfile::resolve(
            Some(ComponentKind::Controller),
            PathBuf::from("/test.qcow2"),
        );
        profile.silence_timeout_ticks = silence_ticks;
        profile
    }

    fn monitor(profile: &ComponentProfile, script: Vec<ExpectOutcome>) -> BootMonitor {
        let (console, _) = ScriptedConsole::new(script);
        BootMonitor::new(profile, Box::new(console)).with_read_timeout(Duration::from_millis(1))
    }

    #[test]
    fn test_output_resets_silence_counter() {
        // Output on tick 1, silence on ticks 2-5, output on tick 6.
        let script = vec![
            output(b"booting..."),
            ExpectOutcome::silence(),
            ExpectOutcome::silence(),
            ExpectOutcome::silence(),
            ExpectOutcome::silence(),
            output(b"still booting"),
        ];
        let profile = test_profile(100);
        let mut monitor = monitor(&profile, script);
        let mut control = RecordingControl::default();

        for _ in 0..6 {
            assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Booting);
        }
        assert_eq!(monitor.spin_count(), 0);
    }

    #[test]
    fn test_silence_timeout_restarts() {
        let profile = test_profile(3);
        let mut monitor = monitor(&profile, Vec::new());
        let mut control = RecordingControl::default();

        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Booting);
        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Booting);
        // Third consecutive silent tick reaches the threshold.
        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Restarted);

        assert_eq!(control.stops, 1);
        assert_eq!(control.starts, 1);
        assert_eq!(monitor.state(), ReadinessState::Booting);
        assert_eq!(monitor.spin_count(), 0);
        assert_eq!(monitor.restarts(), 1);
    }

    #[test]
    fn test_ready_pattern_completes_boot() {
        let profile = test_profile(100);
        let script = vec![output(b"boot log"), matched()];
        let (console, lines) = ScriptedConsole::new(script);
        let mut monitor = BootMonitor::new(&profile, Box::new(console))
            .with_read_timeout(Duration::from_millis(1));
        let mut control = RecordingControl::default();

        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Booting);
        let tick = monitor.tick(&mut control).unwrap();
        assert!(matches!(tick, Tick::Ready { .. }));
        assert!(monitor.state().is_ready());
        // The match is acknowledged with a line write before release.
        assert_eq!(lines.lock().unwrap().as_slice(), &[String::new()]);
        // No restart was ever needed.
        assert_eq!(control.stops, 0);
    }

    #[test]
    fn test_ready_is_terminal() {
        let profile = test_profile(100);
        let mut monitor = monitor(&profile, vec![matched()]);
        let mut control = RecordingControl::default();

        assert!(matches!(
            monitor.tick(&mut control).unwrap(),
            Tick::Ready { .. }
        ));
        // Further ticks are no-ops reporting the recorded duration; the
        // console has been released and is not read again.
        assert!(matches!(
            monitor.tick(&mut control).unwrap(),
            Tick::Ready { .. }
        ));
    }

    #[test]
    fn test_restart_limit_exhaustion_surfaces_timeout() {
        let profile = test_profile(1);
        let mut monitor = monitor(&profile, Vec::new()).with_restart_limit(2);
        let mut control = RecordingControl::default();

        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Restarted);
        assert_eq!(monitor.tick(&mut control).unwrap(), Tick::Restarted);
        let err = monitor.tick(&mut control).unwrap_err();
        assert!(matches!(
            err,
            AppliteError::ReadinessTimeout { restarts: 2 }
        ));
        assert_eq!(control.stops, 2);
    }

    #[test]
    fn test_post_boot_failure_is_fatal() {
        let profile = test_profile(100);
        let (console, _) = ScriptedConsole::new(vec![matched()]);
        let mut monitor = BootMonitor::new(&profile, Box::new(console))
            .with_read_timeout(Duration::from_millis(1))
            .with_post_boot(Box::new(FailingAction));
        let mut control = RecordingControl::default();

        let err = monitor.tick(&mut control).unwrap_err();
        assert!(matches!(err, AppliteError::PostBoot(_)));
        assert!(!monitor.state().is_ready());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ReadinessState::Booting.to_string(), "booting");
        assert_eq!(ReadinessState::Restarting.to_string(), "restarting");
        assert_eq!(ReadinessState::Ready.to_string(), "ready");
    }
}
