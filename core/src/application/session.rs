//! Interactive session state machine.
//!
//! [`SessionController`] is pure: it consumes [`SessionEvent`]s one at a time
//! and answers with [`Effect`]s for the driver to carry out. Results of those
//! effects come back as further events, so every state change happens on a
//! single logical thread in arrival order.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::debug;

use super::viewport::{viewport_height, window};
use crate::domain::{filter_records, ProcessRecord};

const REFRESHING: &str = "Refreshing...";
const CONFIRM_HINT: &str = "Press Enter to confirm or ESC to cancel";

// ============================================================================
// Inputs and outputs
// ============================================================================

/// A key press, already decoded from the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Up,
    Down,
    CtrlC,
}

/// One-shot timers requested through [`Effect::Schedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    /// Reload after a successful kill, once the OS has released the port.
    ReloadAfterKill,
    /// Switch the escalation message to "checking".
    ElevationStatus { pid: u32, label: String },
    /// Poll whether the escalated target is gone.
    ElevationVerify { pid: u32, label: String },
}

/// Everything the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Input(Key),
    Resize { rows: u16 },
    RegistryLoaded {
        generation: u64,
        records: Vec<ProcessRecord>,
    },
    /// Outcomes in the order the kills were issued.
    KillFinished {
        outcomes: Vec<(u32, bool)>,
        batch: bool,
    },
    ExistenceChecked {
        pid: u32,
        label: String,
        exists: bool,
    },
    Timer(Timer),
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Refresh { generation: u64, include_all: bool },
    /// Kill `pids` one after another and report a single [`SessionEvent::KillFinished`].
    Kill { pids: Vec<u32>, batch: bool },
    Elevate { pid: u32, label: String },
    VerifyExists { pid: u32, label: String },
    Schedule { delay: Duration, timer: Timer },
    Quit,
}

// ============================================================================
// State
// ============================================================================

/// The interaction mode. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Browsing,
    Filtering,
    ConfirmSingleKill { pid: u32 },
    /// Targets in snapshot order.
    ConfirmMultiKill { pids: Vec<u32> },
    AwaitingAdminRetry { pid: u32 },
}

/// Tunables for a session, usually taken from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub include_all_ports: bool,
    pub max_visible_rows: usize,
    pub kill_settle_delay: Duration,
    pub elevation_status_delay: Duration,
    pub elevation_verify_delay: Duration,
    /// Keep pids whose batch kill failed in the selection.
    pub retain_failed_selection: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            include_all_ports: true,
            max_visible_rows: 15,
            kill_settle_delay: Duration::from_millis(500),
            elevation_status_delay: Duration::from_millis(1500),
            elevation_verify_delay: Duration::from_millis(3000),
            retain_failed_selection: true,
        }
    }
}

/// Everything a renderer needs to draw the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub mode: SessionMode,
    /// Latest full snapshot.
    pub processes: Vec<ProcessRecord>,
    /// `processes` narrowed by `filter_text`.
    pub filtered: Vec<ProcessRecord>,
    pub selected_index: usize,
    pub selected_pids: BTreeSet<u32>,
    pub filter_text: String,
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub message: String,
    /// A scan is in flight.
    pub loading: bool,
    pub include_all_ports: bool,
    pub verbose: bool,
    pub show_paths: bool,
    /// Pid whose elevated kill has not been verified yet.
    pub escalation_pending: Option<u32>,
}

impl SessionState {
    fn new(settings: &SessionSettings) -> Self {
        Self {
            mode: SessionMode::Browsing,
            processes: Vec::new(),
            filtered: Vec::new(),
            selected_index: 0,
            selected_pids: BTreeSet::new(),
            filter_text: String::new(),
            scroll_offset: 0,
            viewport_height: settings.max_visible_rows.max(1),
            message: String::new(),
            loading: true,
            include_all_ports: settings.include_all_ports,
            verbose: false,
            show_paths: false,
            escalation_pending: None,
        }
    }

    /// The highlighted row, if the view is not empty.
    pub fn selected_record(&self) -> Option<&ProcessRecord> {
        self.filtered.get(self.selected_index)
    }

    /// Rows inside the viewport.
    pub fn visible_rows(&self) -> &[ProcessRecord] {
        let start = self.scroll_offset.min(self.filtered.len());
        let end = (start + self.viewport_height).min(self.filtered.len());
        &self.filtered[start..end]
    }

    pub fn is_selected(&self, pid: u32) -> bool {
        self.selected_pids.contains(&pid)
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Sole owner of [`SessionState`].
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    settings: SessionSettings,
    /// Generation of the newest refresh requested.
    generation: u64,
}

impl SessionController {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            state: SessionState::new(&settings),
            settings,
            generation: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Effects that open the session: the first scan.
    pub fn start(&mut self) -> Vec<Effect> {
        vec![self.request_refresh()]
    }

    /// Apply one event and return the effects it requests.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Input(key) => self.handle_key(key),
            SessionEvent::Resize { rows } => {
                self.state.viewport_height = viewport_height(rows, self.settings.max_visible_rows);
                self.sync_viewport();
                Vec::new()
            }
            SessionEvent::RegistryLoaded {
                generation,
                records,
            } => {
                self.apply_registry(generation, records);
                Vec::new()
            }
            SessionEvent::KillFinished { outcomes, batch } => {
                if batch {
                    self.finish_batch_kill(outcomes)
                } else {
                    self.finish_single_kill(outcomes)
                }
            }
            SessionEvent::ExistenceChecked { pid, label, exists } => {
                self.finish_escalation(pid, &label, exists)
            }
            SessionEvent::Timer(timer) => self.handle_timer(timer),
        }
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    fn handle_key(&mut self, key: Key) -> Vec<Effect> {
        if key == Key::CtrlC {
            return vec![Effect::Quit];
        }

        match self.state.mode.clone() {
            SessionMode::AwaitingAdminRetry { pid } => self.admin_retry_key(pid, key),
            SessionMode::ConfirmSingleKill { pid } => self.confirm_key(vec![pid], false, key),
            SessionMode::ConfirmMultiKill { pids } => self.confirm_key(pids, true, key),
            SessionMode::Filtering => {
                self.filter_key(key);
                Vec::new()
            }
            SessionMode::Browsing => self.browse_key(key),
        }
    }

    fn admin_retry_key(&mut self, pid: u32, key: Key) -> Vec<Effect> {
        match key {
            Key::Char('a') | Key::Char('A') => {
                let label = self.label_for(pid);
                self.state.mode = SessionMode::Browsing;
                self.state.escalation_pending = Some(pid);
                self.state.message = format!(
                    "Launching elevated terminal... Approve the UAC prompt to kill {}",
                    label
                );
                vec![
                    Effect::Elevate {
                        pid,
                        label: label.clone(),
                    },
                    Effect::Schedule {
                        delay: self.settings.elevation_status_delay,
                        timer: Timer::ElevationStatus {
                            pid,
                            label: label.clone(),
                        },
                    },
                    Effect::Schedule {
                        delay: self.settings.elevation_verify_delay,
                        timer: Timer::ElevationVerify { pid, label },
                    },
                ]
            }
            Key::Esc => {
                self.state.mode = SessionMode::Browsing;
                self.state.message.clear();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn confirm_key(&mut self, pids: Vec<u32>, batch: bool, key: Key) -> Vec<Effect> {
        match key {
            Key::Enter | Key::Char('y') => {
                self.state.mode = SessionMode::Browsing;
                vec![Effect::Kill { pids, batch }]
            }
            Key::Esc | Key::Char('n') => {
                self.state.mode = SessionMode::Browsing;
                self.state.message = "Kill cancelled".to_string();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn filter_key(&mut self, key: Key) {
        match key {
            Key::Esc => {
                self.state.mode = SessionMode::Browsing;
                self.set_filter(String::new());
            }
            Key::Enter => self.state.mode = SessionMode::Browsing,
            Key::Backspace => {
                let mut text = self.state.filter_text.clone();
                text.pop();
                self.set_filter(text);
            }
            Key::Char(c) if !c.is_control() => {
                let mut text = self.state.filter_text.clone();
                text.push(c);
                self.set_filter(text);
            }
            _ => {}
        }
    }

    fn browse_key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Char('q') => return vec![Effect::Quit],
            Key::Char('/') => self.state.mode = SessionMode::Filtering,
            Key::Char('c') => {
                self.set_filter(String::new());
                self.state.message = "Filter cleared".to_string();
            }
            Key::Char('r') => {
                self.state.message = REFRESHING.to_string();
                return vec![self.request_refresh()];
            }
            Key::Char('d') => {
                self.state.include_all_ports = !self.state.include_all_ports;
                self.state.message = if self.state.include_all_ports {
                    "Showing all ports"
                } else {
                    "Showing dev ports only"
                }
                .to_string();
                return vec![self.request_refresh()];
            }
            Key::Char('v') => {
                self.state.verbose = !self.state.verbose;
                self.state.message = on_off("Verbose mode", self.state.verbose);
            }
            Key::Char('p') => {
                self.state.show_paths = !self.state.show_paths;
                self.state.message = on_off("Full paths", self.state.show_paths);
            }
            Key::Char(' ') => self.toggle_selection(),
            Key::Up | Key::Char('k') => {
                self.state.selected_index = self.state.selected_index.saturating_sub(1);
                self.sync_viewport();
            }
            Key::Down | Key::Char('j') => {
                self.state.selected_index += 1;
                self.sync_viewport();
            }
            Key::Enter | Key::Char('x') => self.request_kill(),
            _ => {}
        }
        Vec::new()
    }

    fn toggle_selection(&mut self) {
        let Some(pid) = self.state.selected_record().map(|r| r.pid) else {
            return;
        };
        if !self.state.selected_pids.remove(&pid) {
            self.state.selected_pids.insert(pid);
        }
        self.state.message = format!("{} selected", self.state.selected_pids.len());
    }

    fn request_kill(&mut self) {
        if !self.state.selected_pids.is_empty() {
            let pids = self.selection_in_snapshot_order();
            self.state.message = format!("Kill {} selected processes? {}", pids.len(), CONFIRM_HINT);
            self.state.mode = SessionMode::ConfirmMultiKill { pids };
        } else if let Some(record) = self.state.selected_record().cloned() {
            self.state.message = format!(
                "Kill {} (PID: {}) on port {}? {}",
                record.process_name, record.pid, record.port, CONFIRM_HINT
            );
            self.state.mode = SessionMode::ConfirmSingleKill { pid: record.pid };
        }
    }

    // ------------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------------

    fn apply_registry(&mut self, generation: u64, records: Vec<ProcessRecord>) {
        if generation < self.generation {
            debug!(
                generation = generation,
                latest = self.generation,
                "Dropping stale registry snapshot"
            );
            return;
        }

        self.state.loading = false;
        self.state.processes = records;
        let processes = &self.state.processes;
        self.state
            .selected_pids
            .retain(|pid| processes.iter().any(|r| r.pid == *pid));
        self.state.filtered = filter_records(&self.state.processes, &self.state.filter_text);
        if !self.state.filter_text.is_empty() {
            self.state.selected_index = 0;
        }
        self.sync_viewport();

        if self.state.message == REFRESHING {
            self.state.message.clear();
        }
    }

    fn finish_single_kill(&mut self, outcomes: Vec<(u32, bool)>) -> Vec<Effect> {
        let Some(&(pid, killed)) = outcomes.first() else {
            return Vec::new();
        };
        let label = self.label_for(pid);

        if killed {
            self.state.selected_pids.remove(&pid);
            self.state.message = format!("Successfully killed {}", label);
            vec![self.schedule_reload()]
        } else {
            self.state.mode = SessionMode::AwaitingAdminRetry { pid };
            self.state.message = format!(
                "Failed to kill {}. Press A to try with admin privileges or run porty as admin.",
                label
            );
            Vec::new()
        }
    }

    fn finish_batch_kill(&mut self, outcomes: Vec<(u32, bool)>) -> Vec<Effect> {
        let total = outcomes.len();
        let mut failed = Vec::new();
        for (pid, killed) in outcomes {
            if killed || !self.settings.retain_failed_selection {
                self.state.selected_pids.remove(&pid);
            }
            if !killed {
                failed.push(pid);
            }
        }
        let succeeded = total - failed.len();

        self.state.message = if failed.is_empty() {
            format!("Successfully killed {} processes", total)
        } else {
            let names = failed
                .iter()
                .map(|&pid| format!("{} (PID: {})", self.label_for(pid), pid))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Killed {} of {} processes. Failed: {}", succeeded, total, names)
        };

        if succeeded > 0 {
            vec![self.schedule_reload()]
        } else {
            Vec::new()
        }
    }

    fn finish_escalation(&mut self, pid: u32, label: &str, exists: bool) -> Vec<Effect> {
        if self.state.escalation_pending == Some(pid) {
            self.state.escalation_pending = None;
        }

        if exists {
            self.state.message = format!(
                "Admin kill failed. {} may be protected by the system or you cancelled the UAC prompt.",
                label
            );
            Vec::new()
        } else {
            self.state.selected_pids.remove(&pid);
            self.state.message = format!(
                "Admin kill successful! {} (PID: {}) has been terminated.",
                label, pid
            );
            vec![self.request_refresh()]
        }
    }

    fn handle_timer(&mut self, timer: Timer) -> Vec<Effect> {
        match timer {
            Timer::ReloadAfterKill => vec![self.request_refresh()],
            Timer::ElevationStatus { label, .. } => {
                self.state.message = format!("Checking if {} was terminated...", label);
                Vec::new()
            }
            Timer::ElevationVerify { pid, label } => vec![Effect::VerifyExists { pid, label }],
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn request_refresh(&mut self) -> Effect {
        self.generation += 1;
        self.state.loading = true;
        Effect::Refresh {
            generation: self.generation,
            include_all: self.state.include_all_ports,
        }
    }

    fn schedule_reload(&self) -> Effect {
        Effect::Schedule {
            delay: self.settings.kill_settle_delay,
            timer: Timer::ReloadAfterKill,
        }
    }

    /// Re-derive the view from the full snapshot and go back to the top.
    fn set_filter(&mut self, text: String) {
        self.state.filter_text = text;
        self.state.filtered = filter_records(&self.state.processes, &self.state.filter_text);
        self.state.selected_index = 0;
        self.state.scroll_offset = 0;
        self.sync_viewport();
    }

    /// Clamp the selection into the view and keep it inside the viewport.
    fn sync_viewport(&mut self) {
        let len = self.state.filtered.len();
        self.state.selected_index = self.state.selected_index.min(len.saturating_sub(1));
        self.state.scroll_offset = window(
            len,
            self.state.selected_index,
            self.state.viewport_height,
            self.state.scroll_offset,
        );
    }

    fn selection_in_snapshot_order(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = Vec::new();
        for record in &self.state.processes {
            if self.state.selected_pids.contains(&record.pid) && !pids.contains(&record.pid) {
                pids.push(record.pid);
            }
        }
        for pid in &self.state.selected_pids {
            if !pids.contains(pid) {
                pids.push(*pid);
            }
        }
        pids
    }

    fn label_for(&self, pid: u32) -> String {
        self.state
            .processes
            .iter()
            .find(|r| r.pid == pid)
            .map(|r| r.process_name.clone())
            .unwrap_or_else(|| format!("process {}", pid))
    }
}

fn on_off(what: &str, on: bool) -> String {
    format!("{} {}", what, if on { "on" } else { "off" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(port: u16, pid: u32, name: &str) -> ProcessRecord {
        ProcessRecord::new(port, pid, name).with_full_command(format!("{} --port {}", name, port))
    }

    fn sample() -> Vec<ProcessRecord> {
        vec![record(3000, 100, "node"), record(8080, 200, "nginx")]
    }

    /// Controller with `records` loaded from its first scan.
    fn loaded(records: Vec<ProcessRecord>) -> SessionController {
        let mut controller = SessionController::new(SessionSettings::default());
        let effects = controller.start();
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                generation: 1,
                include_all: true
            }]
        );
        controller.handle(SessionEvent::RegistryLoaded {
            generation: 1,
            records,
        });
        controller
    }

    fn press(controller: &mut SessionController, keys: &[Key]) -> Vec<Effect> {
        keys.iter()
            .flat_map(|&k| controller.handle(SessionEvent::Input(k)))
            .collect()
    }

    fn type_text(controller: &mut SessionController, text: &str) {
        for c in text.chars() {
            controller.handle(SessionEvent::Input(Key::Char(c)));
        }
    }

    fn many(n: u32) -> Vec<ProcessRecord> {
        (0..n).map(|i| record(3000 + i as u16, 1000 + i, "node")).collect()
    }

    #[test]
    fn test_initial_state_is_loading() {
        let controller = SessionController::new(SessionSettings::default());
        assert!(controller.state().loading);
        assert_eq!(controller.state().mode, SessionMode::Browsing);
    }

    #[test]
    fn test_filter_scenario() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Char('/')]);
        type_text(&mut c, "30");

        assert_eq!(c.state().mode, SessionMode::Filtering);
        assert_eq!(c.state().filtered.len(), 1);
        assert_eq!(c.state().filtered[0].pid, 100);

        // Esc clears the filter and restores both, sorted by port
        press(&mut c, &[Key::Esc]);
        assert_eq!(c.state().mode, SessionMode::Browsing);
        let ports: Vec<u16> = c.state().filtered.iter().map(|r| r.port).collect();
        assert_eq!(ports, vec![3000, 8080]);
    }

    #[test]
    fn test_filter_enter_keeps_text() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Char('/')]);
        type_text(&mut c, "nginx");
        press(&mut c, &[Key::Enter]);

        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert_eq!(c.state().filter_text, "nginx");
        assert_eq!(c.state().filtered.len(), 1);

        press(&mut c, &[Key::Char('c')]);
        assert_eq!(c.state().filter_text, "");
        assert_eq!(c.state().filtered.len(), 2);
        assert_eq!(c.state().message, "Filter cleared");
    }

    #[test]
    fn test_filter_backspace_and_typed_equals_pasted() {
        let mut typed = loaded(sample());
        press(&mut typed, &[Key::Char('/')]);
        type_text(&mut typed, "ngx");
        press(&mut typed, &[Key::Backspace, Key::Backspace]);
        type_text(&mut typed, "ginx");

        let pasted = filter_records(&sample(), "nginx");
        assert_eq!(typed.state().filter_text, "nginx");
        assert_eq!(typed.state().filtered, pasted);
    }

    #[test]
    fn test_filter_mode_swallows_browse_keys() {
        let mut c = loaded(sample());
        let effects = press(&mut c, &[Key::Char('/'), Key::Char('q'), Key::Char('r')]);
        assert!(effects.is_empty());
        assert_eq!(c.state().filter_text, "qr");
    }

    #[test]
    fn test_filter_resets_selection() {
        let mut c = loaded(many(30));
        press(&mut c, &[Key::Down; 20]);
        assert_eq!(c.state().selected_index, 20);
        assert!(c.state().scroll_offset > 0);

        press(&mut c, &[Key::Char('/'), Key::Char('3')]);
        assert_eq!(c.state().selected_index, 0);
        assert_eq!(c.state().scroll_offset, 0);
    }

    #[test]
    fn test_navigation_clamped() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Up, Key::Char('k')]);
        assert_eq!(c.state().selected_index, 0);
        press(&mut c, &[Key::Down, Key::Char('j'), Key::Down]);
        assert_eq!(c.state().selected_index, 1);
    }

    #[test]
    fn test_navigation_on_empty_view() {
        let mut c = loaded(Vec::new());
        press(&mut c, &[Key::Down, Key::Up, Key::Enter, Key::Char(' ')]);
        assert_eq!(c.state().selected_index, 0);
        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert!(c.state().selected_pids.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        let mut c = loaded(sample());
        assert_eq!(press(&mut c, &[Key::Char('q')]), vec![Effect::Quit]);

        // Ctrl-C works even while a prompt is open
        press(&mut c, &[Key::Enter]);
        assert_eq!(press(&mut c, &[Key::CtrlC]), vec![Effect::Quit]);
    }

    #[test]
    fn test_refresh_and_toggle_request_scans() {
        let mut c = loaded(sample());

        let effects = press(&mut c, &[Key::Char('r')]);
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                generation: 2,
                include_all: true
            }]
        );
        assert_eq!(c.state().message, "Refreshing...");
        assert!(c.state().loading);

        let effects = press(&mut c, &[Key::Char('d')]);
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                generation: 3,
                include_all: false
            }]
        );
        assert_eq!(c.state().message, "Showing dev ports only");
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Char('r'), Key::Char('r')]);

        c.handle(SessionEvent::RegistryLoaded {
            generation: 2,
            records: many(5),
        });
        assert_eq!(c.state().processes, sample());
        assert!(c.state().loading);

        c.handle(SessionEvent::RegistryLoaded {
            generation: 3,
            records: many(5),
        });
        assert_eq!(c.state().processes.len(), 5);
        assert!(!c.state().loading);
        // "Refreshing..." goes away once the scan lands
        assert_eq!(c.state().message, "");
    }

    #[test]
    fn test_refresh_keeps_index_without_filter() {
        let mut c = loaded(many(10));
        press(&mut c, &[Key::Down; 7]);
        press(&mut c, &[Key::Char('r')]);
        c.handle(SessionEvent::RegistryLoaded {
            generation: 2,
            records: many(4),
        });
        assert_eq!(c.state().selected_index, 3);
    }

    #[test]
    fn test_refresh_resets_index_with_filter() {
        let mut c = loaded(many(10));
        press(&mut c, &[Key::Char('/'), Key::Char('0'), Key::Enter]);
        press(&mut c, &[Key::Down; 5]);
        assert!(c.state().selected_index > 0);

        press(&mut c, &[Key::Char('r')]);
        c.handle(SessionEvent::RegistryLoaded {
            generation: 2,
            records: many(10),
        });
        assert_eq!(c.state().selected_index, 0);
    }

    #[test]
    fn test_presentation_toggles() {
        let mut c = loaded(sample());
        assert!(press(&mut c, &[Key::Char('v')]).is_empty());
        assert!(c.state().verbose);
        assert_eq!(c.state().message, "Verbose mode on");
        press(&mut c, &[Key::Char('v')]);
        assert_eq!(c.state().message, "Verbose mode off");

        press(&mut c, &[Key::Char('p')]);
        assert!(c.state().show_paths);
        assert_eq!(c.state().message, "Full paths on");
    }

    #[test]
    fn test_single_kill_confirm_and_cancel() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Enter]);
        assert_eq!(c.state().mode, SessionMode::ConfirmSingleKill { pid: 100 });
        assert!(c.state().message.starts_with("Kill node (PID: 100) on port 3000?"));

        // navigation is suspended while confirming
        assert!(press(&mut c, &[Key::Down, Key::Char('q')]).is_empty());
        assert_eq!(c.state().selected_index, 0);

        press(&mut c, &[Key::Esc]);
        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert_eq!(c.state().message, "Kill cancelled");

        let effects = press(&mut c, &[Key::Char('x'), Key::Char('y')]);
        assert_eq!(
            effects,
            vec![Effect::Kill {
                pids: vec![100],
                batch: false
            }]
        );
        assert_eq!(c.state().mode, SessionMode::Browsing);
    }

    #[test]
    fn test_single_kill_success_schedules_reload() {
        let mut c = loaded(sample());
        let effects = c.handle(SessionEvent::KillFinished {
            outcomes: vec![(100, true)],
            batch: false,
        });
        assert_eq!(c.state().message, "Successfully killed node");
        assert_eq!(
            effects,
            vec![Effect::Schedule {
                delay: Duration::from_millis(500),
                timer: Timer::ReloadAfterKill
            }]
        );

        let effects = c.handle(SessionEvent::Timer(Timer::ReloadAfterKill));
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                generation: 2,
                include_all: true
            }]
        );
        c.handle(SessionEvent::RegistryLoaded {
            generation: 2,
            records: vec![record(8080, 200, "nginx")],
        });
        // the kill message survives its reload
        assert_eq!(c.state().message, "Successfully killed node");
    }

    #[test]
    fn test_admin_retry_flow() {
        let mut c = loaded(sample());
        c.handle(SessionEvent::KillFinished {
            outcomes: vec![(100, false)],
            batch: false,
        });
        assert_eq!(c.state().mode, SessionMode::AwaitingAdminRetry { pid: 100 });
        assert!(c.state().message.starts_with("Failed to kill node."));

        // everything but the admin key and Esc is ignored
        assert!(press(&mut c, &[Key::Char('q'), Key::Down, Key::Enter]).is_empty());
        assert_eq!(c.state().mode, SessionMode::AwaitingAdminRetry { pid: 100 });

        let effects = press(&mut c, &[Key::Char('A')]);
        let label = "node".to_string();
        assert_eq!(
            effects,
            vec![
                Effect::Elevate {
                    pid: 100,
                    label: label.clone()
                },
                Effect::Schedule {
                    delay: Duration::from_millis(1500),
                    timer: Timer::ElevationStatus {
                        pid: 100,
                        label: label.clone()
                    }
                },
                Effect::Schedule {
                    delay: Duration::from_millis(3000),
                    timer: Timer::ElevationVerify {
                        pid: 100,
                        label: label.clone()
                    }
                },
            ]
        );
        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert_eq!(c.state().escalation_pending, Some(100));

        c.handle(SessionEvent::Timer(Timer::ElevationStatus {
            pid: 100,
            label: label.clone(),
        }));
        assert_eq!(c.state().message, "Checking if node was terminated...");

        let effects = c.handle(SessionEvent::Timer(Timer::ElevationVerify {
            pid: 100,
            label: label.clone(),
        }));
        assert_eq!(
            effects,
            vec![Effect::VerifyExists {
                pid: 100,
                label: label.clone()
            }]
        );

        let effects = c.handle(SessionEvent::ExistenceChecked {
            pid: 100,
            label,
            exists: false,
        });
        assert_eq!(
            c.state().message,
            "Admin kill successful! node (PID: 100) has been terminated."
        );
        assert_eq!(c.state().escalation_pending, None);
        assert_eq!(
            effects,
            vec![Effect::Refresh {
                generation: 2,
                include_all: true
            }]
        );
    }

    #[test]
    fn test_admin_retry_unconfirmed() {
        let mut c = loaded(sample());
        let effects = c.handle(SessionEvent::ExistenceChecked {
            pid: 200,
            label: "nginx".to_string(),
            exists: true,
        });
        assert!(effects.is_empty());
        assert!(c.state().message.starts_with("Admin kill failed. nginx"));
    }

    #[test]
    fn test_admin_retry_cancel() {
        let mut c = loaded(sample());
        c.handle(SessionEvent::KillFinished {
            outcomes: vec![(100, false)],
            batch: false,
        });
        press(&mut c, &[Key::Esc]);
        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert_eq!(c.state().message, "");

        // a late timer still updates the message
        c.handle(SessionEvent::Timer(Timer::ElevationStatus {
            pid: 100,
            label: "node".to_string(),
        }));
        assert_eq!(c.state().message, "Checking if node was terminated...");
    }

    #[test]
    fn test_admin_label_falls_back_to_pid() {
        let mut c = loaded(sample());
        c.handle(SessionEvent::KillFinished {
            outcomes: vec![(999, false)],
            batch: false,
        });
        assert!(c.state().message.starts_with("Failed to kill process 999."));
        let effects = press(&mut c, &[Key::Char('a')]);
        assert_eq!(
            effects[0],
            Effect::Elevate {
                pid: 999,
                label: "process 999".to_string()
            }
        );
    }

    #[test]
    fn test_multi_select_and_batch_kill() {
        let mut c = loaded(vec![
            record(3000, 100, "node"),
            record(5173, 300, "vite"),
            record(8080, 200, "nginx"),
        ]);
        // select nginx first, then node: kill order still follows the snapshot
        press(&mut c, &[Key::Down, Key::Down, Key::Char(' '), Key::Up, Key::Up, Key::Char(' ')]);
        assert_eq!(c.state().selected_pids.len(), 2);
        assert_eq!(c.state().message, "2 selected");

        press(&mut c, &[Key::Enter]);
        assert_eq!(
            c.state().mode,
            SessionMode::ConfirmMultiKill {
                pids: vec![100, 200]
            }
        );

        let effects = press(&mut c, &[Key::Enter]);
        assert_eq!(
            effects,
            vec![Effect::Kill {
                pids: vec![100, 200],
                batch: true
            }]
        );

        let effects = c.handle(SessionEvent::KillFinished {
            outcomes: vec![(100, true), (200, false)],
            batch: true,
        });
        // batch failures do not open the admin prompt
        assert_eq!(c.state().mode, SessionMode::Browsing);
        assert_eq!(
            c.state().message,
            "Killed 1 of 2 processes. Failed: nginx (PID: 200)"
        );
        assert_eq!(c.state().selected_pids, BTreeSet::from([200]));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_batch_failures_cleared_when_not_retained() {
        let settings = SessionSettings {
            retain_failed_selection: false,
            ..SessionSettings::default()
        };
        let mut c = SessionController::new(settings);
        c.start();
        c.handle(SessionEvent::RegistryLoaded {
            generation: 1,
            records: sample(),
        });
        press(&mut c, &[Key::Char(' ')]);

        let effects = c.handle(SessionEvent::KillFinished {
            outcomes: vec![(100, false)],
            batch: true,
        });
        assert!(effects.is_empty());
        assert!(c.state().selected_pids.is_empty());
    }

    #[test]
    fn test_selection_pruned_on_refresh() {
        let mut c = loaded(sample());
        press(&mut c, &[Key::Char(' '), Key::Down, Key::Char(' ')]);
        press(&mut c, &[Key::Char('r')]);
        c.handle(SessionEvent::RegistryLoaded {
            generation: 2,
            records: vec![record(8080, 200, "nginx")],
        });
        assert_eq!(c.state().selected_pids, BTreeSet::from([200]));
    }

    #[test]
    fn test_resize_recomputes_viewport() {
        let mut c = loaded(many(40));
        c.handle(SessionEvent::Resize { rows: 24 });
        assert_eq!(c.state().viewport_height, 10);

        press(&mut c, &[Key::Down; 12]);
        assert_eq!(c.state().scroll_offset, 3);
        assert_eq!(c.state().visible_rows().len(), 10);
        assert_eq!(c.state().visible_rows()[9].pid, 1012);

        c.handle(SessionEvent::Resize { rows: 10 });
        assert_eq!(c.state().viewport_height, 5);
        assert_eq!(c.state().scroll_offset, 8);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn key_strategy() -> impl Strategy<Value = Key> {
            prop_oneof![
                Just(Key::Up),
                Just(Key::Down),
                Just(Key::Enter),
                Just(Key::Esc),
                Just(Key::Backspace),
                Just(Key::Char('/')),
                Just(Key::Char('c')),
                Just(Key::Char(' ')),
                Just(Key::Char('a')),
                Just(Key::Char('j')),
                Just(Key::Char('k')),
                prop::char::range('0', '9').prop_map(Key::Char),
            ]
        }

        proptest! {
            #[test]
            fn selected_index_stays_in_bounds(
                n in 0u32..40,
                keys in proptest::collection::vec(key_strategy(), 0..80),
                rows in 0u16..60,
            ) {
                let mut c = loaded(many(n));
                c.handle(SessionEvent::Resize { rows });
                for key in keys {
                    c.handle(SessionEvent::Input(key));
                    let state = c.state();
                    let len = state.filtered.len();
                    prop_assert!(state.selected_index <= len.saturating_sub(1));
                    if len > 0 {
                        prop_assert!(state.scroll_offset <= state.selected_index);
                        prop_assert!(state.selected_index < state.scroll_offset + state.viewport_height);
                    }
                }
            }
        }
    }
}
