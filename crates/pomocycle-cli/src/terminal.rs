//! Plain-terminal front end for the worker.
//!
//! A change of slot or phase prints a full block; countdown ticks only
//! rewrite the clock line in place.

use std::io::Write;

use pomocycle_core::storage::NotificationsConfig;
use pomocycle_core::{Alert, Frontend, TimerPhase, TimerView};

use crate::notify;

pub struct TerminalFrontend {
    notifications: NotificationsConfig,
    last: Option<(TimerPhase, usize, usize)>,
}

impl TerminalFrontend {
    pub fn new(notifications: NotificationsConfig) -> Self {
        Self {
            notifications,
            last: None,
        }
    }

    fn desktop_enabled(&self) -> bool {
        self.notifications.enabled && self.notifications.desktop
    }
}

impl Frontend for TerminalFrontend {
    fn render(&mut self, view: &TimerView) {
        let key = (view.phase, view.current_index, view.slot_count);
        let mut out = std::io::stdout().lock();
        if self.last == Some(key) {
            let _ = write!(out, "\r{}", clock_line(view));
        } else {
            let _ = write!(out, "\n{}\n{}", describe(view), clock_line(view));
            self.last = Some(key);
        }
        let _ = out.flush();
    }

    fn alert(&mut self, alert: &Alert) {
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{}", banner(alert));
        if self.notifications.enabled {
            let _ = out.write_all(b"\x07");
        }
        let _ = out.flush();

        if self.desktop_enabled() {
            notify::send(&alert.title, &alert.message, self.notifications.timeout_ms);
        }
    }
}

/// In-terminal completion banner, shown whatever the notification settings.
pub fn banner(alert: &Alert) -> String {
    format!("\n\n*** {} ***\n{}\n\n", alert.title, alert.message)
}

/// Multi-line summary: current slot, recent history and what is next.
pub fn describe(view: &TimerView) -> String {
    let mut lines = vec![format!(
        "{}   [slot {}/{}, work {}/{}]",
        view.headline(),
        (view.current_index + 1).min(view.slot_count),
        view.slot_count,
        view.work_completed,
        view.work_total
    )];

    let done: Vec<String> = view
        .recent_completed
        .iter()
        .map(|s| format!("✓ {}", s.label()))
        .collect();
    lines.push(format!(
        "  done: {}",
        if done.is_empty() { "None yet".to_string() } else { done.join(", ") }
    ));

    let next: Vec<String> = view.upcoming.iter().map(|s| format!("• {}", s.label())).collect();
    lines.push(format!(
        "  next: {}",
        if next.is_empty() { "Last one!".to_string() } else { next.join(", ") }
    ));
    lines.join("\n")
}

/// The single line rewritten on every tick.
pub fn clock_line(view: &TimerView) -> String {
    match view.phase {
        TimerPhase::Finished => {
            let label = view.current.as_ref().map(|s| s.label()).unwrap_or_default();
            let hint = if view.is_last_slot {
                "next: start new cycle | reset: repeat"
            } else {
                "next: next session | reset: repeat"
            };
            format!("  00:00 - {label} Complete!   ({hint})   ")
        }
        phase => {
            let hint = match phase {
                TimerPhase::Ready => "start | skip | reset",
                TimerPhase::Running => "pause | reset",
                _ => "start: resume | skip | reset",
            };
            format!("  {}  {:<8} ({hint})   ", view.display, phase.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomocycle_core::{CycleSettings, TimerEngine};

    fn view() -> TimerView {
        let settings = CycleSettings {
            max_surprises: 0,
            long_break_frequency: 0,
            ..CycleSettings::default()
        };
        TimerEngine::with_seed(settings, 1).view()
    }

    #[test]
    fn describe_fresh_cycle() {
        let text = describe(&view());
        assert!(text.starts_with("Work Session 1 (25 min)"));
        assert!(text.contains("done: None yet"));
        assert!(text.contains("• Short Break, • Work Session 2, • Short Break"));
    }

    #[test]
    fn disabled_notifications_keep_the_banner() {
        let alert = Alert {
            title: "Work Session 1 complete!".to_string(),
            message: "Up next: Short Break (5 min)".to_string(),
        };
        let quiet = TerminalFrontend::new(NotificationsConfig {
            enabled: false,
            desktop: true,
            timeout_ms: 5000,
        });
        assert!(!quiet.desktop_enabled());

        let text = banner(&alert);
        assert!(text.contains("*** Work Session 1 complete! ***"));
        assert!(text.contains("Up next: Short Break (5 min)"));
    }

    #[test]
    fn clock_line_shows_time_and_hints() {
        let line = clock_line(&view());
        assert!(line.contains("25:00"));
        assert!(line.contains("ready"));
        assert!(line.contains("start | skip | reset"));
    }
}
