use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use respair::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const SPINNER_TICKS: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

/// Owns the terminal while a command runs.
///
/// A batch of several trajectories gets a counter line; below it, one line follows the
/// current phase of the current file. Log records arrive over the same channel as
/// progress events and are printed above both lines.
pub struct UiManager {
    mp: MultiProgress,
    batch: Option<ProgressBar>,
    current_file: Option<String>,
    phase: Option<PhaseLine>,
    events: mpsc::Receiver<UiEvent>,
    shutdown: watch::Receiver<bool>,
}

struct PhaseLine {
    bar: ProgressBar,
    name: String,
    status: Option<String>,
    skipped: u64,
}

impl PhaseLine {
    fn refresh(&self) {
        let mut message = self.name.clone();
        if let Some(status) = &self.status {
            message.push_str(&format!(" ({})", status));
        }
        if self.skipped > 0 {
            message.push_str(&format!(" [{} skipped]", self.skipped));
        }
        self.bar.set_message(message);
    }

    fn summary(&self) -> String {
        match self.skipped {
            0 => format!("  ✓ {}", self.name),
            n => format!("  ✓ {} ({} pair(s) skipped)", self.name, n),
        }
    }
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, events) = mpsc::channel(1024);
        let (shutdown_sender, shutdown) = watch::channel(false);
        let mp = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let manager = Self {
            mp,
            batch: None,
            current_file: None,
            phase: None,
            events,
            shutdown,
        };
        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.handle_event(event),
                result = self.shutdown.changed() => {
                    if result.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
        self.clear_phase();
        if let Some(batch) = self.batch.take() {
            batch.finish_and_clear();
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line.trim_end()),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::FileStart { index, total, path } => {
                let name = path.display().to_string();
                if total > 1 {
                    let batch = self.batch.get_or_insert_with(|| {
                        let bar = self.mp.add(ProgressBar::new(total as u64));
                        bar.set_style(batch_style());
                        bar
                    });
                    batch.set_position(index as u64);
                    batch.set_message(name.clone());
                }
                self.print(&format!("▶ {}", name));
                self.current_file = Some(name);
            }
            Progress::FileFinish { succeeded } => {
                self.clear_phase();
                if let Some(batch) = &self.batch {
                    batch.inc(1);
                }
                if let Some(name) = self.current_file.take() {
                    let mark = if succeeded { "✓" } else { "✗" };
                    self.print(&format!("{} {}", mark, name));
                }
            }
            Progress::PhaseStart { name } => {
                self.clear_phase();
                let bar = self.mp.add(ProgressBar::new_spinner());
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(80));
                let line = PhaseLine {
                    bar,
                    name,
                    status: None,
                    skipped: 0,
                };
                line.refresh();
                self.phase = Some(line);
            }
            Progress::PhaseFinish => {
                if let Some(line) = self.phase.take() {
                    line.bar.finish_and_clear();
                    self.print(&line.summary());
                }
            }
            Progress::TaskStart { total } => {
                if let Some(line) = &self.phase {
                    line.bar.disable_steady_tick();
                    line.bar.set_style(pair_bar_style());
                    line.bar.set_length(total);
                    line.bar.set_position(0);
                }
            }
            Progress::TaskIncrement { amount } => {
                if let Some(line) = &self.phase {
                    line.bar.inc(amount);
                }
            }
            Progress::TaskFinish => {
                if let Some(line) = &self.phase {
                    line.bar.finish();
                }
            }
            Progress::StatusUpdate { text } => {
                if let Some(line) = &mut self.phase {
                    line.status = Some(text);
                    line.refresh();
                }
            }
            Progress::PairSkipped { .. } => {
                if let Some(line) = &mut self.phase {
                    line.skipped += 1;
                    line.refresh();
                }
            }
        }
    }

    fn clear_phase(&mut self) {
        if let Some(line) = self.phase.take() {
            line.bar.finish_and_clear();
        }
    }

    fn print(&self, line: &str) {
        self.mp.println(line).ok();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(SPINNER_TICKS)
}

fn pair_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<40} [{bar:40.cyan/blue}] {pos}/{len} pairs ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
        })
        .progress_chars("━╸ ")
}

fn batch_style() -> ProgressStyle {
    ProgressStyle::with_template("Trajectories {pos}/{len} [{bar:20.green}] {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▌ ")
}

#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}
