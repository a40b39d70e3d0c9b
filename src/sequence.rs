//! Start-up reveal sequence
//!
//! The screen appears in stages: the container first, then title, subtitle
//! and description one step apart, then every form element staggered in
//! document order. The stages are a flat list of `(target, offset)` steps
//! played by a single timer task.

use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::config::Timing;

/// Something on screen that starts hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Container,
    Title,
    Subtitle,
    Description,
    FormElement(usize),  // Document order: label, input, ..., submit button
}

/// Reveal `target` at `at` after the sequence starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub target: Target,
    pub at: Duration,
}

/// Build the reveal schedule for a form with `form_elements` elements
pub fn reveal_steps(timing: &Timing, form_elements: usize) -> Vec<Step> {
    let start = Duration::from_millis(timing.start_ms);
    let step = Duration::from_millis(timing.step_ms);
    let stagger = Duration::from_millis(timing.stagger_ms);

    let mut steps = vec![
        Step { target: Target::Container, at: Duration::ZERO },
        Step { target: Target::Title, at: start },
        Step { target: Target::Subtitle, at: start + step },
        Step { target: Target::Description, at: start + step * 2 },
    ];

    // The form stagger begins one step after the description
    let form_start = start + step * 3;
    steps.extend((0..form_elements).map(|k| Step {
        target: Target::FormElement(k),
        at: form_start + stagger * (k as u32 + 1),
    }));

    steps
}

/// Play `steps` in order, sending each target when its offset is reached
pub async fn play(steps: Vec<Step>, tx: mpsc::UnboundedSender<Target>) {
    let start = Instant::now();
    for step in steps {
        sleep_until(start + step.at).await;
        if tx.send(step.target).is_err() {
            // Receiver gone, nobody is watching
            return;
        }
    }
    tracing::debug!("Reveal sequence finished");
}

/// Tracks which targets are visible while the sequence plays
pub struct Reveal {
    revealed: HashSet<Target>,
    all: Vec<Target>,
    rx: Option<mpsc::UnboundedReceiver<Target>>,
    task: Option<JoinHandle<()>>,
}

impl Reveal {
    /// Spawn the timer task for `steps`
    pub fn start(steps: Vec<Step>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let all = steps.iter().map(|s| s.target).collect();
        let task = tokio::spawn(play(steps, tx));

        Self {
            revealed: HashSet::new(),
            all,
            rx: Some(rx),
            task: Some(task),
        }
    }

    /// Everything visible from the start
    pub fn immediate(steps: &[Step]) -> Self {
        let all: Vec<Target> = steps.iter().map(|s| s.target).collect();
        Self {
            revealed: all.iter().copied().collect(),
            all,
            rx: None,
            task: None,
        }
    }

    /// Apply reveals that have fired since the last call
    pub fn poll(&mut self) {
        let Some(rx) = self.rx.as_mut() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(target) => {
                    self.revealed.insert(target);
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.rx = None;
                    self.task = None;
                    break;
                }
            }
        }
    }

    /// Skip the rest of the sequence
    pub fn finish(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.rx = None;
        self.revealed.extend(self.all.iter().copied());
    }

    pub fn is_visible(&self, target: Target) -> bool {
        self.revealed.contains(&target)
    }

    pub fn is_complete(&self) -> bool {
        self.revealed.len() == self.all.len()
    }
}

impl Drop for Reveal {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
