//! Two-colour alternation (green <-> red)

use std::fmt;
use std::time::Duration;
use tracing::info;

use crate::dmx::{ChannelMapper, DmxFrame, Rgb};

/// Phase of the colour cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    GreenActive,
    RedActive,
}

impl CyclePhase {
    /// Colour shown during this phase
    pub fn color(self) -> Rgb {
        match self {
            CyclePhase::GreenActive => Rgb::GREEN,
            CyclePhase::RedActive => Rgb::RED,
        }
    }

    /// The other phase
    pub fn toggled(self) -> Self {
        match self {
            CyclePhase::GreenActive => CyclePhase::RedActive,
            CyclePhase::RedActive => CyclePhase::GreenActive,
        }
    }
}

/// Step interval of the colour cycle.
///
/// Anything below [`CycleInterval::MIN_MS`] or not a number falls back to
/// [`CycleInterval::DEFAULT_MS`]; invalid input is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleInterval(Duration);

impl CycleInterval {
    pub const MIN_MS: u64 = 100;
    pub const DEFAULT_MS: u64 = 1000;

    pub fn from_millis(ms: i64) -> Self {
        match u64::try_from(ms) {
            Ok(ms) if ms >= Self::MIN_MS => Self(Duration::from_millis(ms)),
            _ => Self::default(),
        }
    }

    /// Lenient parse of user text (surrounding whitespace and a sign are
    /// allowed). Only 32-bit integers count as valid input.
    pub fn parse(input: &str) -> Self {
        input
            .trim()
            .parse::<i32>()
            .map(|ms| Self::from_millis(i64::from(ms)))
            .unwrap_or_default()
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u64 {
        self.0.as_millis() as u64
    }
}

impl Default for CycleInterval {
    fn default() -> Self {
        Self(Duration::from_millis(Self::DEFAULT_MS))
    }
}

impl fmt::Display for CycleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.as_millis())
    }
}

/// Drives the green/red alternation.
///
/// The controller only holds state; the periodic driving is done by the
/// [`Scheduler`](crate::scheduler::Scheduler), which calls [`step`](Self::step)
/// once per interval.
#[derive(Debug, Clone)]
pub struct CycleController {
    phase: Option<CyclePhase>,
    interval: CycleInterval,
    steps: u64,
}

impl CycleController {
    pub fn new() -> Self {
        Self {
            phase: None,
            interval: CycleInterval::default(),
            steps: 0,
        }
    }

    /// Start in the green phase and apply it right away.
    ///
    /// Restarting a running cycle resets it to green.
    pub fn start(&mut self, interval: CycleInterval, frame: &mut DmxFrame) -> Rgb {
        info!("Colour cycle: Start ({})", interval);
        self.interval = interval;
        self.phase = Some(CyclePhase::GreenActive);
        self.steps = 0;
        Self::apply(CyclePhase::GreenActive, frame)
    }

    /// Toggle the phase and apply its colour. Does nothing when stopped.
    pub fn step(&mut self, frame: &mut DmxFrame) -> Option<Rgb> {
        let next = self.phase?.toggled();
        self.phase = Some(next);
        self.steps += 1;
        Some(Self::apply(next, frame))
    }

    /// Stop the cycle. Returns whether it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.phase.take().is_some();
        if was_running {
            info!("Colour cycle: Stop after {} steps", self.steps);
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_some()
    }

    pub fn phase(&self) -> Option<CyclePhase> {
        self.phase
    }

    pub fn interval(&self) -> CycleInterval {
        self.interval
    }

    /// Steps taken since the last start
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn apply(phase: CyclePhase, frame: &mut DmxFrame) -> Rgb {
        let color = phase.color();
        ChannelMapper::apply_rgb(frame, color);
        color
    }
}

impl Default for CycleController {
    fn default() -> Self {
        Self::new()
    }
}
