//! Cooperative scheduling of the two periodic activities
//!
//! The scheduler does no waiting itself. The event loop asks it for the next
//! deadline, sleeps until then, and collects the activities that are due.

use std::time::Duration;
use tokio::time::Instant;

/// Frame refresh period (40Hz)
pub const REFRESH_PERIOD: Duration = Duration::from_millis(25);

/// A periodic activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activity {
    /// Retransmit the frame
    FrameRefresh,
    /// Advance the colour cycle
    CycleStep,
}

#[derive(Debug, Clone, Copy)]
struct Periodic {
    period: Duration,
    next_due: Instant,
}

/// Two independent periodic timers
#[derive(Debug, Default)]
pub struct Scheduler {
    refresh: Option<Periodic>,
    cycle: Option<Periodic>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) an activity; the first run is one period from `now`
    pub fn start(&mut self, activity: Activity, period: Duration, now: Instant) {
        tracing::debug!("Scheduling {:?} every {:?}", activity, period);
        *self.slot(activity) = Some(Periodic {
            period,
            next_due: now + period,
        });
    }

    /// Stop an activity before its next run. Returns whether it was running.
    pub fn stop(&mut self, activity: Activity) -> bool {
        self.slot(activity).take().is_some()
    }

    pub fn stop_all(&mut self) {
        self.refresh = None;
        self.cycle = None;
    }

    pub fn is_running(&self, activity: Activity) -> bool {
        self.get(activity).is_some()
    }

    pub fn period(&self, activity: Activity) -> Option<Duration> {
        self.get(activity).map(|p| p.period)
    }

    /// Earliest upcoming run, if anything is scheduled
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.refresh, self.cycle]
            .iter()
            .flatten()
            .map(|p| p.next_due)
            .min()
    }

    /// Activities due at `now`, refresh first, each advanced to its next run.
    ///
    /// An activity runs at most once per call; if it fell more than a period
    /// behind, the missed runs are skipped rather than replayed.
    pub fn take_due(&mut self, now: Instant) -> Vec<Activity> {
        let mut due = Vec::with_capacity(2);
        for activity in [Activity::FrameRefresh, Activity::CycleStep] {
            if let Some(p) = self.slot(activity) {
                if p.next_due <= now {
                    p.next_due += p.period;
                    if p.next_due <= now {
                        p.next_due = now + p.period;
                    }
                    due.push(activity);
                }
            }
        }
        due
    }

    fn get(&self, activity: Activity) -> Option<&Periodic> {
        match activity {
            Activity::FrameRefresh => self.refresh.as_ref(),
            Activity::CycleStep => self.cycle.as_ref(),
        }
    }

    fn slot(&mut self, activity: Activity) -> &mut Option<Periodic> {
        match activity {
            Activity::FrameRefresh => &mut self.refresh,
            Activity::CycleStep => &mut self.cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_nothing_scheduled() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.next_deadline(), None);
        assert!(scheduler.take_due(Instant::now()).is_empty());
    }

    #[test]
    fn test_refresh_cadence() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start(Activity::FrameRefresh, REFRESH_PERIOD, t0);

        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(25)));
        assert!(scheduler.take_due(t0 + ms(24)).is_empty());
        assert_eq!(scheduler.take_due(t0 + ms(25)), vec![Activity::FrameRefresh]);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(50)));
    }

    #[test]
    fn test_independent_periods() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start(Activity::FrameRefresh, ms(25), t0);
        scheduler.start(Activity::CycleStep, ms(100), t0);

        let mut refreshes = 0;
        let mut steps = 0;
        for tick in 1..=40 {
            for activity in scheduler.take_due(t0 + ms(tick * 5)) {
                match activity {
                    Activity::FrameRefresh => refreshes += 1,
                    Activity::CycleStep => steps += 1,
                }
            }
        }
        // 200ms of virtual time
        assert_eq!(refreshes, 8);
        assert_eq!(steps, 2);
    }

    #[test]
    fn test_both_due_refresh_first() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start(Activity::CycleStep, ms(100), t0);
        scheduler.start(Activity::FrameRefresh, ms(25), t0);

        scheduler.take_due(t0 + ms(75));
        assert_eq!(
            scheduler.take_due(t0 + ms(100)),
            vec![Activity::FrameRefresh, Activity::CycleStep]
        );
    }

    #[test]
    fn test_missed_runs_are_skipped() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start(Activity::FrameRefresh, ms(25), t0);

        assert_eq!(scheduler.take_due(t0 + ms(1000)).len(), 1);
        assert_eq!(scheduler.next_deadline(), Some(t0 + ms(1025)));
    }

    #[test]
    fn test_stop_prevents_next_run() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.start(Activity::CycleStep, ms(100), t0);

        assert!(scheduler.stop(Activity::CycleStep));
        assert!(!scheduler.stop(Activity::CycleStep));
        assert!(scheduler.take_due(t0 + ms(100)).is_empty());
        assert_eq!(scheduler.period(Activity::CycleStep), None);
    }
}
