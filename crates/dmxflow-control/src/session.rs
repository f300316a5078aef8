//! The controlling session
//!
//! A [`Session`] owns the frame, the serial link, the colour cycle and the
//! scheduler. Every change to the frame goes through it, so the presentation
//! layer only ever reads [`Session::color`] and [`Session::status`].

use tokio::time::Instant;
use tracing::info;

use crate::cycle::{CycleController, CycleInterval};
use crate::dmx::{
    ChannelMapper, ColorChannel, DmxFrame, LinkSettings, LinkTransmitter, MasterDimmer,
    PortOpener, Rgb,
};
use crate::scheduler::{Activity, Scheduler, REFRESH_PERIOD};
use crate::Result;

/// A user-facing action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect(String),
    Disconnect,
    SetChannel(ColorChannel, u8),
    SetRgb(Rgb),
    AllOn,
    AllOff,
    StartCycle(CycleInterval),
    StopCycle,
    /// Refresh the status text without changing anything
    Status,
    /// Stop both activities and close the link
    Shutdown,
}

/// Owns all DMX state for one controller
pub struct Session {
    frame: DmxFrame,
    link: LinkTransmitter,
    cycle: CycleController,
    scheduler: Scheduler,
    color: Rgb,
    status: String,
}

impl Session {
    pub fn new(opener: Box<dyn PortOpener>) -> Self {
        Self::with_settings(opener, LinkSettings::DMX512)
    }

    pub fn with_settings(opener: Box<dyn PortOpener>, settings: LinkSettings) -> Self {
        Self {
            frame: DmxFrame::new(),
            link: LinkTransmitter::with_settings(opener, settings),
            cycle: CycleController::new(),
            scheduler: Scheduler::new(),
            color: Rgb::BLACK,
            status: "Not connected.".to_string(),
        }
    }

    /// Session backed by real serial ports
    #[cfg(feature = "serial")]
    pub fn serial() -> Self {
        Self::new(Box::new(crate::dmx::SerialPortOpener))
    }

    /// Run one command
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Connect(port) => return self.connect(&port),
            Command::Disconnect => self.disconnect(),
            Command::SetChannel(channel, value) => self.set_channel(channel, value),
            Command::SetRgb(color) => self.set_rgb(color),
            Command::AllOn => self.all_on(),
            Command::AllOff => self.all_off(),
            Command::StartCycle(interval) => self.start_cycle(interval),
            Command::StopCycle => self.stop_cycle(),
            Command::Status => self.status = self.describe(),
            Command::Shutdown => self.shutdown(),
        }
        Ok(())
    }

    /// Open the link, blank the rig, send one frame and start refreshing.
    ///
    /// Both periodic activities are stopped and any open link is closed
    /// before the new one is opened, so no stale tick can write to it.
    pub fn connect(&mut self, port: &str) -> Result<()> {
        self.scheduler.stop_all();
        self.cycle.stop();

        if let Err(e) = self.link.connect(port) {
            self.status = format!("Error: {}", e);
            return Err(e);
        }

        self.frame.clear();
        MasterDimmer::recompute(&mut self.frame);
        self.color = Rgb::BLACK;
        self.link.transmit_best_effort(&self.frame);

        self.scheduler
            .start(Activity::FrameRefresh, REFRESH_PERIOD, Instant::now());
        self.status = "Connected. All LEDs off.".to_string();
        Ok(())
    }

    /// Stop everything and close the link. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.scheduler.stop_all();
        self.cycle.stop();
        self.status = if self.link.disconnect() {
            "Disconnected.".to_string()
        } else {
            "Not connected.".to_string()
        };
    }

    /// Set one colour on every fixture.
    ///
    /// A running cycle is left alone and will overwrite this on its next step.
    pub fn set_channel(&mut self, channel: ColorChannel, value: u8) {
        ChannelMapper::apply_channel(&mut self.frame, channel, value);
        self.color.set(channel, value);
        self.status = self.describe();
    }

    pub fn set_red(&mut self, value: u8) {
        self.set_channel(ColorChannel::Red, value);
    }

    pub fn set_green(&mut self, value: u8) {
        self.set_channel(ColorChannel::Green, value);
    }

    pub fn set_blue(&mut self, value: u8) {
        self.set_channel(ColorChannel::Blue, value);
    }

    /// Set all three colours on every fixture
    pub fn set_rgb(&mut self, color: Rgb) {
        ChannelMapper::apply_rgb(&mut self.frame, color);
        self.color = color;
        self.status = self.describe();
    }

    /// Stop the cycle and blank every channel
    pub fn all_off(&mut self) {
        self.stop_cycle();
        self.frame.clear();
        self.color = Rgb::BLACK;
        MasterDimmer::recompute(&mut self.frame);
        self.link.transmit_best_effort(&self.frame);
        self.status = "All off".to_string();
    }

    /// Stop the cycle and drive every channel (not only the fixtures) to full
    pub fn all_on(&mut self) {
        self.stop_cycle();
        self.frame.fill(255);
        self.color = Rgb::WHITE;
        MasterDimmer::recompute(&mut self.frame);
        self.link.transmit_best_effort(&self.frame);
        self.status = "All on".to_string();
    }

    /// Start (or restart) the green/red cycle, showing green immediately
    pub fn start_cycle(&mut self, interval: CycleInterval) {
        self.color = self.cycle.start(interval, &mut self.frame);
        self.scheduler
            .start(Activity::CycleStep, interval.duration(), Instant::now());
        self.status = format!("Color cycle started ({} ms).", interval.as_millis());
    }

    pub fn stop_cycle(&mut self) {
        self.scheduler.stop(Activity::CycleStep);
        self.cycle.stop();
    }

    /// Run every activity that is due at `now`. Returns how many ran.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.scheduler.take_due(now);
        for &activity in &due {
            self.run_activity(activity);
        }
        due.len()
    }

    /// Run one activity immediately
    pub fn run_activity(&mut self, activity: Activity) {
        match activity {
            Activity::FrameRefresh => {
                if self.link.transmit_best_effort(&self.frame) {
                    self.status = self.describe();
                }
            }
            Activity::CycleStep => {
                if let Some(color) = self.cycle.step(&mut self.frame) {
                    self.color = color;
                }
            }
        }
    }

    /// Stop both activities and release the link
    pub fn shutdown(&mut self) {
        info!("Shutting down DMX session");
        self.disconnect();
    }

    /// Fixture 0 and dimmer values as last written
    pub fn describe(&self) -> String {
        format!(
            "DMX: Dimmer={} R={} G={} B={}",
            self.frame.get(MasterDimmer::CHANNEL),
            self.frame.get(4),
            self.frame.get(2),
            self.frame.get(3)
        )
    }

    pub fn frame(&self) -> &DmxFrame {
        &self.frame
    }

    /// Current colour inputs, as a presentation layer would show them
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.link.port_name()
    }

    pub fn frames_sent(&self) -> u64 {
        self.link.frames_sent()
    }

    pub fn cycle(&self) -> &CycleController {
        &self.cycle
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }
}
