//! Remote command vocabulary and brightness policy
//!
//! Maps the 32-bit frames of the lab-kit remote onto dimmer actions and
//! ties the three state machines together: decoded frames and repeat codes
//! come in from the capture ISR path, cadence ticks from the repeat timer
//! ISR, and the PWM compare ISR pulls phases out of the shared [`SoftPwm`].

use crate::nec::NecEvent;
use crate::pwm::SoftPwm;
use crate::repeat::{AutoRepeat, StepKind};

/// Frames sent by the remote shipped with the lab kit.
pub mod codes {
    /// Volume up: one brightness step up
    pub const VOLUME_UP: u32 = 0x00FF_5AA5;
    /// Volume down: one brightness step down
    pub const VOLUME_DOWN: u32 = 0x00FF_10EF;
    /// Channel up: full brightness
    pub const CHANNEL_UP: u32 = 0x00FF_18E7;
    /// Channel down: off
    pub const CHANNEL_DOWN: u32 = 0x00FF_4AB5;
}

/// Brightness change per volume step
pub const STEP_PERCENT: u8 = 10;

/// Recognized remote buttons
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    /// Step brightness up
    VolumeUp,
    /// Step brightness down
    VolumeDown,
    /// Jump to full brightness
    ChannelUp,
    /// Turn the output off
    ChannelDown,
}

impl Command {
    /// Look up a decoded frame. Frames from other remotes decode fine but
    /// map to no button.
    pub fn from_frame(raw: u32) -> Option<Command> {
        match raw {
            codes::VOLUME_UP => Some(Command::VolumeUp),
            codes::VOLUME_DOWN => Some(Command::VolumeDown),
            codes::CHANNEL_UP => Some(Command::ChannelUp),
            codes::CHANNEL_DOWN => Some(Command::ChannelDown),
            _ => None,
        }
    }
}

/// LED dimmer driven by the IR receiver
pub struct Dimmer {
    pwm: SoftPwm,
    repeat: AutoRepeat,
}

impl Dimmer {
    /// Dimmer over the given PWM period, starting dark
    pub const fn new(period: u16) -> Self {
        Dimmer {
            pwm: SoftPwm::new(period),
            repeat: AutoRepeat::new(),
        }
    }

    /// Current brightness percentage
    pub fn percent(&self) -> u8 {
        self.pwm.percent()
    }

    /// PWM phase machine, for the compare ISR
    pub fn pwm(&mut self) -> &mut SoftPwm {
        &mut self.pwm
    }

    /// Whether a held button is still being repeated
    pub fn repeating(&self) -> bool {
        self.repeat.is_active()
    }

    /// Handle a decoder event. Called on the capture ISR path whenever a
    /// frame completes or a repeat code arrives.
    pub fn handle(&mut self, event: NecEvent) {
        match event {
            NecEvent::Command(raw) => match Command::from_frame(raw) {
                Some(Command::VolumeUp) => {
                    self.apply_step(StepKind::Increment);
                    self.repeat.hold(StepKind::Increment);
                }
                Some(Command::VolumeDown) => {
                    self.apply_step(StepKind::Decrement);
                    self.repeat.hold(StepKind::Decrement);
                }
                Some(Command::ChannelUp) => {
                    self.pwm.set_percent(100);
                    self.repeat.cancel();
                }
                Some(Command::ChannelDown) => {
                    self.pwm.set_percent(0);
                    self.repeat.cancel();
                }
                // Unknown frames actuate nothing but still end a hold
                None => self.repeat.cancel(),
            },
            NecEvent::Repeat => self.repeat.refresh(),
        }
    }

    /// Advance the 100 ms repeat cadence. Called from the repeat timer ISR.
    pub fn cadence_tick(&mut self) {
        if let Some(kind) = self.repeat.tick() {
            self.apply_step(kind);
        }
    }

    fn apply_step(&mut self, kind: StepKind) {
        let percent = self.pwm.percent();
        let next = match kind {
            StepKind::Increment => percent.saturating_add(STEP_PERCENT),
            StepKind::Decrement => percent.saturating_sub(STEP_PERCENT),
        };
        self.pwm.set_percent(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::{DecodeState, NecDecoder};
    use crate::pulse::{Edge, PulseEvent};

    #[test]
    fn volume_steps_move_brightness() {
        let mut dimmer = Dimmer::new(1000);
        dimmer.handle(NecEvent::Command(codes::VOLUME_UP));
        dimmer.handle(NecEvent::Command(codes::VOLUME_UP));
        assert_eq!(dimmer.percent(), 20);
        dimmer.handle(NecEvent::Command(codes::VOLUME_DOWN));
        assert_eq!(dimmer.percent(), 10);
    }

    #[test]
    fn steps_clamp_at_both_ends() {
        let mut dimmer = Dimmer::new(1000);
        dimmer.handle(NecEvent::Command(codes::VOLUME_DOWN));
        assert_eq!(dimmer.percent(), 0);
        for _ in 0..12 {
            dimmer.handle(NecEvent::Command(codes::VOLUME_UP));
        }
        assert_eq!(dimmer.percent(), 100);
    }

    #[test]
    fn channel_buttons_jump_and_cancel_repeat() {
        let mut dimmer = Dimmer::new(1000);
        dimmer.handle(NecEvent::Command(codes::VOLUME_UP));
        assert!(dimmer.repeating());
        dimmer.handle(NecEvent::Command(codes::CHANNEL_UP));
        assert_eq!(dimmer.percent(), 100);
        assert!(!dimmer.repeating());
        dimmer.handle(NecEvent::Command(codes::CHANNEL_DOWN));
        assert_eq!(dimmer.percent(), 0);
    }

    #[test]
    fn unknown_frame_cancels_repeat_without_actuating() {
        let mut dimmer = Dimmer::new(1000);
        dimmer.handle(NecEvent::Command(codes::VOLUME_UP));
        assert!(dimmer.repeating());
        dimmer.handle(NecEvent::Command(0x00FF_A25D));
        assert_eq!(dimmer.percent(), 10);
        assert!(!dimmer.repeating());
    }

    #[test]
    fn held_button_keeps_stepping_on_cadence() {
        let mut dimmer = Dimmer::new(1000);
        dimmer.handle(NecEvent::Command(codes::VOLUME_UP)); // 10 %
        dimmer.cadence_tick(); // 20 %
        dimmer.handle(NecEvent::Repeat); // refresh silence clock
        dimmer.cadence_tick(); // 30 %
        dimmer.cadence_tick(); // 40 %, hold expires
        dimmer.cadence_tick(); // inactive
        assert_eq!(dimmer.percent(), 40);
        assert!(!dimmer.repeating());
    }

    /// End-to-end: edges in, brightness out.
    #[test]
    fn decoded_frame_drives_the_dimmer() {
        let mut dec = NecDecoder::new();
        let mut dimmer = Dimmer::new(1000);

        let mut feed = |dec: &mut NecDecoder, delta, edge| {
            if let Some(event) = dec.feed(PulseEvent { delta, edge }) {
                dimmer.handle(event);
            }
        };

        feed(&mut dec, 40_000, Edge::Falling);
        feed(&mut dec, 9000, Edge::Rising);
        feed(&mut dec, 4500, Edge::Falling);
        for i in 0..32 {
            feed(&mut dec, 560, Edge::Rising);
            let space = if codes::VOLUME_UP & (1 << i) != 0 {
                1690
            } else {
                560
            };
            feed(&mut dec, space, Edge::Falling);
        }
        assert_eq!(dec.state(), DecodeState::Idle);
        assert_eq!(dimmer.percent(), 10);
        assert!(dimmer.repeating());
    }
}
