//! Software PWM duty driver
//!
//! Instead of a dedicated up-mode timer, the PWM output shares the
//! free-running capture timer: its compare ISR re-arms the compare target
//! by the length of the phase just started, alternating between the ON and
//! OFF portions of the period. [`SoftPwm`] holds the phase machine; the ISR
//! asks it for the level to drive and the number of ticks until the next
//! compare event.
//!
//! 0 % and 100 % are handled asymmetrically on purpose: a literal 0-tick ON
//! phase would either emit a runt pulse or re-arm the compare register by
//! zero ticks, which on this timer means an immediate refire. Both
//! extremes therefore pin the output and re-arm by the full period without
//! toggling the phase flag.

use embedded_hal::digital::PinState;

/// Ticks the output stays high for the given duty percentage,
/// `floor(period * percent / 100)`.
#[inline]
pub fn duty_ticks(period: u16, percent: u8) -> u16 {
    (u32::from(period) * u32::from(percent) / 100) as u16
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    On,
    Off,
}

/// Compare-driven PWM phase machine
pub struct SoftPwm {
    period: u16,
    percent: u8,
    on_ticks: u16,
    phase: Phase,
}

impl SoftPwm {
    /// PWM over `period` ticks, starting fully off
    pub const fn new(period: u16) -> Self {
        SoftPwm {
            period,
            percent: 0,
            on_ticks: 0,
            phase: Phase::Off,
        }
    }

    /// Current duty percentage
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Set the duty percentage (clamped to 100).
    ///
    /// The tick count is recomputed in the same call, so a compare ISR
    /// preempting after this returns always sees a matching pair. Callers
    /// that can race the ISR wrap this in a critical section.
    pub fn set_percent(&mut self, percent: u8) {
        let percent = if percent > 100 { 100 } else { percent };
        self.percent = percent;
        self.on_ticks = duty_ticks(self.period, percent);
    }

    /// Advance to the next phase. Returns the level to drive until the
    /// next compare event and the number of ticks to re-arm the compare
    /// target by. Called once per compare interrupt.
    pub fn next_phase(&mut self) -> (PinState, u16) {
        if self.on_ticks == 0 {
            self.phase = Phase::Off;
            (PinState::Low, self.period)
        } else if self.on_ticks == self.period {
            self.phase = Phase::On;
            (PinState::High, self.period)
        } else {
            match self.phase {
                Phase::Off => {
                    self.phase = Phase::On;
                    (PinState::High, self.on_ticks)
                }
                Phase::On => {
                    self.phase = Phase::Off;
                    (PinState::Low, self.period - self.on_ticks)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_round_trips_within_one_tick() {
        let period = 1000u16;
        for percent in (0..=100).step_by(10) {
            let on = duty_ticks(period, percent as u8);
            // on/period must equal percent/100 up to one tick of rounding
            let err = i32::from(on) * 100 - i32::from(period) * percent;
            assert!(err.abs() < i32::from(period), "percent {}", percent);
        }
        assert_eq!(duty_ticks(1000, 50), 500);
        assert_eq!(duty_ticks(256, 50), 128);
    }

    #[test]
    fn zero_percent_stays_low_across_periods() {
        let mut pwm = SoftPwm::new(1000);
        pwm.set_percent(0);
        for _ in 0..3 {
            assert_eq!(pwm.next_phase(), (PinState::Low, 1000));
        }
    }

    #[test]
    fn full_percent_stays_high_across_periods() {
        let mut pwm = SoftPwm::new(1000);
        pwm.set_percent(100);
        for _ in 0..3 {
            assert_eq!(pwm.next_phase(), (PinState::High, 1000));
        }
    }

    #[test]
    fn phases_alternate_and_sum_to_period() {
        let mut pwm = SoftPwm::new(1000);
        pwm.set_percent(30);
        let (level_a, ticks_a) = pwm.next_phase();
        let (level_b, ticks_b) = pwm.next_phase();
        assert_eq!(level_a, PinState::High);
        assert_eq!(level_b, PinState::Low);
        assert_eq!(ticks_a, 300);
        assert_eq!(ticks_a + ticks_b, 1000);
    }

    #[test]
    fn no_runt_pulse_for_any_intermediate_percent() {
        for percent in 1..=99u8 {
            let mut pwm = SoftPwm::new(100);
            pwm.set_percent(percent);
            let (_, on) = pwm.next_phase();
            let (_, off) = pwm.next_phase();
            assert!(on >= 1, "percent {}", percent);
            assert!(off >= 1, "percent {}", percent);
        }
    }

    #[test]
    fn percent_clamps_at_100() {
        let mut pwm = SoftPwm::new(1000);
        pwm.set_percent(250);
        assert_eq!(pwm.percent(), 100);
    }

    #[test]
    fn duty_change_takes_effect_next_phase() {
        let mut pwm = SoftPwm::new(1000);
        pwm.set_percent(20);
        assert_eq!(pwm.next_phase(), (PinState::High, 200));
        pwm.set_percent(80);
        // OFF phase completes the old period, then the new duty applies
        assert_eq!(pwm.next_phase(), (PinState::Low, 200));
        assert_eq!(pwm.next_phase(), (PinState::High, 800));
    }
}
