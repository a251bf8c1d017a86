//! Battery → relay action decision rules.
//!
//! Off above 80%, On below 20%, nothing in between. The polarity is
//! deliberate: the plug drives a conserve/charge cycle for the modem's
//! backup battery, so a full battery opens the relay and a drained one
//! closes it. Boundary values sit inside the band — 20 and 80 are both
//! NoOp. A missing reading never produces a command; the engine fails safe
//! by doing nothing.

use chargeband_common::models::PowerAction;

/// Charge level above which the relay is opened.
pub const UPPER_PERCENT: u8 = 80;
/// Charge level below which the relay is closed.
pub const LOWER_PERCENT: u8 = 20;

/// Map a battery reading (or its absence) to a relay action. Pure and
/// memoryless: the same reading always produces the same action, and
/// nothing is deduplicated across calls.
pub fn decide(battery: Option<u8>) -> PowerAction {
    match battery {
        Some(p) if p > UPPER_PERCENT => PowerAction::Off,
        Some(p) if p < LOWER_PERCENT => PowerAction::On,
        Some(_) => PowerAction::NoOp,
        None => PowerAction::NoOp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_battery_opens_relay() {
        assert_eq!(decide(Some(81)), PowerAction::Off);
        assert_eq!(decide(Some(85)), PowerAction::Off);
        assert_eq!(decide(Some(100)), PowerAction::Off);
    }

    #[test]
    fn low_battery_closes_relay() {
        assert_eq!(decide(Some(19)), PowerAction::On);
        assert_eq!(decide(Some(15)), PowerAction::On);
        assert_eq!(decide(Some(0)), PowerAction::On);
    }

    #[test]
    fn band_interior_is_noop() {
        for p in 21..=79 {
            assert_eq!(decide(Some(p)), PowerAction::NoOp, "battery {p}");
        }
    }

    #[test]
    fn boundaries_are_inside_the_band() {
        assert_eq!(decide(Some(LOWER_PERCENT)), PowerAction::NoOp);
        assert_eq!(decide(Some(UPPER_PERCENT)), PowerAction::NoOp);
    }

    #[test]
    fn missing_reading_is_noop() {
        assert_eq!(decide(None), PowerAction::NoOp);
    }

    #[test]
    fn repeated_readings_repeat_the_action() {
        assert_eq!(decide(Some(85)), decide(Some(85)));
        assert_eq!(decide(Some(85)), PowerAction::Off);
    }
}
