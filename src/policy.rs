//! Setpoint reconciliation: maps a single ambiguous target-temperature
//! request onto the heat/cool setpoint pair, given the current mode and
//! readings. Pure functions, no I/O.

use tracing::debug;

use crate::types::{OperationMode, SetpointPair};

/// Minimum heat/cool gap enforced on delta adjustments in AUTO mode.
const MIN_AUTO_GAP: f64 = 3.0;

/// Resolve a single requested temperature into a new setpoint pair.
///
/// COOL adjusts the high bound, HEAT the low bound. In AUTO (and OFF,
/// where neither side is actively running, the same range logic applies)
/// a target outside the current range moves the nearer bound; a target
/// inside the range moves whichever bound the current indoor reading is
/// closer to, on the assumption the system is already working toward
/// that side and the request is a tweak.
pub fn set_absolute(
    mode: OperationMode,
    current: SetpointPair,
    indoor_temperature: f64,
    target: f64,
) -> SetpointPair {
    match mode {
        OperationMode::Cool => SetpointPair::new(current.low, target),
        OperationMode::Heat => SetpointPair::new(target, current.high),
        OperationMode::Auto | OperationMode::Off => {
            if target <= current.low {
                SetpointPair::new(target, current.high)
            } else if target >= current.high {
                SetpointPair::new(current.low, target)
            } else {
                let midpoint = (current.low + current.high) / 2.0;
                debug!(midpoint, indoor_temperature, target, "target inside range");
                if indoor_temperature < midpoint {
                    SetpointPair::new(target, current.high)
                } else {
                    SetpointPair::new(current.low, target)
                }
            }
        }
    }
}

/// Both bounds supplied explicitly; no inference and no minimum-gap
/// enforcement (the gap rule only applies to delta adjustments).
pub fn set_pair(low: f64, high: f64) -> SetpointPair {
    SetpointPair::new(low, high)
}

/// Shift the active setpoint by `delta`. In AUTO a positive delta raises
/// the low bound, a non-positive delta lowers the high bound, and the
/// other bound is dragged along to keep at least `MIN_AUTO_GAP` degrees
/// between them. Callers must write both bounds back regardless of which
/// one changed.
pub fn adjust_by_delta(mode: OperationMode, current: SetpointPair, delta: f64) -> SetpointPair {
    match mode {
        OperationMode::Cool => SetpointPair::new(current.low, current.high + delta),
        OperationMode::Heat => SetpointPair::new(current.low + delta, current.high),
        OperationMode::Auto | OperationMode::Off => {
            let mut low = current.low;
            let mut high = current.high;
            if delta > 0.0 {
                low += delta;
                if high - low < MIN_AUTO_GAP {
                    high = low + MIN_AUTO_GAP;
                }
            } else {
                high += delta;
                if high - low < MIN_AUTO_GAP {
                    low = high - MIN_AUTO_GAP;
                }
            }
            SetpointPair::new(low, high)
        }
    }
}
