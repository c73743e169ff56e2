use icomfort_alexa::policy::{adjust_by_delta, set_absolute, set_pair};
use icomfort_alexa::{OperationMode, SetpointPair};

#[test]
fn cool_absolute_moves_high_bound_only() {
    let pair = set_absolute(OperationMode::Cool, SetpointPair::new(64.0, 75.0), 70.0, 72.0);
    assert_eq!(pair.low, 64.0);
    assert_eq!(pair.high, 72.0);
}

#[test]
fn heat_absolute_moves_low_bound_only() {
    let pair = set_absolute(OperationMode::Heat, SetpointPair::new(64.0, 75.0), 70.0, 67.0);
    assert_eq!(pair.low, 67.0);
    assert_eq!(pair.high, 75.0);
}

#[test]
fn auto_absolute_at_or_below_floor_moves_low() {
    let pair = set_absolute(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 68.0, 64.0);
    assert_eq!(pair, SetpointPair::new(64.0, 71.0));

    let pair = set_absolute(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 68.0, 60.0);
    assert_eq!(pair, SetpointPair::new(60.0, 71.0));
}

#[test]
fn auto_absolute_at_or_above_ceiling_moves_high() {
    let pair = set_absolute(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 68.0, 74.0);
    assert_eq!(pair, SetpointPair::new(64.0, 74.0));
}

#[test]
fn auto_absolute_between_bounds_follows_indoor_reading() {
    // indoor below the midpoint: presumed heating, so the low bound moves
    let current = SetpointPair::new(64.0, 71.0);
    let pair = set_absolute(OperationMode::Auto, current, 65.0, 68.0);
    assert_eq!(pair, SetpointPair::new(68.0, 71.0));

    // indoor at/above the midpoint: presumed cooling, so the high bound moves
    let pair = set_absolute(OperationMode::Auto, current, 68.0, 68.0);
    assert_eq!(pair, SetpointPair::new(64.0, 68.0));
}

#[test]
fn auto_absolute_midpoint_boundary() {
    // midpoint of 64/71 is 67.5; an indoor reading exactly there counts
    // as the cooling side
    let pair = set_absolute(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 67.5, 66.0);
    assert_eq!(pair, SetpointPair::new(64.0, 66.0));
}

#[test]
fn off_absolute_uses_range_logic() {
    let auto = set_absolute(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 65.0, 68.0);
    let off = set_absolute(OperationMode::Off, SetpointPair::new(64.0, 71.0), 65.0, 68.0);
    assert_eq!(auto, off);
}

#[test]
fn set_pair_takes_values_verbatim() {
    let pair = set_pair(66.0, 73.0);
    assert_eq!(pair, SetpointPair::new(66.0, 73.0));

    // no minimum-gap enforcement on the explicit two-value form
    let pair = set_pair(70.0, 71.0);
    assert_eq!(pair, SetpointPair::new(70.0, 71.0));
}

#[test]
fn cool_delta_changes_high_only() {
    let pair = adjust_by_delta(OperationMode::Cool, SetpointPair::new(64.0, 75.0), -5.0);
    assert_eq!(pair, SetpointPair::new(64.0, 70.0));
    assert!(pair.low <= pair.high);
}

#[test]
fn heat_delta_changes_low_only() {
    let pair = adjust_by_delta(OperationMode::Heat, SetpointPair::new(64.0, 75.0), 2.0);
    assert_eq!(pair, SetpointPair::new(66.0, 75.0));
    assert!(pair.low <= pair.high);
}

#[test]
fn auto_positive_delta_moves_low_and_keeps_gap() {
    let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(64.0, 71.0), 2.0);
    assert_eq!(pair, SetpointPair::new(66.0, 71.0));

    let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(64.0, 66.0), 4.0);
    assert_eq!(pair, SetpointPair::new(68.0, 71.0));
}

#[test]
fn auto_negative_delta_moves_high_and_keeps_gap() {
    let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(64.0, 75.0), -2.0);
    assert_eq!(pair, SetpointPair::new(64.0, 73.0));

    let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(64.0, 68.0), -3.0);
    assert_eq!(pair, SetpointPair::new(62.0, 65.0));
}

#[test]
fn auto_delta_gap_invariant_holds_for_many_inputs() {
    for (low, high) in [(64.0, 71.0), (64.0, 65.0), (70.0, 70.0), (60.0, 80.0)] {
        for delta in [-10.0, -3.0, -0.5, 0.0, 0.5, 3.0, 10.0] {
            let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(low, high), delta);
            assert!(
                pair.high - pair.low >= 3.0,
                "gap violated for low={low} high={high} delta={delta}: {pair:?}"
            );
        }
    }
}

#[test]
fn zero_delta_in_auto_still_normalizes_gap() {
    // delta <= 0 goes down the high-bound branch, which then enforces the gap
    let pair = adjust_by_delta(OperationMode::Auto, SetpointPair::new(70.0, 71.0), 0.0);
    assert_eq!(pair, SetpointPair::new(68.0, 71.0));
}
