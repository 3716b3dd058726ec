//! Stop list operations.
//!
//! Each operation takes the descriptor together with the active stop index
//! (the stop whose controls have focus) and leaves both valid: at least
//! [`MIN_STOPS`] stops sorted by position, and an active index inside the list.

use crate::color::HexColor;
use crate::error::EditError;
use crate::gradient::{GradientDescriptor, GradientStop, POSITION_MAX};

/// The fewest stops a gradient may have.
pub const MIN_STOPS: usize = 2;

const NEW_STOP_POSITION: u8 = 50;

/// Clamps an active index into `[0, len - 1]`.
pub fn clamp_active(active: usize, len: usize) -> usize {
    active.min(len.saturating_sub(1))
}

/// Appends a white stop at 50% and focuses it at its sorted position.
pub fn add_stop(gradient: &mut GradientDescriptor, active: &mut usize) {
    let stops = gradient.stops_mut();
    stops.push(GradientStop::new(HexColor::white(), NEW_STOP_POSITION));
    let new_index = stops.len() - 1;
    *active = sort_tracking(gradient, new_index);
}

/// Removes the stop at `index`.
///
/// Refused when the index is out of range or when the list is already at
/// [`MIN_STOPS`]; the descriptor is untouched in both cases.
pub fn remove_stop(
    gradient: &mut GradientDescriptor,
    active: &mut usize,
    index: usize,
) -> Result<(), EditError> {
    let len = gradient.stops().len();
    if index >= len {
        return Err(EditError::StopIndex { index, len });
    }
    if len <= MIN_STOPS {
        return Err(EditError::minimum_stops());
    }

    gradient.stops_mut().remove(index);
    if index < *active || (index == *active && *active > 0) {
        *active -= 1;
    }
    *active = clamp_active(*active, gradient.stops().len());
    Ok(())
}

/// Mirrors every position (`pos -> 100 - pos`) and reverses the list.
///
/// The active index follows the same stop, not the same position.
pub fn reverse_stops(gradient: &mut GradientDescriptor, active: &mut usize) {
    let stops = gradient.stops_mut();
    for stop in stops.iter_mut() {
        stop.set_pos(POSITION_MAX - stop.pos());
    }
    stops.reverse();
    let len = stops.len();
    gradient.sort_stops();
    *active = clamp_active(len - 1 - clamp_active(*active, len), len);
}

/// Spreads positions evenly over `[0, 100]` in current list order.
///
/// Colors keep their list index; positions are not sorted first, so a list
/// whose order differs from its positions is redistributed by list order.
pub fn distribute_stops(gradient: &mut GradientDescriptor) -> Result<(), EditError> {
    let stops = gradient.stops_mut();
    let count = stops.len();
    if count < MIN_STOPS {
        return Err(EditError::minimum_stops());
    }

    let last = (count - 1) as f64;
    for (i, stop) in stops.iter_mut().enumerate() {
        let pos = (i as f64 / last * f64::from(POSITION_MAX)).round();
        stop.set_pos(pos as u8);
    }
    Ok(())
}

/// Re-sorts by position after a stop was moved. Colors are untouched.
pub fn reorder_stops(gradient: &mut GradientDescriptor, active: &mut usize) {
    gradient.sort_stops();
    *active = clamp_active(*active, gradient.stops().len());
}

/// Sorts the stops and returns where the stop at `tracked` ended up.
fn sort_tracking(gradient: &mut GradientDescriptor, tracked: usize) -> usize {
    let stops = std::mem::take(gradient.stops_mut());
    let len = stops.len();
    let mut indexed: Vec<(usize, GradientStop)> = stops.into_iter().enumerate().collect();
    indexed.sort_by_key(|(_, stop)| stop.pos());

    let new_index = indexed
        .iter()
        .position(|(original, _)| *original == tracked)
        .unwrap_or(len.saturating_sub(1));
    *gradient.stops_mut() = indexed.into_iter().map(|(_, stop)| stop).collect();
    new_index
}
