//! `TrafficColor` — the published indicator state for one movement.

/// The color a driver or pedestrian sees for one movement.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrafficColor {
    #[default]
    Red,
    RedAmber,
    Green,
    Amber,
    FlashingRed,
    FlashingAmber,
}

impl TrafficColor {
    /// `true` for any color that permits a vehicle to proceed.
    pub fn permits_movement(self) -> bool {
        matches!(self, TrafficColor::Green | TrafficColor::FlashingAmber)
    }
}
