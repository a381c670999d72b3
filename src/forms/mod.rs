pub mod general;
pub mod laundry;

pub use general::{ContactPreference, GeneralBookingForm, Urgency, DURATION_OPTIONS};
pub use laundry::{laundry_service, LaundryBookingForm, LaundryService, LAUNDRY_CATEGORY, LAUNDRY_SERVICES};

use serde::{Deserialize, Serialize};

/// A blocking, user-facing validation failure. Surfaced immediately;
/// the backend is never called for an invalid form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError(pub &'static str);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for ValidationError {}

/// Which free-text prompt the draft is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextField {
    Location,
    Description,
    PickupAddress,
    Instructions,
}

/// Converts a 12-hour display string ("H:MM AM|PM") to a 24-hour
/// "HH:MM:SS" wall-clock string. 12 AM maps to hour 00; PM adds 12
/// except when the source hour is already 12.
pub fn to_24_hour(display: &str) -> Option<String> {
    let (clock, period) = display.trim().rsplit_once(' ')?;
    let (h, m) = clock.split_once(':')?;
    let hour: u32 = h.trim().parse().ok()?;
    let minute: u32 = m.trim().parse().ok()?;
    if hour == 0 || hour > 12 || minute > 59 {
        return None;
    }

    let hour = match period.trim().to_ascii_uppercase().as_str() {
        "AM" => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        "PM" => {
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        }
        _ => return None,
    };

    Some(format!("{:02}:{:02}:00", hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_maps_to_hour_zero() {
        assert_eq!(to_24_hour("12:00 AM").as_deref(), Some("00:00:00"));
    }

    #[test]
    fn noon_stays_twelve() {
        assert_eq!(to_24_hour("12:00 PM").as_deref(), Some("12:00:00"));
    }

    #[test]
    fn afternoon_adds_twelve() {
        assert_eq!(to_24_hour("3:15 PM").as_deref(), Some("15:15:00"));
    }

    #[test]
    fn morning_is_zero_padded() {
        assert_eq!(to_24_hour("9:00 AM").as_deref(), Some("09:00:00"));
    }

    #[test]
    fn lowercase_period_is_accepted() {
        assert_eq!(to_24_hour("2:30 pm").as_deref(), Some("14:30:00"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(to_24_hour(""), None);
        assert_eq!(to_24_hour("25:00 PM"), None);
        assert_eq!(to_24_hour("0:30 AM"), None);
        assert_eq!(to_24_hour("3:70 PM"), None);
        assert_eq!(to_24_hour("3:15"), None);
        assert_eq!(to_24_hour("3:15 XM"), None);
    }
}
