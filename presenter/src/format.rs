use gpsview_location::LocationFix;

use crate::Field;

/// Prefix of the status line.
const STATUS_PREFIX: &str = "Status: ";

/// `"%.6f°"`
#[must_use]
pub fn format_latitude(latitude: f64) -> String {
    format!("{latitude:.6}°")
}

/// `"%.6f°"`
#[must_use]
pub fn format_longitude(longitude: f64) -> String {
    format!("{longitude:.6}°")
}

/// `"%.2f meters"`
#[must_use]
pub fn format_altitude(altitude: f64) -> String {
    format!("{altitude:.2} meters")
}

/// `"%.2f meters"`
#[must_use]
pub fn format_accuracy(accuracy: f32) -> String {
    format!("{accuracy:.2} meters")
}

/// `"%.2f m/s"`
#[must_use]
pub fn format_speed(speed: f32) -> String {
    format!("{speed:.2} m/s")
}

/// `"%.2f°"`
#[must_use]
pub fn format_bearing(bearing: f32) -> String {
    format!("{bearing:.2}°")
}

/// Text of every readout field for `fix`, in display order.
#[must_use]
pub fn format_fix(fix: &LocationFix) -> [(Field, String); 6] {
    [
        (Field::Latitude, format_latitude(fix.latitude)),
        (Field::Longitude, format_longitude(fix.longitude)),
        (Field::Altitude, format_altitude(fix.altitude)),
        (Field::Accuracy, format_accuracy(fix.accuracy)),
        (Field::Speed, format_speed(fix.speed)),
        (Field::Bearing, format_bearing(fix.bearing)),
    ]
}

/// Full status line for `message`.
#[must_use]
pub fn format_status(message: &str) -> String {
    format!("{STATUS_PREFIX}{message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_reference_fix() {
        let fix = LocationFix {
            latitude: 37.421,
            longitude: -122.084,
            altitude: 30.0,
            accuracy: 5.0,
            speed: 0.0,
            bearing: 0.0,
        };

        let texts: Vec<String> = format_fix(&fix).into_iter().map(|(_, text)| text).collect();
        assert_eq!(
            texts,
            [
                "37.421000°",
                "-122.084000°",
                "30.00 meters",
                "5.00 meters",
                "0.00 m/s",
                "0.00°",
            ]
        );
    }

    #[test]
    fn rounds_like_printf() {
        assert_eq!(format_latitude(1.234_567_89), "1.234568°");
        assert_eq!(format_speed(2.345), "2.35 m/s");
        assert_eq!(format_bearing(359.999), "360.00°");
    }

    #[test]
    fn status_prefix() {
        assert_eq!(format_status("GPS stopped"), "Status: GPS stopped");
    }
}
