/// Viewer-local rendering of stored UTC values
///
/// Stored instants and due dates are always UTC; this module converts
/// them into a viewer's IANA timezone at render time. Conversions are
/// pure and never written back to storage.
///
/// The viewer is usually the task's last modifier. When that user has
/// no configured timezone the caller supplies the configured default
/// zone (shipped default `America/New_York`, see the api config).
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Shipped default display zone, used when no `DEFAULT_TIMEZONE` is
/// configured and the viewer has none of their own.
pub const DEFAULT_ZONE: Tz = chrono_tz::America::New_York;

/// Resolves the zone to render for a viewer
///
/// Parses the viewer's configured IANA identifier when present and
/// valid, otherwise falls back to the supplied default.
pub fn viewer_zone(configured: Option<&str>, default: Tz) -> Tz {
    configured
        .and_then(|zone| zone.parse::<Tz>().ok())
        .unwrap_or(default)
}

/// Renders a stored due date in the viewer's zone
///
/// The stored value is a bare calendar date; it is interpreted as
/// midnight UTC and that instant is re-expressed in the viewer's zone,
/// matching how the rest of the system treats due dates.
pub fn due_date_for_viewer(due_date: Option<NaiveDate>, zone: Tz) -> Option<DateTime<Tz>> {
    due_date.map(|date| {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .with_timezone(&zone)
    })
}

/// Renders a stored instant (e.g. `completed_at`) in the viewer's zone
pub fn instant_for_viewer(instant: Option<DateTime<Utc>>, zone: Tz) -> Option<DateTime<Tz>> {
    instant.map(|instant| instant.with_timezone(&zone))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Offset;

    fn offset_seconds(value: &DateTime<Tz>) -> i32 {
        value.offset().fix().local_minus_utc()
    }

    #[test]
    fn test_none_stays_none() {
        assert_eq!(due_date_for_viewer(None, DEFAULT_ZONE), None);
        assert_eq!(instant_for_viewer(None, DEFAULT_ZONE), None);
    }

    #[test]
    fn test_viewer_zone_prefers_configured() {
        let zone = viewer_zone(Some("Europe/Paris"), DEFAULT_ZONE);
        assert_eq!(zone, chrono_tz::Europe::Paris);
    }

    #[test]
    fn test_viewer_zone_falls_back_on_missing_or_garbage() {
        assert_eq!(viewer_zone(None, DEFAULT_ZONE), DEFAULT_ZONE);
        assert_eq!(viewer_zone(Some("Mars/Olympus"), DEFAULT_ZONE), DEFAULT_ZONE);
    }

    #[test]
    fn test_new_york_winter_offset() {
        // Standard time: UTC-5, so midnight UTC is the previous evening.
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let local = due_date_for_viewer(Some(date), DEFAULT_ZONE).unwrap();

        assert_eq!(offset_seconds(&local), -5 * 3600);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
    }

    #[test]
    fn test_new_york_summer_offset() {
        // Daylight saving: UTC-4.
        let date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let local = due_date_for_viewer(Some(date), DEFAULT_ZONE).unwrap();

        assert_eq!(offset_seconds(&local), -4 * 3600);
    }

    #[test]
    fn test_instant_preserves_moment() {
        let instant = Utc::now();
        let local = instant_for_viewer(Some(instant), chrono_tz::Asia::Tokyo).unwrap();
        assert_eq!(local.with_timezone(&Utc), instant);
    }
}
