//! Sunrise and sunset for the configured location, from the `sunrise`
//! crate, with polar day and night made explicit.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Day-of-year span in which the sun sits north of the equator, March to
/// September equinox.
const NORTHERN_SUMMER: std::ops::RangeInclusive<u32> = 80..=266;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SunTimes {
    Normal {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    /// sun stays above the horizon all day
    PolarDay,
    /// sun stays below the horizon all day
    PolarNight,
}

impl SunTimes {
    /// `longitude` is east-positive; `date` is the observer's calendar date.
    pub fn for_date(latitude: f64, longitude: f64, date: NaiveDate) -> Self {
        let (rise, set) =
            sunrise::sunrise_sunset(latitude, longitude, date.year(), date.month(), date.day());

        // no horizon crossing comes back as two identical (zero) timestamps
        match (
            DateTime::<Utc>::from_timestamp(rise, 0),
            DateTime::<Utc>::from_timestamp(set, 0),
        ) {
            (Some(sunrise), Some(sunset)) if sunrise < sunset => {
                SunTimes::Normal { sunrise, sunset }
            }
            _ => Self::polar(latitude, date),
        }
    }

    fn polar(latitude: f64, date: NaiveDate) -> Self {
        let sun_north = NORTHERN_SUMMER.contains(&date.ordinal());
        if (latitude >= 0.0) == sun_north {
            SunTimes::PolarDay
        } else {
            SunTimes::PolarNight
        }
    }

    pub fn is_daylight<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match self {
            SunTimes::Normal { sunrise, sunset } => {
                let now = now.with_timezone(&Utc);
                now > *sunrise && now < *sunset
            }
            SunTimes::PolarDay => true,
            SunTimes::PolarNight => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_near(got: DateTime<Utc>, want: DateTime<Utc>) {
        let diff = (got - want).num_seconds().abs();
        assert!(diff <= 5 * 60, "got {}, want {}", got, want);
    }

    #[test]
    fn amsterdam_midsummer() {
        match SunTimes::for_date(52.37, 4.89, date(2024, 6, 21)) {
            SunTimes::Normal { sunrise, sunset } => {
                assert_near(sunrise, utc("2024-06-21T03:18:00Z"));
                assert_near(sunset, utc("2024-06-21T20:06:00Z"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn equator_equinox() {
        match SunTimes::for_date(0.0, 0.0, date(2024, 3, 20)) {
            SunTimes::Normal { sunrise, sunset } => {
                assert_near(sunrise, utc("2024-03-20T06:05:00Z"));
                assert_near(sunset, utc("2024-03-20T18:12:00Z"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn sydney_sunrise_falls_on_previous_utc_day() {
        match SunTimes::for_date(-33.87, 151.21, date(2024, 12, 21)) {
            SunTimes::Normal { sunrise, sunset } => {
                assert_near(sunrise, utc("2024-12-20T18:42:00Z"));
                assert_near(sunset, utc("2024-12-21T09:06:00Z"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn polar_cases() {
        assert_eq!(
            SunTimes::for_date(78.22, 15.65, date(2024, 6, 21)),
            SunTimes::PolarDay
        );
        assert_eq!(
            SunTimes::for_date(78.22, 15.65, date(2024, 12, 21)),
            SunTimes::PolarNight
        );
        assert!(SunTimes::PolarDay.is_daylight(&Utc::now()));
        assert!(!SunTimes::PolarNight.is_daylight(&Utc::now()));
    }

    #[test]
    fn southern_polar_cases() {
        // McMurdo Station
        assert_eq!(
            SunTimes::for_date(-77.85, 166.67, date(2024, 12, 21)),
            SunTimes::PolarDay
        );
        assert_eq!(
            SunTimes::for_date(-77.85, 166.67, date(2024, 6, 21)),
            SunTimes::PolarNight
        );
    }

    #[test]
    fn daylight_window_is_exclusive() {
        let sunrise = utc("2024-06-21T03:18:00Z");
        let sunset = utc("2024-06-21T20:06:00Z");
        let times = SunTimes::Normal { sunrise, sunset };

        assert!(!times.is_daylight(&sunrise));
        assert!(times.is_daylight(&(sunrise + Duration::minutes(1))));
        assert!(!times.is_daylight(&sunset));
        assert!(!times.is_daylight(&(sunrise - Duration::hours(1))));

        // same instant expressed in CEST
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        assert!(times.is_daylight(&utc("2024-06-21T12:00:00Z").with_timezone(&cest)));
    }
}
