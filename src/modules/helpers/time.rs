use snafu::ensure;

use crate::errors::{CustomResult, InvalidTimeSnafu};

const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// # lap time codec
/// converts between the `mm:ss.SSS` display form and milliseconds.
///
/// the milliseconds may also be separated by a colon (`mm:ss:SSS`), which is how
/// older clients entered them.
pub struct TimeHelper {}

impl TimeHelper {
    /// # parse a display time
    ///
    /// ## Arguments
    /// * `display` - the time, e.g. `01:23.456`
    ///
    /// ## Returns
    /// * `i64` - the time in milliseconds
    pub fn parse(display: &str) -> CustomResult<i64> {
        let segments: Vec<&str> = display.trim().split([':', '.']).collect();
        let [minutes, seconds, millis] = segments.as_slice() else {
            return InvalidTimeSnafu {
                value: display,
                reason: "expected mm:ss.SSS",
            }
            .fail();
        };

        let minutes = Self::parse_segment(display, minutes, 59, "minutes")?;
        let seconds = Self::parse_segment(display, seconds, 59, "seconds")?;
        let millis = Self::parse_segment(display, millis, 999, "milliseconds")?;

        Ok(minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND + millis)
    }

    /// # format milliseconds for display
    /// negative values get a leading `-`, which is only used for differences.
    pub fn format(millis: i64) -> String {
        let sign = if millis < 0 { "-" } else { "" };
        let abs = millis.unsigned_abs();
        let minute = MILLIS_PER_MINUTE.unsigned_abs();
        let second = MILLIS_PER_SECOND.unsigned_abs();

        format!(
            "{sign}{:02}:{:02}.{:03}",
            abs / minute,
            (abs % minute) / second,
            abs % second
        )
    }

    /// true when `new` is strictly faster than `old`
    pub fn is_better(new: &str, old: &str) -> CustomResult<bool> {
        Ok(Self::parse(new)? < Self::parse(old)?)
    }

    pub fn is_equal(a: &str, b: &str) -> CustomResult<bool> {
        Ok(Self::parse(a)? == Self::parse(b)?)
    }

    /// # signed gap between two times
    /// an improvement comes out negative, e.g. `-00:30.000`
    pub fn difference(new: &str, old: &str) -> CustomResult<String> {
        Ok(Self::format(Self::parse(new)? - Self::parse(old)?))
    }

    fn parse_segment(display: &str, segment: &str, max: i64, name: &str) -> CustomResult<i64> {
        ensure!(
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()),
            InvalidTimeSnafu {
                value: display,
                reason: format!("{name} must be numeric"),
            }
        );

        let value: i64 = segment.parse().map_err(|_| {
            InvalidTimeSnafu {
                value: display,
                reason: format!("{name} out of range"),
            }
            .build()
        })?;

        ensure!(
            value <= max,
            InvalidTimeSnafu {
                value: display,
                reason: format!("{name} must be at most {max}"),
            }
        );

        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use super::TimeHelper;
    use crate::errors::Error;

    #[test]
    fn parse_display_time() {
        assert_eq!(TimeHelper::parse("01:23.456").unwrap(), 83_456);
        assert_eq!(TimeHelper::parse("00:00.000").unwrap(), 0);
        assert_eq!(TimeHelper::parse("59:59.999").unwrap(), 3_599_999);
    }

    #[test]
    fn parse_accepts_colon_separated_millis() {
        assert_eq!(TimeHelper::parse("01:23:456").unwrap(), 83_456);
    }

    #[test]
    fn parse_rejects_malformed() {
        let malformed = [
            "", "1:23", "01:23.456.7", "aa:bb.ccc", "01:60.000", "01:00.1000", "-1:00.000",
            "01: 2.000",
        ];
        for bad in malformed {
            assert!(
                matches!(TimeHelper::parse(bad), Err(Error::InvalidTimeError { .. })),
                "`{bad}` should not parse"
            );
        }
    }

    #[test]
    fn format_pads_and_signs() {
        assert_eq!(TimeHelper::format(83_456), "01:23.456");
        assert_eq!(TimeHelper::format(5), "00:00.005");
        assert_eq!(TimeHelper::format(-30_000), "-00:30.000");
    }

    #[test]
    fn format_is_inverse_of_parse() {
        for millis in [0, 1, 999, 1_000, 59_999, 60_000, 83_456, 1_234_567, 3_599_999] {
            assert_eq!(TimeHelper::parse(&TimeHelper::format(millis)).unwrap(), millis);
        }
    }

    #[test]
    fn compare_times() {
        assert!(TimeHelper::is_better("01:00.000", "01:30.000").unwrap());
        assert!(!TimeHelper::is_better("01:30.000", "01:00.000").unwrap());
        assert!(!TimeHelper::is_better("01:00.500", "01:00.500").unwrap());
        assert!(TimeHelper::is_equal("01:00.500", "01:00.500").unwrap());
        assert!(TimeHelper::is_equal("01:00.500", "01:00:500").unwrap());
        assert!(TimeHelper::is_better("garbage", "01:00.000").is_err());
    }

    #[test]
    fn difference_is_signed() {
        assert_eq!(TimeHelper::difference("01:00.000", "01:30.000").unwrap(), "-00:30.000");
        assert_eq!(TimeHelper::difference("01:30.250", "01:30.000").unwrap(), "00:00.250");
    }
}
