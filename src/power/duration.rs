use crate::error::PowerError;
use regex::{Captures, Regex};

const MINUTES_PER_DAY: i64 = 1440;
const MINUTES_PER_HOUR: i64 = 60;

pub struct DurationParser {
    /// n days, n hours, n minutes; ASCII digits only
    power_duration: Regex,
}

impl DurationParser {
    pub fn new() -> Self {
        Self {
            power_duration: Regex::new(r"^(?:([0-9]+)d)?\s*(?:([0-9]+)h)?\s*(?:([0-9]+)m)?$")
                .expect("duration pattern is valid"),
        }
    }

    /// Parses `19d 17h 52m` style text into total minutes.
    ///
    /// Blank text is rejected rather than read as zero.
    pub fn parse(&self, text: &str) -> Result<i64, PowerError> {
        let trimmed = text.trim();
        let invalid = || PowerError::InvalidFormat(text.to_string());
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let captures = self.power_duration.captures(trimmed).ok_or_else(invalid)?;
        captures_to_minutes(captures).ok_or_else(invalid)
    }
}

impl Default for DurationParser {
    fn default() -> Self {
        Self::new()
    }
}

fn captures_to_minutes(captures: Captures) -> Option<i64> {
    let conversions = [MINUTES_PER_DAY, MINUTES_PER_HOUR, 1];
    let mut minutes: i64 = 0;
    for (i, c) in captures.iter().skip(1).enumerate() {
        let Some(c) = c else {
            continue;
        };
        let part = c.as_str().parse::<i64>().ok()?.checked_mul(conversions[i])?;
        minutes = minutes.checked_add(part)?;
    }
    Some(minutes)
}

/// Renders minutes as `{d}d {h}h {m}m`, or `Expired` once nothing is left.
pub fn format_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "Expired".into();
    }
    let days = minutes / MINUTES_PER_DAY;
    let hours = minutes % MINUTES_PER_DAY / MINUTES_PER_HOUR;
    format!("{days}d {hours}h {}m", minutes % MINUTES_PER_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_duration() {
        let parser = DurationParser::new();
        assert_eq!(parser.parse("19d 17h 52m").unwrap(), 19 * 1440 + 17 * 60 + 52);
        assert_eq!(parser.parse("  2h30m ").unwrap(), 150);
        assert_eq!(parser.parse("3d").unwrap(), 3 * 1440);
        assert_eq!(parser.parse("45m").unwrap(), 45);
        assert_eq!(parser.parse("1d 5m").unwrap(), 1445);
    }

    #[test]
    fn rejects_unmatched_text() {
        let parser = DurationParser::new();
        for text in ["bogus", "5", "1h 2d", "1d extra", "-3h", "1D", "", "   "] {
            assert!(
                matches!(parser.parse(text), Err(PowerError::InvalidFormat(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflowing_durations() {
        let parser = DurationParser::new();
        assert!(parser.parse("99999999999999999999d").is_err());
        assert!(parser.parse("9999999999999999d").is_err());
        assert!(parser.parse("6405119470038038d 23h 59m").is_err());
        assert_eq!(parser.parse("6405119470038038d").unwrap(), 6405119470038038 * 1440);
    }

    #[test]
    fn long_durations_are_accepted() {
        let parser = DurationParser::new();
        assert_eq!(parser.parse("3651d").unwrap(), 3651 * 1440);
        assert_eq!(parser.parse("1000000000m").unwrap(), 1_000_000_000);
    }

    #[test]
    fn only_ascii_digits_count() {
        let parser = DurationParser::new();
        for text in ["١d", "٣h", "５m", "1d ２h"] {
            assert!(
                matches!(parser.parse(text), Err(PowerError::InvalidFormat(_))),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn formats_remaining_time() {
        assert_eq!(format_minutes(0), "Expired");
        assert_eq!(format_minutes(-12), "Expired");
        assert_eq!(format_minutes(59), "0d 0h 59m");
        assert_eq!(format_minutes(19 * 1440 + 17 * 60 + 52), "19d 17h 52m");
    }

    #[test]
    fn format_and_parse_are_inverse() {
        let parser = DurationParser::new();
        for (d, h, m) in [(0, 0, 1), (0, 23, 59), (1, 0, 0), (19, 17, 52), (400, 5, 0), (3651, 0, 0), (694444, 10, 40)] {
            let minutes = d * 1440 + h * 60 + m;
            assert_eq!(parser.parse(&format_minutes(minutes)).unwrap(), minutes);
        }
    }
}
