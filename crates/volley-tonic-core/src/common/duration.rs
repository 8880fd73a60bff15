use core::time::Duration;

/// Raised when a duration string cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unparseable duration {input:?} (expected a number with a unit, e.g. \"250ms\", \"1s\", \"2m\")")]
pub struct InvalidDuration {
    pub input: String,
}

/// Parses compact duration strings such as `"250ms"`, `"1s"`, `"1.5m"` or
/// `"2h"`. A unit suffix is required; a bare number is rejected rather than
/// guessed at.
pub fn parse_duration(input: &str) -> Result<Duration, InvalidDuration> {
    let err = || InvalidDuration {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    let unit_start = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(err)?;
    let (value, unit) = trimmed.split_at(unit_start);
    let value: f64 = value.parse().map_err(|_| err())?;

    let scale = match unit {
        "ms" => 0.001,
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3600.0,
        _ => return Err(err()),
    };

    // try_from rejects non-finite, negative and overflowing values.
    Duration::try_from_secs_f64(value * scale).map_err(|_| err())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        assert_eq!(parse_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(
            parse_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(parse_duration(" 10s ").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "s", "10", "10x", "-1s", "1.2.3s", "one second"] {
            let err = parse_duration(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }
}
