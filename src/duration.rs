/// Parses a compact ISO-8601 duration such as `PT15M3S` or `P1DT2H` into whole seconds.
///
/// Anything malformed, empty, or calendar-dependent (years, months) yields 0. Any component
/// may carry a fraction (`PT1.5M` is 90); the total is truncated to whole seconds. This
/// never fails: bad upstream data degrades to "unknown".
pub fn parse_duration(raw: &str) -> u64 {
    try_parse(raw).unwrap_or(0)
}

fn try_parse(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return None;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };

    let mut millis: u64 = sum_components(date_part, &[('W', 604_800), ('D', 86_400)])?;
    if let Some(time) = time_part {
        millis = millis.checked_add(sum_components(
            time,
            &[('H', 3_600), ('M', 60), ('S', 1)],
        )?)?;
    }
    Some(millis / 1_000)
}

/// Walks `number designator` pairs and returns the total in milliseconds. Designators must
/// appear in the order given by `units`.
fn sum_components(part: &str, units: &[(char, u64)]) -> Option<u64> {
    let mut total: u64 = 0;
    let mut next_unit = 0usize;
    let mut number = String::new();

    for c in part.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }

        let offset = units[next_unit..].iter().position(|(d, _)| *d == c)?;
        let (_, scale) = units[next_unit + offset];
        next_unit += offset + 1;

        total = total.checked_add(scaled_millis(&number, scale)?)?;
        number.clear();
    }

    // trailing digits without a designator
    if !number.is_empty() {
        return None;
    }
    Some(total)
}

/// `number` units of `scale` seconds, in milliseconds. Digits past the millisecond are dropped.
fn scaled_millis(number: &str, scale: u64) -> Option<u64> {
    let (whole, frac) = match number.split_once('.') {
        Some((whole, frac)) => {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            (whole, frac)
        }
        None => (number, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }

    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut millis = whole.checked_mul(scale)?.checked_mul(1_000)?;

    if !frac.is_empty() {
        // twelve digits is well past millisecond precision and keeps the product in u128
        let digits = &frac[..frac.len().min(12)];
        let numerator: u128 = digits.parse().ok()?;
        let denominator = 10u128.pow(digits.len() as u32);
        let part = numerator * scale as u128 * 1_000 / denominator;
        millis = millis.checked_add(u64::try_from(part).ok()?)?;
    }
    Some(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_components() {
        assert_eq!(parse_duration("PT15M3S"), 903);
        assert_eq!(parse_duration("PT1H"), 3_600);
        assert_eq!(parse_duration("PT1H2M3S"), 3_723);
        assert_eq!(parse_duration("PT59S"), 59);
        assert_eq!(parse_duration("PT60S"), 60);
        assert_eq!(parse_duration("PT0S"), 0);
    }

    #[test]
    fn test_date_components() {
        assert_eq!(parse_duration("P1D"), 86_400);
        assert_eq!(parse_duration("P1DT2H"), 93_600);
        assert_eq!(parse_duration("P2W"), 1_209_600);
        assert_eq!(parse_duration("P0D"), 0);
    }

    #[test]
    fn test_fractional_seconds_truncated() {
        assert_eq!(parse_duration("PT1.5S"), 1);
        assert_eq!(parse_duration("PT1M0.9S"), 60);
        assert_eq!(parse_duration("PT.5S"), 0);
    }

    #[test]
    fn test_fractional_larger_units() {
        assert_eq!(parse_duration("PT1.5M"), 90);
        assert_eq!(parse_duration("PT0.5H"), 1_800);
        assert_eq!(parse_duration("PT1.25H30.5S"), 4_530);
        assert_eq!(parse_duration("P0.5D"), 43_200);
        assert_eq!(parse_duration("P0.5W"), 302_400);
        // fractions add up before truncation
        assert_eq!(parse_duration("PT0.5M0.5S"), 30);
        assert_eq!(parse_duration("PT59.5S"), 59);
    }

    #[test]
    fn test_malformed_returns_zero() {
        let bad = [
            "", "P", "PT", "T1M", "1M", "PT1X", "PT1", "PTM", "PT1S1M", "pt1m", " PT1M",
            "PT1M ", "-PT5M", "P1Y", "P2M", "P1Y2M3D", "PT1.M", "PT1..5S", "P1DT", "garbage",
            "PT99999999999999999999S",
        ];
        for raw in bad {
            assert_eq!(parse_duration(raw), 0, "expected 0 for {raw:?}");
        }
    }

    #[test]
    fn test_repeated_designator_rejected() {
        assert_eq!(parse_duration("PT1M1M"), 0);
    }
}
