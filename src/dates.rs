//! Date conversion between the two metadata worlds.
//!
//! The Info dictionary stores PDF date strings (`D:YYYYMMDDHHmmSS` with an
//! optional `Z`/`+HH'mm'` zone), XMP stores ISO 8601. Every component after
//! the year is optional in a PDF date and defaults per ISO 32000-1 §7.9.4.
//! A date with no zone designator converts to an ISO string with no zone.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Convert a PDF date string to an XMP (ISO 8601) date string.
pub fn pdf_date_to_xmp(value: &str) -> Result<String> {
    let trimmed = value.trim();
    let rest = trimmed.strip_prefix("D:").unwrap_or(trimmed);
    let bytes = rest.as_bytes();
    if bytes.len() < 4 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return Err(Error::InvalidDate(value.to_string()));
    }
    let year: i32 = rest[..4]
        .parse()
        .map_err(|_| Error::InvalidDate(value.to_string()))?;

    let mut pos = 4;
    let take = |pos: &mut usize| -> Option<u32> {
        let parsed = digits2(bytes, *pos)?;
        *pos += 2;
        Some(parsed)
    };
    let month = take(&mut pos).unwrap_or(1);
    let day = take(&mut pos).unwrap_or(1);
    let hour = take(&mut pos).unwrap_or(0);
    let minute = take(&mut pos).unwrap_or(0);
    let second = take(&mut pos).unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::InvalidDate(value.to_string()))?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| Error::InvalidDate(value.to_string()))?;
    let suffix = parse_pdf_zone(&rest[pos..], value)?;

    Ok(format!(
        "{}{}",
        date.and_time(time).format("%Y-%m-%dT%H:%M:%S"),
        suffix
    ))
}

/// Convert an XMP (ISO 8601) date string to a PDF date string.
pub fn xmp_date_to_pdf(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        let base = stamp.format("D:%Y%m%d%H%M%S");
        let offset = stamp.offset().local_minus_utc();
        if offset == 0 {
            return Ok(format!("{}Z", base));
        }
        let sign = if offset < 0 { '-' } else { '+' };
        let magnitude = offset.unsigned_abs();
        return Ok(format!(
            "{}{}{:02}'{:02}'",
            base,
            sign,
            magnitude / 3600,
            (magnitude % 3600) / 60
        ));
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(stamp.format("D:%Y%m%d%H%M%S").to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.format("D:%Y%m%d").to_string());
    }
    Err(Error::InvalidDate(value.to_string()))
}

fn digits2(bytes: &[u8], pos: usize) -> Option<u32> {
    if bytes.len() >= pos + 2 && bytes[pos].is_ascii_digit() && bytes[pos + 1].is_ascii_digit() {
        Some(u32::from(bytes[pos] - b'0') * 10 + u32::from(bytes[pos + 1] - b'0'))
    } else {
        None
    }
}

/// Parse the `Z` / `+HH'mm'` tail of a PDF date into an ISO zone suffix.
fn parse_pdf_zone(zone: &str, original: &str) -> Result<String> {
    let bytes = zone.as_bytes();
    match bytes.first().copied() {
        None => Ok(String::new()),
        Some(b'Z') => Ok("Z".to_string()),
        Some(sign @ (b'+' | b'-')) => {
            let hours =
                digits2(bytes, 1).ok_or_else(|| Error::InvalidDate(original.to_string()))?;
            let minutes = if bytes.len() > 4 && bytes[3] == b'\'' {
                digits2(bytes, 4).unwrap_or(0)
            } else {
                0
            };
            if hours > 23 || minutes > 59 {
                return Err(Error::InvalidDate(original.to_string()));
            }
            Ok(format!("{}{:02}:{:02}", sign as char, hours, minutes))
        }
        Some(_) => Err(Error::InvalidDate(original.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pdf_date_with_offset() {
        assert_eq!(
            pdf_date_to_xmp("D:20170101120000+01'00'").unwrap(),
            "2017-01-01T12:00:00+01:00"
        );
    }

    #[test]
    fn test_pdf_date_utc() {
        assert_eq!(
            pdf_date_to_xmp("D:19991231235959Z").unwrap(),
            "1999-12-31T23:59:59Z"
        );
    }

    #[test]
    fn test_truncated_pdf_dates_use_defaults() {
        assert_eq!(pdf_date_to_xmp("D:2017").unwrap(), "2017-01-01T00:00:00");
        assert_eq!(pdf_date_to_xmp("D:201706").unwrap(), "2017-06-01T00:00:00");
        assert_eq!(
            pdf_date_to_xmp("20170630").unwrap(),
            "2017-06-30T00:00:00"
        );
    }

    #[test]
    fn test_invalid_pdf_dates() {
        assert!(pdf_date_to_xmp("D:17").is_err());
        assert!(pdf_date_to_xmp("D:20171350").is_err());
        assert!(pdf_date_to_xmp("D:20170101?").is_err());
        assert!(pdf_date_to_xmp("D:20170101+9").is_err());
    }

    #[test]
    fn test_xmp_date_with_offset() {
        assert_eq!(
            xmp_date_to_pdf("2017-01-01T12:00:00+01:00").unwrap(),
            "D:20170101120000+01'00'"
        );
        assert_eq!(
            xmp_date_to_pdf("2017-01-01T12:00:00-05:30").unwrap(),
            "D:20170101120000-05'30'"
        );
    }

    #[test]
    fn test_xmp_date_utc_and_naive() {
        assert_eq!(
            xmp_date_to_pdf("2017-01-01T12:00:00Z").unwrap(),
            "D:20170101120000Z"
        );
        assert_eq!(
            xmp_date_to_pdf("2017-01-01T12:00:00").unwrap(),
            "D:20170101120000"
        );
        assert_eq!(xmp_date_to_pdf("2017-01-01").unwrap(), "D:20170101");
    }

    #[test]
    fn test_round_trip_through_both_forms() {
        let pdf = "D:20240229080102+02'00'";
        let xmp = pdf_date_to_xmp(pdf).unwrap();
        assert_eq!(xmp_date_to_pdf(&xmp).unwrap(), pdf);
    }

    #[test]
    fn test_invalid_xmp_date() {
        assert!(xmp_date_to_pdf("yesterday").is_err());
    }
}
