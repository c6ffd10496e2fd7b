use chrono::{Local, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{parse_args, Tool};
use crate::error::ToolError;

static OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]\d{2}:\d{2}").expect("valid offset regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid time regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid date regex"));

const DEFAULT_OFFSET: &str = "-03:00";

fn capture_u32(caps: &regex::Captures<'_>, idx: usize) -> Result<u32, ToolError> {
    caps[idx]
        .parse()
        .map_err(|_| ToolError::Validation(format!("number out of range in {:?}", &caps[0])))
}

/// Convert a free-text date/time expression into an RFC3339 timestamp.
///
/// Fixed precedence over the lower-cased, trimmed input:
/// 1. offset: first `±HH:MM` substring, else `-03:00`;
/// 2. time of day: first `H:MM`/`HH:MM` substring, else `09:00`;
/// 3. date: "amanhã"/"tomorrow" → today + 1, else a `YYYY-MM-DD`
///    substring, else today. The relative keyword wins even when an
///    explicit date is also present.
///
/// Pure function of the text and the local calendar; seconds are always 0.
pub fn normalize(text: &str) -> Result<String, ToolError> {
    let s = text.trim().to_lowercase();
    if s.is_empty() {
        return Err(ToolError::Validation("empty date/time text".to_string()));
    }

    let offset = OFFSET_RE
        .find(&s)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_OFFSET.to_string());

    // The search runs over the whole text, offset digits included, so an
    // offset with no explicit time reads its hour as the time of day.
    let (hour, minute) = match TIME_RE.captures(&s) {
        Some(caps) => (capture_u32(&caps, 1)?, capture_u32(&caps, 2)?),
        None => (9, 0),
    };
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
        ToolError::Validation(format!("invalid time of day {:02}:{:02}", hour, minute))
    })?;

    let today = Local::now().date_naive();
    let date = if s.contains("amanhã") || s.contains("tomorrow") {
        today
            .succ_opt()
            .ok_or_else(|| ToolError::Validation("date out of range".to_string()))?
    } else if let Some(caps) = DATE_RE.captures(&s) {
        let (y, m, d) = (
            capture_u32(&caps, 1)? as i32,
            capture_u32(&caps, 2)?,
            capture_u32(&caps, 3)?,
        );
        NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
            ToolError::Validation(format!("invalid calendar date {}", &caps[0]))
        })?
    } else {
        today
    };

    Ok(format!(
        "{}T{}{}",
        date.format("%Y-%m-%d"),
        time.format("%H:%M:%S"),
        offset
    ))
}

#[derive(Debug, Deserialize)]
struct Args {
    datetime_text: String,
}

/// Converts a natural-language date/time expression into RFC3339.
pub struct NormalizeDatetime;

#[async_trait::async_trait]
impl Tool for NormalizeDatetime {
    fn name(&self) -> &'static str {
        "to_rfc3339"
    }

    fn description(&self) -> &'static str {
        "Converte uma expressão de data/hora (ex: 'amanhã 18:00-03:00') para RFC3339."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "datetime_text": {
                    "type": "string",
                    "description": "Expressão de data/hora em linguagem natural"
                }
            },
            "required": ["datetime_text"]
        })
    }

    async fn invoke(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let args: Args = parse_args(args)?;
        let timestamp = normalize(&args.datetime_text)?;
        log::info!("NormalizeDatetime: {:?} -> {}", args.datetime_text, timestamp);
        Ok(serde_json::json!(timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn tomorrow() -> NaiveDate {
        today() + Duration::days(1)
    }

    #[test]
    fn test_tomorrow_with_time_and_offset() {
        let result = normalize("amanhã 18:00-03:00").unwrap();
        assert_eq!(
            result,
            format!("{}T18:00:00-03:00", tomorrow().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_tomorrow_alone_gets_defaults() {
        let result = normalize("amanhã").unwrap();
        assert_eq!(
            result,
            format!("{}T09:00:00-03:00", tomorrow().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_english_keyword_recognized() {
        let result = normalize("tomorrow 10:15").unwrap();
        assert_eq!(
            result,
            format!("{}T10:15:00-03:00", tomorrow().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_explicit_date() {
        let result = normalize("2030-12-01 14:30").unwrap();
        assert_eq!(result, "2030-12-01T14:30:00-03:00");
    }

    #[test]
    fn test_explicit_offset_preserved() {
        let result = normalize("2030-12-01 14:30+05:30").unwrap();
        assert_eq!(result, "2030-12-01T14:30:00+05:30");
    }

    #[test]
    fn test_no_date_means_today() {
        let result = normalize("16:45").unwrap();
        assert_eq!(
            result,
            format!("{}T16:45:00-03:00", today().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_relative_keyword_beats_explicit_date() {
        // Documented precedence: the explicit date is unreachable when the
        // relative keyword is present.
        let result = normalize("amanhã 2030-12-01 08:00").unwrap();
        assert_eq!(
            result,
            format!("{}T08:00:00-03:00", tomorrow().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_empty_text_is_validation_error() {
        assert!(matches!(normalize(""), Err(ToolError::Validation(_))));
        assert!(matches!(normalize("   "), Err(ToolError::Validation(_))));
    }

    #[test]
    fn test_case_insensitive_keyword() {
        let result = normalize("AMANHÃ 18:00").unwrap();
        assert!(result.starts_with(&tomorrow().format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn test_invalid_time_rejected() {
        assert!(matches!(
            normalize("amanhã 99:99"),
            Err(ToolError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_calendar_date_rejected() {
        assert!(matches!(
            normalize("2030-13-45"),
            Err(ToolError::Validation(_))
        ));
    }

    #[test]
    fn test_offset_without_time_reads_offset_digits() {
        // Quirk preserved from the heuristic: the time search sees the
        // offset digits when no other H:MM substring precedes them.
        let result = normalize("amanhã -03:00").unwrap();
        assert_eq!(
            result,
            format!("{}T03:00:00-03:00", tomorrow().format("%Y-%m-%d"))
        );
    }

    #[test]
    fn test_always_second_precision_with_offset() {
        let result = normalize("hoje de manhã").unwrap();
        assert!(result.ends_with(":00-03:00"));
        assert_eq!(result.len(), "2025-01-01T09:00:00-03:00".len());
    }
}
