use crate::utils::error::{Result, ScoutError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScoutError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_log_level(field_name: &str, level: &str) -> Result<()> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
        _ => Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: level.to_string(),
            reason: "Expected one of trace, debug, info, warn, error, off".to_string(),
        }),
    }
}

/// 請求欄位必填檢查：缺少或只有空白都視為缺少
pub fn require_field<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ScoutError::MissingFieldError {
            field: field_name.to_string(),
        }),
    }
}

/// 取開頭的數字部分解析整數："5.5" -> 5、"12km" -> 12；沒有數字時回傳 None
pub fn lenient_int(raw: &str) -> Option<i64> {
    numeric_prefix(raw.trim(), false).parse().ok()
}

/// 同上，但允許一個小數點："4.5 stars" -> 4.5
pub fn lenient_float(raw: &str) -> Option<f64> {
    numeric_prefix(raw.trim(), true)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let mut seen_dot = false;
    let end = s
        .char_indices()
        .find(|&(i, c)| match c {
            '+' | '-' => i != 0,
            '.' if allow_fraction && !seen_dot => {
                seen_dot = true;
                false
            }
            c => !c.is_ascii_digit(),
        })
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("providers.nominatim.endpoint", "https://example.com").is_ok());
        assert!(validate_url("providers.nominatim.endpoint", "http://example.com").is_ok());
        assert!(validate_url("providers.nominatim.endpoint", "").is_err());
        assert!(validate_url("providers.nominatim.endpoint", "invalid-url").is_err());
        assert!(validate_url("providers.nominatim.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("search.max_results", 5, 1).is_ok());
        assert!(validate_positive_number("search.max_results", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("gemini.max_attempts", 5, 1, 10).is_ok());
        assert!(validate_range("gemini.max_attempts", 11, 1, 10).is_err());
    }

    #[test]
    fn test_require_field() {
        let present = Some("Lagos".to_string());
        assert_eq!(require_field("location", &present).unwrap(), "Lagos");

        let blank = Some("   ".to_string());
        assert!(matches!(
            require_field("location", &blank),
            Err(ScoutError::MissingFieldError { .. })
        ));
        assert!(require_field("location", &None).is_err());
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(lenient_int("5"), Some(5));
        assert_eq!(lenient_int(" 5.5 "), Some(5));
        assert_eq!(lenient_int("-1"), Some(-1));
        assert_eq!(lenient_int("12km"), Some(12));
        assert_eq!(lenient_int("abc"), None);
        assert_eq!(lenient_int(""), None);
        assert_eq!(lenient_int("-"), None);

        assert_eq!(lenient_float("4.5"), Some(4.5));
        assert_eq!(lenient_float("4.5.1"), Some(4.5));
        assert_eq!(lenient_float(".5"), Some(0.5));
        assert_eq!(lenient_float("great"), None);
        assert_eq!(lenient_float("."), None);
    }
}
