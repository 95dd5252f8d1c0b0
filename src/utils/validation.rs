use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Returns true when `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote_source(source: &str) -> bool {
    matches!(
        Url::parse(source).map(|url| url.scheme().to_string()).as_deref(),
        Ok("http") | Ok("https")
    )
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// A dataset source is either an http(s) URL or a local path.
pub fn validate_source(field_name: &str, source: &str) -> Result<()> {
    if source.contains("://") {
        validate_url(field_name, source)
    } else {
        validate_path(field_name, source)
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.history", "https://example.com/a.csv").is_ok());
        assert!(validate_url("sources.history", "http://example.com").is_ok());
        assert!(validate_url("sources.history", "").is_err());
        assert!(validate_url("sources.history", "invalid-url").is_err());
        assert!(validate_url("sources.history", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_source_accepts_paths_and_urls() {
        assert!(validate_source("sources.top_n", "data/tiobe_top20.csv").is_ok());
        assert!(validate_source("sources.top_n", "https://example.com/top.csv").is_ok());
        assert!(validate_source("sources.top_n", "ftp://example.com/top.csv").is_err());
        assert!(validate_source("sources.top_n", "").is_err());
    }

    #[test]
    fn test_is_remote_source() {
        assert!(is_remote_source("https://raw.githubusercontent.com/x/y.csv"));
        assert!(!is_remote_source("./data/y.csv"));
        assert!(!is_remote_source("C:\\data\\y.csv"));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("reshape.rank_column_marker", "Sept").is_ok());
        assert!(validate_non_empty_string("reshape.rank_column_marker", "   ").is_err());
    }
}
