use anyhow::{anyhow, Result};
use url::Url;

/// Validate that a string is a valid URL with http or https scheme
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str.trim())
        .map_err(|e| anyhow!("Invalid URL format: {}", e))?;

    // Only allow http and https schemes
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!(
            "URL must use http or https scheme, got: {}",
            url.scheme()
        ));
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a host"));
    }

    Ok(url)
}

/// Find the first http(s) URL embedded in free text.
/// The match runs from the scheme up to the next whitespace character.
pub fn extract_first_url(text: &str) -> Option<String> {
    let start = ["http://", "https://"]
        .iter()
        .filter_map(|scheme| text.find(scheme))
        .min()?;

    let candidate: String = text[start..]
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();

    // A bare scheme with nothing after it is not a link
    if candidate == "http://" || candidate == "https://" {
        return None;
    }

    Some(candidate)
}

/// Validate a GitHub login (alphanumeric and hyphens, 1-39 chars)
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > 39 {
        return Err(anyhow!(
            "Username must be between 1 and 39 characters"
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(anyhow!(
            "Username can only contain alphanumeric characters, hyphens, and underscores"
        ));
    }

    Ok(())
}

/// Validate a `starting_year` query value
pub fn validate_starting_year(year: i32) -> Result<()> {
    if year > 1900 && year < 2200 {
        Ok(())
    } else {
        Err(anyhow!(
            "Invalid starting_year format. Must be a valid year."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://github.com").is_ok());
        assert!(validate_url("http://localhost:3000").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("example.com").is_err());
    }

    #[test]
    fn test_extract_first_url() {
        assert_eq!(
            extract_first_url("Demo at https://demo.example.com/app and more"),
            Some("https://demo.example.com/app".to_string())
        );
        assert_eq!(
            extract_first_url("see http://a.dev then https://b.dev"),
            Some("http://a.dev".to_string())
        );
        assert_eq!(extract_first_url("no links here"), None);
        assert_eq!(extract_first_url("trailing https://"), None);
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("octocat").is_ok());
        assert!(validate_username("my-user_123").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"a".repeat(40)).is_err());
        assert!(validate_username("user@example").is_err());
        assert!(validate_username("../etc").is_err());
    }

    #[test]
    fn test_validate_starting_year() {
        assert!(validate_starting_year(2020).is_ok());
        assert!(validate_starting_year(1900).is_err());
        assert!(validate_starting_year(2200).is_err());
    }
}
