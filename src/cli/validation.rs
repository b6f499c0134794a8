//! Value parsers for CLI arguments clap cannot check on its own.

use std::net::IpAddr;
use std::path::PathBuf;

/// Largest rollback accepted in one invocation.
pub const MAX_ROLLBACK_STEPS: u32 = 100;

/// Accepts ports 1-65535.
pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("Port must be between 1 and 65535, got 0".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!(
            "Port must be a number between 1 and 65535, got '{}'",
            value
        )),
    }
}

/// Accepts an existing, readable file.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("Configuration file not found: '{}'", value));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", value, e))
}

/// Accepts 1 to [`MAX_ROLLBACK_STEPS`].
pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("Rollback steps must be a positive number, got '{}'", value))?;

    match steps {
        0 => Err("Rollback steps must be greater than 0".to_string()),
        s if s > MAX_ROLLBACK_STEPS => Err(format!(
            "Rollback steps cannot exceed {}",
            MAX_ROLLBACK_STEPS
        )),
        s => Ok(s),
    }
}

/// Accepts an IP address or an RFC 1123 hostname.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }

    let looks_numeric = host.chars().all(|c| c.is_ascii_digit() || c == '.');
    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    if looks_numeric || host.len() > 253 || !host.split('.').all(valid_label) {
        return Err(format!("Invalid host address: '{}'", value));
    }
    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_port_bounds() {
        assert_eq!(validate_port("1"), Ok(1));
        assert_eq!(validate_port("65535"), Ok(65535));
        for bad in ["0", "65536", "-1", "http", ""] {
            assert!(validate_port(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_hosts() {
        for good in ["localhost", "0.0.0.0", "::1", "10.1.2.3", "api.example.com", "db-1"] {
            assert!(validate_host_address(good).is_ok(), "{good} should be accepted");
        }
        for bad in ["", "  ", "has space", "999.1.1.1", "-lead.example", "a..b"] {
            assert!(validate_host_address(bad).is_err(), "{bad} should be rejected");
        }
        assert!(validate_host_address(&"a".repeat(254)).is_err());
    }

    #[test]
    fn test_rollback_steps() {
        assert_eq!(validate_rollback_steps("3"), Ok(3));
        assert_eq!(validate_rollback_steps("100"), Ok(100));
        for bad in ["0", "101", "x", "-2"] {
            assert!(validate_rollback_steps(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_config_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        let path = file.path().to_str().unwrap();

        assert_eq!(validate_config_file_path(path), Ok(PathBuf::from(path)));

        let dir = tempfile::tempdir().unwrap();
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_config_file_path("/definitely/not/here.toml").is_err());
    }
}
