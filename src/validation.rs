//! Centralized validation functions for autoblock.
//!
//! This module provides unified validation for:
//! - IP addresses and CIDR ranges found in source lists
//! - Source URLs given on the command line or in the config file
//! - Backup destination directories

use anyhow::{bail, Result};
use ipnet::IpNet;
use reqwest::Url;
use std::net::IpAddr;
use std::path::Path;

/// URL schemes accepted for remote lists
pub const VALID_URL_SCHEMES: &[&str] = &["http", "https"];

/// Validate an IP address or CIDR string and return the parsed IpNet.
///
/// A plain IP address (without /prefix) becomes a /32 (IPv4) or /128 (IPv6)
/// network. The caller keeps the original text; this is a syntax check only.
///
/// # Examples
/// ```
/// use autoblock::validation::validate_ip_or_cidr;
/// assert!(validate_ip_or_cidr("192.168.1.1").is_ok());
/// assert!(validate_ip_or_cidr("192.168.0.0/24").is_ok());
/// assert!(validate_ip_or_cidr("invalid").is_err());
/// ```
pub fn validate_ip_or_cidr(ip_str: &str) -> Result<IpNet> {
    if ip_str.contains('/') {
        ip_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid CIDR: {}", ip_str))
    } else {
        let ip: IpAddr = ip_str
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid IP address: {}", ip_str))?;
        Ok(IpNet::from(ip))
    }
}

/// Validate a remote list URL.
///
/// # Examples
/// ```
/// use autoblock::validation::validate_url;
/// assert!(validate_url("https://example.com/list.txt").is_ok());
/// assert!(validate_url("ftp://example.com/list.txt").is_err());
/// assert!(validate_url("not a url").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

    if !VALID_URL_SCHEMES.contains(&parsed.scheme()) {
        bail!(
            "Invalid URL '{}'. Scheme must be one of: {}",
            url,
            VALID_URL_SCHEMES.join(", ")
        );
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        bail!("Invalid URL '{}'. Missing host", url);
    }

    Ok(parsed)
}

/// Validate that a backup destination is an existing, writable directory.
pub fn validate_backup_dir(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => bail!("\"{}\" is not a valid path.", path.display()),
    };

    if !metadata.is_dir() {
        bail!("\"{}\" is not a directory.", path.display());
    }

    // Permission bits don't say whether this process may write here
    if tempfile::tempfile_in(path).is_err() {
        bail!("\"{}\" is not writable.", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ip_or_cidr_v4() {
        let net = validate_ip_or_cidr("192.168.1.1").unwrap();
        assert_eq!(net.to_string(), "192.168.1.1/32");
    }

    #[test]
    fn test_validate_ip_or_cidr_v6() {
        let net = validate_ip_or_cidr("::1").unwrap();
        assert_eq!(net.to_string(), "::1/128");
    }

    #[test]
    fn test_validate_ip_or_cidr_cidr_v4() {
        let net = validate_ip_or_cidr("192.168.0.0/24").unwrap();
        assert_eq!(net.to_string(), "192.168.0.0/24");
    }

    #[test]
    fn test_validate_ip_or_cidr_cidr_v6() {
        let net = validate_ip_or_cidr("2001:db8::/32").unwrap();
        assert_eq!(net.to_string(), "2001:db8::/32");
    }

    #[test]
    fn test_validate_ip_or_cidr_invalid_ip() {
        let err = validate_ip_or_cidr("not.an.ip").unwrap_err().to_string();
        assert!(err.contains("Invalid IP"));
    }

    #[test]
    fn test_validate_ip_or_cidr_invalid_cidr() {
        let err = validate_ip_or_cidr("192.168.1.0/99").unwrap_err().to_string();
        assert!(err.contains("Invalid CIDR"));
    }

    #[test]
    fn test_validate_ip_or_cidr_edge_cases() {
        assert!(validate_ip_or_cidr("").is_err());
        assert!(validate_ip_or_cidr("256.0.0.1").is_err());
        assert!(validate_ip_or_cidr("1.2.3").is_err());
        assert!(validate_ip_or_cidr("0.0.0.0/0").is_ok());
        assert!(validate_ip_or_cidr("255.255.255.255").is_ok());
    }

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("http://example.com/list.txt").is_ok());
        assert!(validate_url("https://example.com/list.txt").is_ok());
        assert!(validate_url("ftp://example.com/list.txt").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_validate_url_malformed() {
        assert!(validate_url("").is_err());
        assert!(validate_url("example.com/list.txt").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[test]
    fn test_validate_backup_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_backup_dir(dir.path()).is_ok());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        let err = validate_backup_dir(&file).unwrap_err().to_string();
        assert!(err.contains("not a directory"));

        let missing = dir.path().join("missing");
        let err = validate_backup_dir(&missing).unwrap_err().to_string();
        assert!(err.contains("not a valid path"));
    }

    #[test]
    fn test_validate_backup_dir_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        validate_backup_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_backup_dir_not_writable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores mode bits; only assert when the directory really refuses writes
        let writable = std::fs::write(locked.join("check"), b"x").is_ok();
        let result = validate_backup_dir(&locked);
        if writable {
            assert!(result.is_ok());
        } else {
            let err = result.unwrap_err().to_string();
            assert!(err.contains("not writable"));
        }

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
