// src/core/python_versions.rs

use crate::constants::PACKAGE_INDEX_URL;
use crate::core::commands::ExternalToolError;
use crate::models::VersionTuple;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::time::Duration;

lazy_static! {
    static ref PYTHON_PACKAGE_RE: Regex =
        Regex::new(r">python-(\d{1,2})\.(\d{1,2})\.(\d{1,2})[^<]*<").unwrap();
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Short OS name used in package index subdirectories (`linux-64`, `osx-arm64`...).
fn index_os() -> &'static str {
    match std::env::consts::OS {
        "windows" => "win",
        "macos" => "osx",
        _ => "linux",
    }
}

/// Index page listing the packages built for this OS and `architecture`.
pub fn index_url(architecture: &str) -> String {
    format!("{}/{}-{}/", PACKAGE_INDEX_URL, index_os(), architecture)
}

/// Distinct Python versions named in an index page, newest first.
pub fn parse_python_versions(html: &str) -> Vec<VersionTuple> {
    let versions: BTreeSet<VersionTuple> = PYTHON_PACKAGE_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let number = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
            Some(VersionTuple::new(number(1)?, number(2)?, number(3)?))
        })
        .collect();
    versions.into_iter().rev().collect()
}

/// The `create` argument pinning `version` (`python=3.11.4`).
pub fn version_spec(version: VersionTuple) -> String {
    format!("python={}", version)
}

/// Downloads the index page for `architecture` and lists its Python versions.
pub fn fetch_python_versions(architecture: &str) -> Result<Vec<VersionTuple>, ExternalToolError> {
    let url = index_url(architecture);
    let index_error = |message: String| ExternalToolError::PackageIndex {
        url: url.clone(),
        message,
    };

    log::debug!("Fetching Python versions from {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("condax/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| index_error(e.to_string()))?;
    let response = client
        .get(&url)
        .send()
        .map_err(|e| index_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(index_error(format!("HTTP {}", status)));
    }
    let body = response.text().map_err(|e| index_error(e.to_string()))?;
    Ok(parse_python_versions(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<tr><td><a href="python-3.9.18-h955ad1f_0.tar.bz2">python-3.9.18-h955ad1f_0.tar.bz2</a></td></tr>
<tr><td><a href="python-3.11.4-h955ad1f_0.conda">python-3.11.4-h955ad1f_0.conda</a></td></tr>
<tr><td><a href="python-3.11.4-h7a1cb2a_0.tar.bz2">python-3.11.4-h7a1cb2a_0.tar.bz2</a></td></tr>
<tr><td><a href="python-3.10.12-h955ad1f_0.conda">python-3.10.12-h955ad1f_0.conda</a></td></tr>
<tr><td><a href="python-dateutil-2.8.2-pyhd3eb1b0_0.conda">python-dateutil-2.8.2-pyhd3eb1b0_0.conda</a></td></tr>
"#;

    #[test]
    fn test_versions_are_unique_and_newest_first() {
        assert_eq!(
            parse_python_versions(PAGE),
            [
                VersionTuple::new(3, 11, 4),
                VersionTuple::new(3, 10, 12),
                VersionTuple::new(3, 9, 18),
            ]
        );
    }

    #[test]
    fn test_numeric_ordering_beats_text_ordering() {
        let page = ">python-3.9.1-x<\n>python-3.10.0-x<";
        assert_eq!(
            parse_python_versions(page).first(),
            Some(&VersionTuple::new(3, 10, 0))
        );
    }

    #[test]
    fn test_page_without_python_is_empty() {
        assert!(parse_python_versions("<html><body>nothing</body></html>").is_empty());
    }

    #[test]
    fn test_version_spec_and_url() {
        assert_eq!(version_spec(VersionTuple::new(3, 12, 1)), "python=3.12.1");
        let url = index_url("64");
        assert!(url.starts_with("https://repo.anaconda.com/pkgs/main/"));
        assert!(url.ends_with("-64/"));
    }
}
