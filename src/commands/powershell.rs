//! Service queries through PowerShell `Get-Service`

use crate::pattern::ServiceNamePattern;
use crate::status::{ServiceInfo, ServiceStatus};
use anyhow::{Context, Result};
use serde::Deserialize;

pub const POWERSHELL: &str = "powershell.exe";

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Status")]
    status: RawStatus,
}

/// `Status` is a string when stringified in the select, a number otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Text(String),
    Code(u32),
}

/// `ConvertTo-Json` emits a bare object for a single result
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawService>),
    One(RawService),
}

/// Script listing the services whose names match the patterns as compact JSON.
///
/// Patterns are validated to contain no quotes, so single-quoting is safe.
/// Unknown names are silently skipped and the script always exits 0, so an
/// empty result reaches the caller as "no match" rather than a tool failure.
pub fn get_service_script(patterns: &[ServiceNamePattern]) -> String {
    let names = patterns
        .iter()
        .map(|p| format!("'{}'", p.as_str()))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "$ProgressPreference = 'SilentlyContinue'; \
         Get-Service -Name {} -ErrorAction SilentlyContinue | \
         Select-Object Name, @{{Name='Status';Expression={{$_.Status.ToString()}}}} | \
         ConvertTo-Json -Compress; exit 0",
        names
    )
}

pub fn get_service_args(patterns: &[ServiceNamePattern]) -> Vec<String> {
    vec![
        "-NoProfile".into(),
        "-NonInteractive".into(),
        "-Command".into(),
        get_service_script(patterns),
    ]
}

/// Parse the JSON produced by [`get_service_script`]; empty output means no services
pub fn parse_services(stdout: &str) -> Result<Vec<ServiceInfo>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: OneOrMany = serde_json::from_str(trimmed).context("Failed to parse Get-Service output")?;
    let raw = match parsed {
        OneOrMany::Many(services) => services,
        OneOrMany::One(service) => vec![service],
    };

    Ok(raw
        .into_iter()
        .map(|service| {
            let status = match service.status {
                RawStatus::Text(text) => ServiceStatus::from_powershell(&text),
                RawStatus::Code(code) => ServiceStatus::from_code(code),
            };
            ServiceInfo::new(service.name, status)
        })
        .collect())
}
