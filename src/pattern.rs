//! Service name patterns
//!
//! Patterns are used verbatim: nothing is appended implicitly, so `Xbl` only
//! matches a service literally named `Xbl` while `Xbl*` matches every service
//! starting with it. `*`, `?` and `[...]` carry their PowerShell wildcard
//! meaning and matching ignores case, like the Service Control Manager does.

use crate::error::{ManagerError, ManagerResult};
use glob::{MatchOptions, Pattern};
use std::fmt;

/// Characters that would let a pattern escape the scheduled task command line
const FORBIDDEN_CHARS: [char; 7] = ['&', '|', ';', '$', '\'', '"', '`'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct ServiceNamePattern {
    raw: String,
    compiled: Pattern,
}

impl ServiceNamePattern {
    pub fn parse(raw: &str) -> ManagerResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ManagerError::Usage("service pattern must not be empty".to_string()));
        }
        if raw.chars().any(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(&c)) {
            return Err(ManagerError::Usage(format!(
                "service pattern '{}' contains whitespace or shell metacharacters",
                raw
            )));
        }
        let compiled = Pattern::new(raw)
            .map_err(|e| ManagerError::Usage(format!("invalid service pattern '{}': {}", raw, e.msg)))?;

        Ok(Self {
            raw: raw.to_string(),
            compiled,
        })
    }

    /// Parse a list of patterns, rejecting an empty list
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> ManagerResult<Vec<Self>> {
        if raw.is_empty() {
            return Err(ManagerError::Usage("at least one service pattern is required".to_string()));
        }
        raw.iter().map(|p| Self::parse(p.as_ref())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_wildcard(&self) -> bool {
        self.raw.contains(['*', '?', '['])
    }

    pub fn matches(&self, service_name: &str) -> bool {
        self.compiled.matches_with(service_name, MATCH_OPTIONS)
    }
}

impl PartialEq for ServiceNamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ServiceNamePattern {}

impl fmt::Display for ServiceNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// True if any of the patterns matches the service name
pub fn matches_any(patterns: &[ServiceNamePattern], service_name: &str) -> bool {
    patterns.iter().any(|p| p.matches(service_name))
}

pub fn to_strings(patterns: &[ServiceNamePattern]) -> Vec<String> {
    patterns.iter().map(|p| p.as_str().to_string()).collect()
}

/// Validate a task name used to build `START-<name>` / `STOP-<name>`
pub fn validate_task_name(name: &str) -> ManagerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ManagerError::Usage("task name must not be empty".to_string()));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(&c) || matches!(c, '\\' | '/' | '*' | '?'))
    {
        return Err(ManagerError::Usage(format!(
            "task name '{}' contains whitespace, wildcards or shell metacharacters",
            name
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_wildcard_matches_prefix() {
        let pattern = ServiceNamePattern::parse("Xbl*").unwrap();
        assert!(pattern.is_wildcard());
        assert!(pattern.matches("XblAuthManager"));
        assert!(pattern.matches("XblGameSave"));
        assert!(!pattern.matches("XboxNetApiSvc"));
    }

    #[test]
    fn test_no_implicit_suffix() {
        let pattern = ServiceNamePattern::parse("Xbl").unwrap();
        assert!(!pattern.is_wildcard());
        assert!(pattern.matches("Xbl"));
        assert!(!pattern.matches("XblAuthManager"));
    }

    #[test]
    fn test_matching_ignores_case() {
        let pattern = ServiceNamePattern::parse("spooler").unwrap();
        assert!(pattern.matches("Spooler"));
    }

    #[test]
    fn test_rejects_empty_and_dangerous_patterns() {
        assert!(matches!(ServiceNamePattern::parse("  "), Err(ManagerError::Usage(_))));
        assert!(matches!(ServiceNamePattern::parse("svc;calc"), Err(ManagerError::Usage(_))));
        assert!(matches!(ServiceNamePattern::parse("svc name"), Err(ManagerError::Usage(_))));
        assert!(matches!(ServiceNamePattern::parse("$env"), Err(ManagerError::Usage(_))));
    }

    #[test]
    fn test_parse_all_requires_one_pattern() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(ServiceNamePattern::parse_all(&empty), Err(ManagerError::Usage(_))));

        let parsed = ServiceNamePattern::parse_all(&["X1", "X2*"]).unwrap();
        assert_eq!(to_strings(&parsed), vec!["X1", "X2*"]);
        assert!(matches_any(&parsed, "X2Service"));
        assert!(!matches_any(&parsed, "X3"));
    }

    #[test]
    fn test_validate_task_name() {
        assert_eq!(validate_task_name(" xbox ").unwrap(), "xbox");
        assert!(validate_task_name("").is_err());
        assert!(validate_task_name("my task").is_err());
        assert!(validate_task_name("a\\b").is_err());
    }
}
