//! schtasks.exe command assembly and output parsing

use std::path::Path;

pub const SCHTASKS: &str = "schtasks.exe";

/// Event filter of the dummy ONEVENT trigger; the tasks only ever run on demand
const DUMMY_EVENT_FILTER: &str = "*[System/EventID=999]";

/// Markers schtasks prints when the system cannot find the task (English, German locale)
const TASK_NOT_FOUND_MARKERS: [&str; 2] = [
    "ERROR: The system cannot find the file specified",
    "FEHLER: Das System kann die angegebene Datei nicht finden",
];

/// Markers schtasks prints on success (English, German locale)
const SUCCESS_MARKERS: [&str; 2] = ["SUCCESS", "ERFOLGREICH"];

/// Command line the scheduled task runs: the action script followed by the patterns
pub fn task_command(script_path: &Path, patterns: &[String]) -> String {
    let script = script_path.display().to_string();
    let script = if script.contains(char::is_whitespace) {
        format!("\"{}\"", script)
    } else {
        script
    };
    format!("PowerShell.exe -WindowStyle hidden -File {} {}", script, patterns.join(" "))
}

/// Arguments for `schtasks.exe /CREATE` registering an on-demand task with highest run level
pub fn create_task_args(task_name: &str, patterns: &[String], script_path: &Path, username: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "/CREATE".into(),
        "/SC".into(),
        "ONEVENT".into(),
        "/TN".into(),
        task_name.into(),
        "/TR".into(),
        task_command(script_path, patterns),
        "/RL".into(),
        "HIGHEST".into(),
    ];
    if let Some(user) = username.filter(|u| !u.trim().is_empty()) {
        args.push("/RU".into());
        args.push(user.to_string());
    }
    args.extend(
        ["/EC", "Application", "/MO", DUMMY_EVENT_FILTER, "/F"]
            .iter()
            .map(|s| s.to_string()),
    );
    args
}

pub fn run_task_args(task_name: &str) -> Vec<String> {
    vec!["/RUN".into(), "/TN".into(), task_name.into()]
}

/// Verbose LIST query; contains the "Task To Run" line
pub fn query_task_args(task_name: &str) -> Vec<String> {
    vec![
        "/QUERY".into(),
        "/V".into(),
        "/FO".into(),
        "LIST".into(),
        "/TN".into(),
        task_name.into(),
    ]
}

pub fn is_task_not_found(output: &str) -> bool {
    TASK_NOT_FOUND_MARKERS.iter().any(|marker| output.contains(marker))
}

pub fn is_success(output: &str) -> bool {
    SUCCESS_MARKERS.iter().any(|marker| output.contains(marker))
}

/// Extract the service patterns from a verbose task query.
///
/// The patterns are every argument after the script passed to `-File` on the
/// "Task To Run" line. Returns `None` if no such line exists.
pub fn parse_task_patterns(query_output: &str) -> Option<Vec<String>> {
    query_output.lines().find_map(|line| {
        let lowered = line.to_ascii_lowercase();
        let index = lowered.find("-file ")?;
        let rest = line[index + "-file ".len()..].trim_start();

        let after_script = if let Some(quoted) = rest.strip_prefix('"') {
            &quoted[quoted.find('"')? + 1..]
        } else {
            match rest.find(char::is_whitespace) {
                Some(end) => &rest[end..],
                None => "",
            }
        };

        Some(after_script.split_whitespace().map(|s| s.to_string()).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_task_not_found_detection() {
        assert!(is_task_not_found("ERROR: The system cannot find the file specified.\r\r\n"));
        assert!(is_task_not_found("FEHLER: Das System kann die angegebene Datei nicht finden.\r\n"));
        assert!(!is_task_not_found("ERROR: Access is denied.\r\n"));
    }

    #[test]
    fn test_success_detection() {
        assert!(is_success("SUCCESS: The scheduled task \"START-svc\" has successfully been created.\r\n"));
        assert!(is_success("ERFOLGREICH: Die geplante Aufgabe \"START-svc\" wurde erfolgreich erstellt.\r\n"));
        assert!(!is_success("WARNING: The task name \"START-svc\" already exists.\r\n"));
    }

    #[test]
    fn test_create_task_args_layout() {
        let patterns = vec!["dummy-svc1".to_string(), "dummy-svc2".to_string()];
        let script = PathBuf::from("dummy-script");
        let args = create_task_args("dummy-task", &patterns, &script, Some("alice"));

        let expected_task = "PowerShell.exe -WindowStyle hidden -File dummy-script dummy-svc1 dummy-svc2";
        assert_eq!(args[4], "dummy-task");
        assert_eq!(args[6], expected_task);
        assert_eq!((args[9].as_str(), args[10].as_str()), ("/RU", "alice"));
        assert_eq!(args.last().map(String::as_str), Some("/F"));
    }

    #[test]
    fn test_create_task_args_without_user() {
        let args = create_task_args("t", &["svc".to_string()], Path::new("s.ps1"), None);
        assert!(!args.iter().any(|a| a == "/RU"));
        assert!(args.iter().any(|a| a == "*[System/EventID=999]"));
    }

    #[test]
    fn test_task_command_quotes_paths_with_spaces() {
        let command = task_command(Path::new("C:\\Program Files\\wsm\\start-service.ps1"), &["Xbl*".to_string()]);
        assert_eq!(
            command,
            "PowerShell.exe -WindowStyle hidden -File \"C:\\Program Files\\wsm\\start-service.ps1\" Xbl*"
        );
    }

    #[test]
    fn test_parse_single_pattern() {
        let query = "Test Line\r\n".repeat(10)
            + "Task To Run:  PowerShell.exe -WindowStyle hidden -File start-service.ps1 Xbl*\r\n";
        assert_eq!(parse_task_patterns(&query), Some(vec!["Xbl*".to_string()]));
    }

    #[test]
    fn test_parse_multiple_patterns() {
        let query = "Test Line\r\n".repeat(10)
            + "Task To Run:  PowerShell.exe -WindowStyle hidden -File start-service.ps1 X1 X2*\r\n";
        assert_eq!(
            parse_task_patterns(&query),
            Some(vec!["X1".to_string(), "X2*".to_string()])
        );
    }

    #[test]
    fn test_parse_quoted_script_path() {
        let query = "Auszuführende Aufgabe: PowerShell.exe -WindowStyle hidden -File \"C:\\Program Files\\stop-service.ps1\" Spooler\r\n";
        assert_eq!(parse_task_patterns(query), Some(vec!["Spooler".to_string()]));
    }

    #[test]
    fn test_parse_without_task_line() {
        assert_eq!(parse_task_patterns("HostName: PC\r\nStatus: Ready\r\n"), None);
    }
}
