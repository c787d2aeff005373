//! Administrator privilege detection
//!
//! Registering tasks with the HIGHEST run level needs an elevated token.
//! Starting and stopping through the registered tasks does not.

#[cfg(target_os = "windows")]
use winapi::{
    shared::minwindef::{DWORD, LPVOID},
    um::{
        handleapi::CloseHandle,
        processthreadsapi::{GetCurrentProcess, OpenProcessToken},
        securitybaseapi::GetTokenInformation,
        winnt::{TokenElevation, HANDLE, TOKEN_ELEVATION, TOKEN_QUERY},
    },
};

use log::debug;

/// True if the current process token is elevated
#[cfg(target_os = "windows")]
pub fn is_elevated() -> bool {
    use std::{mem, ptr};

    let mut token: HANDLE = ptr::null_mut();
    unsafe {
        if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token) == 0 {
            debug!("OpenProcessToken failed, assuming not elevated");
            return false;
        }

        let mut elevation: TOKEN_ELEVATION = mem::zeroed();
        let mut returned: DWORD = 0;
        let ok = GetTokenInformation(
            token,
            TokenElevation,
            &mut elevation as *mut TOKEN_ELEVATION as LPVOID,
            mem::size_of::<TOKEN_ELEVATION>() as DWORD,
            &mut returned,
        );
        CloseHandle(token);

        if ok == 0 {
            debug!("GetTokenInformation(TokenElevation) failed, assuming not elevated");
            return false;
        }
        elevation.TokenIsElevated != 0
    }
}

#[cfg(not(target_os = "windows"))]
pub fn is_elevated() -> bool {
    debug!("Elevation check is only available on Windows");
    false
}

/// Step-by-step instructions shown when registration is attempted without elevation
pub fn elevation_guidance() -> Vec<String> {
    vec![
        "Scheduled tasks with the highest run level can only be created from an elevated prompt.".to_string(),
        "1. Right-click PowerShell or Command Prompt and choose 'Run as administrator'".to_string(),
        "2. Confirm the UAC prompt".to_string(),
        "3. Run create-schtasks again from that window".to_string(),
        "Starting and stopping the services afterwards works without elevation.".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guidance_mentions_administrator() {
        let guidance = elevation_guidance();
        assert!(guidance.iter().any(|line| line.contains("Run as administrator")));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_never_elevated_off_windows() {
        assert!(!is_elevated());
    }
}
