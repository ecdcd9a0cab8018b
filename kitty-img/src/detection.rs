// ABOUTME: Terminal capability detection for kitty graphics protocol support
// ABOUTME: Reads environment hints and honors a forced-protocol override

use std::env;

pub const FORCE_PROTOCOL_VAR: &str = "KITTY_IMG_FORCE_PROTOCOL";

#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub supports_kitty_images: bool,
    pub terminal_name: String,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        // Check for user override first
        if let Ok(forced_protocol) = env::var(FORCE_PROTOCOL_VAR) {
            if let Some(caps) = Self::from_forced_protocol(&forced_protocol) {
                return caps;
            }
            log::warn!(
                "Unknown protocol '{}' in {}. Valid values: kitty, none",
                forced_protocol,
                FORCE_PROTOCOL_VAR
            );
        }

        let term_program = env::var("TERM_PROGRAM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let wezterm_exe = env::var("WEZTERM_EXECUTABLE").ok();
        let kitty_window_id = env::var("KITTY_WINDOW_ID").ok();

        Self {
            supports_kitty_images: detect_kitty_support(
                &term_program,
                &term,
                wezterm_exe.as_deref(),
                kitty_window_id.as_deref(),
            ),
            terminal_name: determine_terminal_name(&term_program, &term),
        }
    }

    /// Create capabilities from forced protocol override
    fn from_forced_protocol(protocol: &str) -> Option<Self> {
        let terminal_name = format!("forced-{}", protocol);

        match protocol.to_lowercase().as_str() {
            "kitty" => Some(Self {
                supports_kitty_images: true,
                terminal_name,
            }),
            "none" | "disable" | "disabled" => Some(Self {
                supports_kitty_images: false,
                terminal_name,
            }),
            _ => None,
        }
    }
}

fn detect_kitty_support(
    term_program: &str,
    term: &str,
    wezterm_exe: Option<&str>,
    kitty_window_id: Option<&str>,
) -> bool {
    // Direct Kitty terminal
    if term_program == "kitty" || kitty_window_id.is_some_and(|id| !id.is_empty()) {
        return true;
    }

    // WezTerm implements the graphics protocol
    if term_program.eq_ignore_ascii_case("wezterm") || wezterm_exe.is_some() {
        return true;
    }

    if term_program == "ghostty" {
        return true;
    }

    term.contains("kitty") || term.contains("ghostty")
}

fn determine_terminal_name(term_program: &str, term: &str) -> String {
    if !term_program.is_empty() {
        term_program.to_string()
    } else if !term.is_empty() {
        term.to_string()
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        FORCE_PROTOCOL_VAR,
        "TERM_PROGRAM",
        "TERM",
        "WEZTERM_EXECUTABLE",
        "KITTY_WINDOW_ID",
    ];

    /// Run `f` with the given variables set and every other detection
    /// variable removed, restoring the original environment afterwards.
    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let saved: Vec<(&str, Option<String>)> =
            VARS.iter().map(|k| (*k, env::var(k).ok())).collect();

        unsafe {
            for key in VARS {
                env::remove_var(key);
            }
            for (key, value) in vars {
                env::set_var(key, value);
            }
        }

        f();

        unsafe {
            for (key, value) in saved {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_kitty_terminal_detection() {
        with_env(&[("TERM_PROGRAM", "kitty")], || {
            let caps = TerminalCapabilities::detect();
            assert!(caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "kitty");
        });

        with_env(&[("KITTY_WINDOW_ID", "1")], || {
            assert!(TerminalCapabilities::detect().supports_kitty_images);
        });
    }

    #[test]
    #[serial]
    fn test_wezterm_detection() {
        with_env(&[("TERM_PROGRAM", "WezTerm")], || {
            assert!(TerminalCapabilities::detect().supports_kitty_images);
        });

        with_env(&[("TERM_PROGRAM", "wezterm")], || {
            assert!(TerminalCapabilities::detect().supports_kitty_images);
        });

        with_env(&[("WEZTERM_EXECUTABLE", "/usr/bin/wezterm-gui")], || {
            assert!(TerminalCapabilities::detect().supports_kitty_images);
        });
    }

    #[test]
    #[serial]
    fn test_term_variable_detection() {
        with_env(&[("TERM", "xterm-kitty")], || {
            let caps = TerminalCapabilities::detect();
            assert!(caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "xterm-kitty");
        });
    }

    #[test]
    #[serial]
    fn test_no_support_detection() {
        with_env(&[("TERM_PROGRAM", "Apple_Terminal"), ("TERM", "xterm-256color")], || {
            assert!(!TerminalCapabilities::detect().supports_kitty_images);
        });

        with_env(&[], || {
            let caps = TerminalCapabilities::detect();
            assert!(!caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "unknown");
        });
    }

    #[test]
    #[serial]
    fn test_force_protocol() {
        with_env(&[(FORCE_PROTOCOL_VAR, "kitty"), ("TERM", "dumb")], || {
            let caps = TerminalCapabilities::detect();
            assert!(caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "forced-kitty");
        });

        with_env(&[(FORCE_PROTOCOL_VAR, "none"), ("TERM_PROGRAM", "kitty")], || {
            let caps = TerminalCapabilities::detect();
            assert!(!caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "forced-none");
        });
    }

    #[test]
    #[serial]
    fn test_unknown_forced_protocol_falls_back() {
        with_env(&[(FORCE_PROTOCOL_VAR, "sixel"), ("TERM_PROGRAM", "ghostty")], || {
            let caps = TerminalCapabilities::detect();
            assert!(caps.supports_kitty_images);
            assert_eq!(caps.terminal_name, "ghostty");
        });
    }
}
