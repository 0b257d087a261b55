//! Process-wide quiet switch for decorative CLI output

use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

fn quiet_from_env() -> bool {
    std::env::var("BOTLEDGER_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Fix the quiet setting for this process: on if `flag` is set or
/// `BOTLEDGER_QUIET` is truthy. Only the first call takes effect.
pub fn init_quiet(flag: bool) -> bool {
    *QUIET.get_or_init(|| flag || quiet_from_env())
}

/// Headers, sections and info lines are suppressed when quiet.
/// Results and errors always print.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(quiet_from_env)
}
