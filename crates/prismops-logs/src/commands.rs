//! Shell snippets for log scanning
//!
//! Every scan runs under `sudo -n sh -c '<script>' sh <args>` so paths are
//! passed as positional parameters instead of being spliced into the script.

use crate::lines::lookback;

/// Kernel message log
pub const MESSAGES_FILE: &str = "/var/log/messages";
/// Directory holding crash dumps and crash logs
pub const CRASH_DIR: &str = "/home/log/crash";
/// Default service log directory
pub const DEFAULT_LOG_ROOT: &str = "/home/nutanix/data/logs";

/// Markers that flag a kernel line as critical
const KERNEL_PATTERN: &str = "crit|critical|panic|oops|fatal|bug";
/// Markers searched in the combined scan's kernel section
const KERNEL_EXTENDED_PATTERN: &str =
    "crit|critical|panic|oops|fatal|bug|segfault|backtrace|stack";
/// Markers that flag a crash log line as critical
const CRASH_PATTERN: &str = "panic|fatal|segfault|oops|assert|crash|backtrace|stack";

/// Quote `value` for a POSIX shell
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Wrap `script` in `sudo -n sh -c` with positional `args`
fn sudo_sh(script: &str, args: &[&str]) -> String {
    let mut cmd = format!("sudo -n sh -c {} sh", shell_quote(script));
    for arg in args {
        cmd.push(' ');
        cmd.push_str(&shell_quote(arg));
    }
    cmd
}

/// Recent critical kernel messages, falling back to the plain tail
#[must_use]
pub fn kernel_critical_command(lines: u32) -> String {
    let window = lookback(lines);
    let script = format!(
        r#"out=$(tail -n {window} "$1" | grep -i "kernel" | grep -i -E "{KERNEL_PATTERN}" | tail -n {lines} || true); if [ -n "$out" ]; then printf "%s\n" "$out"; else tail -n {lines} "$1"; fi"#
    );
    sudo_sh(&script, &[MESSAGES_FILE])
}

/// Per-file critical markers from the crash log directory
#[must_use]
pub fn crash_critical_command(lines: u32) -> String {
    let script = format!(
        r#"cd "$1" || exit 1; found=0; for f in *; do if [ -f "$f" ]; then found=1; echo "=== $f ==="; count=$(grep -ci -E "{CRASH_PATTERN}" "$f" 2>/dev/null || true); echo "critical_matches=$count"; if [ "$count" -gt 0 ]; then crit=$(grep -i -E "{CRASH_PATTERN}" "$f" 2>/dev/null | tail -n {lines}); if [ -n "$crit" ]; then printf "%s\n" "$crit"; fi; else echo "(no critical markers; showing tail)"; tail -n {lines} "$f"; fi; fi; done; if [ "$found" -eq 0 ]; then echo "no crash logs found"; fi"#
    );
    sudo_sh(&script, &[CRASH_DIR])
}

/// Kernel, crash and fatal service logs in one pass
///
/// `log_root` is searched for non-empty `*.FATAL` files.
#[must_use]
pub fn critical_logs_command(lines: u32, log_root: &str) -> String {
    let window = lookback(lines);
    let script = format!(
        r#"
echo "=== kernel_logs ==="
if [ -f "$1" ]; then
  out=$(tail -n {window} "$1" | grep -i "kernel" | grep -i -E "{KERNEL_EXTENDED_PATTERN}" | tail -n {lines} || true)
  if [ -n "$out" ]; then printf "%s\n" "$out"; else tail -n {lines} "$1"; fi
else
  echo "$1 not found"
fi

echo ""
echo "=== crash_logs ==="
if [ -d "$2" ]; then
  file_count=$(find "$2" -maxdepth 1 -type f 2>/dev/null | wc -l)
  echo "file_count=$file_count"
  found=0
  for f in "$2"/*; do
    if [ -f "$f" ]; then
      found=1
      echo "--- $(basename "$f") ---"
      count=$(grep -ci -E "{CRASH_PATTERN}" "$f" 2>/dev/null || true)
      echo "critical_matches=$count"
      if [ "$count" -gt 0 ]; then
        crit=$(grep -i -E "{CRASH_PATTERN}" "$f" 2>/dev/null | tail -n {lines})
        if [ -n "$crit" ]; then printf "%s\n" "$crit"; fi
      else
        echo "(no critical markers; showing tail)"
        tail -n {lines} "$f"
      fi
    fi
  done
  if [ "$found" -eq 0 ]; then echo "no crash logs found"; fi
else
  echo "$2 not found"
fi

echo ""
echo "=== fatal_service_logs ==="
if [ -d "$3" ]; then
  fatal_count=$(find "$3" -maxdepth 1 -type f -name "*.FATAL" -size +0c 2>/dev/null | wc -l)
  echo "fatal_files=$fatal_count"
  if [ "$fatal_count" -gt 0 ]; then
    for f in "$3"/*.FATAL; do
      if [ -s "$f" ]; then
        echo "--- $(basename "$f") ---"
        tail -n {lines} "$f"
      fi
    done
  else
    echo "no fatal service logs found"
  fi
else
  echo "$3 not found"
fi
"#
    );
    sudo_sh(&script, &[MESSAGES_FILE, CRASH_DIR, log_root])
}

/// Split newline-separated batch input into commands
///
/// Lines are trimmed; blank lines are dropped.
#[must_use]
pub fn parse_commands(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
