//! Shell scripts that stand in for the real `mtr` binary.
//!
//! Used where the real [`hopwatch_runner::MtrProbe`] has to spawn a process.
//! Arguments arrive as `$1` mode flag, `$3` count, `$5` destination.

use std::path::{Path, PathBuf};

/// Answers like `mtr`. Destinations starting with `fail.` exit 1 and
/// destinations starting with `slow.` never finish on their own.
pub const FAKE_MTR: &str = r#"#!/bin/sh
mode="$1"
count="$3"
dest="$5"
case "$dest" in
  fail.*) echo "mtr: Failed to resolve host: $dest" >&2; exit 1 ;;
  slow.*) exec sleep 30 ;;
esac
if [ "$mode" = "-j" ]; then
  printf '{"report":{"mtr":{"dst":"%s","tests":%s},"hubs":[{"count":1,"host":"%s"}]}}\n' "$dest" "$count" "$dest"
else
  echo "Host Loss% Snt Last Avg Best Wrst StDev"
  echo "$dest 0.0% $count 5.2 5.0 4.8 6.1 0.3"
fi
"#;

/// Write [`FAKE_MTR`] into `dir` as an executable named `mtr`.
#[cfg(unix)]
pub fn install_fake_mtr(dir: &Path) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("mtr");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(FAKE_MTR.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
