//! A stand-in for the `flux` executable, for binary tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
here=$(dirname "$0")
echo "$*" >> "$here/calls"
case "$1" in
  jobs)
    cat "$here/jobs.json"
    ;;
  *)
    for last; do :; done
    if [ -f "$here/deny-$last" ]; then
      echo "flux: $last: Operation not permitted" >&2
      exit 1
    fi
    if [ -f "$here/missing-$last" ]; then
      echo "flux: $last: unknown job id" >&2
      exit 1
    fi
    ;;
esac
"#;

/// A shell script that prints canned `flux jobs --json` output and records
/// every invocation.
pub struct FakeFlux {
    dir: TempDir,
}

impl FakeFlux {
    pub fn new(jobs_json: &str) -> io::Result<Self> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("jobs.json"), jobs_json)?;
        let script = dir.path().join("flux");
        fs::write(&script, SCRIPT)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn command(&self) -> PathBuf {
        self.dir.path().join("flux")
    }

    /// Answer cancel/kill requests for `id` with a permission error.
    pub fn deny(&self, id: u64) -> io::Result<()> {
        fs::write(self.dir.path().join(format!("deny-{id}")), "")
    }

    /// Answer cancel/kill requests for `id` with an unknown job error.
    pub fn missing(&self, id: u64) -> io::Result<()> {
        fs::write(self.dir.path().join(format!("missing-{id}")), "")
    }

    /// Argument lines of every invocation so far.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls"))
            .map(|calls| calls.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Environment that points a wrapper at this script and at an empty
    /// configuration directory.
    pub fn envs(&self) -> Vec<(String, String)> {
        vec![
            (
                "FLUX_WRAPPERS_FLUX__COMMAND".to_string(),
                self.command().display().to_string(),
            ),
            (
                "FLUX_WRAPPERS_CONFIG_DIR".to_string(),
                self.dir().display().to_string(),
            ),
        ]
    }
}
