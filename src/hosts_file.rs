//! Managed block maintenance inside a shared hosts file.
//!
//! The file is split at the start marker. Everything above it belongs to
//! other writers and is kept verbatim (minus trailing blank lines).
//! Everything from the marker down is thrown away and regenerated from the
//! index on every pass:
//!
//! ```text
//! 127.0.0.1    localhost
//!
//!
//! ### Start Docker Domains ###
//! 172.17.0.2    db.localhost   postgres.localhost
//! ### End Docker Domains ###
//!
//! ```
//!
//! The new file is written to a sibling `.aux` path and renamed over the
//! target, so readers see either the old or the new content, never a
//! partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::index::HostsIndex;

/// First line of the managed block.
pub const START_MARKER: &str = "### Start Docker Domains ###\n";

/// Last line of the managed block.
pub const END_MARKER: &str = "### End Docker Domains ###\n";

/// Default location of the system hosts file.
pub const DEFAULT_HOSTS_PATH: &str = "/etc/hosts";

/// A hosts file together with the settings used to render into it.
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
    tld: String,
    dry_run: bool,
}

impl HostsFile {
    pub fn new(path: impl Into<PathBuf>, tld: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tld: tld.into(),
            dry_run: false,
        }
    }

    /// Print the block instead of writing the file.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tld(&self) -> &str {
        &self.tld
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Regenerates the managed block from `index`.
    ///
    /// In dry-run mode the rendered block goes to stdout and the file is
    /// left alone.
    pub fn reconcile(&self, index: &HostsIndex) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.reconcile_to(index, &mut out)
    }

    /// Same as [`reconcile`](Self::reconcile), with dry-run output sent to `out`.
    pub fn reconcile_to<W: Write>(&self, index: &HostsIndex, out: &mut W) -> Result<()> {
        log_index(index);

        let mut lines = read_preserved_prefix(&self.path)?;
        strip_trailing_blank_lines(&mut lines);

        let block = render_block(index, &self.tld);

        if self.dry_run {
            out.write_all(block.as_bytes()).map_err(Error::Output)?;
            out.flush().map_err(Error::Output)?;
            return Ok(());
        }

        let mut content = lines.concat();
        content.push_str(&block);
        debug!("Proposed hosts content:\n{}", content);

        write_atomic(&self.path, &content)?;
        info!("Wrote hosts file {}", self.path.display());
        Ok(())
    }
}

fn log_index(index: &HostsIndex) {
    if index.is_empty() {
        info!("No containers tracked, removing all managed hosts");
        return;
    }
    info!("Updating hosts file");
    for entry in index.entries() {
        info!("Host entry {} -> {:?}", entry.address, entry.domains);
    }
}

/// Reads the file and returns the lines above the start marker.
///
/// Lines keep their terminators. Without a marker the whole file is returned.
pub fn read_preserved_prefix(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .split_inclusive('\n')
        .take_while(|line| *line != START_MARKER)
        .map(str::to_string)
        .collect())
}

/// Pops empty or whitespace-only lines off the end.
pub fn strip_trailing_blank_lines(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
}

/// Renders the managed block, or an empty string when there is nothing to track.
pub fn render_block(index: &HostsIndex, tld: &str) -> String {
    if index.is_empty() {
        return String::new();
    }

    let mut block = format!("\n\n{START_MARKER}");
    for entry in index.entries() {
        let mut domains: Vec<String> = entry
            .domains
            .iter()
            .map(|domain| format!("{domain}.{tld}"))
            .collect();
        domains.sort();
        block.push_str(&format!("{}    {}\n", entry.address, domains.join("   ")));
    }
    block.push_str(END_MARKER);
    block.push('\n');
    block
}

/// Path of the scratch file used while replacing `path`.
pub fn aux_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".aux");
    path.with_file_name(name)
}

/// Writes `content` to a sibling file, syncs it, and renames it over `path`.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = aux_path(path);
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(&tmp).map_err(write_err)?;
    if let Err(e) = file.write_all(content.as_bytes()).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    drop(file);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    Ok(())
}
