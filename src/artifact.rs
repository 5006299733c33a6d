//! Request-scoped video artifacts on disk.
//!
//! Every request gets a [`Token`]. Files are written under the folder's
//! staging directory and moved into place with a single rename, so a
//! published artifact is always complete. After publishing, older artifacts
//! beyond the retention count are swept.

use crate::error::Error;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

const STAGING_DIR: &str = ".staging";
const EXTENSION: &str = "mp4";

/// How much older than the current request a staged file must be before a
/// sweep treats it as abandoned.
pub const DEFAULT_STAGING_GRACE: Duration = Duration::from_secs(60 * 60);

/// Per-request identifier. Tokens sort in creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(String);

impl Token {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time since the Unix epoch.
    pub fn created(&self) -> Option<Duration> {
        created(&self.0)
    }
}

/// Creation time of a token string, or `None` when it is not one of ours.
fn created(token: &str) -> Option<Duration> {
    if token.len() != 32 {
        return None;
    }
    let uuid = Uuid::parse_str(token).ok()?;
    if uuid.get_version_num() != 7 {
        return None;
    }
    let (secs, nanos) = uuid.get_timestamp()?.to_unix();
    Some(Duration::new(secs, nanos))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One folder of `<base>_<token>.mp4` artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    base_name: String,
    keep: usize,
    staging_grace: Duration,
}

impl ArtifactStore {
    /// Open (creating if needed) the folder at `root`. `keep` is the number
    /// of published artifacts retained after a sweep, at least one.
    pub fn open<P>(root: P, base_name: &str, keep: usize) -> Result<Self, Error>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging).map_err(|e| Error::CreateFolder(e, staging))?;
        Ok(Self {
            root,
            base_name: base_name.to_owned(),
            keep: keep.max(1),
            staging_grace: DEFAULT_STAGING_GRACE,
        })
    }

    pub fn with_staging_grace(mut self, grace: Duration) -> Self {
        self.staging_grace = grace;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_name(&self, token: &Token) -> String {
        format!("{}_{}.{}", self.base_name, token, EXTENSION)
    }

    /// Where the published artifact for `token` lives.
    pub fn path(&self, token: &Token) -> PathBuf {
        self.root.join(self.file_name(token))
    }

    /// Where the artifact for `token` is written before it is published.
    pub fn staging_path(&self, token: &Token) -> PathBuf {
        self.root.join(STAGING_DIR).join(self.file_name(token))
    }

    /// Move the staged artifact into place, returning its file name.
    pub fn publish(&self, token: &Token) -> Result<String, Error> {
        let staged = self.staging_path(token);
        let published = self.path(token);
        fs::rename(&staged, &published).map_err(|e| Error::Publish(e, staged, published))?;
        info!(message = "published artifact", folder = %self.root.display(), %token);
        Ok(self.file_name(token))
    }

    /// Remove a staged artifact that will not be published.
    pub fn discard(&self, token: &Token) {
        let staged = self.staging_path(token);
        if let Err(error) = fs::remove_file(&staged) {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!(message = "could not discard staged artifact", path = %staged.display(), %error);
            }
        }
    }

    /// Copy an uploaded file in as the artifact for `token` and publish it.
    pub fn ingest(&self, upload: &Path, token: &Token) -> Result<PathBuf, Error> {
        let staged = self.staging_path(token);
        if let Err(e) = fs::copy(upload, &staged) {
            self.discard(token);
            return Err(Error::CopyUpload(e, upload.to_owned(), staged));
        }
        self.publish(token)?;
        Ok(self.path(token))
    }

    fn token_of<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let token = file_name
            .strip_prefix(self.base_name.as_str())?
            .strip_prefix('_')?
            .strip_suffix(EXTENSION)?
            .strip_suffix('.')?;
        created(token).map(|_| token)
    }

    fn artifact_names(dir: &Path) -> Option<Vec<String>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(message = "could not scan artifact folder", folder = %dir.display(), %error);
                return None;
            }
        };
        let names = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                Path::new(name)
                    .extension()
                    .map_or(false, |ext| ext == EXTENSION)
            })
            .collect();
        Some(names)
    }

    fn remove(path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(message = "deleted stale artifact", path = %path.display());
                true
            }
            Err(error) => {
                warn!(message = "could not delete stale artifact", path = %path.display(), %error);
                false
            }
        }
    }

    /// Delete artifacts older than `current` beyond the retention count.
    /// `current` and anything newer are never touched. Other `.mp4` files in
    /// the folder count as oldest. Staged files left behind by requests at
    /// least the staging grace older than `current` are deleted too. Failures
    /// are logged and skipped; returns the number of files deleted.
    pub fn sweep(&self, current: &Token) -> usize {
        let mut deleted = self.sweep_staging(current);

        let names = match Self::artifact_names(&self.root) {
            Some(names) => names,
            None => return deleted,
        };
        let mut older = names
            .into_iter()
            .filter_map(|name| {
                let token = self.token_of(&name).map(str::to_owned);
                match token {
                    Some(ref token) if token.as_str() >= current.as_str() => None,
                    _ => Some((token, name)),
                }
            })
            .collect::<Vec<_>>();

        // Newest first; foreign files (no token) sort last.
        older.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, name) in older.into_iter().skip(self.keep - 1) {
            if Self::remove(&self.root.join(&name)) {
                deleted += 1;
            }
        }
        deleted
    }

    fn sweep_staging(&self, current: &Token) -> usize {
        let now = match current.created() {
            Some(now) => now,
            None => return 0,
        };
        let staging = self.root.join(STAGING_DIR);
        let names = match Self::artifact_names(&staging) {
            Some(names) => names,
            None => return 0,
        };

        names
            .iter()
            .filter(|name| match self.token_of(name) {
                Some(token) if token < current.as_str() => created(token)
                    .and_then(|staged| now.checked_sub(staged))
                    .map_or(false, |age| age >= self.staging_grace),
                _ => false,
            })
            .filter(|name| Self::remove(&staging.join(name)))
            .count()
    }
}

/// The upload and output folders a request works in.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub uploads: ArtifactStore,
    pub outputs: ArtifactStore,
}

impl Workspace {
    pub const UPLOAD_BASE: &'static str = "user_video";
    pub const OUTPUT_BASE: &'static str = "annotated_swing";

    pub fn open<P, Q>(upload_dir: P, output_dir: Q, keep: usize) -> Result<Self, Error>
    where
        P: Into<PathBuf>,
        Q: Into<PathBuf>,
    {
        Ok(Self {
            uploads: ArtifactStore::open(upload_dir, Self::UPLOAD_BASE, keep)?,
            outputs: ArtifactStore::open(output_dir, Self::OUTPUT_BASE, keep)?,
        })
    }
}

/// Whether `path` names an upload the pipeline accepts.
pub fn is_supported_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(EXTENSION))
}
