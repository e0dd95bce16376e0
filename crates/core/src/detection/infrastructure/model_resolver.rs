use std::env;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::MODEL_DIR_ENV;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve a model file by name, checking local locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled directory, if given
/// 3. Directory named by `FACEALIGN_MODEL_DIR`
/// 4. Download from URL into the cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    for dir in bundled_dir.map(Path::to_path_buf).into_iter().chain(env_model_dir()) {
        let local = dir.join(name);
        if local.exists() {
            return Ok(local);
        }
    }

    log::info!("Model {name} not found locally, downloading");
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceAlign/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceAlign/models/` or `~/.cache/FaceAlign/models/`
/// - Windows: `%LOCALAPPDATA%/FaceAlign/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceAlign").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceAlign").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn env_model_dir() -> Option<PathBuf> {
    env::var_os(MODEL_DIR_ENV).map(PathBuf::from)
}

/// Download into `dest.part`, renaming onto `dest` only after a complete
/// transfer. A failed download leaves no partial file behind.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;
    let total = response.content_length().unwrap_or(0);

    let temp_path = dest.with_extension("part");
    let result = stream_to_file(response, &temp_path, total, progress)
        .and_then(|_| fs::rename(&temp_path, dest));

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(ModelResolveError::Write {
                path: temp_path,
                source: e,
            })
        }
    }
}

/// Stream the response body to disk in chunks, reporting progress as bytes
/// actually land.
fn stream_to_file(
    mut response: reqwest::blocking::Response,
    path: &Path,
    total: u64,
    progress: Option<ProgressFn>,
) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;

    loop {
        let n = response.read(&mut buf)?;
        if n == 0 {
            return file.flush();
        }
        file.write_all(&buf[..n])?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
}
