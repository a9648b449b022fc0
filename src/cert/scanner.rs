use crate::cert::loader::PemLoader;
use crate::cert::record::CertificateRecord;
use crate::utils::errors::{PagerError, Result};
use std::fs;
use std::path::Path;

const CERTIFICATE_SUFFIX: &str = ".pem";

/// Build the certificate inventory for one directory (non-recursive).
///
/// Fails only when the directory itself cannot be listed. Unreadable files
/// are logged and skipped, and entries are visited in file-name order.
pub fn scan_directory(dir: &Path) -> Result<Vec<CertificateRecord>> {
    let entries = fs::read_dir(dir).map_err(|source| PagerError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Unable to read entry in {}, error: {e}", dir.display());
                continue;
            }
        };

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(CERTIFICATE_SUFFIX) {
            continue;
        }

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => continue,
            Ok(_) => candidates.push((file_name, entry.path())),
            Err(e) => {
                tracing::warn!("Unable to stat {}, error: {e}", entry.path().display());
            }
        }
    }
    candidates.sort();

    let mut records = Vec::new();
    for (file_name, path) in candidates {
        match PemLoader::load_file(&path) {
            Ok(parsed) => {
                tracing::debug!("Loaded {} certificates from {}", parsed.len(), file_name);
                records.extend(
                    parsed
                        .into_iter()
                        .map(|cert| CertificateRecord::new(&file_name, cert)),
                );
            }
            Err(e) => {
                tracing::warn!("Unable to open certificate {}, error: {e}", path.display());
            }
        }
    }

    tracing::info!("found {} certificates in {}", records.len(), dir.display());
    Ok(records)
}
