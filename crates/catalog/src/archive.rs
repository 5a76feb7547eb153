//! ZIP packaging of an export with a SHA-256 sidecar.

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ExportError, Result};
use crate::exporter::EXPORT_DIR_NAME;

/// A written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub zip_path: PathBuf,
    /// Lowercase hex SHA-256 of the ZIP file.
    pub sha256: String,
    /// The `.sha256` sidecar next to the archive.
    pub hash_path: PathBuf,
}

/// `stac_cop_export_{YYYYmmdd_HHMMSS}.zip`
pub fn archive_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.zip",
        EXPORT_DIR_NAME,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Zip every file under `stac_dir` into `output_dir/zip_name`.
///
/// Entry names are relative to `output_dir`, so the archive unpacks to a
/// `stac_cop_export/` tree. A sidecar `{zip_name}.sha256` holds
/// `"{hash}  {zip_name}\n"` in `sha256sum` format.
pub fn create_zip_archive(output_dir: &Path, stac_dir: &Path, zip_name: &str) -> Result<ArchiveInfo> {
    let zip_path = output_dir.join(zip_name);
    let mut files = Vec::new();
    collect_files(stac_dir, &mut files)?;
    files.sort();

    let mut zip = ZipWriter::new(BufWriter::new(File::create(&zip_path)?));
    for file in &files {
        let name = entry_name(file, output_dir)?;
        debug!("Adding {}", name);
        zip.start_file(name, file_options())?;
        io::copy(&mut BufReader::new(File::open(file)?), &mut zip)?;
    }
    zip.finish()?.flush()?;

    let sha256 = calculate_sha256(&zip_path)?;
    let hash_path = output_dir.join(format!("{}.sha256", zip_name));
    fs::write(&hash_path, format!("{}  {}\n", sha256, zip_name))?;

    info!(
        "Archived {} files to {} (sha256 {})",
        files.len(),
        zip_path.display(),
        sha256
    );
    Ok(ArchiveInfo {
        zip_path,
        sha256,
        hash_path,
    })
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Lowercase hex SHA-256 of a file.
pub fn calculate_sha256(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn entry_name(file: &Path, output_dir: &Path) -> Result<String> {
    let relative = file.strip_prefix(output_dir).map_err(|_| {
        ExportError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is outside {}", file.display(), output_dir.display()),
        ))
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn timestamped_name() {
        let t = NaiveDate::from_ymd_opt(2024, 6, 5)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap();
        assert_eq!(archive_file_name(t), "stac_cop_export_20240605_090307.zip");
    }

    #[test]
    fn known_digest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            calculate_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let out = Path::new("/out");
        let file = out.join("stac_cop_export").join("assets").join("a.geojson");
        assert_eq!(entry_name(&file, out).unwrap(), "stac_cop_export/assets/a.geojson");
        assert!(entry_name(Path::new("/elsewhere/x"), out).is_err());
    }
}
