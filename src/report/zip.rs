use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundles the rendered report tree into `report.zip` next to it. The
/// archive is written to a temp file first and renamed into place so a
/// failed run never leaves a half-written zip behind.
pub fn write_zip(out_dir: &Path) -> Result<()> {
    let zip_path = out_dir.join("report.zip");
    let tmp_path = out_dir.join("report.zip.tmp");

    let file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let result = write_zip_entries(&mut zip, out_dir);

    match result.and_then(|_| zip.finish().with_context(|| "failed to finalize zip")) {
        Ok(_) => {
            fs::rename(&tmp_path, &zip_path)
                .with_context(|| format!("failed to move zip to {}", zip_path.display()))?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_zip_entries(zip: &mut ZipWriter<File>, out_dir: &Path) -> Result<()> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).unwrap());

    zip.add_directory("report/", options)
        .with_context(|| "failed to add directory entry to zip")?;
    add_dir(zip, out_dir, "report", options)
}

fn add_dir(
    zip: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        // The archive itself (and its temp file) live in the same directory.
        if name.starts_with("report.zip") {
            continue;
        }
        let zip_name = format!("{prefix}/{name}");
        if path.is_dir() {
            zip.add_directory(format!("{zip_name}/"), options)
                .with_context(|| format!("failed to add {zip_name} to zip"))?;
            add_dir(zip, &path, &zip_name, options)?;
        } else {
            add_file(zip, &path, &zip_name, options)
                .with_context(|| format!("failed to add {zip_name} to zip"))?;
        }
    }
    Ok(())
}

fn add_file(
    zip: &mut ZipWriter<File>,
    src_path: &Path,
    zip_path: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut file =
        File::open(src_path).with_context(|| format!("failed to open {}", src_path.display()))?;
    zip.start_file(zip_path, options)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        zip.write_all(&buf[..n])?;
    }
    Ok(())
}
