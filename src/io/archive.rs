//! Zip packaging of job artifacts
//!
//! Directory entries are written with a trailing `/` so that extraction can
//! tell them apart from empty files. Archives are assembled in memory and
//! only then copied to the destination, so any byte sink works and a failed
//! pack writes nothing. Destinations and sources are taken by value and
//! dropped (closed) on every exit path. Nothing is rolled back when the final
//! copy itself fails; the caller owns cleanup of partially written output.

use super::stream::{copy_stream, read_fully};
use super::tree::{EntryKind, FsTree, TreeSource};
use crate::config::ArchiveConfig;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, trace, warn};
use zip::{ZipArchive, ZipWriter};

/// Pack the directory tree rooted at `base_dir` into `destination`.
///
/// Hidden entries (name starting with `.`) and everything below them are
/// skipped; the root itself is never an entry.
pub fn pack_directory_into_zip<W: Write>(base_dir: &Path, destination: W) -> Result<()> {
    pack_directory_into_zip_with_config(base_dir, destination, &ArchiveConfig::default())
}

/// [`pack_directory_into_zip`] with explicit archive options
pub fn pack_directory_into_zip_with_config<W: Write>(
    base_dir: &Path,
    destination: W,
    config: &ArchiveConfig,
) -> Result<()> {
    if !fs::metadata(base_dir)?.is_dir() {
        return Err(Error::invalid_argument(format!(
            "{} is not a directory",
            base_dir.display()
        )));
    }
    debug!("Packing directory {} into zip", base_dir.display());
    let tree = FsTree::new(base_dir).include_hidden(config.include_hidden);
    pack_tree_into_zip(&tree, destination, config)
}

/// Pack every entry of `tree` into `destination`, in the tree's order.
pub fn pack_tree_into_zip<T, W>(tree: &T, destination: W, config: &ArchiveConfig) -> Result<()>
where
    T: TreeSource + ?Sized,
    W: Write,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = config.file_options();
    let mut packed = 0usize;

    for entry in tree.entries() {
        let entry = entry?;
        if !config.include_hidden && entry.is_hidden() {
            trace!("Skipping hidden entry {}", entry.relative_path);
            continue;
        }

        let name = entry.archive_name();
        trace!("Adding zip entry {}", name);
        match entry.kind {
            EntryKind::Directory => zip.add_directory(name, options)?,
            EntryKind::File => {
                zip.start_file(name, options)?;
                let mut content = tree.open(&entry.relative_path)?;
                copy_stream(&mut content, &mut zip)?;
            }
        }
        packed += 1;
    }

    let archive = zip.finish()?.into_inner();
    let written = publish(&archive, destination)?;
    debug!("Packed {} entries into {} zip bytes", packed, written);
    Ok(())
}

/// Write `source` to `destination` as a zip holding the single entry `file_name`.
pub fn pack_stream_into_zip<R, W>(source: R, destination: W, file_name: &str) -> Result<()>
where
    R: Read,
    W: Write,
{
    pack_stream_into_zip_with_config(source, destination, file_name, &ArchiveConfig::default())
}

/// [`pack_stream_into_zip`] with explicit archive options
pub fn pack_stream_into_zip_with_config<R, W>(
    mut source: R,
    destination: W,
    file_name: &str,
    config: &ArchiveConfig,
) -> Result<()>
where
    R: Read,
    W: Write,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(file_name, config.file_options())?;
    let copied = copy_stream(&mut source, &mut zip)?;

    let archive = zip.finish()?.into_inner();
    publish(&archive, destination)?;
    debug!("Packed {} bytes into zip entry {}", copied, file_name);
    Ok(())
}

/// Copy a finished archive into `destination`, flush it and release it.
fn publish<W: Write>(archive: &[u8], mut destination: W) -> Result<u64> {
    let written = copy_stream(&mut &archive[..], &mut destination)?;
    destination.flush()?;
    Ok(written)
}

/// Extract the zip read from `source` below `target_dir`, in archive order.
///
/// The whole source is buffered first, since entries written by streaming
/// zip writers only record their sizes after the data. Missing directories
/// are created. Existing files are overwritten. Entries whose names would
/// resolve outside `target_dir` fail the whole extraction. Returns the
/// number of extracted entries.
pub fn unzip<R: Read>(source: R, target_dir: &Path) -> Result<usize> {
    fs::create_dir_all(target_dir)?;
    let bytes = read_fully(source)?;
    extract(ZipArchive::new(Cursor::new(bytes))?, target_dir)
}

/// Extract the zip file at `archive` below `target_dir`.
pub fn unzip_file(archive: &Path, target_dir: &Path) -> Result<usize> {
    fs::create_dir_all(target_dir)?;
    let file = BufReader::new(File::open(archive)?);
    extract(ZipArchive::new(file)?, target_dir)
}

fn extract<R: Read + Seek>(mut archive: ZipArchive<R>, target_dir: &Path) -> Result<usize> {
    let mut extracted = 0usize;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = match entry.enclosed_name() {
            Some(path) => path,
            None => {
                warn!("Rejecting zip entry with unsafe path {}", entry.name());
                return Err(Error::archive(format!(
                    "entry {} escapes the target directory",
                    entry.name()
                )));
            }
        };
        let resolved = target_dir.join(relative);

        if entry.is_dir() {
            trace!("Creating directory {}", resolved.display());
            fs::create_dir_all(&resolved)?;
        } else {
            if let Some(parent) = resolved.parent() {
                fs::create_dir_all(parent)?;
            }
            trace!("Extracting {}", resolved.display());
            let mut out = BufWriter::new(File::create(&resolved)?);
            copy_stream(&mut entry, &mut out)?;
            out.flush()?;
        }
        extracted += 1;
    }

    debug!(
        "Extracted {} zip entries into {}",
        extracted,
        target_dir.display()
    );
    Ok(extracted)
}
