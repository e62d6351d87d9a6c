use crate::entry::{Entry, PLACEHOLDER_COUNT};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "heic"];

fn image_extension(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
        .then_some((stem, ext))
}

/// `"alice.JPG"` -> `"alice"`. Names without a known image extension are kept whole.
pub fn strip_image_extension(name: &str) -> &str {
    match image_extension(name) {
        Some((stem, _)) => stem,
        None => name,
    }
}

/// Builds the full entry set. An empty name list falls back to the placeholder guests.
pub fn load_entries(image_dir: &Path, names: &[String]) -> Vec<Entry> {
    let entries: Vec<Entry> = if names.is_empty() {
        (0..PLACEHOLDER_COUNT).map(Entry::placeholder).collect()
    } else {
        names
            .iter()
            .enumerate()
            .map(|(id, file)| Entry::image(id, image_dir.join(file), strip_image_extension(file)))
            .collect()
    };
    log::info!("Loaded {} cards", entries.len());
    entries
}

/// Lists image files in `dir`, sorted by file name.
pub fn scan_image_dir(dir: &Path) -> Result<Vec<String>> {
    let read = fs::read_dir(dir).wrap_err_with(|| format!("reading {}", dir.display()))?;
    let mut names = Vec::new();
    for dir_entry in read {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = dir_entry.file_name().to_str().map(str::to_owned) else {
            log::warn!("skipping non utf-8 file name in {}", dir.display());
            continue;
        };
        if image_extension(&name).is_some() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
