//! File naming for exported entries.

use std::path::{Component, Path, PathBuf};

use crate::api::ExportFormat;
use crate::model::Entry;

/// Maximum UTF-8 bytes of the title kept in a file name. Leaves room for a
/// `_N` suffix and the extension within the common 255-byte name limit.
const MAX_STEM_BYTES: usize = 200;

/// Highest numeric suffix tried before falling back to the entry id.
const MAX_SUFFIX: usize = 1000;

/// Makes `name` safe to use as a single path segment.
///
/// Characters invalid on common filesystems (`/ \ : * ? " < > |`) and control
/// characters become `_`; runs of whitespace collapse to one space. Names
/// that are empty or consist only of dots come back as `_` / underscores.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_space = false;
    for ch in name.trim().chars() {
        let mapped = match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c if c.is_whitespace() => ' ',
            c => c,
        };
        if mapped == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(mapped);
            prev_space = false;
        }
    }

    if out.is_empty() {
        return "_".to_string();
    }
    if is_single_segment(&out) {
        out
    } else {
        out.replace('.', "_")
    }
}

fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// File name for an exported entry: the sanitized title (or `entry-<id>`
/// when the title is blank) followed by `.<format>`.
#[must_use]
pub fn entry_file_name(entry: &Entry, format: ExportFormat) -> String {
    let title = entry.title.trim();
    let stem = if title.is_empty() {
        format!("entry-{}", entry.id)
    } else {
        let sanitized = sanitize_filename(title);
        truncate_to_bytes(&sanitized, MAX_STEM_BYTES).trim_end().to_string()
    };
    format!("{stem}.{format}")
}

/// Longest prefix of `value` no larger than `max_bytes`, cut on a char boundary.
fn truncate_to_bytes(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&index| value.is_char_boundary(index))
        .unwrap_or(0);
    &value[..end]
}

/// Returns `dir/filename`, or `dir/<stem>_<n><ext>` for the first `n >= 2`
/// that does not exist yet.
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let base_path = dir.join(filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };

    (2..MAX_SUFFIX)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| dir.join(format!("{stem}_{MAX_SUFFIX}{ext}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: u64, title: &str) -> Entry {
        Entry {
            id,
            title: title.to_string(),
            ..Entry::default()
        }
    }

    #[test]
    fn test_sanitize_filename_replaces_invalid_chars() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_sanitize_filename_collapses_whitespace() {
        assert_eq!(sanitize_filename("  Rust   in  Action "), "Rust in Action");
    }

    #[test]
    fn test_sanitize_filename_rewrites_dot_segments() {
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn test_sanitize_filename_keeps_unicode() {
        assert_eq!(sanitize_filename("日本語の記事"), "日本語の記事");
    }

    #[test]
    fn test_entry_file_name_uses_title_and_format() {
        let name = entry_file_name(&entry(7, "Why Rust? A/B tests"), ExportFormat::Pdf);
        assert_eq!(name, "Why Rust_ A_B tests.pdf");
    }

    #[test]
    fn test_entry_file_name_falls_back_to_id() {
        assert_eq!(
            entry_file_name(&entry(42, "   "), ExportFormat::Epub),
            "entry-42.epub"
        );
    }

    #[test]
    fn test_entry_file_name_truncates_long_titles() {
        let long = "x".repeat(500);
        let name = entry_file_name(&entry(1, &long), ExportFormat::Txt);
        assert_eq!(name.len(), MAX_STEM_BYTES + ".txt".len());
    }

    #[test]
    fn test_entry_file_name_multibyte_title_fits_filesystem_limit() {
        let dir = TempDir::new().unwrap();
        for title in ["記".repeat(200), "🦀".repeat(200)] {
            let name = entry_file_name(&entry(5, &title), ExportFormat::Epub);
            assert!(name.len() <= MAX_STEM_BYTES + ".epub".len(), "{} bytes", name.len());
            assert!(name.ends_with(".epub"));

            // A second copy needs the numeric suffix and must still be creatable.
            let first = resolve_unique_path(dir.path(), &name);
            std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&first)
                .unwrap();
            let second = resolve_unique_path(dir.path(), &name);
            std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&second)
                .unwrap();
            assert_ne!(first, second);
        }
    }

    #[test]
    fn test_truncate_to_bytes_respects_char_boundaries() {
        assert_eq!(truncate_to_bytes("abc", 10), "abc");
        assert_eq!(truncate_to_bytes("記記", 4), "記");
        assert_eq!(truncate_to_bytes("記", 2), "");
    }

    #[test]
    fn test_resolve_unique_path_returns_base_when_free() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolve_unique_path(dir.path(), "a.pdf"),
            dir.path().join("a.pdf")
        );
    }

    #[test]
    fn test_resolve_unique_path_adds_numeric_suffix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"1").unwrap();
        std::fs::write(dir.path().join("a_2.pdf"), b"2").unwrap();
        assert_eq!(
            resolve_unique_path(dir.path(), "a.pdf"),
            dir.path().join("a_3.pdf")
        );
    }

    #[test]
    fn test_resolve_unique_path_without_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes"), b"1").unwrap();
        assert_eq!(
            resolve_unique_path(dir.path(), "notes"),
            dir.path().join("notes_2")
        );
    }
}
