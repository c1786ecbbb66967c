//! Report file naming and persistence

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::filter::FilterSelection;

pub const REPORT_EXTENSION: &str = "md";

/// Replace characters that would escape the output directory.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

/// `{prefix}_{machine}_{start_date}_{end_date}`, shared by the report file
/// and its chart directory.
pub fn report_stem(prefix: &str, selection: &FilterSelection) -> String {
    format!(
        "{}_{}_{}_{}",
        prefix,
        sanitize_component(&selection.machine_id),
        selection.start_date,
        selection.end_date
    )
}

/// `{report_stem}.md`
pub fn report_file_name(prefix: &str, selection: &FilterSelection) -> String {
    format!("{}.{REPORT_EXTENSION}", report_stem(prefix, selection))
}

/// A name the download endpoint may serve: a plain `.md` file name with no
/// directory components.
pub fn is_servable_report_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == REPORT_EXTENSION)
}

/// Write `text` to `dir/file_name` via a temp file and rename, so readers
/// never observe a partially written report.
pub fn write_report(dir: &Path, file_name: &str, text: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let tmp = dir.join(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp, &path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result.map(|()| path)
}
