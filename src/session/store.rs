use crate::session::SessionRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn export_file_name() -> String {
    let millis = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis(),
        Err(_) => 0,
    };
    format!("question-{millis}.json")
}

pub fn ensure_export_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Writes the record as pretty JSON into `dir` and returns the final path.
/// The file is written under a temporary name first and renamed into place.
pub fn export(record: &SessionRecord, dir: &Path) -> io::Result<PathBuf> {
    ensure_export_dir(dir)?;
    let final_path = dir.join(export_file_name());
    write_atomic(record, &final_path)?;
    Ok(final_path)
}

fn write_atomic(record: &SessionRecord, final_path: &Path) -> io::Result<()> {
    let tmp_path = final_path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(record)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, final_path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if final_path.exists() {
                fs::remove_file(final_path)?;
                fs::rename(&tmp_path, final_path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}
