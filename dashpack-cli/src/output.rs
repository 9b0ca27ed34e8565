//! Output writers for `dashpack`.

use std::io::Write;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use serde::Serialize;

use crate::error::DashpackError;

/// Render `payload` as JSON text.
///
/// # Errors
///
/// Returns [`DashpackError::Json`] if serialisation fails.
pub fn render<T: Serialize>(payload: &T, pretty: bool) -> Result<String, DashpackError> {
    let text = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    Ok(text)
}

/// Write `text` plus a newline to `destination`, or to `stdout` when absent.
///
/// # Errors
///
/// Returns [`DashpackError::Io`] when the file or stream cannot be written.
pub fn emit(
    text: &str,
    destination: Option<&Utf8Path>,
    stdout: &mut impl Write,
) -> Result<(), DashpackError> {
    match destination {
        Some(path) => write_file(path, text),
        None => writeln!(stdout, "{text}").map_err(|err| DashpackError::io("<stdout>", err)),
    }
}

fn write_file(path: &Utf8Path, text: &str) -> Result<(), DashpackError> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| DashpackError::io(path, std::io::ErrorKind::InvalidInput.into()))?;
    Dir::create_ambient_dir_all(parent, ambient_authority())
        .map_err(|err| DashpackError::io(parent, err))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| DashpackError::io(parent, err))?;
    let mut file = dir
        .open_with(
            file_name,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|err| DashpackError::io(path, err))?;
    writeln!(file, "{text}").map_err(|err| DashpackError::io(path, err))
}

#[cfg(test)]
mod tests {
    //! Output rendering and file writes.
    #![expect(clippy::expect_used, reason = "tests panic on broken fixtures")]

    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn compact_and_pretty_rendering() {
        let payload = json!({"a": [1, 2]});
        assert_eq!(render(&payload, false).expect("render"), r#"{"a":[1,2]}"#);
        assert!(render(&payload, true).expect("render").contains('\n'));
    }

    #[rstest]
    fn emits_to_the_given_stream() {
        let mut buffer = Vec::new();
        emit("{}", None, &mut buffer).expect("emit");
        assert_eq!(buffer, b"{}\n");
    }

    #[rstest]
    fn writes_files_creating_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        let target = root.join("nested").join("out.json");
        let mut unused = Vec::new();
        emit("{\"ok\":true}", Some(&target), &mut unused).expect("emit to file");
        let written = std::fs::read_to_string(&target).expect("read back");
        assert_eq!(written, "{\"ok\":true}\n");
        assert!(unused.is_empty());
    }
}
