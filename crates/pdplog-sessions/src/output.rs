use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ConvertError;
use crate::types::Session;

/// Serialize sessions as a JSON array followed by a newline.
pub fn write_json<W: Write>(mut writer: W, sessions: &[Session], pretty: bool) -> Result<(), ConvertError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, sessions)?;
    } else {
        serde_json::to_writer(&mut writer, sessions)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Create `path` and write the sessions into it.
pub fn write_json_file(path: &Path, sessions: &[Session], pretty: bool) -> Result<(), ConvertError> {
    let write_err = |source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    match write_json(BufWriter::new(file), sessions, pretty) {
        Err(ConvertError::Read(source)) => Err(write_err(source)),
        Err(ConvertError::Json(e)) if e.is_io() => Err(write_err(e.into())),
        other => other,
    }
}
