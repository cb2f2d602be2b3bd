//! JSON export of a collected dialogue

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::Dialogue;

pub fn to_json(dialogue: &Dialogue, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(dialogue)?
    } else {
        serde_json::to_string(dialogue)?
    };
    Ok(json)
}

pub fn from_json(json: &str) -> Result<Dialogue> {
    Ok(serde_json::from_str(json)?)
}

/// Write the document to `path`, replacing any existing file.
///
/// The write is not atomic; an interrupted run may leave a truncated file.
pub fn write_json<P: AsRef<Path>>(json: &str, path: P) -> Result<()> {
    fs::write(path.as_ref(), json)?;
    tracing::info!(path = %path.as_ref().display(), bytes = json.len(), "Export written");
    Ok(())
}

/// Serialize, echo the payload to stdout, then write it to `path`.
pub fn export<P: AsRef<Path>>(dialogue: &Dialogue, path: P, pretty: bool) -> Result<String> {
    let json = to_json(dialogue, pretty)?;
    println!("{}", json);
    write_json(&json, &path)?;

    match dialogue.time_span() {
        Some((oldest, newest)) => tracing::info!(
            messages = dialogue.messages.len(),
            senders = dialogue.distinct_senders(),
            "Exported history from {} to {}",
            oldest.format("%d.%m.%Y %H:%M:%S"),
            newest.format("%d.%m.%Y %H:%M:%S"),
        ),
        None => tracing::info!(messages = dialogue.messages.len(), "Exported empty history"),
    }

    Ok(json)
}
