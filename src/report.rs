//! Report writer: serialises the recovered [`Account`] tree to
//! `report.json`, pretty-printed with a 4-space indent and `null` for
//! every absent field - the one JSON-shaped artifact this crate produces.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::model::Account;

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;

/// Writes `account` as `report.json` inside `output_dir`.
pub fn write_report(account: &Account, output_dir: &Path) -> Result<()> {
    let path = output_dir.join("report.json");
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(writer, formatter);
    account.serialize(&mut serializer)?;
    Ok(())
}

/// Renders `account` to a JSON string, for callers that want the bytes
/// without touching the filesystem (e.g. tests).
pub fn render_report(account: &Account) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    account.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}
