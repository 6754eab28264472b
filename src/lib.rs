use std::path::Path;

use crate::analysers::{Analyser, TelegramDesktopAnalyser};
use crate::error::Result;
use crate::extractors::{Extractor, TelegramDesktopExtractor};
use crate::model::Account;
use crate::offsets::Offsets;
use crate::organiser::{Organiser, TelegramDesktopOrganiser};
use crate::region::RegionStore;

pub mod analysers;
pub mod error;
pub mod extractors;
pub mod model;
pub mod offsets;
pub mod organiser;
pub mod recognisers;
pub mod region;
pub mod report;
pub mod scanner;

#[cfg(test)]
mod test_support;

/// Runs the whole carving pipeline - Region Store, Extractors, Analysers,
/// Organiser - over one dump directory and returns the recovered account.
pub fn carve_dump_directory(dump_dir: &Path, offsets: Offsets) -> Result<Account> {
    let store = RegionStore::load(dump_dir)?;
    let extractor = TelegramDesktopExtractor::new(offsets);
    let analyser = TelegramDesktopAnalyser::new(offsets);

    let user_records = extractor
        .extract_users(&store)
        .into_iter()
        .filter_map(|window| analyser.analyse_user(&store, window.address))
        .collect();

    let message_records = extractor
        .extract_messages(&store)
        .into_iter()
        .filter_map(|window| analyser.analyse_message(&store, window.address))
        .collect();

    Ok(TelegramDesktopOrganiser.organise(user_records, message_records))
}
