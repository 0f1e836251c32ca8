//! Reader construction.

use anyhow::{Context, Result};
use kiddyblaster_core::CardId;
use kiddyblaster_hardware::mock::{MockCard, MockReader, MockReaderHandle};
use kiddyblaster_hardware::types::Uid;
use kiddyblaster_scan::Scanner;
use kiddyblaster_web::Device;
use tracing::info;

use crate::config::Config;

/// A card to place on the simulated reader at startup.
#[derive(Debug, Clone, Default)]
pub struct SimulatedCard {
    pub uid: Option<String>,
    pub card_id: Option<u16>,
}

/// Build the scanner over the simulated reader.
pub fn open(config: &Config, card: &SimulatedCard) -> Result<(Scanner<Device>, MockReaderHandle)> {
    let protocol = config.protocol()?;
    let (reader, handle) = MockReader::new();

    if let Some(uid) = &card.uid {
        let uid = Uid::from_hex(uid).context("Invalid --uid")?;
        let mock = match card.card_id {
            Some(id) => MockCard::with_id(uid.clone(), protocol.block(), CardId::new(id)),
            None => MockCard::blank(uid.clone()),
        };
        handle.insert_card(mock);
        handle.present(&uid)?;
        info!(uid = %uid, "simulated card on reader");
    }

    let scanner = Scanner::new(Box::new(reader) as Device, protocol, config.scan_config());
    Ok((scanner, handle))
}
