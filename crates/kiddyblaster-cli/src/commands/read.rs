use anyhow::Result;
use kiddyblaster_storage::{Registry, SqliteRegistry};

use super::with_database;
use crate::config::Config;
use crate::reader::{self, SimulatedCard};

/// Read one card and print what it plays.
pub async fn run(config: &Config, card: &SimulatedCard) -> Result<()> {
    with_database(config, |db| async move {
        let registry = SqliteRegistry::new(db.pool().clone());
        let (scanner, _simulator) = reader::open(config, card)?;

        println!("Waiting for card - hold a card near the reader or press CTRL+c to abort");
        let id = scanner.scan(scanner.config().write_timeout).await?;

        if id.is_unprovisioned() {
            println!("Card is blank");
            return Ok(());
        }
        match registry.find_by_id(i64::from(id)).await? {
            Some(entry) => println!("id={}\nname={}\nuri={}", entry.id, entry.name, entry.uri),
            None => println!("Card #{id} is not in the registry"),
        }
        Ok(())
    })
    .await
}
