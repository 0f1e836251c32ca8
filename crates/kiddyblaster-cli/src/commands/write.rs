use anyhow::{Result, bail};
use kiddyblaster_core::uri::{ensure_directory, uri_from_path};
use kiddyblaster_storage::{
    ProvisionOutcome, ProvisionRequest, Reconciler, RegistryEntry, SqliteRegistry,
};
use kiddyblaster_web::Device;
use std::io::{BufRead, Write};
use tracing::error;

use super::with_database;
use crate::config::Config;
use crate::reader::{self, SimulatedCard};

/// Options of the `write` subcommand.
#[derive(Debug, Clone)]
pub struct WriteArgs {
    pub name: String,
    pub path: String,
    /// Overwrite a provisioned card without asking.
    pub yes: bool,
}

/// Bind the card on the reader to a library directory.
pub async fn run(config: &Config, args: &WriteArgs, card: &SimulatedCard) -> Result<()> {
    ensure_directory(&args.path)?;
    let uri = uri_from_path(&config.library.music_dir, &args.path)?;
    println!("URI derived from path: {uri}");

    with_database(config, |db| async move {
        let (scanner, _simulator) = reader::open(config, card)?;
        let reconciler = Reconciler::new(SqliteRegistry::new(db.pool().clone()), scanner);
        provision(&reconciler, args, uri).await
    })
    .await
}

async fn provision(
    reconciler: &Reconciler<SqliteRegistry, Device>,
    args: &WriteArgs,
    uri: String,
) -> Result<()> {
    println!("About to write:\nname = {}\nuri  = {}\n", args.name, uri);
    println!("Waiting for card - hold a card near the reader or press CTRL+c to abort");

    let request = ProvisionRequest::new(&args.name, uri);
    let outcome = match reconciler.provision(&request).await {
        Ok(ProvisionOutcome::ConfirmationRequired { existing }) => {
            if !args.yes && !confirm_overwrite(&existing)? {
                println!("Aborted.");
                return Ok(());
            }
            reconciler
                .provision(&request.clone().confirm_overwrite_of(existing.id))
                .await
        }
        other => other,
    };

    match outcome {
        Ok(ProvisionOutcome::Allocated { id }) => println!("Card #{id} has been written"),
        Ok(ProvisionOutcome::Updated { id }) => println!("Card #{id} has been updated"),
        Ok(ProvisionOutcome::ConfirmationRequired { existing }) => {
            bail!("Card changed while writing; it now maps to #{}", existing.id)
        }
        Err(e) => {
            error!(error = %e, "provisioning failed");
            return Err(e.into());
        }
    }
    Ok(())
}

fn confirm_overwrite(existing: &RegistryEntry) -> Result<bool> {
    print!(
        "This card already contains data:\nid={}\nname={}\nuri={}\nProceed and overwrite this card? y/N? ",
        existing.id, existing.name, existing.uri
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y\n", true)]
    #[case("Y", true)]
    #[case(" y ", true)]
    #[case("\n", false)]
    #[case("n\n", false)]
    #[case("yes\n", false)]
    fn test_is_yes(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }
}
