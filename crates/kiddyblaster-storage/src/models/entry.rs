use serde::{Deserialize, Serialize};

/// A provisioned card: what the box plays when the card is presented.
///
/// The row `id` is the identifier written to the card's data block, so ids
/// beyond `u16::MAX` cannot be carried by a card.
///
/// # Fields
///
/// * `id` - Auto-increment primary key, starting at 1
/// * `name` - Display name of the album or playlist
/// * `uri` - Library URI of the content, relative to the music directory
/// * `image` - Optional cover image file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RegistryEntry {
    pub id: i64,
    pub name: String,
    pub uri: String,
    pub image: Option<String>,
}
