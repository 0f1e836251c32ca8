//! HTTP surface of the Kiddyblaster card box.
//!
//! - `GET /stream` - Server-Sent Events, one `message` event per detected card
//! - `GET /cards`, `GET /cards/:id` - registry lookup
//! - `POST /cards/provision` - provision the card on the reader
//! - `POST /cards/:id/write` - retry a pending card write
//! - `POST /simulator/present`, `POST /simulator/remove` - drive the
//!   simulated reader

pub mod api;
pub mod error;
pub mod server;
pub mod state;

pub use api::build_router;
pub use error::{ApiError, ApiResult};
pub use server::serve;
pub use state::{AppState, Device};
