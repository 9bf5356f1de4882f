// SPDX-License-Identifier: GPL-3.0-only
pub mod error;
pub mod models;
pub mod plots;
pub mod sqlite;
pub mod traits;
pub mod validation;
pub mod wishlist;

pub use error::RegistryError;
pub use models::{FieldError, Plot, PlotData, PlotId, WishlistEntry, GUEST_USER_ID};
pub use plots::SqlitePlotRegistry;
pub use sqlite::SqliteStore;
pub use traits::{PlotRegistry, WishlistRegistry};
pub use wishlist::SqliteWishlistRegistry;
