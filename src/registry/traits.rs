// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::registry::error::RegistryResult;
use crate::registry::models::{Plot, PlotData, PlotId, WishlistEntry};

#[async_trait]
pub trait PlotRegistry: Send + Sync {
    /// List active plots, newest first
    async fn list_active(&self) -> RegistryResult<Vec<Plot>>;

    /// Get a plot by ID, whether active or not
    async fn get_by_id(&self, id: PlotId) -> RegistryResult<Option<Plot>>;

    /// Validate and store a new plot
    /// Returns the stored plot with its assigned ID and posted date
    async fn create(&self, data: PlotData) -> RegistryResult<Plot>;

    /// Overwrite the mutable fields of an existing plot
    async fn update(&self, id: PlotId, data: PlotData) -> RegistryResult<Plot>;

    /// Mark a plot inactive
    /// Returns false if no plot has this ID; that case is otherwise a no-op
    async fn soft_delete(&self, id: PlotId) -> RegistryResult<bool>;

    /// Case-insensitive match on title, location or description among active plots
    /// A blank keyword lists every active plot
    async fn search(&self, keyword: Option<&str>) -> RegistryResult<Vec<Plot>>;

    /// Case-insensitive match on location among active plots
    async fn search_by_location(&self, location: &str) -> RegistryResult<Vec<Plot>>;
}

#[async_trait]
pub trait WishlistRegistry: Send + Sync {
    /// Active plots on the user's wishlist, most recently added first
    async fn get_user_wishlist(&self, user_id: &str) -> RegistryResult<Vec<Plot>>;

    /// Raw wishlist entries for the user, including those whose plot is inactive
    async fn list_entries(&self, user_id: &str) -> RegistryResult<Vec<WishlistEntry>>;

    /// Returns false if the plot is missing, inactive, or already on the wishlist
    async fn add_to_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool>;

    /// Returns false only if the plot does not exist
    async fn remove_from_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool>;

    async fn is_in_wishlist(&self, user_id: &str, plot_id: PlotId) -> RegistryResult<bool>;
}
