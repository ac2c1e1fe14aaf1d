// SPDX-License-Identifier: MPL-2.0
//! Selection bookkeeping for single- and multi-select picks.

use crate::application::port::AssetIndex;
use crate::domain::media::{AssetId, PickedMedia};
use crate::domain::picker::{can_add_more, PickerConfig};
use futures_util::future::join_all;

/// Result of a [`SelectionManager::toggle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The asset was added.
    Selected,
    /// The asset was already selected and has been removed.
    Deselected,
    /// Single-select: the asset replaced the previous selection.
    Replaced { previous: AssetId },
    /// Multi-select: the maximum is reached, nothing changed.
    Rejected,
}

impl ToggleOutcome {
    /// Returns `true` if the selection changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Tracks selected asset ids in selection order.
///
/// Pagination and filter changes never touch the selection, so assets picked
/// under one filter stay selected after switching to another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionManager {
    multi_select: bool,
    max_selection: Option<u32>,
    selected: Vec<AssetId>,
}

impl SelectionManager {
    #[must_use]
    pub fn new(multi_select: bool, max_selection: Option<u32>) -> Self {
        Self {
            multi_select,
            max_selection,
            selected: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &PickerConfig) -> Self {
        Self::new(config.multi_select, config.max_selection)
    }

    /// Adds or removes an asset according to the selection mode.
    pub fn toggle(&mut self, id: &AssetId) -> ToggleOutcome {
        if let Some(pos) = self.selected.iter().position(|selected| selected == id) {
            self.selected.remove(pos);
            return ToggleOutcome::Deselected;
        }

        if !self.multi_select {
            let previous = self.selected.pop();
            self.selected.clear();
            self.selected.push(id.clone());
            return match previous {
                Some(previous) => ToggleOutcome::Replaced { previous },
                None => ToggleOutcome::Selected,
            };
        }

        if !self.can_add_more() {
            return ToggleOutcome::Rejected;
        }
        self.selected.push(id.clone());
        ToggleOutcome::Selected
    }

    #[must_use]
    pub fn is_selected(&self, id: &AssetId) -> bool {
        self.selected.contains(id)
    }

    /// Returns `true` if another asset may be added in multi-select mode.
    #[must_use]
    pub fn can_add_more(&self) -> bool {
        can_add_more(self.selected.len(), self.max_selection)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected ids, in selection order.
    #[must_use]
    pub fn ids(&self) -> &[AssetId] {
        &self.selected
    }

    /// The only selected id, if exactly one asset is selected.
    #[must_use]
    pub fn single(&self) -> Option<&AssetId> {
        match self.selected.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Re-fetches every selected asset from the index and enriches it.
    pub async fn resolve_selected(&self, index: &dyn AssetIndex) -> Vec<PickedMedia> {
        resolve_assets(&self.selected, index).await
    }
}

/// Re-fetches `ids` from the index, in order, and enriches each with its
/// local URI and MIME type.
///
/// Assets that can no longer be fetched are logged and skipped.
pub async fn resolve_assets(ids: &[AssetId], index: &dyn AssetIndex) -> Vec<PickedMedia> {
    let lookups = ids.iter().map(|id| async move { (id, index.get_asset_info(id).await) });

    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(info) => Some(PickedMedia {
                mime_type: info.asset.mime_type(),
                local_uri: info.local_uri,
                asset: info.asset,
                cropped_uri: None,
            }),
            Err(err) => {
                tracing::warn!(asset = %id, error = %err, "selected asset could not be resolved");
                None
            }
        })
        .collect()
}
