//! The current selection: at most one layer, text or image.

use serde::{Deserialize, Serialize};

use crate::LayerId;

/// Which layer, if any, the toolbar is editing.
///
/// Selecting a layer of one kind implicitly clears a selection of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// A text layer.
    Text(LayerId),
    /// An image layer.
    Image(LayerId),
}

impl Selection {
    /// Selected text layer, if any.
    #[must_use]
    pub fn text(self) -> Option<LayerId> {
        match self {
            Self::Text(id) => Some(id),
            _ => None,
        }
    }

    /// Selected image layer, if any.
    #[must_use]
    pub fn image(self) -> Option<LayerId> {
        match self {
            Self::Image(id) => Some(id),
            _ => None,
        }
    }

    /// Selected layer of either kind.
    #[must_use]
    pub fn layer(self) -> Option<LayerId> {
        match self {
            Self::Text(id) | Self::Image(id) => Some(id),
            Self::None => None,
        }
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}
