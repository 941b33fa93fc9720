use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    Camera,
    Microphone,
    ScreenShare,
}

impl TrackSource {
    /// Video sources are the ones whose subscription follows stage membership.
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Camera | Self::ScreenShare)
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
            Self::ScreenShare => "screen_share",
        };
        f.write_str(name)
    }
}

/// What the transport reports for one publication.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq)]
pub struct PublicationState {
    pub is_subscribed: bool,
    pub is_enabled: bool,
}

impl PublicationState {
    pub fn live() -> Self {
        Self {
            is_subscribed: true,
            is_enabled: true,
        }
    }

    /// Enabled and subscribed, i.e. renderable on this client.
    pub fn is_active(&self) -> bool {
        self.is_subscribed && self.is_enabled
    }
}

/// Derived at read time from the publication table, never stored.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq)]
pub struct MediaCapabilities {
    pub has_camera: bool,
    pub has_screen_share: bool,
}

impl MediaCapabilities {
    pub fn camera() -> Self {
        Self {
            has_camera: true,
            has_screen_share: false,
        }
    }

    pub fn screen_share() -> Self {
        Self {
            has_camera: false,
            has_screen_share: true,
        }
    }

    pub fn from_publications<F>(lookup: F) -> Self
    where
        F: Fn(TrackSource) -> Option<PublicationState>,
    {
        let active = |source| lookup(source).is_some_and(|p| p.is_active());

        Self {
            has_camera: active(TrackSource::Camera),
            has_screen_share: active(TrackSource::ScreenShare),
        }
    }

    pub fn has_any(&self) -> bool {
        self.has_camera || self.has_screen_share
    }
}
