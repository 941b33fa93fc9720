use serde::{Deserialize, Serialize};

use crate::layout::mode::LayoutMode;
use crate::model::{Identity, MediaCapabilities, TrackSource};

/// A stage member together with the capabilities read from its publications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMember {
    pub identity: Identity,
    pub capabilities: MediaCapabilities,
}

impl StageMember {
    pub fn new(identity: impl Into<Identity>, capabilities: MediaCapabilities) -> Self {
        Self {
            identity: identity.into(),
            capabilities,
        }
    }
}

/// One slot on screen: whose track, and which of their tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub identity: Identity,
    pub source: TrackSource,
}

impl Tile {
    fn camera(member: &StageMember) -> Self {
        Self {
            identity: member.identity.clone(),
            source: TrackSource::Camera,
        }
    }

    fn screen_share(member: &StageMember) -> Self {
        Self {
            identity: member.identity.clone(),
            source: TrackSource::ScreenShare,
        }
    }

    /// Screen share when active, otherwise the camera (rendered as a placeholder when off).
    fn preferred(member: &StageMember) -> Self {
        if member.capabilities.has_screen_share {
            Self::screen_share(member)
        } else {
            Self::camera(member)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub mode: LayoutMode,
    /// Always `None` in grid mode.
    pub primary: Option<Tile>,
    /// Side list, carousel, or in grid mode every stage member.
    pub secondary: Vec<Tile>,
}

impl Layout {
    /// Nothing to render: the UI shows its waiting state.
    pub fn is_waiting(&self) -> bool {
        match self.mode {
            LayoutMode::Grid => self.secondary.is_empty(),
            LayoutMode::Sidebar | LayoutMode::Spotlight => self.primary.is_none(),
        }
    }

    /// Every identity placed on screen, primary first, without duplicates.
    pub fn identities(&self) -> Vec<&Identity> {
        let mut seen: Vec<&Identity> = Vec::new();
        for tile in self.primary.iter().chain(self.secondary.iter()) {
            if !seen.contains(&&tile.identity) {
                seen.push(&tile.identity);
            }
        }
        seen
    }
}

/// Arranges `members` for `mode`. Pure: the same input always yields the same layout.
///
/// With several simultaneous screen shares the first one in `members` order wins.
pub fn compute_layout(mode: LayoutMode, members: &[StageMember]) -> Layout {
    match mode {
        LayoutMode::Grid => Layout {
            mode,
            primary: None,
            secondary: members.iter().map(Tile::preferred).collect(),
        },
        LayoutMode::Sidebar => {
            let (primary, secondary) = sidebar_slots(members);
            Layout {
                mode,
                primary,
                secondary,
            }
        }
        LayoutMode::Spotlight => {
            let (primary, secondary) = spotlight_slots(members);
            Layout {
                mode,
                primary,
                secondary,
            }
        }
    }
}

/// Primary is the first screen share, else the first camera. The remaining
/// camera participants fill the side list; the sharer's camera is left out.
fn sidebar_slots(members: &[StageMember]) -> (Option<Tile>, Vec<Tile>) {
    let cameras = members.iter().filter(|m| m.capabilities.has_camera);

    if let Some(sharer) = members.iter().find(|m| m.capabilities.has_screen_share) {
        let secondary = cameras
            .filter(|m| m.identity != sharer.identity)
            .map(Tile::camera)
            .collect();
        return (Some(Tile::screen_share(sharer)), secondary);
    }

    let mut cameras = cameras.map(Tile::camera);
    let primary = cameras.next();
    (primary, cameras.collect())
}

/// Same primary as the sidebar, but every stage member gets a camera tile in
/// the carousel, placeholders included. With a share the sharer keeps theirs.
fn spotlight_slots(members: &[StageMember]) -> (Option<Tile>, Vec<Tile>) {
    if let Some(sharer) = members.iter().find(|m| m.capabilities.has_screen_share) {
        let carousel = members.iter().map(Tile::camera).collect();
        return (Some(Tile::screen_share(sharer)), carousel);
    }

    let primary = members.iter().find(|m| m.capabilities.has_camera);
    let carousel = members
        .iter()
        .filter(|m| primary.is_none_or(|p| p.identity != m.identity))
        .map(Tile::camera)
        .collect();
    (primary.map(Tile::camera), carousel)
}
