use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Hash, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Every stage member in a uniform grid.
    #[default]
    Grid,
    /// One primary slot plus a scrollable side list.
    Sidebar,
    /// One primary slot plus a horizontal carousel.
    Spotlight,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grid => "grid",
            Self::Sidebar => "sidebar",
            Self::Spotlight => "spotlight",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown layout mode '{0}', expected grid, sidebar or spotlight")]
pub struct ParseLayoutModeError(String);

impl FromStr for LayoutMode {
    type Err = ParseLayoutModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "sidebar" => Ok(Self::Sidebar),
            "spotlight" => Ok(Self::Spotlight),
            _ => Err(ParseLayoutModeError(s.to_owned())),
        }
    }
}
