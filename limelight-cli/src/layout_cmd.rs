use anyhow::{Context, Result, bail};
use colored::*;
use limelight_core::{Layout, LayoutMode, MediaCapabilities, StageMember, Tile, compute_layout};

/// Parses `identity:caps`, where caps is `cam`, `screen`, `cam+screen` or `none`.
pub fn parse_member(arg: &str) -> Result<StageMember> {
    let (identity, caps) = arg
        .split_once(':')
        .with_context(|| format!("expected identity:caps, got '{}'", arg))?;
    if identity.is_empty() {
        bail!("empty identity in '{}'", arg);
    }

    let mut capabilities = MediaCapabilities::default();
    for cap in caps.split('+') {
        match cap.trim() {
            "cam" | "camera" => capabilities.has_camera = true,
            "screen" | "share" => capabilities.has_screen_share = true,
            "none" | "" => {}
            other => bail!("unknown capability '{}' for {}", other, identity),
        }
    }

    Ok(StageMember::new(identity, capabilities))
}

pub fn run(mode: LayoutMode, members: &[String]) -> Result<()> {
    let members = members
        .iter()
        .map(|m| parse_member(m))
        .collect::<Result<Vec<_>>>()?;

    let layout = compute_layout(mode, &members);
    print!("{}", render(&layout));
    Ok(())
}

pub fn render(layout: &Layout) -> String {
    let mut out = format!("{} {}\n", "layout:".bold(), layout.mode.to_string().cyan());

    if layout.is_waiting() {
        out.push_str(&format!("  {}\n", "waiting for stage members".yellow()));
        return out;
    }

    if let Some(primary) = &layout.primary {
        out.push_str(&format!("  {} {}\n", "primary:".green(), tile(primary)));
    }
    for tile_ref in &layout.secondary {
        out.push_str(&format!("  {} {}\n", "-".dimmed(), tile(tile_ref)));
    }
    out
}

fn tile(tile: &Tile) -> String {
    format!("{} ({})", tile.identity, tile.source)
}
