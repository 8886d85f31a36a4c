use serde::Deserialize;

use crate::app::{LayerRole, TileGrid, TileLayer};

use super::ContentError;

const FIRST_GID_DEFAULT: u32 = 1;
const TILE_SIZE_DEFAULT: u32 = 16;

/// Tiled-style JSON map document. Only the fields this engine consumes are
/// modeled; anything else in the document is ignored.
#[derive(Debug, Deserialize)]
pub struct MapDocument {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tilesets: Vec<TilesetRef>,
    #[serde(default)]
    pub layers: Vec<LayerDocument>,
}

#[derive(Debug, Deserialize)]
pub struct TilesetRef {
    #[serde(default)]
    pub firstgid: u32,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LayerDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Vec<u32>,
}

/// Builds the runtime grid from a parsed document. Layer roles resolve here,
/// once, so collision queries never re-scan layer names. Missing or zero
/// tileset fields fall back to `firstgid=1` and 16x16 tiles.
pub(crate) fn build_tile_grid(document: &MapDocument) -> Result<TileGrid, ContentError> {
    let tileset = document.tilesets.first();
    let first_gid = non_zero_or(
        tileset.map(|entry| entry.firstgid).unwrap_or(0),
        FIRST_GID_DEFAULT,
    );
    let tile_width = non_zero_or(
        tileset.map(|entry| entry.tilewidth).unwrap_or(0),
        TILE_SIZE_DEFAULT,
    );
    let tile_height = non_zero_or(
        tileset.map(|entry| entry.tileheight).unwrap_or(0),
        TILE_SIZE_DEFAULT,
    );

    let layers = document
        .layers
        .iter()
        .filter(|layer| layer.kind == "tilelayer")
        .map(|layer| TileLayer {
            name: layer.name.clone(),
            role: classify_layer_role(&layer.name),
            width: layer.width,
            height: layer.height,
            data: layer.data.clone(),
        })
        .collect();

    let grid = TileGrid::new(
        document.width,
        document.height,
        tile_width,
        tile_height,
        first_gid,
        layers,
    )?;
    Ok(grid)
}

/// The map convention: a layer collides iff its name mentions "blocks" or
/// "special block" (case-insensitive). Everything else is decoration.
pub(crate) fn classify_layer_role(name: &str) -> LayerRole {
    let lowered = name.to_lowercase();
    if lowered.contains("blocks") || lowered.contains("special block") {
        LayerRole::Solid
    } else {
        LayerRole::Decoration
    }
}

fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 {
        fallback
    } else {
        value
    }
}
