use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;

use crate::app::{TileGrid, TileGridError};

use super::map::{build_tile_grid, MapDocument};

const PLAYER_LEFT_FRAME: &str = "animation/running_1.png";
const PLAYER_RIGHT_FRAME: &str = "animation/running_2.png";

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilesetAtlas {
    pub image: SpriteImage,
    pub columns: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderAssets {
    pub tileset: TilesetAtlas,
    pub player_left: SpriteImage,
    pub player_right: SpriteImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameAssets {
    pub tile_grid: TileGrid,
    pub render: RenderAssets,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read map document {path}: {source}")]
    ReadMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map document {path}: {source}")]
    ParseMap {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Grid(#[from] TileGridError),
    #[error("map document {path} names no tileset image")]
    MissingTilesetImage { path: PathBuf },
    #[error("failed to open image {path}: {source}")]
    OpenImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    DecodeImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("tileset image {path} is narrower than one {tile_width}px tile")]
    ZeroTilesetColumns { path: PathBuf, tile_width: u32 },
}

/// One-shot acquisition of everything the session needs before the loop may
/// enter its running phase: map document, tileset atlas, and the two player
/// animation frames. Any failure here is fatal to the session.
pub fn load_game_assets(assets_dir: &Path, map_path: &Path) -> Result<GameAssets, ContentError> {
    let map_file = assets_dir.join(map_path);
    let raw = fs::read_to_string(&map_file).map_err(|source| ContentError::ReadMap {
        path: map_file.clone(),
        source,
    })?;
    let document: MapDocument =
        serde_json::from_str(&raw).map_err(|source| ContentError::ParseMap {
            path: map_file.clone(),
            source,
        })?;
    let tile_grid = build_tile_grid(&document)?;

    let image_name = document
        .tilesets
        .first()
        .and_then(|tileset| tileset.image.as_deref())
        .ok_or_else(|| ContentError::MissingTilesetImage {
            path: map_file.clone(),
        })?;
    // The document carries an editor-relative path; only the file name is
    // honored, resolved next to the map document itself.
    let map_dir = map_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| assets_dir.to_path_buf());
    let tileset_path = map_dir.join(file_name_component(image_name));
    let tileset_image = load_sprite_rgba(&tileset_path)?;
    let columns = tileset_image.width / tile_grid.tile_width();
    if columns == 0 {
        return Err(ContentError::ZeroTilesetColumns {
            path: tileset_path,
            tile_width: tile_grid.tile_width(),
        });
    }

    let player_left = load_sprite_rgba(&assets_dir.join(PLAYER_LEFT_FRAME))?;
    let player_right = load_sprite_rgba(&assets_dir.join(PLAYER_RIGHT_FRAME))?;

    Ok(GameAssets {
        tile_grid,
        render: RenderAssets {
            tileset: TilesetAtlas {
                image: tileset_image,
                columns,
            },
            player_left,
            player_right,
        },
    })
}

fn load_sprite_rgba(path: &Path) -> Result<SpriteImage, ContentError> {
    let reader = ImageReader::open(path).map_err(|source| ContentError::OpenImage {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| ContentError::DecodeImage {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(SpriteImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn file_name_component(raw: &str) -> &str {
    raw.rsplit('/').next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 140, 60, 255]));
        image.save(path).expect("write png");
    }

    fn write_player_frames(assets_dir: &Path) {
        fs::create_dir_all(assets_dir.join("animation")).expect("animation dir");
        write_png(&assets_dir.join(PLAYER_LEFT_FRAME), 16, 16);
        write_png(&assets_dir.join(PLAYER_RIGHT_FRAME), 16, 16);
    }

    fn write_map(assets_dir: &Path, name: &str, contents: &str) -> PathBuf {
        fs::create_dir_all(assets_dir.join("maps")).expect("maps dir");
        let relative = PathBuf::from("maps").join(name);
        fs::write(assets_dir.join(&relative), contents).expect("write map");
        relative
    }

    const MAP_JSON: &str = r#"{
        "width": 4, "height": 2,
        "tilesets": [{"firstgid": 1, "tilewidth": 16, "tileheight": 16,
                      "image": "../art/tiles.png"}],
        "layers": [
            {"name": "Blocks", "type": "tilelayer", "width": 4, "height": 2,
             "data": [0, 0, 0, 0, 1, 1, 1, 1]}
        ]
    }"#;

    #[test]
    fn missing_map_document_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_game_assets(dir.path(), Path::new("maps/absent.tmj")).expect_err("err");
        assert!(matches!(err, ContentError::ReadMap { .. }));
    }

    #[test]
    fn malformed_map_document_is_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "broken.tmj", "{ not json");
        let err = load_game_assets(dir.path(), &map).expect_err("err");
        assert!(matches!(err, ContentError::ParseMap { .. }));
    }

    #[test]
    fn document_without_tileset_image_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "bare.tmj", r#"{"width": 2, "height": 2}"#);
        let err = load_game_assets(dir.path(), &map).expect_err("err");
        assert!(matches!(err, ContentError::MissingTilesetImage { .. }));
    }

    #[test]
    fn tileset_image_resolves_by_basename_next_to_map() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "world.tmj", MAP_JSON);
        // The document says ../art/tiles.png; only tiles.png beside the map counts.
        write_png(&dir.path().join("maps/tiles.png"), 32, 16);
        write_player_frames(dir.path());

        let assets = load_game_assets(dir.path(), &map).expect("assets");
        assert_eq!(assets.render.tileset.columns, 2);
        assert_eq!(assets.tile_grid.width_in_tiles(), 4);
        assert!(assets.tile_grid.is_solid(0, 1));
        assert!(!assets.tile_grid.is_solid(0, 0));
    }

    #[test]
    fn missing_tileset_image_file_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "world.tmj", MAP_JSON);
        write_player_frames(dir.path());
        let err = load_game_assets(dir.path(), &map).expect_err("err");
        assert!(matches!(err, ContentError::OpenImage { .. }));
    }

    #[test]
    fn missing_player_frames_are_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "world.tmj", MAP_JSON);
        write_png(&dir.path().join("maps/tiles.png"), 32, 16);
        let err = load_game_assets(dir.path(), &map).expect_err("err");
        assert!(matches!(err, ContentError::OpenImage { .. }));
    }

    #[test]
    fn tileset_narrower_than_one_tile_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let map = write_map(dir.path(), "world.tmj", MAP_JSON);
        write_png(&dir.path().join("maps/tiles.png"), 8, 16);
        write_player_frames(dir.path());
        let err = load_game_assets(dir.path(), &map).expect_err("err");
        assert!(matches!(err, ContentError::ZeroTilesetColumns { .. }));
    }

    #[test]
    fn decoded_sprite_is_rgba8() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("sprite.png");
        write_png(&path, 3, 2);
        let sprite = load_sprite_rgba(&path).expect("sprite");
        assert_eq!(sprite.width, 3);
        assert_eq!(sprite.height, 2);
        assert_eq!(sprite.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn file_name_component_strips_directories() {
        assert_eq!(file_name_component("../art/tiles.png"), "tiles.png");
        assert_eq!(file_name_component("tiles.png"), "tiles.png");
        assert_eq!(file_name_component("a/b/c.png"), "c.png");
    }
}
