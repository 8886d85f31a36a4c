mod assets;
mod map;

pub use assets::{
    load_game_assets, ContentError, GameAssets, RenderAssets, SpriteImage, TilesetAtlas,
};
pub use map::{LayerDocument, MapDocument, TilesetRef};
