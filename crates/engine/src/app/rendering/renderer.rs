use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{Camera, Facing, GameWorld, PlayerVisual, TileGrid, Vec2};
use crate::content::{RenderAssets, SpriteImage, TilesetAtlas};

use super::transform::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const PLAYER_UNDERLAY_COLOR: [u8; 4] = [12, 12, 14, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileRectInclusive {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    assets: RenderAssets,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets: RenderAssets) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            assets,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &GameWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(grid) = world.tile_grid() {
            draw_tile_layers(
                frame,
                viewport,
                grid,
                world.camera(),
                &self.assets.tileset,
            );
        }

        if let Some(visual) = world.player_visual() {
            let sprite = match visual.facing {
                Facing::Left => &self.assets.player_left,
                Facing::Right => &self.assets.player_right,
            };
            draw_player(frame, viewport, world.camera(), visual, sprite);
        }

        self.pixels.render()
    }
}

fn draw_tile_layers(
    frame: &mut [u8],
    viewport: Viewport,
    grid: &TileGrid,
    camera: &Camera,
    atlas: &TilesetAtlas,
) {
    let Some(visible) = visible_tile_rect(grid, camera, viewport) else {
        return;
    };
    if atlas.columns == 0 {
        return;
    }
    let tile_w = grid.tile_width();
    let tile_h = grid.tile_height();

    for layer in grid.layers() {
        for row in visible.y_min..=visible.y_max {
            for col in visible.x_min..=visible.x_max {
                if col >= layer.width || row >= layer.height {
                    continue;
                }
                let index = col as usize + row as usize * layer.width as usize;
                let raw = layer.data.get(index).copied().unwrap_or(0);
                if raw == 0 {
                    continue;
                }
                // Indices below the tileset's first global id have no source
                // rectangle and are skipped, mirroring the map format.
                let Some(local) = raw.checked_sub(grid.first_gid()) else {
                    continue;
                };
                let src_x = (local % atlas.columns) * tile_w;
                let src_y = (local / atlas.columns) * tile_h;

                let world_x = (col * tile_w) as f32;
                let world_y = (row * tile_h) as f32;
                let (dst_x0, dst_y0) = world_to_screen_px(
                    camera,
                    Vec2 {
                        x: world_x,
                        y: world_y,
                    },
                );
                // Sizing each tile from its own screen-space corners keeps
                // adjacent tiles seam-free at fractional scales.
                let (dst_x1, dst_y1) = world_to_screen_px(
                    camera,
                    Vec2 {
                        x: world_x + tile_w as f32,
                        y: world_y + tile_h as f32,
                    },
                );
                copy_region(
                    frame,
                    viewport,
                    &atlas.image,
                    src_x,
                    src_y,
                    tile_w,
                    tile_h,
                    dst_x0,
                    dst_y0,
                    dst_x1 - dst_x0,
                    dst_y1 - dst_y0,
                );
            }
        }
    }
}

fn draw_player(
    frame: &mut [u8],
    viewport: Viewport,
    camera: &Camera,
    visual: &PlayerVisual,
    sprite: &SpriteImage,
) {
    let (x0, y0) = world_to_screen_px(camera, visual.position);
    let (x1, y1) = world_to_screen_px(
        camera,
        Vec2 {
            x: visual.position.x + visual.size.x,
            y: visual.position.y + visual.size.y,
        },
    );
    let width = x1 - x0;
    let height = y1 - y0;

    fill_rect(frame, viewport, x0, y0, width, height, PLAYER_UNDERLAY_COLOR);
    copy_region(
        frame,
        viewport,
        sprite,
        0,
        0,
        sprite.width,
        sprite.height,
        x0,
        y0,
        width,
        height,
    );
}

fn visible_tile_rect(
    grid: &TileGrid,
    camera: &Camera,
    viewport: Viewport,
) -> Option<TileRectInclusive> {
    if grid.width_in_tiles() == 0 || grid.height_in_tiles() == 0 {
        return None;
    }
    let scale = camera.effective_scale();
    let tile_w = grid.tile_width() as f32;
    let tile_h = grid.tile_height() as f32;
    let view_w_world = viewport.width as f32 / scale;
    let view_h_world = viewport.height as f32 / scale;

    let raw_x_min = (camera.offset.x / tile_w).floor() as i32;
    let raw_x_max = ((camera.offset.x + view_w_world) / tile_w).floor() as i32;
    let raw_y_min = (camera.offset.y / tile_h).floor() as i32;
    let raw_y_max = ((camera.offset.y + view_h_world) / tile_h).floor() as i32;

    let x_limit = grid.width_in_tiles() as i32 - 1;
    let y_limit = grid.height_in_tiles() as i32 - 1;

    let x_min = raw_x_min.max(0);
    let x_max = raw_x_max.min(x_limit);
    let y_min = raw_y_min.max(0);
    let y_max = raw_y_max.min(y_limit);

    if x_min > x_max || y_min > y_max {
        return None;
    }

    Some(TileRectInclusive {
        x_min: x_min as u32,
        x_max: x_max as u32,
        y_min: y_min as u32,
        y_max: y_max as u32,
    })
}

/// Nearest-neighbor stretch of a source sub-rectangle onto a destination
/// rectangle. Fully transparent source pixels are skipped; destination
/// writes are clipped to the frame.
#[allow(clippy::too_many_arguments)]
fn copy_region(
    frame: &mut [u8],
    viewport: Viewport,
    image: &SpriteImage,
    src_x: u32,
    src_y: u32,
    src_w: u32,
    src_h: u32,
    dst_x: i32,
    dst_y: i32,
    dst_w: i32,
    dst_h: i32,
) {
    if src_w == 0 || src_h == 0 || dst_w <= 0 || dst_h <= 0 {
        return;
    }
    if src_x + src_w > image.width || src_y + src_h > image.height {
        return;
    }
    let expected_rgba_len = image.width as usize * image.height as usize * 4;
    if image.rgba.len() < expected_rgba_len {
        return;
    }

    let draw_left = dst_x.max(0);
    let draw_top = dst_y.max(0);
    let draw_right = (dst_x + dst_w).min(viewport.width as i32);
    let draw_bottom = (dst_y + dst_h).min(viewport.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = viewport.width as usize;
    let image_width = image.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = (out_y - dst_y) as u64;
        let sy = src_y as u64 + (dy * src_h as u64) / dst_h as u64;
        let sy = (sy as u32).min(src_y + src_h - 1) as usize;
        let src_row_offset = sy * image_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = (out_x - dst_x) as u64;
            let sx = src_x as u64 + (dx * src_w as u64) / dst_w as u64;
            let sx = (sx as u32).min(src_x + src_w - 1) as usize;
            let src_offset = src_row_offset + sx * 4;
            let alpha = image.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset] = image.rgba[src_offset];
            frame[dst_offset + 1] = image.rgba[src_offset + 1];
            frame[dst_offset + 2] = image.rgba[src_offset + 2];
            frame[dst_offset + 3] = alpha;
        }
    }
}

fn fill_rect(
    frame: &mut [u8],
    viewport: Viewport,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: [u8; 4],
) {
    for out_y in y..y + height.max(0) {
        for out_x in x..x + width.max(0) {
            if out_x < 0 || out_y < 0 || out_x >= viewport.width as i32 || out_y >= viewport.height as i32
            {
                continue;
            }
            write_pixel_rgba_clipped(frame, viewport.width as usize, out_x, out_y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{LayerRole, TileLayer};

    fn make_grid(width: u32, height: u32) -> TileGrid {
        TileGrid::new(
            width,
            height,
            16,
            16,
            1,
            vec![TileLayer {
                name: "blocks".to_string(),
                role: LayerRole::Solid,
                width,
                height,
                data: vec![1; width as usize * height as usize],
            }],
        )
        .expect("grid")
    }

    fn checker_image(width: u32, height: u32) -> SpriteImage {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let value = if (x + y) % 2 == 0 { 255 } else { 0 };
                rgba.extend_from_slice(&[value, value, value, 255]);
            }
        }
        SpriteImage {
            width,
            height,
            rgba,
        }
    }

    fn pixel_at(frame: &[u8], frame_width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * frame_width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn write_pixel_ignores_out_of_bounds_coordinates() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        write_pixel_rgba_clipped(&mut frame, 4, -1, 0, [255; 4]);
        write_pixel_rgba_clipped(&mut frame, 4, 0, -1, [255; 4]);
        write_pixel_rgba_clipped(&mut frame, 4, 4, 0, [255; 4]);
        write_pixel_rgba_clipped(&mut frame, 4, 0, 17, [255; 4]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn write_pixel_sets_exactly_one_pixel() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        write_pixel_rgba_clipped(&mut frame, 4, 2, 1, [9, 8, 7, 255]);
        assert_eq!(pixel_at(&frame, 4, 2, 1), [9, 8, 7, 255]);
        assert_eq!(frame.iter().filter(|byte| **byte != 0).count(), 4);
    }

    #[test]
    fn copy_region_one_to_one_copies_source_pixels() {
        let viewport = Viewport {
            width: 4,
            height: 4,
        };
        let mut frame = vec![0u8; 4 * 4 * 4];
        let image = checker_image(2, 2);

        copy_region(&mut frame, viewport, &image, 0, 0, 2, 2, 0, 0, 2, 2);

        assert_eq!(pixel_at(&frame, 4, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel_at(&frame, 4, 1, 0), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 0, 1), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn copy_region_doubles_pixels_with_nearest_sampling() {
        let viewport = Viewport {
            width: 4,
            height: 4,
        };
        let mut frame = vec![0u8; 4 * 4 * 4];
        let image = checker_image(2, 2);

        copy_region(&mut frame, viewport, &image, 0, 0, 2, 2, 0, 0, 4, 4);

        // Each source pixel becomes a 2x2 block.
        assert_eq!(pixel_at(&frame, 4, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel_at(&frame, 4, 1, 1), [255, 255, 255, 255]);
        assert_eq!(pixel_at(&frame, 4, 2, 0), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 3, 1), [0, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn copy_region_skips_fully_transparent_source_pixels() {
        let viewport = Viewport {
            width: 2,
            height: 1,
        };
        let mut frame = vec![7u8; 2 * 4];
        let image = SpriteImage {
            width: 2,
            height: 1,
            rgba: vec![50, 60, 70, 255, 1, 2, 3, 0],
        };

        copy_region(&mut frame, viewport, &image, 0, 0, 2, 1, 0, 0, 2, 1);

        assert_eq!(pixel_at(&frame, 2, 0, 0), [50, 60, 70, 255]);
        assert_eq!(pixel_at(&frame, 2, 1, 0), [7, 7, 7, 7]);
    }

    #[test]
    fn copy_region_clips_destination_to_frame() {
        let viewport = Viewport {
            width: 2,
            height: 2,
        };
        let mut frame = vec![0u8; 2 * 2 * 4];
        let image = checker_image(4, 4);

        copy_region(&mut frame, viewport, &image, 0, 0, 4, 4, -2, -2, 4, 4);
        copy_region(&mut frame, viewport, &image, 0, 0, 4, 4, 1, 1, 4, 4);
        // No panic and the last write landed inside the frame.
        assert_eq!(pixel_at(&frame, 2, 1, 1)[3], 255);
    }

    #[test]
    fn copy_region_rejects_source_rect_outside_image() {
        let viewport = Viewport {
            width: 4,
            height: 4,
        };
        let mut frame = vec![0u8; 4 * 4 * 4];
        let image = checker_image(2, 2);

        copy_region(&mut frame, viewport, &image, 1, 1, 2, 2, 0, 0, 2, 2);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn fill_rect_is_clipped_and_corner_anchored() {
        let viewport = Viewport {
            width: 4,
            height: 4,
        };
        let mut frame = vec![0u8; 4 * 4 * 4];
        fill_rect(&mut frame, viewport, 2, 2, 4, 4, [255, 0, 0, 255]);

        assert_eq!(pixel_at(&frame, 4, 2, 2), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 3, 3), [255, 0, 0, 255]);
        assert_eq!(pixel_at(&frame, 4, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn visible_tile_rect_covers_view_and_clamps_to_grid() {
        let grid = make_grid(10, 10);
        let camera = Camera {
            offset: Vec2 { x: 0.0, y: 0.0 },
            scale: 2.0,
        };
        let viewport = Viewport {
            width: 64,
            height: 64,
        };
        // 32x32 world px visible => tiles 0..=2 on both axes.
        let rect = visible_tile_rect(&grid, &camera, viewport).expect("rect");
        assert_eq!(
            rect,
            TileRectInclusive {
                x_min: 0,
                x_max: 2,
                y_min: 0,
                y_max: 2
            }
        );
    }

    #[test]
    fn visible_tile_rect_offset_camera_shifts_window() {
        let grid = make_grid(10, 10);
        let camera = Camera {
            offset: Vec2 { x: 40.0, y: 24.0 },
            scale: 2.0,
        };
        let viewport = Viewport {
            width: 64,
            height: 64,
        };
        let rect = visible_tile_rect(&grid, &camera, viewport).expect("rect");
        assert_eq!(rect.x_min, 2);
        assert_eq!(rect.x_max, 4);
        assert_eq!(rect.y_min, 1);
        assert_eq!(rect.y_max, 3);
    }

    #[test]
    fn visible_tile_rect_none_when_camera_past_grid() {
        let grid = make_grid(2, 2);
        let camera = Camera {
            offset: Vec2 { x: 512.0, y: 0.0 },
            scale: 2.0,
        };
        let viewport = Viewport {
            width: 64,
            height: 64,
        };
        assert!(visible_tile_rect(&grid, &camera, viewport).is_none());
    }
}
