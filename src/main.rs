//! Warp demo: presents a spinning textured quad and a flat triangle
//!
//! Usage: warp-demo [pipeline.ron] [texture.png]

use std::sync::{Arc, Mutex};

use macroquad::prelude::*;
use warp_raster::rasterizer::{HEIGHT, WIDTH};
use warp_raster::{
    load_config, Framebuffer, Mat4, Palette, PipelineConfig, Rasterizer, Texture as RasterTexture,
    Vec2 as RasterVec2, Vec3 as RasterVec3, VERSION,
};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Warp Rasterizer v{}", VERSION),
        window_width: WIDTH as i32 * 3,
        window_height: HEIGHT as i32 * 3,
        window_resizable: true,
        ..Default::default()
    }
}

fn load_texture_arg(path: Option<&String>, palette: &Palette) -> RasterTexture {
    if let Some(path) = path {
        match RasterTexture::from_file(path, palette) {
            Ok(tex) => return tex,
            Err(e) => log::warn!("{}, using checkerboard", e),
        }
    }
    RasterTexture::checkerboard(32, 32, palette.nearest(warp_raster::Color::WHITE), 54)
}

/// Unit square centered on the origin, two triangles
fn quad() -> (Vec<RasterVec3>, Vec<RasterVec2>) {
    let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
    let uvs = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let order = [0, 1, 2, 0, 2, 3];

    let vertices = order.iter().map(|&i| RasterVec3::new(corners[i].0, corners[i].1, 0.0)).collect();
    let uvs = order.iter().map(|&i| RasterVec2::new(uvs[i].0, uvs[i].1)).collect();
    (vertices, uvs)
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            log::warn!("Failed to load {}: {}, using defaults", path, e);
            PipelineConfig::default()
        }),
        None => PipelineConfig::default(),
    };

    let palette = Palette::default();
    let texture = Arc::new(load_texture_arg(args.get(1), &palette));
    let fb = Arc::new(Mutex::new(Framebuffer::with_palette(WIDTH, HEIGHT, palette)));

    let raster = match Rasterizer::new(fb, config) {
        Ok(raster) => raster,
        Err(e) => {
            log::error!("Failed to start rasterizer: {}", e);
            return;
        }
    };

    let (quad_vertices, quad_uvs) = quad();
    let triangle = vec![
        RasterVec3::new(20.0, 180.0, 0.0),
        RasterVec3::new(120.0, 180.0, 0.0),
        RasterVec3::new(70.0, 110.0, 0.0),
    ];

    let mut rgba = vec![0u8; WIDTH * HEIGHT * 4];
    let screen_texture = Texture2D::from_rgba8(WIDTH as u16, HEIGHT as u16, &rgba);
    screen_texture.set_filter(FilterMode::Nearest);

    log::info!("=== Warp Rasterizer ===");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let t = get_time() as f32;

        // The pipeline is idle after the previous frame's sync
        if let Err(e) = raster.with_target(|fb| fb.clear(0)) {
            log::error!("Clear failed: {}", e);
            break;
        }

        let spin = Mat4::translation(RasterVec3::new(WIDTH as f32 * 0.6, HEIGHT as f32 * 0.5, 0.0))
            * Mat4::rotation_z(t)
            * Mat4::scale(RasterVec3::new(120.0, 120.0, 1.0));

        let submitted = raster
            .submit_textured(spin, quad_vertices.clone(), quad_uvs.clone(), Arc::clone(&texture))
            .and_then(|_| raster.submit_flat(Mat4::IDENTITY, triangle.clone(), vec![30]));
        if let Err(e) = submitted {
            log::error!("Submit failed: {}", e);
            break;
        }

        // Present: wait for the frame, then expand through the palette
        if let Err(e) = raster.with_target(|fb| fb.write_rgba(&mut rgba)) {
            log::error!("Present failed: {}", e);
            break;
        }
        screen_texture.update_from_bytes(WIDTH as u32, HEIGHT as u32, &rgba);

        clear_background(BLACK);
        draw_texture_ex(
            &screen_texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }

    raster.destroy();
}
