use image::{Rgba, RgbaImage};
use std::path::Path;

use vexai_dashboard::{
    AssetRegistry, CancellationToken, Dashboard, DashboardConfig, DataResponse, FieldLayer,
    TextureId,
};

const FIELD_GREEN: Rgba<u8> = Rgba([20, 120, 40, 255]);
const RED: Rgba<u8> = Rgba([250, 10, 10, 255]);
const BLUE: Rgba<u8> = Rgba([10, 10, 250, 255]);

fn write_assets(dir: &Path) {
    RgbaImage::from_pixel(16, 16, FIELD_GREEN)
        .save(dir.join(TextureId::Field.file_name()))
        .expect("field texture");
    RgbaImage::from_pixel(8, 8, RED)
        .save(dir.join(TextureId::BallRed.file_name()))
        .expect("red texture");
    RgbaImage::from_pixel(8, 8, BLUE)
        .save(dir.join(TextureId::BallBlue.file_name()))
        .expect("blue texture");
}

fn response() -> DataResponse {
    DataResponse::from_json(
        r#"{
            "detections": [
                {
                    "class": 1,
                    "depth": 1.2,
                    "screenLocation": {"x": 0, "y": 0, "width": 10, "height": 10},
                    "mapLocation": {"x": [-1.0], "y": [0.5]}
                },
                {
                    "class": 0,
                    "depth": null,
                    "screenLocation": {"x": 0, "y": 0, "width": 10, "height": 10},
                    "mapLocation": {"x": [0.0], "y": [0.0]}
                }
            ]
        }"#,
    )
    .expect("parse response")
}

fn dashboard(asset_dir: &Path) -> Dashboard {
    let config = DashboardConfig {
        asset_dir: asset_dir.to_path_buf(),
        ..DashboardConfig::default()
    };
    Dashboard::open(config).expect("open dashboard")
}

#[test]
fn sprite_position_follows_map_scale() {
    let response = response();
    let sprites = FieldLayer::sprites(response.detections(), 1.5);
    assert_eq!(sprites.len(), 1, "unknown depth must be skipped");
    let sprite = sprites[0];
    assert!((sprite.x - -3.0).abs() < 1e-12);
    assert!((sprite.y - -1.5).abs() < 1e-12);
}

#[test]
fn field_map_draws_known_elements_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_assets(dir.path());
    let mut dashboard = dashboard(dir.path());
    dashboard.apply(response());

    // 50 px/m: red ball lands at (-1.0 * 50 * 2, -0.5 * 50 * 2) = (-100, -50).
    let image = dashboard.render_field(400, 400, 50.0);
    assert_eq!(image.dimensions(), (400, 400));
    assert_eq!(image.get_pixel(100, 150), &RED);
    // Blue ball had unknown depth; the centre shows the field.
    assert_eq!(image.get_pixel(200, 200), &FIELD_GREEN);
}

#[test]
fn camera_without_frame_renders_placeholder_and_skips_export() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_assets(dir.path());
    let mut dashboard = dashboard(dir.path());
    dashboard.apply(response());

    let placeholder = dashboard.render_camera(300).expect("placeholder");
    assert_eq!(placeholder.height(), 300);
    let background = dashboard.config().theme().component_background.to_rgba();
    assert_eq!(placeholder.get_pixel(5, 5), &background);

    let handle = dashboard
        .save_snapshot(CancellationToken::new())
        .expect("no-op");
    assert!(handle.is_none());
}

#[test]
fn registry_without_element_textures_fails_to_open() {
    let dir = tempfile::tempdir().expect("temp dir");
    RgbaImage::from_pixel(4, 4, FIELD_GREEN)
        .save(dir.path().join(TextureId::Field.file_name()))
        .expect("field texture");
    assert!(AssetRegistry::load(dir.path()).is_err());
}
