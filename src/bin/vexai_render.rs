//! vexai_render - render a recorded data response to PNG files
//!
//! Produces the annotated camera view, a full-resolution snapshot export and
//! the top-down field map for one polling response.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use vexai_dashboard::{CancellationToken, Dashboard, DashboardConfig, DataResponse};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Data response JSON (image + detections) to render.
    #[arg(long)]
    response: PathBuf,
    /// Dashboard config file (JSON, or TOML by extension). Falls back to VEXAI_CONFIG.
    #[arg(long, env = "VEXAI_CONFIG")]
    config: Option<PathBuf>,
    /// Window height the camera panel is laid out for.
    #[arg(long, default_value_t = 720)]
    window_height: u32,
    /// Field map canvas side, in pixels.
    #[arg(long, default_value_t = 600)]
    field_size: u32,
    /// Field map scale in pixels per meter (defaults to fitting the field).
    #[arg(long)]
    scale: Option<f64>,
    /// Output directory for rendered images (overrides the export dir).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty). auto turns spinners
    /// off when stdout is piped; pretty keeps them on.
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = ui::Ui::new(
        ui::UiMode::parse(&args.ui),
        std::io::stderr().is_terminal(),
        !stdout_is_tty,
    );

    if args.window_height == 0 || args.field_size == 0 {
        return Err(anyhow!("window height and field size must be >= 1"));
    }

    let mut config = {
        let _stage = ui.stage("Load config");
        DashboardConfig::load_from(args.config.as_deref())?
    };
    if let Some(out_dir) = &args.out_dir {
        config.export_dir = out_dir.clone();
    }
    let out_dir = config.export_dir.clone();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;
    let scale = match args.scale {
        Some(scale) if scale > 0.0 => scale,
        Some(_) => return Err(anyhow!("scale must be positive")),
        None => args.field_size as f64 / config.field.dimension,
    };

    let mut dashboard = {
        let _stage = ui.stage("Load assets");
        Dashboard::open(config)?
    };

    let response = {
        let _stage = ui.stage("Parse data response");
        let raw = std::fs::read_to_string(&args.response)
            .with_context(|| format!("read data response {}", args.response.display()))?;
        DataResponse::from_json(&raw)?
    };
    log::info!(
        "response has {} detections, image {}",
        response.detections().len(),
        if response.image.is_some() { "present" } else { "missing" }
    );
    dashboard.apply(response);

    {
        let mut stage = ui.stage("Render camera view");
        let view = dashboard.render_camera(args.window_height)?;
        let path = out_dir.join("camera_view.png");
        view.save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        stage.note(path.display().to_string());
    }

    {
        let mut stage = ui.stage("Export snapshot");
        match dashboard.save_snapshot(CancellationToken::new())? {
            Some(handle) => {
                let path = handle.wait()?;
                stage.note(path.display().to_string());
            }
            None => stage.note("skipped, no camera frame"),
        }
    }

    {
        let mut stage = ui.stage("Render field map");
        let field = dashboard.render_field(args.field_size, args.field_size, scale);
        let path = out_dir.join("field_map.png");
        field
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        stage.note(path.display().to_string());
    }

    Ok(())
}
