use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use plyview_tools::{CliArgs, HeadlessGpu, Viewer, ViewerConfig};

const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config: ViewerConfig = CliArgs::parse().into();
    info!(
        "{} {}x{} msaa={} vsync={}",
        config.window.title,
        config.window.width,
        config.window.height,
        config.window.msaa_samples,
        config.window.vsync
    );
    let frames = config.max_frames.unwrap_or(1);

    let mut viewer = Viewer::new(config, HeadlessGpu::new());
    let slot = viewer.load_configured();
    if let Some(err) = viewer.slots().get(slot).and_then(|s| s.error()) {
        error!("{}", err);
    }

    let summary = viewer.run(frames, FRAME_TIME);
    println!("Rendered {}", summary);

    match viewer.active_model() {
        Some(model) => {
            println!(
                "Model: {} vertices ({} floats, stride {}), {} indices{}",
                model.counts.vertices,
                model.vertex_len,
                model.layout.stride(),
                model.index_count,
                if model.truncated { ", truncated" } else { "" }
            );
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}
