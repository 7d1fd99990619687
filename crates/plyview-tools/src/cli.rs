//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ViewerConfig;

/// Spin a PLY model under a fixed Lambert light.
#[derive(Parser, Debug)]
#[command(
    name = "plyview",
    about = "Minimal PLY model viewer",
    long_about = "Loads one PLY model (ASCII or binary) with optional normals and 8-bit colors,\n\
        stages it for the GPU and renders it under continuous rotation.\n\n\
        EXAMPLES:\n\
          plyview bunny.ply\n\
          plyview scan.ply --msaa 4 --frames 120",
    version
)]
pub struct CliArgs {
    /// PLY file to load.
    #[arg(default_value = "test.ply")]
    pub model: PathBuf,

    /// Multisample count for the framebuffer.
    #[arg(long, default_value = "16")]
    pub msaa: u32,

    /// Exit after rendering N frames.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Staging capacity per buffer, in elements.
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Disable vertical sync.
    #[arg(long)]
    pub no_vsync: bool,
}

impl From<CliArgs> for ViewerConfig {
    fn from(args: CliArgs) -> Self {
        let mut config = ViewerConfig::with_model(args.model).with_msaa(args.msaa);
        if let Some(capacity) = args.capacity {
            config = config.with_capacity(capacity);
        }
        if let Some(frames) = args.frames {
            config = config.with_max_frames(frames);
        }
        config.window.vsync = !args.no_vsync;
        config
    }
}
