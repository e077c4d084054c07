use std::path::PathBuf;

use clap::{Parser, Subcommand};
use renderer::CanvasSize;

#[derive(Parser, Debug)]
#[command(
    name = "canvasctl",
    author,
    version,
    about = "Shader canvas developer tool"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the built-in effects.
    Effects,
    /// Print the fragment source of an effect, or the shared vertex stage.
    Shader(ShaderArgs),
    /// Parse and validate a site config, then try mounting it headlessly.
    Check(CheckArgs),
    /// Mount a site config on the headless backend and drive frames through it.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
pub struct ShaderArgs {
    /// Effect name (see `canvasctl effects`).
    #[arg(value_name = "EFFECT", required_unless_present = "vertex")]
    pub effect: Option<String>,

    /// Print the full-screen quad vertex stage instead.
    #[arg(long)]
    pub vertex: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Site config TOML; the bundled site layout when omitted.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Site config TOML; the bundled site layout when omitted.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of frames to drive.
    #[arg(long, default_value_t = 120)]
    pub frames: usize,

    /// Nominal display refresh rate.
    #[arg(long, value_parser = parse_fps, default_value_t = 60.0)]
    pub fps: f64,

    /// Maximum random deviation of each frame interval, in milliseconds.
    #[arg(long, value_name = "MS", value_parser = parse_jitter, default_value_t = 0.0)]
    pub jitter_ms: f64,

    /// Seed for the frame timing jitter.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Laid-out size of every canvas (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, default_value = "1280x720")]
    pub size: CanvasSize,

    /// Frame index at which every canvas is resized to `--resize-to`.
    #[arg(long, value_name = "FRAME", requires = "resize_to")]
    pub resize_at: Option<usize>,

    /// New laid-out size applied at `--resize-at`.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, requires = "resize_at")]
    pub resize_to: Option<CanvasSize>,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<CanvasSize, String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1280x720".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in size '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in size '{trimmed}'"))?;

    if width == 0 || height == 0 {
        return Err("canvas dimensions must be greater than zero".to_string());
    }

    Ok(CanvasSize::new(width, height))
}

fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    if !(fps.is_finite() && fps > 0.0) {
        return Err("fps must be greater than zero".to_string());
    }
    Ok(fps)
}

fn parse_jitter(value: &str) -> Result<f64, String> {
    let jitter: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid jitter '{value}'"))?;
    if !(jitter.is_finite() && jitter >= 0.0) {
        return Err("jitter must be a non-negative number of milliseconds".to_string());
    }
    Ok(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_surface_size("640x480"), Ok(CanvasSize::new(640, 480)));
        assert_eq!(parse_surface_size(" 10 X 20 "), Ok(CanvasSize::new(10, 20)));
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("wide").is_err());
    }

    #[test]
    fn rejects_non_positive_fps() {
        assert!(parse_fps("0").is_err());
        assert!(parse_fps("-30").is_err());
        assert_eq!(parse_fps("30"), Ok(30.0));
    }

    #[test]
    fn resize_flags_come_in_pairs() {
        assert!(Cli::try_parse_from(["canvasctl", "simulate", "--resize-at", "5"]).is_err());
        let cli = Cli::try_parse_from([
            "canvasctl",
            "simulate",
            "--resize-at",
            "5",
            "--resize-to",
            "800x600",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.resize_at, Some(5));
                assert_eq!(args.resize_to, Some(CanvasSize::new(800, 600)));
                assert_eq!(args.size, CanvasSize::new(1280, 720));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn shader_needs_effect_or_vertex() {
        assert!(Cli::try_parse_from(["canvasctl", "shader"]).is_err());
        assert!(Cli::try_parse_from(["canvasctl", "shader", "--vertex"]).is_ok());
    }
}
