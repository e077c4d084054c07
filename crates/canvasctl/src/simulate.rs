//! Headless page simulation.
//!
//! Mounts every configured canvas on in-memory hosts, drives the frame
//! scheduler with optionally jittered intervals and reports what each canvas
//! rendered.

use std::collections::BTreeMap;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::headless::{HeadlessCanvas, HeadlessDocument, ManualScheduler};
use renderer::{CanvasSize, CanvasTarget, FrameStats, Page, UniformValue};
use serde::Serialize;

use crate::cli::SimulateArgs;
use crate::run::{load_config, resolve_specs};

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub frames: usize,
    pub fps: f64,
    pub jitter_ms: f64,
    pub seed: u64,
    /// Scheduler time at the end of the run, in milliseconds.
    pub elapsed_ms: f64,
    pub canvases: Vec<CanvasReport>,
}

#[derive(Debug, Serialize)]
pub struct CanvasReport {
    pub id: String,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FrameStats>,
    pub draw_calls: u64,
    pub drawing_buffer: CanvasSize,
    pub uniforms: BTreeMap<String, UniformValue>,
}

pub fn run(args: &SimulateArgs) -> Result<()> {
    let report = simulate(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

pub fn simulate(args: &SimulateArgs) -> Result<SimulationReport> {
    let config = load_config(args.config.as_deref())?;
    let resolution = resolve_specs(&config);
    let specs = &resolution.specs;

    // Every configured element exists, including entries that failed to
    // resolve, so the report covers the whole page.
    let document = HeadlessDocument::new();
    let canvases: Vec<HeadlessCanvas> = config
        .canvases
        .iter()
        .map(|entry| HeadlessCanvas::new(entry.id.clone(), args.size.width, args.size.height))
        .collect();
    for canvas in &canvases {
        document.insert(canvas.clone());
    }
    // Elements fallbacks may point at, so they show up in the run.
    for spec in specs {
        if let Some(fallback) = &spec.fallback {
            document.add_element(fallback.selector_for(&spec.id));
        }
    }

    let scheduler = ManualScheduler::new();
    let mut page = Page::mount(&document, &scheduler, specs);

    let interval = 1000.0 / args.fps;
    let mut rng = StdRng::seed_from_u64(args.seed);
    for frame in 0..args.frames {
        if args.resize_at == Some(frame) {
            if let Some(size) = args.resize_to {
                tracing::info!(frame, width = size.width, height = size.height, "resizing canvases");
                for canvas in &canvases {
                    canvas.set_display_size(size.width, size.height);
                }
            }
        }
        let jitter = if args.jitter_ms > 0.0 {
            rng.gen_range(-args.jitter_ms..=args.jitter_ms)
        } else {
            0.0
        };
        scheduler.advance((interval + jitter).max(0.0));
    }

    let failures: BTreeMap<&str, String> = resolution
        .errors
        .iter()
        .map(|err| (err.canvas(), err.to_string()))
        .chain(
            page.failures()
                .iter()
                .map(|err| (err.canvas(), err.to_string())),
        )
        .collect();
    let reports = canvases
        .iter()
        .map(|canvas| {
            let id = canvas.id().to_string();
            let stats = page.canvas(&id).map(|handle| handle.stats());
            CanvasReport {
                live: stats.is_some(),
                error: failures.get(id.as_str()).cloned(),
                stats,
                draw_calls: canvas.draw_calls(),
                drawing_buffer: canvas.drawing_buffer_size(),
                uniforms: canvas.uniforms(),
                id,
            }
        })
        .collect();

    let report = SimulationReport {
        frames: args.frames,
        fps: args.fps,
        jitter_ms: args.jitter_ms,
        seed: args.seed,
        elapsed_ms: scheduler.now_ms(),
        canvases: reports,
    };
    page.dispose_all();
    Ok(report)
}

fn print_text(report: &SimulationReport) {
    println!(
        "simulated {} frame(s) at {:.1} fps (jitter ±{:.1} ms, seed {}) over {:.1} ms",
        report.frames, report.fps, report.jitter_ms, report.seed, report.elapsed_ms
    );
    for canvas in &report.canvases {
        match (&canvas.stats, &canvas.error) {
            (Some(stats), _) => println!(
                "  {:<28} live    frames={:<5} draws={:<5} elapsed={:.3}s phase={:.3} buffer={} resizes={}",
                canvas.id,
                stats.frames,
                canvas.draw_calls,
                stats.elapsed,
                stats.phase,
                canvas.drawing_buffer,
                stats.resizes
            ),
            (None, Some(error)) => println!("  {:<28} failed  {error}", canvas.id),
            (None, None) => println!("  {:<28} idle", canvas.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> SimulateArgs {
        SimulateArgs {
            config: None,
            frames: 30,
            fps: 60.0,
            jitter_ms: 0.0,
            seed: 7,
            size: CanvasSize::new(320, 180),
            resize_at: None,
            resize_to: None,
            json: false,
        }
    }

    #[test]
    fn bundled_site_renders_every_canvas() {
        let report = simulate(&args()).unwrap();
        assert_eq!(report.canvases.len(), 9);
        for canvas in &report.canvases {
            assert!(canvas.live, "{} failed: {:?}", canvas.id, canvas.error);
            assert_eq!(canvas.draw_calls, 30);
            assert_eq!(canvas.drawing_buffer, CanvasSize::new(320, 180));
        }
        assert!((report.elapsed_ms - 500.0).abs() < 1e-6);
    }

    #[test]
    fn jitter_is_reproducible_per_seed() {
        let mut jittery = args();
        jittery.jitter_ms = 4.0;
        let first = simulate(&jittery).unwrap();
        let second = simulate(&jittery).unwrap();
        assert_eq!(first.elapsed_ms, second.elapsed_ms);

        jittery.seed = 8;
        let third = simulate(&jittery).unwrap();
        assert_ne!(first.elapsed_ms, third.elapsed_ms);
    }

    #[test]
    fn resize_mid_run_updates_buffers() {
        let mut resized = args();
        resized.resize_at = Some(10);
        resized.resize_to = Some(CanvasSize::new(640, 360));
        let report = simulate(&resized).unwrap();
        let canvas = &report.canvases[0];
        assert_eq!(canvas.drawing_buffer, CanvasSize::new(640, 360));
        assert_eq!(canvas.stats.unwrap().resizes, 2);
        assert_eq!(
            canvas.uniforms.get("u_resolution"),
            Some(&UniformValue::Vec2([640.0, 360.0]))
        );
    }

    #[test]
    fn unknown_effect_leaves_other_canvases_running() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(
            &path,
            "version = 1\n\n[[canvas]]\nid = \"good\"\neffect = \"grid\"\n\n\
             [[canvas]]\nid = \"bad\"\neffect = \"sparkles\"\n",
        )
        .unwrap();
        let mut mixed = args();
        mixed.config = Some(path);

        let report = simulate(&mixed).unwrap();
        assert_eq!(report.canvases.len(), 2);
        let good = &report.canvases[0];
        assert!(good.live);
        assert_eq!(good.draw_calls, 30);
        let bad = &report.canvases[1];
        assert!(!bad.live);
        assert_eq!(bad.draw_calls, 0);
        assert!(bad.error.as_deref().unwrap().contains("sparkles"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let mut missing = args();
        missing.config = Some(PathBuf::from("/definitely/not/here.toml"));
        assert!(simulate(&missing).is_err());
    }
}
