use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn canvasctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_canvasctl"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run canvasctl")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn effects_lists_the_catalog() {
    let output = canvasctl(&["effects"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for name in ["grid", "engine", "waves", "plasma", "voronoi"] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
    assert!(text.contains("(interactive)"));
}

#[test]
fn shader_prints_fragment_and_vertex_sources() {
    let grid = canvasctl(&["shader", "grid"]);
    assert!(grid.status.success());
    assert!(stdout(&grid).contains("uniform vec3 u_color;"));

    let vertex = canvasctl(&["shader", "--vertex"]);
    assert!(vertex.status.success());
    assert!(stdout(&vertex).contains("a_position"));

    let unknown = canvasctl(&["shader", "sparkles"]);
    assert!(!unknown.status.success());
}

#[test]
fn check_accepts_the_bundled_site() {
    let output = canvasctl(&["check"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("ok: 9 canvas(es)"));
}

#[test]
fn check_reports_unknown_effects() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.toml");
    fs::write(
        &path,
        "version = 1\n\n[[canvas]]\nid = \"services-canvas\"\neffect = \"sparkles\"\n",
    )
    .unwrap();

    let output = canvasctl(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("error:"), "{text}");
    assert!(text.contains("sparkles"), "{text}");
}

#[test]
fn check_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "version = 1\n[[canvas]\nid = ").unwrap();

    let output = canvasctl(&["check", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.toml"), "{stderr}");
}

#[test]
fn simulate_reports_frames_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.toml");
    fs::write(
        &path,
        r##"
version = 1

[[canvas]]
id = "services-canvas"
effect = "grid"
color = "#00808F"
speed = 0.5

[[canvas]]
id = "engine-bay-canvas"
effect = "engine"
"##,
    )
    .unwrap();

    let output = canvasctl(&[
        "simulate",
        path.to_str().unwrap(),
        "--frames",
        "12",
        "--size",
        "200x100",
        "--json",
    ]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["frames"], 12);

    let canvases = report["canvases"].as_array().unwrap();
    assert_eq!(canvases.len(), 2);
    for canvas in canvases {
        assert_eq!(canvas["live"], true);
        assert_eq!(canvas["draw_calls"], 12);
        assert_eq!(canvas["stats"]["frames"], 12);
        assert_eq!(canvas["drawing_buffer"]["width"], 200);
        assert_eq!(canvas["drawing_buffer"]["height"], 100);
    }
    assert!(canvases[1]["uniforms"].get("u_pointer").is_some());
}

#[test]
fn simulate_applies_mid_run_resize() {
    let output = canvasctl(&[
        "simulate",
        "--frames",
        "20",
        "--size",
        "320x180",
        "--resize-at",
        "5",
        "--resize-to",
        "640x360",
        "--json",
    ]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    for canvas in report["canvases"].as_array().unwrap() {
        assert_eq!(canvas["drawing_buffer"]["width"], 640);
        assert_eq!(canvas["drawing_buffer"]["height"], 360);
        assert_eq!(canvas["stats"]["resizes"], 2);
    }
}
