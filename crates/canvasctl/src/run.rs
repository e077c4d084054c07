use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use renderer::headless::{HeadlessCanvas, HeadlessDocument, ManualScheduler};
use renderer::{CanvasSpec, Page, VERTEX_SHADER};
use effects::Resolution;
use siteconfig::SiteConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{CheckArgs, ShaderArgs};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads and validates `path`, or the bundled layout when `None`.
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read site config {}", path.display()))?;
            SiteConfig::from_toml_str(&text)
                .with_context(|| format!("failed to load site config {}", path.display()))
        }
        None => SiteConfig::bundled().context("bundled site config is invalid"),
    }
}

/// Resolves every canvas entry; entries that fail are skipped and reported in
/// the returned [`Resolution`].
pub fn resolve_specs(config: &SiteConfig) -> Resolution {
    effects::resolve(config)
}

pub fn list_effects() -> Result<()> {
    for effect in effects::catalog() {
        let marker = if effect.interactive { " (interactive)" } else { "" };
        println!("{:<10} {}{marker}", effect.name, effect.description);
    }
    Ok(())
}

pub fn print_shader(args: &ShaderArgs) -> Result<()> {
    if args.vertex {
        print!("{VERTEX_SHADER}");
        return Ok(());
    }
    let name = args.effect.as_deref().unwrap_or_default();
    let Some(effect) = effects::lookup(name) else {
        bail!("unknown effect '{name}'; run `canvasctl effects` for the list");
    };
    print!("{}", effect.fragment);
    Ok(())
}

pub fn check(args: &CheckArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut issues = effects::check(&config);

    // Entries that failed to resolve are already in `issues`; mount the rest.
    let resolution = resolve_specs(&config);
    let document = HeadlessDocument::new();
    for spec in &resolution.specs {
        document.insert(HeadlessCanvas::new(spec.id.clone(), 64, 64));
    }
    let scheduler = ManualScheduler::new();
    let page = Page::mount(&document, &scheduler, &resolution.specs);
    issues.extend(page.failures().iter().map(ToString::to_string));

    if issues.is_empty() {
        println!(
            "ok: {} canvas(es), {} interactive",
            config.canvases.len(),
            count_interactive(&resolution.specs)
        );
        return Ok(());
    }

    for issue in &issues {
        println!("error: {issue}");
    }
    bail!("{} issue(s) found", issues.len());
}

fn count_interactive(specs: &[CanvasSpec]) -> usize {
    specs.iter().filter(|spec| spec.config.interactive).count()
}
