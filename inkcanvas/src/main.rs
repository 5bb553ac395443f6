#![warn(clippy::pedantic)]

pub mod settings;

use anyhow::Result as AnyResult;
use inkcanvas_core::stroke::StrokeSample;
use inkcanvas_core::InfiniteCanvas;

const WRITE_CONFIG: &str = "--write-config";

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    // Args are a list of chunk files to load, one stroke per file.
    // Paths are OSStrings, let the system handle character encoding restrictions.
    let mut write_config = false;
    let mut paths = Vec::<std::path::PathBuf>::new();
    for arg in std::env::args_os().skip(1) {
        if arg == WRITE_CONFIG {
            write_config = true;
        } else {
            paths.push(arg.into());
        }
    }

    let settings = settings::Settings::load();
    if write_config {
        let path = settings.save()?;
        log::info!("wrote settings to {path:?}");
    }

    let canvas = InfiniteCanvas::new(settings.canvas.clone())?;

    let decoded: Vec<(std::path::PathBuf, Vec<StrokeSample>)> = {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        paths
            .into_par_iter()
            .filter_map(|path| {
                let try_block = || -> AnyResult<Vec<StrokeSample>> {
                    let bytes = std::fs::read(&path)?;
                    Ok(inkcanvas_core::io::decode(&bytes)?)
                };
                match try_block() {
                    Ok(samples) => Some((path, samples)),
                    Err(e) => {
                        log::error!("failed to open file {path:?}: {e:#}");
                        None
                    }
                }
            })
            .collect()
    };
    // Ingest in argument order, so ids follow it.
    for (path, samples) in &decoded {
        let id = canvas.draw_stroke(samples)?;
        log::debug!("{path:?} loaded as {id}");
    }
    canvas.flush()?;

    let bounds = canvas.content_bounds();
    #[allow(clippy::cast_precision_loss)]
    let visible = canvas.visible_strokes(
        settings.viewport.width as f32,
        settings.viewport.height as f32,
        usize::MAX,
    );
    #[allow(clippy::cast_precision_loss)]
    let size = human_bytes::human_bytes(canvas.encoded_size() as f64);

    println!("strokes: {}", canvas.stroke_count());
    println!("encoded: {size}");
    println!(
        "bounds: ({}, {}) to ({}, {})",
        bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
    );
    println!(
        "visible in {}x{}: {}",
        settings.viewport.width,
        settings.viewport.height,
        visible.len()
    );

    Ok(())
}
