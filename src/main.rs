// SPDX-License-Identifier: MPL-2.0
use gallery_picker::config;
use gallery_picker::domain::media::{format_duration, MediaTypeFilter};
use gallery_picker::domain::picker::{CropOptions, PickerConfig};
use gallery_picker::infrastructure::{FsMediaLibrary, ImageRsEditor, UnsupportedThumbnails};
use gallery_picker::media::PageLoad;
use gallery_picker::picker::GalleryPicker;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: gallery_picker --library <dir> [options]

Options:
  --kind photo|video|all   media kinds to list (default: all)
  --exclude gif,heic       file extensions to hide
  --multi                  allow several assets
  --max N                  selection limit with --multi
  --select i,j             indices of the listed assets to pick
  --crop                   open the crop editor for a single photo
  --aspect R               crop aspect ratio width/height (default: 1)
  --pan dx,dy              pan the crop image before validating
  --pinch f                pinch factor applied after the pan
  --out <dir>              directory for cropped images";

struct Args {
    library: PathBuf,
    kind: MediaTypeFilter,
    exclude: Vec<String>,
    multi: bool,
    max: Option<u32>,
    select: Vec<usize>,
    crop: bool,
    aspect: Option<f64>,
    pan: Option<(f64, f64)>,
    pinch: Option<f64>,
    out: Option<PathBuf>,
}

fn parse_kind(value: &str) -> Result<MediaTypeFilter, String> {
    match value {
        "all" => Ok(MediaTypeFilter::All),
        "photo" | "photos" => Ok(MediaTypeFilter::PhotosOnly),
        "video" | "videos" => Ok(MediaTypeFilter::VideosOnly),
        other => Err(format!("unknown media kind '{other}'")),
    }
}

fn parse_list(value: &str) -> Result<Vec<String>, String> {
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_indices(value: &str) -> Result<Vec<usize>, String> {
    value
        .split(',')
        .map(|s| s.trim().parse::<usize>().map_err(|e| format!("invalid index '{s}': {e}")))
        .collect()
}

fn parse_pan(value: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = value
        .split_once(',')
        .ok_or_else(|| format!("expected dx,dy, got '{value}'"))?;
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("invalid offset '{s}': {e}"));
    Ok((parse(dx)?, parse(dy)?))
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    let parsed = Args {
        library: args.value_from_str("--library")?,
        kind: args
            .opt_value_from_fn("--kind", parse_kind)?
            .unwrap_or_default(),
        exclude: args
            .opt_value_from_fn("--exclude", parse_list)?
            .unwrap_or_default(),
        multi: args.contains("--multi"),
        max: args.opt_value_from_str("--max")?,
        select: args
            .opt_value_from_fn("--select", parse_indices)?
            .unwrap_or_default(),
        crop: args.contains("--crop"),
        aspect: args.opt_value_from_str("--aspect")?,
        pan: args.opt_value_from_fn("--pan", parse_pan)?,
        pinch: args.opt_value_from_str("--pinch")?,
        out: args.opt_value_from_str("--out")?,
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        tracing::warn!(?remaining, "ignoring unrecognized arguments");
    }
    Ok(parsed)
}

fn picker_config(args: &Args) -> PickerConfig {
    let mut config = if args.multi {
        PickerConfig::multiple(args.max)
    } else {
        PickerConfig::single()
    }
    .with_media_type(args.kind)
    .excluding(args.exclude.iter().map(String::as_str));

    if args.crop {
        let options = match args.aspect {
            Some(ratio) => CropOptions::with_aspect_ratio(ratio),
            None => CropOptions::square(),
        };
        config = config.with_crop(options);
    }
    config
}

async fn run(args: Args) -> gallery_picker::error::Result<()> {
    let (settings, warning) = config::load();
    if let Some(warning) = warning {
        tracing::warn!("{warning}");
    }

    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("gallery_picker"));
    let picker = GalleryPicker::new(
        Arc::new(FsMediaLibrary::new(&args.library)),
        Arc::new(UnsupportedThumbnails),
        Arc::new(ImageRsEditor::new(out_dir)),
        settings,
    );

    let (session, pending) = picker.pick(picker_config(&args))?;
    let mut load = session.start().await?;
    let needed = args.select.iter().max().map_or(0, |i| i + 1);
    while session.items().len() < needed && matches!(load, PageLoad::Loaded { has_more: true, .. }) {
        load = session.load_next_page().await?;
    }

    let items = session.items();
    tracing::info!(listed = items.len(), "library loaded");
    for index in &args.select {
        match items.get(*index) {
            Some(asset) => {
                let outcome = session.toggle(&asset.id).await?;
                tracing::debug!(asset = %asset.id, ?outcome, "toggled");
            }
            None => tracing::warn!(index, "no asset at index"),
        }
    }
    println!("{}", session.selection_label());

    if let Some((dx, dy)) = args.pan {
        session.on_pan_start();
        session.on_pan_update(dx, dy);
        session.on_pan_end();
    }
    if let Some(factor) = args.pinch {
        session.on_pinch_start();
        session.on_pinch_update(factor);
        session.on_pinch_end();
    }
    if let Some(transform) = session.crop_transform() {
        tracing::info!(
            x = transform.translate.x,
            y = transform.translate.y,
            scale = transform.scale,
            "crop transform"
        );
    }

    if !session.validate().await? {
        session.close();
    }
    drop(session);

    match pending.await {
        Some(picked) => {
            for item in picked {
                let duration = item
                    .asset
                    .duration
                    .map(|d| format!(" [{}]", format_duration(d)))
                    .unwrap_or_default();
                println!("{}\t{}\t{}{duration}", item.asset.id, item.mime_type, item.uri());
            }
        }
        None => println!("cancelled"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "pick failed");
            ExitCode::FAILURE
        }
    }
}
