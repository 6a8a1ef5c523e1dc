// THEORY:
// This binary replaces the teacher's `src/main.rs` placeholder (its own comment
// calls it "an example of how to use the library") with a real thin driver: wire
// a `clap`-derived CLI to `TrackerConfig`, replay a detection stream through
// `Driver`, and write the final CSV artifact. Video decoding and on-disk
// annotation-CSV ingestion are both out of this crate's scope (spec.md's
// Non-goals), so the stream this binary replays is synthetic, generated in
// place rather than read from a video file or a detections CSV.

use clap::Parser;
use hypo_track::{BBox, DetectionId, StationaryAuxiliaryTracker, TrackerConfig};
use image::{Rgb, RgbImage};
use std::collections::HashMap;
use std::path::PathBuf;

/// Runs the MHT tracking core over a synthetic detection stream and writes a
/// CSV artifact of the final solution, in the column layout described in
/// spec.md's "Persisted artifact" section.
#[derive(Parser, Debug)]
#[command(name = "hypo_track", about = "Multiple Hypothesis Tracking core demo driver")]
struct Cli {
    /// Number of synthetic frames to simulate.
    #[arg(long, default_value_t = 50)]
    frames: u32,

    /// Number of synthetic targets moving on independent linear trajectories.
    #[arg(long, default_value_t = 2)]
    targets: usize,

    /// Width of the synthetic canvas.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Height of the synthetic canvas.
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Where to write the solution CSV.
    #[arg(long, default_value = "solution.csv")]
    output: PathBuf,

    /// N-scan pruning depth override. Falls back to `TrackerConfig::from_env`
    /// (and its own default) if unset.
    #[arg(long)]
    n_pruning: Option<usize>,
}

/// One synthetic target moving on a straight line, rendered as a flat-colored
/// square so each target's appearance descriptor is distinguishable.
struct SyntheticTarget {
    color: Rgb<u8>,
    origin: (f64, f64),
    velocity: (f64, f64),
    size: f64,
}

fn synthetic_targets(count: usize, width: u32, height: u32) -> Vec<SyntheticTarget> {
    let palette = [
        Rgb([220, 40, 40]),
        Rgb([40, 120, 220]),
        Rgb([40, 200, 80]),
        Rgb([220, 180, 40]),
    ];
    (0..count)
        .map(|i| SyntheticTarget {
            color: palette[i % palette.len()],
            origin: (
                (width as f64) * 0.1 + (i as f64) * 20.0,
                (height as f64) * 0.2 + (i as f64) * 30.0,
            ),
            velocity: (2.0, 0.5 * (i as f64 + 1.0) * if i % 2 == 0 { 1.0 } else { -1.0 }),
            size: 30.0,
        })
        .collect()
}

fn render_frame(
    width: u32,
    height: u32,
    targets: &[SyntheticTarget],
    frame: u32,
) -> (RgbImage, HashMap<DetectionId, BBox>) {
    let mut image = RgbImage::from_fn(width, height, |_, _| Rgb([30, 30, 30]));
    let mut detections = HashMap::new();

    for (i, target) in targets.iter().enumerate() {
        let cx = target.origin.0 + target.velocity.0 * frame as f64;
        let cy = target.origin.1 + target.velocity.1 * frame as f64;
        let bbox = BBox::new(
            cx - target.size / 2.0,
            cy - target.size / 2.0,
            cx + target.size / 2.0,
            cy + target.size / 2.0,
        );
        if let Some((x, y, w, h)) = bbox.clip_to_image(width, height) {
            for py in y..y + h {
                for px in x..x + w {
                    image.put_pixel(px, py, target.color);
                }
            }
            detections.insert(DetectionId(i as u64), bbox);
        }
    }

    (image, detections)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = TrackerConfig::from_env();
    if let Some(n) = cli.n_pruning {
        config.n_pruning = n;
    }
    if let Err(err) = config.validate() {
        eprintln!("invalid tracker configuration: {err}");
        std::process::exit(1);
    }

    let targets = synthetic_targets(cli.targets, cli.width, cli.height);
    let mut driver = hypo_track::Driver::new(config, StationaryAuxiliaryTracker::new)
        .expect("validated config always constructs a driver");

    let mut final_solution: Vec<Vec<Option<BBox>>> = Vec::new();
    for frame in 0..cli.frames {
        let (image, detections) = render_frame(cli.width, cli.height, &targets, frame);
        let (output, errors) = driver.process_frame(&image, &detections);
        for err in &errors {
            log::warn!("frame {frame}: {err}");
        }
        final_solution = output.solution_coordinates;
    }

    // `final_solution[track][frame]`; the CSV format wants one row per frame,
    // with tracks as columns in the final frame's ordering, so transpose it.
    let num_frames = cli.frames as usize;
    let rows: Vec<Vec<Option<BBox>>> = (0..num_frames)
        .map(|frame_idx| {
            final_solution
                .iter()
                .map(|trace| trace.get(frame_idx).copied().flatten())
                .collect()
        })
        .collect();

    match std::fs::File::create(&cli.output) {
        Ok(file) => {
            if let Err(err) = hypo_track::write_solution_csv(file, &rows) {
                eprintln!("failed to write {}: {err}", cli.output.display());
                std::process::exit(1);
            }
            log::info!("wrote {} frames to {}", rows.len(), cli.output.display());
        }
        Err(err) => {
            eprintln!("failed to create {}: {err}", cli.output.display());
            std::process::exit(1);
        }
    }
}
