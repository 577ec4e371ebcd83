use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use mzview::{
    NullRenderer, Panel, PeakDetectionParams, PointerButton, PointerPosition, Viewer,
};

/// Load an LC-MS recording, summarize it and list the peaks of one panel
#[derive(Debug, Parser)]
#[command(version, about)]
struct App {
    /// The recording to read, in any format mzdata recognizes
    path: PathBuf,

    /// The panel to search for peaks: tic, bpc, ms1 or ms2
    #[arg(short, long, default_value = "tic")]
    panel: Panel,

    /// The minimum peak height, as a percentage of the signal's maximum
    #[arg(short, long, default_value_t = PeakDetectionParams::default().percent_threshold)]
    threshold: f64,

    /// Show the survey scan closest to this retention time instead of the first one
    #[arg(long)]
    rt: Option<f64>,

    /// The position in the MS2 list of the fragment scan to search with `--panel ms2`
    #[arg(long, default_value_t = 0)]
    ms2_index: usize,

    /// Print the MS2 scan list
    #[arg(long)]
    list_ms2: bool,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let args = App::parse();
    let mut renderer = NullRenderer;
    let mut viewer = Viewer::new();

    info!("Opening {}", args.path.display());
    let summary = viewer
        .load_converted(&args.path, &mut renderer)
        .map_err(io::Error::other)?;
    info!(
        "Read {} records: {} MS1 scans, {} MS2 scans, {} skipped",
        summary.records_read, summary.ms1_scans, summary.ms2_scans, summary.skipped
    );
    if let Some((start, end)) = viewer.repository().retention_time_extent() {
        info!("Retention time spans {start:.2} to {end:.2} min");
    }

    if let Some(rt) = args.rt {
        let at = Some(PointerPosition::new(Panel::Tic, rt, 0.0));
        viewer.press(PointerButton::Primary, at, &mut renderer);
        viewer.release(PointerButton::Primary, at, &mut renderer);
    }
    if let Some(scan) = viewer.current_ms1() {
        println!("MS1 @ {scan}");
    }

    if args.list_ms2 {
        for line in viewer.ms2_listing() {
            println!("{line}");
        }
    }

    if args.panel == Panel::Ms2 {
        viewer
            .show_ms2(args.ms2_index, &mut renderer)
            .map_err(io::Error::other)?;
    }
    let peaks = viewer
        .pick_peaks(args.panel, args.threshold, &mut renderer)
        .map_err(io::Error::other)?;
    if peaks.is_empty() {
        println!("No peaks found on {}", args.panel);
    }
    for line in mzview::annotation::peak_listing(&peaks) {
        println!("{line}");
    }
    Ok(())
}
