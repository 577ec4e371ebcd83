use std::time::{Duration, Instant};

use mzview::render::{PeakLabel, PeakMarker, ZoomRect};
use mzview::{
    AxisRange, Panel, PanelStyle, PointerButton, PointerPosition, Renderer, ScanRecord,
    ScrollDirection, Viewer, ViewerError,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Series(Panel, usize),
    Spectrum(Panel, usize),
    Title(Panel, String),
    XRange(Panel, AxisRange),
    YRange(Panel, AxisRange),
    Preview(Option<ZoomRect>),
    Marker(Panel, PeakMarker),
    Label(PeakLabel),
    ClearLabels(Panel),
}

#[derive(Debug, Default)]
struct RecordingRenderer {
    calls: Vec<Call>,
}

impl RecordingRenderer {
    fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl Renderer for RecordingRenderer {
    fn plot_series(&mut self, panel: Panel, x: &[f64], y: &[f64], _style: &PanelStyle) {
        assert_eq!(x.len(), y.len());
        self.calls.push(Call::Series(panel, x.len()));
    }

    fn plot_spectrum(&mut self, panel: Panel, mz: &[f64], intensity: &[f32], _style: &PanelStyle) {
        assert_eq!(mz.len(), intensity.len());
        self.calls.push(Call::Spectrum(panel, mz.len()));
    }

    fn set_title(&mut self, panel: Panel, title: &str) {
        self.calls.push(Call::Title(panel, title.to_string()));
    }

    fn set_x_range(&mut self, panel: Panel, range: AxisRange) {
        self.calls.push(Call::XRange(panel, range));
    }

    fn set_y_range(&mut self, panel: Panel, range: AxisRange) {
        self.calls.push(Call::YRange(panel, range));
    }

    fn set_zoom_preview(&mut self, rect: Option<ZoomRect>) {
        self.calls.push(Call::Preview(rect));
    }

    fn draw_peak_marker(&mut self, panel: Panel, marker: PeakMarker, color: &str) {
        assert_eq!(color, "red");
        self.calls.push(Call::Marker(panel, marker));
    }

    fn add_peak_label(&mut self, label: PeakLabel) {
        self.calls.push(Call::Label(label));
    }

    fn clear_peak_labels(&mut self, panel: Panel) {
        self.calls.push(Call::ClearLabels(panel));
    }
}

/// Eleven survey scans one minute apart whose TIC rises and falls twice, with a
/// fragment scan after every other one
fn recording() -> Vec<ScanRecord> {
    let profile = [1.0f32, 2.0, 10.0, 2.0, 1.0, 1.0, 1.0, 8.0, 1.0, 1.0, 1.0];
    let mut records = Vec::new();
    for (i, level) in profile.iter().enumerate() {
        let rt = i as f64;
        records.push(ScanRecord::ms1(
            rt,
            vec![100.0, 150.0, 200.0, 250.0, 300.0, 350.0],
            vec![0.0, *level, 0.0, *level * 3.0, 0.0, 1.0],
        ));
        if i % 2 == 0 {
            records.push(ScanRecord::ms2(rt + 0.5, Some(250.0), vec![80.0, 120.0], vec![4.0, 2.0]));
        }
    }
    records
}

fn at(panel: Panel, x: f64) -> Option<PointerPosition> {
    Some(PointerPosition::new(panel, x, 0.0))
}

#[test_log::test]
fn load_draws_every_panel() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    let summary = viewer.load(recording(), &mut renderer).unwrap();
    assert_eq!(summary.ms1_scans, 11);
    assert_eq!(summary.ms2_scans, 6);

    let calls = renderer.take();
    assert!(calls.contains(&Call::Series(Panel::Tic, 11)));
    assert!(calls.contains(&Call::Series(Panel::Bpc, 11)));
    assert!(calls.contains(&Call::Spectrum(Panel::Ms1, 6)));
    assert!(calls.contains(&Call::XRange(Panel::Tic, AxisRange::new(0.0, 10.0))));
    assert!(calls.contains(&Call::Title(Panel::Ms1, "MS1 @ RT = 0.00 min".to_string())));
}

#[test_log::test]
fn drag_zooms_and_follows_with_ms1() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    viewer.load(recording(), &mut renderer).unwrap();
    renderer.take();

    let t0 = Instant::now();
    viewer.press(PointerButton::Primary, at(Panel::Bpc, 2.0), &mut renderer);
    assert_eq!(viewer.current_ms1().unwrap().retention_time(), 2.0);
    viewer.pointer_move_at(at(Panel::Bpc, 6.0), t0, &mut renderer);
    viewer.pointer_move_at(at(Panel::Bpc, 7.0), t0 + Duration::from_millis(1), &mut renderer);
    viewer.release(PointerButton::Primary, at(Panel::Bpc, 8.0), &mut renderer);

    let calls = renderer.take();
    let previews: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Preview(Some(rect)) => Some(rect.x),
            _ => None,
        })
        .collect();
    assert_eq!(
        previews,
        vec![AxisRange::new(2.0, 2.0), AxisRange::new(2.0, 6.0)]
    );
    assert!(calls.contains(&Call::XRange(Panel::Bpc, AxisRange::new(2.0, 8.0))));
    assert!(calls.contains(&Call::XRange(Panel::Tic, AxisRange::new(2.0, 8.0))));
    assert_eq!(calls.last(), Some(&Call::Preview(None)));
    assert_eq!(viewer.current_ms1().unwrap().retention_time(), 5.0);

    viewer.reset_all(&mut renderer);
    let calls = renderer.take();
    assert!(calls.contains(&Call::XRange(Panel::Tic, AxisRange::new(0.0, 10.0))));
    assert!(calls.contains(&Call::XRange(Panel::Bpc, AxisRange::new(0.0, 10.0))));
    assert_eq!(viewer.current_ms1().unwrap().retention_time(), 0.0);
}

#[test]
fn scroll_only_touches_vertical_range() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    viewer.load(recording(), &mut renderer).unwrap();
    renderer.take();

    let before = viewer.navigation().view(Panel::Ms1).y;
    viewer.scroll(ScrollDirection::Up, at(Panel::Ms1, 200.0), &mut renderer);
    let after = viewer.navigation().view(Panel::Ms1).y;
    assert!((after.span() - before.span() * 0.9).abs() < 1e-9);
    assert_eq!(renderer.take(), vec![Call::YRange(Panel::Ms1, after)]);
}

#[test_log::test]
fn peak_picking_annotates_the_chromatogram() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    viewer.load(recording(), &mut renderer).unwrap();
    renderer.take();

    let peaks = viewer.pick_peaks(Panel::Tic, 50.0, &mut renderer).unwrap();
    let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![2, 7]);

    let calls = renderer.take();
    assert_eq!(calls[0], Call::ClearLabels(Panel::Tic));
    let labels: Vec<String> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Label(label) => Some(label.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["2.00".to_string(), "7.00".to_string()]);
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::Marker(Panel::Tic, _)))
            .count(),
        2
    );
    assert!(matches!(calls.last(), Some(Call::YRange(Panel::Tic, _))));

    // Only the apex of the whole signal reaches a 100% threshold
    let tallest = viewer.pick_peaks(Panel::Tic, 100.0, &mut renderer).unwrap();
    assert_eq!(tallest.len(), 1);
    assert_eq!(tallest[0].x, 2.0);
}

#[test]
fn peak_picking_on_spectra() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    viewer.load(recording(), &mut renderer).unwrap();
    viewer.show_ms1(2, &mut renderer);
    renderer.take();

    let peaks = viewer.pick_peaks(Panel::Ms1, 5.0, &mut renderer).unwrap();
    let mzs: Vec<f64> = peaks.iter().map(|p| p.x).collect();
    assert_eq!(mzs, vec![150.0, 250.0]);
    let label = renderer
        .take()
        .into_iter()
        .find_map(|c| match c {
            Call::Label(label) if label.x == 250.0 => Some(label),
            _ => None,
        })
        .unwrap();
    assert_eq!(label.panel, Panel::Ms1);
    assert_eq!(label.text, "250.0000");
    // Stem and label offset are 3% and 4% of the (0, 37.5) intensity range
    assert!((label.y - (30.0 + 37.5 * 0.07)).abs() < 1e-9);

    assert!(matches!(
        viewer.pick_peaks(Panel::Ms2, 5.0, &mut renderer),
        Err(ViewerError::NoData)
    ));
    viewer.show_ms2(0, &mut renderer).unwrap();
    assert!(viewer.pick_peaks(Panel::Ms2, 5.0, &mut renderer).unwrap().is_empty());
}

#[test]
fn bad_threshold_is_reported() {
    let mut viewer = Viewer::new();
    viewer.load(recording(), &mut mzview::NullRenderer).unwrap();
    let err = viewer
        .pick_peaks(Panel::Bpc, 0.0, &mut mzview::NullRenderer)
        .unwrap_err();
    assert!(matches!(err, ViewerError::InvalidInput(_)));
}

#[cfg(feature = "mzdata")]
#[test_log::test]
fn load_converted_mzml() {
    let mut renderer = RecordingRenderer::default();
    let mut viewer = Viewer::new();
    let summary = viewer
        .load_converted("./test/data/tiny.mzML", &mut renderer)
        .unwrap();
    assert_eq!(summary.ms1_scans, 3);
    assert_eq!(summary.ms2_scans, 1);
    assert_eq!(
        viewer.ms2_listing(),
        vec!["Scan 1 • RT=0.60 min • Prec=150.0000".to_string()]
    );
}
