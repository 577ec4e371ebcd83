//! Pointer-driven navigation across the linked chromatogram panels.
//!
//! [`NavigationController`] is a two-state machine (idle, dragging) that turns
//! pointer events into [`NavigationEffect`]s. It owns the visible range of every
//! panel, but never draws: the caller forwards the effects to a renderer.
//!
//! The TIC and BPC panels always share their horizontal range, and the MS1 panel
//! shows the survey scan closest to where the user clicked, or to the center of
//! the range they zoomed to.
use std::time::Instant;

use log::{debug, trace};

use crate::panel::{AxisRange, Panel};
use crate::render::ZoomRect;
use crate::repository::ScanRepository;
use crate::utils::FrameLimiter;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationConfig {
    /// The maximum number of zoom preview redraws per second while dragging
    pub preview_rate: u32,
    /// Vertical span multiplier when scrolling up
    pub scroll_zoom_in: f64,
    /// Vertical span multiplier when scrolling in any other direction
    pub scroll_zoom_out: f64,
    /// Drags narrower than this are treated as plain clicks
    pub drag_epsilon: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            preview_rate: 60,
            scroll_zoom_in: 0.9,
            scroll_zoom_out: 1.1,
            drag_epsilon: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Where a pointer event happened, in the data coordinates of the panel under it.
///
/// Events are passed as `Option<PointerPosition>`; `None` means the pointer is not
/// over any panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub panel: Panel,
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(panel: Panel, x: f64, y: f64) -> Self {
        Self { panel, x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationState {
    Idle,
    Dragging {
        /// The panel the drag started on
        panel: Panel,
        origin_x: f64,
    },
}

/// What the caller must redraw after a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationEffect {
    /// Show the survey scan at this position of [`ScanRepository::ms1_scans`]
    ShowMs1 { index: usize },
    SetXRange { panel: Panel, range: AxisRange },
    SetYRange { panel: Panel, range: AxisRange },
    /// Show or remove the zoom preview
    ZoomPreview(Option<ZoomRect>),
}

/// The visible ranges of one panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Default for PanelView {
    fn default() -> Self {
        Self {
            x: AxisRange::new(0.0, 1.0),
            y: AxisRange::new(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavigationConfig,
    state: NavigationState,
    views: [PanelView; 4],
    preview: Option<ZoomRect>,
    /// The latest pointer x the rate limit held back
    pending_x: Option<f64>,
    limiter: FrameLimiter,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(NavigationConfig::default())
    }
}

fn slot(panel: Panel) -> usize {
    match panel {
        Panel::Tic => 0,
        Panel::Bpc => 1,
        Panel::Ms1 => 2,
        Panel::Ms2 => 3,
    }
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            limiter: FrameLimiter::per_second(config.preview_rate),
            config,
            state: NavigationState::Idle,
            views: [PanelView::default(); 4],
            preview: None,
            pending_x: None,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, NavigationState::Dragging { .. })
    }

    pub fn drag_origin_x(&self) -> Option<f64> {
        match self.state {
            NavigationState::Idle => None,
            NavigationState::Dragging { origin_x, .. } => Some(origin_x),
        }
    }

    /// The zoom preview currently shown, if any
    pub fn preview(&self) -> Option<&ZoomRect> {
        self.preview.as_ref()
    }

    pub fn view(&self, panel: Panel) -> &PanelView {
        &self.views[slot(panel)]
    }

    /// Record the ranges a panel was drawn with, e.g. after plotting new data
    pub fn set_view(&mut self, panel: Panel, view: PanelView) {
        self.views[slot(panel)] = view;
    }

    fn set_preview(&mut self, rect: Option<ZoomRect>, effects: &mut Vec<NavigationEffect>) {
        self.preview = rect;
        effects.push(NavigationEffect::ZoomPreview(rect));
    }

    fn show_drag_preview(
        &mut self,
        panel: Panel,
        origin_x: f64,
        x: f64,
        effects: &mut Vec<NavigationEffect>,
    ) {
        let rect = ZoomRect {
            panel,
            x: AxisRange::spanning(origin_x, x),
            y: self.view(panel).y,
        };
        self.set_preview(Some(rect), effects);
    }

    /// Whether a pointer position is waiting for the rate limit before it can be previewed
    pub fn has_pending_preview(&self) -> bool {
        self.pending_x.is_some()
    }

    fn show_nearest_ms1(
        &self,
        repository: &ScanRepository,
        rt: f64,
        effects: &mut Vec<NavigationEffect>,
    ) {
        if let Some(index) = repository.nearest_ms1_index(rt) {
            effects.push(NavigationEffect::ShowMs1 { index });
        }
    }

    /// A button was pressed. A primary press on a chromatogram shows the nearest
    /// survey scan right away and starts a drag.
    pub fn press(
        &mut self,
        repository: &ScanRepository,
        button: PointerButton,
        position: Option<PointerPosition>,
    ) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        if button != PointerButton::Primary {
            return effects;
        }
        let Some(position) = position else {
            return effects;
        };
        if !position.panel.is_linked() {
            return effects;
        }

        debug!("Starting drag on {} at {}", position.panel, position.x);
        self.state = NavigationState::Dragging {
            panel: position.panel,
            origin_x: position.x,
        };
        self.pending_x = None;
        self.limiter.clear();
        self.show_nearest_ms1(repository, position.x, &mut effects);
        self.show_drag_preview(position.panel, position.x, position.x, &mut effects);
        effects
    }

    /// The pointer moved. While dragging, the preview follows the pointer at most
    /// [`NavigationConfig::preview_rate`] times per second. A move arriving too soon
    /// is held back until the next accepted move or [`NavigationController::flush_preview`].
    pub fn pointer_move(&mut self, position: Option<PointerPosition>) -> Vec<NavigationEffect> {
        self.pointer_move_at(position, Instant::now())
    }

    /// As [`NavigationController::pointer_move`], at an explicit time
    pub fn pointer_move_at(
        &mut self,
        position: Option<PointerPosition>,
        now: Instant,
    ) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        let NavigationState::Dragging { panel, origin_x } = self.state else {
            return effects;
        };
        let Some(position) = position else {
            return effects;
        };
        if !self.limiter.ready_at(now) {
            trace!("Holding back preview update at {}", position.x);
            self.pending_x = Some(position.x);
            return effects;
        }
        self.pending_x = None;
        self.show_drag_preview(panel, origin_x, position.x, &mut effects);
        effects
    }

    /// Show the position held back by the rate limit, if the limit now allows it.
    ///
    /// Call this from the host's frame timer so the preview catches up with a
    /// pointer that stopped moving.
    pub fn flush_preview(&mut self) -> Vec<NavigationEffect> {
        self.flush_preview_at(Instant::now())
    }

    /// As [`NavigationController::flush_preview`], at an explicit time
    pub fn flush_preview_at(&mut self, now: Instant) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        let NavigationState::Dragging { panel, origin_x } = self.state else {
            self.pending_x = None;
            return effects;
        };
        let Some(x) = self.pending_x else {
            return effects;
        };
        if !self.limiter.ready_at(now) {
            return effects;
        }
        self.pending_x = None;
        self.show_drag_preview(panel, origin_x, x, &mut effects);
        effects
    }

    /// A button was released. Releasing a real drag over a chromatogram zooms both
    /// chromatograms to the dragged range and shows the survey scan nearest its center.
    pub fn release(
        &mut self,
        repository: &ScanRepository,
        button: PointerButton,
        position: Option<PointerPosition>,
    ) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        if button != PointerButton::Primary {
            return effects;
        }
        let NavigationState::Dragging { origin_x, .. } = self.state else {
            return effects;
        };
        // Without coordinates the drag stays open until a usable release arrives
        let Some(position) = position else {
            return effects;
        };

        self.state = NavigationState::Idle;
        self.pending_x = None;
        if !position.panel.is_linked() {
            debug!("Drag released on {}, discarding", position.panel);
            self.set_preview(None, &mut effects);
            return effects;
        }
        if (position.x - origin_x).abs() < self.config.drag_epsilon {
            self.set_preview(None, &mut effects);
            return effects;
        }

        let range = AxisRange::spanning(origin_x, position.x);
        debug!("Zooming chromatograms to {:?}", range);
        for panel in [Some(position.panel), position.panel.partner()]
            .into_iter()
            .flatten()
        {
            self.views[slot(panel)].x = range;
            effects.push(NavigationEffect::SetXRange { panel, range });
        }
        self.show_nearest_ms1(repository, range.center(), &mut effects);
        self.set_preview(None, &mut effects);
        effects
    }

    /// Scale the vertical range of the panel under the pointer, whatever the drag state
    pub fn scroll(
        &mut self,
        direction: ScrollDirection,
        position: Option<PointerPosition>,
    ) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        let Some(position) = position else {
            return effects;
        };
        let factor = match direction {
            ScrollDirection::Up => self.config.scroll_zoom_in,
            ScrollDirection::Down => self.config.scroll_zoom_out,
        };
        let view = &mut self.views[slot(position.panel)];
        view.y = view.y.scaled(factor);
        effects.push(NavigationEffect::SetYRange {
            panel: position.panel,
            range: view.y,
        });
        effects
    }

    /// Show the whole recording: both chromatograms span their full retention time
    /// extent and the survey panel returns to the first scan.
    pub fn reset_all(&mut self, repository: &ScanRepository) -> Vec<NavigationEffect> {
        let mut effects = Vec::new();
        self.state = NavigationState::Idle;
        self.pending_x = None;
        if self.preview.is_some() {
            self.set_preview(None, &mut effects);
        }
        for (panel, chromatogram) in [(Panel::Tic, repository.tic()), (Panel::Bpc, repository.bpc())]
        {
            if let Some((lo, hi)) = chromatogram.time_extent() {
                let range = AxisRange::new(lo, hi);
                self.views[slot(panel)].x = range;
                effects.push(NavigationEffect::SetXRange { panel, range });
            }
        }
        if repository.default_ms1().is_some() {
            effects.push(NavigationEffect::ShowMs1 { index: 0 });
        }
        effects
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::io::ScanRecord;

    fn repository() -> ScanRepository {
        let mut repo = ScanRepository::new();
        repo.load(
            (0..=10)
                .map(|i| ScanRecord::ms1(i as f64, vec![100.0, 200.0], vec![1.0, i as f32]))
                .collect::<Vec<_>>(),
        )
        .unwrap();
        repo
    }

    fn at(panel: Panel, x: f64) -> Option<PointerPosition> {
        Some(PointerPosition::new(panel, x, 0.5))
    }

    fn x_ranges(effects: &[NavigationEffect]) -> Vec<(Panel, AxisRange)> {
        effects
            .iter()
            .filter_map(|e| match e {
                NavigationEffect::SetXRange { panel, range } => Some((*panel, *range)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_click_shows_nearest_ms1() {
        let repo = repository();
        let mut nav = NavigationController::default();
        let effects = nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 3.4));
        assert_eq!(effects[0], NavigationEffect::ShowMs1 { index: 3 });
        assert!(nav.is_dragging());
        assert_eq!(nav.drag_origin_x(), Some(3.4));
        assert_eq!(nav.preview().map(|r| r.x), Some(AxisRange::new(3.4, 3.4)));
    }

    #[test]
    fn test_press_elsewhere_is_ignored() {
        let repo = repository();
        let mut nav = NavigationController::default();
        assert!(nav
            .press(&repo, PointerButton::Primary, at(Panel::Ms1, 300.0))
            .is_empty());
        assert!(nav
            .press(&repo, PointerButton::Secondary, at(Panel::Tic, 3.0))
            .is_empty());
        assert!(nav.press(&repo, PointerButton::Primary, None).is_empty());
        assert_eq!(nav.state(), NavigationState::Idle);
    }

    #[test]
    fn test_zero_width_drag_changes_nothing() {
        let repo = repository();
        let mut nav = NavigationController::default();
        let before = *nav.view(Panel::Bpc);
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 2.0));
        let effects = nav.release(&repo, PointerButton::Primary, at(Panel::Tic, 2.0));
        assert_eq!(effects, vec![NavigationEffect::ZoomPreview(None)]);
        assert_eq!(*nav.view(Panel::Bpc), before);
        assert_eq!(nav.state(), NavigationState::Idle);
        assert!(nav.preview().is_none());
    }

    #[test_log::test]
    fn test_drag_zooms_both_chromatograms() {
        let repo = repository();
        let mut nav = NavigationController::default();
        nav.press(&repo, PointerButton::Primary, at(Panel::Bpc, 2.0));
        let effects = nav.release(&repo, PointerButton::Primary, at(Panel::Bpc, 8.0));

        let expected = AxisRange::new(2.0, 8.0);
        assert_eq!(
            x_ranges(&effects),
            vec![(Panel::Bpc, expected), (Panel::Tic, expected)]
        );
        assert_eq!(nav.view(Panel::Tic).x, expected);
        assert_eq!(nav.view(Panel::Bpc).x, expected);
        assert!(effects.contains(&NavigationEffect::ShowMs1 {
            index: repo.nearest_ms1_index(5.0).unwrap()
        }));
        assert_eq!(effects.last(), Some(&NavigationEffect::ZoomPreview(None)));
    }

    #[test]
    fn test_reversed_drag() {
        let repo = repository();
        let mut nav = NavigationController::default();
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 9.0));
        nav.release(&repo, PointerButton::Primary, at(Panel::Bpc, 4.0));
        assert_eq!(nav.view(Panel::Tic).x, AxisRange::new(4.0, 9.0));
        assert_eq!(nav.view(Panel::Bpc).x, AxisRange::new(4.0, 9.0));
    }

    #[test]
    fn test_release_off_group_discards() {
        let repo = repository();
        let mut nav = NavigationController::default();
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 2.0));
        let effects = nav.release(&repo, PointerButton::Primary, at(Panel::Ms1, 500.0));
        assert_eq!(effects, vec![NavigationEffect::ZoomPreview(None)]);
        assert_eq!(nav.view(Panel::Tic).x, PanelView::default().x);
        assert!(!nav.is_dragging());
    }

    #[test]
    fn test_missing_coordinates_keep_drag() {
        let repo = repository();
        let mut nav = NavigationController::default();
        let t0 = Instant::now();
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 1.0));
        assert!(nav.pointer_move_at(None, t0).is_empty());
        assert!(nav.release(&repo, PointerButton::Primary, None).is_empty());
        assert_eq!(nav.drag_origin_x(), Some(1.0));

        let effects = nav.release(&repo, PointerButton::Primary, at(Panel::Tic, 5.0));
        assert_eq!(x_ranges(&effects).len(), 2);
        assert_eq!(nav.view(Panel::Bpc).x, AxisRange::new(1.0, 5.0));
    }

    #[test]
    fn test_preview_is_rate_limited() {
        let repo = repository();
        let mut nav = NavigationController::default();
        let y = AxisRange::new(0.0, 40.0);
        nav.set_view(
            Panel::Tic,
            PanelView {
                x: AxisRange::new(0.0, 10.0),
                y,
            },
        );
        let t0 = Instant::now();
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 5.0));

        let effects = nav.pointer_move_at(at(Panel::Tic, 6.0), t0);
        assert_eq!(
            effects,
            vec![NavigationEffect::ZoomPreview(Some(ZoomRect {
                panel: Panel::Tic,
                x: AxisRange::new(5.0, 6.0),
                y,
            }))]
        );
        // Too soon, held back
        assert!(nav
            .pointer_move_at(at(Panel::Tic, 7.0), t0 + Duration::from_millis(5))
            .is_empty());
        assert_eq!(nav.preview().unwrap().x, AxisRange::new(5.0, 6.0));

        // The next accepted move reflects the latest position, on the starting panel
        let effects = nav.pointer_move_at(at(Panel::Ms1, 3.0), t0 + Duration::from_millis(20));
        assert_eq!(effects.len(), 1);
        let rect = nav.preview().unwrap();
        assert_eq!(rect.panel, Panel::Tic);
        assert_eq!(rect.x, AxisRange::new(3.0, 5.0));
    }

    #[test]
    fn test_held_back_move_is_flushed() {
        let repo = repository();
        let mut nav = NavigationController::default();
        let t0 = Instant::now();
        nav.press(&repo, PointerButton::Primary, at(Panel::Bpc, 5.0));
        assert_eq!(nav.pointer_move_at(at(Panel::Bpc, 6.0), t0).len(), 1);

        // The pointer stops inside the rate limit window
        assert!(nav
            .pointer_move_at(at(Panel::Bpc, 7.0), t0 + Duration::from_millis(5))
            .is_empty());
        assert!(nav.has_pending_preview());
        assert!(nav.flush_preview_at(t0 + Duration::from_millis(10)).is_empty());

        let effects = nav.flush_preview_at(t0 + Duration::from_millis(17));
        assert_eq!(effects.len(), 1);
        assert_eq!(nav.preview().unwrap().x, AxisRange::new(5.0, 7.0));
        assert!(!nav.has_pending_preview());
        assert!(nav.flush_preview_at(t0 + Duration::from_millis(40)).is_empty());

        // Releasing drops whatever is still held back
        nav.pointer_move_at(at(Panel::Bpc, 8.0), t0 + Duration::from_millis(41));
        assert!(nav.has_pending_preview());
        nav.release(&repo, PointerButton::Primary, at(Panel::Bpc, 8.0));
        assert!(!nav.has_pending_preview());
        assert!(nav.flush_preview_at(t0 + Duration::from_millis(80)).is_empty());
    }

    #[test]
    fn test_move_when_idle_is_ignored() {
        let mut nav = NavigationController::default();
        assert!(nav
            .pointer_move_at(at(Panel::Tic, 1.0), Instant::now())
            .is_empty());
    }

    #[test]
    fn test_scroll_scales_vertical_range() {
        let repo = repository();
        let mut nav = NavigationController::default();
        nav.set_view(
            Panel::Bpc,
            PanelView {
                x: AxisRange::new(0.0, 10.0),
                y: AxisRange::new(0.0, 100.0),
            },
        );
        nav.scroll(ScrollDirection::Up, at(Panel::Bpc, 1.0));
        let y = nav.view(Panel::Bpc).y;
        assert!((y.min - 5.0).abs() < 1e-9);
        assert!((y.max - 95.0).abs() < 1e-9);
        assert_eq!(nav.view(Panel::Bpc).x, AxisRange::new(0.0, 10.0));

        nav.scroll(ScrollDirection::Down, at(Panel::Bpc, 1.0));
        assert!((nav.view(Panel::Bpc).y.span() - 99.0).abs() < 1e-9);

        // Scrolling mid-drag leaves the drag alone
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 1.0));
        nav.scroll(ScrollDirection::Up, at(Panel::Ms1, 1.0));
        assert!(nav.is_dragging());
        assert!(nav.scroll(ScrollDirection::Up, None).is_empty());
    }

    #[test]
    fn test_reset_all() {
        let repo = repository();
        let mut nav = NavigationController::default();
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 2.0));
        nav.release(&repo, PointerButton::Primary, at(Panel::Tic, 4.0));
        nav.press(&repo, PointerButton::Primary, at(Panel::Tic, 3.0));

        let effects = nav.reset_all(&repo);
        let full = AxisRange::new(0.0, 10.0);
        assert_eq!(x_ranges(&effects), vec![(Panel::Tic, full), (Panel::Bpc, full)]);
        assert!(effects.contains(&NavigationEffect::ShowMs1 { index: 0 }));
        assert!(effects.contains(&NavigationEffect::ZoomPreview(None)));
        assert_eq!(nav.state(), NavigationState::Idle);
        assert!(nav.preview().is_none());
        assert_eq!(nav.view(Panel::Bpc).x, full);
    }

    #[test]
    fn test_reset_all_without_data() {
        let repo = ScanRepository::new();
        let mut nav = NavigationController::default();
        assert!(nav.reset_all(&repo).is_empty());
        assert!(nav
            .press(&repo, PointerButton::Primary, at(Panel::Tic, 1.0))
            .iter()
            .all(|e| !matches!(e, NavigationEffect::ShowMs1 { .. })));
    }
}
