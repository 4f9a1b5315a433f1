//! Pan/zoom state and bubble layout for the country analytics map.

pub const INITIAL_ZOOM: f64 = 4.0;
pub const SIDEBAR_WIDTH: f64 = 150.0;

const PAN_MARGIN: f64 = 0.9;
const SPIRAL_STEP: f64 = 75.0;
const GOLDEN_ANGLE: f64 = 2.399;
const BUBBLE_BASE: f64 = 28.0;
const BUBBLE_PER_USER: f64 = 12.0;
const BUBBLE_MIN: f64 = 36.0;
const BUBBLE_MAX: f64 = 220.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct MapViewport {
    width: f64,
    height: f64,
    zoom: f64,
    offset: Point,
    // Pointer position minus offset at the start of a pan.
    anchor: Option<Point>,
    selected: Option<i64>,
}

impl MapViewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            zoom: INITIAL_ZOOM,
            offset: Point::default(),
            anchor: None,
            selected: None,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn is_panning(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Largest offset allowed on each axis.
    pub fn pan_limit(&self) -> Point {
        Point::new(
            self.width / 2.0 * self.zoom * PAN_MARGIN,
            self.height / 2.0 * self.zoom * PAN_MARGIN,
        )
    }

    /// Panning is locked while a country detail is open.
    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if self.selected.is_some() {
            return false;
        }
        self.anchor = Some(Point::new(pointer.x - self.offset.x, pointer.y - self.offset.y));
        true
    }

    pub fn pan_to(&mut self, pointer: Point) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let limit = self.pan_limit();
        self.offset = Point::new(
            (pointer.x - anchor.x).clamp(-limit.x, limit.x),
            (pointer.y - anchor.y).clamp(-limit.y, limit.y),
        );
    }

    pub fn end_pan(&mut self) {
        self.anchor = None;
    }

    pub fn select(&mut self, country_id: i64) {
        self.anchor = None;
        self.selected = Some(country_id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Centre of the map area, right of the sidebar.
    pub fn center(&self) -> Point {
        Point::new(
            (self.width - SIDEBAR_WIDTH) / 2.0 + SIDEBAR_WIDTH,
            self.height / 2.0,
        )
    }

    /// Golden-angle spiral around the centre, before pan/zoom is applied.
    pub fn bubble_position(&self, index: usize) -> Point {
        let i = index as f64;
        let radius = SPIRAL_STEP * (i + 1.0).sqrt();
        let angle = GOLDEN_ANGLE * i + std::f64::consts::FRAC_PI_4;
        let center = self.center();
        Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
    }
}

/// Bubble diameter in pixels for a country with `users` voters.
pub fn bubble_size(users: u32) -> f64 {
    (BUBBLE_BASE + BUBBLE_PER_USER * f64::from(users)).clamp(BUBBLE_MIN, BUBBLE_MAX)
}
