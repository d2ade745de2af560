//! Snapshot -> intel tensor rendering.
//!
//! Produces a (height, width, 3) u8 tensor. Every entity is drawn as a
//! filled circle whose radius and color depend on its kind and owner.
//! The entity layer is flipped vertically so that map north is row 0, then
//! five horizontal indicator bars are drawn on fixed rows:
//!   row 3:  mineral ratio        (minerals / 1500)
//!   row 7:  vespene ratio        (vespene / 1500)
//!   row 11: population ratio     (supply left / supply cap)
//!   row 15: plausible supply     (supply cap / 200)
//!   row 19: military weight      (combat units / supply used)
//! Each ratio is clamped to [0, 1] and scaled to at most `BAR_MAX_LEN` px.

use ndarray::{s, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::world::{Snapshot, Unit, UnitKind};

/// Color channels per pixel.
pub const CHANNELS: usize = 3;

/// Maximum bar length in pixels.
pub const BAR_MAX_LEN: usize = 50;

/// Rows of the five indicator bars, top to bottom.
pub const BAR_ROWS: [usize; 5] = [3, 7, 11, 15, 19];

/// Bar thickness in pixels (centered on the bar row).
const BAR_THICKNESS: usize = 3;

/// Resource amount that fills the mineral and vespene bars.
const RESOURCE_FULL: f32 = 1500.0;

/// Supply cap that fills the plausible-supply bar.
const MAX_SUPPLY: f32 = 200.0;

/// Fallback dimensions when the map size is unknown.
const DEFAULT_HEIGHT: usize = 176;
const DEFAULT_WIDTH: usize = 200;

const BAR_COLORS: [[u8; 3]; 5] = [
    [25, 255, 0],
    [0, 200, 210],
    [150, 150, 150],
    [200, 200, 220],
    [200, 250, 250],
];

/// Fixed-size battlefield image, indexed `[row, column, channel]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelTensor(Array3<u8>);

impl IntelTensor {
    /// Creates a black tensor of the given size.
    pub fn zeros(height: usize, width: usize) -> Self {
        IntelTensor(Array3::zeros((height, width, CHANNELS)))
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.0.dim()
    }

    pub fn height(&self) -> usize {
        self.0.dim().0
    }

    pub fn width(&self) -> usize {
        self.0.dim().1
    }

    /// Color at a pixel, or None outside the tensor.
    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 3]> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        Some([
            self.0[[row, col, 0]],
            self.0[[row, col, 1]],
            self.0[[row, col, 2]],
        ])
    }

    fn set_pixel(&mut self, row: usize, col: usize, color: [u8; 3]) {
        for (c, v) in color.iter().enumerate() {
            self.0[[row, col, c]] = *v;
        }
    }

    /// Draws a filled circle; parts outside the tensor are clipped.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: u32, color: [u8; 3]) {
        let (h, w, _) = self.shape();
        if h == 0 || w == 0 {
            return;
        }
        let r = radius as i64;
        let (cx, cy) = (cx as i64, cy as i64);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                    continue;
                }
                self.set_pixel(y as usize, x as usize, color);
            }
        }
    }

    /// Draws a horizontal bar starting at column 0 centered on `row`.
    fn draw_bar(&mut self, row: usize, ratio: f32, color: [u8; 3]) {
        let len = (BAR_MAX_LEN as f32 * ratio.clamp(0.0, 1.0)) as usize;
        let len = len.min(self.width());
        let half = BAR_THICKNESS / 2;
        for r in row.saturating_sub(half)..=row + half {
            if r >= self.height() {
                break;
            }
            for col in 0..len {
                self.set_pixel(r, col, color);
            }
        }
    }

    /// Mirrors the tensor top-to-bottom.
    pub fn flip_vertical(&mut self) {
        self.0.invert_axis(Axis(0));
    }

    /// Length in pixels of the bar drawn on `row`.
    pub fn bar_length(&self, row: usize) -> usize {
        if row >= self.height() {
            return 0;
        }
        self.0
            .slice(s![row, .., ..])
            .outer_iter()
            .take_while(|px| px.iter().any(|&v| v != 0))
            .count()
    }

    /// Row-major f32 copy of the raw pixel values.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }

    /// Row-major raw bytes.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.iter().copied().collect()
    }
}

/// Renders snapshots into intel tensors.
pub trait IntelEncoder {
    fn encode(&self, snapshot: &Snapshot) -> IntelTensor;
}

/// Reference renderer: circles per entity plus indicator bars.
#[derive(Debug, Clone)]
pub struct CircleEncoder {
    /// Kind whose count defines military weight.
    pub combat_unit: UnitKind,
}

impl CircleEncoder {
    pub fn new(combat_unit: UnitKind) -> Self {
        CircleEncoder { combat_unit }
    }

    /// Radius and color for an own entity.
    fn own_style(kind: UnitKind) -> (u32, [u8; 3]) {
        match kind {
            UnitKind::Nexus | UnitKind::CommandCenter | UnitKind::Hatchery => (15, [0, 255, 0]),
            UnitKind::Pylon | UnitKind::SupplyDepot => (3, [0, 235, 20]),
            UnitKind::Probe | UnitKind::Scv | UnitKind::Drone => (1, [0, 200, 55]),
            UnitKind::Assimilator | UnitKind::Refinery | UnitKind::Extractor => (2, [0, 200, 55]),
            UnitKind::Gateway | UnitKind::Barracks => (3, [0, 100, 200]),
            UnitKind::CyberneticsCore | UnitKind::Factory => (3, [0, 150, 150]),
            UnitKind::Stargate | UnitKind::Starport => (5, [0, 0, 255]),
            UnitKind::RoboticsFacility => (5, [0, 155, 215]),
            UnitKind::VoidRay | UnitKind::Banshee | UnitKind::Zergling => (3, [0, 100, 255]),
            UnitKind::Observer | UnitKind::Reaper | UnitKind::Overlord => (1, [255, 255, 255]),
            _ => (1, [100, 100, 100]),
        }
    }

    /// Radius and color for an enemy entity.
    fn enemy_style(unit: &Unit, structure: bool) -> (u32, [u8; 3]) {
        if unit.kind.is_townhall() {
            (15, [255, 0, 0])
        } else if structure {
            (5, [212, 50, 200])
        } else if unit.kind.is_worker() {
            (1, [155, 0, 55])
        } else {
            (1, [215, 0, 50])
        }
    }

    fn ratios(&self, snapshot: &Snapshot) -> [f32; 5] {
        let supply_cap = snapshot.supply_cap as f32;
        let population = if supply_cap > 0.0 {
            snapshot.supply_left() as f32 / supply_cap
        } else {
            0.0
        };
        let army = snapshot.units_of(self.combat_unit).count() as f32;
        let military = if snapshot.supply_used > 0 {
            army / snapshot.supply_used as f32
        } else {
            0.0
        };
        [
            snapshot.minerals as f32 / RESOURCE_FULL,
            snapshot.vespene as f32 / RESOURCE_FULL,
            population,
            supply_cap / MAX_SUPPLY,
            military,
        ]
    }
}

impl IntelEncoder for CircleEncoder {
    fn encode(&self, snapshot: &Snapshot) -> IntelTensor {
        let (mut h, mut w) = (snapshot.map.height, snapshot.map.width);
        if h == 0 || w == 0 {
            h = DEFAULT_HEIGHT;
            w = DEFAULT_WIDTH;
        }
        let mut tensor = IntelTensor::zeros(h, w);

        for s in &snapshot.structures {
            let (r, color) = Self::own_style(s.kind);
            tensor.fill_circle(s.position.x, s.position.y, r, color);
        }
        for u in &snapshot.units {
            let (r, color) = Self::own_style(u.kind);
            tensor.fill_circle(u.position.x, u.position.y, r, color);
        }
        for s in &snapshot.enemy_structures {
            let (r, color) = Self::enemy_style(s, true);
            tensor.fill_circle(s.position.x, s.position.y, r, color);
        }
        for u in &snapshot.enemy_units {
            let (r, color) = Self::enemy_style(u, false);
            tensor.fill_circle(u.position.x, u.position.y, r, color);
        }

        tensor.flip_vertical();

        for ((row, ratio), color) in BAR_ROWS.iter().zip(self.ratios(snapshot)).zip(BAR_COLORS) {
            tensor.draw_bar(*row, ratio, color);
        }
        tensor
    }
}
