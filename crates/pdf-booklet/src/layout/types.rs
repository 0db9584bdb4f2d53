//! Layout data types for imposition
//!
//! These types sit between the planner (pure page assignment) and the PDF
//! renderer (physical placement).

use crate::sequence::PageDescriptor;

/// Which physical side of the printed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    /// Front of the sheet (printed first in duplex)
    Front,
    /// Back of the sheet (printed second in duplex)
    Back,
}

/// Which half of the sheet, seen from the side being printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

/// One of the four page positions on an imposed sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Quadrant {
    /// Fill order of a sheet. Reading every sheet in this order, sheet by
    /// sheet, gives back the logical sequence.
    pub const TRAVERSAL: [Quadrant; 4] = [
        Quadrant::FrontLeft,
        Quadrant::FrontRight,
        Quadrant::BackLeft,
        Quadrant::BackRight,
    ];

    pub fn side(self) -> SheetSide {
        match self {
            Quadrant::FrontLeft | Quadrant::FrontRight => SheetSide::Front,
            Quadrant::BackLeft | Quadrant::BackRight => SheetSide::Back,
        }
    }

    pub fn column(self) -> Column {
        match self {
            Quadrant::FrontLeft | Quadrant::BackLeft => Column::Left,
            Quadrant::FrontRight | Quadrant::BackRight => Column::Right,
        }
    }
}

/// The two halves of one side of a sheet. `None` is blank physical area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideLayout {
    pub left: Option<PageDescriptor>,
    pub right: Option<PageDescriptor>,
}

impl SideLayout {
    pub fn get(&self, column: Column) -> Option<&PageDescriptor> {
        match column {
            Column::Left => self.left.as_ref(),
            Column::Right => self.right.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// One physical sheet as produced by the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    /// Zero-based position among sheets
    pub sheet_index: usize,
    pub front: SideLayout,
    pub back: SideLayout,
}

impl SheetLayout {
    pub fn side(&self, side: SheetSide) -> &SideLayout {
        match side {
            SheetSide::Front => &self.front,
            SheetSide::Back => &self.back,
        }
    }

    pub fn get(&self, quadrant: Quadrant) -> Option<&PageDescriptor> {
        self.side(quadrant.side()).get(quadrant.column())
    }

    /// Slots in traversal order, empties included
    pub fn quadrants(&self) -> impl Iterator<Item = (Quadrant, Option<&PageDescriptor>)> + '_ {
        Quadrant::TRAVERSAL.into_iter().map(|q| (q, self.get(q)))
    }

    pub fn empty_quadrants(&self) -> usize {
        self.quadrants().filter(|(_, page)| page.is_none()).count()
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Final placement of a source page inside a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    /// The cell the page was fitted into (content outside it is clipped)
    pub cell: Rect,
    /// Position and size of the scaled page content in points
    pub content_rect: Rect,
    /// Scale factor applied to the source page
    pub scale: f32,
    /// Clockwise rotation in degrees, a multiple of 90
    pub rotation_degrees: f32,
}

impl PagePlacement {
    pub fn is_rotated(&self) -> bool {
        self.quarter_turns() != 0
    }

    pub fn quarter_turns(&self) -> u8 {
        super::quarter_turns(self.rotation_degrees)
    }
}
