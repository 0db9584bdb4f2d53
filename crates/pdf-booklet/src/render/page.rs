//! Output document assembly
//!
//! [`OutputBuilder`] accumulates output pages (sequential copies or imposed
//! sheet sides) and finally writes the page tree, catalog and bytes.

use crate::constants::{OUTPUT_PDF_VERSION, mm_to_pt};
use crate::layout::{Column, PagePlacement, Rect, SheetSide, SideLayout, cell_bounds, place_page};
use crate::layout::{Quadrant, sheet_dimensions_pt};
use crate::options::ExportOptions;
use crate::sequence::{PageDescriptor, SourceId, SourceSet};
use crate::types::{PaperSize, RenderError};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::xobject::{create_page_xobject, get_page_dimensions, page_rotation};

type Result<T> = std::result::Result<T, RenderError>;

/// A source page already copied into the output as a Form XObject
#[derive(Debug, Clone, Copy)]
struct PlacedSource {
    xobject_id: ObjectId,
    width: f32,
    height: f32,
    rotation: i64,
}

pub(crate) struct OutputBuilder<'a> {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    sources: &'a SourceSet,
    page_ids: HashMap<SourceId, Vec<ObjectId>>,
    xobjects: HashMap<(SourceId, usize), PlacedSource>,
    copy_caches: HashMap<SourceId, HashMap<ObjectId, ObjectId>>,
}

impl<'a> OutputBuilder<'a> {
    pub(crate) fn new(sources: &'a SourceSet) -> Self {
        let mut output = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = output.new_object_id();
        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
            sources,
            page_ids: HashMap::new(),
            xobjects: HashMap::new(),
            copy_caches: HashMap::new(),
        }
    }

    pub(crate) fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Size used for synthesized blank pages: the primary document's first
    /// page, or A5 portrait when that can't be read.
    pub(crate) fn reference_dimensions(&mut self) -> (f32, f32) {
        let first = self
            .source_page_ids(SourceId::PRIMARY)
            .ok()
            .and_then(|ids| ids.first().copied());
        let primary = self.sources.primary();

        match first.zip(primary).map(|(id, doc)| get_page_dimensions(doc, id)) {
            Some(Ok(dims)) => dims,
            _ => {
                log::warn!("No readable reference page, using A5 for blank pages");
                let (w, h) = PaperSize::A5.dimensions_mm();
                (mm_to_pt(w), mm_to_pt(h))
            }
        }
    }

    fn source_page_ids(&mut self, source: SourceId) -> Result<&[ObjectId]> {
        if !self.page_ids.contains_key(&source) {
            let ids = self
                .sources
                .page_ids(source)
                .ok_or(RenderError::MissingSource(source))?;
            self.page_ids.insert(source, ids);
        }
        Ok(self.page_ids[&source].as_slice())
    }

    /// Copy a source page into the output once and reuse it afterwards
    fn placed_source(&mut self, source: SourceId, page_index: usize) -> Result<PlacedSource> {
        if let Some(placed) = self.xobjects.get(&(source, page_index)) {
            log::debug!("Reusing XObject for {source} page {page_index}");
            return Ok(*placed);
        }

        let page_id = self
            .source_page_ids(source)?
            .get(page_index)
            .copied()
            .ok_or(RenderError::MissingPage {
                document: source,
                page_index,
            })?;
        let document = self
            .sources
            .get(source)
            .ok_or(RenderError::MissingSource(source))?;

        let cache = self.copy_caches.entry(source).or_default();
        let xobject_id = create_page_xobject(&mut self.output, document, page_id, cache)?;
        let (width, height) = get_page_dimensions(document, page_id)?;

        let placed = PlacedSource {
            xobject_id,
            width,
            height,
            rotation: page_rotation(document, page_id),
        };
        self.xobjects.insert((source, page_index), placed);
        Ok(placed)
    }

    /// Append one page of a straight export: the source page at its own
    /// size, or an empty page of `blank_size` for blanks.
    pub(crate) fn add_sequential_page(
        &mut self,
        page: &PageDescriptor,
        blank_size: (f32, f32),
    ) -> Result<()> {
        let Some((source, page_index)) = page.source_page() else {
            let (width, height) = blank_size;
            self.add_page(width, height, String::new(), Dictionary::new(), 0);
            return Ok(());
        };

        let placed = self.placed_source(source, page_index)?;
        let mut xobjects = Dictionary::new();
        xobjects.set("P0", Object::Reference(placed.xobject_id));

        self.add_page(
            placed.width,
            placed.height,
            "q /P0 Do Q\n".to_string(),
            xobjects,
            placed.rotation,
        );
        Ok(())
    }

    /// Append one side of an imposed sheet
    pub(crate) fn add_sheet_side(
        &mut self,
        layout: &SideLayout,
        side: SheetSide,
        options: &ExportOptions,
    ) -> Result<()> {
        let (sheet_width, sheet_height) = sheet_dimensions_pt();
        let mut content_ops = Vec::new();
        let mut xobjects = Dictionary::new();

        for column in [Column::Left, Column::Right] {
            let Some((source, page_index)) = layout.get(column).and_then(|p| p.source_page())
            else {
                continue;
            };

            let quadrant = quadrant_of(side, column);
            let placed = self.placed_source(source, page_index)?;
            let cell = cell_bounds(column, &options.sheet_margins);
            // The page's own /Rotate is folded into the placement matrix
            let rotation = placed.rotation as f32 + options.imposition.rotation_for(quadrant);
            let placement = place_page(
                &cell,
                placed.width,
                placed.height,
                options.scaling,
                rotation,
            );

            let xobject_name = match column {
                Column::Left => "L",
                Column::Right => "R",
            };
            xobjects.set(xobject_name, Object::Reference(placed.xobject_id));
            content_ops.push(generate_placement_command(xobject_name, &placement));
        }

        self.add_page(
            sheet_width,
            sheet_height,
            content_ops.join(""),
            xobjects,
            0,
        );
        Ok(())
    }

    fn add_page(
        &mut self,
        width: f32,
        height: f32,
        content: String,
        xobjects: Dictionary,
        rotation: i64,
    ) {
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_tree_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ]),
        );
        if rotation != 0 {
            page_dict.set("Rotate", Object::Integer(rotation));
        }

        let mut resources = Dictionary::new();
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = self.output.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
    }

    /// Write the page tree and catalog, then serialize
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        let mut writer = Vec::new();
        self.output.save_to(&mut writer)?;
        Ok(writer)
    }
}

fn quadrant_of(side: SheetSide, column: Column) -> Quadrant {
    match (side, column) {
        (SheetSide::Front, Column::Left) => Quadrant::FrontLeft,
        (SheetSide::Front, Column::Right) => Quadrant::FrontRight,
        (SheetSide::Back, Column::Left) => Quadrant::BackLeft,
        (SheetSide::Back, Column::Right) => Quadrant::BackRight,
    }
}

/// Generate the content stream command that draws one quadrant,
/// clipped to its cell.
fn generate_placement_command(xobject_name: &str, placement: &PagePlacement) -> String {
    let Rect {
        x,
        y,
        width,
        height,
    } = placement.content_rect;
    let cell = placement.cell;
    let scale = placement.scale;

    // Clockwise turns; the form's origin moves to the matching corner of the content rect
    let matrix = match placement.quarter_turns() {
        1 => format!("0 {} {} 0 {} {}", -scale, scale, x, y + height),
        2 => format!("{} 0 0 {} {} {}", -scale, -scale, x + width, y + height),
        3 => format!("0 {} {} 0 {} {}", scale, -scale, x + width, y),
        _ => format!("{} 0 0 {} {} {}", scale, scale, x, y),
    };

    format!(
        "q {} {} {} {} re W n q {} cm /{} Do Q Q\n",
        cell.x, cell.y, cell.width, cell.height, matrix, xobject_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_of_matches_traversal() {
        let quadrants: Vec<Quadrant> = [SheetSide::Front, SheetSide::Back]
            .into_iter()
            .flat_map(|side| [Column::Left, Column::Right].map(|c| quadrant_of(side, c)))
            .collect();
        assert_eq!(quadrants, Quadrant::TRAVERSAL.to_vec());
    }

    #[test]
    fn test_placement_command_upright() {
        let placement = PagePlacement {
            cell: Rect::new(0.0, 0.0, 100.0, 200.0),
            content_rect: Rect::new(10.0, 20.0, 80.0, 160.0),
            scale: 0.5,
            rotation_degrees: 0.0,
        };
        let cmd = generate_placement_command("L", &placement);
        assert_eq!(cmd, "q 0 0 100 200 re W n q 0.5 0 0 0.5 10 20 cm /L Do Q Q\n");
    }

    #[test]
    fn test_placement_command_rotated() {
        let placement = PagePlacement {
            cell: Rect::new(0.0, 0.0, 100.0, 200.0),
            content_rect: Rect::new(10.0, 20.0, 80.0, 160.0),
            scale: 1.0,
            rotation_degrees: 180.0,
        };
        let cmd = generate_placement_command("R", &placement);
        assert!(cmd.contains("-1 0 0 -1 90 180 cm /R Do"));
    }

    #[test]
    fn test_placement_command_quarter_turns() {
        let mut placement = PagePlacement {
            cell: Rect::new(0.0, 0.0, 100.0, 200.0),
            content_rect: Rect::new(10.0, 20.0, 80.0, 160.0),
            scale: 1.0,
            rotation_degrees: 90.0,
        };
        let cmd = generate_placement_command("L", &placement);
        assert!(cmd.contains("q 0 -1 1 0 10 180 cm /L Do"));

        placement.rotation_degrees = 270.0;
        let cmd = generate_placement_command("L", &placement);
        assert!(cmd.contains("q 0 1 -1 0 90 20 cm /L Do"));
    }
}
