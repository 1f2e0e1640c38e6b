// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element graph → E2K
//!
//! Kinds are written in a fixed order (grids, columns, walls, floors,
//! openings, beams, braces) so that beam and brace ends can snap to the
//! points laid down by everything before them. Each element is validated
//! in full before it gets an id or interns a point, so a skipped element
//! leaves no trace in the output.

use crate::context::ExportContext;
use crate::levels::LevelResolver;
use crate::options::ExchangeOptions;
use crate::span::{SpanExpander, SpanStep};
use e2k_model::{
    AreaAssignment, AreaAssignmentBody, AreaConnectivity, AreaKind, AreaSectionAssignment, Beam,
    Brace, Column, DiaphragmRecord, ElementContainer, ElementId, ElementKind, ExchangeStage,
    ExportOutcome, ExportReport, Floor, Grid, GridGeometry, GridPlacement, GridRecord, HostCatalog,
    LineAssignment, LineConnectivity, LineKind, MeshSpec, NameLookup, Opening, Point2D,
    PropertyTable, SectionRef, SkipReason, Wall,
};
use e2k_parser::E2kDocument;

/// Rigidity written for every diaphragm definition
const DIAPHRAGM_RIGIDITY: &str = "RIGID";

/// Section name for a reference, preferring the host property table
fn section_name(section: &SectionRef, table: &PropertyTable) -> Result<String, SkipReason> {
    if let Some(id) = section.property {
        if let Some(name) = table.name_of(id) {
            return Ok(name.to_string());
        }
        if section.name.trim().is_empty() {
            return Err(SkipReason::MissingProperty(id));
        }
    }
    if section.name.trim().is_empty() {
        Err(SkipReason::MissingSection)
    } else {
        Ok(section.name.clone())
    }
}

/// Polygon with at least `minimum` points that do not all coincide
fn check_polygon(points: &[Point2D], minimum: usize) -> Result<(), SkipReason> {
    if points.len() < minimum {
        return Err(SkipReason::degenerate(format!(
            "{} points, at least {} needed",
            points.len(),
            minimum
        )));
    }
    if points.iter().all(|p| p.coincides(&points[0])) {
        return Err(SkipReason::degenerate("all points coincide"));
    }
    Ok(())
}

/// One export call over a fixed level list and catalog
struct ExportPass<'a, 'o> {
    ctx: ExportContext<'o>,
    document: E2kDocument,
    levels: &'a LevelResolver,
    catalog: &'a HostCatalog,
    /// Diaphragm names referenced by emitted floors, first use first
    diaphragms: Vec<String>,
}

impl<'a, 'o> ExportPass<'a, 'o> {
    fn options(&self) -> &'o ExchangeOptions {
        self.ctx.options()
    }

    fn expander(&self) -> SpanExpander<'a> {
        SpanExpander::new(self.levels, self.options().span_fallback)
    }

    fn run<T>(
        &mut self,
        kind: ElementKind,
        elements: &[T],
        id_of: impl Fn(&T) -> ElementId,
        mut write: impl FnMut(&mut Self, &T) -> Result<(), SkipReason>,
    ) {
        for element in elements {
            let id = id_of(element);
            if let Some(written) = self.ctx.id_of(id).map(str::to_string) {
                self.ctx.skip(kind, id, SkipReason::DuplicateElement(written));
                continue;
            }
            if let Err(reason) = write(self, element) {
                self.ctx.skip(kind, id, reason);
            }
        }
    }

    fn area_attrs(&self, section: String, cardinal_point: &str) -> AreaSectionAssignment {
        let mesh = &self.options().mesh;
        AreaSectionAssignment {
            section,
            mesh_type: Some(mesh.area_mesh_type.clone()),
            add_restraint: Some(mesh.add_restraint),
            cardinal_point: Some(cardinal_point.to_string()),
            transform_stiffness: Some(mesh.transform_stiffness),
            extra: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Per-kind writers
    // ------------------------------------------------------------------------

    fn grid(&mut self, grid: &Grid) -> Result<(), SkipReason> {
        let placement = match &grid.geometry {
            GridGeometry::Axis { axis, coordinate } => GridPlacement::Axis {
                direction: axis.keyword().to_string(),
                coordinate: *coordinate,
            },
            GridGeometry::Segment { start, end } => {
                if start.coincides(end) {
                    return Err(SkipReason::degenerate("grid ends coincide"));
                }
                self.ctx.intern(*start);
                self.ctx.intern(*end);
                GridPlacement::General {
                    x1: start.x,
                    y1: start.y,
                    x2: end.x,
                    y2: end.y,
                }
            }
        };

        self.ctx.assign_id(grid.id, ElementKind::Grid);
        self.document.grids.push(GridRecord {
            system: grid.system.clone(),
            label: grid.label.clone(),
            placement,
        });
        Ok(())
    }

    fn column(&mut self, column: &Column) -> Result<(), SkipReason> {
        let section = section_name(&column.section, &self.catalog.frame_sections)?;
        let steps = self
            .expander()
            .expand(column.base_level, column.top_level)?;
        let offset = SpanExpander::story_offset(&steps, column.base_level);

        let id = self.ctx.assign_id(column.id, ElementKind::Column);
        let start = self.ctx.intern(column.start);
        let end = self.ctx.intern(column.end);
        self.document.lines.insert(LineConnectivity {
            id: id.clone(),
            kind: LineKind::Column,
            start: start.0,
            end: end.0,
            story_offset: offset,
        });

        let options = self.options();
        for step in &steps {
            let mut row = self.frame_row(&id, step, &section);
            row.release = options.releases.for_column(step.row).map(str::to_string);
            row.mesh = Some(MeshSpec::MinStations(options.mesh.min_stations));
            self.document.line_assigns.push(row);
        }
        Ok(())
    }

    fn wall(&mut self, wall: &Wall) -> Result<(), SkipReason> {
        check_polygon(&wall.points, 2)?;
        let section = section_name(&wall.section, &self.catalog.wall_sections)?;
        let steps = self.expander().expand(wall.base_level, wall.top_level)?;
        let offset = SpanExpander::story_offset(&steps, wall.base_level);

        let id = self.ctx.assign_id(wall.id, ElementKind::Wall);
        let points: Vec<String> = wall.points.iter().map(|p| self.ctx.intern(*p).0).collect();
        self.document.areas.insert(AreaConnectivity {
            id: id.clone(),
            kind: AreaKind::Panel,
            story_offsets: vec![offset; points.len()],
            points,
        });

        let cardinal_point = &self.options().mesh.wall_cardinal_point;
        for step in &steps {
            let attrs = self.area_attrs(section.clone(), cardinal_point);
            self.document.area_assigns.push(AreaAssignment {
                id: id.clone(),
                story: step.level.name.clone(),
                body: AreaAssignmentBody::Section(attrs),
            });
        }
        Ok(())
    }

    fn floor(&mut self, floor: &Floor) -> Result<(), SkipReason> {
        check_polygon(&floor.points, 3)?;
        let section = section_name(&floor.section, &self.catalog.floor_sections)?;
        let steps = self.expander().single(floor.level)?;
        let story = steps[0].level.name.clone();
        let diaphragm = self.diaphragm_name(floor);

        let id = self.ctx.assign_id(floor.id, ElementKind::Floor);
        self.slab(&id, &floor.points);

        let attrs = self.area_attrs(section, &self.options().mesh.floor_cardinal_point);
        self.document.area_assigns.push(AreaAssignment {
            id: id.clone(),
            story: story.clone(),
            body: AreaAssignmentBody::Section(attrs),
        });
        self.document.area_assigns.push(AreaAssignment {
            id,
            story,
            body: AreaAssignmentBody::Diaphragm(diaphragm),
        });
        Ok(())
    }

    fn opening(&mut self, opening: &Opening) -> Result<(), SkipReason> {
        check_polygon(&opening.points, 3)?;
        let steps = self.expander().single(opening.level)?;
        let story = steps[0].level.name.clone();

        let id = self.ctx.assign_id(opening.id, ElementKind::Opening);
        self.slab(&id, &opening.points);
        self.document.area_assigns.push(AreaAssignment {
            id,
            story,
            body: AreaAssignmentBody::Opening,
        });
        Ok(())
    }

    fn beam(&mut self, beam: &Beam) -> Result<(), SkipReason> {
        let section = section_name(&beam.section, &self.catalog.frame_sections)?;
        let steps = self.expander().single(beam.level)?;
        if beam.start.coincides(&beam.end) {
            return Err(SkipReason::degenerate("beam ends coincide"));
        }

        let id = self.ctx.assign_id(beam.id, ElementKind::Beam);
        let start = self.ctx.end_point(beam.id, ElementKind::Beam, beam.start);
        let end = self.ctx.end_point(beam.id, ElementKind::Beam, beam.end);
        self.document.lines.insert(LineConnectivity {
            id: id.clone(),
            kind: LineKind::Beam,
            start: start.0,
            end: end.0,
            story_offset: 0,
        });

        let mut row = self.frame_row(&id, &steps[0], &section);
        row.release = beam.release.clone();
        row.mesh = Some(MeshSpec::MaxStationSpacing(
            self.options().mesh.beam_max_station_spacing,
        ));
        self.document.line_assigns.push(row);
        Ok(())
    }

    fn brace(&mut self, brace: &Brace) -> Result<(), SkipReason> {
        let section = section_name(&brace.section, &self.catalog.frame_sections)?;
        let steps = self.expander().expand(brace.base_level, brace.top_level)?;
        if brace.base_level == brace.top_level && brace.start.coincides(&brace.end) {
            return Err(SkipReason::degenerate("brace ends coincide on one level"));
        }
        let offset = SpanExpander::story_offset(&steps, brace.base_level);

        let id = self.ctx.assign_id(brace.id, ElementKind::Brace);
        let start = self.ctx.end_point(brace.id, ElementKind::Brace, brace.start);
        let end = self.ctx.end_point(brace.id, ElementKind::Brace, brace.end);
        self.document.lines.insert(LineConnectivity {
            id: id.clone(),
            kind: LineKind::Brace,
            start: start.0,
            end: end.0,
            story_offset: offset,
        });

        let options = self.options();
        for step in &steps {
            let mut row = self.frame_row(&id, step, &section);
            row.release = options.releases.for_brace().map(str::to_string);
            row.mesh = Some(MeshSpec::MinStations(options.mesh.min_stations));
            self.document.line_assigns.push(row);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Shared pieces
    // ------------------------------------------------------------------------

    fn frame_row(&self, id: &str, step: &SpanStep<'_>, section: &str) -> LineAssignment {
        let mesh = &self.options().mesh;
        let mut row = LineAssignment::new(id, step.level.name.clone(), section);
        row.auto_mesh = Some(mesh.auto_mesh);
        row.mesh_at_intersections = Some(mesh.mesh_at_intersections);
        row
    }

    /// `AREA ... FLOOR` record with zero offsets
    fn slab(&mut self, id: &str, polygon: &[Point2D]) {
        let points: Vec<String> = polygon.iter().map(|p| self.ctx.intern(*p).0).collect();
        self.document.areas.insert(AreaConnectivity {
            id: id.to_string(),
            kind: AreaKind::Floor,
            story_offsets: vec![0; points.len()],
            points,
        });
    }

    /// Diaphragm written for a floor: catalog name, own name, or the default
    fn diaphragm_name(&mut self, floor: &Floor) -> String {
        let catalog = self.catalog;
        if let Some(diaphragm) = &floor.diaphragm {
            if let Some(name) = diaphragm.id.and_then(|id| catalog.diaphragms.name_of(id)) {
                return self.use_diaphragm(name.to_string());
            }
            if !diaphragm.name.trim().is_empty() {
                return self.use_diaphragm(diaphragm.name.clone());
            }
            if let Some(id) = diaphragm.id {
                log::warn!(
                    "[Export] Diaphragm {} of floor {} is not in the catalog",
                    id,
                    floor.id
                );
            }
        }
        self.ctx.report.used_default_diaphragm = true;
        self.use_diaphragm(self.options().default_diaphragm.clone())
    }

    fn use_diaphragm(&mut self, name: String) -> String {
        if !self.diaphragms.contains(&name) {
            self.diaphragms.push(name.clone());
        }
        name
    }

    /// Header sections and the point table, once every element is written
    fn finish_tables(&mut self) {
        let options = self.options();

        if options.write_stories {
            self.document.stories = self.levels.to_story_records();
        }
        if !options.write_grids {
            self.document.grids.clear();
        }
        if options.write_diaphragms {
            let catalog_names = self.catalog.diaphragms.iter().map(|(_, name)| name);
            for name in catalog_names.chain(self.diaphragms.iter().map(String::as_str)) {
                if !self.document.diaphragms.contains(name) {
                    self.document.diaphragms.insert(DiaphragmRecord {
                        name: name.to_string(),
                        rigidity: DIAPHRAGM_RIGIDITY.to_string(),
                    });
                }
            }
        }

        for record in self.ctx.points.to_records() {
            self.document.points.insert(record);
        }
        self.ctx.report.point_count = self.ctx.points.len();
    }
}

/// Exports an element graph as E2K text
pub struct Exporter<'o> {
    options: &'o ExchangeOptions,
}

impl<'o> Exporter<'o> {
    pub fn new(options: &'o ExchangeOptions) -> Self {
        Self { options }
    }

    /// Export to E2K text
    pub fn export(&self, elements: &ElementContainer, catalog: &HostCatalog) -> ExportOutcome {
        let levels = LevelResolver::new(catalog.levels.iter().cloned());
        let mut pass = self.build(elements, catalog, &levels);

        pass.ctx.advance(ExchangeStage::Emitting);
        let text = pass.document.to_e2k(&self.options.emit);
        pass.ctx.advance(ExchangeStage::Done);
        log::info!(
            "[Export] {} bytes, {} ids, {} points, {} skipped",
            text.len(),
            pass.ctx.report.ids.len(),
            pass.ctx.report.point_count,
            pass.ctx.report.skipped.len()
        );

        ExportOutcome {
            text,
            report: pass.ctx.report,
        }
    }

    /// Build the E2K document without emitting text
    pub fn export_document(
        &self,
        elements: &ElementContainer,
        catalog: &HostCatalog,
    ) -> (E2kDocument, ExportReport) {
        let levels = LevelResolver::new(catalog.levels.iter().cloned());
        let pass = self.build(elements, catalog, &levels);
        (pass.document, pass.ctx.report)
    }

    fn build<'a>(
        &self,
        elements: &ElementContainer,
        catalog: &'a HostCatalog,
        levels: &'a LevelResolver,
    ) -> ExportPass<'a, 'o> {
        let mut pass = ExportPass {
            ctx: ExportContext::new(self.options),
            document: E2kDocument::new(),
            levels,
            catalog,
            diaphragms: Vec::new(),
        };
        pass.ctx.advance(ExchangeStage::Resolving);

        for kind in ElementKind::ALL {
            match kind {
                ElementKind::Grid if self.options.write_grids => {
                    pass.run(kind, &elements.grids, |g| g.id, ExportPass::grid)
                }
                ElementKind::Grid => {}
                ElementKind::Column => {
                    pass.run(kind, &elements.columns, |c| c.id, ExportPass::column)
                }
                ElementKind::Wall => pass.run(kind, &elements.walls, |w| w.id, ExportPass::wall),
                ElementKind::Floor => pass.run(kind, &elements.floors, |f| f.id, ExportPass::floor),
                ElementKind::Opening => {
                    pass.run(kind, &elements.openings, |o| o.id, ExportPass::opening)
                }
                ElementKind::Beam => pass.run(kind, &elements.beams, |b| b.id, ExportPass::beam),
                ElementKind::Brace => {
                    pass.run(kind, &elements.braces, |b| b.id, ExportPass::brace)
                }
            }
        }

        pass.finish_tables();
        pass.ctx.advance(ExchangeStage::Materialized);
        log::debug!(
            "[Export] {} lines, {} areas, {} points",
            pass.document.lines.len(),
            pass.document.areas.len(),
            pass.ctx.points.len()
        );
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PointMatching;
    use e2k_model::{DiaphragmId, DiaphragmRef, LevelId, LevelRef, PropertyId};

    fn catalog() -> HostCatalog {
        HostCatalog::new()
            .with_level(LevelRef::new(LevelId(1), "Base", 0.0))
            .with_level(LevelRef::new(LevelId(2), "Story1", 144.0))
            .with_level(LevelRef::new(LevelId(3), "Story2", 288.0))
            .with_level(LevelRef::new(LevelId(4), "Story3", 432.0))
            .with_frame_section(PropertyId(1), "W14X90")
            .with_diaphragm(DiaphragmId(1), "D1")
            .with_diaphragm(DiaphragmId(2), "D2")
    }

    fn square(size: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(size, 0.0),
            Point2D::new(size, size),
            Point2D::new(0.0, size),
        ]
    }

    fn export(elements: &ElementContainer) -> (E2kDocument, ExportReport) {
        let options = ExchangeOptions::default();
        Exporter::new(&options).export_document(elements, &catalog())
    }

    #[test]
    fn test_column_span_rows() {
        let mut elements = ElementContainer::new();
        elements.columns.push(Column::vertical(
            Point2D::new(0.0, 0.0),
            LevelId(1),
            LevelId(4),
            SectionRef::property(PropertyId(1)),
        ));

        let (document, report) = export(&elements);
        let line = document.lines.get("C1").unwrap();
        assert_eq!(line.story_offset, 1);
        assert_eq!(line.start, line.end);

        let rows = document.line_assigns.rows("C1");
        let stories: Vec<_> = rows.iter().map(|r| r.story.as_str()).collect();
        assert_eq!(stories, vec!["Story1", "Story2", "Story3"]);
        assert_eq!(rows[0].section, "W14X90");
        assert_eq!(rows[0].release.as_deref(), Some("M2I M3I"));
        assert_eq!(rows[1].release.as_deref(), Some("PINNED"));
        assert_eq!(rows[2].mesh, Some(MeshSpec::MinStations(3)));

        assert_eq!(report.point_count, 1);
        assert_eq!(report.stage, ExchangeStage::Materialized);
    }

    #[test]
    fn test_single_level_column() {
        let mut elements = ElementContainer::new();
        elements.columns.push(Column::vertical(
            Point2D::new(0.0, 0.0),
            LevelId(3),
            LevelId(3),
            SectionRef::named("W14X90"),
        ));

        let (document, _) = export(&elements);
        assert_eq!(document.lines.get("C1").map(|l| l.story_offset), Some(0));
        assert_eq!(document.line_assigns.rows("C1").len(), 1);
        assert_eq!(document.line_assigns.rows("C1")[0].story, "Story2");
    }

    #[test]
    fn test_shared_floor_corner() {
        let mut elements = ElementContainer::new();
        elements.floors.push(
            Floor::new(square(10.0), LevelId(2), SectionRef::named("SLAB6"))
                .with_diaphragm(DiaphragmRef::named("D2")),
        );
        let shifted: Vec<_> = square(10.0)
            .into_iter()
            .map(|p| Point2D::new(p.x + 10.0, p.y + 10.0))
            .collect();
        elements
            .floors
            .push(Floor::new(shifted, LevelId(2), SectionRef::named("SLAB6")));

        let (document, report) = export(&elements);
        assert_eq!(report.point_count, 7);

        let f1 = document.areas.get("F1").unwrap();
        let f2 = document.areas.get("F2").unwrap();
        assert_eq!(f1.points[2], f2.points[0]);

        let diaphragms: Vec<_> = document
            .area_assigns
            .iter()
            .flat_map(|(_, rows)| rows)
            .filter_map(|r| match &r.body {
                AreaAssignmentBody::Diaphragm(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(diaphragms, vec!["D2", "D1"]);
        assert!(report.used_default_diaphragm);
        assert_eq!(document.diaphragms.len(), 2);
    }

    #[test]
    fn test_wall_and_opening() {
        let mut elements = ElementContainer::new();
        elements.walls.push(Wall::new(
            vec![Point2D::new(0.0, 0.0), Point2D::new(240.0, 0.0)],
            LevelId(1),
            LevelId(3),
            SectionRef::named("WALL8"),
        ));
        elements
            .openings
            .push(Opening::new(square(24.0), LevelId(2)));

        let (document, _) = export(&elements);
        let wall = document.areas.get("W1").unwrap();
        assert_eq!(wall.kind, AreaKind::Panel);
        assert_eq!(wall.story_offsets, vec![1, 1]);
        assert_eq!(document.area_assigns.rows("W1").len(), 2);

        let opening_rows = document.area_assigns.rows("O1");
        assert_eq!(opening_rows.len(), 1);
        assert!(opening_rows[0].is_opening());
        assert_eq!(opening_rows[0].story, "Story1");
    }

    #[test]
    fn test_skipped_elements_leave_no_trace() {
        let mut elements = ElementContainer::new();
        elements.beams.push(Beam::new(
            Point2D::new(500.0, 500.0),
            Point2D::new(600.0, 500.0),
            LevelId(99),
            SectionRef::named("W12X26"),
        ));
        elements.beams.push(Beam::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 0.0),
            LevelId(2),
            SectionRef::named("W12X26"),
        ));
        elements.beams.push(Beam::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(120.0, 0.0),
            LevelId(2),
            SectionRef::property(PropertyId(42)),
        ));
        elements
            .floors
            .push(Floor::new(square(10.0)[..2].to_vec(), LevelId(2), SectionRef::named("S")));

        let (document, report) = export(&elements);
        assert!(document.lines.is_empty());
        assert!(document.areas.is_empty());
        assert_eq!(report.point_count, 0);
        assert!(report.ids.is_empty());

        let reasons: Vec<_> = report.skipped.iter().map(|s| s.reason.clone()).collect();
        assert!(matches!(reasons[0], SkipReason::DegenerateGeometry(_)));
        assert_eq!(reasons[1], SkipReason::UnknownLevel(LevelId(99)));
        assert!(matches!(reasons[2], SkipReason::DegenerateGeometry(_)));
        assert_eq!(reasons[3], SkipReason::MissingProperty(PropertyId(42)));
    }

    #[test]
    fn test_repeated_element_written_once() {
        let mut elements = ElementContainer::new();
        let beam = Beam::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(120.0, 0.0),
            LevelId(2),
            SectionRef::named("W12X26"),
        );
        let mut moved = beam.clone();
        moved.end = Point2D::new(240.0, 0.0);
        elements.beams.push(beam);
        elements.beams.push(moved);

        let (document, report) = export(&elements);
        assert_eq!(document.lines.len(), 1);
        assert_eq!(document.lines.get("B1").unwrap().end, "2");
        assert_eq!(document.line_assigns.rows("B1").len(), 1);
        assert_eq!(report.point_count, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::DuplicateElement("B1".to_string())
        );
    }

    #[test]
    fn test_snap_to_existing() {
        let options = ExchangeOptions::default().with_point_matching(PointMatching::SnapToExisting);
        let mut elements = ElementContainer::new();
        elements.columns.push(Column::vertical(
            Point2D::new(0.0, 0.0),
            LevelId(1),
            LevelId(2),
            SectionRef::named("W14X90"),
        ));
        elements.beams.push(Beam::new(
            Point2D::new(0.05, 0.0),
            Point2D::new(120.0, 0.0),
            LevelId(2),
            SectionRef::named("W12X26"),
        ));

        let (document, report) = Exporter::new(&options).export_document(&elements, &catalog());
        let beam = document.lines.get("B1").unwrap();
        assert_eq!(beam.start, "1");
        assert_eq!(beam.end, "0");
        assert_eq!(report.unresolved_points.len(), 1);
        assert_eq!(report.point_count, 1);
    }

    #[test]
    fn test_grids_and_stories() {
        let mut elements = ElementContainer::new();
        elements.grids.push(Grid::new(
            "G1",
            "A",
            GridGeometry::Axis {
                axis: e2k_model::GridAxis::X,
                coordinate: 0.0,
            },
        ));
        elements.grids.push(Grid::segment(
            "1",
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 240.0),
        ));

        let (document, report) = export(&elements);
        assert_eq!(document.grids.len(), 2);
        assert_eq!(report.point_count, 2);
        assert_eq!(document.stories.len(), 4);
        assert_eq!(document.stories[0].name, "Story3");

        let options = ExchangeOptions::default().with_sections(false, false, false);
        let (document, report) = Exporter::new(&options).export_document(&elements, &catalog());
        assert!(document.grids.is_empty());
        assert!(document.stories.is_empty());
        assert!(document.diaphragms.is_empty());
        assert_eq!(report.point_count, 0);
    }

    #[test]
    fn test_export_text() {
        let options = ExchangeOptions::default();
        let mut elements = ElementContainer::new();
        elements.beams.push(Beam::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(120.0, 0.0),
            LevelId(2),
            SectionRef::named("W12X26"),
        ));

        let outcome = Exporter::new(&options).export(&elements, &catalog());
        assert_eq!(outcome.report.stage, ExchangeStage::Done);
        assert!(outcome.text.contains("LINE  \"B1\"  BEAM  \"1\"  \"2\"  0"));
        assert!(outcome.text.contains("MAXSTASPC  24"));
    }
}
