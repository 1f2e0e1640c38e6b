// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! E2K → element graph
//!
//! Joins connectivity and assignment tables on the element id and
//! materializes one element per assignment row. A row that cannot be
//! resolved is reported and skipped; the pass always completes.

use crate::context::ImportContext;
use crate::levels::LevelResolver;
use crate::options::ExchangeOptions;
use crate::points::PointRegistry;
use e2k_model::{
    AreaAssignment, AreaAssignmentBody, AreaConnectivity, AreaKind, AreaSectionAssignment, Beam,
    Brace, Column, DiaphragmRef, ElementContainer, ElementKind, ExchangeStage, Floor, Grid,
    GridAxis, GridGeometry, GridPlacement, HostCatalog, ImportOutcome, LevelRef, LineAssignment,
    LineConnectivity, LineKind, NameLookup, Opening, Point2D, PropertyTable, SectionRef,
    SkipReason, Wall,
};
use e2k_parser::E2kDocument;

/// Element materialized from one line assignment row
enum LineElement {
    Beam(Beam),
    Column(Column),
    Brace(Brace),
}

/// Element materialized from one area assignment row
enum AreaElement {
    Wall(Wall),
    Floor(Floor),
    Opening(Opening),
}

/// Read-only inputs shared by every row of one import call
struct Scope<'a> {
    document: &'a E2kDocument,
    catalog: &'a HostCatalog,
    levels: &'a LevelResolver,
}

impl Scope<'_> {
    fn story(&self, story: &str) -> Result<&LevelRef, SkipReason> {
        self.levels
            .resolve(story)
            .ok_or_else(|| SkipReason::UnknownStory(story.to_string()))
    }

    /// Level below `top` when the record spans down a story, else `top`
    fn base_of(&self, top: &LevelRef, spans_below: bool) -> e2k_model::LevelId {
        if spans_below {
            self.levels
                .level_below(top.id)
                .map_or(top.id, |level| level.id)
        } else {
            top.id
        }
    }
}

fn section_ref(name: &str, table: &PropertyTable) -> Result<SectionRef, SkipReason> {
    if name.trim().is_empty() {
        return Err(SkipReason::MissingSection);
    }
    Ok(SectionRef::named(name).with_property(table.id_of(name)))
}

fn point_of(points: &PointRegistry, id: &str) -> Result<Point2D, SkipReason> {
    points
        .coordinate(id)
        .ok_or_else(|| SkipReason::MissingPoint(id.to_string()))
}

/// Imports E2K text into an element graph
pub struct Importer<'o> {
    options: &'o ExchangeOptions,
}

impl<'o> Importer<'o> {
    pub fn new(options: &'o ExchangeOptions) -> Self {
        Self { options }
    }

    /// Parse and import E2K text
    pub fn import(&self, content: &str, catalog: &HostCatalog) -> ImportOutcome {
        let mut ctx = ImportContext::new(self.options);
        ctx.advance(ExchangeStage::ParsingSections);
        let document = E2kDocument::parse(content);
        self.materialize(&document, catalog, ctx)
    }

    /// Import an already parsed document
    pub fn import_document(&self, document: &E2kDocument, catalog: &HostCatalog) -> ImportOutcome {
        let mut ctx = ImportContext::new(self.options);
        ctx.advance(ExchangeStage::ParsingSections);
        self.materialize(document, catalog, ctx)
    }

    fn materialize(
        &self,
        document: &E2kDocument,
        catalog: &HostCatalog,
        mut ctx: ImportContext,
    ) -> ImportOutcome {
        ctx.report.codec = document.stats.clone();

        let levels = if catalog.levels.is_empty() {
            LevelResolver::from_stories(&document.stories)
        } else {
            LevelResolver::new(catalog.levels.iter().cloned())
        };
        for point in document.points.iter() {
            ctx.points
                .register(point.id.clone(), Point2D::new(point.x, point.y));
        }
        ctx.advance(ExchangeStage::TableBuilt);
        log::debug!(
            "[Import] {} points, {} lines, {} areas, {} levels",
            ctx.points.len(),
            document.lines.len(),
            document.areas.len(),
            levels.len()
        );

        ctx.advance(ExchangeStage::Resolving);
        let scope = Scope {
            document,
            catalog,
            levels: &levels,
        };
        let mut elements = ElementContainer::new();
        self.import_lines(&scope, &mut ctx, &mut elements);
        self.import_areas(&scope, &mut ctx, &mut elements);
        self.import_grids(&scope, &mut ctx, &mut elements);
        Self::collect_unassigned(document, &mut ctx);

        ctx.advance(ExchangeStage::Materialized);
        log::debug!(
            "[Import] {} elements, {} skipped",
            elements.len(),
            ctx.report.skipped.len()
        );
        ctx.advance(ExchangeStage::Done);

        ImportOutcome {
            elements,
            levels: levels.levels().to_vec(),
            report: ctx.report,
        }
    }

    // ------------------------------------------------------------------------
    // Line elements
    // ------------------------------------------------------------------------

    fn import_lines(&self, scope: &Scope, ctx: &mut ImportContext, elements: &mut ElementContainer) {
        for (id, rows) in scope.document.line_assigns.iter() {
            let Some(conn) = scope.document.lines.get(id) else {
                let kind = ElementKind::from_id_prefix(id)
                    .filter(ElementKind::is_line)
                    .unwrap_or(ElementKind::Beam);
                for row in rows {
                    ctx.skip(
                        kind,
                        id,
                        Some(&row.story),
                        SkipReason::OrphanedAssignment(id.to_string()),
                    );
                }
                continue;
            };

            let kind = match conn.kind {
                LineKind::Beam => ElementKind::Beam,
                LineKind::Column => ElementKind::Column,
                LineKind::Brace => ElementKind::Brace,
            };

            let mut columns = Vec::new();
            for row in rows {
                match Self::line_element(scope, &ctx.points, conn, row) {
                    Ok(LineElement::Beam(beam)) => {
                        ctx.created(ElementKind::Beam);
                        elements.beams.push(beam);
                    }
                    Ok(LineElement::Column(column)) => columns.push(column),
                    Ok(LineElement::Brace(brace)) => {
                        ctx.created(ElementKind::Brace);
                        elements.braces.push(brace);
                    }
                    Err(reason) => ctx.skip(kind, id, Some(&row.story), reason),
                }
            }

            if self.options.merge_column_stacks && columns.len() > 1 {
                columns = merge_column_stack(columns, scope.levels);
            }
            for column in columns {
                ctx.created(ElementKind::Column);
                elements.columns.push(column);
            }
        }
    }

    fn line_element(
        scope: &Scope,
        points: &PointRegistry,
        conn: &LineConnectivity,
        row: &LineAssignment,
    ) -> Result<LineElement, SkipReason> {
        let start = point_of(points, &conn.start)?;
        let end = point_of(points, &conn.end)?;
        let top = scope.story(&row.story)?;
        let section = section_ref(&row.section, &scope.catalog.frame_sections)?;

        match conn.kind {
            LineKind::Beam => {
                if start.coincides(&end) {
                    return Err(SkipReason::degenerate(format!(
                        "beam ends \"{}\" and \"{}\" coincide",
                        conn.start, conn.end
                    )));
                }
                let mut beam = Beam::new(start, end, top.id, section);
                if let Some(release) = &row.release {
                    beam = beam.with_release(release.clone());
                }
                Ok(LineElement::Beam(beam))
            }
            LineKind::Column => {
                let base = scope.base_of(top, conn.spans_story_below());
                Ok(LineElement::Column(Column::new(start, end, base, top.id, section)))
            }
            LineKind::Brace => {
                let base = scope.base_of(top, conn.spans_story_below());
                if base == top.id && start.coincides(&end) {
                    return Err(SkipReason::degenerate(format!(
                        "brace ends \"{}\" and \"{}\" coincide on one level",
                        conn.start, conn.end
                    )));
                }
                Ok(LineElement::Brace(Brace::new(start, end, base, top.id, section)))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Area elements
    // ------------------------------------------------------------------------

    fn import_areas(&self, scope: &Scope, ctx: &mut ImportContext, elements: &mut ElementContainer) {
        for (id, rows) in scope.document.area_assigns.iter() {
            let Some(conn) = scope.document.areas.get(id) else {
                let kind = ElementKind::from_id_prefix(id)
                    .filter(ElementKind::is_area)
                    .unwrap_or(ElementKind::Floor);
                for row in rows {
                    ctx.skip(
                        kind,
                        id,
                        Some(&row.story),
                        SkipReason::OrphanedAssignment(id.to_string()),
                    );
                }
                continue;
            };

            let kind = match conn.kind {
                AreaKind::Panel => ElementKind::Wall,
                AreaKind::Floor if rows.iter().any(AreaAssignment::is_opening) => {
                    ElementKind::Opening
                }
                AreaKind::Floor => ElementKind::Floor,
            };

            let polygon = match polygon(conn, kind, &ctx.points) {
                Ok(polygon) => polygon,
                Err(reason) => {
                    for row in rows {
                        ctx.skip(kind, id, Some(&row.story), reason.clone());
                    }
                    continue;
                }
            };

            for row in rows {
                match Self::area_element(scope, conn, kind, &polygon, row, rows) {
                    Ok(Some(AreaElement::Wall(wall))) => {
                        ctx.created(ElementKind::Wall);
                        elements.walls.push(wall);
                    }
                    Ok(Some(AreaElement::Floor(floor))) => {
                        ctx.created(ElementKind::Floor);
                        elements.floors.push(floor);
                    }
                    Ok(Some(AreaElement::Opening(opening))) => {
                        ctx.created(ElementKind::Opening);
                        elements.openings.push(opening);
                    }
                    Ok(None) => {}
                    Err(reason) => ctx.skip(kind, id, Some(&row.story), reason),
                }
            }
        }
    }

    fn area_element(
        scope: &Scope,
        conn: &AreaConnectivity,
        kind: ElementKind,
        polygon: &[Point2D],
        row: &AreaAssignment,
        rows: &[AreaAssignment],
    ) -> Result<Option<AreaElement>, SkipReason> {
        let level = scope.story(&row.story)?;

        match (&row.body, kind) {
            (AreaAssignmentBody::Section(attrs), ElementKind::Wall) => {
                let section = section_ref(&attrs.section, &scope.catalog.wall_sections)?;
                let base = scope.base_of(level, conn.spans_story_below());
                Ok(Some(AreaElement::Wall(Wall::new(
                    polygon.to_vec(),
                    base,
                    level.id,
                    section,
                ))))
            }
            (AreaAssignmentBody::Section(attrs), ElementKind::Floor) => {
                Self::floor(scope, level, polygon, attrs, rows).map(|f| Some(AreaElement::Floor(f)))
            }
            (AreaAssignmentBody::Opening, ElementKind::Opening) => Ok(Some(AreaElement::Opening(
                Opening::new(polygon.to_vec(), level.id),
            ))),
            // consumed by the floor row on the same level
            (AreaAssignmentBody::Diaphragm(_), ElementKind::Floor) => Ok(None),
            (AreaAssignmentBody::Section(_), _) => Err(SkipReason::Inapplicable(format!(
                "section row on {}",
                kind
            ))),
            (AreaAssignmentBody::Diaphragm(_), _) => Err(SkipReason::Inapplicable(format!(
                "diaphragm row on {}",
                kind
            ))),
            (AreaAssignmentBody::Opening, _) => Err(SkipReason::Inapplicable(format!(
                "opening row on {}",
                kind
            ))),
        }
    }

    fn floor(
        scope: &Scope,
        level: &LevelRef,
        polygon: &[Point2D],
        attrs: &AreaSectionAssignment,
        rows: &[AreaAssignment],
    ) -> Result<Floor, SkipReason> {
        let section = section_ref(&attrs.section, &scope.catalog.floor_sections)?;
        let mut floor = Floor::new(polygon.to_vec(), level.id, section);

        let diaphragm = rows.iter().find_map(|row| match &row.body {
            AreaAssignmentBody::Diaphragm(name)
                if scope.levels.resolve(&row.story).map(|l| l.id) == Some(level.id) =>
            {
                Some(name)
            }
            _ => None,
        });
        if let Some(name) = diaphragm {
            floor = floor.with_diaphragm(DiaphragmRef {
                id: scope.catalog.diaphragms.id_of(name),
                name: name.clone(),
            });
        }

        Ok(floor)
    }

    // ------------------------------------------------------------------------
    // Grids and leftovers
    // ------------------------------------------------------------------------

    fn import_grids(&self, scope: &Scope, ctx: &mut ImportContext, elements: &mut ElementContainer) {
        for record in &scope.document.grids {
            let geometry = match &record.placement {
                GridPlacement::Axis {
                    direction,
                    coordinate,
                } => GridGeometry::Axis {
                    axis: if direction.eq_ignore_ascii_case("Y") {
                        GridAxis::Y
                    } else {
                        GridAxis::X
                    },
                    coordinate: *coordinate,
                },
                GridPlacement::General { x1, y1, x2, y2 } => {
                    let start = Point2D::new(*x1, *y1);
                    let end = Point2D::new(*x2, *y2);
                    if start.coincides(&end) {
                        ctx.skip(
                            ElementKind::Grid,
                            &record.label,
                            None,
                            SkipReason::degenerate("grid ends coincide"),
                        );
                        continue;
                    }
                    GridGeometry::Segment { start, end }
                }
            };

            ctx.created(ElementKind::Grid);
            elements
                .grids
                .push(Grid::new(record.system.clone(), record.label.clone(), geometry));
        }
    }

    fn collect_unassigned(document: &E2kDocument, ctx: &mut ImportContext) {
        let lines = document
            .lines
            .iter()
            .map(|l| l.id.as_str())
            .filter(|id| !document.line_assigns.contains(id));
        let areas = document
            .areas
            .iter()
            .map(|a| a.id.as_str())
            .filter(|id| !document.area_assigns.contains(id));

        ctx.report.unassigned = lines.chain(areas).map(str::to_string).collect();
        if !ctx.report.unassigned.is_empty() {
            log::debug!(
                "[Import] {} connectivities have no assignment rows",
                ctx.report.unassigned.len()
            );
        }
    }
}

/// Coordinates of an area's points, checked for the kind's minimum size
///
/// A panel repeating its first point at the end is opened again, since
/// export closes every panel.
fn polygon(
    conn: &AreaConnectivity,
    kind: ElementKind,
    points: &PointRegistry,
) -> Result<Vec<Point2D>, SkipReason> {
    let mut ids: &[String] = &conn.points;
    if conn.kind == AreaKind::Panel && ids.len() > 2 && ids.first() == ids.last() {
        ids = &ids[..ids.len() - 1];
    }

    let polygon = ids
        .iter()
        .map(|id| point_of(points, id))
        .collect::<Result<Vec<_>, _>>()?;

    let minimum = if kind == ElementKind::Wall { 2 } else { 3 };
    if polygon.len() < minimum {
        return Err(SkipReason::degenerate(format!(
            "{} points, {} needs at least {}",
            polygon.len(),
            kind,
            minimum
        )));
    }
    if polygon.iter().all(|p| p.coincides(&polygon[0])) {
        return Err(SkipReason::degenerate("all points coincide"));
    }

    Ok(polygon)
}

/// Merge one connectivity's stacked single-story columns
///
/// Columns are ordered by base level; a column whose base is the previous
/// column's top, with the same section and plan location, extends it.
fn merge_column_stack(mut columns: Vec<Column>, levels: &LevelResolver) -> Vec<Column> {
    columns.sort_by_key(|c| levels.index_of(c.base_level).unwrap_or(usize::MAX));

    let mut merged: Vec<Column> = Vec::with_capacity(columns.len());
    for column in columns {
        match merged.last_mut() {
            Some(last)
                if last.top_level == column.base_level
                    && last.section.name == column.section.name
                    && last.start.coincides(&column.start)
                    && last.end.coincides(&column.end) =>
            {
                last.top_level = column.top_level;
            }
            _ => merged.push(column),
        }
    }

    log::debug!("[Import] Column stack merged into {} columns", merged.len());
    merged
}
