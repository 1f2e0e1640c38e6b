// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-call exchange state
//!
//! Everything that lives for exactly one import or export call: the stage,
//! the point registry, the emitted id map and the report being filled in.
//! A context is created at the start of a call and consumed at its end.

use crate::options::{ExchangeOptions, PointMatching};
use crate::points::PointRegistry;
use e2k_model::{
    ElementId, ElementKind, ExchangeStage, ExportReport, ImportReport, Point2D, PointId,
    SkipReason, SkippedEntry, UnresolvedPoint,
};
use rustc_hash::FxHashMap;

fn skipped_entry(
    tag: &str,
    kind: ElementKind,
    source: String,
    story: Option<&str>,
    reason: SkipReason,
) -> SkippedEntry {
    match story {
        Some(story) => log::warn!("[{}] Skipping {} {} @ {}: {}", tag, kind, source, story, reason),
        None => log::warn!("[{}] Skipping {} {}: {}", tag, kind, source, reason),
    }
    SkippedEntry {
        kind,
        source,
        story: story.map(str::to_string),
        reason,
    }
}

/// State of one import call
#[derive(Debug, Default)]
pub struct ImportContext {
    pub points: PointRegistry,
    pub report: ImportReport,
}

impl ImportContext {
    pub fn new(options: &ExchangeOptions) -> Self {
        Self {
            points: PointRegistry::with_tolerances(
                options.exact_tolerance,
                options.fallback_tolerance,
            ),
            report: ImportReport::default(),
        }
    }

    pub fn stage(&self) -> ExchangeStage {
        self.report.stage
    }

    /// Move to a later stage
    pub fn advance(&mut self, stage: ExchangeStage) {
        debug_assert!(stage > self.report.stage, "stages only move forward");
        log::debug!("[Import] {} -> {}", self.report.stage, stage);
        self.report.stage = stage;
    }

    /// Record a skipped element or row
    pub fn skip(
        &mut self,
        kind: ElementKind,
        source: &str,
        story: Option<&str>,
        reason: SkipReason,
    ) {
        let entry = skipped_entry("Import", kind, source.to_string(), story, reason);
        self.report.skipped.push(entry);
    }

    /// Count a materialized element
    pub fn created(&mut self, kind: ElementKind) {
        *self.report.created.entry(kind).or_insert(0) += 1;
    }
}

/// State of one export call
///
/// Holds the element id → emitted id map so that connectivity and
/// assignment records of one element share the same positional id.
#[derive(Debug)]
pub struct ExportContext<'o> {
    options: &'o ExchangeOptions,
    pub points: PointRegistry,
    ids: FxHashMap<ElementId, String>,
    counters: FxHashMap<ElementKind, usize>,
    pub report: ExportReport,
}

impl<'o> ExportContext<'o> {
    pub fn new(options: &'o ExchangeOptions) -> Self {
        Self {
            options,
            points: PointRegistry::with_tolerances(
                options.exact_tolerance,
                options.fallback_tolerance,
            ),
            ids: FxHashMap::default(),
            counters: FxHashMap::default(),
            report: ExportReport::default(),
        }
    }

    pub fn options(&self) -> &'o ExchangeOptions {
        self.options
    }

    pub fn stage(&self) -> ExchangeStage {
        self.report.stage
    }

    /// Move to a later stage
    pub fn advance(&mut self, stage: ExchangeStage) {
        debug_assert!(stage > self.report.stage, "stages only move forward");
        log::debug!("[Export] {} -> {}", self.report.stage, stage);
        self.report.stage = stage;
    }

    /// Next positional id for an element (`B1`, `B2`, ..., `C1`, ...)
    ///
    /// An element seen again keeps its first id; the export pass skips such
    /// repeats before they get here.
    pub fn assign_id(&mut self, element: ElementId, kind: ElementKind) -> String {
        if let Some(id) = self.ids.get(&element) {
            return id.clone();
        }
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        let id = format!("{}{}", kind.id_prefix(), counter);
        self.ids.insert(element, id.clone());
        self.report.ids.insert(element, id.clone());
        id
    }

    /// Emitted id of an element, if it was assigned one
    pub fn id_of(&self, element: ElementId) -> Option<&str> {
        self.ids.get(&element).map(String::as_str)
    }

    /// Intern a coordinate
    pub fn intern(&mut self, point: Point2D) -> PointId {
        self.points.intern(point)
    }

    /// Point id for a beam or brace end, following the matching mode
    ///
    /// Unmatched ends are recorded in the report and returned as `"0"`.
    pub fn end_point(&mut self, element: ElementId, kind: ElementKind, point: Point2D) -> PointId {
        match self.options.point_matching {
            PointMatching::Intern => self.points.intern(point),
            PointMatching::SnapToExisting => {
                let id = self.points.resolve(point);
                if id.is_unresolved() {
                    log::warn!(
                        "[Export] {} {}: no point within {} of ({}, {})",
                        kind,
                        element,
                        self.options.fallback_tolerance,
                        point.x,
                        point.y
                    );
                    self.report.unresolved_points.push(UnresolvedPoint {
                        element,
                        kind,
                        point,
                    });
                }
                id
            }
        }
    }

    /// Record a skipped element
    pub fn skip(&mut self, kind: ElementKind, element: ElementId, reason: SkipReason) {
        let entry = skipped_entry("Export", kind, element.to_string(), None, reason);
        self.report.skipped.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_ids_per_kind() {
        let options = ExchangeOptions::default();
        let mut ctx = ExportContext::new(&options);

        let b1 = ElementId::next();
        let b2 = ElementId::next();
        let c1 = ElementId::next();

        assert_eq!(ctx.assign_id(b1, ElementKind::Beam), "B1");
        assert_eq!(ctx.assign_id(c1, ElementKind::Column), "C1");
        assert_eq!(ctx.assign_id(b2, ElementKind::Beam), "B2");
        assert_eq!(ctx.assign_id(b1, ElementKind::Beam), "B1");

        assert_eq!(ctx.id_of(c1), Some("C1"));
        assert_eq!(ctx.report.emitted_id(b2), Some("B2"));
    }

    #[test]
    fn test_contexts_are_independent() {
        let options = ExchangeOptions::default();
        let element = ElementId::next();

        let mut first = ExportContext::new(&options);
        first.assign_id(ElementId::next(), ElementKind::Floor);
        assert_eq!(first.assign_id(element, ElementKind::Floor), "F2");

        let mut second = ExportContext::new(&options);
        assert_eq!(second.assign_id(element, ElementKind::Floor), "F1");
    }

    #[test]
    fn test_snap_reports_unresolved() {
        let options = ExchangeOptions::default().with_point_matching(PointMatching::SnapToExisting);
        let mut ctx = ExportContext::new(&options);
        let corner = ctx.intern(Point2D::new(0.0, 0.0));

        let beam = ElementId::next();
        assert_eq!(ctx.end_point(beam, ElementKind::Beam, Point2D::new(0.05, 0.0)), corner);
        assert!(ctx
            .end_point(beam, ElementKind::Beam, Point2D::new(50.0, 0.0))
            .is_unresolved());

        assert_eq!(ctx.points.len(), 1);
        assert_eq!(ctx.report.unresolved_points.len(), 1);
        assert_eq!(ctx.report.unresolved_points[0].element, beam);
    }

    #[test]
    fn test_stage_and_skips() {
        let options = ExchangeOptions::default();
        let mut ctx = ImportContext::new(&options);
        assert_eq!(ctx.stage(), ExchangeStage::Idle);
        ctx.advance(ExchangeStage::ParsingSections);
        ctx.skip(
            ElementKind::Beam,
            "B7",
            Some("Story9"),
            SkipReason::UnknownStory("Story9".to_string()),
        );
        ctx.created(ElementKind::Column);
        ctx.created(ElementKind::Column);

        assert_eq!(ctx.stage(), ExchangeStage::ParsingSections);
        assert_eq!(ctx.report.skipped[0].story.as_deref(), Some("Story9"));
        assert_eq!(ctx.report.created.get(&ElementKind::Column), Some(&2));
    }
}
