use std::time::Instant;

use dom_inspector::{
    inspect_style_and_dom_with, DomInspector, Html, InspectOptions, RestrictedSheets,
    SheetSource, DOM_SHEET_ID,
};
use excavator_core_types::{RelationshipEdge, Value};

use crate::events;
use crate::model::ExcavationResult;
use crate::policy::ExcavateOptions;
use crate::summary::{build_summary, fingerprint, SummaryInput};
use crate::walker::Walk;

/// Nominal node the merged DOM sheet hangs off.
pub const DOM_ROOT_ID: &str = "dom-root";

#[derive(Clone, Debug, Default)]
pub struct ExcavationInput<'a> {
    pub value: Option<Value>,
    pub dom: Option<&'a Html>,
}

impl<'a> ExcavationInput<'a> {
    pub fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            dom: None,
        }
    }

    pub fn document(document: &'a Html) -> Self {
        Self {
            value: None,
            dom: Some(document),
        }
    }

    pub fn with_document(mut self, document: &'a Html) -> Self {
        self.dom = Some(document);
        self
    }
}

pub struct Excavator {
    options: ExcavateOptions,
    dom_options: InspectOptions,
    sheet_source: Box<dyn SheetSource>,
}

impl Excavator {
    pub fn new(options: ExcavateOptions) -> Self {
        Self {
            options,
            dom_options: InspectOptions::default(),
            sheet_source: Box::new(RestrictedSheets),
        }
    }

    pub fn with_dom_options(mut self, dom_options: InspectOptions) -> Self {
        self.dom_options = dom_options;
        self
    }

    pub fn with_sheet_source(mut self, source: impl SheetSource + 'static) -> Self {
        self.sheet_source = Box::new(source);
        self
    }

    pub fn options(&self) -> &ExcavateOptions {
        &self.options
    }

    /// Total over every input: malformed, cyclic or exotic values all map to descriptors.
    pub fn excavate(&self, input: ExcavationInput<'_>) -> ExcavationResult {
        let started = Instant::now();
        let value = input.value.unwrap_or(Value::Undefined);

        let mut walk = Walk::new(&self.options);
        let root = walk.walk_root(&value);
        let Walk {
            mut virtual_objects,
            mut relationships,
            truncation,
            node_kinds,
            max_depth_reached,
            ..
        } = walk;

        let mut dom_sheets = Vec::new();
        let mut style_report = None;
        if let Some(document) = input.dom {
            if self.options.inspect_styles {
                let report = inspect_style_and_dom_with(
                    document,
                    &self.dom_options,
                    self.sheet_source.as_ref(),
                );
                virtual_objects.extend(report.virtual_objects);
                relationships.extend(report.relationships);
                dom_sheets = report.dom_sheets;
                style_report = Some(report.styles);
            } else {
                let inspection =
                    DomInspector::new(self.dom_options.clone()).inspect_document(document);
                virtual_objects.extend(inspection.virtual_objects);
                relationships.extend(inspection.relationships);
                dom_sheets = inspection.dom_sheets;
            }
            relationships.push(RelationshipEdge::summarizes(DOM_ROOT_ID, DOM_SHEET_ID));
            events::emit_dom_merged(
                virtual_objects.len(),
                dom_sheets.len(),
                style_report.is_some(),
            );
        }

        let summary = build_summary(SummaryInput {
            virtual_objects: &virtual_objects,
            relationships: &relationships,
            dom_sheets: &dom_sheets,
            style_report: style_report.as_ref(),
            truncation,
            node_kinds,
            max_depth_reached,
        });
        let fingerprint = fingerprint(&virtual_objects, &relationships, &dom_sheets);

        events::emit_excavation(
            summary.virtual_object_count,
            summary.relationship_count,
            summary.truncation.depth_limited,
            summary.truncation.cycles,
            started.elapsed(),
        );

        ExcavationResult {
            root,
            virtual_objects,
            relationships,
            dom_sheets,
            style_report,
            summary,
            fingerprint,
        }
    }
}

impl Default for Excavator {
    fn default() -> Self {
        Self::new(ExcavateOptions::default())
    }
}

pub fn excavate(input: ExcavationInput<'_>) -> ExcavationResult {
    Excavator::default().excavate(input)
}
