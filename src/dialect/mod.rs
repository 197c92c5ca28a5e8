//! Source dialects: filename classification and the structural models the
//! XML readers produce.

pub mod bpmn;
pub mod cmmn;
pub mod dmn;
pub mod xml;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("DOCTYPE declarations are not allowed")]
    DocType,
    #[error("document has no root element")]
    EmptyDocument,
    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { expected: &'static str, found: String },
    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("invalid number '{value}' in attribute '{attribute}'")]
    InvalidNumber { attribute: String, value: String },
    #[error("plan item {plan_item} references unknown definition {definition}")]
    UnknownDefinition {
        plan_item: String,
        definition: String,
    },
}

/// The document format derived from an uploaded filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Process,
    Case,
    DecisionService,
    Unknown,
}

impl DocumentFormat {
    /// Dialects in classification order; the first suffix match wins.
    const ORDERED: [DocumentFormat; 3] = [
        DocumentFormat::Process,
        DocumentFormat::Case,
        DocumentFormat::DecisionService,
    ];

    pub fn classify(file_name: &str) -> Self {
        Self::ORDERED
            .into_iter()
            .find(|format| {
                format
                    .extensions()
                    .iter()
                    .any(|extension| file_name.ends_with(extension))
            })
            .unwrap_or(DocumentFormat::Unknown)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Process => &[".bpmn", ".bpmn20.xml"],
            DocumentFormat::Case => &[".cmmn", ".cmmn.xml"],
            DocumentFormat::DecisionService => &[".dmn", ".dmn.xml"],
            DocumentFormat::Unknown => &[],
        }
    }

    /// Human readable list of accepted extensions, used in rejection messages.
    pub fn supported_extensions(&self) -> &'static str {
        match self {
            DocumentFormat::Process => ".bpmn and .bpmn20.xml",
            DocumentFormat::Case => ".cmmn and .cmmn.xml",
            DocumentFormat::DecisionService => ".dmn and .dmn.xml",
            DocumentFormat::Unknown => {
                ".bpmn, .bpmn20.xml, .cmmn, .cmmn.xml, .dmn and .dmn.xml"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn lower_right(&self) -> Point {
        Point {
            x: self.x + self.width,
            y: self.y + self.height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Diagram geometry keyed by the id of the element it belongs to.
pub type LocationMap = IndexMap<String, Bounds>;
