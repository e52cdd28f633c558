//! Geolink Core Data Structures
//!
//! This crate contains the core of the component/geometry mapping:
//! - Transform: homogeneous transforms and Euler angle conversion
//! - Component: explicitly owned tree of named components with local poses
//! - Document: document tree abstraction and the textual notation parser
//! - Search: topmost-match search over document trees
//! - Pose: world-pose accumulation over document trees
//! - Export/Import: the textual codec for component trees
//! - Project: serializable project file

pub mod component;
pub mod constants;
pub mod document;
pub mod export;
pub mod import;
pub mod pose;
pub mod project;
pub mod search;
pub mod transform;

pub use component::*;
pub use constants::*;
pub use document::{
    DocumentNode, Element, ElementKind, EvaluationError, ParseError, PartUsage, Value, parse,
};
pub use export::*;
pub use import::*;
pub use pose::*;
pub use project::*;
pub use search::*;
pub use transform::*;
