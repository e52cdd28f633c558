//! Global constants for geolink-core

/// Name of the part definition every component usage is typed by
pub const COMPONENT_DEFINITION: &str = "Component";

/// Name of the part definition that wraps the root component
pub const CONTEXT_DEFINITION: &str = "Context";

/// Feature of `Component` that child components subset
pub const CHILDREN_FEATURE: &str = "children";

/// Attribute carrying the integer type tag
pub const TYPE_ID_ATTRIBUTE: &str = "typeID";

/// Attribute carrying the external source reference
pub const SOURCE_URL_ATTRIBUTE: &str = "onshape_url";

/// Local pose attributes, translation first
pub const POSE_ATTRIBUTES: [&str; 6] = ["tx", "ty", "tz", "rx", "ry", "rz"];

/// Default package name for textual export
pub const DEFAULT_PACKAGE_NAME: &str = "MyStructure";

/// Default Euler axis convention (static frame, x then y then z)
pub const DEFAULT_AXIS_ORDER: &str = "sxyz";

/// Threshold below which the Euler pivot is considered saturated (gimbal lock)
pub const GIMBAL_EPSILON: f64 = f64::EPSILON * 4.0;
