//! Rate and factor configuration.
//!
//! A [`ConfigDocument`] holds fractions exactly as the settings screen stores
//! them; [`Constants`] is the flat percent-form record the scheme engine reads.
//! [`ConfigResolver`] merges user, packaged and hard-coded layers per leaf.

pub mod constants;
pub mod resolver;

pub use constants::{ConfigDocument, Constants};
pub use resolver::{ConfigLayer, ConfigResolver, ResolvedConstants, PACKAGED_DEFAULTS};
