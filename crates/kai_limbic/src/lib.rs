//! # Kai Limbic Layer
//!
//! Protective and regulatory systems that sit on top of the emotion engine:
//!
//! - **Boundary**: abuse tracking, defense, cooldown and disengagement
//! - **Coping**: overload detection and self-regulation directives
//! - **Wellbeing**: composite mental-health index and self-soothing

pub mod boundary;
pub mod coping;
pub mod wellbeing;

pub use boundary::{BoundaryEngine, BoundaryState};
pub use coping::{check_overload, Overload};
pub use wellbeing::{MentalHealth, MentalHealthIndex};
