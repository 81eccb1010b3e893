pub mod affect;
pub mod generator;
pub mod types;

pub use affect::{
    AffectChain, AffectMapper, AffectMapping, AffectQuadrant, QuadrantAffectMapper,
};
pub use generator::BaseFormulaGenerator;
pub use types::{Formula, FormulaComponent, NORMALIZATION_TOLERANCE, NotePyramid};
