pub mod catalog;
pub mod compliance;
pub mod correction;
pub mod formula;
pub mod knowledge;
pub mod metrics;
pub mod molecular;
pub mod pipeline;
pub mod profile;
