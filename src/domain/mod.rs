// Domain layer - Dashboard, chart and dataset records the clone works on
pub mod chart;
pub mod clone_spec;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod ids;
pub mod layout;
