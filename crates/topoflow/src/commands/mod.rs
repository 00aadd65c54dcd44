pub mod graph;
pub mod install;
pub mod instances;
pub mod outputs;
pub mod uninstall;
pub mod validate;
