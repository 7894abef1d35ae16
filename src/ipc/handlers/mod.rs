pub mod core;
pub mod insights;
pub mod lists;
pub mod navigator;
pub mod pages;
pub mod scope;
