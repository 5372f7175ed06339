pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod load_config;
pub mod mapper;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod validation;
pub mod writer;
