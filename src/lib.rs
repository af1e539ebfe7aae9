pub mod record;
pub mod fields;
pub mod names;
pub mod error;
pub mod writer;
pub mod mutator;
pub mod encoder;

pub mod sink;
pub mod layer;
pub mod init;
pub mod noop_sink;
pub mod env;
