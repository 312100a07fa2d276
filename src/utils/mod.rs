pub mod id_generator;
pub mod logging;

pub use id_generator::IdGenerator;
