pub mod bounds;
pub mod collision;
pub mod config;
pub mod diagnostics;
pub mod field;
pub mod integrator;
pub mod runtime;

pub use bounds::Bounds;
pub use config::{ConfigError, FieldConfig};
pub use field::{BodyInit, Controller, FieldError, ParticleField, PhysicalConstants};
pub use runtime::{
    build_simulation_context, run_simulation, step_simulation, Measurement, RunOptions,
    SimulationContext, SimulationResult,
};
