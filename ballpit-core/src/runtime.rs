use crate::config::FieldConfig;
use crate::field::{FieldError, ParticleField};
use glam::Vec3;
use tracing::info;

/// A named scalar read off the field after a run
#[derive(Debug, Clone)]
pub struct Measurement {
    pub name: String,
    pub value: f32,
}

/// Final result of a headless run
#[derive(Debug)]
pub struct SimulationResult {
    pub steps: usize,
    pub measurements: Vec<Measurement>,
}

impl SimulationResult {
    pub fn get(&self, name: &str) -> Option<f32> {
        self.measurements
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub steps: usize,
    pub dt: f32,
    /// Controller target held for the whole run
    pub pointer: Option<Vec3>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            steps: 600,
            dt: 1.0 / 60.0,
            pointer: None,
        }
    }
}

/// Stepping state for a host that drives the field frame by frame
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub field: ParticleField,
    pub dt: f32,
    pub current_step: usize,
    pub max_steps: usize,
}

pub fn build_simulation_context(
    config: &FieldConfig,
    dt: f32,
    max_steps: usize,
) -> Result<SimulationContext, FieldError> {
    Ok(SimulationContext {
        field: ParticleField::new(config)?,
        dt,
        current_step: 0,
        max_steps,
    })
}

/// Execute one frame. Returns true once the context has run `max_steps`.
pub fn step_simulation(ctx: &mut SimulationContext) -> bool {
    if ctx.current_step >= ctx.max_steps {
        return true;
    }
    ctx.field.update(ctx.dt);
    ctx.current_step += 1;
    ctx.current_step >= ctx.max_steps
}

/// Build a field, run it for `options.steps` frames and measure the result
pub fn run_simulation(
    config: &FieldConfig,
    options: RunOptions,
) -> Result<SimulationResult, FieldError> {
    let mut ctx = build_simulation_context(config, options.dt, options.steps)?;
    if let Some(target) = options.pointer {
        ctx.field.set_controller_target(target);
    }

    while !step_simulation(&mut ctx) {}

    info!(steps = ctx.current_step, bodies = ctx.field.len(), "run finished");

    Ok(SimulationResult {
        steps: ctx.current_step,
        measurements: measure(&ctx.field),
    })
}

/// Evaluate every measurement on the current field state
pub fn measure(field: &ParticleField) -> Vec<Measurement> {
    let positions = field.positions();
    let radii = field.radii();

    let lowest_y = positions
        .iter()
        .zip(radii)
        .map(|(p, r)| p.y - r)
        .fold(f32::INFINITY, f32::min);
    let mean_y = positions.iter().map(|p| p.y).sum::<f32>() / positions.len() as f32;
    let light = field.light_position();

    let values = [
        ("lowest_y", lowest_y),
        ("mean_y", mean_y),
        ("max_overlap", max_overlap(positions, radii)),
        ("light_x", light.x),
        ("light_y", light.y),
        ("light_z", light.z),
    ];

    values
        .into_iter()
        .map(|(name, value)| Measurement {
            name: name.to_string(),
            value,
        })
        .collect()
}

/// Deepest interpenetration between any two bodies, zero when none touch
pub fn max_overlap(positions: &[Vec3], radii: &[f32]) -> f32 {
    let mut deepest = 0.0_f32;
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let overlap = radii[i] + radii[j] - positions[i].distance(positions[j]);
            deepest = deepest.max(overlap);
        }
    }
    deepest
}
