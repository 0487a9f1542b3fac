use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use wander_motion::numbers::{step_count, usize_to_f64};
use wander_motion::{MotionEnvironment, StrategyRegistry, StrategyUpdateResult, Vec2};

use crate::lens::LensCatalog;
use crate::pointer::SyntheticPointer;

/// Distance from an edge, in pixels, at which a tick counts as touching
/// the boundary.
pub const EDGE_MARGIN: f64 = 12.0;

/// Everything needed to replay one headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPlan {
    pub lens: String,
    /// Strategy id overriding the lens' own strategy.
    pub strategy: Option<String>,
    pub duration: f64,
    pub step: f64,
    pub seed: u32,
    pub width: f64,
    pub height: f64,
    /// Upper bound on recorded trace samples.
    pub samples: usize,
    pub pointer: bool,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        Self {
            lens: "calm".to_string(),
            strategy: None,
            duration: 30.0,
            step: 1.0 / 60.0,
            seed: 42,
            width: 1280.0,
            height: 720.0,
            samples: 240,
            pointer: false,
        }
    }
}

impl SimulationPlan {
    #[must_use]
    pub fn new(lens: impl Into<String>, seed: u32) -> Self {
        Self {
            lens: lens.into(),
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Reject plans that would produce an empty or meaningless run.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("duration", self.duration),
            ("step", self.step),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{field} must be a positive number (got {value})");
            }
        }
        if self.samples == 0 {
            bail!("samples must be at least 1");
        }
        if self.lens.trim().is_empty() {
            bail!("lens name must not be empty");
        }
        Ok(())
    }

    /// Fixed ticks needed to cover the duration.
    #[must_use]
    pub fn step_count(&self) -> usize {
        step_count(self.duration, self.step)
    }

    fn sample_stride(&self, steps: usize) -> usize {
        steps.div_ceil(self.samples.max(1)).max(1)
    }
}

/// Identifying details of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeta {
    pub lens: String,
    pub strategy: String,
    pub seed: u32,
    pub duration: f64,
    pub step: f64,
    pub steps: usize,
    pub width: f64,
    pub height: f64,
    pub pointer: bool,
    pub params: serde_json::Value,
}

/// Aggregate statistics over every tick of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub ticks: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    pub mean_speed: f64,
    pub final_position: Vec2,
    pub paused_ticks: usize,
    pub edge_ticks: usize,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            ticks: 0,
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_speed: f64::INFINITY,
            max_speed: 0.0,
            mean_speed: 0.0,
            final_position: Vec2::ZERO,
            paused_ticks: 0,
            edge_ticks: 0,
        }
    }
}

impl RunSummary {
    fn record(&mut self, result: &StrategyUpdateResult, width: f64, height: f64) {
        let p = result.position;
        let speed = result.speed();
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
        self.min_speed = self.min_speed.min(speed);
        self.max_speed = self.max_speed.max(speed);
        // Running mean keeps long runs free of a large accumulator.
        self.ticks += 1;
        self.mean_speed += (speed - self.mean_speed) / usize_to_f64(self.ticks);
        self.final_position = p;
        if result.meta.is_some_and(|meta| meta.is_paused()) {
            self.paused_ticks += 1;
        }
        if p.x <= EDGE_MARGIN
            || p.y <= EDGE_MARGIN
            || p.x >= width - EDGE_MARGIN
            || p.y >= height - EDGE_MARGIN
        {
            self.edge_ticks += 1;
        }
    }

    /// True when every recorded position stayed inside the viewport.
    #[must_use]
    pub fn within(&self, width: f64, height: f64) -> bool {
        self.ticks > 0
            && self.min_x >= 0.0
            && self.min_y >= 0.0
            && self.max_x <= width
            && self.max_y <= height
    }
}

/// One recorded tick of the trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub speed: f64,
    pub heading: f64,
    pub paused: bool,
}

impl TraceSample {
    fn from_result(time: f64, result: &StrategyUpdateResult) -> Self {
        Self {
            t: time,
            x: result.position.x,
            y: result.position.y,
            vx: result.velocity.x,
            vy: result.velocity.y,
            speed: result.speed(),
            heading: result.heading.unwrap_or_else(|| result.velocity.angle()),
            paused: result.meta.is_some_and(|meta| meta.is_paused()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub trace: Vec<TraceSample>,
}

/// Drive one strategy through a fixed-step run.
///
/// The lens supplies the strategy id and parameters; an explicit strategy
/// override that differs from the lens runs with that strategy's defaults.
///
/// # Errors
///
/// Fails when the plan is invalid, the lens is unknown, or the strategy
/// rejects its parameters.
pub fn run_simulation(
    plan: &SimulationPlan,
    registry: &StrategyRegistry,
    catalog: &LensCatalog,
) -> Result<SimulationRun> {
    plan.validate()?;
    let lens = catalog
        .get(&plan.lens)
        .ok_or_else(|| anyhow!("unknown lens `{}`", plan.lens))?;

    let strategy_id = plan.strategy.as_deref().unwrap_or(&lens.strategy);
    let params = if strategy_id == lens.strategy {
        lens.params.clone()
    } else {
        log::warn!(
            "lens {} is tuned for {}; running {strategy_id} with default parameters",
            lens.name,
            lens.strategy
        );
        serde_json::json!({})
    };

    let mut strategy = registry
        .create(strategy_id, &params, Some(plan.seed))
        .with_context(|| format!("building {strategy_id} for lens {}", lens.name))?;

    let steps = plan.step_count();
    let stride = plan.sample_stride(steps);
    let mut pointer = plan
        .pointer
        .then(|| SyntheticPointer::new(u64::from(plan.seed)));
    let mut summary = RunSummary::default();
    let mut trace = Vec::with_capacity(plan.samples.saturating_add(1).min(steps));

    log::debug!(
        "running lens {} ({strategy_id}) for {steps} ticks, seed {}",
        lens.name,
        plan.seed
    );

    for i in 0..steps {
        let time = usize_to_f64(i) * plan.step;
        let mut env = MotionEnvironment::new(plan.width, plan.height, time, plan.step);
        if let Some(sample) = pointer
            .as_mut()
            .and_then(|p| p.sample(plan.width, plan.height, time))
        {
            env.mouse = Some(sample.position);
            env.mouse_velocity = Some(sample.velocity);
        }
        if i == 0 {
            strategy.reset(&env);
        }

        let result = strategy.step(&env);
        summary.record(&result, plan.width, plan.height);
        if i % stride == 0 || i + 1 == steps {
            trace.push(TraceSample::from_result(time, &result));
        }
    }

    Ok(SimulationRun {
        meta: RunMeta {
            lens: lens.name.clone(),
            strategy: strategy_id.to_string(),
            seed: plan.seed,
            duration: plan.duration,
            step: plan.step,
            steps,
            width: plan.width,
            height: plan.height,
            pointer: plan.pointer,
            params,
        },
        summary,
        trace,
    })
}
