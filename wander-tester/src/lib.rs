//! Headless harness for wander-motion: runs named lenses at a fixed step,
//! summarizes the trajectory and writes replayable JSON artifacts.

pub mod lens;
pub mod pointer;
pub mod report;
pub mod simulation;

pub use lens::{Lens, LensCatalog};
pub use pointer::{PointerSample, SyntheticPointer};
pub use report::{artifact_path, render_json_report, write_artifact, write_console_report};
pub use simulation::{
    EDGE_MARGIN, RunMeta, RunSummary, SimulationPlan, SimulationRun, TraceSample, run_simulation,
};
