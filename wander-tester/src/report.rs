use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::simulation::{RunMeta, RunSummary, SimulationRun};

/// `<out_dir>/<lens>-<strategy>-seed<seed>-<timestamp>.json`
#[must_use]
pub fn artifact_path(out_dir: &Path, meta: &RunMeta, now: DateTime<Utc>) -> PathBuf {
    let ts = now.format("%Y%m%dT%H%M%S");
    out_dir.join(format!(
        "{}-{}-seed{}-{ts}.json",
        meta.lens, meta.strategy, meta.seed
    ))
}

/// Write the full run (meta, summary, trace) as pretty JSON.
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be written.
pub fn write_artifact(out_dir: &Path, run: &SimulationRun, now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating artifact dir {}", out_dir.display()))?;
    let path = artifact_path(out_dir, &run.meta, now);
    let payload = serde_json::to_vec_pretty(run).context("serializing run")?;
    fs::write(&path, payload).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Human-readable summary; `verbose` appends every trace sample.
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_console_report(
    out: &mut dyn Write,
    run: &SimulationRun,
    elapsed: Duration,
    verbose: bool,
) -> io::Result<()> {
    let meta = &run.meta;
    let s = &run.summary;

    writeln!(out)?;
    writeln!(out, "{}", "📊 Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==============".cyan())?;
    writeln!(
        out,
        "Lens: {} ({})",
        meta.lens.bold(),
        meta.strategy.as_str().yellow()
    )?;
    writeln!(out, "Seed: {}", meta.seed)?;
    writeln!(
        out,
        "Viewport: {}x{}  ticks: {}  step: {:.4}s",
        meta.width, meta.height, meta.steps, meta.step
    )?;
    writeln!(out, "Wall time: {elapsed:?}")?;
    writeln!(out)?;

    let contained = s.within(meta.width, meta.height);
    let status = if contained {
        "✅ CONTAINED".green()
    } else {
        "❌ ESCAPED".red()
    };
    writeln!(out, "{status}")?;
    writeln!(
        out,
        "   x: {:.1} .. {:.1}   y: {:.1} .. {:.1}",
        s.min_x, s.max_x, s.min_y, s.max_y
    )?;
    writeln!(
        out,
        "   speed: min {:.1}  mean {:.1}  max {:.1}",
        s.min_speed, s.mean_speed, s.max_speed
    )?;
    writeln!(
        out,
        "   final position: ({:.1}, {:.1})",
        s.final_position.x, s.final_position.y
    )?;
    writeln!(out, "   paused ticks: {}", s.paused_ticks)?;
    writeln!(out, "   edge ticks: {}", s.edge_ticks)?;

    if verbose {
        writeln!(out)?;
        writeln!(out, "{}", "⚡ Trace".bright_yellow().bold())?;
        writeln!(out, "{}", "=======".yellow())?;
        for sample in &run.trace {
            let marker = if sample.paused { " (paused)" } else { "" };
            writeln!(
                out,
                "   t={:7.3}  pos=({:7.1}, {:7.1})  speed={:6.1}  heading={:+.3}{marker}",
                sample.t, sample.x, sample.y, sample.speed, sample.heading
            )?;
        }
    }
    Ok(())
}

/// Machine-readable report: meta and summary without the trace.
///
/// # Errors
///
/// Propagates serialization failures.
pub fn render_json_report(run: &SimulationRun) -> Result<String> {
    let report = JsonReport {
        meta: &run.meta,
        summary: &run.summary,
        trace_samples: run.trace.len(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    meta: &'a RunMeta,
    summary: &'a RunSummary,
    trace_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::LensCatalog;
    use crate::simulation::{SimulationPlan, run_simulation};
    use chrono::TimeZone;
    use wander_motion::StrategyRegistry;

    fn sample_run() -> SimulationRun {
        run_simulation(
            &SimulationPlan::new("curious", 42).with_duration(1.0),
            &StrategyRegistry::with_defaults(),
            &LensCatalog::load_default(),
        )
        .unwrap()
    }

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "wander-report-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn artifact_path_includes_key_segments() {
        let run = sample_run();
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let path = artifact_path(Path::new("target/sim-runs"), &run.meta, now);
        assert_eq!(
            path,
            PathBuf::from("target/sim-runs/curious-flow-field-seed42-20240506T070809.json")
        );
    }

    #[test]
    fn write_artifact_round_trips_run() {
        let run = sample_run();
        let dir = temp_dir("write");
        let path = write_artifact(&dir, &run, Utc::now()).expect("write artifact");
        let text = fs::read_to_string(path).expect("read artifact");
        let parsed: SimulationRun = serde_json::from_str(&text).expect("parse artifact");
        assert_eq!(parsed.meta, run.meta);
        assert_eq!(parsed.trace.len(), run.trace.len());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn console_report_mentions_lens_and_containment() {
        let run = sample_run();
        let render = |verbose: bool| {
            let mut buf = Vec::new();
            write_console_report(&mut buf, &run, Duration::from_millis(3), verbose)
                .expect("write report");
            String::from_utf8(buf).expect("utf8 report")
        };
        let text = render(false);
        assert!(text.contains("curious"));
        assert!(text.contains("CONTAINED"));
        assert!(!text.contains("t=  0.000"));
        assert!(render(true).contains("t=  0.000"));
    }

    #[test]
    fn json_report_omits_trace() {
        let run = sample_run();
        let value: serde_json::Value =
            serde_json::from_str(&render_json_report(&run).unwrap()).unwrap();
        assert_eq!(value["meta"]["lens"], "curious");
        assert!(value.get("trace").is_none());
        assert_eq!(value["traceSamples"], run.trace.len());
    }
}
