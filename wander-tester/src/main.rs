use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use wander_motion::StrategyRegistry;
use wander_tester::{
    LensCatalog, SimulationPlan, render_json_report, run_simulation, write_artifact,
    write_console_report,
};

#[derive(Debug, Parser)]
#[command(name = "wander-tester", version)]
#[command(about = "Headless runs of wander-motion strategies with JSON trace artifacts")]
struct Args {
    /// Lens (named archetype) to run
    #[arg(long, default_value = "calm")]
    lens: String,

    /// Strategy id overriding the lens' own strategy (zen, flow-field)
    #[arg(long)]
    strategy: Option<String>,

    /// Simulated seconds
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Fixed step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    step: f64,

    /// Seed for the strategy and the synthetic pointer
    #[arg(long, default_value_t = 42)]
    seed: u32,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Maximum trace samples kept in the artifact
    #[arg(long, default_value_t = 240)]
    samples: usize,

    /// Drive a synthetic pointer across the viewport
    #[arg(long)]
    pointer: bool,

    /// Directory receiving the JSON run artifact
    #[arg(long, default_value = "target/sim-runs")]
    out_dir: PathBuf,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json"])]
    report: String,

    /// List available lenses and exit
    #[arg(long)]
    list_lenses: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include every trace sample in the console report
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn plan(&self) -> SimulationPlan {
        SimulationPlan {
            lens: self.lens.clone(),
            strategy: self.strategy.clone(),
            duration: self.duration,
            step: self.step,
            seed: self.seed,
            width: self.width,
            height: self.height,
            samples: self.samples,
            pointer: self.pointer,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let catalog = LensCatalog::load_default();

    if args.list_lenses {
        let mut output_target = OutputTarget::new(args.output.clone())?;
        writeln!(output_target, "Available lenses:")?;
        for lens in &catalog.lenses {
            writeln!(
                output_target,
                "  {:10} {:11} - {}",
                lens.name, lens.strategy, lens.description
            )?;
        }
        output_target.flush()?;
        return Ok(());
    }

    let console = args.report == "console";
    if console {
        announce_banner();
    }

    let registry = StrategyRegistry::with_defaults();
    let start_time = Instant::now();
    let run = run_simulation(&args.plan(), &registry, &catalog)?;
    let elapsed = start_time.elapsed();

    let artifact = write_artifact(&args.out_dir, &run, Utc::now())?;
    log::info!("artifact written to {}", artifact.display());

    let mut output_target = OutputTarget::new(args.output.clone())?;
    if console {
        write_console_report(&mut output_target, &run, elapsed, args.verbose)?;
        writeln!(output_target, "📁 Artifact: {}", artifact.display())?;
    } else {
        writeln!(output_target, "{}", render_json_report(&run)?)?;
    }
    output_target.flush()?;

    if !run.summary.within(run.meta.width, run.meta.height) {
        anyhow::bail!("agent left the viewport during the run");
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "🌀 Wander Motion Tester".bright_cyan().bold());
    println!("{}", "=======================".cyan());
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
