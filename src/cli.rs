#![expect(clippy::print_stdout)]

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tablesight::analyser::logic::naming;
use tablesight::charts::Visualizer;
use tablesight::config::PipelineConfig;
use tablesight::pipeline::{self, RunOptions};
use tablesight::query::{QueryEngine, repl};
use tablesight::report;
use tablesight::workspace::Workspace;

#[derive(Parser)]
#[command(
    name = "tablesight",
    about = "Clean, profile, chart and report on local spreadsheet and CSV files"
)]
pub struct Cli {
    /// JSON config file. Defaults to <config dir>/tablesight/config.json when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory with the raw .csv/.xlsx files
    #[arg(long, global = true, env = "TABLESIGHT_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for cleaned files, statistics and charts
    #[arg(long, global = true, env = "TABLESIGHT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for the PDF report
    #[arg(long, global = true, env = "TABLESIGHT_REPORT_DIR")]
    pub report_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Config file values with command-line and environment overrides applied.
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.report_dir {
            config.report_dir = dir.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean, analyse, chart, query and report (the default)
    Run {
        /// Table for charts, queries and the report. Defaults to the first input file.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Skip the interactive query loop
        #[arg(long)]
        no_interactive: bool,
    },
    /// Clean every input file into the output directory
    Clean,
    /// Analyse the cleaned_* files of the output directory
    Analyze,
    /// Draw one bar or line chart
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,

        /// Source table. Defaults to the first input file.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Category / x-axis column
        #[arg(long)]
        x: String,

        /// Numeric column
        #[arg(long)]
        y: String,

        #[arg(long)]
        title: Option<String>,
    },
    /// Answer queries about one table
    Query {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Write the PDF report for one table
    Report {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    Bar,
    Line,
}

pub fn run_command(command: Option<Commands>, config: &PipelineConfig) -> Result<()> {
    let command = command.unwrap_or(Commands::Run {
        file: None,
        no_interactive: false,
    });

    match command {
        Commands::Run {
            file,
            no_interactive,
        } => {
            let options = RunOptions {
                focus_file: file,
                interactive: !no_interactive,
            };
            let stdin = std::io::stdin();
            let summary = pipeline::run(config, &options, stdin.lock(), std::io::stdout())?;
            for failure in &summary.load.failures {
                println!("Skipped {}: {}", failure.path.display(), failure.reason);
            }
            println!("Done.");
        }
        Commands::Clean => {
            let workspace = Workspace::prepare(config)?;
            println!("Cleaning files in {}...", workspace.input_dir.display());
            let report = pipeline::load_and_clean_all(&workspace.input_dir, &workspace.output)?;
            for table in &report.cleaned {
                println!(
                    "Saved {} ({} rows, {} columns)",
                    table.path.display(),
                    table.df.height(),
                    table.df.width()
                );
            }
            for failure in &report.failures {
                println!("Skipped {}: {}", failure.path.display(), failure.reason);
            }
            println!("{}", report.summary());
        }
        Commands::Analyze => {
            let workspace = Workspace::prepare(config)?;
            let report = pipeline::discover_cleaned(workspace.output.path())?;
            println!(
                "Found {} cleaned file(s) in {}",
                report.cleaned.len(),
                workspace.output.path().display()
            );
            for outcome in pipeline::analyze_all(&report.cleaned, &workspace.output, config) {
                println!(
                    "Analyzed {}: {} artifact(s)",
                    outcome.name,
                    outcome.artifacts().len()
                );
                for err in &outcome.errors {
                    println!("  failed {err}");
                }
            }
        }
        Commands::Chart {
            kind,
            file,
            x,
            y,
            title,
        } => {
            let workspace = Workspace::prepare(config)?;
            let df = pipeline::load_focus_table(&focus_file(config, file)?)?;
            let visualizer = Visualizer::new(workspace.output, &config.chart);
            let written = match kind {
                ChartKind::Bar => {
                    let title = title.unwrap_or_else(|| format!("Bar Chart: {y} by {x}"));
                    visualizer.plot_bar(&df, &x, &y, &title)
                }
                ChartKind::Line => {
                    let title = title.unwrap_or_else(|| format!("Line Chart: {y} over {x}"));
                    visualizer.plot_line(&df, &x, &y, &title)
                }
            };
            match written {
                Some(path) => println!("Chart saved: {}", path.display()),
                None => {
                    let name = match kind {
                        ChartKind::Bar => naming::bar_chart_file_name(&y, &x),
                        ChartKind::Line => naming::line_chart_file_name(&y, &x),
                    };
                    println!("Chart {name} was not produced; see the log for details.");
                }
            }
        }
        Commands::Query { file } => {
            let workspace = Workspace::prepare(config)?;
            let df = pipeline::load_focus_table(&focus_file(config, file)?)?;
            let engine = QueryEngine::new(df, Visualizer::new(workspace.output, &config.chart));
            println!("Type your query (type 'exit' to quit):");
            let stdin = std::io::stdin();
            repl::run(&engine, stdin.lock(), std::io::stdout())?;
        }
        Commands::Report { file } => {
            let workspace = Workspace::prepare(config)?;
            let df = pipeline::load_focus_table(&focus_file(config, file)?)?;
            let out = workspace.reports.join(&config.report_file_name);
            println!("Generating PDF report...");
            let outcome = report::generate_pdf(&df, workspace.output.path(), &out)?;
            println!(
                "Report generated: {} ({} page(s), {} chart(s))",
                outcome.path.display(),
                outcome.pages,
                outcome.images_placed
            );
        }
    }
    Ok(())
}

fn focus_file(config: &PipelineConfig, file: Option<PathBuf>) -> Result<PathBuf> {
    let options = RunOptions {
        focus_file: file,
        interactive: false,
    };
    pipeline::resolve_focus_file(config, &options).with_context(|| {
        format!(
            "No table given and no .csv/.xlsx file found in {}",
            config.input_dir.display()
        )
    })
}
