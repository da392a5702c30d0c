//! Command-line front end for native builds.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::{Parser, Subcommand, ValueEnum};

    use wound_annotator::format::{DirectoryBackend, export_csv, image_dimensions};
    use wound_annotator::model::severity_options_for;
    use wound_annotator::{AnnotationView, AppConfig, LogLevel, ViewportFit};

    #[derive(Parser, Debug)]
    #[command(
        name = "wound-annotator",
        version,
        about = "Inspect wound images and their bounding-box annotations"
    )]
    struct Cli {
        /// Application config file (JSON)
        #[arg(long, global = true)]
        config: Option<PathBuf>,
        /// Log verbosity, overrides the config file
        #[arg(long, global = true, value_enum)]
        log_level: Option<CliLogLevel>,
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Show how an image is fitted into the canvas
        Fit {
            /// Image file
            image: PathBuf,
            /// Window width used to derive the canvas width cap
            #[arg(long)]
            window_width: Option<f64>,
        },
        /// List the severity choices for a wound category
        Severities {
            /// Wound category, e.g. "BURN"
            category: String,
        },
        /// Count an image's annotations per category
        Counts(DataArgs),
        /// List annotations missing required fields
        Validate(DataArgs),
        /// Export an image's annotations as CSV
        #[command(name = "export-csv")]
        ExportCsv {
            #[command(flatten)]
            data: DataArgs,
            /// Output file (default: stdout)
            #[arg(long)]
            out: Option<PathBuf>,
        },
    }

    #[derive(clap::Args, Debug)]
    struct DataArgs {
        /// Root of the annotation data directory
        #[arg(long)]
        data_dir: PathBuf,
        /// Image identifier
        image_id: String,
    }

    #[derive(ValueEnum, Clone, Copy, Debug)]
    enum CliLogLevel {
        Error,
        Warn,
        Info,
        Debug,
        Trace,
    }

    impl From<CliLogLevel> for LogLevel {
        fn from(level: CliLogLevel) -> Self {
            match level {
                CliLogLevel::Error => LogLevel::Error,
                CliLogLevel::Warn => LogLevel::Warn,
                CliLogLevel::Info => LogLevel::Info,
                CliLogLevel::Debug => LogLevel::Debug,
                CliLogLevel::Trace => LogLevel::Trace,
            }
        }
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();

        let config = match &cli.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => AppConfig::default(),
        };

        let level = cli.log_level.map(LogLevel::from).unwrap_or(config.log_level);
        env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .init();

        match cli.command {
            Commands::Fit {
                image,
                window_width,
            } => command_fit(&config, &image, window_width),
            Commands::Severities { category } => command_severities(&category),
            Commands::Counts(data) => command_counts(&config, &data),
            Commands::Validate(data) => command_validate(&config, &data),
            Commands::ExportCsv { data, out } => command_export_csv(&config, &data, out.as_deref()),
        }
    }

    fn command_fit(config: &AppConfig, image: &Path, window_width: Option<f64>) -> Result<()> {
        let bytes =
            std::fs::read(image).with_context(|| format!("failed to read {}", image.display()))?;
        let (width, height) = image_dimensions(&bytes)?;
        let cap = config.viewport.cap_for_window(window_width);
        let Some(fit) = ViewportFit::compute(width, height, cap) else {
            bail!(
                "cannot fit {width}x{height} into {}x{}",
                cap.max_width,
                cap.max_height
            );
        };
        println!("natural:  {}x{}", fit.natural_width, fit.natural_height);
        println!("scale:    {:.6}", fit.scale);
        println!(
            "rendered: {:.1}x{:.1}",
            fit.rendered_width(),
            fit.rendered_height()
        );
        Ok(())
    }

    fn command_severities(category: &str) -> Result<()> {
        let options = severity_options_for(category);
        if options.is_empty() {
            println!("No severity applies to '{category}'");
        }
        for option in options {
            println!("{:<18} {}", option.value, option.label);
        }
        Ok(())
    }

    fn open_view(config: &AppConfig, data: &DataArgs) -> Result<AnnotationView> {
        let backend = DirectoryBackend::new(&data.data_dir);
        let mut view = AnnotationView::new(config.viewport.cap_for_window(None));
        view.set_drag_enabled(config.drag_enabled);
        view.load_from(&backend, &data.image_id).with_context(|| {
            format!(
                "failed to load '{}' from {}",
                data.image_id,
                data.data_dir.display()
            )
        })?;
        Ok(view)
    }

    fn command_counts(config: &AppConfig, data: &DataArgs) -> Result<()> {
        let counts = open_view(config, data)?.counts();
        for (category, count) in &counts.counts {
            println!("{count:>5}  {category}");
        }
        println!("{:>5}  total", counts.total);
        Ok(())
    }

    fn command_validate(config: &AppConfig, data: &DataArgs) -> Result<()> {
        let view = open_view(config, data)?;
        let incomplete = view.incomplete();
        if incomplete.is_empty() {
            println!("All {} annotations are complete", view.store().len());
            return Ok(());
        }
        for (id, issues) in &incomplete {
            let messages: Vec<&str> = issues.iter().map(|i| i.message()).collect();
            println!("annotation {id}: {}", messages.join(", "));
        }
        bail!(
            "{} of {} annotations are incomplete",
            incomplete.len(),
            view.store().len()
        )
    }

    fn command_export_csv(config: &AppConfig, data: &DataArgs, out: Option<&Path>) -> Result<()> {
        let view = open_view(config, data)?;
        let csv = export_csv(&data.image_id, &view.store().to_persisted());
        match out {
            Some(path) => {
                std::fs::write(path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("Wrote {} rows to {:?}", view.store().len(), path);
            }
            None => print!("{csv}"),
        }
        Ok(())
    }
}

/// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

// WASM doesn't use main(), the library exports `WoundCanvas` instead
#[cfg(target_arch = "wasm32")]
fn main() {}
