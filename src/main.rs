use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use arboard::Clipboard;
use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fv::controller::Controller;
use fv::model::{Model, Status};
use fv::sink::TextSink;
use fv::ui::TableUI;
use fv::{DatasetEngine, FieldId, FvError, SortDirection, Source, ViewerConfig, loader};

/// Browse campaign-finance records of legislators.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file or http(s) URL holding an array of records
    #[arg(default_value = "congress_data.json")]
    source: String,

    /// Only show records whose name contains this term
    #[arg(short, long)]
    search: Option<String>,

    /// Sort by this field (name, role, state, party, currentReceipts, careerReceipts)
    #[arg(long)]
    sort: Option<String>,

    /// Print the table to stdout instead of starting the viewer
    #[arg(short, long)]
    print: bool,

    /// Where to write logs, filtered by FV_LOG
    #[arg(long, default_value = "fv.log")]
    log_file: PathBuf,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    #[arg(long, default_value_t = 40)]
    max_column_width: usize,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        let mut cfg = ViewerConfig::default()
            .event_poll_time(self.poll_ms)
            .max_column_width(self.max_column_width);
        if let Some(term) = &self.search {
            cfg = cfg.initial_search(term.clone());
        }
        if let Some(field) = &self.sort {
            cfg = cfg.initial_sort(field.clone());
        }
        cfg
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &PathBuf) -> Result<(), FvError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_env("FV_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), FvError> {
    init_logging(&args.log_file)?;
    let cfg = args.config();
    let source = Source::parse(&args.source);
    info!("Starting fv on {:?}", source);

    if args.print {
        print_table(&cfg, &source);
        return Ok(());
    }

    let clipboard = Clipboard::new()
        .map_err(|e| warn!("Clipboard unavailable: {e}"))
        .ok();
    let mut terminal = ratatui::init();
    let result = run_tui(&mut terminal, &cfg, &source, clipboard);
    ratatui::restore();
    result
}

fn run_tui(
    terminal: &mut DefaultTerminal,
    cfg: &ViewerConfig,
    source: &Source,
    clipboard: Option<Clipboard>,
) -> Result<(), FvError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, size.width as usize, size.height as usize, clipboard);
    let mut ui = TableUI::new(cfg);
    let controller = Controller::new(cfg);

    // The table is drawn once before the load so a slow source shows "Loading ..."
    terminal.draw(|f| ui.draw(&model, f))?;
    model.load_source(source);

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}

fn print_table(cfg: &ViewerConfig, source: &Source) {
    let mut engine = DatasetEngine::new();
    // A failed load is already logged and leaves the table empty.
    let _ = loader::load_into(&mut engine, source);
    if let Some(field) = &cfg.initial_sort {
        match field.parse::<FieldId>() {
            Ok(id) => engine.set_sort(id, SortDirection::Ascending),
            Err(e) => warn!("Unknown sort field {:?}", e.0),
        }
    }
    engine.subscribe(Box::new(TextSink::new(io::stdout())));
    // Searching renders the final view exactly once.
    engine.search(cfg.initial_search.as_deref().unwrap_or(""));
}
