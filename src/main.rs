use clap::Parser;
use ratatui::DefaultTerminal;
use std::process::ExitCode;
use tracing::{error, info};

use mtv::cli::Cli;
use mtv::controller::Controller;
use mtv::domain::{Result, ViewerConfig};
use mtv::loader::{RecordSet, load_records};
use mtv::model::{Model, Status};
use mtv::ui::TableUI;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = mtv::logging::init(cli.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    // Load before taking over the terminal so errors print normally
    let data = load_records(cli.expanded_path()?)?;

    let mut terminal = ratatui::init();
    let result = view_loop(&mut terminal, &config, data);
    ratatui::restore();
    info!("Viewer closed");
    result
}

fn view_loop(terminal: &mut DefaultTerminal, config: &ViewerConfig, data: RecordSet) -> Result<()> {
    let size = terminal.size()?;
    let mut model = Model::init(config, data, size.width as usize, size.height as usize);
    let ui = TableUI::new();
    let controller = Controller::new(config);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        }
    }
    Ok(())
}
