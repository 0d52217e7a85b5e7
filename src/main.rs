use clap::Parser;
use standardise_ip::config::{column_layout, Cli, Commands};
use standardise_ip::{logging, run_json, run_standardise};
use std::error::Error;
use std::io;

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// Do as little as possible in main.rs as it can't contain any tests
fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init()?;
    log::info!("#Start main()");

    match cli.command {
        Commands::Standardise {
            input,
            output,
            sheet,
            column,
            first_row,
        } => {
            run_standardise(
                &input,
                &output,
                &sheet,
                column as usize,
                first_row as usize,
                io::stdout().lock(),
            )?;
        }
        Commands::Json {
            input,
            sheet,
            institution_col,
            country_col,
            contact_col,
            ip_col,
            first_row,
        } => {
            let layout = column_layout(institution_col, country_col, contact_col, ip_col);
            run_json(
                &input,
                &sheet,
                &layout,
                first_row as usize,
                io::stdout().lock(),
                io::stderr().lock(),
            )?;
        }
    }
    Ok(())
}
