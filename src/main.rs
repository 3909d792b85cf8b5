use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

mod analysis;
mod args;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    let res = analysis::run_analysis(
        &args.config,
        args.reference,
        args.out,
        args.input,
        args.input_type,
        args.excel_worksheet_name,
    );

    if let Err(e) = res {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&*e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
