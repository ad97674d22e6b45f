mod adapters;
mod cli;
mod core;
mod error;
mod logging;

use clap::Parser;

use crate::{cli::Args, error::AppResult};

fn main() -> AppResult<()> {
    let args = Args::parse();
    logging::init(&args.log_level);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| error::AppError::Internal(e.to_string()))?;
    let res = rt.block_on(adapters::http::run(args));
    if let Err(e) = &res {
        tracing::error!(code = e.code(), error = %e, "fatal");
    }
    res
}
