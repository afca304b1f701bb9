// src/main.rs

use ordrun::environment::ExitCodes;
use ordrun::{cli, logging};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("ordrun error: {err:?}");
        std::process::exit(ExitCodes::from_env().system_failure);
    }

    match ordrun::run(args).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ordrun error: {err:?}");
            std::process::exit(ExitCodes::from_env().system_failure);
        }
    }
}
