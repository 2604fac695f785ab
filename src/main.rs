use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use qrshorten::config::AppConfig;
use qrshorten::config::args::{Cli, Commands};
use qrshorten::runtime::modes;
use qrshorten::system::init_logging;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command_or_default() {
        Commands::GenerateConfig { output_path } => modes::generate_config(output_path.as_deref()),
        Commands::Serve => {
            let config = Arc::new(AppConfig::load(cli.config.as_deref())?);
            // guard 需要活到进程结束，否则文件日志会丢
            let _log_guard = init_logging(&config.logging)?;

            actix_web::rt::System::new().block_on(modes::run_server(&config))
        }
    }
}
