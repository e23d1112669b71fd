use log::debug;
use std::process;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;

mod shell;
mod utils;

fn main() {
    let config = Config::new();
    if let Err(e) = init_logger(&config) {
        eprintln!(
            "mysh: logging disabled ({}): {}",
            config.logger_dir.display(),
            e
        );
    }
    debug!("configuration loaded: {:?}", config);

    let code = match Shell::new(&config).and_then(|mut shell| shell.run()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("mysh stopped: {}", e);
            eprintln!("mysh: {}", e);
            1
        }
    };
    process::exit(code);
}
