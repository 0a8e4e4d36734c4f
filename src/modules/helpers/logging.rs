use fern::Dispatch;

use crate::config::Config;

/// # set up the global logger
/// logs go to stdout and are appended to the configured log file.
pub fn setup_logging(config: &Config) -> Result<(), fern::InitError> {
    let file_logger_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(std::io::stdout())
        .chain(fern::log_file(&config.log_file)?);

    Dispatch::new()
        .level(config.logging_level)
        .chain(file_logger_config)
        .apply()?;

    Ok(())
}
