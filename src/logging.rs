use std::io::Write;

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

/// Container logs are the only diagnostic channel the calling workflow sees,
/// so the default level is informative rather than quiet.
pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,  // default: progress and errors
        1 => LevelFilter::Debug, // -v: prompts, resolved config
        _ => LevelFilter::Trace, // -vv: raw payloads
    };

    let mut builder = Builder::new();
    builder.filter_level(level);

    builder.format(|buf, record| {
        let level = record.level();

        let level_label = match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(buf, "{} {}", level_label, record.args())
    });

    builder.init();
}
