//! Sets up `log4rs` from the `log` config table.

use std::panic::PanicHookInfo;

use log4rs::config::{Deserializers, RawConfig};

mod default_pattern;

/// Gets the log4rs deserializers, including the custom `"default"` encoder.
fn deserializers() -> Deserializers {
    let mut d = Deserializers::new();
    d.insert("default", default_pattern::DefaultPatternDeserializer);
    d
}

/// Initializes the global logger and routes panics to it.
pub fn init(config: RawConfig) -> anyhow::Result<()> {
    let (appenders, errors) = config.appenders_lossy(&deserializers());
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let config = log4rs::Config::builder()
        .appenders(appenders)
        .loggers(config.loggers())
        .build(config.root())?;

    log4rs::init_config(config)?;

    std::panic::set_hook(Box::new(on_panic));
    Ok(())
}

/// Writes the panic with a backtrace to the logger and flushes it.
fn on_panic(info: &PanicHookInfo<'_>) {
    use std::backtrace::Backtrace;
    use std::io::{Write as _, stderr};

    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");

    // the logger itself may be what panicked
    _ = writeln!(stderr(), "thread '{name}' {info}");
    log::error!("thread '{name}' {info}\n{}", Backtrace::force_capture());
    log::logger().flush();
}
