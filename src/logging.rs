use std::fs;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// must hold it for the lifetime of the program.
pub fn init_logging() -> Option<WorkerGuard> {
    let env_filter = match "var_annot=info".parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    // Without a writable logs directory only the console layer is installed
    let (file_writer, guard) = match fs::create_dir_all("logs") {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily("logs", "var_annot.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(writer), Some(guard))
        }
        Err(_) => (None, None),
    };

    build_subscriber(env_filter, file_writer).init();
    guard
}

/// JSON file layer (when a writer is given) plus a console layer on stderr.
///
/// Console output goes to stderr; stdout is reserved for the run summary.
pub fn build_subscriber(
    env_filter: EnvFilter,
    file_writer: Option<NonBlocking>,
) -> impl Subscriber + Send + Sync {
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
}
