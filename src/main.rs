use clap::Parser;
use envseal::cli::{commands, output, Cli, Commands};
use envseal::errors::EnvSealError;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr; user output goes through `cli::output`.
    let filter = EnvFilter::try_from_env("ENVSEAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { keyfile } => commands::init::execute(&cli, keyfile),
        Commands::Set { ref key, ref value } => {
            commands::set::execute(&cli, key, value.as_deref())
        }
        Commands::Get { ref key } => commands::get::execute(&cli, key),
        Commands::List => commands::list::execute(&cli),
        Commands::Rm { ref key, force } => commands::rm::execute(&cli, key, force),
        Commands::Import {
            ref file,
            ref format,
        } => commands::import_cmd::execute(&cli, file, format.as_deref()),
        Commands::Export {
            ref format,
            ref output,
        } => commands::export::execute(&cli, format, output.as_deref()),
        Commands::Run {
            ref command,
            no_override,
            clean_env,
        } => commands::run::execute(&cli, command, no_override, clean_env),
        Commands::Keygen { ref path, force } => commands::keygen::execute(path.clone(), force),
    };

    match result {
        Ok(()) => {}
        // The child already reported its own failure.
        Err(EnvSealError::ChildProcessFailed(code)) => std::process::exit(code),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
