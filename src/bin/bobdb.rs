use bobdb::cli::{error_exit_code, ShellProgram, StandardCommand};
use bobdb::BobDbConfig;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.bobdb/bobdb.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Name of the database to operate on
    #[clap(value_name = "DBNAME")]
    dbname: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Standard(StandardCommand),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match BobDbConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    info!("configuration:\n{}", config.summary());

    let locator = config.locator();
    let shell = ShellProgram::from_config(&config);

    let Commands::Standard(command) = cli.command;
    let code = match command.run(&cli.dbname, &locator, &shell) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            error_exit_code(&e)
        }
    };
    std::process::exit(code);
}
