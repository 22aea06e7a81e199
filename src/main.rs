use anyhow::Result;
use clap::{Parser, Subcommand};
use pteprep::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pteprep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded question banks
    Banks,
    /// Back up all persisted records to one JSON file
    Backup {
        /// Output path for the backup file
        #[arg(short, long, default_value = "pteprep-backup.json")]
        output: String,
    },
    /// Restore records from a backup file
    Restore {
        /// Path of the backup file to apply
        input: String,
    },
    /// Export attempt history as CSV
    Export {
        /// Output path for the CSV file
        #[arg(short, long, default_value = "pteprep-history.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pteprep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Banks) => {
            let bank = pteprep::bank::QuestionBank::load(&Config::banks_dir()?);
            for section in pteprep::bank::SectionKind::all() {
                let questions = bank.by_section(section);
                println!("{} ({})", section.label(), questions.len());
                for q in questions {
                    println!("  {:<12} {}", q.id, q.title);
                }
            }
        }
        Some(Commands::Backup { output }) => {
            let store = pteprep::store::FileStore::open(Config::store_path()?)?;
            let count =
                pteprep::store::backup::export_to_file(&store, output.as_ref())?;
            println!("Backed up {count} records to {output}");
        }
        Some(Commands::Restore { input }) => {
            let mut store = pteprep::store::FileStore::open(Config::store_path()?)?;
            let count =
                pteprep::store::backup::import_from_file(&mut store, input.as_ref())?;
            println!("Restored {count} records from {input}");
        }
        Some(Commands::Export { output }) => {
            let store = pteprep::store::FileStore::open(Config::store_path()?)?;
            let count =
                pteprep::store::backup::export_csv_to_file(&store, output.as_ref())?;
            println!("Exported {count} attempts to {output}");
        }
        None => {
            // Launch TUI
            let config = Config::load()?;
            let mut app = App::new(config)?;
            app.run().await?;
        }
    }

    Ok(())
}
