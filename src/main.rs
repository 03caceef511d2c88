use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use driver_store_manager::logging::init_logging;
use driver_store_manager::report::{write_batch_summary, write_catalog_csv};
use driver_store_manager::shell::{render_table, Shell};
use driver_store_manager::{
    BatchReport, Column, Config, DriverManager, PnpUtil, SortOrder, SortState,
};

#[derive(Parser)]
#[command(name = "driver-store")]
#[command(about = "Browse, search and remove third-party driver packages")]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Only show packages whose provider contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// Column name or index 0-4
    #[arg(long, default_value = "provider", value_parser = parse_column)]
    sort: Column,

    #[arg(long)]
    descending: bool,
}

fn parse_column(input: &str) -> Result<Column, String> {
    Column::parse(input).ok_or_else(|| {
        format!(
            "unknown column '{input}' (use 0-4 or one of: published-name, original-name, \
             provider, driver-version, class)"
        )
    })
}

impl ViewArgs {
    fn sort_state(&self) -> SortState {
        SortState {
            column: self.sort,
            order: if self.descending {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List driver packages in the driver store
    List {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        json: bool,
    },
    /// Delete driver packages by published name (oemNN.inf)
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Do not pass /force to pnputil
        #[arg(long)]
        no_force: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Write a summary file into this directory
        #[arg(long)]
        summary: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Export driver packages into a directory
    Export {
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(short, long, default_value = "driver_backup")]
        output: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Save the driver list as CSV
    Csv {
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Show the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
    /// Interactive session (default)
    Shell {
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },
}

/// Creates and removes a marker file in `dir`.
#[cfg(any(windows, test))]
fn can_write_to(dir: &std::path::Path) -> bool {
    let marker = dir.join(format!(".driver-store-{}", std::process::id()));
    if std::fs::write(&marker, b"").is_err() {
        return false;
    }
    std::fs::remove_file(&marker).ok();
    true
}

/// pnputil only changes the driver store from an elevated prompt, and only an
/// elevated prompt may write into `%SystemRoot%\INF`.
#[cfg(windows)]
fn require_elevation() -> Result<()> {
    let system_root = std::env::var_os("SystemRoot")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
    if can_write_to(&system_root.join("INF")) {
        Ok(())
    } else {
        anyhow::bail!("Changing the driver store needs an elevated prompt; run driver-store as Administrator")
    }
}

#[cfg(not(windows))]
fn require_elevation() -> Result<()> {
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_report(report: &BatchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

async fn run(args: Args, config: Config, config_path: PathBuf) -> Result<bool> {
    let store = PnpUtil::new(&config.pnputil_path);
    let mut manager = DriverManager::new(store, config.search_placeholder.clone());

    match args.command.unwrap_or(Commands::Shell { yes: false }) {
        Commands::List { view, json } => {
            manager.refresh().await?;
            if let Some(search) = &view.search {
                manager.set_search(search.as_str());
            }
            manager.set_sort(view.sort_state());
            let records = manager.view()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print!("{}", render_table(&records, manager.sort_state()));
            }
        }
        Commands::Delete {
            ids,
            no_force,
            yes,
            summary,
            json,
        } => {
            require_elevation()?;
            let prompt = format!("Delete {} driver package(s): {}?", ids.len(), ids.join(", "));
            if !yes && !confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(true);
            }
            let force = config.force_delete && !no_force;
            let report = manager.uninstall(&ids, force).await;
            print_report(&report, json)?;
            if let Some(dir) = summary {
                let path = write_batch_summary(&dir, &report)?;
                println!("Summary written to {}", path.display());
            }
            return Ok(report.all_succeeded());
        }
        Commands::Export { ids, output, json } => {
            require_elevation()?;
            let report = manager.export(&ids, output).await;
            print_report(&report, json)?;
            return Ok(report.all_succeeded());
        }
        Commands::Csv { output, view } => {
            manager.refresh().await?;
            if let Some(search) = &view.search {
                manager.set_search(search.as_str());
            }
            manager.set_sort(view.sort_state());
            let records = manager.view()?;
            write_catalog_csv(&output, &records)?;
            println!("Saved {} driver packages to {}", records.len(), output.display());
        }
        Commands::Config { write } => {
            print!("{}", config.to_toml()?);
            if write {
                config.save_to(&config_path)?;
                println!("Saved configuration to {}", config_path.display());
            }
        }
        Commands::Shell { yes } => {
            let mut shell = Shell::new(manager, config.force_delete).assume_yes(yes);
            let stdin = io::stdin();
            shell.run(stdin.lock(), io::stdout()).await?;
        }
    }

    Ok(true)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    init_logging(&config.log_filter, args.verbose)?;

    let all_succeeded =
        tokio::runtime::Runtime::new()?.block_on(run(args, config, config_path))?;
    if !all_succeeded {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sort_of(args: &[&str]) -> Column {
        match Args::try_parse_from(args).unwrap().command {
            Some(Commands::List { view, .. }) | Some(Commands::Csv { view, .. }) => view.sort,
            _ => panic!("expected a view command"),
        }
    }

    #[test]
    fn sort_accepts_index_or_name() {
        assert_eq!(sort_of(&["driver-store", "list", "--sort", "2"]), Column::Provider);
        assert_eq!(sort_of(&["driver-store", "list", "--sort", "0"]), Column::PublishedName);
        assert_eq!(
            sort_of(&["driver-store", "list", "--sort", "driver-version"]),
            Column::DriverVersion
        );
        assert_eq!(
            sort_of(&["driver-store", "csv", "-o", "out.csv", "--sort", "Class"]),
            Column::Class
        );
        assert_eq!(sort_of(&["driver-store", "list"]), Column::Provider);
    }

    #[test]
    fn sort_rejects_unknown_column() {
        assert!(Args::try_parse_from(["driver-store", "list", "--sort", "5"]).is_err());
        assert!(Args::try_parse_from(["driver-store", "list", "--sort", "vendor"]).is_err());
    }

    #[test]
    fn config_command_parses_write_flag() {
        let args = Args::try_parse_from(["driver-store", "config", "--write"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Config { write: true })));
    }

    #[test]
    fn marker_file_is_removed_after_write_check() {
        let dir = TempDir::new().unwrap();
        assert!(can_write_to(dir.path()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!can_write_to(&dir.path().join("missing")));
    }
}
