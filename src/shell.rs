//! Interactive driver store session.
//!
//! Reads one command per line and prints the current search/sort view of the
//! catalog after anything that changes it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::manager::DriverManager;
use crate::query::{SortOrder, SortState};
use crate::record::{Column, DriverRecord};
use crate::report::write_catalog_csv;
use crate::store::DriverStore;

const HELP: &str = "\
Commands:
  refresh                    Reload driver packages from the driver store
  list                       Show the current view
  search [TEXT]              Filter by provider (no text clears the search)
  sort COLUMN                Sort by column; repeat to reverse
                             (published-name, original-name, provider,
                              driver-version, class or 0-4)
  delete [--no-force] SEL..  Delete packages by name or row number
  export DIR SEL..           Export packages into DIR
  csv PATH                   Save the current view as CSV
  help                       Show this help
  quit                       Leave the shell
";

pub struct Shell<S> {
    manager: DriverManager<S>,
    force_delete: bool,
    assume_yes: bool,
}

enum Flow {
    Continue,
    Quit,
}

impl<S: DriverStore> Shell<S> {
    pub fn new(manager: DriverManager<S>, force_delete: bool) -> Self {
        Self {
            manager,
            force_delete,
            assume_yes: false,
        }
    }

    /// Skip the confirmation prompt before deleting.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn manager(&self) -> &DriverManager<S> {
        &self.manager
    }

    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "Driver Store Manager. Type 'help' for commands.")?;
        self.refresh(&mut out).await?;

        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = read_line(&mut input)? else {
                break;
            };
            debug!("Shell command: {}", line);

            match self.dispatch(&line, &mut input, &mut out).await? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    async fn dispatch<R: BufRead, W: Write>(
        &mut self,
        line: &str,
        input: &mut R,
        out: &mut W,
    ) -> Result<Flow> {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command {
            "" => {}
            "help" | "?" => write!(out, "{HELP}")?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "refresh" | "r" => self.refresh(out).await?,
            "list" | "ls" => self.show(out)?,
            "search" => {
                self.manager.set_search(rest);
                self.show(out)?;
            }
            "sort" => match args.first().and_then(|arg| Column::parse(arg)) {
                Some(column) => {
                    self.manager.click_column(column);
                    self.show(out)?;
                }
                None => writeln!(out, "Unknown column. Type 'help' for column names.")?,
            },
            "delete" | "del" => {
                let force = !args.contains(&"--no-force") && self.force_delete;
                let selection: Vec<&str> =
                    args.iter().copied().filter(|a| *a != "--no-force").collect();
                self.delete(&selection, force, input, out).await?;
            }
            "export" => match args.split_first() {
                Some((dir, selection)) if !selection.is_empty() => {
                    self.export(PathBuf::from(*dir), selection, out).await?;
                }
                _ => writeln!(out, "Usage: export DIR SEL..")?,
            },
            "csv" => match args.first() {
                Some(path) => self.save_csv(PathBuf::from(*path), out)?,
                None => writeln!(out, "Usage: csv PATH")?,
            },
            other => writeln!(out, "Unknown command '{other}'. Type 'help' for commands.")?,
        }
        Ok(Flow::Continue)
    }

    async fn refresh<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.manager.refresh().await {
            Ok(count) => {
                match self.manager.catalog().loaded_at() {
                    Some(at) => writeln!(
                        out,
                        "Loaded {count} driver packages at {}.",
                        at.with_timezone(&Local).format("%H:%M:%S")
                    )?,
                    None => writeln!(out, "Loaded {count} driver packages.")?,
                }
                self.show(out)
            }
            Err(error) => {
                writeln!(out, "Failed to load driver packages: {error}")?;
                Ok(())
            }
        }
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.manager.view() {
            Ok(records) => {
                write!(out, "{}", render_table(&records, self.manager.sort_state()))?;
                let query = self.manager.query();
                if !query.is_empty() {
                    writeln!(
                        out,
                        "{} of {} packages match '{}'",
                        records.len(),
                        self.manager.catalog().len(),
                        query.text().trim()
                    )?;
                }
            }
            Err(error) => writeln!(out, "{error}")?,
        }
        Ok(())
    }

    /// Map row numbers of the current view to published names.
    fn resolve_selection(&self, selection: &[&str]) -> Result<Vec<String>, String> {
        let view = self.manager.view().unwrap_or_default();
        selection
            .iter()
            .map(|item| match item.parse::<usize>() {
                Ok(row) => view
                    .get(row.wrapping_sub(1))
                    .map(|record| record.published_name.clone())
                    .ok_or_else(|| format!("No row {row} in the current view")),
                Err(_) => Ok(item.to_string()),
            })
            .collect()
    }

    async fn delete<R: BufRead, W: Write>(
        &mut self,
        selection: &[&str],
        force: bool,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        if selection.is_empty() {
            writeln!(out, "Usage: delete [--no-force] SEL..")?;
            return Ok(());
        }
        let names = match self.resolve_selection(selection) {
            Ok(names) => names,
            Err(message) => {
                writeln!(out, "{message}")?;
                return Ok(());
            }
        };

        if !self.assume_yes {
            writeln!(out, "About to delete: {}", names.join(", "))?;
            write!(out, "Continue? [y/N] ")?;
            out.flush()?;
            let answer = read_line(input)?.unwrap_or_default();
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                writeln!(out, "Cancelled.")?;
                return Ok(());
            }
        }

        let report = self.manager.uninstall(&names, force).await;
        write!(out, "{}", report.render())?;
        self.show(out)
    }

    async fn export<W: Write>(
        &mut self,
        destination: PathBuf,
        selection: &[&str],
        out: &mut W,
    ) -> Result<()> {
        let names = match self.resolve_selection(selection) {
            Ok(names) => names,
            Err(message) => {
                writeln!(out, "{message}")?;
                return Ok(());
            }
        };
        let report = self.manager.export(&names, destination).await;
        write!(out, "{}", report.render())?;
        Ok(())
    }

    fn save_csv<W: Write>(&self, path: PathBuf, out: &mut W) -> Result<()> {
        match self.manager.view() {
            Ok(records) => {
                write_catalog_csv(&path, &records)?;
                writeln!(out, "Saved {} packages to {}", records.len(), path.display())?;
            }
            Err(error) => writeln!(out, "{error}")?,
        }
        Ok(())
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read from input")?;
    Ok((read > 0).then_some(line))
}

/// Aligned text table with row numbers; the sorted column carries an arrow.
pub fn render_table(records: &[DriverRecord], sort: SortState) -> String {
    let titles: Vec<String> = Column::ALL
        .iter()
        .map(|column| {
            let arrow = match (sort.column == *column, sort.order) {
                (true, SortOrder::Ascending) => " ▲",
                (true, SortOrder::Descending) => " ▼",
                _ => "",
            };
            format!("{}{}", column.title(), arrow)
        })
        .collect();

    let mut widths: Vec<usize> = titles.iter().map(|t| t.width()).collect();
    for record in records {
        for (width, column) in widths.iter_mut().zip(Column::ALL) {
            *width = (*width).max(record.column_text(column).width());
        }
    }
    let number_width = records.len().to_string().len().max(1);

    let mut table = String::new();
    let mut push_row = |number: &str, cells: Vec<&str>| {
        let mut row = format!("{number:>number_width$}");
        for (cell, width) in cells.iter().zip(&widths) {
            row.push_str("  ");
            row.push_str(cell);
            row.push_str(&" ".repeat(width - cell.width()));
        }
        table.push_str(row.trim_end());
        table.push('\n');
    };

    push_row("#", titles.iter().map(String::as_str).collect());
    for (index, record) in records.iter().enumerate() {
        let cells = Column::ALL
            .iter()
            .map(|column| record.column_text(*column))
            .collect();
        push_row(&(index + 1).to_string(), cells);
    }
    if records.is_empty() {
        table.push_str("(no driver packages)\n");
    }
    table
}
