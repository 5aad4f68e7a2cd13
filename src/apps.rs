use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind};

use crate::config::DashboardConfig;
use crate::constants::assets;
use crate::data::Column;
use crate::errors::{DashboardError, FilterError};
use crate::filter::{Criterion, FilterSpec};
use crate::session::{DashboardSession, LoadOutcome};
use crate::transport::FileTransport;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColumnArg {
    City,
    State,
    ZipCode,
    Term,
    Population,
    Income,
    BachelorDegree,
    MedianAge,
}

impl From<ColumnArg> for Column {
    fn from(value: ColumnArg) -> Self {
        match value {
            ColumnArg::City => Column::City,
            ColumnArg::State => Column::State,
            ColumnArg::ZipCode => Column::ZipCode,
            ColumnArg::Term => Column::Term,
            ColumnArg::Population => Column::Population,
            ColumnArg::Income => Column::Income,
            ColumnArg::BachelorDegree => Column::BachelorDegree,
            ColumnArg::MedianAge => Column::MedianAge,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cityscope",
    disable_help_subcommand = true,
    about = "Explore ZIP-code demographic rows",
    long_about = "Filter, highlight, chart and export demographic rows joined with precomputed ZIP-code similarities.",
    after_help = "The data root is resolved in order by explicit arg, the CITYSCOPE_DATA_ROOT environment variable, then assets/data."
)]
struct CityscopeCli {
    #[arg(
        long = "data-root",
        value_name = "PATH",
        env = "CITYSCOPE_DATA_ROOT",
        help = "Directory holding the rows and similarity assets"
    )]
    data_root: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        default_value = assets::DEFAULT_ROWS_ASSET,
        help = "Rows asset name under the data root"
    )]
    rows: String,
    #[arg(
        long,
        value_name = "FILE",
        default_value = assets::DEFAULT_SIMILARITY_ASSET,
        help = "Similarity asset name under the data root"
    )]
    similarities: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print rows matching a filter as CSV.
    Filter(FilterArgs),
    /// Print the highlight set and side-panel rows for a ZIP code.
    Highlight {
        #[arg(value_name = "ZIP")]
        zip_code: String,
    },
    /// Write filtered rows to a CSV file.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_name = "PATH", help = "Output file (defaults to filtered_data.csv)")]
        out: Option<PathBuf>,
    },
    /// Print the category distribution of a column.
    Chart {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, help = "Column to group by")]
        by: ColumnArg,
        #[arg(
            long = "max-slices",
            default_value_t = crate::constants::chart::DEFAULT_MAX_SLICES,
            value_parser = parse_positive_usize,
            help = "Slices shown before folding the rest into Other"
        )]
        max_slices: usize,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    #[arg(long, value_enum, help = "Column to filter on")]
    column: Option<ColumnArg>,
    #[arg(
        long,
        conflicts_with_all = ["min", "max"],
        help = "Case-insensitive substring for text columns"
    )]
    text: Option<String>,
    #[arg(long, help = "Inclusive lower bound for numeric columns")]
    min: Option<f64>,
    #[arg(long, help = "Inclusive upper bound for numeric columns")]
    max: Option<f64>,
}

impl FilterArgs {
    fn to_spec(&self) -> Result<Option<FilterSpec>, FilterError> {
        let Some(column) = self.column.map(Column::from) else {
            return Ok(None);
        };
        let ranged = self.min.is_some() || self.max.is_some();
        let criterion = match &self.text {
            Some(text) => Criterion::Text(text.clone()),
            None if ranged || column.is_numeric() => Criterion::NumericRange {
                min: self.min.unwrap_or(f64::NEG_INFINITY),
                max: self.max.unwrap_or(f64::INFINITY),
            },
            None => Criterion::Text(String::new()),
        };
        FilterSpec::new(column, criterion).map(Some)
    }
}

/// Run the `cityscope` command line, writing results to `out`.
pub fn run_cityscope<I, W>(args_iter: I, out: &mut W) -> Result<(), DashboardError>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<CityscopeCli, _>(std::iter::once("cityscope".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = DashboardConfig::from_env()
        .with_rows_asset(cli.rows)
        .with_similarity_asset(cli.similarities);
    if let Some(root) = cli.data_root {
        config = config.with_data_root(root);
    }
    let transport = FileTransport::new(&config.data_root);
    let mut session = DashboardSession::new(config);

    ensure_loaded(&mut session, |session| session.load_rows(&transport))?;

    match cli.command {
        Command::Filter(filter) => {
            session.set_filter(filter.to_spec()?);
            out.write_all(session.export_visible_csv().as_bytes())?;
        }
        Command::Highlight { zip_code } => {
            ensure_loaded(&mut session, |session| session.load_similarity(&transport))?;
            let selection = session.select_zip(&zip_code);
            writeln!(out, "Selected ZIP Code: {}", selection.zip_code)?;
            let members: Vec<&str> = selection.highlight.iter().collect();
            writeln!(out, "Highlighted: {}", members.join(", "))?;
            match &selection.similarity {
                Some(entry) => {
                    for similar in &entry.similar_zips {
                        writeln!(
                            out,
                            "  {} similarity={:.4} population={} median_income={}",
                            similar.zip_code,
                            similar.similarity_score,
                            display_optional(similar.population),
                            display_optional(similar.median_income)
                        )?;
                    }
                }
                None => writeln!(out, "No similar zip codes found for {}", selection.zip_code)?,
            }
            for (row_id, row) in &selection.rows {
                writeln!(
                    out,
                    "  row {}: {}, {} term={} population={} income={}",
                    row_id.0, row.city, row.state, row.term, row.population, row.income
                )?;
            }
        }
        Command::Export { filter, out: path } => {
            session.set_filter(filter.to_spec()?);
            let path = path.unwrap_or_else(|| PathBuf::from(&session.config().export_filename));
            fs::write(&path, session.export_visible_csv())?;
            writeln!(
                out,
                "Wrote {} rows to {}",
                session.visible_rows().len(),
                path.display()
            )?;
        }
        Command::Chart {
            filter,
            by,
            max_slices,
        } => {
            session.set_filter(filter.to_spec()?);
            let column = Column::from(by);
            let shares = crate::metrics::category_distribution(
                session.visible_rows().into_iter().map(|(_, row)| row),
                column,
                max_slices,
            );
            writeln!(out, "{} Distribution (Count)", column.label())?;
            for share in shares {
                writeln!(
                    out,
                    "  {:<24} {:>8} {:>6.1}%",
                    share.label,
                    share.count,
                    share.share * 100.0
                )?;
            }
        }
    }

    for notice in session.drain_notices() {
        eprintln!("[{:?}] {}", notice.level, notice.message);
    }
    Ok(())
}

fn ensure_loaded<F>(session: &mut DashboardSession, load: F) -> Result<(), DashboardError>
where
    F: FnOnce(&mut DashboardSession) -> LoadOutcome,
{
    if load(session) == LoadOutcome::Failed {
        let messages: Vec<String> = session
            .drain_notices()
            .into_iter()
            .map(|notice| notice.message)
            .collect();
        return Err(DashboardError::Unloaded(messages.join("; ")));
    }
    Ok(())
}

fn display_optional(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --max-slices value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("--max-slices must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, DashboardError>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use tempfile::tempdir;

    const ROWS: &str = "\
City,State,Zip,Extra,Term,Extra2,Population,Income,Age,Bachelor
Troy,NY,12180,x,Fall 2021,y,50000,61000,31.5,44.2
Albany,NY,12207,x,Fall 2022,y,98000,45000,35.0,38.1
";
    const SIMS: &str = r#"[{"zip_code":"12180","count":3,"similar_zips":[{"zip_code":"12207","population":98000,"median_income":45000,"similarity":2.0}]}]"#;

    fn run(root: &std::path::Path, args: &[&str]) -> Result<String, Box<dyn Error>> {
        let mut argv = vec!["--data-root".to_string(), root.display().to_string()];
        argv.extend(args.iter().map(|arg| arg.to_string()));
        let mut out = Vec::new();
        run_cityscope(argv.into_iter(), &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(assets::DEFAULT_ROWS_ASSET), ROWS).unwrap();
        fs::write(dir.path().join(assets::DEFAULT_SIMILARITY_ASSET), SIMS).unwrap();
        dir
    }

    #[test]
    fn filter_prints_matching_rows_as_csv() {
        let dir = fixture();
        let out = run(
            dir.path(),
            &["filter", "--column", "population", "--min", "60000", "--max", "100000"],
        )
        .unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Albany,NY,12207"));
    }

    #[test]
    fn highlight_lists_selection_and_similar_zips() {
        let dir = fixture();
        let out = run(dir.path(), &["highlight", "12180"]).unwrap();
        assert!(out.contains("Highlighted: 12180, 12207"));
        assert!(out.contains("population=98000 median_income=45000"));
        assert!(out.contains("row 0: Troy, NY"));

        let out = run(dir.path(), &["highlight", "99999"]).unwrap();
        assert!(out.contains("Highlighted: 99999"));
        assert!(out.contains("No similar zip codes found for 99999"));
    }

    #[test]
    fn export_writes_file() {
        let dir = fixture();
        let target = dir.path().join("out.csv");
        let out = run(
            dir.path(),
            &["export", "--column", "city", "--text", "tro", "--out", target.to_str().unwrap()],
        )
        .unwrap();
        assert!(out.starts_with("Wrote 1 rows"));
        let written = fs::read_to_string(target).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn chart_groups_by_column() {
        let dir = fixture();
        let out = run(dir.path(), &["chart", "--by", "state"]).unwrap();
        assert!(out.starts_with("State Distribution (Count)"));
        assert!(out.contains("NY"));
    }

    #[test]
    fn missing_rows_asset_is_an_error() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        let argv = vec![
            "--data-root".to_string(),
            dir.path().display().to_string(),
            "filter".to_string(),
        ];
        let err = run_cityscope(argv.into_iter(), &mut out).unwrap_err();
        assert!(matches!(err, DashboardError::Unloaded(_)));
    }

    #[test]
    fn zero_max_slices_is_rejected() {
        let dir = fixture();
        assert!(run(dir.path(), &["chart", "--by", "city", "--max-slices", "0"]).is_err());
    }

    #[test]
    fn filter_args_reject_criteria_that_do_not_fit_the_column() {
        let args = |column, text: Option<&str>, min| FilterArgs {
            column: Some(column),
            text: text.map(str::to_string),
            min,
            max: None,
        };
        assert_eq!(
            args(ColumnArg::City, None, Some(1.0)).to_spec().unwrap_err(),
            FilterError::ModeMismatch {
                column: "City",
                mode: "numeric range"
            }
        );
        assert!(matches!(
            args(ColumnArg::Income, Some("high"), None).to_spec(),
            Err(FilterError::ModeMismatch { .. })
        ));
        let open = args(ColumnArg::Income, None, None).to_spec().unwrap().unwrap();
        assert_eq!(open.mode(), crate::filter::FilterMode::NumericRange);
        let all = args(ColumnArg::City, None, None).to_spec().unwrap().unwrap();
        assert!(all.is_noop());
    }

    #[test]
    fn mismatched_filter_flags_fail_the_command() {
        let dir = fixture();
        assert!(run(dir.path(), &["filter", "--column", "city", "--min", "5"]).is_err());
        let conflicting = ["filter", "--column", "city", "--text", "t", "--max", "5"];
        assert!(run(dir.path(), &conflicting).is_err());
    }
}
