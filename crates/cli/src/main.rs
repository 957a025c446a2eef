//! CLI tool for comparing the text content of PowerPoint decks.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use slidesim_core::similarity::MAX_PRECISION;
use slidesim_core::{
    preview, DeckSource, EmptyShapePolicy, Error, ReportFormatter, SimilarityReport,
    SimilarityScorer,
};
use slidesim_pptx::PptxParser;
use std::path::PathBuf;

/// Compare the text of a reference deck against one or more other decks.
#[derive(Parser, Debug)]
#[command(name = "slidesim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reference PowerPoint file (.pptx)
    reference: PathBuf,

    /// PowerPoint files to compare against the reference
    #[arg(required = true)]
    comparisons: Vec<PathBuf>,

    /// Print the report as JSON
    #[arg(short, long)]
    json: bool,

    /// Count shapes with blank text as empty entries instead of skipping them
    #[arg(long)]
    keep_empty_shapes: bool,

    /// Decimal places scores are rounded to (0-15)
    #[arg(
        short,
        long,
        default_value = "4",
        value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64)
    )]
    precision: u32,

    /// Show the first N characters of each deck's text
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// A comparison deck after extraction.
enum Extracted {
    Text { id: String, text: String },
    Failed { id: String, error: Error },
}

/// JSON output shape.
#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a SimilarityReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    previews: Vec<DeckPreview>,
}

#[derive(Serialize)]
struct DeckPreview {
    id: String,
    text: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let policy = if args.keep_empty_shapes {
        EmptyShapePolicy::Keep
    } else {
        EmptyShapePolicy::Skip
    };
    let parser = PptxParser::new().with_empty_shape_policy(policy);
    let scorer = SimilarityScorer::new().with_precision(args.precision);
    let formatter = ReportFormatter::new().with_precision(args.precision as usize);

    let reference = DeckSource::from_path(&args.reference);
    let reference_id = reference.id();
    let reference_text = parser
        .extract_text(&reference)
        .with_context(|| format!("Failed to extract text from {}", reference_id))?;
    log::debug!(
        "{}: {} characters of text",
        reference_id,
        reference_text.chars().count()
    );

    let extracted: Vec<Extracted> = args
        .comparisons
        .iter()
        .map(|path| extract_comparison(&parser, DeckSource::from_path(path)))
        .collect();

    let report = match build_report(&scorer, &reference_id, &reference_text, &extracted) {
        Ok(report) => report,
        Err(Error::EmptyCorpus) => {
            for line in failure_lines(&extracted) {
                eprintln!("{}", line);
            }
            eprintln!(
                "Nothing to compare: none of the decks contain any words. \
                 Check that the files hold text rather than only images."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let previews = match args.preview {
        Some(max_chars) => collect_previews(&reference_id, &reference_text, &extracted, max_chars),
        None => Vec::new(),
    };

    if args.json {
        let output = JsonOutput {
            report: &report,
            previews,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize report")?
        );
    } else {
        for p in &previews {
            println!("[{}] {}", p.id, p.text);
        }
        if !previews.is_empty() {
            println!();
        }
        print!("{}", formatter.format_with_newline(&report));
    }

    if args.verbose && report.failure_count() > 0 {
        eprintln!("{} deck(s) could not be compared", report.failure_count());
    }

    Ok(())
}

/// Extract one comparison deck, keeping failures so the others still get scored.
fn extract_comparison(parser: &PptxParser, source: DeckSource) -> Extracted {
    let id = source.id();
    match parser.extract_text(&source) {
        Ok(text) => {
            log::debug!("{}: {} characters of text", id, text.chars().count());
            Extracted::Text { id, text }
        }
        Err(error) => {
            log::warn!("Skipping {}: {}", id, error);
            Extracted::Failed { id, error }
        }
    }
}

/// One line per comparison deck that could not be extracted.
fn failure_lines(extracted: &[Extracted]) -> Vec<String> {
    extracted
        .iter()
        .filter_map(|e| match e {
            Extracted::Failed { id, error } => Some(format!("{}  error: {}", id, error)),
            Extracted::Text { .. } => None,
        })
        .collect()
}

/// Score every extracted deck in one joint fit and merge in the failures,
/// keeping the order given on the command line.
fn build_report(
    scorer: &SimilarityScorer,
    reference_id: &str,
    reference_text: &str,
    extracted: &[Extracted],
) -> slidesim_core::Result<SimilarityReport> {
    let texts: Vec<&str> = extracted
        .iter()
        .filter_map(|e| match e {
            Extracted::Text { text, .. } => Some(text.as_str()),
            Extracted::Failed { .. } => None,
        })
        .collect();

    let scores = if texts.is_empty() {
        Vec::new()
    } else {
        scorer.score(reference_text, &texts)?
    };
    let mut scores = scores.into_iter();

    let mut report = SimilarityReport::new(reference_id);
    for entry in extracted {
        match entry {
            Extracted::Text { id, .. } => {
                if let Some(score) = scores.next() {
                    report.push_score(id.clone(), score);
                }
            }
            Extracted::Failed { id, error } => report.push_failure(id.clone(), error),
        }
    }
    Ok(report)
}

fn collect_previews(
    reference_id: &str,
    reference_text: &str,
    extracted: &[Extracted],
    max_chars: usize,
) -> Vec<DeckPreview> {
    let mut previews = vec![DeckPreview {
        id: reference_id.to_string(),
        text: preview(reference_text, max_chars),
    }];
    previews.extend(extracted.iter().filter_map(|e| match e {
        Extracted::Text { id, text } => Some(DeckPreview {
            id: id.clone(),
            text: preview(text, max_chars),
        }),
        Extracted::Failed { .. } => None,
    }));
    previews
}
