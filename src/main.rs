use anyhow::{anyhow, bail, Result};
use demographics::{
    init_tracing_once, read_ids, AttributeSelection, Annotator, DemographicsExtractor, ExtractOptions,
    OutputFormat,
};
use std::path::PathBuf;

const USAGE: &str = "\
usage:
  demographics text <TEXT>...
  demographics annotate <INPUT> <OUTPUT> [--tsv | --json | --json-pretty]
                        [--ids FILE] [--attributes a,b,c] [--keep-quotes]
                        [--only-matches] [--human-timestamps] [--no-progress]";

fn main() -> Result<()> {
    init_tracing_once();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("text") => run_text(&args[1..]),
        Some("annotate") => run_annotate(&args[1..]),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

fn run_text(args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("missing text\n{USAGE}");
    }
    let text = args.join(" ");
    let extractor = DemographicsExtractor::with_options(ExtractOptions::default())?;
    let demo = extractor.extract(&text);
    println!("gender\t{}", demo.gender.map_or("-", |g| g.as_str()));
    println!("age\t{}", demo.age.as_deref().unwrap_or("-"));
    if let Some(m) = extractor.return_gender_match(&text) {
        tracing::debug!("gender rule `{}` matched {:?}", m.rule, m.text);
    }
    if let Some(m) = extractor.return_age_match(&text) {
        tracing::debug!("age rule `{}` matched {:?}", m.rule, m.text);
    }
    Ok(())
}

fn run_annotate(args: &[String]) -> Result<()> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut annotator = Annotator::new();
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--tsv" => annotator = annotator.format(OutputFormat::Tsv),
            "--json" => annotator = annotator.format(OutputFormat::JsonArray { pretty: false }),
            "--json-pretty" => annotator = annotator.format(OutputFormat::JsonArray { pretty: true }),
            "--keep-quotes" => annotator = annotator.strip_quotes(false),
            "--only-matches" => annotator = annotator.only_with_demographics(true),
            "--human-timestamps" => annotator = annotator.timestamps_human_readable(true),
            "--no-progress" => annotator = annotator.progress(false),
            "--ids" => {
                let path = it.next().ok_or_else(|| anyhow!("--ids needs a file"))?;
                annotator = annotator.ids(read_ids(&PathBuf::from(path))?);
            }
            "--attributes" => {
                let list = it.next().ok_or_else(|| anyhow!("--attributes needs a list"))?;
                let names: Vec<&str> = list.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
                annotator = annotator.selection(AttributeSelection::only(names));
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            path => positional.push(PathBuf::from(path)),
        }
    }
    let [input, output] = positional.as_slice() else {
        bail!("annotate needs <INPUT> and <OUTPUT>\n{USAGE}");
    };

    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);
    let stats = annotator
        .parallelism(hw)
        .file_concurrency(hw.min(4))
        .progress_label("Annotating")
        .run(input, output)?;

    println!(
        "{} records written ({} with gender, {} with age, {} unparsable lines)",
        stats.written, stats.with_gender, stats.with_age, stats.failed
    );
    Ok(())
}
