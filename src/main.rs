use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use hmmtag::{tag_corpus, Corpus, DefaultTag, HmmModel, HmmTagger, TaggerConfig, WriterSink};

/// Train a bigram HMM tagger on TRAIN and tag the sentences in TEST,
/// reporting the accuracy against the tags given in TEST
#[derive(Debug, Parser)]
#[command(version)]
struct Argv {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// training corpus of `word/tag` lines
    #[arg(value_name = "TRAIN")]
    train: PathBuf,
    /// test corpus of `word/tag` lines
    #[arg(value_name = "TEST")]
    test: PathBuf,
    /// write the trained probability tables to a JSON file
    #[arg(long, value_name = "PATH")]
    save_model: Option<PathBuf>,
    /// write tagged sentences to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// tag assigned where no trained tag is viable
    #[arg(long, value_name = "TAG", default_value = "NN")]
    default_tag: String,
    /// use the most frequent training tag as the default tag
    #[arg(long, conflicts_with = "default_tag")]
    most_frequent_default: bool,
    /// use the training tag with the largest vocabulary as the default tag
    #[arg(long, conflicts_with_all = ["default_tag", "most_frequent_default"])]
    open_class_default: bool,
    /// print the per-tag performance table
    #[arg(short, long)]
    report: bool,
    /// suppress tagging results
    #[arg(short, long)]
    quiet: bool,
}

impl Argv {
    fn config(&self) -> TaggerConfig {
        let default_tag = if self.most_frequent_default {
            DefaultTag::MostFrequent
        } else if self.open_class_default {
            DefaultTag::OpenClass
        } else {
            DefaultTag::Fixed(self.default_tag.clone())
        };
        TaggerConfig { default_tag }
    }

    fn model(&self) -> hmmtag::Result<HmmModel> {
        let begin = Instant::now();
        let model = HmmModel::train(&Corpus::from_path(&self.train)?);
        log::info!("trained on {} in {:?}", self.train.display(), begin.elapsed());
        if let Some(out) = &self.save_model {
            model.save(out)?;
            log::info!("write model to {}", out.display());
        }
        Ok(model)
    }
}

fn run(argv: &Argv) -> hmmtag::Result<()> {
    let model = argv.model()?;
    let test = Corpus::from_path(&argv.test)?;
    let mut tagger = HmmTagger::new(&model, &argv.config());

    let writer: Box<dyn Write> = match &argv.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(stdout().lock())),
    };
    let mut sink = if argv.quiet { WriterSink::quiet(writer) } else { WriterSink::new(writer) };
    let begin = Instant::now();
    let evaluation = tag_corpus(&mut tagger, &test, &mut sink)?;
    drop(sink);
    let sec = begin.elapsed().as_secs_f64();
    log::info!("elapsed time: {:.6} [sec] ({:.1} [instance/sec])", sec, test.len() as f64 / sec);
    if argv.report {
        print!("{}", evaluation.report());
    }
    Ok(())
}

fn main() -> ExitCode {
    let argv = Argv::parse();
    let level = match argv.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
    log::info!("argv: {:?}", argv);
    match run(&argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
