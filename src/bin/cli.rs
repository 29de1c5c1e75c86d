use anyhow::Result;
use ofxtree::ofx::loader::{self, Source};
use ofxtree::ParserConfig;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "ofxtree", about = "Parse OFX 1.x/2.x statements into a normalized tree")]
struct Opt {
    /// OFX file to parse
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Print the normalized markup instead of the JSON tree
    #[structopt(long)]
    markup: bool,
}

fn run(opt: &Opt, config: &ParserConfig) -> Result<()> {
    let source = Source::Path(opt.input.as_path());

    if opt.markup {
        let text = loader::read_source(source, config)?;
        let normalized = loader::normalize_document(&text, config)?;
        println!("{}", normalized.markup);
    } else {
        let document = loader::load(source, config)?;
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = ParserConfig::from_env()?;

    if let Err(e) = run(&opt, &config) {
        eprintln!("Error parsing {}: {:#}", opt.input.display(), e);
        std::process::exit(1);
    }
    Ok(())
}
