mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, AssembleArgs, Commands};
use querykit::logging::{init_logging, Verbosity};
use querykit::{
  AssembleOptions, Base64ImageEncoder, ImageEncoder, ManifestProvider, ProcessImageEncoder,
  PromptProvider, QueryAssembler, QueryInputProvider, TesseractOcrEngine,
};

#[tokio::main]
async fn main() {
  let args = Args::parse();

  if let Err(e) = run(args).await {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

async fn run(args: Args) -> Result<()> {
  match args.command {
    Commands::Version => {
      println!("querykit {}", env!("CARGO_PKG_VERSION"));
      Ok(())
    }
    Commands::Assemble(args) => assemble(args).await,
  }
}

async fn assemble(args: AssembleArgs) -> Result<()> {
  init_logging(Verbosity::from_flags(args.verbose, args.quiet));

  let mut ocr = TesseractOcrEngine::new().with_binary(&args.tesseract);
  if let Some(lang) = &args.lang {
    ocr = ocr.with_languages(lang);
  }
  if let Some(psm) = args.psm {
    ocr = ocr.with_psm(psm);
  }

  let encoder: Box<dyn ImageEncoder> = match &args.encoder {
    Some(program) => {
      let mut encoder = ProcessImageEncoder::new(program).with_args(args.encoder_args.clone());
      if let Some(dir) = &args.encoded_dir {
        encoder = encoder.with_output_dir(dir);
      }
      Box::new(encoder)
    }
    None => Box::new(Base64ImageEncoder),
  };

  let mut input: Box<dyn QueryInputProvider> = match &args.manifest {
    Some(path) => Box::new(
      ManifestProvider::from_path(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))?,
    ),
    None => {
      println!("Welcome to the automated query builder!");
      Box::new(PromptProvider::stdio())
    }
  };

  let options = AssembleOptions {
    image: args.image,
    region: args.bounding_box,
    default_image: args.default_image,
    model: args.model,
    output_root: args.output_root,
  };

  let assembler = QueryAssembler::new(options, &ocr, encoder.as_ref());
  let result = assembler
    .run(input.as_mut())
    .await
    .context("Failed to assemble queries")?;

  match result.output_path {
    Some(path) => println!("\nQuery JSON has been written to {}", path.display()),
    None => println!("No queries were added."),
  }
  Ok(())
}
