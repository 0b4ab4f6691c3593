//! Command line arguments backing the `querykit` binary.
use clap::{Parser, Subcommand};
use querykit::BoundingBox;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "querykit",
  about = "Assemble region-filtered OCR query batches for document-understanding models",
  version
)]
pub struct Args {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Build query records and write them as one JSON batch
  Assemble(AssembleArgs),
}

#[derive(clap::Args, Debug)]
pub struct AssembleArgs {
  /// Image file to use for all queries
  #[arg(long, short = 'i', alias = "url", env = "QUERYKIT_IMAGE")]
  pub image: Option<PathBuf>,

  /// Bounding box "[x_min, y_min, x_max, y_max]" to use for all queries
  #[arg(long, short = 'b', env = "QUERYKIT_BOUNDING_BOX", allow_hyphen_values = true)]
  pub bounding_box: Option<BoundingBox>,

  /// JSON manifest with the queries; replaces interactive prompts
  #[arg(long, short = 'm')]
  pub manifest: Option<PathBuf>,

  /// Model tag written into the batch
  #[arg(long, env = "QUERYKIT_MODEL", default_value = querykit::DEFAULT_MODEL_TAG)]
  pub model: String,

  /// Directory that receives `<folder>/<batch name>.json`
  #[arg(long, short = 'o', env = "QUERYKIT_OUTPUT_ROOT", default_value = "queries")]
  pub output_root: PathBuf,

  /// Image used when an entered path does not exist
  #[arg(long)]
  pub default_image: Option<PathBuf>,

  /// External encoder program; the image is base64-encoded in process when omitted
  #[arg(long, env = "QUERYKIT_ENCODER")]
  pub encoder: Option<PathBuf>,

  /// Argument passed to the encoder before --image_dir (repeatable)
  #[arg(long = "encoder-arg", requires = "encoder", allow_hyphen_values = true)]
  pub encoder_args: Vec<String>,

  /// Directory the external encoder writes into (default: <image dir>/encoded_output)
  #[arg(long, requires = "encoder")]
  pub encoded_dir: Option<PathBuf>,

  /// Tesseract binary
  #[arg(long, env = "QUERYKIT_TESSERACT", default_value = "tesseract")]
  pub tesseract: PathBuf,

  /// Tesseract language list, e.g. eng+deu
  #[arg(long)]
  pub lang: Option<String>,

  /// Tesseract page segmentation mode
  #[arg(long)]
  pub psm: Option<u32>,

  /// Log debug details
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Only log warnings and errors
  #[arg(long, short = 'q', conflicts_with = "verbose")]
  pub quiet: bool,
}
