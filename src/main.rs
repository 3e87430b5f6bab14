use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rfctext::{Eol, OutputMode, RenderOptions, convert_xml_to_text};

/// Render RFC/Internet-Draft XML to the classic IETF text format.
#[derive(Parser)]
#[command(name = "rfctext", version, about)]
struct Args {
    /// Input XML document
    input: PathBuf,

    /// Output file (defaults to the input name with a .txt extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Produce unpaginated text without headers and footers
    #[arg(long)]
    raw: bool,

    /// Page width in characters
    #[arg(long, default_value_t = 72)]
    width: usize,

    /// Left margin in characters
    #[arg(long, default_value_t = 3)]
    margin: usize,

    /// Use CRLF line endings
    #[arg(long)]
    crlf: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("txt"));

    let options = RenderOptions {
        width: args.width,
        margin: args.margin,
        mode: if args.raw {
            OutputMode::Raw
        } else {
            OutputMode::Paginated
        },
        eol: if args.crlf { Eol::CrLf } else { Eol::Lf },
    };

    match convert_xml_to_text(&args.input, &output, &options) {
        Ok(()) => {
            log::info!("Created file {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("rfctext: {e}");
            ExitCode::FAILURE
        }
    }
}
