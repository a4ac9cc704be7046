// fontpress: render text in a downloaded font, or a plain color, from the command line.
//
// Subcommands:
//   color  a document filled with one color
//   font   a line of text in a font given by family name or URL
//
// The JSON response is printed to stdout. Errors are printed as `{msg, id}`
// bodies and make the process exit with status 1.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use fontpress::api::{Api, ColorRequest, FontRequest};
use fontpress::configure::Settings;
use fontpress::font::HttpFetcher;
use fontpress::{FontpressError, VectorDocument};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "fontpress", about = "Render text or colors to PDF and PNG")]
struct Cli {
    /// Settings file in TOML format
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write the rendered file here
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    /// Print the intermediate SVG document to stderr
    #[arg(long, global = true)]
    svg: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Cmd {
    /// Render a document filled with a single color
    Color {
        /// Output file type: pdf or png
        filetype: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long)]
        color: String,
    },
    /// Render a line of text in a downloaded font
    Font {
        /// Output file type: pdf or png
        filetype: String,
        /// Font family name or URL of a font file or ZIP archive
        #[arg(long)]
        fontname: String,
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "black")]
        color: String,
        /// Background color, or `none` for a transparent PNG
        #[arg(long, default_value = "white")]
        bg_color: String,
        /// Pick the font file whose name contains this
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        dpi: Option<u32>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };

    let fetcher = HttpFetcher::new(&settings.fetch);
    let api = Api::new(fetcher, settings).map_err(|e| e.to_string())?;
    let start = Instant::now();

    let (document, bytes, body) = match cli.command {
        Cmd::Color {
            filetype,
            width,
            height,
            color,
        } => {
            let request = ColorRequest {
                filetype,
                width,
                height,
                color,
            };
            let artifact = api
                .render_color(&request)
                .map_err(|e| report(&api, e))?;
            let body = artifact.to_json(start.elapsed());
            (artifact.document, artifact.bytes, body)
        }
        Cmd::Font {
            filetype,
            fontname,
            text,
            color,
            bg_color,
            weight,
            dpi,
        } => {
            let request = FontRequest {
                filetype,
                fontname,
                text,
                color,
                bg_color,
                weight,
                dpi,
            };
            let artifact = api.render_font(&request).map_err(|e| report(&api, e))?;
            let body = artifact.to_json(start.elapsed());
            (artifact.document, artifact.bytes, body)
        }
    };

    write_outputs(&document, &bytes, cli.out.as_deref(), cli.svg)?;
    println!("{body}");

    Ok(())
}

/// Print the error body and turn the error into a message for the exit path.
fn report<F: fontpress::font::Fetch>(api: &Api<F>, error: FontpressError) -> String {
    println!("{}", api.error(&error));
    error.to_string()
}

fn write_outputs(
    document: &VectorDocument,
    bytes: &[u8],
    out: Option<&Path>,
    svg: bool,
) -> Result<(), String> {
    if svg {
        eprintln!("{}", document.to_svg());
    }

    if let Some(path) = out {
        std::fs::write(path, bytes).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        info!("wrote {} bytes to {}", bytes.len(), path.display());
    }

    Ok(())
}
