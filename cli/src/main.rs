//! glyphmark CLI - PDF to Markdown conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use glyphmark::{
    convert_file, convert_file_with_password, to_json, ConvertOptions, Conversion, Error,
    JsonFormat,
};

#[derive(Parser)]
#[command(name = "glyphmark")]
#[command(version)]
#[command(about = "Reconstruct Markdown from PDF layout", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to Markdown
    Convert {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Enable OCR for pages without extractable text
        #[arg(long)]
        ocr: bool,

        /// OCR language code (ISO 639)
        #[arg(long, value_name = "ISO", default_value = "eng")]
        language: String,

        /// Disable table detection
        #[arg(long)]
        no_tables: bool,

        /// Disable math tokenization
        #[arg(long)]
        no_math: bool,

        /// Keep repeating headers and footers
        #[arg(long)]
        no_header_footer_removal: bool,

        /// Keep hyphenation at line breaks
        #[arg(long)]
        no_hyphenation_fix: bool,

        /// Preserve blank-line runs and short lines
        #[arg(long)]
        preserve_layout: bool,

        /// Password for encrypted documents
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,

        /// Print conversion statistics as JSON to stderr
        #[arg(long)]
        stats: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            ocr,
            language,
            no_tables,
            no_math,
            no_header_footer_removal,
            no_hyphenation_fix,
            preserve_layout,
            password,
            stats,
        } => {
            let mut options = ConvertOptions::default();
            if ocr {
                options = options.with_ocr(language);
            }
            if no_tables {
                options = options.without_tables();
            }
            if no_math {
                options = options.without_math();
            }
            if no_header_footer_removal {
                options = options.without_header_footer_removal();
            }
            if no_hyphenation_fix {
                options = options.without_hyphenation_fix();
            }
            if preserve_layout {
                options = options.with_preserved_layout();
            }

            cmd_convert(&input, output.as_deref(), password.as_deref(), &options, stats)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    password: Option<&str>,
    options: &ConvertOptions,
    print_stats: bool,
) -> Result<(), Error> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("converting {}", input.display()));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let conversion = match password {
        Some(pw) => convert_file_with_password(input, pw, options),
        None => convert_file(input, options),
    }?;

    spinner.finish_and_clear();

    report(&conversion);

    if print_stats {
        let json = to_json(&conversion, JsonFormat::Pretty)?;
        eprintln!("{}", json);
    }

    match output {
        Some(path) => {
            fs::write(path, conversion.markdown.as_bytes())?;
            eprintln!(
                "{} wrote {} ({} words, {} pages)",
                "ok:".green().bold(),
                path.display(),
                conversion.stats.word_count,
                conversion.stats.page_count
            );
        }
        None => println!("{}", conversion.markdown),
    }

    Ok(())
}

fn report(conversion: &Conversion) {
    for warning in &conversion.warnings {
        eprintln!(
            "{} page {}: {}",
            "warning:".yellow().bold(),
            warning.page,
            warning.message
        );
    }
    for advisory in &conversion.advisories {
        eprintln!(
            "{} page {} has a garbled math font ({:.1}% damaged); consider vision reprocessing",
            "note:".cyan().bold(),
            advisory.page,
            advisory.advisory.garbled_percentage
        );
    }
}

/// Stable exit codes: 2 unreadable input, 3 password required, 4 password
/// incorrect, 5 OCR unavailable, 1 anything else.
fn exit_code_for(err: &Error) -> u8 {
    match err {
        Error::InvalidInput(_) | Error::Io(_) | Error::Pdf(_) => 2,
        Error::PasswordRequired => 3,
        Error::PasswordIncorrect => 4,
        Error::OcrUnavailable(_) => 5,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&Error::InvalidInput("x".to_string())), 2);
        assert_eq!(exit_code_for(&Error::PasswordRequired), 3);
        assert_eq!(exit_code_for(&Error::PasswordIncorrect), 4);
        assert_eq!(exit_code_for(&Error::OcrUnavailable("x".to_string())), 5);
        assert_eq!(exit_code_for(&Error::Cancelled), 1);
    }

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "glyphmark",
            "convert",
            "paper.pdf",
            "-o",
            "out.md",
            "--ocr",
            "--language",
            "deu",
            "--no-tables",
            "--no-math",
            "--no-header-footer-removal",
            "--no-hyphenation-fix",
            "--preserve-layout",
            "--password",
            "secret",
            "--stats",
        ])
        .unwrap();

        let Commands::Convert {
            input,
            ocr,
            language,
            no_tables,
            password,
            ..
        } = cli.command;
        assert_eq!(input, PathBuf::from("paper.pdf"));
        assert!(ocr);
        assert_eq!(language, "deu");
        assert!(no_tables);
        assert_eq!(password.as_deref(), Some("secret"));
    }
}
