//! Convert one HTML file (or stdin) to Markdown
//!
//! ```text
//! convert-file [--preserve-tables] [--nested=append|html] [--keep-data-uris] [file.html]
//! ```
//!
//! The Markdown goes to stdout, the suggested filename to stderr.
//! `RUST_LOG=debug` shows pipeline diagnostics.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use confluence_markdown_converter::converter::{ConversionOptions, NestedTableHandling};
use confluence_markdown_converter::handler::{handle_request_with, ConversionRequest};
use confluence_markdown_converter::HtmlConverter;
use log::debug;

struct Args {
    options: ConversionOptions,
    path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut options = ConversionOptions::default();
    let mut path = None;

    for arg in env::args().skip(1) {
        if arg == "--preserve-tables" {
            options.preserve_tables_as_html = true;
        } else if arg == "--keep-data-uris" {
            options.keep_data_uris = true;
        } else if let Some(mode) = arg.strip_prefix("--nested=") {
            options.nested_table_handling = mode
                .parse::<NestedTableHandling>()
                .map_err(|e| e.message().to_string())?;
        } else if arg.starts_with("--") {
            return Err(format!("Unknown option {}", arg));
        } else if path.is_none() {
            path = Some(arg);
        } else {
            return Err("Only one input file can be given".to_string());
        }
    }

    Ok(Args { options, path })
}

fn read_input(path: Option<&str>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "Usage: convert-file [--preserve-tables] [--nested=append|html] [--keep-data-uris] [file.html]"
            );
            process::exit(2);
        }
    };

    let body = match read_input(args.path.as_deref()) {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            process::exit(1);
        }
    };
    debug!("read {} bytes", body.len());

    let request = ConversionRequest {
        content_type: Some("text/html".to_string()),
        body,
    };
    let converter = HtmlConverter::with_options(args.options);
    let response = handle_request_with(&converter, &request);

    if response.status != 200 {
        eprintln!("{} {}", response.status, response.body_text());
        process::exit(1);
    }

    println!("{}", response.body_text());
    if let Some(disposition) = response.header("Content-Disposition") {
        eprintln!("{}", disposition);
    }
}
