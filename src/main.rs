//! # chatlens CLI
//!
//! Command-line interface for the chatlens library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;

use chatlens::cli::{Args, LOG_ENV};
use chatlens::config::{FallbackTimestamp, ParserConfig};
use chatlens::format::write_to_format;
use chatlens::message::AttachmentKind;
use chatlens::{Chat, ChatParser, ChatlensError};

fn main() {
    let args = <Args as ClapParser>::parse();

    if let Err(e) = init_tracing(args.log_level()) {
        eprintln!("⚠️  {e}");
    }

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(level: &str) -> Result<(), String> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))
}

fn run(args: &Args) -> Result<(), ChatlensError> {
    let total_start = Instant::now();
    let output_path = args.output_path();

    // Print header
    println!("📦 chatlens v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", output_path);
    println!("📄 Format:  {}", args.format);
    if let Some(config) = &args.config {
        println!("⚙️  Config:  {}", config.display());
    }
    println!();

    let parser = build_parser(args)?;

    println!("⏳ Parsing...");
    let parse_start = Instant::now();
    let chat = parser.parse_path(&args.input)?.require_participants()?;
    println!(
        "   Found {} messages from {} participants ({:.2}s)",
        chat.messages().len(),
        chat.participants().len(),
        parse_start.elapsed().as_secs_f64()
    );

    if chat.stats.fallback_timestamps > 0 {
        let position = match parser.config().fallback_timestamp {
            FallbackTimestamp::ParseStart => "last",
            FallbackTimestamp::Epoch => "first",
        };
        println!(
            "⚠️  {} timestamps were not recognized and sort {}",
            chat.stats.fallback_timestamps, position
        );
    }

    if args.participants {
        println!();
        println!("👥 Participants:");
        for name in chat.participants() {
            println!("   {} ({} messages)", name, chat.messages_from(name).count());
        }
    }

    println!("💾 Writing {}...", args.format);
    let write_start = Instant::now();
    write_to_format(
        chat.messages(),
        &output_path,
        args.format,
        &args.output_config(),
    )?;
    println!("   Written in {:.2}s", write_start.elapsed().as_secs_f64());

    println!();
    println!("✅ Done! Output saved to {}", output_path);

    print_summary(&chat);

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

fn build_parser(args: &Args) -> Result<ChatParser, ChatlensError> {
    match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            ChatParser::with_config(ParserConfig::from_json(&json)?)
        }
        None => Ok(ChatParser::new()),
    }
}

fn print_summary(chat: &Chat) {
    let attachments: Vec<_> = chat
        .messages()
        .iter()
        .flat_map(|m| m.attachments())
        .collect();
    let missing = attachments
        .iter()
        .filter(|a| a.kind == AttachmentKind::Missing)
        .count();
    let links: usize = chat.messages().iter().map(|m| m.links().count()).sum();

    println!();
    println!("📊 Summary:");
    println!("   Messages:     {}", chat.messages().len());
    println!("   System:       {}", chat.stats.system_messages);
    println!(
        "   Attachments:  {} ({} missing from export)",
        attachments.len(),
        missing
    );
    println!("   Links:        {}", links);
    if chat.stats.dropped_lines > 0 {
        println!("   Dropped:      {} lines outside any message", chat.stats.dropped_lines);
    }
}
