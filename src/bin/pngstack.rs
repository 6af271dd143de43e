use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "pngstack", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode one raw pixel buffer as a PNG.
    Encode(EncodeArgs),
    /// Composite the layers of a stack manifest and encode the result as a PNG.
    Stack(StackArgs),
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Raw pixel file.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    width: i32,

    #[arg(long)]
    height: i32,

    /// Pixel layout: gray, rgb, bgr, rgba or bgra.
    #[arg(long, default_value = "rgba")]
    format: pngstack::PixelFormat,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StackArgs {
    /// Stack manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Encode on the worker pool instead of the main thread.
    #[arg(long = "async")]
    run_async: bool,

    /// Override encode worker threads (async mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Encode(args) => cmd_encode(args),
        Command::Stack(args) => cmd_stack(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read raw pixels '{}'", args.in_path.display()))?;
    let image = pngstack::RawImage::new(&bytes, args.width, args.height, args.format)?;
    let png = image.encode_sync()?;
    write_output(&args.out, &png)
}

fn cmd_stack(args: StackArgs) -> anyhow::Result<()> {
    let manifest = pngstack::StackManifest::load(&args.in_path)?;
    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let stack = manifest.build(root)?;

    let encoded = if args.run_async {
        let mut queue = pngstack::EncodeQueue::new(pngstack::EncodeQueueOpts {
            threads: args.threads,
        })?;
        let slot = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&slot);
        stack.encode_async(&mut queue, move |res| *sink.borrow_mut() = Some(res));
        queue.run_until_idle()?;
        slot.borrow_mut()
            .take()
            .context("encode callback did not run (bug)")??
    } else {
        stack.encode_sync()?
    };

    write_output(&args.out, &encoded.bytes)?;
    if let Some(dims) = encoded.dimensions {
        println!("{}", serde_json::to_string(&dims)?);
    }
    Ok(())
}

fn write_output(out: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, bytes).with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
