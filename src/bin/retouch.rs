//! CLI for Retouch - prompt-driven image editing.

use clap::{Args, Parser, Subcommand};
use retouch::{
    data_uri, ClientConfig, FileDownloader, GeminiTransformer, SelectedFile, TransformController,
    TransformSession, DEFAULT_DOWNLOAD_NAME,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Edit an image by describing the change (Gemini 2.5 Flash Image)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform one image and save the result
    Edit(EditArgs),

    /// Interactive session: open, prompt, run, save
    Shell(ShellArgs),
}

#[derive(Args)]
struct EditArgs {
    /// Input image (JPG, PNG, WebP, GIF; max 5 MB)
    input: PathBuf,

    /// Description of the edit
    #[arg(short, long)]
    prompt: String,

    /// Directory the result is saved into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShellArgs {
    /// Directory results are saved into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

type Controller = TransformController<GeminiTransformer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    let transformer = GeminiTransformer::builder().config(config).build()?;
    let controller = TransformController::new(transformer);

    match cli.command {
        Commands::Edit(args) => edit(&controller, args).await,
        Commands::Shell(args) => shell(&controller, args).await,
    }
}

async fn edit(controller: &Controller, args: EditArgs) -> anyhow::Result<()> {
    let file = SelectedFile::from_path(&args.input).await?;
    controller.select_image(&file).await;
    if controller.session().error.is_none() {
        controller.edit_prompt(&args.prompt);
        controller.submit_transform().await;
    }

    let session = controller.session();
    let saved = controller.download(&FileDownloader::new(&args.output_dir));
    let output = args.output_dir.join(DEFAULT_DOWNLOAD_NAME);

    if args.json {
        let result = serde_json::json!({
            "success": session.error.is_none(),
            "input": args.input.display().to_string(),
            "output": saved.then(|| output.display().to_string()),
            "size_bytes": session.transformed_image.as_deref().and_then(payload_size),
            "error": session.error,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if saved {
        println!("Transformed image: {}", output.display());
    }

    if let Some(message) = session.error {
        anyhow::bail!(message);
    }
    Ok(())
}

async fn shell(controller: &Controller, args: ShellArgs) -> anyhow::Result<()> {
    let downloader = FileDownloader::new(&args.output_dir);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("retouch shell - type 'help' for commands");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "open" => match SelectedFile::from_path(rest).await {
                Ok(file) => controller.select_image(&file).await,
                Err(e) => println!("cannot open {rest}: {e}"),
            },
            "prompt" => controller.edit_prompt(rest),
            "run" => {
                let session = controller.session();
                if session.is_busy {
                    println!("a transform is already running");
                    continue;
                }
                if session.can_submit() {
                    println!("transforming...");
                }
                controller.submit_transform().await;
            }
            "save" => {
                if controller.download(&downloader) {
                    println!(
                        "saved {}",
                        downloader.dir().join(DEFAULT_DOWNLOAD_NAME).display()
                    );
                } else {
                    println!("nothing to save yet");
                }
            }
            "dismiss" => controller.dismiss_error(),
            "reset" => controller.reset(),
            "status" => {}
            "help" => {
                print_help();
                continue;
            }
            "quit" | "exit" => break,
            other => {
                println!("unknown command: {other} (try 'help')");
                continue;
            }
        }
        print_status(&controller.session());
    }

    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  open <path>     select a source image");
    println!("  prompt <text>   describe the edit");
    println!("  run             transform the image");
    println!("  save            save the result as {DEFAULT_DOWNLOAD_NAME}");
    println!("  dismiss         clear the error message");
    println!("  reset           start over");
    println!("  status          show the session");
    println!("  quit            leave the shell");
}

fn print_status(session: &TransformSession) {
    if let Some(ref message) = session.error {
        println!("! {message}");
    }
    match session.original_image.as_deref().and_then(describe_image) {
        Some(desc) => println!("  original:    {desc}"),
        None => println!("  original:    (none)"),
    }
    println!("  prompt:      {:?}", session.prompt);
    if session.is_busy {
        println!("  result:      (working)");
    } else {
        match session.transformed_image.as_deref().and_then(describe_image) {
            Some(desc) => println!("  result:      {desc}"),
            None => println!("  result:      (none)"),
        }
    }
}

fn describe_image(uri: &str) -> Option<String> {
    let decoded = data_uri::decode(uri).ok()?;
    let size = payload_size(uri)?;
    Some(format!("{} ({} bytes)", decoded.media_type, size))
}

fn payload_size(uri: &str) -> Option<usize> {
    data_uri::decode(uri).ok()?.bytes().ok().map(|b| b.len())
}
