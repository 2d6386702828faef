use anyhow::Result;
use clap::{Parser, Subcommand};
use s3_photo_albums::app::AlbumManager;
use s3_photo_albums::models::{Album, AlbumView, Config};
use s3_photo_albums::Error;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "s3-photo-albums")]
#[command(about = "Browse, create and fill photo albums in an S3 bucket")]
struct CliArgs {
    /// Bucket to use instead of ALBUMS_BUCKET.
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// Region to use instead of ALBUMS_REGION.
    #[arg(long, global = true)]
    region: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Read only the first page of each listing.
    #[arg(long, global = true)]
    first_page_only: bool,

    /// Work against an empty in-memory bucket.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List albums in the bucket
    List,
    /// Create an album (prompts for a name when none is given)
    Create { name: Option<String> },
    /// Show the photos in an album
    View { album: String },
    /// Upload a .jpg or .png file into an album
    Upload { album: String, file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_photo_albums=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let manager = match AlbumManager::new(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match run(&manager, args.command, args.json).await {
        Ok(()) => Ok(()),
        Err(Error::InvalidAlbumName(_)) => {
            println!("Invalid album name.");
            std::process::exit(2);
        }
        Err(e @ Error::UnsupportedFile(_)) => {
            println!("{}", e);
            std::process::exit(2);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(args: &CliArgs) -> s3_photo_albums::Result<Config> {
    let mut config = match &args.bucket {
        // A bucket on the command line is enough; fill ALBUMS_BUCKET in for the lookup.
        Some(bucket) => {
            dotenvy::dotenv().ok();
            Config::from_vars(|name| match name {
                "ALBUMS_BUCKET" => Some(bucket.clone()),
                _ => std::env::var(name).ok(),
            })?
        }
        None => Config::from_env()?,
    };
    if let Some(region) = &args.region {
        config.region = region.clone();
    }
    config.first_page_only |= args.first_page_only;
    config.dry_run |= args.dry_run;
    Ok(config)
}

async fn run(manager: &AlbumManager, command: Command, json: bool) -> s3_photo_albums::Result<()> {
    match command {
        Command::List => {
            let albums = manager.list_albums().await?;
            print_albums(&albums, json)?;
        }
        Command::Create { name } => {
            let name = match name {
                Some(name) => name,
                None => match prompt("Enter album name...").await? {
                    Some(name) => name,
                    None => {
                        info!("Album creation cancelled");
                        return Ok(());
                    }
                },
            };
            manager.create_album(&name).await?;
            println!("Album created.");
            let albums = manager.list_albums().await?;
            print_albums(&albums, json)?;
        }
        Command::View { album } => {
            let view = manager.view_album(&album).await?;
            print_view(&view, json)?;
        }
        Command::Upload { album, file } => {
            let photo = manager.add_photo(&album, &file).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&photo)?);
            } else {
                println!("Photo uploaded.");
                println!("{}", photo.url);
            }
        }
    }
    Ok(())
}

/// Reads one line from stdin. `None` means the input was closed (cancel).
async fn prompt(message: &str) -> s3_photo_albums::Result<Option<String>> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(format!("{}: ", message).as_bytes()).await?;
    stderr.flush().await?;

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_albums(albums: &[Album], json: bool) -> s3_photo_albums::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(albums)?);
        return Ok(());
    }
    if albums.is_empty() {
        println!("No albums.");
    }
    for album in albums {
        println!("{}", album.name);
    }
    Ok(())
}

fn print_view(view: &AlbumView, json: bool) -> s3_photo_albums::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }
    println!("Album: {}", view.album);
    for photo in &view.photos {
        if photo.is_marker {
            println!("  {} (marker)", photo.key);
        } else {
            println!("  {}  {}", photo.file_name(), photo.url);
        }
    }
    println!("Add a photo with: s3-photo-albums upload {:?} <FILE>", view.album);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CliArgs, Command};
    use clap::Parser;

    #[test]
    fn test_parse_upload_command() {
        let args =
            CliArgs::try_parse_from(["s3-photo-albums", "upload", "Paris Trip", "photo.jpg"])
                .unwrap();
        match args.command {
            Command::Upload { album, file } => {
                assert_eq!(album, "Paris Trip");
                assert_eq!(file.to_str(), Some("photo.jpg"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_create_without_name_and_global_flags() {
        let args =
            CliArgs::try_parse_from(["s3-photo-albums", "create", "--json", "--bucket", "b"])
                .unwrap();
        assert!(matches!(args.command, Command::Create { name: None }));
        assert!(args.json);
        assert_eq!(args.bucket.as_deref(), Some("b"));
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(CliArgs::try_parse_from(["s3-photo-albums", "upload", "Trip"]).is_err());
    }
}
