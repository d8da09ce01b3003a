use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use kinetic_viewer::config::AppConfig;
use kinetic_viewer::error::VoteError;
use kinetic_viewer::gallery::{Direction, GalleryMode, GalleryScreen, Transition};
use kinetic_viewer::sensor::{MotionSource, TraceSource, UnavailableSource};
use kinetic_viewer::state::{
    capture_folder, confirm_pending, Category, Leaderboard, Library, LocalObjectStore,
    PendingCaptures, PhotoRecord, Session,
};
use kinetic_viewer::vote::{SqliteVoteStore, VoteCoordinator};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "kinetic-viewer")]
#[command(about = "Tilt-controlled photo gallery with per-photo voting")]
struct Cli {
    /// JSON config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse a category, driven by a recorded motion trace
    Gallery(GalleryArgs),
    /// Capture every image in a folder and confirm them into a category
    Upload(UploadArgs),
    /// Vote for a photo
    Vote(VoteArgs),
    /// Show the most voted photos of a category
    Stats(StatsArgs),
    /// List the photos uploaded by one user
    Mine(MineArgs),
}

#[derive(Debug, Args)]
struct GalleryArgs {
    /// pretty | ugly
    #[arg(long)]
    category: Category,
    /// Motion trace to replay; without one the gallery runs in manual mode
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Manual steps applied after the trace, e.g. `next,next,prev`
    #[arg(long, value_delimiter = ',')]
    steps: Vec<Direction>,
}

#[derive(Debug, Args)]
struct UploadArgs {
    #[arg(long)]
    category: Category,
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: Option<String>,
    /// Folder with the captured JPEG/PNG files
    folder: PathBuf,
}

#[derive(Debug, Args)]
struct VoteArgs {
    #[arg(long)]
    photo: String,
    #[arg(long)]
    voter: String,
}

#[derive(Debug, Args)]
struct StatsArgs {
    #[arg(long)]
    category: Category,
}

#[derive(Debug, Args)]
struct MineArgs {
    #[arg(long)]
    email: String,
}

#[tokio::main]
async fn main() -> CliResult {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let library = Library::open(&config.database_path()?)?;

    match cli.command {
        Commands::Gallery(args) => {
            let sequence = library.confirmed_in_category(args.category)?;
            println!("🖼️  Galería {} ({} photos)", args.category, sequence.len());
            match args.trace {
                Some(path) => {
                    run_gallery(sequence, TraceSource::load(path)?, &args.steps, &config).await
                }
                None => run_gallery(sequence, UnavailableSource, &args.steps, &config).await,
            }
        }
        Commands::Upload(args) => {
            let mut session = Session::new(args.email.clone(), args.email);
            if let Some(name) = args.name {
                session = session.with_display_name(name);
            }

            let mut pending = PendingCaptures::new();
            let captured = capture_folder(&args.folder, &mut pending)?;
            if captured == 0 {
                println!("📭 No JPEG or PNG files in {}", args.folder.display());
                return Ok(());
            }

            let store = LocalObjectStore::new(config.object_store_dir()?)?;
            let stored = confirm_pending(&library, &store, &mut pending, &session, args.category)?;
            println!("✅ Uploaded {} photos to {}", stored.len(), args.category);
            for photo in &stored {
                println!("   {}  {}", photo.id, photo.image_url);
            }
            Ok(())
        }
        Commands::Vote(args) => {
            let coordinator = VoteCoordinator::new(SqliteVoteStore::new(library.path()));
            match coordinator.vote(&args.photo, &args.voter).await {
                Ok(receipt) => {
                    println!("👍 Vote counted. Photo now has {} votes.", receipt.vote_count);
                    Ok(())
                }
                Err(VoteError::AlreadyVoted) => {
                    println!("ℹ️  You already voted for this photo.");
                    Ok(())
                }
                Err(VoteError::PhotoNotFound(id)) => {
                    println!("⚠️  Photo {id} no longer exists. Refresh the gallery.");
                    Ok(())
                }
                Err(err) => Err(err.into()),
            }
        }
        Commands::Stats(args) => {
            let board = Leaderboard::load(&library, args.category, config.leaderboard_size)?;
            println!("📊 {}", board.title());
            for entry in &board.entries {
                let share = board.share(entry);
                let bar = "█".repeat((share * 30.0).round() as usize);
                println!(
                    "   {:<12} {:<30} {:>3} votes ({:.0}%)",
                    entry.short_label,
                    bar,
                    entry.votes,
                    share * 100.0
                );
            }
            Ok(())
        }
        Commands::Mine(args) => {
            let photos = library.photos_by_uploader(&args.email)?;
            println!("📷 {} photos by {}", photos.len(), args.email);
            for photo in &photos {
                println!(
                    "   {}  {:<12}  {}  {} votes",
                    photo.id,
                    photo.category.display_name(),
                    photo.created_at.format("%d/%m/%Y %H:%M:%S"),
                    photo.vote_count
                );
            }
            Ok(())
        }
    }
}

/// Mount the gallery, apply every gesture in the trace and then the manual
/// steps, then tear down. Images are treated as loaded as soon as they are shown.
async fn run_gallery<S: MotionSource + Clone>(
    sequence: Vec<PhotoRecord>,
    source: S,
    steps: &[Direction],
    config: &AppConfig,
) -> CliResult {
    let mut screen = GalleryScreen::mount(sequence, source, config.sensor).await;

    if screen.navigator().is_empty() {
        println!("📭 Nothing to show yet.");
        return Ok(());
    }
    if screen.mode() == GalleryMode::Manual {
        println!("✋ No motion data, manual navigation only.");
    }

    show_current(&mut screen, 0);

    while let Some((event, transition)) = screen.next_event().await {
        match transition {
            Transition::Moved { to, .. } => {
                println!("↪️  {} at {} ms", event.orientation, event.at.as_millis());
                show_current(&mut screen, to);
            }
            Transition::Display(mode) => {
                println!("🔄 {} at {} ms: {:?} layout", event.orientation, event.at.as_millis(), mode);
            }
            Transition::Ignored | Transition::Empty => {}
        }
    }

    for direction in steps {
        if let Transition::Moved { to, .. } = screen.step(*direction) {
            println!("👉 {:?}", direction);
            show_current(&mut screen, to);
        }
    }

    screen.teardown();
    Ok(())
}

fn show_current(screen: &mut GalleryScreen, index: usize) {
    if let Some(photo) = screen.navigator().current().cloned() {
        print_photo(index, &photo);
        screen.image_loaded(&photo.id);
    }
}

fn print_photo(index: usize, photo: &PhotoRecord) {
    println!(
        "   [{}] {} subió esta foto · {} · Votos: {}",
        index,
        photo.uploader_label,
        photo.created_at.format("%d/%m/%Y %H:%M:%S"),
        photo.vote_count
    );
}
