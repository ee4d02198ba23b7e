use clap::{Args, Parser, Subcommand};
use log::info;
use songcards::cards::{
    BackFields, YearRange,
    layout::{MAX_CARDS_PER_ROW, MAX_ROWS_PER_PAGE},
    qr::default_scratch_root,
};
use songcards::clients::errors::Result;
use songcards::generator::{ConfigBuilder, DEFAULT_CARD_LIMIT, GenerateRequest, Generator};
use songcards::server;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "songcards")]
#[command(version, about = "Turn a Spotify playlist into printable song cards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the cards of a playlist to a PDF file
    Generate(GenerateArgs),
    /// Serve the web form
    Serve {
        /// Address to listen on, defaults to SONGCARDS_BIND or 127.0.0.1:5000
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Playlist share URL, URI or id
    #[arg(short, long)]
    playlist: String,

    #[arg(short, long, default_value = "print_me.pdf")]
    output: PathBuf,

    /// Maximum number of cards
    #[arg(short, long, default_value_t = DEFAULT_CARD_LIMIT)]
    limit: i64,

    #[arg(long, default_value_t = 8, value_parser = grid_count)]
    cards_per_row: usize,

    #[arg(long, default_value_t = 3, value_parser = grid_count)]
    rows_per_page: usize,

    /// Earliest release year to include
    #[arg(long)]
    year_from: Option<i32>,

    /// Latest release year to include
    #[arg(long)]
    year_to: Option<i32>,

    /// Seed for a reproducible draw
    #[arg(long)]
    seed: Option<u64>,

    /// Leave the album line off the back of the cards
    #[arg(long)]
    no_album: bool,

    /// Read playlist items from a saved API page instead of Spotify
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Write each QR code to a temporary directory under this path while rendering
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Like --scratch-dir, under the user cache directory
    #[arg(long, conflicts_with = "scratch_dir")]
    scratch: bool,
}

fn grid_count(value: &str) -> std::result::Result<usize, String> {
    let max = MAX_CARDS_PER_ROW.min(MAX_ROWS_PER_PAGE);
    match value.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(format!("expected a number from 1 to {max}")),
    }
}

impl GenerateArgs {
    fn request(&self) -> GenerateRequest {
        let mut request = GenerateRequest::new(self.playlist.clone());
        request.card_limit = self.limit;
        request.cards_per_row = self.cards_per_row;
        request.rows_per_page = self.rows_per_page;
        request.years = YearRange::new(self.year_from, self.year_to);
        request.seed = self.seed;
        if self.no_album {
            request.fields = BackFields::without_album();
        }
        request
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate(args) => {
            generate_cards(args).await?;
        }
        Commands::Serve { bind } => {
            let bind = bind
                .clone()
                .or_else(|| std::env::var("SONGCARDS_BIND").ok())
                .unwrap_or_else(|| server::DEFAULT_BIND.to_string());
            server::serve(&bind).await?;
        }
    }
    Ok(())
}

async fn generate_cards(args: &GenerateArgs) -> Result<()> {
    info!("Building config ...");
    let mut builder = ConfigBuilder::new();
    if let Some(fixture) = &args.fixture {
        builder = builder.fixture(fixture);
    }
    if let Some(root) = &args.scratch_dir {
        builder = builder.scratch_root(root);
    } else if args.scratch {
        builder = builder.scratch_root(default_scratch_root());
    }
    let generator = Generator::new(builder.with_env().build()?);

    let mut pdf = Vec::new();
    let summary = generator.generate(&args.request(), &mut pdf).await?;
    tokio::fs::write(&args.output, pdf).await?;
    info!(
        "Wrote {} cards on {} sheet sides to {:?}",
        summary.cards, summary.sheet_sides, args.output
    );
    Ok(())
}
