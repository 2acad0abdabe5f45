use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use feed_scout::{
    Config, EpisodeRef, FeedProvider, FeedScoutError, SearchStringBuilder, Site, ThrottledFeed,
    load_episode_store, open_provider,
};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing_subscriber::EnvFilter;

/// Search indexing sites for TV releases and print a feed document
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current feed document of a site
    Feed {
        site: SiteArg,

        /// Produce the feed this many times, honoring the poll interval
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },

    /// Run a single search and print `title<TAB>locator` lines
    Search { site: SiteArg, query: String },

    /// Print the search strings for a show described in a JSON file
    Queries {
        /// JSON file with `show` and `episodes`
        file: PathBuf,

        #[command(subcommand)]
        scope: QueryScope,
    },
}

#[derive(Debug, Subcommand)]
enum QueryScope {
    /// Strings for all wanted episodes of a season (`3` or `2021-12`)
    Season { season: String },

    /// Strings for a single episode
    Episode {
        season: u32,
        episode: u32,

        /// Air date (YYYY-MM-DD), used for air-by-date shows
        #[arg(long)]
        airdate: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SiteArg {
    Torrentleech,
    Torrentz,
}

impl From<SiteArg> for Site {
    fn from(site: SiteArg) -> Self {
        match site {
            SiteArg::Torrentleech => Site::TorrentLeech,
            SiteArg::Torrentz => Site::Torrentz,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config, FeedScoutError> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => return Ok(Config::load()?),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn run(cli: Cli) -> Result<(), FeedScoutError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Feed { site, repeat } => {
            let provider = open_provider(site.into(), &config)?;
            let poll_interval = provider.profile().poll_interval;
            let mut feed = ThrottledFeed::new(provider, poll_interval);

            for round in 0..repeat.max(1) {
                if round > 0 {
                    // Wait for the next refresh to become due
                    thread::sleep(poll_interval);
                }
                println!("{}", feed.produce_feed());
            }
        }
        Command::Search { site, query } => {
            let mut provider = open_provider(site.into(), &config)?;

            for result in provider.search(&query) {
                println!("{}\t{}", result.title, result.locator);
            }
        }
        Command::Queries { file, scope } => {
            let store = load_episode_store(&file)?;
            let builder = SearchStringBuilder::new(config.search.naming_pattern.clone());

            let strings = match scope {
                QueryScope::Season { season } => {
                    builder.season_search_strings(store.show.as_ref(), &season, &store)
                }
                QueryScope::Episode {
                    season,
                    episode,
                    airdate,
                } => {
                    let episode = store.show.clone().map(|show| EpisodeRef {
                        show,
                        season,
                        episode,
                        airdate,
                    });
                    builder.episode_search_strings(episode.as_ref())
                }
            };

            for search_string in strings {
                println!("{}", search_string);
            }
        }
    }

    Ok(())
}

fn main() {
    // Logs go to stderr so stdout only carries the requested output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
