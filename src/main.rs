mod api;
mod battle;
mod cache;
mod config;
mod lineage;
mod render;
mod store;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::api::cached_client::CachedPokeClient;
use crate::api::error::ApiError;
use crate::api::types::FavoriteEntry;
use crate::battle::VsSession;
use crate::config::Config;
use crate::store::{SearchMode, Store};

#[derive(Parser)]
#[command(name = "pokedex", version, about = "A terminal Pokédex for the public PokeAPI")]
struct Args {
  /// Path to config file
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Look up a creature or ability by name or id
  Search {
    query: String,
    /// What to search for; defaults to the mode of the previous search
    #[arg(short, long, value_enum)]
    mode: Option<SearchMode>,
  },
  /// Show recent searches
  History {
    /// Remove one entry (and its cached response) by creature id
    #[arg(long)]
    delete: Option<u32>,
  },
  /// Manage favorite creatures
  Favorites {
    #[command(subcommand)]
    action: Option<FavoritesAction>,
  },
  /// Compare two creatures head to head
  Vs { first: String, second: String },
}

#[derive(Subcommand)]
enum FavoritesAction {
  /// List favorites (the default)
  List,
  /// Add a creature by name or id
  Add { query: String },
  /// Remove a favorite by creature id
  Remove { id: u32 },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;

  let store = Arc::new(Store::open(config.data_dir.as_deref())?);
  let client = CachedPokeClient::new(&config, Arc::clone(&store))?;

  match args.command {
    Command::Search { query, mode } => run_search(&client, &config, &query, mode).await,
    Command::History { delete } => run_history(&store, delete),
    Command::Favorites { action } => run_favorites(&client, action).await,
    Command::Vs { first, second } => run_vs(&client, &first, &second).await,
  }
}

async fn run_search(
  client: &CachedPokeClient,
  config: &Config,
  query: &str,
  mode: Option<SearchMode>,
) -> Result<()> {
  // An explicit mode becomes the default for the next bare search.
  let mode = match mode {
    Some(mode) => {
      client.store().set_last_search_mode(mode);
      mode
    }
    None => client.store().last_search_mode(),
  };

  match mode {
    SearchMode::Creature => match client.fetch_creature_with_lineage(query).await {
      Ok(lookup) => {
        let layout = lineage::classify(&lookup.lineage, lookup.record.id);
        let is_favorite = client.store().is_favorite(lookup.record.id);
        print!(
          "{}",
          render::creature_card(
            &lookup.record,
            layout.as_ref(),
            lookup.cache_sourced,
            is_favorite
          )
        );
        Ok(())
      }
      Err(err) => report_search_error(query, err),
    },
    SearchMode::Ability => match client.fetch_ability_with_holders(query).await {
      Ok(lookup) => {
        print!(
          "{}",
          render::ability_card(&lookup.record, &lookup.holders, &config.language)
        );
        Ok(())
      }
      Err(err) => report_search_error(query, err),
    },
  }
}

/// Log the failure for operators, print a generic line for the user, and
/// exit nonzero.
fn report_search_error(query: &str, err: ApiError) -> Result<()> {
  error!(query, %err, "search failed");
  println!("{}", err.user_message());
  std::process::exit(1);
}

fn run_history(store: &Store, delete: Option<u32>) -> Result<()> {
  let history = match delete {
    Some(id) => store.remove_from_history(id),
    None => store.history(),
  };

  let favorite_ids: Vec<u32> = store.favorites().iter().map(|f| f.id).collect();
  print!("{}", render::history_list(&history, &favorite_ids));

  Ok(())
}

async fn run_favorites(client: &CachedPokeClient, action: Option<FavoritesAction>) -> Result<()> {
  match action.unwrap_or(FavoritesAction::List) {
    FavoritesAction::List => {
      print!("{}", render::favorites_list(&client.store().favorites()));
      Ok(())
    }
    FavoritesAction::Add { query } => match client.fetch_creature(&query).await {
      Ok((record, _)) => {
        let favorites = client
          .store()
          .add_to_favorites(FavoriteEntry::from_record(&record));
        print!("{}", render::favorites_list(&favorites));
        Ok(())
      }
      Err(err) => report_search_error(&query, err),
    },
    FavoritesAction::Remove { id } => {
      let favorites = client.store().remove_from_favorites(id);
      print!("{}", render::favorites_list(&favorites));
      Ok(())
    }
  }
}

async fn run_vs(client: &CachedPokeClient, first: &str, second: &str) -> Result<()> {
  let mut session = VsSession::default();

  match client.fetch_creature(first).await {
    Ok((record, _)) => session.set_slot(0, record),
    Err(err) => return report_search_error(first, err),
  }
  match client.fetch_creature(second).await {
    Ok((record, _)) => session.set_slot(1, record),
    Err(err) => return report_search_error(second, err),
  }

  if let (Some(first), Some(second), Some(report)) =
    (session.slot(0), session.slot(1), session.report())
  {
    print!("{}", render::battle_report(first, second, &report));
  }

  Ok(())
}
