//! Command handlers. Output goes to stdout as plain lines.

use std::sync::Arc;

use larder_client::RestClient;
use larder_core::{PantryItem, RecipeSummary, SearchMode, UserKey};
use larder_search::{SearchController, SearchPhase, SearchResults};
use larder_session::{resolve_user, HomeFeed, PantryService};
use larder_storage::{
    InMemoryKeyValueStore, KeyValueStore, LmdbKeyValueStore, ReadOrigin, RecommendationCache,
    RecommendationRead,
};

use crate::args::PantryCmd;
use crate::config::{CacheBackendKind, LarderConfig};
use crate::error::CliError;

type Cache = RecommendationCache<dyn KeyValueStore, RestClient>;

/// Everything a command needs, built once from the config.
pub struct Context {
    config: LarderConfig,
    client: Arc<RestClient>,
    cache: Arc<Cache>,
}

impl Context {
    pub fn new(config: LarderConfig) -> Result<Self, CliError> {
        let client = Arc::new(RestClient::new(&config.client_config())?);
        let store: Arc<dyn KeyValueStore> = match (config.cache.backend, &config.cache.path) {
            (CacheBackendKind::Lmdb, Some(path)) => {
                std::fs::create_dir_all(path).map_err(larder_storage::LmdbStoreError::from)?;
                Arc::new(LmdbKeyValueStore::new(path, config.cache.max_size_mb)?)
            }
            _ => Arc::new(InMemoryKeyValueStore::new()),
        };
        let cache = Arc::new(RecommendationCache::new(store, client.clone()));
        Ok(Self {
            config,
            client,
            cache,
        })
    }

    async fn user(&self, explicit: Option<String>) -> UserKey {
        match explicit {
            Some(name) => UserKey::user(name),
            None => resolve_user(self.client.as_ref()).await,
        }
    }
}

pub async fn search(
    ctx: &Context,
    term: String,
    mode: SearchMode,
    pages: u32,
    preview: bool,
) -> Result<(), CliError> {
    let config = if preview {
        ctx.config.preview_search()
    } else {
        ctx.config.results_search()
    };
    let controller = SearchController::new(ctx.client.clone(), config);
    controller.set_mode(mode);
    controller.set_term(term);

    let mut snapshot = controller.settled().await;
    let mut loaded = 1;
    while config.paginate
        && snapshot.phase == SearchPhase::Settled
        && snapshot.has_more
        && loaded < pages
    {
        controller.request_next_page();
        snapshot = controller.settled().await;
        loaded += 1;
    }

    if snapshot.phase == SearchPhase::Failed {
        if let Some(err) = snapshot.last_error {
            if snapshot.results.recipes().is_empty() {
                return Err(err.into());
            }
            tracing::warn!(page = snapshot.page, error = %err, "Stopped paging after a failure");
        }
    }

    match &snapshot.results {
        SearchResults::Empty => println!("Enter a search term."),
        SearchResults::Loading => {}
        SearchResults::NoMatches => println!("No recipes found."),
        SearchResults::Recipes(recipes) => print_recipes(recipes),
    }
    tracing::info!(
        mode = %snapshot.mode,
        pages = snapshot.page,
        count = snapshot.results.recipes().len(),
        has_more = snapshot.has_more,
        "Search finished"
    );
    Ok(())
}

pub async fn recommend(ctx: &Context, user: Option<String>) -> Result<(), CliError> {
    let user = ctx.user(user).await;
    let read = ctx.cache.get_recommendations(&user).await;
    print_recommendations(&read);

    let stats = ctx.cache.stats();
    tracing::debug!(
        user = %user,
        hits = stats.hits,
        misses = stats.misses,
        backend_failures = stats.backend_failures,
        "Recommendation cache stats"
    );
    Ok(())
}

pub async fn pantry(ctx: &Context, action: PantryCmd) -> Result<(), CliError> {
    let user = ctx.user(None).await;
    let pantry = PantryService::new(ctx.client.clone(), ctx.cache.clone(), user);

    match action {
        PantryCmd::List => {
            let items = pantry.items().await?;
            if items.is_empty() {
                println!("Your pantry is empty.");
            }
            for item in &items {
                println!("{}", format_item(item));
            }
        }
        PantryCmd::Add {
            name,
            amount,
            units,
        } => {
            pantry.add_item(&name, amount, &units).await?;
            println!("Added {}", name.trim());
        }
        PantryCmd::Remove { name } => {
            pantry.remove_item(&name).await?;
            println!("Removed {}", name.trim());
        }
    }
    Ok(())
}

pub async fn home(ctx: &Context) -> Result<(), CliError> {
    let user = ctx.user(None).await;
    let feed = HomeFeed::new(ctx.client.clone(), ctx.cache.clone(), ctx.config.home.clone());
    let data = feed.load(&user).await;

    println!("== Recommended for {} ==", user);
    print_recommendations(&data.recommendations);
    if !data.featured.is_empty() {
        println!();
        println!("== Featured ==");
        print_recipes(&data.featured);
    }
    for shelf in &data.shelves {
        println!();
        println!("== {} ==", shelf.name);
        print_recipes(&shelf.recipes);
    }
    Ok(())
}

fn print_recommendations(read: &RecommendationRead) {
    match read.origin() {
        ReadOrigin::Cache { cached_at } => println!("(cached at {})", cached_at),
        ReadOrigin::Backend { fetched_at } => println!("(fetched at {})", fetched_at),
        ReadOrigin::Unavailable { reason } => {
            println!("Recommendations unavailable: {}", reason);
            return;
        }
    }
    if read.recipes().is_empty() {
        println!("No recommendations yet.");
    }
    print_recipes(read.recipes());
}

fn print_recipes(recipes: &[RecipeSummary]) {
    for recipe in recipes {
        println!("{}\t{}", recipe.id, recipe.name);
    }
}

fn format_item(item: &PantryItem) -> String {
    if item.units.is_empty() {
        format!("{}\t{}", item.name, item.amount)
    } else {
        format!("{}\t{} {}", item.name, item.amount, item.units)
    }
}
