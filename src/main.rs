mod api;
mod app;
mod cli;
mod detail;
mod event;
mod feed;
mod keys;
mod logging;
mod settings;
mod sources;
mod theme;
mod time;
mod tui;
mod views;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ratatui::Frame;

use api::{CacheMode, NewsClient, StoriesQuery, build_stories_query};
use app::{App, Home, View};
use cli::{Cli, Commands};
use event::Event;
use settings::{Config, Overrides, Settings};
use sources::FilterState;
use theme::{Theme, ThemeVariant};
use time::{TimeDisplay, format_date_with};
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = settings::config_dir(cli.config_dir.as_ref());
    let settings = config_dir
        .as_ref()
        .map(|dir| {
            let path = settings::settings_path(dir);
            if !path.exists()
                && let Err(e) = Settings::default().save(&path)
            {
                eprintln!("Warning: {:#}", e);
            }
            Settings::load(&path).unwrap_or_else(|e| {
                eprintln!("Warning: {:#}", e);
                Settings::default()
            })
        })
        .unwrap_or_default();

    let _log_guard = config_dir
        .as_ref()
        .and_then(|dir| match logging::init(dir, cli.verbose) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Logging disabled: {:#}", e);
                None
            }
        });

    let overrides = Overrides {
        api_url: cli.api_url.clone(),
        time_display: cli.local_time.then_some(TimeDisplay::Local),
        theme: cli.light.then_some(ThemeVariant::Light),
    };
    let config = Config::resolve(&settings, &overrides)?;
    let client = NewsClient::new(config.api_url.clone(), config.timeout, config.cache_ttl)
        .context("Failed to build HTTP client")?;
    tracing::info!(base_url = %client.base_url(), "client ready");

    match cli.command {
        Some(Commands::Stories {
            page,
            sources,
            search,
            fresh,
            json,
        }) => {
            let filters = if sources.is_empty() {
                FilterState::all(&config.catalog).with_search(search.as_deref().unwrap_or(""))
            } else {
                for key in &sources {
                    if config.catalog.name_for(key).is_none() {
                        eprintln!("Warning: unknown source '{}'", key);
                    }
                }
                FilterState::new(sources, search.as_deref())
            };
            let cache = if fresh {
                CacheMode::NoStore
            } else {
                CacheMode::Default
            };
            print_stories(&client, &config, page, &filters, cache, json).await
        }
        Some(Commands::Story { id, json }) => print_story(&client, &config, &id, json).await,
        Some(Commands::Sources) => {
            for source in config.catalog.sources() {
                println!("{:<24} {}", source.key, source.name);
            }
            Ok(())
        }
        None => run_tui(client, config).await,
    }
}

async fn print_stories(
    client: &NewsClient,
    config: &Config,
    page: u32,
    filters: &FilterState,
    cache: CacheMode,
    json: bool,
) -> Result<()> {
    if filters.selects_nothing() {
        println!("No dispatches available. Please select at least one source.");
        return Ok(());
    }

    tracing::info!(
        query = %build_stories_query(page, filters, &config.catalog),
        ?cache,
        "fetching stories"
    );
    let query = StoriesQuery::build(page, filters, &config.catalog);
    let response = client
        .fetch_stories(&query, cache)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        let out = serde_json::to_string_pretty(&response).context("Failed to serialize stories")?;
        println!("{}", out);
        return Ok(());
    }

    if response.items.is_empty() {
        println!("No stories available. Backend returned an empty response.");
    }
    let offset = response.pagination.offset();
    for (i, story) in response.items.iter().enumerate() {
        println!("{:>3}. {}", offset.saturating_add(i + 1), story.display_headline());
        println!(
            "     {}  [{}]",
            format_date_with(&story.latest_ref_article_at, config.time_display),
            story.id
        );
    }
    let trailer = if response.pagination.has_next {
        format!("more with --page {}", response.pagination.page + 1)
    } else {
        "end of dispatches".to_string()
    };
    println!(
        "\nPage {} of {} stories, {}",
        response.pagination.page, response.pagination.total, trailer
    );
    Ok(())
}

async fn print_story(client: &NewsClient, config: &Config, id: &str, json: bool) -> Result<()> {
    let detail = match client.fetch_story_detail(id).await {
        Ok(detail) => detail,
        Err(e) if e.is_not_found() => bail!("Story not found"),
        Err(e) => bail!(e.user_message()),
    };

    if json {
        let out = serde_json::to_string_pretty(&detail).context("Failed to serialize story")?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", detail.display_headline());
    println!(
        "Updated {}\n",
        format_date_with(&detail.latest_ref_article_at, config.time_display)
    );
    for bullet in detail.summary_bullets() {
        for (i, line) in textwrap::wrap(bullet, 76).iter().enumerate() {
            println!("{} {}", if i == 0 { "•" } else { " " }, line);
        }
    }
    if !detail.ref_articles.is_empty() {
        println!("\nReferences:");
    }
    for (i, article) in detail.ref_articles.iter().enumerate() {
        println!("  {}. {}", i + 1, article.display_title(i));
        let date = article
            .published_at()
            .map(|d| format!(", {}", format_date_with(d, config.time_display)))
            .unwrap_or_default();
        println!("     {}{}", article.display_source(), date);
        if let Some(link) = article.link() {
            println!("     {}", link);
        }
    }
    Ok(())
}

async fn run_tui(client: NewsClient, config: Config) -> Result<()> {
    let home = app::load_home(&client, &config.catalog).await;

    let mut terminal = tui::init()?;
    let mut app = App::new(
        home,
        client,
        config.catalog,
        Theme::for_variant(config.theme),
        config.time_display,
    );
    let mut events = EventHandler::new(250);

    let result = async {
        loop {
            terminal.draw(|frame| render(&app, frame))?;

            // Poll async results (non-blocking)
            while let Ok(result) = app.result_rx.try_recv() {
                app.handle_async_result(result);
            }

            if app.should_quit {
                break;
            }

            match events.next().await? {
                Event::Key(key) => {
                    if let Some(msg) = keys::handle_key(key, &app) {
                        app.update(msg);
                    }
                }
                Event::Tick | Event::Resize => {}
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn render(app: &App, frame: &mut Frame) {
    use ratatui::layout::{Constraint, Layout};

    let area = frame.area();

    let (main_area, debug_area) = if app.debug.visible {
        let chunks = Layout::vertical([
            Constraint::Min(0),     // Main content
            Constraint::Length(10), // Debug pane
        ])
        .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    match (&app.home, &app.view) {
        (Home::Unavailable { message, retrying }, _) => {
            views::common::render_unavailable(frame, message, *retrying, &app.theme, main_area)
        }
        (Home::Feed(feed), View::Feed) => views::feed::render(frame, app, feed, main_area),
        (Home::Feed(_), View::Detail(detail)) => {
            views::detail::render(frame, app, detail, main_area)
        }
    }

    if let Some(debug_area) = debug_area {
        views::debug::render(frame, app, debug_area);
    }

    views::sources::render(frame, app, area);
    views::search::render(frame, app, area);
}
