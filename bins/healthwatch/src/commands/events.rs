//! Event search, saved events, location and settings

use crate::{App, EventsCommand, FilterArgs, LocationCommand, SearchArgs};
use anyhow::{bail, Result};
use healthwatch_api_client::endpoints::average_rating;
use healthwatch_api_client::{EventFinder, MapSearch, SearchOutcome};
use healthwatch_cli::output::{self, Status};
use healthwatch_cli::progress;
use healthwatch_events::{annotate_distances, group_by_date_local, DateSelection, SearchState};
use healthwatch_geo::{Coordinate, MapBounds};
use healthwatch_state::{Action, RequestTicket, SavedLocation};
use healthwatch_telemetry::Timer;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

pub async fn run(app: &mut App, cmd: EventsCommand) -> Result<()> {
    match cmd {
        EventsCommand::Search(args) => search(app, args).await,
        EventsCommand::Map { ne, sw, filters } => map(app, ne, sw, &filters).await,
        EventsCommand::Show { id } => show(app, &id).await,
        EventsCommand::Save { id } => {
            app.store.dispatch(Action::EventSaved(id.clone()))?;
            Status::success(&format!("Saved {id}"));
            Ok(())
        }
        EventsCommand::Unsave { id } => {
            if !app.store.state().is_saved(&id) {
                Status::info(&format!("{id} was not saved"));
                return Ok(());
            }
            app.store.dispatch(Action::EventUnsaved(id.clone()))?;
            Status::success(&format!("Removed {id}"));
            Ok(())
        }
        EventsCommand::Saved => saved(app).await,
    }
}

/// Date flags map onto the explicit date-filter selection
fn apply_filters(args: &FilterArgs, state: &mut SearchState) {
    state.title = args.title.clone().unwrap_or_default();
    state.region.clone_from(&args.region);
    state.dates = match (args.date, args.from) {
        (_, Some(start)) => DateSelection::range(start, args.to),
        (Some(date), None) => DateSelection::single(date),
        (None, None) => DateSelection::none(),
    };
}

fn finder(app: &App) -> EventFinder {
    let state = app.store.state();
    let page_size = state.search.limit.unwrap_or(state.settings.page_size);
    EventFinder::new(&app.client).with_page_size(page_size)
}

async fn search(app: &mut App, args: SearchArgs) -> Result<()> {
    let mut state = app.store.state().search.clone();
    apply_filters(&args.filters, &mut state);
    if let Some(near) = args.near {
        state.coordinates = Some(near);
    }
    if args.radius.is_some() {
        state.radius = args.radius;
    }
    if args.page.is_some() {
        state.page = args.page;
    }
    if args.limit.is_some() {
        state.limit = args.limit;
    }
    app.store.dispatch(Action::FiltersChanged(state))?;

    let params = app.store.state().search.build();
    let filters = app.store.state().search.filters();
    if params.is_none() && !app.json {
        Status::info("No location set. Pass --near lat,lng or run `healthwatch location set`.");
    }

    let finder = finder(app);
    let ticket = app.store.begin_request();
    let spinner = progress::spinner_unless(app.json, "Searching events...");
    let timer = Timer::start("events.search");
    let outcome = finder.search(params.as_ref(), &filters).await;
    let elapsed = timer.stop();

    finish_spinner(&spinner, &outcome, elapsed);
    show_outcome(app, ticket, outcome)
}

async fn map(app: &mut App, ne: Coordinate, sw: Coordinate, filters: &FilterArgs) -> Result<()> {
    let bounds = MapBounds::new(ne, sw)?;

    let mut state = app.store.state().search.clone();
    apply_filters(filters, &mut state);
    app.store.dispatch(Action::FiltersChanged(state))?;

    let delay = Duration::from_millis(app.config.schema.search.debounce_ms);
    let (mut map_search, mut updates) = MapSearch::new(finder(app), delay);
    map_search.set_filters(app.store.state().search.filters());

    let ticket = app.store.begin_request();
    let spinner = progress::spinner_unless(app.json, "Searching the map area...");
    let timer = Timer::start("events.map");
    map_search.viewport_changed(bounds);

    let Some(update) = updates.recv().await else {
        spinner.finish_and_clear();
        bail!("Map search stopped before returning results");
    };
    let elapsed = timer.stop();

    finish_spinner(&spinner, &update.outcome, elapsed);
    show_outcome(app, ticket, update.outcome)
}

fn finish_spinner(spinner: &progress::ProgressBar, outcome: &SearchOutcome, elapsed: Duration) {
    if outcome.is_fallback() {
        progress::finish_warning(spinner, "Showing sample events");
    } else {
        let found = output::format_count(outcome.events.len(), "event", "events");
        progress::finish_success(
            spinner,
            &format!("Found {found} in {}", output::format_duration(elapsed)),
        );
    }
}

fn show_outcome(app: &mut App, ticket: RequestTicket, outcome: SearchOutcome) -> Result<()> {
    app.store.dispatch(Action::EventsLoaded {
        ticket,
        events: outcome.events.clone(),
        source: outcome.source,
    })?;

    if app.json {
        return app.print_json(&outcome);
    }
    if let Some(notice) = &outcome.notice {
        Status::warning(notice);
    }

    let state = app.store.state();
    let groups = group_by_date_local(state.events.clone());
    output::print_groups(&groups, |id| state.is_saved(id));
    Ok(())
}

async fn show(app: &App, id: &str) -> Result<()> {
    let spinner = progress::spinner_unless(app.json, "Loading event...");
    let event = app.client.events().get(id).await;
    let reviews = match app.client.reviews().list(id).await {
        Ok(reviews) => reviews,
        Err(e) => {
            warn!(error = %e, "Could not load reviews");
            Vec::new()
        }
    };
    spinner.finish_and_clear();

    let mut event = event?;
    if let Some(location) = &app.store.state().location {
        annotate_distances(std::slice::from_mut(&mut event), &location.coordinates);
    }

    if app.json {
        return app.print_json(&json!({ "event": event, "reviews": reviews }));
    }

    output::print_event(&event);
    if let Some(average) = average_rating(&reviews) {
        let count = output::format_count(reviews.len(), "review", "reviews");
        Status::field("rating", &format!("{average:.1} / 5 ({count})"));
    }
    if app.store.state().is_saved(&event.id) {
        Status::info("In your saved events");
    }
    Ok(())
}

async fn saved(app: &App) -> Result<()> {
    let ids: Vec<String> = app.store.state().saved_events.iter().cloned().collect();
    if ids.is_empty() {
        if app.json {
            return app.print_json(&ids);
        }
        Status::info("No saved events");
        return Ok(());
    }

    let spinner = progress::spinner_unless(app.json, "Loading saved events...");
    let api = app.client.events();
    let mut events = Vec::with_capacity(ids.len());
    for id in &ids {
        match api.get(id).await {
            Ok(event) => events.push(event),
            Err(e) => warn!(id = %id, error = %e, "Could not load saved event"),
        }
    }
    spinner.finish_and_clear();

    if app.json {
        return app.print_json(&events);
    }

    let missing = ids.len() - events.len();
    output::print_groups(&group_by_date_local(events), |_| true);
    if missing > 0 {
        Status::warning(&format!(
            "{} could not be loaded",
            output::format_count(missing, "saved event", "saved events")
        ));
    }
    Ok(())
}

pub fn run_location(app: &mut App, cmd: LocationCommand) -> Result<()> {
    match cmd {
        LocationCommand::Set { coordinates, label } => {
            app.store.dispatch(Action::LocationSet(SavedLocation {
                coordinates,
                label,
            }))?;
            Status::success("Location saved");
            Ok(())
        }
        LocationCommand::Show => {
            let location = app.store.state().location.as_ref();
            if app.json {
                return app.print_json(&location);
            }
            match location {
                Some(location) => {
                    let c = location.coordinates;
                    let name = location.label.as_deref().unwrap_or("Saved location");
                    Status::info(&format!("{name}: {:.4}, {:.4}", c.lat, c.lng));
                }
                None => Status::info("No location saved"),
            }
            Ok(())
        }
    }
}

pub fn run_settings(
    app: &mut App,
    radius: Option<String>,
    page_size: Option<u32>,
    notifications: Option<bool>,
) -> Result<()> {
    let changed = radius.is_some() || page_size.is_some() || notifications.is_some();
    if changed {
        let mut settings = app.store.state().settings.clone();
        if let Some(radius) = radius {
            settings.default_radius = radius.trim().to_ascii_lowercase();
        }
        if let Some(page_size) = page_size {
            settings.page_size = page_size;
        }
        if let Some(enabled) = notifications {
            settings.notifications_enabled = enabled;
        }
        app.store.dispatch(Action::SettingsChanged(settings))?;
    }

    let settings = &app.store.state().settings;
    if app.json {
        return app.print_json(settings);
    }
    if changed {
        Status::success("Settings saved");
    }
    Status::field("radius", settings.radius().label());
    Status::field("page size", &settings.page_size.to_string());
    Status::field(
        "notifications",
        if settings.notifications_enabled { "on" } else { "off" },
    );
    Ok(())
}
