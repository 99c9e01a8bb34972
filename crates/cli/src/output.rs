//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. The `format_*` functions
//! return plain text; the printing helpers add color.

use chrono::{DateTime, Local, TimeZone};
use healthwatch_events::{Event, EventGroup, EventStatus};
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a key/value line
    pub fn field(label: &str, value: &str) {
        println!("  {:<18} {}", format!("{label}:").dimmed(), value);
    }
}

/// Format a distance for display; unknown distances print as `-`
pub fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        None => "-".to_string(),
        Some(km) if km < 1.0 => format!("{:.0} m", km * 1000.0),
        Some(km) if km < 10.0 => format!("{km:.1} km"),
        Some(km) => format!("{km:.0} km"),
    }
}

/// Format an event time in the given time zone, e.g. `Thu 16 Oct, 14:00`
pub fn format_event_time<Tz: TimeZone>(date: &DateTime<chrono::Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.with_timezone(tz).format("%a %d %b, %H:%M").to_string()
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{secs:.1}s")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// One listing line: time, title, place and distance
pub fn format_event_line<Tz: TimeZone>(event: &Event, tz: &Tz, saved: bool) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut line = format!(
        "{}  {}  {} ({})",
        format_event_time(&event.date, tz),
        event.title,
        event.location.address,
        format_distance(event.distance_km),
    );
    match event.status {
        EventStatus::Active => {}
        status => line.push_str(&format!(" [{status}]")),
    }
    if event.is_full() {
        line.push_str(" [full]");
    }
    if saved {
        line.push_str(" ★");
    }
    line
}

/// Print events in their date sections, local time
pub fn print_groups(groups: &[EventGroup], is_saved: impl Fn(&str) -> bool) {
    if groups.is_empty() {
        Status::info("No events found");
        return;
    }
    for group in groups {
        println!();
        println!(
            "{} {}",
            group.key.to_string().bold(),
            format!("({})", group.events.len()).dimmed()
        );
        for event in &group.events {
            let line = format_event_line(event, &Local, is_saved(&event.id));
            println!("  {}  {}", event.id.dimmed(), line);
        }
    }
}

/// Print the details of one event, local time
pub fn print_event(event: &Event) {
    Status::header(&event.title);
    Status::field("id", &event.id);
    Status::field("when", &format_event_time(&event.date, &Local));
    Status::field("where", &event.location.address);
    if let Some(region) = &event.location.region {
        Status::field("region", region);
    }
    let coords = event.location.coordinates;
    Status::field("coordinates", &format!("{:.4}, {:.4}", coords.lat, coords.lng));
    Status::field("distance", &format_distance(event.distance_km));
    Status::field("status", &event.status.to_string());
    if let Some(category) = &event.category {
        Status::field("category", category);
    }
    if let Some(organizer) = &event.organizer {
        let contact = match &organizer.email {
            Some(email) => format!("{} <{email}>", organizer.name),
            None => organizer.name.clone(),
        };
        Status::field("organizer", &contact);
    }
    if let Some(left) = event.spots_left() {
        Status::field("spots left", &left.to_string());
    }
    if let Some(description) = &event.description {
        println!();
        println!("{description}");
    }
}
