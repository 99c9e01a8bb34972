//! Symptom journal, appointments, notifications and reviews

use crate::{App, AppointmentsCommand, NotificationsCommand, ReviewsCommand, SymptomsCommand};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use healthwatch_api_client::endpoints::{
    average_rating, unread_count, AppointmentStatus, BookAppointment, NewReview, NewSymptomEntry,
    Severity,
};
use healthwatch_cli::output::{self, Status};
use healthwatch_cli::progress;

pub async fn symptoms(app: &App, cmd: SymptomsCommand) -> Result<()> {
    let api = app.client.symptoms();
    match cmd {
        SymptomsCommand::List => {
            let entries = api.list().await?;
            if app.json {
                return app.print_json(&entries);
            }
            if entries.is_empty() {
                Status::info("No symptoms logged");
            }
            for entry in &entries {
                println!(
                    "{}  [{}]  {}",
                    output::format_event_time(&entry.recorded_at, &Local),
                    entry.severity,
                    entry.symptoms.join(", ")
                );
                if let Some(notes) = &entry.notes {
                    println!("    {notes}");
                }
            }
            Ok(())
        }
        SymptomsCommand::Log {
            symptoms,
            severity,
            notes,
        } => {
            let severity = Severity::parse(&severity)
                .ok_or_else(|| anyhow!("Unknown severity '{severity}', use mild, moderate or severe"))?;
            let entry = NewSymptomEntry {
                symptoms,
                severity,
                notes,
                recorded_at: None,
            };
            let logged = api.log(&entry).await?;
            if app.json {
                return app.print_json(&logged);
            }
            Status::success(&format!("Logged {}", logged.symptoms.join(", ")));
            Ok(())
        }
    }
}

/// RFC 3339, or `YYYY-MM-DD HH:MM` in local time
fn parse_when(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| anyhow!("Cannot read date '{value}', expected YYYY-MM-DD HH:MM"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("'{value}' does not exist in the local time zone"))
}

fn status_label(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Scheduled => "scheduled",
        AppointmentStatus::Completed => "completed",
        AppointmentStatus::Cancelled => "cancelled",
    }
}

pub async fn appointments(app: &App, cmd: AppointmentsCommand) -> Result<()> {
    let api = app.client.appointments();
    match cmd {
        AppointmentsCommand::List => {
            let spinner = progress::spinner_unless(app.json, "Loading appointments...");
            let list = api.list().await;
            spinner.finish_and_clear();
            let list = list?;

            if app.json {
                return app.print_json(&list);
            }
            if list.is_empty() {
                Status::info("No appointments");
            }
            let now = Utc::now();
            for appointment in &list {
                let marker = if appointment.is_cancellable(now) { "•" } else { " " };
                println!(
                    "{marker} {}  {}  {} [{}]",
                    appointment.id,
                    output::format_event_time(&appointment.date, &Local),
                    appointment.facility,
                    status_label(appointment.status)
                );
            }
            Ok(())
        }
        AppointmentsCommand::Book {
            facility,
            date,
            reason,
            notes,
        } => {
            let request = BookAppointment {
                facility,
                date: parse_when(&date)?,
                reason,
                notes,
            };
            let booked = api.book(&request).await?;
            if app.json {
                return app.print_json(&booked);
            }
            Status::success(&format!(
                "Booked {} at {} ({})",
                booked.facility,
                output::format_event_time(&booked.date, &Local),
                booked.id
            ));
            Ok(())
        }
        AppointmentsCommand::Cancel { id } => {
            let cancelled = api.cancel(&id).await?;
            if app.json {
                return app.print_json(&cancelled);
            }
            Status::success(&format!("Cancelled appointment at {}", cancelled.facility));
            Ok(())
        }
    }
}

pub async fn notifications(app: &App, cmd: NotificationsCommand) -> Result<()> {
    let api = app.client.notifications();
    match cmd {
        NotificationsCommand::List => {
            let list = api.list().await?;
            if app.json {
                return app.print_json(&list);
            }
            Status::info(&format!("{} unread", unread_count(&list)));
            for notification in &list {
                let marker = if notification.read { " " } else { "•" };
                println!("{marker} {}  {}", notification.id, notification.title);
                if !notification.message.is_empty() {
                    println!("    {}", notification.message);
                }
            }
            Ok(())
        }
        NotificationsCommand::Read { id } => {
            let notification = api.mark_read(&id).await?;
            if app.json {
                return app.print_json(&notification);
            }
            Status::success(&format!("Marked '{}' as read", notification.title));
            Ok(())
        }
    }
}

pub async fn reviews(app: &App, cmd: ReviewsCommand) -> Result<()> {
    let api = app.client.reviews();
    match cmd {
        ReviewsCommand::List { event_id } => {
            let list = api.list(&event_id).await?;
            if app.json {
                return app.print_json(&list);
            }
            match average_rating(&list) {
                Some(average) => Status::info(&format!(
                    "{average:.1} / 5 from {}",
                    output::format_count(list.len(), "review", "reviews")
                )),
                None => Status::info("No reviews yet"),
            }
            for review in &list {
                let stars = "★".repeat(usize::from(review.rating));
                let author = review.user_name.as_deref().unwrap_or("Anonymous");
                println!("{stars:<5}  {author}");
                if let Some(comment) = &review.comment {
                    println!("    {comment}");
                }
            }
            Ok(())
        }
        ReviewsCommand::Add {
            event_id,
            rating,
            comment,
        } => {
            let review = api.add(&event_id, &NewReview { rating, comment }).await?;
            if app.json {
                return app.print_json(&review);
            }
            Status::success("Thanks for your review");
            Ok(())
        }
    }
}
