//! Timetable command - print the events behind a personal timetable link

use chrono::{Days, Local, NaiveDate};
use tunniplaan_api::{Timetable, TimetableEvent, UserAttribute};

use super::session::authenticate;
use super::{SessionOptions, error_chain};
use crate::config::AppConfig;

pub async fn handle_timetable(
    config: &AppConfig,
    options: SessionOptions,
    link: &str,
    from: Option<NaiveDate>,
    days: u32,
) -> Result<(), String> {
    let from = from.unwrap_or_else(|| Local::now().date_naive());
    let thru = last_day(from, days)?;

    let authenticated = authenticate(config, options).await?;
    let client = &authenticated.client;

    let view = client
        .get_view_token(link)
        .await
        .map_err(|e| error_chain(&e))?;
    let attributes = client
        .get_user_attributes(&view)
        .await
        .map_err(|e| error_chain(&e))?;
    let timetable = client
        .get_timetable(&view, from, thru)
        .await
        .map_err(|e| error_chain(&e))?;

    println!("{}", render_timetable(&attributes, &timetable, from, thru));
    Ok(())
}

/// Last day of a `days` long range starting at `from`.
fn last_day(from: NaiveDate, days: u32) -> Result<NaiveDate, String> {
    if days == 0 {
        return Err("--days must be at least 1".to_string());
    }
    from.checked_add_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| format!("Date range starting {} is out of bounds", from))
}

fn render_timetable(
    attributes: &[UserAttribute],
    timetable: &Timetable,
    from: NaiveDate,
    thru: NaiveDate,
) -> String {
    let mut lines = Vec::new();

    let owner = attributes
        .iter()
        .find(|a| a.is_default == Some(true))
        .or_else(|| attributes.first());
    if let Some(owner) = owner {
        let name = owner.student_name.as_deref().unwrap_or_default();
        match owner.student_group.as_deref() {
            Some(group) => lines.push(format!("{} ({})", name, group)),
            None => lines.push(name.to_string()),
        }
    }
    lines.push(format!("Timetable {} .. {}", from, thru));

    let days = timetable.events_by_day();
    if days.is_empty() {
        lines.push("No events.".to_string());
    }
    for (day, events) in days {
        lines.push(String::new());
        lines.push(format!("{} ({})", day, day.format("%a")));
        lines.extend(events.into_iter().map(render_event));
    }

    lines.join("\n")
}

fn render_event(event: &TimetableEvent) -> String {
    let time = format!(
        "{}-{}",
        event.time_start.as_deref().unwrap_or("?"),
        event.time_end.as_deref().unwrap_or("?")
    );

    let mut line = format!("  {}  {}", time, event.name());
    if event.is_exam {
        line.push_str(" [exam]");
    }

    let rooms: Vec<String> = event
        .rooms
        .iter()
        .map(|r| r.label())
        .filter(|l| !l.is_empty())
        .collect();
    if !rooms.is_empty() {
        line.push_str(&format!("  {}", rooms.join(", ")));
    }

    let teachers: Vec<&str> = event
        .teachers
        .iter()
        .filter_map(|t| t.name.as_deref())
        .collect();
    if !teachers.is_empty() {
        line.push_str(&format!("  {}", teachers.join(", ")));
    }
    line
}
