use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{
    forms::{AccessRequestForm, BackupForm, BookingForm, Notice, SelectedFile},
    schedule::SchedulePage,
    RemoteStore, RemoteStoreClient,
};
use shared::domain::{Room, RoomFilter, RoomId, ACCESS_AREAS, ALL_ROOMS, TIME_SLOTS};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Laboratory room booking, door access and backup records")]
struct Cli {
    #[arg(long, default_value = "portal.toml")]
    config: PathBuf,
    /// Overrides the configured write/query endpoint.
    #[arg(long)]
    write_endpoint: Option<String>,
    /// Overrides the configured published CSV export.
    #[arg(long)]
    export_url: Option<String>,
    #[arg(long)]
    submitted_by: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bookings for one day, the next upcoming bookings, and today's free rooms.
    Schedule {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = ALL_ROOMS)]
        room: String,
    },
    Book {
        #[arg(long)]
        room_id: u32,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        purpose: String,
        #[arg(long, default_value = "")]
        attendees: String,
    },
    RequestAccess {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long, default_value = "")]
        supervisor: String,
        #[arg(long)]
        reason: String,
        #[arg(long = "area")]
        areas: Vec<String>,
    },
    /// Records a backup entry for the given files. File contents are not uploaded.
    Backup {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        files: Vec<PathBuf>,
    },
    Rooms,
    Areas,
    AccessRequests,
    Backups,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(v) = cli.write_endpoint {
        settings.write_endpoint = v;
    }
    if let Some(v) = cli.export_url {
        settings.export_url = Some(v);
    }
    if let Some(v) = cli.submitted_by {
        settings.submitted_by = v;
    }

    let client = RemoteStoreClient::new(settings.client_config()?)
        .context("failed to construct remote store client")?;
    info!(endpoint = %client.config().write_endpoint, "portal ready");

    let today = Local::now().date_naive();
    match cli.command {
        Command::Schedule { date, room } => {
            Ok(show_schedule(&client, today, date.unwrap_or(today), &room).await)
        }
        Command::Book {
            room_id,
            date,
            start,
            end,
            purpose,
            attendees,
        } => {
            let mut form = BookingForm::new(Room::catalog());
            form.room_id = Some(RoomId(room_id));
            form.date = Some(date);
            form.start_time = start;
            form.end_time = end;
            form.purpose = purpose;
            form.attendees = attendees;
            Ok(report(&form.submit(&client).await))
        }
        Command::RequestAccess {
            full_name,
            student_id,
            email,
            department,
            supervisor,
            reason,
            areas,
        } => {
            let mut form = AccessRequestForm::new();
            form.full_name = full_name;
            form.student_id = student_id;
            form.email = email;
            form.department = department;
            form.supervisor = supervisor;
            form.reason = reason;
            for area in &areas {
                if !form.toggle_area(area, true) {
                    eprintln!("ignoring unknown access area '{area}'");
                }
            }
            Ok(report(&form.submit(&client).await))
        }
        Command::Backup {
            name,
            description,
            files,
        } => {
            let mut form = BackupForm::new();
            form.backup_name = name;
            form.description = description;
            for path in &files {
                form.files.push(selected_file(path).await?);
            }
            println!("Total size: {}", form.total_size());
            Ok(report(&form.submit(&client).await))
        }
        Command::Rooms => {
            for room in Room::catalog() {
                println!(
                    "{}  {} (capacity {}) - {}",
                    room.id.0, room.name, room.capacity, room.equipment
                );
            }
            println!("Time slots: {}", TIME_SLOTS.join(", "));
            Ok(ExitCode::SUCCESS)
        }
        Command::Areas => {
            for area in ACCESS_AREAS {
                println!("{:<12} {:<18} {}", area.id, area.name, area.level);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::AccessRequests => {
            let requests = client.fetch_access_requests().await?;
            println!("{}", serde_json::to_string_pretty(&requests)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Backups => {
            let backups = client.fetch_backups().await?;
            println!("{}", serde_json::to_string_pretty(&backups)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn selected_file(path: &Path) -> Result<SelectedFile> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to read file metadata: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SelectedFile {
        name,
        size_bytes: metadata.len(),
    })
}

fn report(notice: &Notice) -> ExitCode {
    if notice.is_error() {
        eprintln!("{}: {}", notice.title, notice.description);
        ExitCode::FAILURE
    } else {
        println!("{}: {}", notice.title, notice.description);
        ExitCode::SUCCESS
    }
}

/// Prints the schedule views. A failed load still prints the (empty) views
/// but exits non-zero.
async fn show_schedule(
    store: &dyn RemoteStore,
    today: NaiveDate,
    day: NaiveDate,
    room: &str,
) -> ExitCode {
    let mut page = SchedulePage::new(Room::catalog(), today);
    page.select_day(day);
    page.select_room(RoomFilter::from_label(room));
    page.load(store).await;

    let status = match page.load_error() {
        Some(notice) => report(notice),
        None => ExitCode::SUCCESS,
    };

    let scope = match page.room_filter() {
        RoomFilter::AllRooms => "All rooms".to_string(),
        RoomFilter::Room(name) => name.clone(),
    };
    println!("Schedule for {} ({scope})", day.format("%a %b %d %Y"));
    let day_bookings = page.day_bookings();
    if day_bookings.is_empty() {
        println!("  No meetings scheduled for this date and room filter.");
    }
    for booking in day_bookings {
        println!(
            "  {} - {}  {}  {}  (booked by {}, {} attendees)",
            booking.start_time,
            booking.end_time,
            booking.room,
            booking.purpose,
            booking.booked_by,
            booking.attendees
        );
    }

    println!();
    println!("Upcoming meetings");
    for booking in page.upcoming(today) {
        println!(
            "  {}  {} - {}  {}  {}",
            booking.date, booking.start_time, booking.end_time, booking.room, booking.purpose
        );
    }

    println!();
    println!("Room availability today");
    for entry in page.availability(today) {
        if entry.is_available() {
            println!("  {:<40} Available", entry.room);
        } else {
            println!("  {:<40} {} booking(s)", entry.room, entry.booking_count);
        }
    }
    status
}
