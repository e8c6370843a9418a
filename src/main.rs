use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

mod attendance;
mod attendance_command;
mod calendar;
mod calendar_command;
mod config;
mod console;
mod datetime;
mod error;
mod logger;
mod odoo;
mod session;
mod status;
mod tracker;
mod worked_hours;

use attendance_command::{AttendanceAction, AttendanceCommand};
use calendar_command::{CalendarArgs, CalendarCommand};
use config::OdooConfig;
use console::ConsoleMarkdownList;
use odoo::OdooClient;

/// Odooの勤怠に出勤、退勤を記録するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- -u jdoe -p secret check-in
/// $ cargo run -- -u jdoe -p secret calendar --month 2024-03
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(short = 'u', long = "username", env = "ODOO_USERNAME", help = "Odoo login")]
    username: String,

    #[clap(
        short = 'p',
        long = "password",
        env = "ODOO_PASSWORD",
        hide_env_values = true,
        help = "Odoo password"
    )]
    password: String,

    #[clap(
        short = 'v',
        long = "verbose",
        parse(from_occurrences),
        help = "Increases log verbosity"
    )]
    verbose: u8,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// 出勤中かどうかを表示する。
    Status,
    /// 出勤する。
    CheckIn,
    /// 退勤する。
    CheckOut,
    /// 対話的に出勤、退勤を行う。
    Attendance,
    /// 勤怠をカレンダー形式で表示する。
    Calendar(CalendarArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logger::setup_logger(logger::level_from_verbosity(args.verbose))?;

    let config = OdooConfig::from_env();
    let client = OdooClient::new(&config).context("Failed to new odoo client")?;
    let session = session::login(&client, &args.username, &args.password).await?;

    let mut stdout = io::stdout();
    let mut presenter = ConsoleMarkdownList::new(&mut stdout);
    match args.subcommand {
        SubCommands::Status => {
            AttendanceCommand::new(&client)
                .run(session, AttendanceAction::Status, &mut presenter)
                .await?
        }
        SubCommands::CheckIn => {
            AttendanceCommand::new(&client)
                .run(session, AttendanceAction::CheckIn, &mut presenter)
                .await?
        }
        SubCommands::CheckOut => {
            AttendanceCommand::new(&client)
                .run(session, AttendanceAction::CheckOut, &mut presenter)
                .await?
        }
        SubCommands::Attendance => {
            AttendanceCommand::new(&client)
                .interactive(session, BufReader::new(tokio::io::stdin()), &mut presenter)
                .await?
        }
        SubCommands::Calendar(calendar) => {
            CalendarCommand::new(&client)
                .run(&session, calendar, &mut presenter)
                .await?;
        }
    }

    Ok(())
}
