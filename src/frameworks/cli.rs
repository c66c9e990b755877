use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::use_cases::StatusFilter;

/// Attendance kiosk: rotating QR tokens and the attendance dashboard.
#[derive(Debug, Parser)]
#[command(name = "attendance_kiosk", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the operator's batches.
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long, env = "ATTENDANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// List the batches stored by the last login.
    Batches,
    /// Show the rotating attendance QR code until Ctrl-C.
    Attend {
        #[arg(long)]
        batch: Option<String>,
    },
    /// Print one page of the attendance table.
    Records {
        #[arg(long)]
        batch: Option<String>,
        /// Substring of a name or user id.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        department: Option<String>,
        /// all, present or absent.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Flip attendance for the given user ids and submit the change.
    Toggle {
        #[arg(long)]
        batch: Option<String>,
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
    /// Delete every attendance record of a batch.
    Purge {
        #[arg(long)]
        batch: Option<String>,
    },
    /// Write the attendance table to an Excel workbook.
    Export {
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}
