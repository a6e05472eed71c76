mod progress;
mod reports;
mod resources;
mod styling;
mod tables;

use anyhow::Result;
use serde::Serialize;

pub use progress::DetailProgress;
pub use resources::Done;
pub use styling::{bright_green, dim, magenta_bold};

/// Prints the labdash banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🦊 labdash"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab Automation Client")
    );
}

/// Human-readable terminal form of a result.
pub trait Render {
    fn render(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json { pretty: bool },
}

/// Writes `value` to stdout in the requested format.
pub fn emit<T>(value: &T, format: Format) -> Result<()>
where
    T: Render + Serialize + ?Sized,
{
    println!("{}", to_string(value, format)?);
    Ok(())
}

fn to_string<T>(value: &T, format: Format) -> Result<String>
where
    T: Render + Serialize + ?Sized,
{
    Ok(match format {
        Format::Table => value.render(),
        Format::Json { pretty: true } => serde_json::to_string_pretty(value)?,
        Format::Json { pretty: false } => serde_json::to_string(value)?,
    })
}
