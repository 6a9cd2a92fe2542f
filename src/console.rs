//! Line-oriented front end driving a [`ScaleController`].
//!
//! Commands are read from any async reader; task events are pumped
//! concurrently so progress shows up while the user is typing.

use std::path::PathBuf;
use std::str::FromStr;

use resampler::{FilterKind, ParseFilterError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::models::{ImageInfo, ViewEvent};
use crate::services::{ResizeScheduler, ScaleController, TaskEvent};

pub const HELP: &str = "\
Commands:
  load <path>          open an image
  up | +               scale up one step
  down | -             scale down one step
  filter <name>        nearest, bilinear, bicubic or lanczos
  save <path>          save the displayed image (format from extension)
  viewport <w> <h>     resize the display area
  wait                 block until the current resize finishes
  status               show scale, filter and sizes
  help                 show this text
  quit                 exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(PathBuf),
    ScaleUp,
    ScaleDown,
    Filter(FilterKind),
    Save(PathBuf),
    Viewport(u32, u32),
    Wait,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Filter(#[from] ParseFilterError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "load" | "open" if !rest.is_empty() => Ok(Command::Load(PathBuf::from(rest))),
            "load" | "open" => Err(CommandError::Usage("load <path>")),
            "up" | "+" => Ok(Command::ScaleUp),
            "down" | "-" => Ok(Command::ScaleDown),
            "filter" if !rest.is_empty() => Ok(Command::Filter(rest.parse()?)),
            "filter" => Err(CommandError::Usage("filter <nearest|bilinear|bicubic|lanczos>")),
            "save" if !rest.is_empty() => Ok(Command::Save(PathBuf::from(rest))),
            "save" => Err(CommandError::Usage("save <path>")),
            "viewport" => {
                let mut parts = rest.split_whitespace().map(str::parse::<u32>);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(w)), Some(Ok(h)), None) => Ok(Command::Viewport(w, h)),
                    _ => Err(CommandError::Usage("viewport <width> <height>")),
                }
            }
            "wait" => Ok(Command::Wait),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn format_size((w, h): (u32, u32)) -> String {
    format!("{}x{}", w, h)
}

fn format_info(info: &ImageInfo) -> String {
    let mut line = format!(
        "scale {}  original {}  current {}  in frame {}",
        info.scale,
        format_size(info.original),
        format_size(info.scaled),
        format_size(info.in_frame),
    );
    if info.upscaled() {
        line.push_str(&format!("  (interpolation: {})", info.filter));
    }
    line
}

/// Render one event as a console line
pub fn format_event(event: &ViewEvent) -> String {
    match event {
        ViewEvent::Progress(p) => format!("progress {}%", p),
        ViewEvent::ImageReady(image) => format!("image ready {}", format_size(image.dimensions())),
        ViewEvent::Info(info) => format_info(info),
        ViewEvent::Error { kind, message } => format!("error ({}): {}", kind, message),
        ViewEvent::ControlsEnabled(c) => {
            let flag = |on: bool| if on { "on" } else { "off" };
            format!(
                "controls load={} up={} down={} save={}",
                flag(c.load),
                flag(c.scale_up),
                flag(c.scale_down),
                flag(c.save)
            )
        }
    }
}

async fn flush_events<S, W>(controller: &mut ScaleController<S>, output: &mut W) -> std::io::Result<()>
where
    S: ResizeScheduler,
    W: AsyncWrite + Unpin,
{
    for event in controller.take_events() {
        output.write_all(format_event(&event).as_bytes()).await?;
        output.write_all(b"\n").await?;
    }
    output.flush().await
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

fn status_line<S: ResizeScheduler>(controller: &ScaleController<S>) -> String {
    match controller.info() {
        Some(info) => format!("{:?}  {}", controller.state(), format_info(&info)),
        None => format!(
            "{:?}  scale {}  filter {}",
            controller.state(),
            controller.scale(),
            controller.filter()
        ),
    }
}

/// Apply one command. Returns false when the session should end.
async fn execute<S, W>(
    controller: &mut ScaleController<S>,
    command: Command,
    output: &mut W,
) -> std::io::Result<bool>
where
    S: ResizeScheduler,
    W: AsyncWrite + Unpin,
{
    match command {
        Command::Load(path) => {
            // Failure is reported through the event outbox
            let _ = controller.load_path(&path);
        }
        Command::ScaleUp => {
            if !controller.scale_up() {
                write_line(output, "scale unchanged").await?;
            }
        }
        Command::ScaleDown => {
            if !controller.scale_down() {
                write_line(output, "scale unchanged").await?;
            }
        }
        Command::Filter(kind) => {
            if !controller.set_filter(kind) {
                write_line(output, "filter unchanged").await?;
            }
        }
        Command::Save(path) => {
            if controller.save(&path).is_ok() {
                write_line(output, &format!("saved {}", path.display())).await?;
            }
        }
        Command::Viewport(w, h) => controller.resize_viewport(w, h),
        Command::Wait => {
            controller.settle().await;
        }
        Command::Status => {
            let line = status_line(controller);
            write_line(output, &line).await?;
        }
        Command::Help => write_line(output, HELP).await?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

enum Step {
    Line(Option<String>),
    Task(TaskEvent),
}

/// Run an interactive session until `quit` or end of input.
///
/// At end of input any outstanding resize is allowed to finish so scripted
/// sessions see their final result.
pub async fn run<S, R, W>(
    controller: &mut ScaleController<S>,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    S: ResizeScheduler,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    flush_events(controller, &mut output).await?;

    loop {
        let step = tokio::select! {
            line = lines.next_line() => Step::Line(line?),
            Some(event) = controller.next_task_event() => Step::Task(event),
        };

        match step {
            Step::Line(None) => {
                tracing::debug!("End of input");
                controller.settle().await;
                flush_events(controller, &mut output).await?;
                break;
            }
            Step::Line(Some(line)) if line.trim().is_empty() => {}
            Step::Line(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    let keep_going = execute(controller, command, &mut output).await?;
                    flush_events(controller, &mut output).await?;
                    if !keep_going {
                        break;
                    }
                }
                Err(e) => write_line(&mut output, &e.to_string()).await?,
            },
            Step::Task(event) => {
                controller.handle_task_event(event);
                flush_events(controller, &mut output).await?;
            }
        }
    }

    Ok(())
}
