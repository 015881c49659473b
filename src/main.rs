use anyhow::Result;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use lead_chat::ChatWidget;
use lead_chat::config::Config;
use lead_chat::lead::{Control, FieldView, SubmitOutcome, VALIDATION_FAILED};
use lead_chat::renderer::{EntryId, EntryKind, RenderEvent};
use lead_chat::transport::HttpTransport;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the transcript on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lead_chat=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let transport = Arc::new(HttpTransport::from_config(&config)?);
    let mut widget = ChatWidget::start(&config, transport).await?;

    let printer = tokio::spawn(print_events(widget.subscribe()));
    widget.welcome().await;
    println!(
        "{}",
        "Type a message, /enquire to share your details, /quit to leave.".dimmed()
    );

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/enquire" => fill_lead_form(&mut widget, &mut input).await?,
            text => {
                widget.send(text).await;
            }
        }
    }

    // Dropping the widget closes the event channel and ends the printer
    drop(widget);
    printer.await?;
    Ok(())
}

/// How to bring a bot line on screen up to date with new text
#[derive(Debug, PartialEq, Eq)]
enum Render<'a> {
    Unchanged,
    /// The new text extends what is already printed
    Append(&'a str),
    /// The text was replaced; print it again in full
    Redraw(&'a str),
}

fn delta<'a>(prev: &str, next: &'a str) -> Render<'a> {
    if prev == next {
        Render::Unchanged
    } else if let Some(rest) = next.strip_prefix(prev) {
        Render::Append(rest)
    } else {
        Render::Redraw(next)
    }
}

fn bot_label() -> colored::ColoredString {
    "Ruby:".magenta().bold()
}

/// Print transcript events. Streamed bot messages are printed as deltas.
async fn print_events(mut events: broadcast::Receiver<RenderEvent>) {
    let mut printed: HashMap<EntryId, String> = HashMap::new();
    let mut open_line: Option<EntryId> = None;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(n)) => {
                tracing::warn!("Terminal fell behind by {} events", n);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            RenderEvent::Appended(entry) => {
                if open_line.take().is_some() {
                    println!();
                }
                match entry.kind {
                    EntryKind::Bot(text) => {
                        print!("{} {}", bot_label(), text);
                        printed.insert(entry.id, text);
                        open_line = Some(entry.id);
                    }
                    EntryKind::Typing => println!("{}", "Ruby is typing...".dimmed()),
                    EntryKind::Sources(sources) => {
                        println!("{} {}", "Sources:".dimmed(), sources.join(", ").dimmed())
                    }
                    EntryKind::Enquire => println!(
                        "{}",
                        "💬 Want us to reach out? Type /enquire".yellow()
                    ),
                    EntryKind::LeadForm => println!("{}", "📝 Lead form opened".yellow()),
                    EntryKind::User(_) => {}
                }
            }
            RenderEvent::Updated(entry) => {
                if let EntryKind::Bot(text) = entry.kind {
                    let shown = printed.entry(entry.id).or_default();
                    match delta(shown, &text) {
                        Render::Unchanged => {}
                        Render::Append(rest) => print!("{rest}"),
                        // a single line can be cleared in place
                        Render::Redraw(full) if !shown.contains('\n') => {
                            print!("\r\x1b[2K{} {}", bot_label(), full)
                        }
                        Render::Redraw(full) => print!("\n{} {}", bot_label(), full),
                    }
                    *shown = text;
                    open_line = Some(entry.id);
                }
            }
            RenderEvent::Removed(id) => {
                printed.remove(&id);
            }
            RenderEvent::ScrolledTo(_) => {}
        }
        let _ = std::io::stdout().flush();
    }

    if open_line.is_some() {
        println!();
    }
}

/// Walk the visitor through the lead form field by field.
async fn fill_lead_form(widget: &mut ChatWidget, input: &mut Input) -> Result<()> {
    widget.enquire();
    println!("{}", widget.lead_form().view().title.bold());
    let fields: Vec<FieldView> = widget.lead_form().view().fields.clone();

    loop {
        for field in &fields {
            loop {
                prompt_field(field);
                let Some(line) = input.next_line().await? else {
                    return Ok(());
                };
                if line.trim() == "/cancel" {
                    widget.cancel_lead();
                    println!("{}", "Lead form closed".dimmed());
                    return Ok(());
                }
                let value = select_value(field, line.trim());
                widget.set_lead_value(&field.id, &value);
                let error = widget.blur_lead_field(&field.id).await;
                if let Some(error) = &error {
                    println!("{}", error.red());
                }
                if field_settled(error.as_deref()) {
                    break;
                }
            }
        }

        match widget.submit_lead().await {
            SubmitOutcome::Submitted | SubmitOutcome::NotOpen => return Ok(()),
            SubmitOutcome::Invalid(message) | SubmitOutcome::Rejected(message) => {
                println!("{}", message.red())
            }
            SubmitOutcome::NetworkError => {
                let message = widget.lead_form().error().unwrap_or_default().to_string();
                println!("{}", message.red());
            }
        }
        println!("{}", "Let's try that again (or type /cancel).".dimmed());
    }
}

/// A field is left once it passes, or when the check itself could not run;
/// submit reports the latter again.
fn field_settled(blur_error: Option<&str>) -> bool {
    matches!(blur_error, None | Some(VALIDATION_FAILED))
}

fn prompt_field(field: &FieldView) {
    if let Control::Select { options, .. } = &field.control {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }
    let marker = if field.required { "*" } else { "" };
    print!("{}{}: ", field.placeholder.cyan(), marker);
    let _ = std::io::stdout().flush();
}

/// Selects accept either the option number or its label.
fn select_value(field: &FieldView, raw: &str) -> String {
    match &field.control {
        Control::Select { options, .. } => raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .cloned()
            .unwrap_or_else(|| raw.to_string()),
        _ => raw.to_string(),
    }
}
