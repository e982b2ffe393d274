use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::context::AppContext;
use crate::domain::{Priority, Ticket, TicketDraft, TicketId};
use crate::error::{AppError, AppResult, ValidationError};
use crate::form::DraftField;
use crate::services::{StoreEvent, SubscriptionId};
use crate::workflow::ticket::{DeleteOutcome, delete_with_confirmation, submit_form};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Open the editor for a new ticket.
    New,
    /// Open the editor on an existing ticket.
    Edit { id: String },
    /// Change one field of the open draft.
    Set {
        #[command(subcommand)]
        field: SetField,
    },
    /// Show the open draft.
    Draft,
    /// Commit the open draft.
    Save,
    /// Close the editor without saving.
    Cancel,
    /// List all tickets.
    List {
        /// Print the tickets as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete a ticket after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
    /// Rate a finished ticket from 1 to 5.
    Rate {
        id: String,
        #[arg(allow_negative_numbers = true)]
        rating: i64,
    },
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum SetField {
    Title {
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        text: Vec<String>,
    },
    Description {
        #[arg(
            required = true,
            num_args = 1..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        text: Vec<String>,
    },
    Status {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// low, medium, high or none.
    Priority { level: String },
}

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over one [`AppContext`]. The ticket list is
/// re-rendered whenever the store reports a change.
pub struct Shell<R, W> {
    ctx: AppContext,
    input: R,
    output: W,
    editor_open: bool,
    dirty: Rc<Cell<bool>>,
    subscription: SubscriptionId,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(mut ctx: AppContext, input: R, output: W) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let subscription = ctx.store.subscribe(Box::new(move |event: &StoreEvent| {
            debug!(ticket_id = %event.ticket_id(), "list needs redraw");
            flag.set(true);
        }));
        Self {
            ctx,
            input,
            output,
            editor_open: false,
            dirty,
            subscription,
        }
    }

    pub fn run(&mut self) -> AppResult<()> {
        let config = &self.ctx.config;
        writeln!(
            self.output,
            "Ticket Tracker [{} statuses, {} rating] (type 'help' for commands)",
            config.status_scheme.as_str(),
            config.rating_policy.as_str()
        )?;
        self.render_list()?;

        loop {
            write!(self.output, "{}", self.prompt())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            let tokens = tokenize(&line);
            if tokens.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(tokens) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    let rendered = err.render().to_string();
                    match err.kind() {
                        ErrorKind::DisplayHelp
                        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                            write!(self.output, "{rendered}")?
                        }
                        _ => writeln!(self.output, "{}", rendered.trim_end())?,
                    }
                    continue;
                }
            };

            if let Flow::Quit = self.dispatch(command)? {
                break;
            }
            if self.dirty.replace(false) {
                self.render_list()?;
            }
        }
        Ok(())
    }

    /// Detaches the shell from the store and hands the session back.
    pub fn into_context(mut self) -> AppContext {
        self.ctx.store.unsubscribe(self.subscription);
        self.ctx
    }

    fn dispatch(&mut self, command: ShellCommand) -> AppResult<Flow> {
        match command {
            ShellCommand::New => {
                self.ctx.form.open_for_create();
                self.editor_open = true;
                writeln!(self.output, "New ticket.")?;
                self.render_draft()?;
            }
            ShellCommand::Edit { id } => {
                let id = TicketId::new(id);
                match self.ctx.store.get(&id) {
                    Some(ticket) => {
                        self.ctx.form.open_for_edit(ticket);
                        self.editor_open = true;
                        writeln!(self.output, "Editing ticket {id}.")?;
                        self.render_draft()?;
                    }
                    None => self.report(ValidationError::NotFound(id))?,
                }
            }
            ShellCommand::Set { field } => {
                if self.require_editor()? {
                    if let Some(update) = self.field_update(field)? {
                        self.ctx.form.update(update);
                        self.render_draft()?;
                    }
                }
            }
            ShellCommand::Draft => {
                if self.require_editor()? {
                    self.render_draft()?;
                }
            }
            ShellCommand::Save => {
                if self.require_editor()? {
                    match submit_form(&mut self.ctx.form, &mut self.ctx.store) {
                        Ok(ticket) => {
                            self.editor_open = false;
                            writeln!(self.output, "Saved ticket {}.", ticket.id)?;
                        }
                        Err(err) => self.report(err)?,
                    }
                }
            }
            ShellCommand::Cancel => {
                self.ctx.form.discard();
                self.editor_open = false;
                writeln!(self.output, "Editor closed.")?;
            }
            ShellCommand::List { json } => {
                if json {
                    let rendered = serde_json::to_string_pretty(self.ctx.store.list())
                        .map_err(|err| AppError::Io(io::Error::other(err)))?;
                    writeln!(self.output, "{rendered}")?;
                } else {
                    self.render_list()?;
                }
            }
            ShellCommand::Delete { id, yes } => self.delete(TicketId::new(id), yes)?,
            ShellCommand::Rate { id, rating } => {
                match self.ctx.store.rate(&TicketId::new(id), rating) {
                    Ok(ticket) => writeln!(
                        self.output,
                        "Rated ticket {} {}.",
                        ticket.id,
                        stars(&ticket)
                    )?,
                    Err(err) => self.report(err)?,
                }
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn delete(&mut self, id: TicketId, skip_prompt: bool) -> AppResult<()> {
        let mut prompt_error = None;
        let outcome = {
            let input = &mut self.input;
            let output = &mut self.output;
            delete_with_confirmation(&mut self.ctx.store, &id, |ticket| {
                if skip_prompt {
                    return true;
                }
                match confirm(input, output, ticket) {
                    Ok(answer) => answer,
                    Err(err) => {
                        prompt_error = Some(err);
                        false
                    }
                }
            })
        };
        if let Some(err) = prompt_error {
            return Err(AppError::Io(err));
        }

        match outcome {
            Ok(DeleteOutcome::Deleted(ticket)) => {
                if self.ctx.form.editing_id() == Some(&ticket.id) {
                    self.ctx.form.discard();
                    self.editor_open = false;
                }
                writeln!(self.output, "Deleted ticket {}.", ticket.id)?;
            }
            Ok(DeleteOutcome::Cancelled) => writeln!(self.output, "Kept ticket {id}.")?,
            Err(err) => self.report(err)?,
        }
        Ok(())
    }

    fn field_update(&mut self, field: SetField) -> AppResult<Option<DraftField>> {
        let update = match field {
            SetField::Title { text } => DraftField::Title(text.join(" ")),
            SetField::Description { text } => DraftField::Description(text.join(" ")),
            SetField::Status { text } => {
                let label = text.join(" ");
                let scheme = self.ctx.store.scheme();
                match scheme.parse_status(&label) {
                    Some(status) => DraftField::Status(status),
                    None => {
                        let choices = scheme
                            .statuses()
                            .iter()
                            .map(|status| status.as_str())
                            .collect::<Vec<_>>()
                            .join(", ");
                        writeln!(
                            self.output,
                            "Unknown status '{label}'. Choose one of: {choices}."
                        )?;
                        return Ok(None);
                    }
                }
            }
            SetField::Priority { level } => {
                if level.eq_ignore_ascii_case("none") {
                    DraftField::Priority(None)
                } else {
                    match Priority::from_str(&level) {
                        Some(priority) => DraftField::Priority(Some(priority)),
                        None => {
                            writeln!(
                                self.output,
                                "Unknown priority '{level}'. Choose low, medium, high or none."
                            )?;
                            return Ok(None);
                        }
                    }
                }
            }
        };
        Ok(Some(update))
    }

    fn require_editor(&mut self) -> AppResult<bool> {
        if !self.editor_open {
            writeln!(
                self.output,
                "No ticket is open. Use 'new' or 'edit <id>' first."
            )?;
        }
        Ok(self.editor_open)
    }

    fn report(&mut self, err: ValidationError) -> AppResult<()> {
        match err {
            ValidationError::MissingFields => {
                writeln!(self.output, "Missing info: please fill all fields.")?
            }
            other => writeln!(self.output, "Error: {other}")?,
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        match (self.editor_open, self.ctx.form.editing_id()) {
            (true, Some(id)) => format!("edit {id}> "),
            (true, None) => "new> ".to_string(),
            (false, _) => "> ".to_string(),
        }
    }

    fn read_line(&mut self) -> AppResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn render_draft(&mut self) -> AppResult<()> {
        write_draft(&mut self.output, self.ctx.form.draft())?;
        Ok(())
    }

    fn render_list(&mut self) -> AppResult<()> {
        if self.ctx.store.is_empty() {
            writeln!(self.output, "No tickets yet")?;
            return Ok(());
        }
        writeln!(self.output, "Tickets ({}):", self.ctx.store.len())?;
        let tickets = self.ctx.store.list();
        let scheme = self.ctx.store.scheme();
        for ticket in tickets {
            write!(self.output, "[{}] {} ({})", ticket.id, ticket.title, ticket.status)?;
            if let Some(priority) = ticket.priority {
                write!(self.output, " priority: {}", priority.as_str())?;
            }
            writeln!(self.output)?;
            writeln!(self.output, "    {}", ticket.description)?;
            if scheme.is_terminal(ticket.status) || ticket.rating.is_some() {
                writeln!(self.output, "    rating: {}", stars(ticket))?;
            }
        }
        Ok(())
    }
}

/// Splits a shell line into arguments. Free text after `set title` or
/// `set description` is kept as one argument with its inner spacing intact.
fn tokenize(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    if let Some((field, text)) = free_text_field(line) {
        return vec!["set".to_string(), field.to_string(), text.to_string()];
    }
    line.split_whitespace().map(str::to_string).collect()
}

fn free_text_field(line: &str) -> Option<(&'static str, &str)> {
    let rest = line.trim_start().strip_prefix("set")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    ["title", "description"].into_iter().find_map(|field| {
        let text = rest.strip_prefix(field)?;
        if !text.starts_with(char::is_whitespace) {
            return None;
        }
        let text = text.trim_start();
        (!text.is_empty()).then_some((field, text))
    })
}

fn write_draft<W: Write>(output: &mut W, draft: &TicketDraft) -> io::Result<()> {
    writeln!(output, "  title:       {}", draft.title)?;
    writeln!(output, "  description: {}", draft.description)?;
    writeln!(output, "  status:      {}", draft.status)?;
    let priority = draft.priority.map(|p| p.as_str()).unwrap_or("none");
    writeln!(output, "  priority:    {priority}")
}

fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    ticket: &Ticket,
) -> io::Result<bool> {
    write!(
        output,
        "Delete '{}' ({})? Are you sure? [y/N] ",
        ticket.title, ticket.id
    )?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn stars(ticket: &Ticket) -> String {
    let filled = ticket.rating.map(|r| r.get()).unwrap_or(0);
    (1..=5)
        .map(|star| if star <= filled { '★' } else { '☆' })
        .collect()
}
